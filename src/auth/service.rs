use std::time::{Duration, SystemTime, UNIX_EPOCH};

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher,
        PasswordVerifier, SaltString,
    },
    Argon2,
};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unauthorized - {0}")]
    Unauthorized(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication failure: {0}")]
    Internal(String),
}

/// Session token claims; `sub` is the user's email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/// Password hashing and HS256 session tokens
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(secret: &[u8], token_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            token_ttl,
        }
    }

    /// Hash a password into a PHC string with a fresh random salt
    pub fn hash_password(&self, plain: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("Failed to hash password: {e}")))
    }

    pub fn verify_password(&self, plain: &str, hash: &str) -> Result<(), AuthError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("Stored password hash is invalid: {e}")))?;

        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .map_err(|err| match err {
                PasswordHashError::Password => AuthError::InvalidCredentials,
                other => AuthError::Internal(format!("Password verification failed: {other}")),
            })
    }

    pub fn issue_token(&self, email: &str) -> Result<String, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| AuthError::Internal("System clock is before UNIX_EPOCH".into()))?;
        let exp = now + self.token_ttl;

        let claims = Claims {
            sub: email.to_string(),
            iat: now.as_secs() as usize,
            exp: exp.as_secs() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a token and return the email it was issued for
    pub fn validate_token(&self, token: &str) -> Result<String, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::Unauthorized("Token expired".into()),
                ErrorKind::InvalidToken
                | ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_)
                | ErrorKind::MissingRequiredClaim(_) => {
                    AuthError::Unauthorized("Invalid token".into())
                }
                other => AuthError::Internal(format!("Failed to validate token: {other:?}")),
            })
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(b"0123456789abcdef0123456789abcdef", Duration::from_secs(3600))
    }

    #[test]
    fn test_password_round_trip() {
        let auth = service();
        let hash = auth.hash_password("hunter22").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(auth.verify_password("hunter22", &hash).is_ok());
        assert!(matches!(
            auth.verify_password("hunter23", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let auth = service();
        assert_ne!(
            auth.hash_password("same").unwrap(),
            auth.hash_password("same").unwrap()
        );
    }

    #[test]
    fn test_garbage_hash_is_internal_error() {
        let auth = service();
        assert!(matches!(
            auth.verify_password("x", "not-a-phc-string"),
            Err(AuthError::Internal(_))
        ));
    }

    #[test]
    fn test_token_round_trip() {
        let auth = service();
        let token = auth.issue_token("jane@example.com").unwrap();
        assert_eq!(auth.validate_token(&token).unwrap(), "jane@example.com");
    }

    #[test]
    fn test_tampered_token_rejected() {
        let auth = service();
        let mut token = auth.issue_token("jane@example.com").unwrap();
        token.push('x');
        assert!(matches!(
            auth.validate_token(&token),
            Err(AuthError::Unauthorized(_))
        ));

        let other = AuthService::new(b"another-secret-another-secret-!!", Duration::from_secs(60));
        let foreign = other.issue_token("jane@example.com").unwrap();
        assert!(matches!(
            auth.validate_token(&foreign),
            Err(AuthError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = service();
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as usize;
        let claims = Claims {
            sub: "jane@example.com".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"0123456789abcdef0123456789abcdef"),
        )
        .unwrap();

        match auth.validate_token(&token) {
            Err(AuthError::Unauthorized(msg)) => assert_eq!(msg, "Token expired"),
            other => panic!("expected expiry rejection, got {:?}", other),
        }
    }
}
