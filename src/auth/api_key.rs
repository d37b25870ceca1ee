use rand::{distr::Alphanumeric, Rng};

pub const API_KEY_LENGTH: usize = 40;

/// Generate a random alphanumeric API key
pub fn generate_api_key() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(API_KEY_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_shape() {
        let key = generate_api_key();
        assert_eq!(key.len(), API_KEY_LENGTH);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_api_keys_differ() {
        assert_ne!(generate_api_key(), generate_api_key());
    }
}
