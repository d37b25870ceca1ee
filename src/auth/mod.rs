//! Authentication: password hashing, session tokens and API keys

pub mod api_key;
pub mod service;

pub use api_key::{generate_api_key, API_KEY_LENGTH};
pub use service::{AuthError, AuthService, Claims};
