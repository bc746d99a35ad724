use jsonwebtoken::{DecodingKey, Validation, decode, errors::Error};
use serde::{Deserialize, Serialize};

/// JWT Claims structure.
///
/// Tokens are minted by the platform's identity service; this service only
/// verifies them.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username.
    pub sub: String,
    /// User ID.
    pub uid: i32,
    /// Granted permissions, e.g. `certificate:issue`, `certificate:revoke`.
    pub permissions: Vec<String>,
    /// Expiration timestamp.
    pub exp: usize,
}

/// Verify and decode a JWT token.
pub fn verify(secret: &str, token: &str) -> Result<Claims, Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
