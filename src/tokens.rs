//! Signed, time-limited action tokens (password resets and the like).
//!
//! The serializer is built once during bootstrap from the final configured
//! secret key and attached to the application as shared state; handlers
//! receive it by reference instead of reaching for a global.
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

pub struct TokenSerializer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenSerializer {
    pub fn new(secret_key: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret_key.as_ref()),
            decoding: DecodingKey::from_secret(secret_key.as_ref()),
        }
    }

    /// Signs `value` into a token that [`TokenSerializer::verify`] accepts
    /// for at most `max_age`.
    pub fn sign(&self, value: &str, max_age: Duration) -> Result<String, anyhow::Error> {
        let exp = (SystemTime::now() + max_age)
            .duration_since(UNIX_EPOCH)?
            .as_secs() as usize;
        let claims = Claims {
            sub: value.to_string(),
            exp,
        };

        Ok(encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &self.encoding,
        )?)
    }

    /// Decodes a token back into the signed value. Fails on tampering, on a
    /// token minted under a different secret, and on expiry. No leeway: a
    /// token past its `exp` is rejected immediately.
    pub fn verify(&self, token: &str) -> Result<String, anyhow::Error> {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding, &validation)?;

        Ok(token_data.claims.sub)
    }
}
