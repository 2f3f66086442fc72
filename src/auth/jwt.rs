use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Serialize, de::DeserializeOwned};

use super::TokenError;

#[derive(Clone)]
pub struct JwtKeys {
    pub enc: EncodingKey,
    pub dec: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            enc: EncodingKey::from_secret(secret),
            dec: DecodingKey::from_secret(secret),
        }
    }
}

pub fn now_unix() -> usize {
    Utc::now().timestamp().max(0) as usize
}

pub fn encode_token<T: Serialize>(keys: &JwtKeys, claims: &T) -> Result<String, TokenError> {
    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".into());

    encode(&header, claims, &keys.enc).map_err(|err| TokenError::Signing(err.to_string()))
}

/// Checks the signature and, when `validate_exp` is set, the expiry.
pub fn decode_token<T: DeserializeOwned>(
    keys: &JwtKeys,
    token: &str,
    validate_exp: bool,
) -> Result<T, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = validate_exp;
    validation.leeway = 0;
    if !validate_exp {
        validation.required_spec_claims.clear();
    }

    let data = decode::<T>(token, &keys.dec, &validation)?;
    Ok(data.claims)
}
