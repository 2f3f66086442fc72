use serde::{Deserialize, Serialize};

/// Front-end application a login or logout belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ClientTag {
    #[default]
    A,
    B,
}

impl ClientTag {
    pub const ALL: [ClientTag; 2] = [ClientTag::A, ClientTag::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientTag::A => "A",
            ClientTag::B => "B",
        }
    }
}

impl TryFrom<&str> for ClientTag {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "A" => Ok(ClientTag::A),
            "B" => Ok(ClientTag::B),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    pub sub: String, // user id
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RefreshClaims {
    pub sub: String,
    /// Rotation identifier; retired identifiers live in the blacklist.
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    VerifyEmail,
    ResetPassword,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EmailTokenClaims {
    pub sub: String,
    pub purpose: TokenPurpose,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}
