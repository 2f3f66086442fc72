mod error;
pub mod issuer;
pub mod jwt;
pub mod password;
mod types;

pub use error::{AuthError, TokenError};
pub use issuer::TokenIssuer;
pub use types::{
    AccessClaims, ClientTag, EmailTokenClaims, RefreshClaims, SessionTokens, TokenPurpose,
};
