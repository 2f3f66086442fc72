use thiserror::Error;

use crate::db::dao::DaoLayerError;

/// Failures of the login / session state machine, worded for the caller.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Weak password")]
    WeakPassword,
    #[error("Invalid email")]
    InvalidEmail,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Email already in use")]
    EmailInUse,
    #[error("Missing token")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Verify email first")]
    EmailNotVerified,
    #[error("Code expired")]
    CodeExpiredOrMissing,
    #[error("Invalid code")]
    InvalidCode,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Unauthenticated")]
    Unauthenticated,
    #[error("Federated login is disabled")]
    FederationDisabled,
    #[error("Untrusted federation caller")]
    FederationDenied,
    #[error("storage failure: {0}")]
    Storage(#[from] DaoLayerError),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token malformed")]
    Malformed,
    /// The refresh identifier was already retired.
    #[error("refresh token reused")]
    Reused,
    #[error("token signing failed: {0}")]
    Signing(String),
    #[error("token store failure: {0}")]
    Storage(#[from] DaoLayerError),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::Malformed | TokenError::Reused => {
                AuthError::Unauthorized
            }
            TokenError::Signing(message) => AuthError::Internal(message),
            TokenError::Storage(inner) => AuthError::Storage(inner),
        }
    }
}
