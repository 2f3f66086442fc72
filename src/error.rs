use crate::{auth::AuthError, db::dao::DaoLayerError};

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::Internal(message) => message.as_str(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

impl From<DaoLayerError> for AppError {
    fn from(err: DaoLayerError) -> Self {
        match err {
            DaoLayerError::NotFound { .. } => AppError::not_found(err.to_string()),
            DaoLayerError::InvalidPagination { .. } => AppError::bad_request(err.to_string()),
            DaoLayerError::Db(_) => {
                tracing::error!(error = %err, "storage failure");
                AppError::internal("Internal server error")
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::WeakPassword
            | AuthError::InvalidEmail
            | AuthError::MissingField(_)
            | AuthError::MissingToken
            | AuthError::InvalidOrExpiredToken
            | AuthError::CodeExpiredOrMissing
            | AuthError::InvalidCode => AppError::bad_request(message),
            AuthError::InvalidCredentials
            | AuthError::EmailNotVerified
            | AuthError::Unauthorized
            | AuthError::Unauthenticated => AppError::unauthorized(message),
            AuthError::FederationDisabled => AppError::not_found(message),
            AuthError::FederationDenied => AppError::forbidden(message),
            AuthError::EmailInUse => AppError::conflict(message),
            AuthError::Storage(inner) => {
                tracing::error!(error = %inner, "storage failure");
                AppError::internal("Internal server error")
            }
            AuthError::Internal(inner) => {
                tracing::error!(error = %inner, "internal auth failure");
                AppError::internal("Internal server error")
            }
        }
    }
}
