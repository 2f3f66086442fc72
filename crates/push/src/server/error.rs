#[derive(Debug, Clone)]
pub enum PushError {
    BadRequest(String),
    Unauthorized(String),
    TooManyConnections(String),
    Internal(String),
}

impl PushError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn too_many_connections(message: impl Into<String>) -> Self {
        Self::TooManyConnections(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(message)
            | Self::Unauthorized(message)
            | Self::TooManyConnections(message)
            | Self::Internal(message) => message,
        }
    }
}

impl std::fmt::Display for PushError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for PushError {}
