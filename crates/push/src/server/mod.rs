pub mod axum;
mod config;
mod error;
mod registry;
mod runtime;
mod session;
mod types;

pub use axum::{PushRouteOptions, cookie_value};
pub use config::PushConfig;
pub use error::PushError;
pub use registry::SessionRegistry;
pub use runtime::{PushAppState, PushTokenVerifier};
pub use types::{ConnectionId, ConnectionMeta, DisconnectReason, SessionAuth, UserId};
