//! Push transport for session notifications.
//!
//! A [`server::SessionRegistry`] keeps every open websocket per user; the axum
//! route in [`server::axum`] admits a socket only after its access credential
//! has been verified, and the registry can fan a `force-logout` frame out to all
//! of a user's connections.

pub mod protocol;
pub mod server;
