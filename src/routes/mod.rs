pub mod auth;
pub mod cookies;
mod entry;

pub use entry::{API_PREFIX, cors_layer, router};
