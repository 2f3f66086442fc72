pub mod auth_service;
pub mod context;
pub mod maintenance;
pub mod notifier;
pub mod session_status;

pub use context::ServiceContext;
