pub mod activity_event_dao;
pub mod base;
pub mod base_traits;
mod context;
pub mod error;
pub mod one_time_code_dao;
pub mod revoked_token_dao;
pub mod user_dao;

pub use activity_event_dao::ActivityEventDao;
pub use base::{DaoBase, DaoPager, PaginatedResponse};
pub use base_traits::{HasCreatedAtColumn, HasIdActiveModel, TimestampedActiveModel};
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use one_time_code_dao::OneTimeCodeDao;
pub use revoked_token_dao::RevokedTokenDao;
pub use user_dao::UserDao;
