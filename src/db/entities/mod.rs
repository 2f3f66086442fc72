#[allow(unused_imports)]
pub mod prelude {
    pub use super::activity_event::Entity as ActivityEvent;
    pub use super::one_time_code::Entity as OneTimeCode;
    pub use super::revoked_token::Entity as RevokedToken;
    pub use super::user::Entity as User;
}

pub mod activity_event;
pub mod one_time_code;
pub mod revoked_token;
pub mod user;
