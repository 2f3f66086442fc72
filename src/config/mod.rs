pub mod configs;
pub mod defaults;
pub mod envconfig;
pub mod validate;

pub use configs::{
    AppConfig, AuthConfig, ClientsConfig, DatabaseConfig, GeneralConfig, LoggingConfig,
    NotifierConfig,
};
pub use envconfig::EnvConfig;
