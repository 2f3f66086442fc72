pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: i64 = 5000;
pub const DEFAULT_RUST_LOG: &str = "info,tower_http=info";
pub const DEFAULT_DB_MAX_CONNECTIONS: i64 = 10;
pub const DEFAULT_DB_MIN_IDLE: i64 = 2;

pub const DEV_ACCESS_SECRET: &str = "dev-access-secret-change-me";
pub const DEV_REFRESH_SECRET: &str = "dev-refresh-secret-change-me";
pub const DEV_EMAIL_SECRET: &str = "dev-email-secret-change-me";

pub const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;
pub const DEFAULT_VERIFY_TTL_SECS: i64 = 60 * 60;
pub const DEFAULT_RESET_TTL_SECS: i64 = 30 * 60;
pub const DEFAULT_MFA_CODE_TTL_SECS: i64 = 5 * 60;
pub const DEFAULT_MFA_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_COOKIE_SECURE: bool = true;
pub const DEFAULT_PURGE_INTERVAL_SECS: u64 = 10 * 60;

pub const DEFAULT_CLIENT_A_URL: &str = "http://localhost:3000";
pub const DEFAULT_CLIENT_B_URL: &str = "http://localhost:3001";

pub const DEFAULT_NOTIFIER_WORKERS: usize = 2;
pub const DEFAULT_NOTIFIER_QUEUE_SIZE: usize = 256;
pub const DEFAULT_NOTIFIER_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_NOTIFIER_RETRY_BACKOFF_MS: u64 = 500;
