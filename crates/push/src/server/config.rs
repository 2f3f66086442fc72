use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PushConfig {
    pub enabled: bool,
    pub max_connections_per_user: usize,
    pub max_message_bytes: usize,
    pub heartbeat_interval_secs: u64,
    pub idle_timeout_secs: u64,
    pub outbound_queue_size: usize,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_connections_per_user: 32,
            max_message_bytes: 4 * 1024,
            heartbeat_interval_secs: 20,
            idle_timeout_secs: 60,
            outbound_queue_size: 16,
        }
    }
}
