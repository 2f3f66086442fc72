use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

impl ErrorPayload {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum ClientFrame {
    Ping {
        id: String,
        #[serde(default)]
        ts: Option<i64>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum ServerFrame {
    Connected {
        conn_id: String,
        user_id: String,
        ts: i64,
    },
    /// The user's session ended elsewhere; the client drops its local state.
    ForceLogout,
    Pong {
        id: String,
        ts: i64,
    },
    Error {
        error: ErrorPayload,
        ts: i64,
    },
}

impl ServerFrame {
    pub fn connected(conn_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::Connected {
            conn_id: conn_id.into(),
            user_id: user_id.into(),
            ts: now_unix_i64(),
        }
    }

    pub fn pong(for_id: impl Into<String>) -> Self {
        Self::Pong {
            id: for_id.into(),
            ts: now_unix_i64(),
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self::Error {
            error: ErrorPayload::new(code, message),
            ts: now_unix_i64(),
        }
    }
}

fn now_unix_i64() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::{ClientFrame, ServerFrame};

    #[test]
    fn force_logout_serializes_without_payload() {
        let json = serde_json::to_value(ServerFrame::ForceLogout).expect("frame should serialize");
        assert_eq!(json, serde_json::json!({ "op": "force-logout" }));
    }

    #[test]
    fn ping_frame_parses_with_optional_timestamp() {
        let frame: ClientFrame =
            serde_json::from_str(r#"{"op":"ping","id":"p-1"}"#).expect("ping should parse");
        let ClientFrame::Ping { id, ts } = frame;
        assert_eq!(id, "p-1");
        assert!(ts.is_none());
    }

    #[test]
    fn unknown_op_is_rejected() {
        let err = serde_json::from_str::<ClientFrame>(r#"{"op":"channel-join","id":"x"}"#);
        assert!(err.is_err());
    }
}
