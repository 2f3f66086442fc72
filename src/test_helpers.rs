use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{Router, middleware};
use tokio::sync::{Mutex, mpsc};

use crate::{
    config::AppConfig,
    db::connection::connect_in_memory,
    middleware::json_error_middleware,
    routes::router,
    services::{
        ServiceContext,
        auth_service::AuthService,
        notifier::{Notification, NotificationDispatcher, Notifier},
    },
    state::AppState,
};

pub const TEST_FEDERATION_SECRET: &str = "federation-test-secret";

/// Captures outgoing notifications instead of delivering them.
pub struct RecordingNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, notification: &Notification) -> anyhow::Result<()> {
        self.tx
            .send(notification.clone())
            .map_err(|_| anyhow::anyhow!("recording receiver dropped"))
    }
}

/// Application state over an in-memory SQLite database with a recording
/// notifier.
pub struct TestApp {
    pub state: Arc<AppState>,
    outbox: Mutex<mpsc::UnboundedReceiver<Notification>>,
}

pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.federation_secret = Some(TEST_FEDERATION_SECRET.to_string());
    cfg.notifier.retry_backoff_ms = 1;
    cfg
}

pub async fn test_app() -> TestApp {
    test_app_with(test_config()).await
}

pub async fn test_app_with(cfg: AppConfig) -> TestApp {
    let db = connect_in_memory()
        .await
        .expect("in-memory sqlite should open");
    let (tx, rx) = mpsc::unbounded_channel();
    let (dispatcher, _workers) =
        NotificationDispatcher::spawn(Arc::new(RecordingNotifier { tx }), &cfg.notifier);

    TestApp {
        state: AppState::new(cfg, db, dispatcher),
        outbox: Mutex::new(rx),
    }
}

impl TestApp {
    pub fn auth(&self) -> AuthService {
        ServiceContext::from_state(&self.state).auth()
    }

    pub fn router(&self) -> Router {
        router(Arc::clone(&self.state)).layer(middleware::from_fn(json_error_middleware))
    }

    /// Waits for the next notification of the given kind, skipping others.
    pub async fn next_notification(&self, kind: &str) -> Notification {
        let mut outbox = self.outbox.lock().await;
        loop {
            let next = tokio::time::timeout(Duration::from_secs(5), outbox.recv())
                .await
                .expect("notification should arrive in time")
                .expect("notifier channel should stay open");
            if next.kind() == kind {
                return next;
            }
        }
    }

    pub async fn next_login_code(&self) -> String {
        match self.next_notification("login_code").await {
            Notification::LoginCode { code, .. } => code,
            other => panic!("expected login code, got {other:?}"),
        }
    }

    /// Token carried by the next verification or reset link.
    pub async fn next_link_token(&self, kind: &str) -> String {
        let link = match self.next_notification(kind).await {
            Notification::VerifyEmail { link, .. } | Notification::PasswordReset { link, .. } => {
                link
            }
            other => panic!("expected a link, got {other:?}"),
        };
        link.split_once("token=")
            .map(|(_, token)| token.to_string())
            .expect("link should carry a token")
    }
}
