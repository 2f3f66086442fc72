use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{
    Mutex,
    mpsc::{self, error::TrySendError},
};
use tokio::task::JoinHandle;

use crate::config::NotifierConfig;

/// Outbound account email. `Debug` output omits codes and links.
#[derive(Clone, PartialEq, Eq)]
pub enum Notification {
    VerifyEmail { to: String, link: String },
    LoginCode { to: String, code: String, valid_minutes: i64 },
    PasswordReset { to: String, link: String },
}

impl Notification {
    pub fn recipient(&self) -> &str {
        match self {
            Notification::VerifyEmail { to, .. }
            | Notification::LoginCode { to, .. }
            | Notification::PasswordReset { to, .. } => to,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notification::VerifyEmail { .. } => "verify_email",
            Notification::LoginCode { .. } => "login_code",
            Notification::PasswordReset { .. } => "password_reset",
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            Notification::VerifyEmail { .. } => "Verify your email",
            Notification::LoginCode { .. } => "Your login code",
            Notification::PasswordReset { .. } => "Reset your password",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Notification::VerifyEmail { link, .. } => {
                format!("Confirm your email address by opening this link:\n{link}\n\nThe link is valid for one hour.")
            }
            Notification::LoginCode {
                code,
                valid_minutes,
                ..
            } => format!("Your login code is: {code} (valid {valid_minutes} min)"),
            Notification::PasswordReset { link, .. } => {
                format!("Reset your password by opening this link:\n{link}\n\nIf you did not ask for this, ignore this email.")
            }
        }
    }
}

impl std::fmt::Debug for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notification")
            .field("kind", &self.kind())
            .field("to", &self.recipient())
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn deliver(&self, notification: &Notification) -> Result<()>;
}

/// Development sender: writes messages to the log instead of delivering them.
#[derive(Clone, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<()> {
        tracing::info!(
            to = %notification.recipient(),
            kind = notification.kind(),
            subject = notification.subject(),
            "notification not delivered (log mode)"
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    to: &'a str,
    kind: &'a str,
    subject: &'a str,
    body: String,
}

/// Posts each message as JSON to a mail relay.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build webhook client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<()> {
        let payload = WebhookPayload {
            to: notification.recipient(),
            kind: notification.kind(),
            subject: notification.subject(),
            body: notification.body(),
        };

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .context("webhook request failed")?
            .error_for_status()
            .context("webhook rejected notification")?;
        Ok(())
    }
}

pub fn notifier_from_config(cfg: &NotifierConfig) -> Result<Arc<dyn Notifier>> {
    match cfg.webhook_url.as_deref() {
        Some(url) => Ok(Arc::new(WebhookNotifier::new(url)?)),
        None => {
            tracing::warn!("notifier.webhook_url not configured; emails will only be logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

/// Bounded queue in front of a pool of delivery workers.
///
/// Submitting never waits on delivery. A full queue or a message that still
/// fails after `max_attempts` is logged at error level and dropped.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::Sender<Notification>,
}

impl NotificationDispatcher {
    pub fn spawn(notifier: Arc<dyn Notifier>, cfg: &NotifierConfig) -> (Self, Vec<JoinHandle<()>>) {
        let (tx, rx) = mpsc::channel(cfg.queue_size.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let policy = RetryPolicy {
            max_attempts: cfg.max_attempts.max(1),
            backoff: Duration::from_millis(cfg.retry_backoff_ms),
        };

        let workers = (0..cfg.workers.max(1))
            .map(|worker| {
                let rx = Arc::clone(&rx);
                let notifier = Arc::clone(&notifier);
                tokio::spawn(async move {
                    loop {
                        let next = rx.lock().await.recv().await;
                        let Some(notification) = next else {
                            break;
                        };
                        deliver_with_retry(notifier.as_ref(), &notification, policy, worker).await;
                    }
                    tracing::debug!(worker, "notification worker stopped");
                })
            })
            .collect();

        (Self { tx }, workers)
    }

    pub fn submit(&self, notification: Notification) {
        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(notification)) => tracing::error!(
                to = %notification.recipient(),
                kind = notification.kind(),
                "notification queue full; message dropped"
            ),
            Err(TrySendError::Closed(notification)) => tracing::error!(
                to = %notification.recipient(),
                kind = notification.kind(),
                "notification workers stopped; message dropped"
            ),
        }
    }
}

#[derive(Clone, Copy)]
struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

async fn deliver_with_retry(
    notifier: &dyn Notifier,
    notification: &Notification,
    policy: RetryPolicy,
    worker: usize,
) {
    for attempt in 1..=policy.max_attempts {
        match notifier.deliver(notification).await {
            Ok(()) => return,
            Err(err) if attempt < policy.max_attempts => {
                tracing::warn!(
                    worker,
                    attempt,
                    to = %notification.recipient(),
                    kind = notification.kind(),
                    error = %err,
                    "notification delivery failed; retrying"
                );
                tokio::time::sleep(policy.backoff * attempt).await;
            }
            Err(err) => tracing::error!(
                worker,
                attempt,
                to = %notification.recipient(),
                kind = notification.kind(),
                error = %format!("{err:#}"),
                "notification delivery failed"
            ),
        }
    }
}
