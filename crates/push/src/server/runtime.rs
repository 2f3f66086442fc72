use std::sync::Arc;

use async_trait::async_trait;

use super::{PushError, SessionAuth, SessionRegistry};

#[async_trait]
pub trait PushTokenVerifier: Send + Sync + 'static {
    /// Verify an access token presented during the websocket handshake.
    ///
    /// Returning `Err(PushError::unauthorized(...))` denies the upgrade.
    async fn verify_token(&self, token: &str) -> Result<SessionAuth, PushError>;
}

/// Shared state for the push route: the connection registry plus the
/// verifier used at handshake time.
#[derive(Clone)]
pub struct PushAppState {
    pub registry: SessionRegistry,
    pub verifier: Arc<dyn PushTokenVerifier>,
}

impl PushAppState {
    pub fn new<V>(registry: SessionRegistry, verifier: V) -> Self
    where
        V: PushTokenVerifier,
    {
        Self {
            registry,
            verifier: Arc::new(verifier),
        }
    }

    pub fn new_with_shared_verifier(
        registry: SessionRegistry,
        verifier: Arc<dyn PushTokenVerifier>,
    ) -> Self {
        Self { registry, verifier }
    }
}
