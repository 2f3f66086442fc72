use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    auth::{TokenError, TokenIssuer},
    state::AppState,
};

pub use push::protocol::ServerFrame;
pub use push::server::{
    PushAppState, PushConfig, PushError, PushRouteOptions, SessionAuth, SessionRegistry,
};

/// Admits push connections whose access token verifies.
#[derive(Clone)]
pub struct AppPushVerifier {
    issuer: TokenIssuer,
}

impl AppPushVerifier {
    pub fn new(issuer: TokenIssuer) -> Self {
        Self { issuer }
    }
}

#[async_trait]
impl push::server::PushTokenVerifier for AppPushVerifier {
    async fn verify_token(&self, token: &str) -> Result<SessionAuth, PushError> {
        let claims = self.issuer.verify_access_token(token).map_err(map_token_error)?;
        Ok(SessionAuth {
            user_id: claims.sub,
        })
    }
}

pub fn push_state(state: &AppState) -> Arc<PushAppState> {
    Arc::new(PushAppState::new(
        state.push.clone(),
        AppPushVerifier::new(state.issuer.clone()),
    ))
}

fn map_token_error(err: TokenError) -> PushError {
    match err {
        TokenError::Expired | TokenError::Malformed | TokenError::Reused => {
            PushError::unauthorized("Invalid or expired token")
        }
        TokenError::Signing(_) | TokenError::Storage(_) => {
            PushError::internal("internal server error")
        }
    }
}

#[cfg(test)]
mod tests {
    use push::server::PushTokenVerifier;

    use super::*;
    use crate::test_helpers::test_app;

    #[tokio::test]
    async fn verifier_accepts_access_tokens_only() {
        let app = test_app().await;
        let verifier = AppPushVerifier::new(app.state.issuer.clone());

        let access = app.state.issuer.issue_access_token("user-1").expect("sign");
        let auth = verifier.verify_token(&access).await.expect("access token admitted");
        assert_eq!(auth.user_id, "user-1");

        let (refresh, _) = app
            .state
            .issuer
            .issue_refresh_token("user-1", None)
            .expect("sign");
        assert!(matches!(
            verifier.verify_token(&refresh).await,
            Err(PushError::Unauthorized(_))
        ));
    }
}
