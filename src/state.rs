use std::sync::Arc;

use push::server::SessionRegistry;
use sea_orm::DatabaseConnection;

use crate::{
    auth::TokenIssuer, config::AppConfig, db::dao::DaoContext,
    services::notifier::NotificationDispatcher,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub issuer: TokenIssuer,
    pub notifier: NotificationDispatcher,
    pub push: SessionRegistry,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DatabaseConnection,
        notifier: NotificationDispatcher,
    ) -> Arc<Self> {
        let issuer = TokenIssuer::new(&config.auth, DaoContext::new(&db).revoked_token());
        let push = SessionRegistry::new(config.push.clone());
        Arc::new(Self {
            config,
            db,
            issuer,
            notifier,
            push,
        })
    }
}
