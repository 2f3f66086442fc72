use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
};
use tower_http::cors::CorsLayer;

use super::auth::{self, FEDERATION_SECRET_HEADER};
use crate::{config::ClientsConfig, push::push_state, state::AppState};

pub const API_PREFIX: &str = "/api/auth";

pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.clients);
    Router::new()
        .nest(API_PREFIX, auth::router(Arc::clone(&state)))
        .merge(push::server::axum::router(push_state(&state)))
        .layer(cors)
}

/// Both client applications call with credentials (cookies), so origins are
/// listed explicitly.
pub fn cors_layer(clients: &ClientsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = clients
        .origins()
        .into_iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(origin, error = %err, "ignoring unusable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(FEDERATION_SECRET_HEADER),
        ])
}
