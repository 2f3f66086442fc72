use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Query, State,
        ws::{WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use super::{PushAppState, PushError, session::run_socket_session};

#[derive(Debug, Clone)]
pub struct PushRouteOptions {
    pub path: &'static str,
    pub allow_query_token: bool,
    /// Cookie carrying the access token for browser clients.
    pub cookie_name: Option<&'static str>,
}

impl Default for PushRouteOptions {
    fn default() -> Self {
        Self {
            path: "/ws",
            allow_query_token: true,
            cookie_name: Some("accessToken"),
        }
    }
}

#[derive(Clone)]
struct PushRouteState {
    app: Arc<PushAppState>,
    options: PushRouteOptions,
}

#[derive(Debug, Deserialize, Default)]
struct SocketQuery {
    token: Option<String>,
}

#[derive(Debug)]
enum PushHttpError {
    MissingToken,
    UpgradeRequired,
    PushDisabled,
    VerifyFailed(PushError),
}

impl PushHttpError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::UpgradeRequired => StatusCode::BAD_REQUEST,
            Self::PushDisabled => StatusCode::NOT_FOUND,
            Self::VerifyFailed(err) => match err {
                PushError::BadRequest(_) => StatusCode::BAD_REQUEST,
                PushError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                PushError::TooManyConnections(_) => StatusCode::TOO_MANY_REQUESTS,
                PushError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn message(&self) -> String {
        match self {
            Self::MissingToken => "Missing access token".to_string(),
            Self::UpgradeRequired => "WebSocket upgrade required".to_string(),
            Self::PushDisabled => "Push channel is disabled".to_string(),
            Self::VerifyFailed(err) => err.message().to_string(),
        }
    }
}

impl IntoResponse for PushHttpError {
    fn into_response(self) -> Response {
        (self.status(), self.message()).into_response()
    }
}

pub fn router(app: Arc<PushAppState>) -> Router {
    router_with_options(app, PushRouteOptions::default())
}

pub fn router_with_options(app: Arc<PushAppState>, options: PushRouteOptions) -> Router {
    let path = options.path;
    Router::new()
        .route(path, get(socket_handler))
        .with_state(PushRouteState { app, options })
}

async fn socket_handler(
    State(route_state): State<PushRouteState>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    headers: HeaderMap,
    Query(query): Query<SocketQuery>,
) -> Response {
    let registry = route_state.app.registry.clone();

    if !registry.is_enabled() {
        return PushHttpError::PushDisabled.into_response();
    }

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(_) => return PushHttpError::UpgradeRequired.into_response(),
    };

    let Some(token) = extract_access_token(&headers, &query, &route_state.options) else {
        return PushHttpError::MissingToken.into_response();
    };

    let auth = match route_state.app.verifier.verify_token(&token).await {
        Ok(auth) => auth,
        Err(err) => {
            tracing::debug!(error = %err, "push handshake rejected");
            return PushHttpError::VerifyFailed(err).into_response();
        }
    };

    let max_bytes = registry.config().max_message_bytes;
    upgrade
        .max_message_size(max_bytes)
        .max_frame_size(max_bytes)
        .on_upgrade(move |socket| run_socket_session(socket, auth, registry))
        .into_response()
}

/// Bearer header first, then the access-token cookie, then `?token=`.
fn extract_access_token(
    headers: &HeaderMap,
    query: &SocketQuery,
    options: &PushRouteOptions,
) -> Option<String> {
    let header_token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(token) = header_token {
        return Some(token.to_string());
    }

    if let Some(name) = options.cookie_name
        && let Some(token) = cookie_value(headers, name)
    {
        return Some(token);
    }

    if options.allow_query_token {
        return query
            .token
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
    }

    None
}

/// Value of cookie `name` from the request's `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::header;

    use super::*;

    #[test]
    fn extract_access_token_prefers_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer header-token".parse().expect("valid header"),
        );
        headers.insert(
            header::COOKIE,
            "accessToken=cookie-token".parse().expect("valid header"),
        );
        let query = SocketQuery {
            token: Some("query-token".to_string()),
        };

        let token = extract_access_token(&headers, &query, &PushRouteOptions::default());
        assert_eq!(token.as_deref(), Some("header-token"));
    }

    #[test]
    fn extract_access_token_reads_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "theme=dark; accessToken=cookie-token; refreshToken=r"
                .parse()
                .expect("valid header"),
        );

        let token =
            extract_access_token(&headers, &SocketQuery::default(), &PushRouteOptions::default());
        assert_eq!(token.as_deref(), Some("cookie-token"));
    }

    #[test]
    fn extract_access_token_falls_back_to_query_token() {
        let query = SocketQuery {
            token: Some("query-token".to_string()),
        };

        let token = extract_access_token(&HeaderMap::new(), &query, &PushRouteOptions::default());
        assert_eq!(token.as_deref(), Some("query-token"));
    }

    #[test]
    fn extract_access_token_ignores_query_when_disabled() {
        let query = SocketQuery {
            token: Some("query-token".to_string()),
        };
        let options = PushRouteOptions {
            allow_query_token: false,
            ..PushRouteOptions::default()
        };

        assert!(extract_access_token(&HeaderMap::new(), &query, &options).is_none());
    }
}
