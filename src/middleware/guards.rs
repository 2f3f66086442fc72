use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::{
    auth::{AccessClaims, AuthError},
    error::AppError,
    routes::cookies::{ACCESS_COOKIE, cookie_value},
    state::AppState,
};

// Auth guard: accepts `Authorization: Bearer` or the access cookie.
impl FromRequestParts<Arc<AppState>> for AccessClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<AccessClaims>().cloned() {
            return Ok(claims);
        }

        let bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string());
        let token = bearer
            .filter(|token| !token.is_empty())
            .or_else(|| cookie_value(&parts.headers, ACCESS_COOKIE))
            .ok_or(AuthError::Unauthenticated)?;

        let claims = state
            .issuer
            .verify_access_token(&token)
            .map_err(|_| AuthError::Unauthenticated)?;

        parts.extensions.insert(claims.clone());
        Ok(claims)
    }
}
