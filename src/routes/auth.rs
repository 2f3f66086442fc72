use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use super::cookies::{REFRESH_COOKIE, cleared_session_cookies, cookie_value, session_cookies};
use crate::{
    auth::{AccessClaims, AuthError, ClientTag, SessionTokens},
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext,
        auth_service::{
            ActivityEntry, EstablishedSession, FederatedProfile, UserProfile, VerifyOutcome,
        },
        session_status::ClientSessionStatus,
    },
    state::AppState,
};

pub const FEDERATION_SECRET_HEADER: &str = "x-federation-secret";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub mfa_required: bool,
    pub pending_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaVerifyRequest {
    pub pending_id: String,
    pub code: String,
    #[serde(default)]
    pub client: ClientTag,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub client: ClientTag,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct FederatedLoginRequest {
    pub provider: String,
    pub subject: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub client: ClientTag,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserProfile,
    pub access_expires_in: i64,
    pub refresh_expires_in: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_expires_in: i64,
    pub refresh_expires_in: i64,
}

impl From<&SessionTokens> for TokenResponse {
    fn from(tokens: &SessionTokens) -> Self {
        Self {
            access_expires_in: tokens.access_ttl_secs,
            refresh_expires_in: tokens.refresh_ttl_secs,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/verify-email", get(verify_email))
        .route("/login", post(login))
        .route("/mfa-verify", post(mfa_verify))
        .route("/token", post(refresh_token))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/federated", post(federated_login))
        .route("/check", get(check))
        .route("/logs", get(logs))
        .route("/clients", get(clients))
        .with_state(state)
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<UserProfile> {
    let user = ServiceContext::from_state(&state)
        .auth()
        .register(&body.name, &body.email, &body.password)
        .await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "Registered. Verify email.", user)
}

async fn verify_email(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VerifyEmailQuery>,
) -> ApiResult<serde_json::Value> {
    let outcome = ServiceContext::from_state(&state)
        .auth()
        .verify_email(query.token.as_deref())
        .await?;
    let message = match outcome {
        VerifyOutcome::Verified => "Email verified successfully",
        VerifyOutcome::AlreadyVerified => "Already verified",
    };
    JsonApiResponse::with_status(StatusCode::OK, message, serde_json::Value::Null)
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let pending_id = ServiceContext::from_state(&state)
        .auth()
        .login(&body.email, &body.password)
        .await?;
    JsonApiResponse::with_status(
        StatusCode::OK,
        "Login code sent",
        LoginResponse {
            mfa_required: true,
            pending_id,
        },
    )
}

async fn mfa_verify(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MfaVerifyRequest>,
) -> Result<(HeaderMap, JsonApiResponse<SessionResponse>), AppError> {
    let session = ServiceContext::from_state(&state)
        .auth()
        .verify_mfa(&body.pending_id, &body.code, body.client)
        .await?;
    session_response(&state, session, "Logged in")
}

async fn refresh_token(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let secure = state.config.auth.cookie_secure;
    let presented = cookie_value(&headers, REFRESH_COOKIE);
    let refreshed = ServiceContext::from_state(&state)
        .auth()
        .refresh_session(presented.as_deref())
        .await;

    match refreshed {
        Ok(tokens) => match session_cookies(&tokens, secure) {
            Ok(cookies) => (
                cookies,
                JsonApiResponse::with_status(
                    StatusCode::OK,
                    "Token refreshed",
                    TokenResponse::from(&tokens),
                ),
            )
                .into_response(),
            Err(err) => err.into_response(),
        },
        Err(err @ (AuthError::Storage(_) | AuthError::Internal(_))) => {
            AppError::from(err).into_response()
        }
        Err(err) => (cleared_session_cookies(secure), AppError::from(err)).into_response(),
    }
}

async fn logout(
    State(state): State<Arc<AppState>>,
    claims: AccessClaims,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(HeaderMap, JsonApiResponse<serde_json::Value>), AppError> {
    let body: LogoutRequest = optional_json(&body)?;
    let presented = cookie_value(&headers, REFRESH_COOKIE);
    ServiceContext::from_state(&state)
        .auth()
        .logout(&claims, presented.as_deref(), body.client)
        .await?;

    let response = JsonApiResponse::with_status(StatusCode::OK, "Logged out", serde_json::Value::Null)?;
    Ok((cleared_session_cookies(state.config.auth.cookie_secure), response))
}

async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ForgotPasswordRequest>,
) -> ApiResult<serde_json::Value> {
    ServiceContext::from_state(&state)
        .auth()
        .forgot_password(&body.email)
        .await?;
    JsonApiResponse::with_status(
        StatusCode::OK,
        "If account exists, email sent",
        serde_json::Value::Null,
    )
}

async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetPasswordRequest>,
) -> ApiResult<serde_json::Value> {
    ServiceContext::from_state(&state)
        .auth()
        .reset_password(body.token.as_deref(), &body.password)
        .await?;
    JsonApiResponse::with_status(StatusCode::OK, "Password updated", serde_json::Value::Null)
}

async fn federated_login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<FederatedLoginRequest>,
) -> Result<(HeaderMap, JsonApiResponse<SessionResponse>), AppError> {
    let service = ServiceContext::from_state(&state).auth();
    service.authorize_federation(
        headers
            .get(FEDERATION_SECRET_HEADER)
            .and_then(|value| value.to_str().ok()),
    )?;

    let session = service
        .federated_login(FederatedProfile {
            provider: body.provider,
            subject: body.subject,
            email: body.email,
            name: body.name,
            client: body.client,
        })
        .await?;
    session_response(&state, session, "Logged in")
}

async fn check(State(state): State<Arc<AppState>>, claims: AccessClaims) -> ApiResult<UserProfile> {
    let user = ServiceContext::from_state(&state)
        .auth()
        .current_user(&claims)
        .await?;
    JsonApiResponse::ok(user)
}

async fn logs(
    State(state): State<Arc<AppState>>,
    claims: AccessClaims,
) -> ApiResult<Vec<ActivityEntry>> {
    let events = ServiceContext::from_state(&state)
        .auth()
        .recent_activity(&claims)
        .await?;
    JsonApiResponse::ok(events)
}

async fn clients(
    State(state): State<Arc<AppState>>,
    claims: AccessClaims,
) -> ApiResult<ClientSessionStatus> {
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::Unauthenticated)?;
    let status = ServiceContext::from_state(&state)
        .auth()
        .client_session_status(user_id)
        .await?;
    JsonApiResponse::ok(status)
}

fn session_response(
    state: &AppState,
    session: EstablishedSession,
    message: &str,
) -> Result<(HeaderMap, JsonApiResponse<SessionResponse>), AppError> {
    let cookies = session_cookies(&session.tokens, state.config.auth.cookie_secure)?;
    let response = JsonApiResponse::with_status(
        StatusCode::OK,
        message,
        SessionResponse {
            user: session.user,
            access_expires_in: session.tokens.access_ttl_secs,
            refresh_expires_in: session.tokens.refresh_ttl_secs,
        },
    )?;
    Ok((cookies, response))
}

/// Parses a JSON body that callers may omit entirely.
fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| AppError::bad_request(format!("Invalid request body: {err}")))
}
