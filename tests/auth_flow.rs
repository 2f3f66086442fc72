use axum::{
    Router,
    body::{self, Body},
    http::{HeaderMap, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt; // for `oneshot`

use sso_auth::{
    routes::API_PREFIX,
    test_helpers::{TEST_FEDERATION_SECRET, TestApp, test_app},
};

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    json: Value,
}

impl Reply {
    fn message(&self) -> &str {
        self.json["message"].as_str().unwrap_or_default()
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

async fn send(app: &Router, request: Request<Body>) -> Reply {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    Reply {
        status,
        headers,
        json,
    }
}

fn post_json(path: &str, body: Value) -> Request<Body> {
    Request::post(api_path(path))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

fn with_cookies(mut request: Request<Body>, cookies: &[(&str, &str)]) -> Request<Body> {
    let value = cookies
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ");
    request.headers_mut().insert(
        header::COOKIE,
        value.parse().expect("cookie header should parse"),
    );
    request
}

fn get_with_bearer(path: &str, access: &str) -> Request<Body> {
    Request::get(api_path(path))
        .header(header::AUTHORIZATION, format!("Bearer {access}"))
        .body(Body::empty())
        .expect("request should build")
}

struct Session {
    access: String,
    refresh: String,
}

async fn register_and_verify(app: &TestApp, router: &Router, email: &str) {
    let reply = send(
        router,
        post_json(
            "/register",
            json!({ "name": "Alice", "email": email, "password": "password1" }),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let token = app.next_link_token("verify_email").await;
    let reply = send(
        router,
        Request::get(api_path(&format!("/verify-email?token={token}")))
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
}

async fn sign_in(app: &TestApp, router: &Router, email: &str, client: &str) -> Session {
    let reply = send(
        router,
        post_json("/login", json!({ "email": email, "password": "password1" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    let pending_id = reply.json["data"]["pendingId"]
        .as_str()
        .expect("pending id")
        .to_string();
    let code = app.next_login_code().await;

    let reply = send(
        router,
        post_json(
            "/mfa-verify",
            json!({ "pendingId": pending_id, "code": code, "client": client }),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    Session {
        access: reply.cookie("accessToken").expect("access cookie"),
        refresh: reply.cookie("refreshToken").expect("refresh cookie"),
    }
}

async fn logout(router: &Router, session: &Session, client: &str) -> Reply {
    let request = with_cookies(
        post_json("/logout", json!({ "client": client })),
        &[
            ("accessToken", session.access.as_str()),
            ("refreshToken", session.refresh.as_str()),
        ],
    );
    send(router, request).await
}

#[tokio::test]
async fn register_verify_login_mfa_scenario() {
    let app = test_app().await;
    let router = app.router();

    let reply = send(
        &router,
        post_json(
            "/register",
            json!({ "name": "Alice", "email": "a@x.com", "password": "password1" }),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.json["data"]["email"], "a@x.com");
    let verify_token = app.next_link_token("verify_email").await;

    let reply = send(
        &router,
        post_json("/login", json!({ "email": "a@x.com", "password": "password1" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.message(), "Verify email first");

    let verify = || {
        Request::get(api_path(&format!("/verify-email?token={verify_token}")))
            .body(Body::empty())
            .expect("request")
    };
    let reply = send(&router, verify()).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.message(), "Email verified successfully");
    let reply = send(&router, verify()).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.message(), "Already verified");

    let reply = send(
        &router,
        post_json("/login", json!({ "email": "a@x.com", "password": "password1" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json["data"]["mfaRequired"], true);
    assert!(reply.cookie("accessToken").is_none());
    let pending_id = reply.json["data"]["pendingId"]
        .as_str()
        .expect("pending id")
        .to_string();
    let code = app.next_login_code().await;

    let mfa = json!({ "pendingId": pending_id, "code": code, "client": "A" });
    let reply = send(&router, post_json("/mfa-verify", mfa.clone())).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json["data"]["user"]["name"], "Alice");
    assert_eq!(reply.json["data"]["user"]["email"], "a@x.com");
    let access = reply.cookie("accessToken").expect("access cookie");
    assert!(reply.cookie("refreshToken").is_some());

    let reply = send(&router, post_json("/mfa-verify", mfa)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.message(), "Code expired");

    let reply = send(&router, get_with_bearer("/check", &access)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json["data"]["email"], "a@x.com");
}

#[tokio::test]
async fn register_rejects_weak_password_and_taken_email() {
    let app = test_app().await;
    let router = app.router();

    let reply = send(
        &router,
        post_json(
            "/register",
            json!({ "name": "Alice", "email": "a@x.com", "password": "short" }),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.message(), "Weak password");

    register_and_verify(&app, &router, "a@x.com").await;
    let reply = send(
        &router,
        post_json(
            "/register",
            json!({ "name": "Other", "email": "A@x.com", "password": "password2" }),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn wrong_code_is_rejected_without_consuming_it() {
    let app = test_app().await;
    let router = app.router();
    register_and_verify(&app, &router, "a@x.com").await;

    let reply = send(
        &router,
        post_json("/login", json!({ "email": "a@x.com", "password": "password1" })),
    )
    .await;
    let pending_id = reply.json["data"]["pendingId"]
        .as_str()
        .expect("pending id")
        .to_string();
    let code = app.next_login_code().await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let reply = send(
        &router,
        post_json("/mfa-verify", json!({ "pendingId": pending_id, "code": wrong })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.message(), "Invalid code");

    let reply = send(
        &router,
        post_json("/mfa-verify", json!({ "pendingId": pending_id, "code": code })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn refresh_rotates_and_rejects_reuse() {
    let app = test_app().await;
    let router = app.router();
    register_and_verify(&app, &router, "a@x.com").await;
    let session = sign_in(&app, &router, "a@x.com", "A").await;

    let refresh = |token: &str| {
        with_cookies(
            Request::post(api_path("/token"))
                .body(Body::empty())
                .expect("request"),
            &[("refreshToken", token)],
        )
    };

    let reply = send(&router, refresh(&session.refresh)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.message(), "Token refreshed");
    let rotated = reply.cookie("refreshToken").expect("rotated refresh cookie");
    assert_ne!(rotated, session.refresh);

    let reply = send(&router, refresh(&session.refresh)).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.cookie("refreshToken").as_deref(), Some(""));

    let reply = send(&router, refresh(&rotated)).await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = send(
        &router,
        Request::post(api_path("/token"))
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_blocks_later_refresh_and_updates_client_status() {
    let app = test_app().await;
    let router = app.router();
    register_and_verify(&app, &router, "a@x.com").await;

    let on_a = sign_in(&app, &router, "a@x.com", "A").await;
    let on_b = sign_in(&app, &router, "a@x.com", "B").await;

    let reply = logout(&router, &on_a, "A").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.message(), "Logged out");
    assert_eq!(reply.cookie("accessToken").as_deref(), Some(""));

    let reply = send(
        &router,
        with_cookies(
            Request::post(api_path("/token"))
                .body(Body::empty())
                .expect("request"),
            &[("refreshToken", on_a.refresh.as_str())],
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let reply = send(&router, get_with_bearer("/clients", &on_b.access)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json["data"], json!({ "A": false, "B": true }));

    let reply = send(&router, get_with_bearer("/logs", &on_b.access)).await;
    assert_eq!(reply.status, StatusCode::OK);
    let actions: Vec<&str> = reply.json["data"]
        .as_array()
        .expect("event list")
        .iter()
        .filter_map(|event| event["action"].as_str())
        .collect();
    assert_eq!(
        actions,
        vec!["Logged out", "Logged in", "Logged in", "Email verified"]
    );
}

#[tokio::test]
async fn logout_without_refresh_cookie_still_succeeds() {
    let app = test_app().await;
    let router = app.router();
    register_and_verify(&app, &router, "a@x.com").await;
    let session = sign_in(&app, &router, "a@x.com", "B").await;

    let request = Request::post(api_path("/logout"))
        .header(header::AUTHORIZATION, format!("Bearer {}", session.access))
        .body(Body::empty())
        .expect("request");
    let reply = send(&router, request).await;
    assert_eq!(reply.status, StatusCode::OK);

    let reply = send(&router, get_with_bearer("/clients", &session.access)).await;
    assert_eq!(reply.json["data"], json!({ "A": false, "B": true }));
}

#[tokio::test]
async fn protected_routes_require_access_credential() {
    let app = test_app().await;
    let router = app.router();

    for path in ["/check", "/logs", "/clients"] {
        let reply = send(
            &router,
            Request::get(api_path(path))
                .body(Body::empty())
                .expect("request"),
        )
        .await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(reply.message(), "Unauthenticated");
    }

    let reply = send(&router, get_with_bearer("/check", "not-a-token")).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forgot_password_is_indistinguishable_and_reset_works() {
    let app = test_app().await;
    let router = app.router();
    register_and_verify(&app, &router, "a@x.com").await;

    let known = send(
        &router,
        post_json("/forgot-password", json!({ "email": "a@x.com" })),
    )
    .await;
    let unknown = send(
        &router,
        post_json("/forgot-password", json!({ "email": "ghost@x.com" })),
    )
    .await;
    assert_eq!(known.status, StatusCode::OK);
    assert_eq!(known.status, unknown.status);
    assert_eq!(known.json, unknown.json);

    let token = app.next_link_token("password_reset").await;
    let reply = send(
        &router,
        post_json("/reset-password", json!({ "token": token, "password": "short" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.message(), "Weak password");

    let reply = send(
        &router,
        post_json(
            "/reset-password",
            json!({ "token": "forged", "password": "password2" }),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.message(), "Invalid or expired token");

    let reply = send(
        &router,
        post_json(
            "/reset-password",
            json!({ "token": token, "password": "password2" }),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.cookie("accessToken").is_none());

    let reply = send(
        &router,
        post_json("/login", json!({ "email": "a@x.com", "password": "password2" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn federated_login_issues_session_without_mfa() {
    let app = test_app().await;
    let router = app.router();
    let profile = json!({
        "provider": "google",
        "subject": "1234",
        "email": "fed@x.com",
        "name": "Fed",
        "client": "B"
    });

    let reply = send(&router, post_json("/federated", profile.clone())).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let mut request = post_json("/federated", profile.clone());
    request.headers_mut().insert(
        "x-federation-secret",
        TEST_FEDERATION_SECRET.parse().expect("header value"),
    );
    let reply = send(&router, request).await;
    assert_eq!(reply.status, StatusCode::OK);
    let first_id = reply.json["data"]["user"]["id"].clone();
    let access = reply.cookie("accessToken").expect("access cookie");
    assert!(reply.cookie("refreshToken").is_some());

    let mut request = post_json("/federated", profile);
    request.headers_mut().insert(
        "x-federation-secret",
        TEST_FEDERATION_SECRET.parse().expect("header value"),
    );
    let reply = send(&router, request).await;
    assert_eq!(reply.json["data"]["user"]["id"], first_id);

    let reply = send(&router, get_with_bearer("/clients", &access)).await;
    assert_eq!(reply.json["data"], json!({ "A": false, "B": true }));
}
