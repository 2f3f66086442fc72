use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures_util::StreamExt;
use push::{
    protocol::ServerFrame,
    server::{PushAppState, PushConfig, PushError, PushTokenVerifier, SessionAuth, SessionRegistry},
};
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::Message};

struct PrefixVerifier;

#[async_trait]
impl PushTokenVerifier for PrefixVerifier {
    async fn verify_token(&self, token: &str) -> Result<SessionAuth, PushError> {
        token
            .strip_prefix("valid-")
            .map(|user_id| SessionAuth {
                user_id: user_id.to_string(),
            })
            .ok_or_else(|| PushError::unauthorized("Invalid access token"))
    }
}

async fn spawn_server(registry: SessionRegistry) -> String {
    let state = Arc::new(PushAppState::new(registry, PrefixVerifier));
    let app = push::server::axum::router(state);
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("ws://{addr}/ws")
}

async fn next_frame<S>(stream: &mut S) -> ServerFrame
where
    S: StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("frame before timeout")
            .expect("stream open")
            .expect("websocket message");
        if let Message::Text(text) = message {
            return serde_json::from_str(&text).expect("server frame json");
        }
    }
}

async fn wait_for_connections(registry: &SessionRegistry, user_id: &str, expected: usize) {
    for _ in 0..100 {
        if registry.connection_count(user_id) == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {expected} connections for {user_id}");
}

#[tokio::test]
async fn force_logout_reaches_both_tabs() {
    let registry = SessionRegistry::new(PushConfig::default());
    let url = spawn_server(registry.clone()).await;

    let (mut tab_one, _) = connect_async(format!("{url}?token=valid-alice"))
        .await
        .expect("first tab connects");
    let (mut tab_two, _) = connect_async(format!("{url}?token=valid-alice"))
        .await
        .expect("second tab connects");

    assert!(matches!(next_frame(&mut tab_one).await, ServerFrame::Connected { .. }));
    assert!(matches!(next_frame(&mut tab_two).await, ServerFrame::Connected { .. }));
    wait_for_connections(&registry, "alice", 2).await;

    assert_eq!(registry.force_logout("alice"), 2);

    assert_eq!(next_frame(&mut tab_one).await, ServerFrame::ForceLogout);
    assert_eq!(next_frame(&mut tab_two).await, ServerFrame::ForceLogout);
    assert_eq!(registry.connection_count("alice"), 0);
}

#[tokio::test]
async fn handshake_without_valid_token_is_rejected() {
    let registry = SessionRegistry::new(PushConfig::default());
    let url = spawn_server(registry.clone()).await;

    assert!(connect_async(url.clone()).await.is_err());
    assert!(connect_async(format!("{url}?token=forged")).await.is_err());
    assert!(!registry.has_user("forged"));
}
