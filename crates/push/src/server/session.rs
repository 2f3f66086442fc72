use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval};

use crate::protocol::{ClientFrame, ServerFrame};

use super::{
    SessionAuth, SessionRegistry,
    types::{ConnectionId, ConnectionMeta, DisconnectReason},
};

type WsSink = SplitSink<WebSocket, Message>;

pub async fn run_socket_session(socket: WebSocket, auth: SessionAuth, registry: SessionRegistry) {
    let cfg = registry.config().clone();
    let conn_id = ConnectionId::new();
    let user_id = auth.user_id;
    let (outbound_tx, mut outbound_rx) = mpsc::channel(cfg.outbound_queue_size.max(1));

    let meta = ConnectionMeta {
        id: conn_id,
        user_id: user_id.clone(),
        joined_at_unix: Utc::now().timestamp(),
    };

    let (mut ws_sender, mut ws_receiver) = socket.split();

    if let Err(err) = registry.register(meta, outbound_tx) {
        tracing::info!(
            conn_id = %conn_id,
            user_id = %user_id,
            error = %err,
            "push connection rejected"
        );
        let _ = send_direct_error(&mut ws_sender, "too_many_connections", err.message()).await;
        let _ = ws_sender.send(Message::Close(None)).await;
        return;
    }

    tracing::debug!(conn_id = %conn_id, user_id = %user_id, "push connection opened");
    let _ = send_frame(
        &mut ws_sender,
        &ServerFrame::connected(conn_id.to_string(), user_id.clone()),
    )
    .await;

    let mut heartbeat = interval(Duration::from_secs(cfg.heartbeat_interval_secs.max(1)));
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let idle_timeout = Duration::from_secs(cfg.idle_timeout_secs);
    let mut last_activity = Instant::now();

    let disconnect_reason = loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                // The registry dropped our sender: forced logout or eviction.
                let Some(frame) = outbound else {
                    let _ = ws_sender.send(Message::Close(None)).await;
                    break DisconnectReason::Evicted;
                };

                if send_frame(&mut ws_sender, &frame).await.is_err() {
                    break DisconnectReason::SocketError;
                }
            }
            incoming = ws_receiver.next() => {
                let Some(incoming) = incoming else {
                    break DisconnectReason::ClientClosed;
                };

                match incoming {
                    Ok(Message::Text(text)) => {
                        last_activity = Instant::now();
                        if text.len() > cfg.max_message_bytes {
                            let _ = send_direct_error(
                                &mut ws_sender,
                                "message_too_large",
                                "Message exceeds push.max_message_bytes",
                            )
                            .await;
                            continue;
                        }

                        match serde_json::from_str::<ClientFrame>(&text) {
                            Ok(ClientFrame::Ping { id, .. }) => {
                                if send_frame(&mut ws_sender, &ServerFrame::pong(id)).await.is_err() {
                                    break DisconnectReason::SocketError;
                                }
                            }
                            Err(_) => {
                                let _ = send_direct_error(
                                    &mut ws_sender,
                                    "invalid_payload",
                                    "Invalid websocket payload",
                                )
                                .await;
                            }
                        }
                    }
                    Ok(Message::Binary(_)) => {
                        let _ = send_direct_error(
                            &mut ws_sender,
                            "invalid_payload",
                            "Binary websocket payloads are not supported",
                        )
                        .await;
                    }
                    Ok(Message::Ping(payload)) => {
                        last_activity = Instant::now();
                        if ws_sender.send(Message::Pong(payload)).await.is_err() {
                            break DisconnectReason::SocketError;
                        }
                    }
                    Ok(Message::Pong(_)) => {
                        last_activity = Instant::now();
                    }
                    Ok(Message::Close(_)) => {
                        break DisconnectReason::ClientClosed;
                    }
                    Err(_) => {
                        break DisconnectReason::SocketError;
                    }
                }
            }
            _ = heartbeat.tick() => {
                if last_activity.elapsed() > idle_timeout {
                    break DisconnectReason::IdleTimeout;
                }

                if ws_sender
                    .send(Message::Ping(Vec::new().into()))
                    .await
                    .is_err()
                {
                    break DisconnectReason::SocketError;
                }
            }
        }
    };

    registry.unregister(&user_id, conn_id, disconnect_reason);
    tracing::debug!(
        conn_id = %conn_id,
        user_id = %user_id,
        reason = ?disconnect_reason,
        "push connection closed"
    );
}

async fn send_frame(ws_sender: &mut WsSink, frame: &ServerFrame) -> Result<(), ()> {
    let payload = serde_json::to_string(frame).map_err(|_| ())?;
    ws_sender
        .send(Message::Text(payload.into()))
        .await
        .map_err(|_| ())
}

async fn send_direct_error(ws_sender: &mut WsSink, code: &str, message: &str) -> Result<(), ()> {
    send_frame(ws_sender, &ServerFrame::error(code, message)).await
}
