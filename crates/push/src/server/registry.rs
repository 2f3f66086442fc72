use std::{collections::HashMap, sync::Arc};

use dashmap::{DashMap, mapref::entry::Entry};
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::protocol::ServerFrame;

use super::{ConnectionId, ConnectionMeta, DisconnectReason, PushConfig, PushError};

struct ConnectionHandle {
    meta: ConnectionMeta,
    outbound_tx: mpsc::Sender<ServerFrame>,
}

/// Open push connections keyed by user id.
///
/// Every mutation and every broadcast for a user runs under that user's map
/// entry lock, so a connect racing a logout either lands before the broadcast
/// (and receives it) or after it. Removing a connection drops its sender, which
/// ends the owning socket session once its queue is drained.
#[derive(Clone)]
pub struct SessionRegistry {
    config: PushConfig,
    users: Arc<DashMap<String, HashMap<ConnectionId, ConnectionHandle>>>,
}

impl SessionRegistry {
    pub fn new(config: PushConfig) -> Self {
        Self {
            config,
            users: Arc::new(DashMap::new()),
        }
    }

    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn register(
        &self,
        meta: ConnectionMeta,
        outbound_tx: mpsc::Sender<ServerFrame>,
    ) -> Result<(), PushError> {
        let conn_id = meta.id;
        let handle = ConnectionHandle { meta, outbound_tx };

        match self.users.entry(handle.meta.user_id.clone()) {
            Entry::Occupied(mut occupied) => {
                let connections = occupied.get_mut();
                if connections.len() >= self.config.max_connections_per_user {
                    return Err(PushError::too_many_connections(
                        "Too many open connections for this user",
                    ));
                }
                connections.insert(conn_id, handle);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(HashMap::from([(conn_id, handle)]));
            }
        }
        Ok(())
    }

    pub fn unregister(&self, user_id: &str, conn_id: ConnectionId, reason: DisconnectReason) -> bool {
        let removed = match self.users.get_mut(user_id) {
            Some(mut connections) => connections.remove(&conn_id).is_some(),
            None => false,
        };
        self.users
            .remove_if(user_id, |_, connections| connections.is_empty());

        if removed {
            tracing::debug!(
                conn_id = %conn_id,
                user_id = %user_id,
                reason = ?reason,
                "push connection removed"
            );
        }
        removed
    }

    /// Sends `frame` to every connection of `user_id`; returns how many accepted it.
    ///
    /// Connections whose socket is gone or whose queue is full are evicted.
    pub fn send_to_user(&self, user_id: &str, frame: &ServerFrame) -> usize {
        let mut delivered = 0;
        let mut evicted = Vec::new();

        if let Some(connections) = self.users.get(user_id) {
            for (conn_id, handle) in connections.iter() {
                match handle.outbound_tx.try_send(frame.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => {
                        evicted.push(*conn_id)
                    }
                }
            }
        }

        for conn_id in evicted {
            self.unregister(user_id, conn_id, DisconnectReason::Evicted);
        }
        delivered
    }

    /// Delivers `force-logout` to every open connection of `user_id` and drops
    /// them from the registry. Returns the number of connections signalled.
    pub fn force_logout(&self, user_id: &str) -> usize {
        let Some((_, connections)) = self.users.remove(user_id) else {
            return 0;
        };

        let mut delivered = 0;
        for (conn_id, handle) in connections {
            match handle.outbound_tx.try_send(ServerFrame::ForceLogout) {
                Ok(()) => delivered += 1,
                Err(err) => tracing::debug!(
                    conn_id = %conn_id,
                    user_id = %user_id,
                    joined_at = handle.meta.joined_at_unix,
                    error = %err,
                    "push connection could not take force-logout"
                ),
            }
        }
        delivered
    }

    pub fn connection_count(&self, user_id: &str) -> usize {
        self.users
            .get(user_id)
            .map(|connections| connections.len())
            .unwrap_or(0)
    }

    pub fn has_user(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }
}
