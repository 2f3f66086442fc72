use serde::Serialize;

use crate::{auth::ClientTag, db::dao::activity_event_dao::ActivityAction};

/// Whether each front-end currently holds a session, keyed by client tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClientSessionStatus {
    #[serde(rename = "A")]
    pub a: bool,
    #[serde(rename = "B")]
    pub b: bool,
}

impl ClientSessionStatus {
    pub fn get(&self, tag: ClientTag) -> bool {
        match tag {
            ClientTag::A => self.a,
            ClientTag::B => self.b,
        }
    }
}

/// Folds activity events, fed newest first, into a [`ClientSessionStatus`].
///
/// The first login or logout seen for a tag decides it; later (older) events
/// for that tag are ignored.
#[derive(Debug, Default)]
pub struct ClientStatusScan {
    resolved: [Option<bool>; 2],
}

impl ClientStatusScan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, client: ClientTag, action: ActivityAction) {
        let logged_in = match action {
            ActivityAction::LoggedIn => true,
            ActivityAction::LoggedOut => false,
            ActivityAction::EmailVerified => return,
        };
        let slot = &mut self.resolved[slot_of(client)];
        if slot.is_none() {
            *slot = Some(logged_in);
        }
    }

    pub fn is_complete(&self) -> bool {
        self.resolved.iter().all(Option::is_some)
    }

    pub fn finish(self) -> ClientSessionStatus {
        ClientSessionStatus {
            a: self.resolved[slot_of(ClientTag::A)].unwrap_or(false),
            b: self.resolved[slot_of(ClientTag::B)].unwrap_or(false),
        }
    }
}

fn slot_of(tag: ClientTag) -> usize {
    match tag {
        ClientTag::A => 0,
        ClientTag::B => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(events_newest_first: &[(ClientTag, ActivityAction)]) -> ClientSessionStatus {
        let mut scan = ClientStatusScan::new();
        for (client, action) in events_newest_first {
            scan.observe(*client, *action);
        }
        scan.finish()
    }

    #[test]
    fn latest_event_per_client_wins() {
        // chronological: login A, login B, logout A
        let status = scan(&[
            (ClientTag::A, ActivityAction::LoggedOut),
            (ClientTag::B, ActivityAction::LoggedIn),
            (ClientTag::A, ActivityAction::LoggedIn),
        ]);
        assert_eq!(status, ClientSessionStatus { a: false, b: true });
    }

    #[test]
    fn relogin_after_logout_counts_as_active() {
        let status = scan(&[
            (ClientTag::A, ActivityAction::LoggedIn),
            (ClientTag::A, ActivityAction::LoggedOut),
            (ClientTag::A, ActivityAction::LoggedIn),
        ]);
        assert!(status.get(ClientTag::A));
        assert!(!status.get(ClientTag::B));
    }

    #[test]
    fn completes_once_both_tags_resolved() {
        let mut scan = ClientStatusScan::new();
        scan.observe(ClientTag::B, ActivityAction::EmailVerified);
        scan.observe(ClientTag::B, ActivityAction::LoggedOut);
        assert!(!scan.is_complete());
        scan.observe(ClientTag::A, ActivityAction::LoggedIn);
        assert!(scan.is_complete());
    }

    #[test]
    fn serializes_with_client_tags_as_keys() {
        let json = serde_json::to_value(ClientSessionStatus { a: true, b: false })
            .expect("status serializes");
        assert_eq!(json, serde_json::json!({ "A": true, "B": false }));
    }
}
