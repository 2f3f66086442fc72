use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, Select, Set};
use uuid::Uuid;

use super::{DaoBase, DaoPager, DaoResult};
use crate::{
    auth::ClientTag,
    db::entities::{activity_event, prelude::ActivityEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
    EmailVerified,
    LoggedIn,
    LoggedOut,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::EmailVerified => "Email verified",
            ActivityAction::LoggedIn => "Logged in",
            ActivityAction::LoggedOut => "Logged out",
        }
    }
}

impl TryFrom<&str> for ActivityAction {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Email verified" => Ok(ActivityAction::EmailVerified),
            "Logged in" => Ok(ActivityAction::LoggedIn),
            "Logged out" => Ok(ActivityAction::LoggedOut),
            _ => Err(()),
        }
    }
}

/// Append-only activity log.
#[derive(Clone)]
pub struct ActivityEventDao {
    db: DatabaseConnection,
}

impl DaoBase for ActivityEventDao {
    type Entity = ActivityEvent;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl ActivityEventDao {
    pub async fn record(
        &self,
        user_id: Uuid,
        action: ActivityAction,
        client: Option<ClientTag>,
    ) -> DaoResult<activity_event::Model> {
        let model = activity_event::ActiveModel {
            user_id: Set(user_id),
            action: Set(action.as_str().to_string()),
            client: Set(client.map(|tag| tag.as_str().to_string())),
            ..Default::default()
        };
        self.create(model).await
    }

    /// The `limit` newest events of a user.
    pub async fn recent_for_user(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> DaoResult<Vec<activity_event::Model>> {
        self.find(1, limit, None, move |query| {
            query.filter(activity_event::Column::UserId.eq(user_id))
        })
        .await
        .map(|response| response.data)
    }

    /// Pages through a user's client-tagged events, newest first.
    pub fn client_history(
        &self,
        user_id: Uuid,
        page_size: u64,
    ) -> DaoPager<
        Self,
        impl Fn(Select<ActivityEvent>) -> Select<ActivityEvent> + Clone + Send + use<>,
    > {
        self.find_iter(Some(page_size), None, move |query| {
            query
                .filter(activity_event::Column::UserId.eq(user_id))
                .filter(activity_event::Column::Client.is_not_null())
        })
    }
}
