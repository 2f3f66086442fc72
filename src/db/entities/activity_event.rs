use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

#[base_entity(updated_at = "none")]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "activity_events")]
pub struct Model {
    #[sea_orm(indexed)]
    pub user_id: Uuid,
    /// Label written by [`crate::db::dao::activity_event_dao::ActivityAction`].
    pub action: String,
    /// Client tag, absent for events not tied to a front-end.
    pub client: Option<String>,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::user::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
