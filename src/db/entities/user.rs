use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

#[base_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Stored trimmed and lower-cased.
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    /// `None` for accounts that only ever signed in through a federated provider.
    pub password_hash: Option<String>,
    /// `provider:subject` of the linked federated identity.
    #[sea_orm(unique)]
    pub federated_id: Option<String>,
    #[sea_orm(default_value = false)]
    pub verified: bool,
    #[sea_orm(has_many)]
    pub one_time_codes: HasMany<super::one_time_code::Entity>,
    #[sea_orm(has_many)]
    pub activity_events: HasMany<super::activity_event::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
