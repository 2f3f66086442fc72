use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

/// A retired refresh-token identifier. Kept until the token itself would have
/// expired.
#[base_entity(updated_at = "none")]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "revoked_tokens")]
pub struct Model {
    #[sea_orm(unique)]
    pub jti: String,
    pub user_id: Uuid,
    #[sea_orm(indexed)]
    pub expires_at: DateTimeWithTimeZone,
}

impl ActiveModelBehavior for ActiveModel {}
