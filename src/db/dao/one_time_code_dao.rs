use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
    sea_query::{Expr, ExprTrait},
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::{one_time_code, prelude::OneTimeCode};

#[derive(Clone)]
pub struct OneTimeCodeDao {
    db: DatabaseConnection,
}

impl DaoBase for OneTimeCodeDao {
    type Entity = OneTimeCode;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl OneTimeCodeDao {
    /// Stores a new code for `user_id`, dropping any earlier ones in the same
    /// transaction so only the latest code can ever match.
    pub async fn replace_for_user(
        &self,
        user_id: Uuid,
        code_hash: &str,
        expires_at: DateTime<FixedOffset>,
    ) -> DaoResult<one_time_code::Model> {
        let now = Utc::now().fixed_offset();
        let txn = self.db.begin().await.map_err(DaoLayerError::Db)?;

        OneTimeCode::delete_many()
            .filter(one_time_code::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(DaoLayerError::Db)?;

        let model = one_time_code::ActiveModel {
            id: Set(Uuid::new_v4()),
            created_at: Set(now),
            updated_at: Set(now),
            user_id: Set(user_id),
            code_hash: Set(code_hash.to_string()),
            failed_attempts: Set(0),
            expires_at: Set(expires_at),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(DaoLayerError::Db)?;

        txn.commit().await.map_err(DaoLayerError::Db)?;
        Ok(model)
    }

    pub async fn latest_for_user(&self, user_id: Uuid) -> DaoResult<Option<one_time_code::Model>> {
        self.find(1, 1, None, move |query| {
            query.filter(one_time_code::Column::UserId.eq(user_id))
        })
        .await
        .map(|response| response.data.into_iter().next())
    }

    /// Claims code `code_id` and clears whatever else is stored for the user.
    /// `Ok(false)` means another request consumed or replaced it first.
    pub async fn consume(&self, code_id: Uuid, user_id: Uuid) -> DaoResult<bool> {
        let claimed = self
            .delete_where(Condition::all().add(one_time_code::Column::Id.eq(code_id)))
            .await?;
        if claimed == 0 {
            return Ok(false);
        }

        self.delete_where(Condition::all().add(one_time_code::Column::UserId.eq(user_id)))
            .await?;
        Ok(true)
    }

    /// Counts a wrong guess against code `code_id` and drops the code once
    /// `max_attempts` misses are on record. `Ok(true)` means it is gone.
    pub async fn record_failed_attempt(&self, code_id: Uuid, max_attempts: u32) -> DaoResult<bool> {
        OneTimeCode::update_many()
            .col_expr(
                one_time_code::Column::FailedAttempts,
                Expr::col(one_time_code::Column::FailedAttempts).add(1),
            )
            .col_expr(
                one_time_code::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(one_time_code::Column::Id.eq(code_id))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;

        let limit = i32::try_from(max_attempts).unwrap_or(i32::MAX);
        let dropped = self
            .delete_where(
                Condition::all()
                    .add(one_time_code::Column::Id.eq(code_id))
                    .add(one_time_code::Column::FailedAttempts.gte(limit)),
            )
            .await?;
        Ok(dropped > 0)
    }

    pub async fn purge_expired(&self, now: DateTime<FixedOffset>) -> DaoResult<u64> {
        self.delete_where(Condition::all().add(one_time_code::Column::ExpiresAt.lt(now)))
            .await
    }
}
