use chrono::{DateTime, FixedOffset};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::{prelude::RevokedToken, revoked_token};

/// Blacklist of retired refresh-token identifiers.
#[derive(Clone)]
pub struct RevokedTokenDao {
    db: DatabaseConnection,
}

impl DaoBase for RevokedTokenDao {
    type Entity = RevokedToken;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl RevokedTokenDao {
    /// Retires `jti`. Returns `Ok(false)` when it was already retired, which is
    /// decided by the unique index and therefore holds across instances.
    pub async fn revoke(
        &self,
        jti: &str,
        user_id: Uuid,
        expires_at: DateTime<FixedOffset>,
    ) -> DaoResult<bool> {
        let model = revoked_token::ActiveModel {
            jti: Set(jti.to_string()),
            user_id: Set(user_id),
            expires_at: Set(expires_at),
            ..Default::default()
        };

        match self.create(model).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_unique_violation() => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub async fn is_revoked(&self, jti: &str) -> DaoResult<bool> {
        let jti = jti.to_string();
        self.find(1, 1, None, move |query| {
            query.filter(revoked_token::Column::Jti.eq(jti))
        })
        .await
        .map(|response| !response.data.is_empty())
    }

    pub async fn purge_expired(&self, now: DateTime<FixedOffset>) -> DaoResult<u64> {
        self.delete_where(Condition::all().add(revoked_token::Column::ExpiresAt.lt(now)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
    use uuid::Uuid;

    use crate::db::entities::revoked_token;

    use super::RevokedTokenDao;
    use crate::db::dao::{DaoBase, DaoLayerError};

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn entry(jti: &str) -> revoked_token::Model {
        revoked_token::Model {
            id: Uuid::new_v4(),
            created_at: ts(),
            jti: jti.to_string(),
            user_id: Uuid::new_v4(),
            expires_at: ts() + Duration::days(7),
        }
    }

    #[tokio::test]
    async fn is_revoked_finds_listed_identifier() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[entry("jti-1")]])
            .append_query_results([Vec::<revoked_token::Model>::new()])
            .into_connection();
        let dao = RevokedTokenDao::new(&db);

        assert!(dao.is_revoked("jti-1").await.expect("query should succeed"));
        assert!(!dao.is_revoked("jti-2").await.expect("query should succeed"));
    }

    #[tokio::test]
    async fn revoke_inserts_entry() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[entry("jti-1")]])
            .into_connection();
        let dao = RevokedTokenDao::new(&db);

        let inserted = dao
            .revoke("jti-1", Uuid::new_v4(), ts())
            .await
            .expect("insert should succeed");
        assert!(inserted);
    }

    #[tokio::test]
    async fn revoke_propagates_other_database_errors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("insert failed".to_string())])
            .into_connection();
        let dao = RevokedTokenDao::new(&db);

        let err = dao
            .revoke("jti-1", Uuid::new_v4(), ts())
            .await
            .expect_err("insert should fail");
        assert!(matches!(err, DaoLayerError::Db(_)));
    }
}
