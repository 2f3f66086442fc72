use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query::Expr};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::{prelude::User, user};

#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

impl DaoBase for UserDao {
    type Entity = User;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl UserDao {
    pub async fn find_by_email(&self, email: &str) -> DaoResult<Option<user::Model>> {
        let email = email.to_string();
        self.find(1, 1, None, move |query| {
            query.filter(user::Column::Email.eq(email))
        })
        .await
        .map(|response| response.data.into_iter().next())
    }

    pub async fn find_by_federated_id(&self, federated_id: &str) -> DaoResult<Option<user::Model>> {
        let federated_id = federated_id.to_string();
        self.find(1, 1, None, move |query| {
            query.filter(user::Column::FederatedId.eq(federated_id))
        })
        .await
        .map(|response| response.data.into_iter().next())
    }

    pub async fn create_local(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> DaoResult<user::Model> {
        let model = user::ActiveModel {
            email: Set(email.to_string()),
            name: Set(name.to_string()),
            password_hash: Set(Some(password_hash.to_string())),
            federated_id: Set(None),
            verified: Set(false),
            ..Default::default()
        };
        self.create(model).await
    }

    /// Federated identities arrive already verified by the provider.
    pub async fn create_federated(
        &self,
        name: &str,
        email: &str,
        federated_id: &str,
    ) -> DaoResult<user::Model> {
        let model = user::ActiveModel {
            email: Set(email.to_string()),
            name: Set(name.to_string()),
            password_hash: Set(None),
            federated_id: Set(Some(federated_id.to_string())),
            verified: Set(true),
            ..Default::default()
        };
        self.create(model).await
    }

    /// Attaches a federated identity to an existing account. The provider
    /// vouches for the address, so the account becomes verified. A password
    /// set on a never-verified account is dropped unless `keep_password`.
    pub async fn link_federated(
        &self,
        id: Uuid,
        federated_id: &str,
        name: &str,
        keep_password: bool,
    ) -> DaoResult<user::Model> {
        let federated_id = federated_id.to_string();
        let name = name.to_string();
        self.update(id, move |active| {
            active.federated_id = Set(Some(federated_id));
            active.verified = Set(true);
            if !keep_password {
                active.password_hash = Set(None);
            }
            if !name.is_empty() {
                active.name = Set(name);
            }
        })
        .await
    }

    /// Copies the provider's current email and display name onto the account.
    pub async fn sync_federated_profile(
        &self,
        id: Uuid,
        email: &str,
        name: &str,
    ) -> DaoResult<user::Model> {
        let email = email.to_string();
        let name = name.to_string();
        self.update(id, move |active| {
            active.email = Set(email);
            if !name.is_empty() {
                active.name = Set(name);
            }
        })
        .await
    }

    /// Flips `verified` only if it is still unset. `Ok(false)` means the
    /// account was verified already (or by a concurrent request).
    pub async fn mark_verified(&self, id: Uuid) -> DaoResult<bool> {
        let result = User::update_many()
            .col_expr(user::Column::Verified, Expr::value(true))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::Verified.eq(false))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected > 0)
    }

    pub async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> DaoResult<()> {
        let password_hash = password_hash.to_string();
        self.update(id, move |active| {
            active.password_hash = Set(Some(password_hash));
        })
        .await
        .map(|_| ())
    }
}
