use sea_orm::DatabaseConnection;

use super::{ActivityEventDao, DaoBase, OneTimeCodeDao, RevokedTokenDao, UserDao};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn user(&self) -> UserDao {
        DaoBase::new(&self.db)
    }

    pub fn one_time_code(&self) -> OneTimeCodeDao {
        DaoBase::new(&self.db)
    }

    pub fn revoked_token(&self) -> RevokedTokenDao {
        DaoBase::new(&self.db)
    }

    pub fn activity_event(&self) -> ActivityEventDao {
        DaoBase::new(&self.db)
    }
}
