//! PostgreSQL implementation of the storage ports.
//!
//! Owner filters and reference checks live inside the statement that reads or
//! writes, so there is no window between checking and acting.

mod folders;
mod notes;
mod projects;
mod time_records;
mod users;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::store::HealthCheck;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl HealthCheck for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// A reference that passed the in-statement check can still lose a race with a
/// concurrent delete; the foreign key then fires. Report that as the same
/// not-found the check would have produced.
pub(crate) fn reference_error(err: sqlx::Error, message: &str) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => DatabaseError::not_found(message),
        _ => DatabaseError::Sqlx(err),
    }
}
