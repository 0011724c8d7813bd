use async_trait::async_trait;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{RegisterOutcome, User};
use crate::database::store::UserStore;

#[async_trait]
impl UserStore for PgStore {
    async fn register_user(
        &self,
        id: &str,
        email: Option<&str>,
    ) -> Result<(User, RegisterOutcome), DatabaseError> {
        // The primary key arbitrates concurrent first logins: only one insert
        // returns a row, every other caller falls through to the read.
        let inserted = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email) VALUES ($1, $2)
             ON CONFLICT (id) DO NOTHING
             RETURNING id, email, created_at",
        )
        .bind(id)
        .bind(email)
        .fetch_optional(self.pool())
        .await?;

        if let Some(user) = inserted {
            return Ok((user, RegisterOutcome::Created));
        }

        let existing = self
            .find_user(id)
            .await?
            .ok_or_else(|| DatabaseError::not_found("user not found"))?;
        Ok((existing, RegisterOutcome::Existed))
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT id, email, created_at FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }
}
