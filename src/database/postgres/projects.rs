use async_trait::async_trait;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{Project, ProjectInput};
use crate::database::store::{ProjectStore, PROJECT_NOT_FOUND};

const PROJECT_COLUMNS: &str = "id, owner_id, name, description, color";

#[async_trait]
impl ProjectStore for PgStore {
    async fn list_projects(&self, owner_id: &str) -> Result<Vec<Project>, DatabaseError> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE owner_id = $1 ORDER BY id ASC");
        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(owner_id)
            .fetch_all(self.pool())
            .await?;
        Ok(projects)
    }

    async fn insert_project(&self, owner_id: &str, input: &ProjectInput) -> Result<Project, DatabaseError> {
        let sql = format!(
            "INSERT INTO projects (owner_id, name, description, color)
             VALUES ($1, $2, $3, $4)
             RETURNING {PROJECT_COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(owner_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.color)
            .fetch_one(self.pool())
            .await?;
        Ok(project)
    }

    async fn update_project(
        &self,
        owner_id: &str,
        id: i64,
        input: &ProjectInput,
    ) -> Result<Project, DatabaseError> {
        let sql = format!(
            "UPDATE projects SET name = $1, description = $2, color = $3
             WHERE id = $4 AND owner_id = $5
             RETURNING {PROJECT_COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&sql)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.color)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::not_found(PROJECT_NOT_FOUND))
    }

    async fn delete_project(&self, owner_id: &str, id: i64) -> Result<(), DatabaseError> {
        // Time records drop the reference through ON DELETE SET NULL.
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(PROJECT_NOT_FOUND));
        }
        Ok(())
    }
}
