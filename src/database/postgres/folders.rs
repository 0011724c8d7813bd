use async_trait::async_trait;

use super::{reference_error, PgStore};
use crate::database::manager::DatabaseError;
use crate::database::models::{Folder, FolderInput};
use crate::database::store::{FolderStore, FOLDER_NOT_FOUND, PARENT_FOLDER_NOT_FOUND, WOULD_CREATE_CYCLE};

const FOLDER_COLUMNS: &str = "id, owner_id, name, parent_id, created_at, updated_at";

/// Ancestors of `$1` (inclusive) within owner `$2`; true when `$3` is among them.
const ANCESTOR_CONTAINS_SQL: &str = r#"
    WITH RECURSIVE ancestors (id, parent_id) AS (
        SELECT id, parent_id FROM folders WHERE id = $1 AND owner_id = $2
        UNION
        SELECT f.id, f.parent_id
        FROM folders f
        JOIN ancestors a ON f.id = a.parent_id
        WHERE f.owner_id = $2
    )
    SELECT EXISTS (SELECT 1 FROM ancestors WHERE id = $3)
"#;

#[async_trait]
impl FolderStore for PgStore {
    async fn insert_folder(&self, owner_id: &str, input: &FolderInput) -> Result<Folder, DatabaseError> {
        let sql = format!(
            "INSERT INTO folders (owner_id, name, parent_id)
             SELECT $1, $2, $3
             WHERE $3 IS NULL OR EXISTS (SELECT 1 FROM folders WHERE id = $3 AND owner_id = $1)
             RETURNING {FOLDER_COLUMNS}"
        );
        sqlx::query_as::<_, Folder>(&sql)
            .bind(owner_id)
            .bind(&input.name)
            .bind(input.parent_id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| reference_error(e, PARENT_FOLDER_NOT_FOUND))?
            .ok_or_else(|| DatabaseError::not_found(PARENT_FOLDER_NOT_FOUND))
    }

    async fn find_folder(&self, owner_id: &str, id: i64) -> Result<Option<Folder>, DatabaseError> {
        let sql = format!("SELECT {FOLDER_COLUMNS} FROM folders WHERE id = $1 AND owner_id = $2");
        let folder = sqlx::query_as::<_, Folder>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(folder)
    }

    async fn list_folders(&self, owner_id: &str) -> Result<Vec<Folder>, DatabaseError> {
        let sql = format!("SELECT {FOLDER_COLUMNS} FROM folders WHERE owner_id = $1 ORDER BY name ASC, id ASC");
        let folders = sqlx::query_as::<_, Folder>(&sql)
            .bind(owner_id)
            .fetch_all(self.pool())
            .await?;
        Ok(folders)
    }

    async fn list_folders_by_parent(
        &self,
        owner_id: &str,
        parent_id: Option<i64>,
    ) -> Result<Vec<Folder>, DatabaseError> {
        let folders = match parent_id {
            Some(parent_id) => {
                let sql = format!(
                    "SELECT {FOLDER_COLUMNS} FROM folders
                     WHERE owner_id = $1 AND parent_id = $2
                     ORDER BY name ASC, id ASC"
                );
                sqlx::query_as::<_, Folder>(&sql)
                    .bind(owner_id)
                    .bind(parent_id)
                    .fetch_all(self.pool())
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {FOLDER_COLUMNS} FROM folders
                     WHERE owner_id = $1 AND parent_id IS NULL
                     ORDER BY name ASC, id ASC"
                );
                sqlx::query_as::<_, Folder>(&sql)
                    .bind(owner_id)
                    .fetch_all(self.pool())
                    .await?
            }
        };
        Ok(folders)
    }

    async fn update_folder(
        &self,
        owner_id: &str,
        id: i64,
        input: &FolderInput,
    ) -> Result<Folder, DatabaseError> {
        let mut tx = self.pool().begin().await?;

        // Serialize tree moves per owner so two concurrent reparents cannot
        // each pass the ancestor walk and close a loop together.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM folders WHERE id = $1 AND owner_id = $2)")
                .bind(id)
                .bind(owner_id)
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            return Err(DatabaseError::not_found(FOLDER_NOT_FOUND));
        }

        if let Some(parent_id) = input.parent_id {
            let (parent_exists,): (bool,) =
                sqlx::query_as("SELECT EXISTS (SELECT 1 FROM folders WHERE id = $1 AND owner_id = $2)")
                    .bind(parent_id)
                    .bind(owner_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !parent_exists {
                return Err(DatabaseError::not_found(PARENT_FOLDER_NOT_FOUND));
            }

            let (cycle,): (bool,) = sqlx::query_as(ANCESTOR_CONTAINS_SQL)
                .bind(parent_id)
                .bind(owner_id)
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
            if cycle {
                return Err(DatabaseError::invalid(WOULD_CREATE_CYCLE));
            }
        }

        let sql = format!(
            "UPDATE folders SET name = $1, parent_id = $2, updated_at = now()
             WHERE id = $3 AND owner_id = $4
             RETURNING {FOLDER_COLUMNS}"
        );
        let folder = sqlx::query_as::<_, Folder>(&sql)
            .bind(&input.name)
            .bind(input.parent_id)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| reference_error(e, PARENT_FOLDER_NOT_FOUND))?
            .ok_or_else(|| DatabaseError::not_found(FOLDER_NOT_FOUND))?;

        tx.commit().await?;
        Ok(folder)
    }

    async fn delete_folder(&self, owner_id: &str, id: i64) -> Result<(), DatabaseError> {
        // Subfolders and their notes go with it via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM folders WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(FOLDER_NOT_FOUND));
        }
        Ok(())
    }
}
