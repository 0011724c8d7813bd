use async_trait::async_trait;

use super::{reference_error, PgStore};
use crate::database::manager::DatabaseError;
use crate::database::models::{Note, NoteInput};
use crate::database::store::{NoteStore, FOLDER_NOT_FOUND, NOTE_NOT_FOUND};

const NOTE_COLUMNS: &str = "id, owner_id, title, content, folder_id, created_at, updated_at";

#[async_trait]
impl NoteStore for PgStore {
    async fn insert_note(&self, owner_id: &str, input: &NoteInput) -> Result<Note, DatabaseError> {
        let sql = format!(
            "INSERT INTO notes (owner_id, title, content, folder_id)
             SELECT $1, $2, $3, $4
             WHERE $4 IS NULL OR EXISTS (SELECT 1 FROM folders WHERE id = $4 AND owner_id = $1)
             RETURNING {NOTE_COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&sql)
            .bind(owner_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.folder_id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| reference_error(e, FOLDER_NOT_FOUND))?
            .ok_or_else(|| DatabaseError::not_found(FOLDER_NOT_FOUND))
    }

    async fn find_note(&self, owner_id: &str, id: i64) -> Result<Option<Note>, DatabaseError> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1 AND owner_id = $2");
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(note)
    }

    async fn list_notes(&self, owner_id: &str) -> Result<Vec<Note>, DatabaseError> {
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE owner_id = $1 ORDER BY updated_at DESC, id DESC"
        );
        let notes = sqlx::query_as::<_, Note>(&sql)
            .bind(owner_id)
            .fetch_all(self.pool())
            .await?;
        Ok(notes)
    }

    async fn list_notes_by_folder(
        &self,
        owner_id: &str,
        folder_id: Option<i64>,
    ) -> Result<Vec<Note>, DatabaseError> {
        let notes = match folder_id {
            Some(folder_id) => {
                let sql = format!(
                    "SELECT {NOTE_COLUMNS} FROM notes
                     WHERE owner_id = $1 AND folder_id = $2
                     ORDER BY updated_at DESC, id DESC"
                );
                sqlx::query_as::<_, Note>(&sql)
                    .bind(owner_id)
                    .bind(folder_id)
                    .fetch_all(self.pool())
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {NOTE_COLUMNS} FROM notes
                     WHERE owner_id = $1 AND folder_id IS NULL
                     ORDER BY updated_at DESC, id DESC"
                );
                sqlx::query_as::<_, Note>(&sql)
                    .bind(owner_id)
                    .fetch_all(self.pool())
                    .await?
            }
        };
        Ok(notes)
    }

    async fn update_note(&self, owner_id: &str, id: i64, input: &NoteInput) -> Result<Note, DatabaseError> {
        let sql = format!(
            "UPDATE notes SET title = $1, content = $2, folder_id = $3, updated_at = now()
             WHERE id = $4 AND owner_id = $5
               AND ($3 IS NULL OR EXISTS (SELECT 1 FROM folders WHERE id = $3 AND owner_id = $5))
             RETURNING {NOTE_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Note>(&sql)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.folder_id)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| reference_error(e, FOLDER_NOT_FOUND))?;

        match updated {
            Some(note) => Ok(note),
            // Nothing changed; tell the caller which half of the filter failed.
            None => match self.find_note(owner_id, id).await? {
                Some(_) => Err(DatabaseError::not_found(FOLDER_NOT_FOUND)),
                None => Err(DatabaseError::not_found(NOTE_NOT_FOUND)),
            },
        }
    }

    async fn delete_note(&self, owner_id: &str, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(NOTE_NOT_FOUND));
        }
        Ok(())
    }
}
