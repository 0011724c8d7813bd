use async_trait::async_trait;

use super::{reference_error, PgStore};
use crate::database::manager::DatabaseError;
use crate::database::models::{TimeRecord, TimeRecordInput, TimeRecordKind};
use crate::database::store::{TimeRecordStore, PROJECT_NOT_FOUND};

const RECORD_COLUMNS: &str = "id, owner_id, description, project_id, start_date, end_date";

impl PgStore {
    /// Separates "record missing" from "project missing" after a guarded
    /// write matched no row.
    async fn classify_record_miss(
        &self,
        kind: TimeRecordKind,
        owner_id: &str,
        id: i64,
    ) -> Result<DatabaseError, DatabaseError> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1 AND owner_id = $2)",
            kind.table()
        );
        let (exists,): (bool,) = sqlx::query_as(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_one(self.pool())
            .await?;

        Ok(if exists {
            DatabaseError::not_found(PROJECT_NOT_FOUND)
        } else {
            DatabaseError::not_found(kind.not_found_message())
        })
    }
}

#[async_trait]
impl TimeRecordStore for PgStore {
    async fn list_records(&self, kind: TimeRecordKind, owner_id: &str) -> Result<Vec<TimeRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM {} WHERE owner_id = $1 ORDER BY start_date DESC, id DESC",
            kind.table()
        );
        let records = sqlx::query_as::<_, TimeRecord>(&sql)
            .bind(owner_id)
            .fetch_all(self.pool())
            .await?;
        Ok(records)
    }

    async fn insert_record(
        &self,
        kind: TimeRecordKind,
        owner_id: &str,
        input: &TimeRecordInput,
    ) -> Result<TimeRecord, DatabaseError> {
        let sql = format!(
            "INSERT INTO {} (owner_id, description, project_id, start_date, end_date)
             SELECT $1, $2, $3, $4, $5
             WHERE $3 IS NULL OR EXISTS (SELECT 1 FROM projects WHERE id = $3 AND owner_id = $1)
             RETURNING {RECORD_COLUMNS}",
            kind.table()
        );
        sqlx::query_as::<_, TimeRecord>(&sql)
            .bind(owner_id)
            .bind(&input.description)
            .bind(input.project_id)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| reference_error(e, PROJECT_NOT_FOUND))?
            .ok_or_else(|| DatabaseError::not_found(PROJECT_NOT_FOUND))
    }

    async fn update_record(
        &self,
        kind: TimeRecordKind,
        owner_id: &str,
        id: i64,
        input: &TimeRecordInput,
    ) -> Result<TimeRecord, DatabaseError> {
        let sql = format!(
            "UPDATE {} SET description = $1, project_id = $2, start_date = $3, end_date = $4
             WHERE id = $5 AND owner_id = $6
               AND ($2 IS NULL OR EXISTS (SELECT 1 FROM projects WHERE id = $2 AND owner_id = $6))
             RETURNING {RECORD_COLUMNS}",
            kind.table()
        );
        let updated = sqlx::query_as::<_, TimeRecord>(&sql)
            .bind(&input.description)
            .bind(input.project_id)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| reference_error(e, PROJECT_NOT_FOUND))?;

        match updated {
            Some(record) => Ok(record),
            None => Err(self.classify_record_miss(kind, owner_id, id).await?),
        }
    }

    async fn delete_record(&self, kind: TimeRecordKind, owner_id: &str, id: i64) -> Result<(), DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND owner_id = $2", kind.table());
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(owner_id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(kind.not_found_message()));
        }
        Ok(())
    }

    async fn assign_project(
        &self,
        kind: TimeRecordKind,
        owner_id: &str,
        id: i64,
        project_id: Option<i64>,
    ) -> Result<TimeRecord, DatabaseError> {
        let sql = format!(
            "UPDATE {} SET project_id = $1
             WHERE id = $2 AND owner_id = $3
               AND ($1 IS NULL OR EXISTS (SELECT 1 FROM projects WHERE id = $1 AND owner_id = $3))
             RETURNING {RECORD_COLUMNS}",
            kind.table()
        );
        let updated = sqlx::query_as::<_, TimeRecord>(&sql)
            .bind(project_id)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| reference_error(e, PROJECT_NOT_FOUND))?;

        match updated {
            Some(record) => Ok(record),
            None => Err(self.classify_record_miss(kind, owner_id, id).await?),
        }
    }
}
