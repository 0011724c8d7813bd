use std::sync::Arc;

use tracing::{debug, info};

use crate::database::models::{TimeRecord, TimeRecordInput, TimeRecordKind};
use crate::database::TimeRecordStore;
use crate::services::error::ServiceError;

/// Operations over one kind of time record. Every mutation answers with the
/// owner's full list of that kind.
#[derive(Clone)]
pub struct TimeRecordService {
    kind: TimeRecordKind,
    store: Arc<dyn TimeRecordStore>,
}

impl TimeRecordService {
    pub fn new(kind: TimeRecordKind, store: Arc<dyn TimeRecordStore>) -> Self {
        Self { kind, store }
    }

    pub fn kind(&self) -> TimeRecordKind {
        self.kind
    }

    pub async fn list(&self, owner_id: &str) -> Result<Vec<TimeRecord>, ServiceError> {
        debug!("Listing {} records for {}", self.kind.table(), owner_id);
        Ok(self.store.list_records(self.kind, owner_id).await?)
    }

    pub async fn create(&self, owner_id: &str, input: &TimeRecordInput) -> Result<Vec<TimeRecord>, ServiceError> {
        validate_interval(input)?;
        let record = self.store.insert_record(self.kind, owner_id, input).await?;
        info!("Created {} {} for {}", self.kind.label(), record.id, owner_id);
        self.list(owner_id).await
    }

    pub async fn update(
        &self,
        owner_id: &str,
        id: i64,
        input: &TimeRecordInput,
    ) -> Result<Vec<TimeRecord>, ServiceError> {
        validate_interval(input)?;
        self.store.update_record(self.kind, owner_id, id, input).await?;
        info!("Updated {} {} for {}", self.kind.label(), id, owner_id);
        self.list(owner_id).await
    }

    pub async fn delete(&self, owner_id: &str, id: i64) -> Result<Vec<TimeRecord>, ServiceError> {
        self.store.delete_record(self.kind, owner_id, id).await?;
        info!("Deleted {} {} for {}", self.kind.label(), id, owner_id);
        self.list(owner_id).await
    }

    /// `None` clears the assignment.
    pub async fn assign_project(
        &self,
        owner_id: &str,
        id: i64,
        project_id: Option<i64>,
    ) -> Result<Vec<TimeRecord>, ServiceError> {
        self.store.assign_project(self.kind, owner_id, id, project_id).await?;
        info!("Assigned project {:?} to {} {} for {}", project_id, self.kind.label(), id, owner_id);
        self.list(owner_id).await
    }
}

fn validate_interval(input: &TimeRecordInput) -> Result<(), ServiceError> {
    if input.end_date < input.start_date {
        return Err(ServiceError::validation("end date cannot be before start date"));
    }
    Ok(())
}
