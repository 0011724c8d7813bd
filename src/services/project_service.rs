use std::sync::Arc;

use tracing::{debug, info};

use crate::database::models::{Project, ProjectInput};
use crate::database::ProjectStore;
use crate::services::error::{require_non_blank, ServiceError};

/// Project operations. Every mutation answers with the owner's full list.
#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn ProjectStore>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, owner_id: &str) -> Result<Vec<Project>, ServiceError> {
        debug!("Listing projects for {}", owner_id);
        Ok(self.store.list_projects(owner_id).await?)
    }

    pub async fn create(&self, owner_id: &str, input: &ProjectInput) -> Result<Vec<Project>, ServiceError> {
        require_non_blank(&input.name, "project name cannot be empty")?;
        let project = self.store.insert_project(owner_id, input).await?;
        info!("Created project {} for {}", project.id, owner_id);
        self.list(owner_id).await
    }

    pub async fn update(
        &self,
        owner_id: &str,
        id: i64,
        input: &ProjectInput,
    ) -> Result<Vec<Project>, ServiceError> {
        require_non_blank(&input.name, "project name cannot be empty")?;
        self.store.update_project(owner_id, id, input).await?;
        info!("Updated project {} for {}", id, owner_id);
        self.list(owner_id).await
    }

    pub async fn delete(&self, owner_id: &str, id: i64) -> Result<Vec<Project>, ServiceError> {
        self.store.delete_project(owner_id, id).await?;
        info!("Deleted project {} for {}", id, owner_id);
        self.list(owner_id).await
    }
}
