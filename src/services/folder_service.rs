use std::sync::Arc;

use tracing::{debug, info};

use crate::database::models::{Folder, FolderInput};
use crate::database::store::FOLDER_NOT_FOUND;
use crate::database::FolderStore;
use crate::services::error::{require_non_blank, ServiceError};

const EMPTY_NAME: &str = "folder name cannot be empty";

#[derive(Clone)]
pub struct FolderService {
    store: Arc<dyn FolderStore>,
}

impl FolderService {
    pub fn new(store: Arc<dyn FolderStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, owner_id: &str, input: &FolderInput) -> Result<Folder, ServiceError> {
        require_non_blank(&input.name, EMPTY_NAME)?;
        let folder = self.store.insert_folder(owner_id, input).await?;
        info!("Created folder {} for {}", folder.id, owner_id);
        Ok(folder)
    }

    pub async fn get(&self, owner_id: &str, id: i64) -> Result<Folder, ServiceError> {
        self.store
            .find_folder(owner_id, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(FOLDER_NOT_FOUND))
    }

    pub async fn list_all(&self, owner_id: &str) -> Result<Vec<Folder>, ServiceError> {
        debug!("Listing folders for {}", owner_id);
        Ok(self.store.list_folders(owner_id).await?)
    }

    /// `None` lists the root folders.
    pub async fn list_by_parent(&self, owner_id: &str, parent_id: Option<i64>) -> Result<Vec<Folder>, ServiceError> {
        debug!("Listing folders under {:?} for {}", parent_id, owner_id);
        Ok(self.store.list_folders_by_parent(owner_id, parent_id).await?)
    }

    pub async fn update(&self, owner_id: &str, id: i64, input: &FolderInput) -> Result<Folder, ServiceError> {
        require_non_blank(&input.name, EMPTY_NAME)?;
        if input.parent_id == Some(id) {
            return Err(ServiceError::validation("a folder cannot be its own parent"));
        }

        let folder = self.store.update_folder(owner_id, id, input).await?;
        info!("Updated folder {} for {}", id, owner_id);
        Ok(folder)
    }

    /// Removes the folder together with its subfolders and their notes.
    pub async fn delete(&self, owner_id: &str, id: i64) -> Result<(), ServiceError> {
        self.store.delete_folder(owner_id, id).await?;
        info!("Deleted folder {} for {}", id, owner_id);
        Ok(())
    }
}
