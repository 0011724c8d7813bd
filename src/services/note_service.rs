use std::sync::Arc;

use tracing::{debug, info};

use crate::database::models::{Note, NoteInput};
use crate::database::store::NOTE_NOT_FOUND;
use crate::database::NoteStore;
use crate::services::error::{require_non_blank, ServiceError};

const EMPTY_TITLE: &str = "note title cannot be empty";

#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NoteStore>,
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, owner_id: &str, input: &NoteInput) -> Result<Note, ServiceError> {
        require_non_blank(&input.title, EMPTY_TITLE)?;
        let note = self.store.insert_note(owner_id, input).await?;
        info!("Created note {} for {}", note.id, owner_id);
        Ok(note)
    }

    pub async fn get(&self, owner_id: &str, id: i64) -> Result<Note, ServiceError> {
        self.store
            .find_note(owner_id, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(NOTE_NOT_FOUND))
    }

    pub async fn list_all(&self, owner_id: &str) -> Result<Vec<Note>, ServiceError> {
        debug!("Listing notes for {}", owner_id);
        Ok(self.store.list_notes(owner_id).await?)
    }

    /// `None` lists unfiled notes.
    pub async fn list_by_folder(&self, owner_id: &str, folder_id: Option<i64>) -> Result<Vec<Note>, ServiceError> {
        debug!("Listing notes in {:?} for {}", folder_id, owner_id);
        Ok(self.store.list_notes_by_folder(owner_id, folder_id).await?)
    }

    pub async fn update(&self, owner_id: &str, id: i64, input: &NoteInput) -> Result<Note, ServiceError> {
        require_non_blank(&input.title, EMPTY_TITLE)?;
        let note = self.store.update_note(owner_id, id, input).await?;
        info!("Updated note {} for {}", id, owner_id);
        Ok(note)
    }

    pub async fn delete(&self, owner_id: &str, id: i64) -> Result<(), ServiceError> {
        self.store.delete_note(owner_id, id).await?;
        info!("Deleted note {} for {}", id, owner_id);
        Ok(())
    }
}
