//! Storage ports. Every method takes the caller's `owner_id` and must apply it
//! in the same statement that reads or mutates the row: a row owned by someone
//! else behaves exactly like a missing row.

use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Folder, FolderInput, Note, NoteInput, Project, ProjectInput, RegisterOutcome, TimeRecord,
    TimeRecordInput, TimeRecordKind, User,
};

pub const FOLDER_NOT_FOUND: &str = "folder not found";
pub const PARENT_FOLDER_NOT_FOUND: &str = "parent folder not found";
pub const NOTE_NOT_FOUND: &str = "note not found";
pub const PROJECT_NOT_FOUND: &str = "project not found";
pub const WOULD_CREATE_CYCLE: &str = "would create a cycle";

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert the user unless the id is already present. Must be atomic:
    /// concurrent calls for one id yield exactly one `Created`.
    async fn register_user(
        &self,
        id: &str,
        email: Option<&str>,
    ) -> Result<(User, RegisterOutcome), DatabaseError>;

    async fn find_user(&self, id: &str) -> Result<Option<User>, DatabaseError>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn list_projects(&self, owner_id: &str) -> Result<Vec<Project>, DatabaseError>;

    async fn insert_project(&self, owner_id: &str, input: &ProjectInput) -> Result<Project, DatabaseError>;

    async fn update_project(
        &self,
        owner_id: &str,
        id: i64,
        input: &ProjectInput,
    ) -> Result<Project, DatabaseError>;

    /// Also clears `project_id` on every time record that referenced it.
    async fn delete_project(&self, owner_id: &str, id: i64) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait FolderStore: Send + Sync {
    /// Fails with `PARENT_FOLDER_NOT_FOUND` when `parent_id` is not an owned folder.
    async fn insert_folder(&self, owner_id: &str, input: &FolderInput) -> Result<Folder, DatabaseError>;

    async fn find_folder(&self, owner_id: &str, id: i64) -> Result<Option<Folder>, DatabaseError>;

    /// Ordered by name, then id.
    async fn list_folders(&self, owner_id: &str) -> Result<Vec<Folder>, DatabaseError>;

    /// Direct children of `parent_id`, or the roots when `None`. Ordered by name, then id.
    async fn list_folders_by_parent(
        &self,
        owner_id: &str,
        parent_id: Option<i64>,
    ) -> Result<Vec<Folder>, DatabaseError>;

    /// Renames and/or reparents. Rejects a parent that is the folder itself or
    /// any of its descendants with `WOULD_CREATE_CYCLE`.
    async fn update_folder(
        &self,
        owner_id: &str,
        id: i64,
        input: &FolderInput,
    ) -> Result<Folder, DatabaseError>;

    /// Removes the folder, its whole subtree and every note filed inside it.
    async fn delete_folder(&self, owner_id: &str, id: i64) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Fails with `FOLDER_NOT_FOUND` when `folder_id` is not an owned folder.
    async fn insert_note(&self, owner_id: &str, input: &NoteInput) -> Result<Note, DatabaseError>;

    async fn find_note(&self, owner_id: &str, id: i64) -> Result<Option<Note>, DatabaseError>;

    /// Most recently updated first.
    async fn list_notes(&self, owner_id: &str) -> Result<Vec<Note>, DatabaseError>;

    /// Notes filed directly in `folder_id`, or unfiled notes when `None`.
    async fn list_notes_by_folder(
        &self,
        owner_id: &str,
        folder_id: Option<i64>,
    ) -> Result<Vec<Note>, DatabaseError>;

    async fn update_note(&self, owner_id: &str, id: i64, input: &NoteInput) -> Result<Note, DatabaseError>;

    async fn delete_note(&self, owner_id: &str, id: i64) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait TimeRecordStore: Send + Sync {
    /// Most recent `start_date` first.
    async fn list_records(&self, kind: TimeRecordKind, owner_id: &str) -> Result<Vec<TimeRecord>, DatabaseError>;

    /// Fails with `PROJECT_NOT_FOUND` when `project_id` is not an owned project.
    async fn insert_record(
        &self,
        kind: TimeRecordKind,
        owner_id: &str,
        input: &TimeRecordInput,
    ) -> Result<TimeRecord, DatabaseError>;

    async fn update_record(
        &self,
        kind: TimeRecordKind,
        owner_id: &str,
        id: i64,
        input: &TimeRecordInput,
    ) -> Result<TimeRecord, DatabaseError>;

    async fn delete_record(&self, kind: TimeRecordKind, owner_id: &str, id: i64) -> Result<(), DatabaseError>;

    /// Sets or clears the project reference of one record.
    async fn assign_project(
        &self,
        kind: TimeRecordKind,
        owner_id: &str,
        id: i64,
        project_id: Option<i64>,
    ) -> Result<TimeRecord, DatabaseError>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Everything a backend has to provide to serve the API.
pub trait Store: UserStore + ProjectStore + FolderStore + NoteStore + TimeRecordStore + HealthCheck {}

impl<T> Store for T where T: UserStore + ProjectStore + FolderStore + NoteStore + TimeRecordStore + HealthCheck {}
