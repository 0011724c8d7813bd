//! In-process backend selected with `DATABASE_URL=memory://`.
//!
//! One `RwLock` guards the whole state, so each operation observes and mutates
//! a consistent snapshot the same way a single SQL statement would.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Folder, FolderInput, Note, NoteInput, Project, ProjectInput, RegisterOutcome, TimeRecord,
    TimeRecordInput, TimeRecordKind, User,
};
use crate::database::store::{
    FolderStore, HealthCheck, NoteStore, ProjectStore, TimeRecordStore, UserStore, FOLDER_NOT_FOUND,
    NOTE_NOT_FOUND, PARENT_FOLDER_NOT_FOUND, PROJECT_NOT_FOUND, WOULD_CREATE_CYCLE,
};

#[derive(Default)]
struct State {
    users: HashMap<String, User>,
    projects: BTreeMap<i64, Project>,
    folders: BTreeMap<i64, Folder>,
    notes: BTreeMap<i64, Note>,
    records: HashMap<TimeRecordKind, BTreeMap<i64, TimeRecord>>,
    sequences: HashMap<&'static str, i64>,
}

impl State {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let counter = self.sequences.entry(table).or_insert(0);
        *counter += 1;
        *counter
    }

    fn owns_folder(&self, owner_id: &str, id: i64) -> bool {
        self.folders.get(&id).is_some_and(|f| f.owner_id == owner_id)
    }

    fn owns_project(&self, owner_id: &str, id: i64) -> bool {
        self.projects.get(&id).is_some_and(|p| p.owner_id == owner_id)
    }

    /// True when `needle` is `start` or one of its ancestors.
    fn is_ancestor_or_self(&self, owner_id: &str, start: i64, needle: i64) -> bool {
        let mut cursor = Some(start);
        let mut steps = 0usize;
        while let Some(id) = cursor {
            if id == needle {
                return true;
            }
            // A corrupt chain longer than the table cannot be a real ancestry.
            steps += 1;
            if steps > self.folders.len() {
                return true;
            }
            cursor = self
                .folders
                .get(&id)
                .filter(|f| f.owner_id == owner_id)
                .and_then(|f| f.parent_id);
        }
        false
    }

    fn records_mut(&mut self, kind: TimeRecordKind) -> &mut BTreeMap<i64, TimeRecord> {
        self.records.entry(kind).or_default()
    }

    fn owned_record_mut(&mut self, kind: TimeRecordKind, owner_id: &str, id: i64) -> Option<&mut TimeRecord> {
        self.records_mut(kind)
            .get_mut(&id)
            .filter(|r| r.owner_id == owner_id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn register_user(
        &self,
        id: &str,
        email: Option<&str>,
    ) -> Result<(User, RegisterOutcome), DatabaseError> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.users.get(id) {
            return Ok((existing.clone(), RegisterOutcome::Existed));
        }

        let user = User {
            id: id.to_string(),
            email: email.map(str::to_string),
            created_at: Utc::now(),
        };
        state.users.insert(user.id.clone(), user.clone());
        Ok((user, RegisterOutcome::Created))
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.state.read().await.users.get(id).cloned())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn list_projects(&self, owner_id: &str) -> Result<Vec<Project>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .projects
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert_project(&self, owner_id: &str, input: &ProjectInput) -> Result<Project, DatabaseError> {
        let mut state = self.state.write().await;
        let project = Project {
            id: state.next_id("projects"),
            owner_id: owner_id.to_string(),
            name: input.name.clone(),
            description: input.description.clone(),
            color: input.color.clone(),
        };
        state.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        owner_id: &str,
        id: i64,
        input: &ProjectInput,
    ) -> Result<Project, DatabaseError> {
        let mut state = self.state.write().await;
        let project = state
            .projects
            .get_mut(&id)
            .filter(|p| p.owner_id == owner_id)
            .ok_or_else(|| DatabaseError::not_found(PROJECT_NOT_FOUND))?;

        project.name = input.name.clone();
        project.description = input.description.clone();
        project.color = input.color.clone();
        Ok(project.clone())
    }

    async fn delete_project(&self, owner_id: &str, id: i64) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        if !state.owns_project(owner_id, id) {
            return Err(DatabaseError::not_found(PROJECT_NOT_FOUND));
        }
        state.projects.remove(&id);

        for kind in TimeRecordKind::ALL {
            for record in state.records_mut(kind).values_mut() {
                if record.project_id == Some(id) {
                    record.project_id = None;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FolderStore for MemoryStore {
    async fn insert_folder(&self, owner_id: &str, input: &FolderInput) -> Result<Folder, DatabaseError> {
        let mut state = self.state.write().await;
        if let Some(parent_id) = input.parent_id {
            if !state.owns_folder(owner_id, parent_id) {
                return Err(DatabaseError::not_found(PARENT_FOLDER_NOT_FOUND));
            }
        }

        let now = Utc::now();
        let folder = Folder {
            id: state.next_id("folders"),
            owner_id: owner_id.to_string(),
            name: input.name.clone(),
            parent_id: input.parent_id,
            created_at: now,
            updated_at: now,
        };
        state.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn find_folder(&self, owner_id: &str, id: i64) -> Result<Option<Folder>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.folders.get(&id).filter(|f| f.owner_id == owner_id).cloned())
    }

    async fn list_folders(&self, owner_id: &str) -> Result<Vec<Folder>, DatabaseError> {
        let state = self.state.read().await;
        let mut folders: Vec<Folder> = state
            .folders
            .values()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(folders)
    }

    async fn list_folders_by_parent(
        &self,
        owner_id: &str,
        parent_id: Option<i64>,
    ) -> Result<Vec<Folder>, DatabaseError> {
        let state = self.state.read().await;
        let mut folders: Vec<Folder> = state
            .folders
            .values()
            .filter(|f| f.owner_id == owner_id && f.parent_id == parent_id)
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(folders)
    }

    async fn update_folder(
        &self,
        owner_id: &str,
        id: i64,
        input: &FolderInput,
    ) -> Result<Folder, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.owns_folder(owner_id, id) {
            return Err(DatabaseError::not_found(FOLDER_NOT_FOUND));
        }

        if let Some(parent_id) = input.parent_id {
            if !state.owns_folder(owner_id, parent_id) {
                return Err(DatabaseError::not_found(PARENT_FOLDER_NOT_FOUND));
            }
            if state.is_ancestor_or_self(owner_id, parent_id, id) {
                return Err(DatabaseError::invalid(WOULD_CREATE_CYCLE));
            }
        }

        let folder = state
            .folders
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::not_found(FOLDER_NOT_FOUND))?;
        folder.name = input.name.clone();
        folder.parent_id = input.parent_id;
        folder.updated_at = Utc::now();
        Ok(folder.clone())
    }

    async fn delete_folder(&self, owner_id: &str, id: i64) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        if !state.owns_folder(owner_id, id) {
            return Err(DatabaseError::not_found(FOLDER_NOT_FOUND));
        }

        // Breadth-first collection of the subtree rooted at `id`.
        let mut doomed = vec![id];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let current = doomed[cursor];
            doomed.extend(
                state
                    .folders
                    .values()
                    .filter(|f| f.owner_id == owner_id && f.parent_id == Some(current))
                    .map(|f| f.id),
            );
            cursor += 1;
        }

        for folder_id in &doomed {
            state.folders.remove(folder_id);
        }
        state
            .notes
            .retain(|_, n| !(n.owner_id == owner_id && n.folder_id.is_some_and(|f| doomed.contains(&f))));
        Ok(())
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn insert_note(&self, owner_id: &str, input: &NoteInput) -> Result<Note, DatabaseError> {
        let mut state = self.state.write().await;
        if let Some(folder_id) = input.folder_id {
            if !state.owns_folder(owner_id, folder_id) {
                return Err(DatabaseError::not_found(FOLDER_NOT_FOUND));
            }
        }

        let now = Utc::now();
        let note = Note {
            id: state.next_id("notes"),
            owner_id: owner_id.to_string(),
            title: input.title.clone(),
            content: input.content.clone(),
            folder_id: input.folder_id,
            created_at: now,
            updated_at: now,
        };
        state.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn find_note(&self, owner_id: &str, id: i64) -> Result<Option<Note>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.notes.get(&id).filter(|n| n.owner_id == owner_id).cloned())
    }

    async fn list_notes(&self, owner_id: &str) -> Result<Vec<Note>, DatabaseError> {
        let state = self.state.read().await;
        let mut notes: Vec<Note> = state
            .notes
            .values()
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(notes)
    }

    async fn list_notes_by_folder(
        &self,
        owner_id: &str,
        folder_id: Option<i64>,
    ) -> Result<Vec<Note>, DatabaseError> {
        let state = self.state.read().await;
        let mut notes: Vec<Note> = state
            .notes
            .values()
            .filter(|n| n.owner_id == owner_id && n.folder_id == folder_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(notes)
    }

    async fn update_note(&self, owner_id: &str, id: i64, input: &NoteInput) -> Result<Note, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.notes.get(&id).is_some_and(|n| n.owner_id == owner_id) {
            return Err(DatabaseError::not_found(NOTE_NOT_FOUND));
        }
        if let Some(folder_id) = input.folder_id {
            if !state.owns_folder(owner_id, folder_id) {
                return Err(DatabaseError::not_found(FOLDER_NOT_FOUND));
            }
        }

        let note = state
            .notes
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::not_found(NOTE_NOT_FOUND))?;
        note.title = input.title.clone();
        note.content = input.content.clone();
        note.folder_id = input.folder_id;
        note.updated_at = Utc::now();
        Ok(note.clone())
    }

    async fn delete_note(&self, owner_id: &str, id: i64) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        if !state.notes.get(&id).is_some_and(|n| n.owner_id == owner_id) {
            return Err(DatabaseError::not_found(NOTE_NOT_FOUND));
        }
        state.notes.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl TimeRecordStore for MemoryStore {
    async fn list_records(&self, kind: TimeRecordKind, owner_id: &str) -> Result<Vec<TimeRecord>, DatabaseError> {
        let state = self.state.read().await;
        let mut records: Vec<TimeRecord> = state
            .records
            .get(&kind)
            .map(|table| {
                table
                    .values()
                    .filter(|r| r.owner_id == owner_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        records.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn insert_record(
        &self,
        kind: TimeRecordKind,
        owner_id: &str,
        input: &TimeRecordInput,
    ) -> Result<TimeRecord, DatabaseError> {
        let mut state = self.state.write().await;
        if let Some(project_id) = input.project_id {
            if !state.owns_project(owner_id, project_id) {
                return Err(DatabaseError::not_found(PROJECT_NOT_FOUND));
            }
        }

        let record = TimeRecord {
            id: state.next_id(kind.table()),
            owner_id: owner_id.to_string(),
            description: input.description.clone(),
            project_id: input.project_id,
            start_date: input.start_date,
            end_date: input.end_date,
        };
        state.records_mut(kind).insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        kind: TimeRecordKind,
        owner_id: &str,
        id: i64,
        input: &TimeRecordInput,
    ) -> Result<TimeRecord, DatabaseError> {
        let mut state = self.state.write().await;
        if state.owned_record_mut(kind, owner_id, id).is_none() {
            return Err(DatabaseError::not_found(kind.not_found_message()));
        }
        if let Some(project_id) = input.project_id {
            if !state.owns_project(owner_id, project_id) {
                return Err(DatabaseError::not_found(PROJECT_NOT_FOUND));
            }
        }

        let record = state
            .owned_record_mut(kind, owner_id, id)
            .ok_or_else(|| DatabaseError::not_found(kind.not_found_message()))?;
        record.description = input.description.clone();
        record.project_id = input.project_id;
        record.start_date = input.start_date;
        record.end_date = input.end_date;
        Ok(record.clone())
    }

    async fn delete_record(&self, kind: TimeRecordKind, owner_id: &str, id: i64) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        if state.owned_record_mut(kind, owner_id, id).is_none() {
            return Err(DatabaseError::not_found(kind.not_found_message()));
        }
        state.records_mut(kind).remove(&id);
        Ok(())
    }

    async fn assign_project(
        &self,
        kind: TimeRecordKind,
        owner_id: &str,
        id: i64,
        project_id: Option<i64>,
    ) -> Result<TimeRecord, DatabaseError> {
        let mut state = self.state.write().await;
        if state.owned_record_mut(kind, owner_id, id).is_none() {
            return Err(DatabaseError::not_found(kind.not_found_message()));
        }
        if let Some(project_id) = project_id {
            if !state.owns_project(owner_id, project_id) {
                return Err(DatabaseError::not_found(PROJECT_NOT_FOUND));
            }
        }

        let record = state
            .owned_record_mut(kind, owner_id, id)
            .ok_or_else(|| DatabaseError::not_found(kind.not_found_message()))?;
        record.project_id = project_id;
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn folder(name: &str, parent_id: Option<i64>) -> FolderInput {
        FolderInput {
            name: name.to_string(),
            parent_id,
        }
    }

    fn note(title: &str, folder_id: Option<i64>) -> NoteInput {
        NoteInput {
            title: title.to_string(),
            content: String::new(),
            folder_id,
        }
    }

    fn record(project_id: Option<i64>, offset_hours: i64) -> TimeRecordInput {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::hours(offset_hours);
        TimeRecordInput {
            description: "work".to_string(),
            project_id,
            start_date: start,
            end_date: start + Duration::minutes(45),
        }
    }

    fn message(err: DatabaseError) -> String {
        err.to_string()
    }

    #[tokio::test]
    async fn ids_are_sequential_per_table() {
        let store = MemoryStore::new();
        let a = store.insert_folder("u1", &folder("A", None)).await.unwrap();
        let b = store.insert_folder("u2", &folder("B", None)).await.unwrap();
        let n = store.insert_note("u1", &note("N", None)).await.unwrap();
        assert_eq!((a.id, b.id, n.id), (1, 2, 1));
    }

    #[tokio::test]
    async fn foreign_parent_is_reported_as_missing() {
        let store = MemoryStore::new();
        let work = store.insert_folder("u1", &folder("Work", None)).await.unwrap();
        let err = store.insert_folder("u2", &folder("Bad", Some(work.id))).await.unwrap_err();
        assert_eq!(message(err), PARENT_FOLDER_NOT_FOUND);
        assert!(store.list_folders("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_move_under_descendant() {
        let store = MemoryStore::new();
        let a = store.insert_folder("u1", &folder("A", None)).await.unwrap();
        let b = store.insert_folder("u1", &folder("B", Some(a.id))).await.unwrap();
        let c = store.insert_folder("u1", &folder("C", Some(b.id))).await.unwrap();

        let err = store.update_folder("u1", a.id, &folder("A", Some(c.id))).await.unwrap_err();
        assert_eq!(message(err), WOULD_CREATE_CYCLE);

        let err = store.update_folder("u1", a.id, &folder("A", Some(a.id))).await.unwrap_err();
        assert_eq!(message(err), WOULD_CREATE_CYCLE);

        // Moving a leaf to the root and back under a sibling branch is fine.
        let moved = store.update_folder("u1", c.id, &folder("C", None)).await.unwrap();
        assert_eq!(moved.parent_id, None);
        let moved = store.update_folder("u1", b.id, &folder("B", Some(c.id))).await.unwrap();
        assert_eq!(moved.parent_id, Some(c.id));
    }

    #[tokio::test]
    async fn folder_delete_cascades_to_subtree_and_notes() {
        let store = MemoryStore::new();
        let root = store.insert_folder("u1", &folder("Root", None)).await.unwrap();
        let child = store.insert_folder("u1", &folder("Child", Some(root.id))).await.unwrap();
        let grandchild = store.insert_folder("u1", &folder("Leaf", Some(child.id))).await.unwrap();
        let other = store.insert_folder("u1", &folder("Other", None)).await.unwrap();

        store.insert_note("u1", &note("deep", Some(grandchild.id))).await.unwrap();
        let kept = store.insert_note("u1", &note("kept", Some(other.id))).await.unwrap();
        let loose = store.insert_note("u1", &note("loose", None)).await.unwrap();

        store.delete_folder("u1", root.id).await.unwrap();

        let folders = store.list_folders("u1").await.unwrap();
        assert_eq!(folders.iter().map(|f| f.id).collect::<Vec<_>>(), vec![other.id]);
        let mut notes: Vec<i64> = store.list_notes("u1").await.unwrap().iter().map(|n| n.id).collect();
        notes.sort();
        assert_eq!(notes, vec![kept.id, loose.id]);
    }

    #[tokio::test]
    async fn note_update_distinguishes_missing_note_from_missing_folder() {
        let store = MemoryStore::new();
        let n = store.insert_note("u1", &note("a", None)).await.unwrap();
        let foreign = store.insert_folder("u2", &folder("theirs", None)).await.unwrap();

        let err = store.update_note("u1", n.id, &note("a", Some(foreign.id))).await.unwrap_err();
        assert_eq!(message(err), FOLDER_NOT_FOUND);

        let err = store.update_note("u2", n.id, &note("a", None)).await.unwrap_err();
        assert_eq!(message(err), NOTE_NOT_FOUND);
    }

    #[tokio::test]
    async fn project_delete_unassigns_records_of_both_kinds() {
        let store = MemoryStore::new();
        let project = store
            .insert_project("u1", &ProjectInput { name: "P".into(), ..Default::default() })
            .await
            .unwrap();
        for kind in TimeRecordKind::ALL {
            store.insert_record(kind, "u1", &record(Some(project.id), 0)).await.unwrap();
        }

        store.delete_project("u1", project.id).await.unwrap();

        for kind in TimeRecordKind::ALL {
            let records = store.list_records(kind, "u1").await.unwrap();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].project_id, None);
        }
    }

    #[tokio::test]
    async fn record_kinds_are_stored_independently() {
        let store = MemoryStore::new();
        let entry = store.insert_record(TimeRecordKind::Entry, "u1", &record(None, 0)).await.unwrap();

        let err = store
            .delete_record(TimeRecordKind::TimeBox, "u1", entry.id)
            .await
            .unwrap_err();
        assert_eq!(message(err), "time box entry not found");
        assert_eq!(store.list_records(TimeRecordKind::Entry, "u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn records_list_latest_start_first() {
        let store = MemoryStore::new();
        let early = store.insert_record(TimeRecordKind::Entry, "u1", &record(None, 0)).await.unwrap();
        let late = store.insert_record(TimeRecordKind::Entry, "u1", &record(None, 3)).await.unwrap();

        let ids: Vec<i64> = store
            .list_records(TimeRecordKind::Entry, "u1")
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![late.id, early.id]);
    }

    #[tokio::test]
    async fn assign_rejects_foreign_project() {
        let store = MemoryStore::new();
        let theirs = store
            .insert_project("u2", &ProjectInput { name: "Theirs".into(), ..Default::default() })
            .await
            .unwrap();
        let entry = store.insert_record(TimeRecordKind::Entry, "u1", &record(None, 0)).await.unwrap();

        let err = store
            .assign_project(TimeRecordKind::Entry, "u1", entry.id, Some(theirs.id))
            .await
            .unwrap_err();
        assert_eq!(message(err), PROJECT_NOT_FOUND);
    }
}
