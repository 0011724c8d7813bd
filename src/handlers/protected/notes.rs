use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};

use super::utils::{json_body, optional_query_id, parse_id};
use crate::app::AppState;
use crate::auth::Identity;
use crate::database::models::{Note, NoteInput};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /notes - Most recently updated first
pub async fn list(State(state): State<AppState>, Extension(identity): Extension<Identity>) -> ApiResult<Vec<Note>> {
    let notes = state.notes.list_all(&identity.subject_id).await?;
    Ok(ApiResponse::success(notes))
}

/// GET /notes/by-folder?folder_id= - Notes in one folder, or unfiled notes
pub async fn list_by_folder(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Note>> {
    let folder_id = optional_query_id(&params, &["folder_id", "folderId"])?;
    let notes = state.notes.list_by_folder(&identity.subject_id, folder_id).await?;
    Ok(ApiResponse::success(notes))
}

/// POST /notes
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<NoteInput>, JsonRejection>,
) -> ApiResult<Note> {
    let input = json_body(payload)?;
    let note = state.notes.create(&identity.subject_id, &input).await?;
    Ok(ApiResponse::created(note).with_message("note created"))
}

/// GET /notes/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Note> {
    let note = state.notes.get(&identity.subject_id, parse_id(&id)?).await?;
    Ok(ApiResponse::success(note))
}

/// PUT /notes/:id - Replace title, content and folder
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    payload: Result<Json<NoteInput>, JsonRejection>,
) -> ApiResult<Note> {
    let id = parse_id(&id)?;
    let input = json_body(payload)?;
    let note = state.notes.update(&identity.subject_id, id, &input).await?;
    Ok(ApiResponse::success(note).with_message("note updated"))
}

/// DELETE /notes/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.notes.delete(&identity.subject_id, parse_id(&id)?).await?;
    Ok(ApiResponse::message_only("note deleted"))
}
