use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};

use super::utils::{json_body, optional_query_id, parse_id};
use crate::app::AppState;
use crate::auth::Identity;
use crate::database::models::{Folder, FolderInput};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /folders - All of the caller's folders, by name
pub async fn list(State(state): State<AppState>, Extension(identity): Extension<Identity>) -> ApiResult<Vec<Folder>> {
    let folders = state.folders.list_all(&identity.subject_id).await?;
    Ok(ApiResponse::success(folders))
}

/// GET /folders/by-parent?parent_id= - Direct children, or roots without a parent id
pub async fn list_by_parent(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Folder>> {
    let parent_id = optional_query_id(&params, &["parent_id", "parentId"])?;
    let folders = state.folders.list_by_parent(&identity.subject_id, parent_id).await?;
    Ok(ApiResponse::success(folders))
}

/// POST /folders - Create a folder, optionally under a parent
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<FolderInput>, JsonRejection>,
) -> ApiResult<Folder> {
    let input = json_body(payload)?;
    let folder = state.folders.create(&identity.subject_id, &input).await?;
    Ok(ApiResponse::created(folder).with_message("folder created"))
}

/// GET /folders/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Folder> {
    let folder = state.folders.get(&identity.subject_id, parse_id(&id)?).await?;
    Ok(ApiResponse::success(folder))
}

/// PUT /folders/:id - Rename and/or move
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    payload: Result<Json<FolderInput>, JsonRejection>,
) -> ApiResult<Folder> {
    let id = parse_id(&id)?;
    let input = json_body(payload)?;
    let folder = state.folders.update(&identity.subject_id, id, &input).await?;
    Ok(ApiResponse::success(folder).with_message("folder updated"))
}

/// DELETE /folders/:id - Removes the subtree and the notes filed in it
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.folders.delete(&identity.subject_id, parse_id(&id)?).await?;
    Ok(ApiResponse::message_only("folder deleted"))
}
