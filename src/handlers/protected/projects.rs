use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;

use super::utils::{json_body, parse_id};
use crate::app::AppState;
use crate::auth::Identity;
use crate::database::models::{Project, ProjectInput};
use crate::middleware::{ApiResponse, ApiResult};

/// Body of `PUT /projects`: the project id travels with its fields.
#[derive(Debug, Deserialize)]
pub struct ProjectUpdate {
    #[serde(alias = "ID")]
    pub id: i64,
    #[serde(flatten)]
    pub project: ProjectInput,
}

/// GET /projects
pub async fn list(State(state): State<AppState>, Extension(identity): Extension<Identity>) -> ApiResult<Vec<Project>> {
    let projects = state.projects.list(&identity.subject_id).await?;
    Ok(ApiResponse::success(projects))
}

/// POST /projects - Responds with the caller's full project list
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<ProjectInput>, JsonRejection>,
) -> ApiResult<Vec<Project>> {
    let input = json_body(payload)?;
    let projects = state.projects.create(&identity.subject_id, &input).await?;
    Ok(ApiResponse::success(projects).with_message("project created"))
}

/// PUT /projects - Responds with the caller's full project list
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<ProjectUpdate>, JsonRejection>,
) -> ApiResult<Vec<Project>> {
    let body = json_body(payload)?;
    let projects = state
        .projects
        .update(&identity.subject_id, body.id, &body.project)
        .await?;
    Ok(ApiResponse::success(projects).with_message("project updated"))
}

/// DELETE /projects/:id - Unassigns the project from time records, responds with the list
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Project>> {
    let projects = state.projects.delete(&identity.subject_id, parse_id(&id)?).await?;
    Ok(ApiResponse::success(projects).with_message("project deleted"))
}
