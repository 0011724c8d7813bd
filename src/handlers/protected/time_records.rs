// Time entries and time-box entries share one set of handlers; the route
// marker picks the record kind at compile time.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;

use super::utils::{json_body, parse_id};
use crate::app::AppState;
use crate::auth::Identity;
use crate::database::models::{TimeRecord, TimeRecordInput, TimeRecordKind};
use crate::middleware::{ApiResponse, ApiResult};

pub trait RecordRoute: Send + Sync + 'static {
    const KIND: TimeRecordKind;
    const PATH: &'static str;
}

pub struct Entries;

impl RecordRoute for Entries {
    const KIND: TimeRecordKind = TimeRecordKind::Entry;
    const PATH: &'static str = "/time-entries";
}

pub struct TimeBoxes;

impl RecordRoute for TimeBoxes {
    const KIND: TimeRecordKind = TimeRecordKind::TimeBox;
    const PATH: &'static str = "/time-box-entries";
}

/// Body of `PUT`: the record id travels with its fields.
#[derive(Debug, Deserialize)]
pub struct TimeRecordUpdate {
    #[serde(alias = "ID")]
    pub id: i64,
    #[serde(flatten)]
    pub record: TimeRecordInput,
}

#[derive(Debug, Deserialize)]
pub struct AssignProject {
    /// `null` or absent clears the assignment.
    #[serde(default, alias = "projectId", alias = "ProjectID")]
    pub project_id: Option<i64>,
}

/// GET /{kind} - Latest start first
pub async fn list<K: RecordRoute>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Vec<TimeRecord>> {
    let records = state.time_records(K::KIND).list(&identity.subject_id).await?;
    Ok(ApiResponse::success(records))
}

/// POST /{kind} - Responds with the caller's full list
pub async fn create<K: RecordRoute>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<TimeRecordInput>, JsonRejection>,
) -> ApiResult<Vec<TimeRecord>> {
    let input = json_body(payload)?;
    let records = state.time_records(K::KIND).create(&identity.subject_id, &input).await?;
    Ok(ApiResponse::success(records).with_message(format!("{} created", K::KIND.label())))
}

/// PUT /{kind} - Responds with the caller's full list
pub async fn update<K: RecordRoute>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<TimeRecordUpdate>, JsonRejection>,
) -> ApiResult<Vec<TimeRecord>> {
    let body = json_body(payload)?;
    let records = state
        .time_records(K::KIND)
        .update(&identity.subject_id, body.id, &body.record)
        .await?;
    Ok(ApiResponse::success(records).with_message(format!("{} updated", K::KIND.label())))
}

/// DELETE /{kind}/:id - Responds with the caller's full list
pub async fn delete<K: RecordRoute>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Vec<TimeRecord>> {
    let records = state
        .time_records(K::KIND)
        .delete(&identity.subject_id, parse_id(&id)?)
        .await?;
    Ok(ApiResponse::success(records).with_message(format!("{} deleted", K::KIND.label())))
}

/// PATCH /{kind}/:id/assign-project - Set or clear the project
pub async fn assign_project<K: RecordRoute>(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    payload: Result<Json<AssignProject>, JsonRejection>,
) -> ApiResult<Vec<TimeRecord>> {
    let id = parse_id(&id)?;
    let body = json_body(payload)?;
    let records = state
        .time_records(K::KIND)
        .assign_project(&identity.subject_id, id, body.project_id)
        .await?;
    Ok(ApiResponse::success(records).with_message("project assigned"))
}
