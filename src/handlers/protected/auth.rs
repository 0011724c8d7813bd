use axum::{extract::State, Extension};
use serde::Serialize;

use crate::app::AppState;
use crate::auth::Identity;
use crate::database::models::{RegisterOutcome, User};
use crate::middleware::{ApiResponse, ApiResult};

/// POST /auth/login - Register the verified caller on first contact
///
/// 201 with the new user when this is the first login, 200 otherwise.
pub async fn login(State(state): State<AppState>, Extension(identity): Extension<Identity>) -> ApiResult<User> {
    let (user, outcome) = state
        .users
        .register_or_get(&identity.subject_id, identity.email.as_deref())
        .await?;

    Ok(match outcome {
        RegisterOutcome::Created => ApiResponse::created(user).with_message("user created"),
        RegisterOutcome::Existed => ApiResponse::success(user).with_message("user exists"),
    })
}

#[derive(Debug, Serialize)]
pub struct Me {
    pub subject_id: String,
    pub email: Option<String>,
    /// `None` until the caller has logged in once.
    pub user: Option<User>,
}

/// GET /auth/me - The verified identity and its stored profile
pub async fn me(State(state): State<AppState>, Extension(identity): Extension<Identity>) -> ApiResult<Me> {
    let user = state.users.find(&identity.subject_id).await?;
    Ok(ApiResponse::success(Me {
        subject_id: identity.subject_id,
        email: identity.email,
        user,
    }))
}
