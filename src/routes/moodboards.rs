//! Saved moodboard routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use moodboards::{SaveMoodboardRequest, SavedMoodboard, VisibilityUpdate};
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::services::moodboard::{self, MoodboardError};
use crate::state::AppState;

/// `POST /api/moodboards` — save a board for the signed-in user.
pub async fn create_moodboard(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<SaveMoodboardRequest>,
) -> Result<Response, StatusCode> {
    let saved = moodboard::save_for_user(&state.pool, auth.user.id, &body)
        .await
        .map_err(moodboard_error_to_status)?;
    Ok((StatusCode::CREATED, Json(saved)).into_response())
}

/// `GET /api/moodboards` — list the caller's boards.
pub async fn list_moodboards(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<SavedMoodboard>>, StatusCode> {
    let rows = moodboard::list_moodboards(&state.pool, auth.user.id)
        .await
        .map_err(moodboard_error_to_status)?;
    Ok(Json(rows))
}

/// `GET /api/moodboards/{id}` — fetch one visible board.
pub async fn get_moodboard(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SavedMoodboard>, StatusCode> {
    let row = moodboard::get_moodboard(&state.pool, id, auth.user.id)
        .await
        .map_err(moodboard_error_to_status)?;
    Ok(Json(row))
}

/// `PATCH /api/moodboards/{id}` — share or unshare an owned board.
pub async fn update_visibility(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<VisibilityUpdate>,
) -> Result<Json<SavedMoodboard>, StatusCode> {
    let row = moodboard::set_visibility(&state.pool, id, auth.user.id, body.is_public)
        .await
        .map_err(moodboard_error_to_status)?;
    Ok(Json(row))
}

/// `DELETE /api/moodboards/{id}` — delete an owned board.
pub async fn delete_moodboard(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    moodboard::delete_moodboard(&state.pool, id, auth.user.id)
        .await
        .map_err(moodboard_error_to_status)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn moodboard_error_to_status(err: MoodboardError) -> StatusCode {
    match err {
        MoodboardError::NotFound(_) => StatusCode::NOT_FOUND,
        MoodboardError::Forbidden => StatusCode::FORBIDDEN,
        MoodboardError::Invalid(_) => StatusCode::BAD_REQUEST,
        MoodboardError::Database(e) => {
            tracing::error!(error = %e, "moodboard query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "moodboards_test.rs"]
mod tests;
