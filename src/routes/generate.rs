//! Generation route — `POST /api/generate-moodboard`.
//!
//! Failures answer with an `{error, details}` body so clients can show a
//! message without parsing status text.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use moodboards::{ErrorBody, GenerateRequest, GeneratedMoodboard};
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::services::generation::{self, GenerationError};
use crate::state::AppState;

const SERVER_LOG_HINT: &str = "Check the server logs for more information";

/// `POST /api/generate-moodboard` — generate a board for a keyword.
pub async fn generate_moodboard(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(body)) => generation_response(&state, auth.user.id, &body.keyword).await,
        Err(rejection) => invalid_body_response(&rejection),
    }
}

/// A body that is not `{ "keyword": string }` JSON still gets an `ErrorBody`.
pub(crate) fn invalid_body_response(rejection: &JsonRejection) -> Response {
    tracing::debug!(error = %rejection, "generate: rejected request body");
    let body = ErrorBody::new("invalid request body", rejection.body_text());
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

pub(crate) async fn generation_response(state: &AppState, user_id: Uuid, keyword: &str) -> Response {
    match generation::generate(state, user_id, keyword).await {
        Ok(board) => Json(GeneratedMoodboard { moodboard: &board }).into_response(),
        Err(e) => {
            let status = generation_error_to_status(&e);
            (status, Json(error_body(&e))).into_response()
        }
    }
}

pub(crate) fn generation_error_to_status(err: &GenerationError) -> StatusCode {
    match err {
        GenerationError::EmptyKeyword | GenerationError::KeywordTooLong => StatusCode::BAD_REQUEST,
        GenerationError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        GenerationError::LlmNotConfigured
        | GenerationError::Upstream(_)
        | GenerationError::Parse(_)
        | GenerationError::Shape(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_body(err: &GenerationError) -> ErrorBody {
    let details = match err {
        GenerationError::EmptyKeyword | GenerationError::KeywordTooLong => "Provide a non-empty keyword",
        GenerationError::RateLimited(_) => "Wait a minute before generating again",
        _ => SERVER_LOG_HINT,
    };
    ErrorBody::new(err.to_string(), details)
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
