//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the JSON API under a single Axum router. Every route except
//! `/healthz` and the email code exchange requires a session.

pub mod auth;
pub mod generate;
pub mod moodboards;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/generate-moodboard", post(generate::generate_moodboard))
        .route(
            "/api/moodboards",
            get(moodboards::list_moodboards).post(moodboards::create_moodboard),
        )
        .route(
            "/api/moodboards/{id}",
            get(moodboards::get_moodboard)
                .patch(moodboards::update_visibility)
                .delete(moodboards::delete_moodboard),
        )
        .route("/api/auth/email/request-code", post(auth::request_email_code))
        .route("/api/auth/email/verify-code", post(auth::verify_email_code))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
