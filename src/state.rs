//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the database pool, the optional LLM client, the generation rate
//! limiter, and the optional email delivery settings. The server keeps no
//! per-board memory: every generation call is independent.

use std::sync::Arc;

use sqlx::PgPool;

use crate::llm::LlmChat;
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::services::email_auth::EmailDelivery;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Optional LLM client. `None` if the upstream credential is not configured.
    pub llm: Option<Arc<dyn LlmChat>>,
    /// In-memory rate limiter for generation requests.
    pub rate_limiter: RateLimiter,
    /// How access codes reach users.
    pub email: EmailDelivery,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, llm: Option<Arc<dyn LlmChat>>, rate_limits: RateLimitConfig, email: EmailDelivery) -> Self {
        Self { pool, llm, rate_limiter: RateLimiter::new(rate_limits), email }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
