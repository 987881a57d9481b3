//! Generation client — one POST per keyword.
//!
//! No retry, cache, de-duplication, or cancellation. Every failure keeps its
//! own variant for the logs; callers show them all as one notice.

use moodboards::{GenerateRequest, GenerateResponse, Moodboard, ShapeError, normalize_keyword};
use reqwest::Method;
use tracing::{debug, warn};

use super::{ApiClient, ApiError, ensure_success};
use crate::state::auth::AuthContext;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("keyword is empty")]
    EmptyKeyword,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("response has no moodboard")]
    MissingMoodboard,
    #[error("moodboard has the wrong shape: {0}")]
    Shape(#[from] ShapeError),
}

/// Turns a keyword into a moodboard.
#[async_trait::async_trait]
pub trait MoodboardGenerator: Send + Sync {
    async fn generate(&self, keyword: &str) -> Result<Moodboard, GenerateError>;
}

pub struct GenerationClient {
    api: ApiClient,
    auth: AuthContext,
}

impl GenerationClient {
    #[must_use]
    pub fn new(api: ApiClient, auth: AuthContext) -> Self {
        Self { api, auth }
    }

    async fn request(&self, keyword: &str) -> Result<Moodboard, GenerateError> {
        let keyword = normalize_keyword(keyword).ok_or(GenerateError::EmptyKeyword)?;
        let (request, _) = self.api.authed(Method::POST, "/api/generate-moodboard", &self.auth)?;

        debug!(keyword_len = keyword.len(), "generate: sending");
        let response = request
            .json(&GenerateRequest { keyword: keyword.clone() })
            .send()
            .await
            .map_err(ApiError::from)?;
        let text = ensure_success(response)
            .await?
            .text()
            .await
            .map_err(ApiError::from)?;

        let body: GenerateResponse = serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?;
        let draft = body.moodboard.ok_or(GenerateError::MissingMoodboard)?;
        let board = draft.complete(&keyword);
        board.validate()?;
        Ok(board)
    }
}

#[async_trait::async_trait]
impl MoodboardGenerator for GenerationClient {
    async fn generate(&self, keyword: &str) -> Result<Moodboard, GenerateError> {
        self.request(keyword).await.inspect_err(|e| {
            warn!(error = %e, "generate: failed");
        })
    }
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
