//! Persistence client — saved boards on the server.

use moodboards::{Moodboard, SaveMoodboardRequest, SavedMoodboard, VisibilityUpdate};
use reqwest::Method;
use uuid::Uuid;

use super::{ApiClient, ApiError, ensure_success, send_json};
use crate::state::auth::AuthContext;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("cannot save for user {requested}; signed in as {signed_in}")]
    UserMismatch { requested: Uuid, signed_in: Uuid },
}

/// Where generated boards are kept.
#[async_trait::async_trait]
pub trait MoodboardStore: Send + Sync {
    /// Store `moodboard` for `user_id` as a private board, returning its id.
    async fn save(&self, moodboard: &Moodboard, user_id: Uuid) -> Result<Uuid, PersistError>;
}

pub struct PersistenceClient {
    api: ApiClient,
    auth: AuthContext,
}

impl PersistenceClient {
    #[must_use]
    pub fn new(api: ApiClient, auth: AuthContext) -> Self {
        Self { api, auth }
    }

    pub async fn fetch(&self, id: Uuid) -> Result<SavedMoodboard, PersistError> {
        let (request, _) = self.api.authed(Method::GET, &format!("/api/moodboards/{id}"), &self.auth)?;
        Ok(send_json(request).await?)
    }

    pub async fn list(&self) -> Result<Vec<SavedMoodboard>, PersistError> {
        let (request, _) = self.api.authed(Method::GET, "/api/moodboards", &self.auth)?;
        Ok(send_json(request).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), PersistError> {
        let (request, _) = self.api.authed(Method::DELETE, &format!("/api/moodboards/{id}"), &self.auth)?;
        let response = request.send().await.map_err(ApiError::from)?;
        ensure_success(response).await?;
        Ok(())
    }

    pub async fn set_visibility(&self, id: Uuid, is_public: bool) -> Result<SavedMoodboard, PersistError> {
        let (request, _) = self.api.authed(Method::PATCH, &format!("/api/moodboards/{id}"), &self.auth)?;
        Ok(send_json(request.json(&VisibilityUpdate { is_public })).await?)
    }
}

#[async_trait::async_trait]
impl MoodboardStore for PersistenceClient {
    async fn save(&self, moodboard: &Moodboard, user_id: Uuid) -> Result<Uuid, PersistError> {
        let (request, session) = self.api.authed(Method::POST, "/api/moodboards", &self.auth)?;
        if session.user_id != user_id {
            return Err(PersistError::UserMismatch { requested: user_id, signed_in: session.user_id });
        }
        let body = SaveMoodboardRequest { user_id, moodboard: moodboard.clone() };
        let saved: SavedMoodboard = send_json(request.json(&body)).await?;
        Ok(saved.id)
    }
}

#[cfg(test)]
#[path = "persist_test.rs"]
mod tests;
