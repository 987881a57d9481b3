//! HTTP plumbing shared by the identity, generation, and persistence clients.
//!
//! Every authenticated request carries `Authorization: Bearer <token>`; the
//! token comes from the [`AuthContext`] at call time, never from a copy held
//! by a client.

pub mod generate;
pub mod identity;
pub mod persist;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::state::auth::{AuthContext, Session};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("not signed in")]
    SignedOut,
    #[error("identity changed while the request was in flight")]
    Superseded,
}

/// Base URL plus a shared connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.trim_end_matches('/').to_owned() }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    pub(crate) fn with_token(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.request(method, path).bearer_auth(token)
    }

    /// Build a request for the signed-in session in `auth`.
    pub(crate) fn authed(&self, method: Method, path: &str, auth: &AuthContext) -> Result<(RequestBuilder, Session), ApiError> {
        let session = auth.session().ok_or(ApiError::SignedOut)?;
        Ok((self.with_token(method, path, &session.token), session))
    }

    /// `GET /healthz`.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let response = self.request(Method::GET, "/healthz").send().await?;
        ensure_success(response).await.map(|_| ())
    }
}

/// Turn a non-2xx response into [`ApiError::Status`], preferring the
/// `error` field of a JSON body when there is one.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<moodboards::ErrorBody>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    Err(ApiError::Status { status: status.as_u16(), message })
}

/// Send, check status, and decode a JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = ensure_success(request.send().await?).await?;
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

#[cfg(test)]
pub(crate) mod stub;
