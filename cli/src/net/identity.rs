//! Identity client — email sign-in against the server.
//!
//! Each successful call reports an [`AuthEvent`] to the observer, which is
//! the only place the signed-in identity changes.

use std::sync::Arc;

use moodboards::{RequestCodeBody, RequestCodeResponse, SessionToken, UserProfile, VerifyCodeBody};
use reqwest::Method;
use tracing::info;

use super::{ApiClient, ApiError, ensure_success, send_json};
use crate::state::auth::{AuthContext, AuthEvent, AuthObserver, ProfileSource, Session};

#[async_trait::async_trait]
impl ProfileSource for ApiClient {
    async fn fetch_profile(&self, token: &str) -> Result<UserProfile, ApiError> {
        send_json(self.with_token(Method::GET, "/api/auth/me", token)).await
    }
}

pub struct IdentityClient {
    api: ApiClient,
    observer: Arc<AuthObserver>,
}

impl IdentityClient {
    #[must_use]
    pub fn new(api: ApiClient, observer: Arc<AuthObserver>) -> Self {
        Self { api, observer }
    }

    #[must_use]
    pub fn context(&self) -> AuthContext {
        self.observer.context()
    }

    /// Ask the server to email a sign-in code.
    pub async fn request_code(&self, email: &str, display_name: Option<&str>) -> Result<RequestCodeResponse, ApiError> {
        let body = RequestCodeBody { email: email.to_owned(), display_name: display_name.map(str::to_owned) };
        send_json(self.api.request(Method::POST, "/api/auth/email/request-code").json(&body)).await
    }

    /// Exchange a code for a session and sign in.
    pub async fn verify_code(&self, email: &str, code: &str) -> Result<Session, ApiError> {
        let body = VerifyCodeBody { email: email.to_owned(), code: code.to_owned() };
        let SessionToken { token } =
            send_json(self.api.request(Method::POST, "/api/auth/email/verify-code").json(&body)).await?;
        self.sign_in(token).await
    }

    /// Sign in with a token obtained earlier.
    pub async fn restore(&self, token: &str) -> Result<Session, ApiError> {
        self.sign_in(token.to_owned()).await
    }

    async fn sign_in(&self, token: String) -> Result<Session, ApiError> {
        // The profile fetched here doubles as the observer's, so /me is hit once.
        let profile = self.api.fetch_profile(&token).await?;
        let session = Session { token, user_id: profile.id };
        if !self.observer.handle_with_profile(AuthEvent::SignedIn, session.clone(), profile) {
            return Err(ApiError::Superseded);
        }
        info!(user_id = %session.user_id, "signed in");
        Ok(session)
    }

    /// Rotate the current session token.
    pub async fn refresh(&self) -> Result<Session, ApiError> {
        let (request, current) = self.api.authed(Method::POST, "/api/auth/refresh", &self.observer.context())?;
        let SessionToken { token } = send_json(request).await?;
        let session = Session { token, user_id: current.user_id };
        self.observer.handle(AuthEvent::TokenRefreshed, Some(session.clone())).await;
        Ok(session)
    }

    /// End the session. The local identity is cleared even if the server
    /// call fails.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = match self.api.authed(Method::POST, "/api/auth/logout", &self.observer.context()) {
            Ok((request, _)) => match request.send().await {
                Ok(response) => ensure_success(response).await.map(|_| ()),
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e),
        };
        self.observer.handle(AuthEvent::SignedOut, None).await;
        result
    }
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
