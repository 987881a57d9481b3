//! In-process HTTP stub for client tests.

use std::sync::{Arc, Mutex};

use axum::Router;
use uuid::Uuid;

use super::ApiClient;
use crate::state::auth::{AuthContext, AuthEvent, AuthObserver, ProfileSource, Session};

/// Serve `router` on an ephemeral local port and return its base URL.
pub(crate) async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Requests seen by a stub, as `"METHOD /path bearer"` lines.
#[derive(Clone, Default)]
pub(crate) struct Hits(Arc<Mutex<Vec<String>>>);

impl Hits {
    pub(crate) fn record(&self, method: &str, path: &str, headers: &axum::http::HeaderMap) {
        let bearer = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        self.0.lock().unwrap().push(format!("{method} {path} {bearer}"));
    }

    pub(crate) fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct NoProfiles;

#[async_trait::async_trait]
impl ProfileSource for NoProfiles {
    async fn fetch_profile(&self, _token: &str) -> Result<moodboards::UserProfile, super::ApiError> {
        Err(super::ApiError::SignedOut)
    }
}

/// An auth context already signed in as `user_id` with `token`.
pub(crate) async fn signed_in(token: &str, user_id: Uuid) -> (Arc<AuthObserver>, AuthContext) {
    let observer = Arc::new(AuthObserver::new(Arc::new(NoProfiles)));
    observer
        .handle(AuthEvent::SignedIn, Some(Session { token: token.into(), user_id }))
        .await;
    let ctx = observer.context();
    (observer, ctx)
}

/// An auth context with nobody signed in.
pub(crate) fn signed_out() -> (Arc<AuthObserver>, AuthContext) {
    let observer = Arc::new(AuthObserver::new(Arc::new(NoProfiles)));
    let ctx = observer.context();
    (observer, ctx)
}

pub(crate) fn client(base: &str) -> ApiClient {
    ApiClient::new(base)
}
