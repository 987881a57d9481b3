//! Auth state observer.
//!
//! DESIGN
//! ======
//! The observer is the single writer of the signed-in identity. It owns a
//! `tokio::sync::watch` channel; consumers get an [`AuthContext`] read handle
//! passed to them explicitly. Each event replaces the snapshot wholesale, so
//! readers never see a session paired with another user's profile.
//!
//! LIFECYCLE
//! =========
//! Created at startup (signed out, or restored from a saved token), updated
//! on every identity event, dropped at shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use moodboards::UserProfile;
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::net::ApiError;

/// A live server session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// What the app currently knows about the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub session: Option<Session>,
    pub profile: Option<UserProfile>,
}

/// Where profiles come from. The HTTP implementation calls `/api/auth/me`.
#[async_trait::async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self, token: &str) -> Result<UserProfile, ApiError>;
}

pub struct AuthObserver {
    tx: watch::Sender<AuthSnapshot>,
    profiles: Arc<dyn ProfileSource>,
    /// Bumped by every event; a result lands only if no newer event started.
    epoch: AtomicU64,
}

impl AuthObserver {
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileSource>) -> Self {
        let (tx, _rx) = watch::channel(AuthSnapshot::default());
        Self { tx, profiles, epoch: AtomicU64::new(0) }
    }

    /// A read handle that follows every future update.
    #[must_use]
    pub fn context(&self) -> AuthContext {
        AuthContext { rx: self.tx.subscribe() }
    }

    /// Apply an identity event.
    ///
    /// Sign-in always re-fetches the profile. Other events carrying a session
    /// re-fetch only when the user changed or no profile is cached. A failed
    /// fetch keeps the session and leaves the profile empty.
    ///
    /// Returns `false` when a newer event arrived while the profile was being
    /// fetched; the snapshot is then left to that event.
    pub async fn handle(&self, event: AuthEvent, session: Option<Session>) -> bool {
        let epoch = self.next_epoch();
        let Some(session) = session.filter(|_| event != AuthEvent::SignedOut) else {
            debug!(?event, "auth: cleared");
            return self.apply(epoch, AuthSnapshot::default());
        };

        let current = self.tx.borrow().clone();
        let same_user = current.session.as_ref().map(|s| s.user_id) == Some(session.user_id);
        let profile = if event == AuthEvent::SignedIn || !same_user || current.profile.is_none() {
            match self.profiles.fetch_profile(&session.token).await {
                Ok(profile) => Some(profile),
                Err(e) => {
                    warn!(error = %e, user_id = %session.user_id, "auth: profile fetch failed");
                    None
                }
            }
        } else {
            current.profile
        };

        debug!(?event, user_id = %session.user_id, "auth: updated");
        self.apply(epoch, AuthSnapshot { session: Some(session), profile })
    }

    /// Apply an identity event whose profile the caller already fetched.
    /// No profile request is made.
    pub fn handle_with_profile(&self, event: AuthEvent, session: Session, profile: UserProfile) -> bool {
        let epoch = self.next_epoch();
        debug!(?event, user_id = %session.user_id, "auth: updated with known profile");
        self.apply(epoch, AuthSnapshot { session: Some(session), profile: Some(profile) })
    }

    fn next_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn apply(&self, epoch: u64, snapshot: AuthSnapshot) -> bool {
        // Compared under the channel's write lock so a newer event that
        // already landed is never overwritten.
        let applied = self.tx.send_if_modified(|current| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            *current = snapshot;
            true
        });
        if !applied {
            debug!(epoch, "auth: stale event discarded");
        }
        applied
    }
}

/// Cheap, cloneable view of the current identity.
#[derive(Debug, Clone)]
pub struct AuthContext {
    rx: watch::Receiver<AuthSnapshot>,
}

impl AuthContext {
    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.rx.borrow().clone()
    }

    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.rx.borrow().session.clone()
    }

    #[must_use]
    pub fn profile(&self) -> Option<UserProfile> {
        self.rx.borrow().profile.clone()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.rx.borrow().session.is_some()
    }

    /// Wait for the next update. Returns `false` once the observer is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
