//! Board controller — drives the view state from user actions.
//!
//! Owns the shared [`ViewState`] behind a mutex and calls the generator and
//! store between transitions. The lock is only taken for the synchronous
//! transition itself, never across a network call.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use moodboards::Moodboard;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::net::generate::MoodboardGenerator;
use crate::net::persist::MoodboardStore;
use crate::state::auth::AuthContext;
use crate::state::view::{Notice, Phase, RequestTicket, ViewError, ViewState};

/// What happened to the board after a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved(Uuid),
    Failed(String),
    Skipped,
}

/// Result of one `search` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    /// `None` when the result arrived for a superseded search.
    pub notice: Option<Notice>,
    pub persisted: PersistOutcome,
}

impl SearchReport {
    fn refused(err: ViewError) -> Self {
        Self { notice: Some(Notice::refused(err)), persisted: PersistOutcome::Skipped }
    }
}

pub struct BoardController {
    view: Arc<Mutex<ViewState>>,
    generator: Arc<dyn MoodboardGenerator>,
    store: Arc<dyn MoodboardStore>,
    auth: AuthContext,
    autosave: bool,
}

impl BoardController {
    #[must_use]
    pub fn new(generator: Arc<dyn MoodboardGenerator>, store: Arc<dyn MoodboardStore>, auth: AuthContext) -> Self {
        Self { view: Arc::new(Mutex::new(ViewState::new())), generator, store, auth, autosave: true }
    }

    /// Turn saving after generation on or off.
    #[must_use]
    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    fn view(&self) -> MutexGuard<'_, ViewState> {
        // Transitions replace the phase wholesale, so a poisoned state is
        // still consistent.
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.view().phase().clone()
    }

    #[must_use]
    pub fn displayed(&self) -> Option<Moodboard> {
        self.view().displayed().cloned()
    }

    /// Generate a board for `raw_keyword`, display it, then save it.
    pub async fn search(&self, raw_keyword: &str) -> SearchReport {
        let begun = self.view().begin_search(raw_keyword, self.auth.is_signed_in());
        let (ticket, keyword) = match begun {
            Ok(started) => started,
            Err(err) => {
                debug!(error = %err, "search refused");
                return SearchReport::refused(err);
            }
        };

        let result = self.generator.generate(&keyword).await;
        let board = result.as_ref().ok().cloned();
        let notice = self.view().finish_search(ticket, result);

        let Some(notice) = notice else {
            debug!(?ticket, "search result discarded: superseded");
            return SearchReport { notice: None, persisted: PersistOutcome::Skipped };
        };
        let Some(board) = board else {
            return SearchReport { notice: Some(notice), persisted: PersistOutcome::Skipped };
        };

        let persisted = self.persist(ticket, &board).await;
        SearchReport { notice: Some(notice), persisted }
    }

    async fn persist(&self, ticket: RequestTicket, board: &Moodboard) -> PersistOutcome {
        if !self.autosave {
            return PersistOutcome::Skipped;
        }
        let Some(session) = self.auth.session() else {
            debug!("save skipped: signed out");
            return PersistOutcome::Skipped;
        };
        match self.store.save(board, session.user_id).await {
            Ok(id) => {
                let attached = self.view().attach_id(ticket, id);
                info!(%id, user_id = %session.user_id, attached, "moodboard saved");
                PersistOutcome::Saved(id)
            }
            Err(e) => {
                warn!(error = %e, user_id = %session.user_id, "moodboard save failed");
                PersistOutcome::Failed(e.to_string())
            }
        }
    }

    pub fn shuffle(&self) -> Notice {
        let result = self.view().shuffle(&mut rand::rng());
        result.unwrap_or_else(Notice::refused)
    }

    pub fn replace(&self) -> Notice {
        let result = self.view().replace();
        result.unwrap_or_else(Notice::refused)
    }

    pub fn refresh_images(&self) -> Notice {
        let result = self.view().refresh_images(&mut rand::rng());
        result.unwrap_or_else(Notice::refused)
    }

    pub fn export(&self) -> Notice {
        let result = self.view().export();
        result.unwrap_or_else(Notice::refused)
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
