//! Moodboard view state machine.
//!
//! DESIGN
//! ======
//! `Empty → Generating → Displayed`, with `Displayed → Generating` on a new
//! search and `Generating → Empty` on failure. Every search is stamped with a
//! [`RequestTicket`]; a result is applied only while its ticket is current,
//! so a slow response can never overwrite a newer one.
//!
//! Board edits (shuffle, replace, refresh, export) need a displayed board and
//! are refused while a search is in flight. Each transition yields a
//! [`Notice`] for the user.

use moodboards::{Moodboard, normalize_keyword};
use rand::Rng;
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

/// Identifies one search. Tickets only grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Generating { ticket: RequestTicket, keyword: String },
    Displayed(Moodboard),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("enter a keyword to generate a moodboard")]
    EmptyKeyword,
    #[error("sign in to generate moodboards")]
    SignInRequired,
    #[error("a moodboard is already being generated")]
    Busy,
    #[error("no moodboard is displayed")]
    NothingDisplayed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: &'static str,
    pub description: String,
}

impl Notice {
    fn success(title: &'static str, description: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, title, description: description.into() }
    }

    #[must_use]
    pub fn generated(keyword: &str) -> Self {
        Self::success("Moodboard Generated!", format!("Created a beautiful moodboard for \"{keyword}\""))
    }

    #[must_use]
    pub fn generation_failed() -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Generation Failed",
            description: "Could not generate a moodboard. Please try again.".into(),
        }
    }

    /// Notice for a refused action.
    #[must_use]
    pub fn refused(err: ViewError) -> Self {
        let title = match err {
            ViewError::SignInRequired => "Sign in required",
            ViewError::EmptyKeyword => "Keyword required",
            ViewError::Busy => "Please wait",
            ViewError::NothingDisplayed => "Nothing to edit",
        };
        Self { level: NoticeLevel::Info, title, description: err.to_string() }
    }
}

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug)]
pub struct ViewState {
    phase: Phase,
    last_ticket: u64,
    /// Search that produced the displayed board.
    shown_ticket: Option<RequestTicket>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    #[must_use]
    pub fn new() -> Self {
        Self { phase: Phase::Empty, last_ticket: 0, shown_ticket: None }
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub fn displayed(&self) -> Option<&Moodboard> {
        match &self.phase {
            Phase::Displayed(board) => Some(board),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_generating(&self) -> bool {
        matches!(self.phase, Phase::Generating { .. })
    }

    /// Enter `Generating` for `raw_keyword`.
    ///
    /// Returns the ticket to hand back to [`ViewState::finish_search`] and
    /// the trimmed keyword to send.
    ///
    /// # Errors
    ///
    /// Refuses an empty keyword, a signed-out user, and a second search
    /// while one is running. The phase is unchanged on refusal.
    pub fn begin_search(&mut self, raw_keyword: &str, signed_in: bool) -> Result<(RequestTicket, String), ViewError> {
        let keyword = normalize_keyword(raw_keyword).ok_or(ViewError::EmptyKeyword)?;
        if !signed_in {
            return Err(ViewError::SignInRequired);
        }
        if self.is_generating() {
            return Err(ViewError::Busy);
        }
        self.last_ticket += 1;
        let ticket = RequestTicket(self.last_ticket);
        self.phase = Phase::Generating { ticket, keyword: keyword.clone() };
        self.shown_ticket = None;
        Ok((ticket, keyword))
    }

    /// Apply a search result.
    ///
    /// Returns `None` and changes nothing when `ticket` is not the search in
    /// flight. Otherwise leaves `Generating` for `Displayed` or `Empty`.
    pub fn finish_search<E>(&mut self, ticket: RequestTicket, result: Result<Moodboard, E>) -> Option<Notice> {
        let Phase::Generating { ticket: current, keyword } = &self.phase else {
            return None;
        };
        if *current != ticket {
            return None;
        }
        let keyword = keyword.clone();
        match result {
            Ok(board) => {
                self.phase = Phase::Displayed(board);
                self.shown_ticket = Some(ticket);
                Some(Notice::generated(&keyword))
            }
            Err(_) => {
                self.phase = Phase::Empty;
                Some(Notice::generation_failed())
            }
        }
    }

    /// Record the stored id on the displayed board if it still came from
    /// the search `ticket`. Local edits since then do not matter.
    pub fn attach_id(&mut self, ticket: RequestTicket, id: Uuid) -> bool {
        if self.shown_ticket != Some(ticket) {
            return false;
        }
        match &mut self.phase {
            Phase::Displayed(board) => {
                board.id = Some(id);
                true
            }
            _ => false,
        }
    }

    /// Permute colors and images independently.
    ///
    /// # Errors
    ///
    /// [`ViewError::Busy`] while generating, [`ViewError::NothingDisplayed`]
    /// when empty.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Notice, ViewError> {
        let board = self.displayed_mut()?;
        *board = board.shuffled(rng);
        Ok(Notice::success("Layout Shuffled!", "Moodboard elements have been rearranged"))
    }

    /// Swap the palette for the fixed fallback palette.
    ///
    /// # Errors
    ///
    /// [`ViewError::Busy`] while generating, [`ViewError::NothingDisplayed`]
    /// when empty.
    pub fn replace(&mut self) -> Result<Notice, ViewError> {
        let board = self.displayed_mut()?;
        *board = board.with_fallback_palette();
        Ok(Notice::success("Elements Replaced!", "New colors have been generated"))
    }

    /// Reorder the existing images.
    ///
    /// # Errors
    ///
    /// [`ViewError::Busy`] while generating, [`ViewError::NothingDisplayed`]
    /// when empty.
    pub fn refresh_images<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Notice, ViewError> {
        let board = self.displayed_mut()?;
        *board = board.with_refreshed_images(rng);
        Ok(Notice::success("Images Refreshed", "Image order has been refreshed"))
    }

    /// Acknowledge an export request. No file is produced.
    ///
    /// # Errors
    ///
    /// [`ViewError::Busy`] while generating, [`ViewError::NothingDisplayed`]
    /// when empty.
    pub fn export(&self) -> Result<Notice, ViewError> {
        if self.is_generating() {
            return Err(ViewError::Busy);
        }
        self.displayed().ok_or(ViewError::NothingDisplayed)?;
        Ok(Notice::success("Export Started!", "Your moodboard is being prepared for download..."))
    }

    fn displayed_mut(&mut self) -> Result<&mut Moodboard, ViewError> {
        match &mut self.phase {
            Phase::Displayed(board) => Ok(board),
            Phase::Generating { .. } => Err(ViewError::Busy),
            Phase::Empty => Err(ViewError::NothingDisplayed),
        }
    }
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
