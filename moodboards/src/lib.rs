//! Shared moodboard model and HTTP wire contract.
//!
//! This crate owns the representation used by both the `moodgen` server and
//! the `cli` client. Field names match the JSON exchanged with the
//! generation endpoint and the persistence API, so the same types serialize
//! on one side and deserialize on the other.
//!
//! Board transformations (`shuffled`, `with_fallback_palette`,
//! `with_refreshed_images`) return new values and never edit in place.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of colors every generated palette must contain.
pub const PALETTE_SIZE: usize = 5;
/// Number of typography samples every generated board must contain.
pub const FONT_COUNT: usize = 2;

/// Hardcoded palette swapped in by the "replace elements" action.
pub const FALLBACK_PALETTE: [(&str, &str); PALETTE_SIZE] = [
    ("#FF6B6B", "Coral Red"),
    ("#4ECDC4", "Turquoise"),
    ("#45B7D1", "Sky Blue"),
    ("#FFA07A", "Light Salmon"),
    ("#98D8C8", "Mint Green"),
];

// =============================================================================
// ERROR
// =============================================================================

/// Reasons a moodboard does not have the shape the app renders.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("expected {expected} colors, got {actual}")]
    ColorCount { expected: usize, actual: usize },
    #[error("expected {expected} fonts, got {actual}")]
    FontCount { expected: usize, actual: usize },
    #[error("invalid hex color: {0:?}")]
    InvalidHex(String),
    #[error("moodboard title is empty")]
    EmptyTitle,
}

// =============================================================================
// MODEL
// =============================================================================

/// A single palette swatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// `#` followed by six hex digits.
    pub hex: String,
    pub name: String,
}

impl Color {
    #[must_use]
    pub fn new(hex: impl Into<String>, name: impl Into<String>) -> Self {
        Self { hex: hex.into(), name: name.into() }
    }

    /// `true` when `hex` is `#` followed by exactly six ASCII hex digits.
    #[must_use]
    pub fn is_valid_hex(&self) -> bool {
        let Some(digits) = self.hex.strip_prefix('#') else {
            return false;
        };
        digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
    }
}

/// A typography sample.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Font {
    /// Display name, e.g. `"Inter"`.
    pub name: String,
    /// CSS `font-family` value, e.g. `"Inter, sans-serif"`.
    pub family: String,
    /// Stringified numeric weight, e.g. `"400"`.
    pub weight: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub alt: String,
}

/// A themed bundle of colors, fonts, and images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moodboard {
    /// Assigned by the persistence store; absent until saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub title: String,
    pub keywords: Vec<String>,
    pub colors: Vec<Color>,
    pub fonts: Vec<Font>,
    pub images: Vec<Image>,
}

impl Moodboard {
    /// Check the invariants every displayed or persisted board satisfies.
    ///
    /// # Errors
    ///
    /// Returns the first [`ShapeError`] found: palette size, font count,
    /// malformed hex, then empty title.
    pub fn validate(&self) -> Result<(), ShapeError> {
        if self.colors.len() != PALETTE_SIZE {
            return Err(ShapeError::ColorCount { expected: PALETTE_SIZE, actual: self.colors.len() });
        }
        if self.fonts.len() != FONT_COUNT {
            return Err(ShapeError::FontCount { expected: FONT_COUNT, actual: self.fonts.len() });
        }
        if let Some(bad) = self.colors.iter().find(|c| !c.is_valid_hex()) {
            return Err(ShapeError::InvalidHex(bad.hex.clone()));
        }
        if self.title.trim().is_empty() {
            return Err(ShapeError::EmptyTitle);
        }
        Ok(())
    }

    /// Colors and images independently permuted; everything else unchanged.
    #[must_use]
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut next = self.clone();
        next.colors.shuffle(rng);
        next.images.shuffle(rng);
        next
    }

    /// Same board with its colors replaced by [`FALLBACK_PALETTE`].
    #[must_use]
    pub fn with_fallback_palette(&self) -> Self {
        Self { colors: fallback_palette(), ..self.clone() }
    }

    /// Same board with only the existing images reordered.
    #[must_use]
    pub fn with_refreshed_images<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut next = self.clone();
        next.images.shuffle(rng);
        next
    }
}

/// [`FALLBACK_PALETTE`] as owned colors.
#[must_use]
pub fn fallback_palette() -> Vec<Color> {
    FALLBACK_PALETTE
        .iter()
        .map(|(hex, name)| Color::new(*hex, *name))
        .collect()
}

/// Trim a user-entered keyword. Returns `None` when nothing is left.
#[must_use]
pub fn normalize_keyword(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_owned()) }
}

// =============================================================================
// DRAFT
// =============================================================================

/// Tolerant shape of a generated board: any field may be missing.
///
/// Generation payloads come from a language model, so decoding goes through
/// this type and [`MoodboardDraft::complete`] fills the gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodboardDraft {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub colors: Option<Vec<Color>>,
    #[serde(default)]
    pub fonts: Option<Vec<Font>>,
    #[serde(default)]
    pub images: Option<Vec<Image>>,
}

impl MoodboardDraft {
    /// Fill missing fields from the keyword that produced the draft.
    ///
    /// Title defaults to `"<keyword> Moodboard"`, keywords to `[keyword]`,
    /// and the collections to empty. A blank title counts as missing.
    #[must_use]
    pub fn complete(self, keyword: &str) -> Moodboard {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format!("{keyword} Moodboard"));
        let keywords = self
            .keywords
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| vec![keyword.to_owned()]);
        Moodboard {
            id: self.id,
            title,
            keywords,
            colors: self.colors.unwrap_or_default(),
            fonts: self.fonts.unwrap_or_default(),
            images: self.images.unwrap_or_default(),
        }
    }
}

// =============================================================================
// WIRE — GENERATION
// =============================================================================

/// Body of `POST /api/generate-moodboard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub keyword: String,
}

/// Success body of `POST /api/generate-moodboard`, as the client reads it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub moodboard: Option<MoodboardDraft>,
}

/// Success body of `POST /api/generate-moodboard`, as the server writes it.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedMoodboard<'a> {
    pub moodboard: &'a Moodboard,
}

/// Failure body shared by every endpoint that reports errors as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

impl ErrorBody {
    #[must_use]
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self { error: error.into(), details: details.into() }
    }
}

// =============================================================================
// WIRE — PERSISTENCE
// =============================================================================

/// Body of `POST /api/moodboards`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMoodboardRequest {
    pub user_id: Uuid,
    pub moodboard: Moodboard,
}

/// A stored board as returned by the persistence API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedMoodboard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub is_public: bool,
    /// RFC 3339 timestamp.
    pub created_at: String,
    pub moodboard: Moodboard,
}

/// Body of `PATCH /api/moodboards/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityUpdate {
    pub is_public: bool,
}

// =============================================================================
// WIRE — IDENTITY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub token: String,
}

/// Profile of the signed-in user, re-fetched on every new session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestCodeBody {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Response of the request-code endpoint. `code` is only present when the
/// server runs with development code echo enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCodeResponse {
    pub sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCodeBody {
    pub email: String,
    pub code: String,
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
