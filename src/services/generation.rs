//! Generation service — keyword → prompt → LLM → validated moodboard.
//!
//! DESIGN
//! ======
//! One upstream completion per request. No retry, backoff, or caching; each
//! call is independent of every other. The model's text is untrusted: it is
//! parsed strictly as JSON, completed with keyword defaults, and must pass
//! shape validation (5 colors, 2 fonts, valid hex) before it is returned.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is logged here with its detail. Route handlers only turn the
//! error into a status code and an `{error, details}` body.

use moodboards::{Moodboard, MoodboardDraft, ShapeError, normalize_keyword};
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm::types::{LlmError, Message};
use crate::rate_limit::RateLimitError;
use crate::state::AppState;

/// Longest keyword accepted, in characters.
pub const MAX_KEYWORD_CHARS: usize = 200;

/// Characters of raw model output kept in failure logs.
const LOGGED_OUTPUT_CHARS: usize = 500;

pub const SYSTEM_PROMPT: &str =
    "You are a creative design assistant that generates moodboards. Always return valid JSON only.";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("keyword is required")]
    EmptyKeyword,
    #[error("keyword exceeds {MAX_KEYWORD_CHARS} characters")]
    KeywordTooLong,
    #[error("LLM API key not configured")]
    LlmNotConfigured,
    #[error("rate limited: {0}")]
    RateLimited(#[from] RateLimitError),
    #[error("upstream completion failed: {0}")]
    Upstream(#[from] LlmError),
    #[error("failed to parse AI response as JSON: {0}")]
    Parse(String),
    #[error("AI response has the wrong shape: {0}")]
    Shape(#[from] ShapeError),
}

// =============================================================================
// PROMPT
// =============================================================================

/// Build the user prompt for a keyword.
///
/// The keyword is embedded as a JSON string literal so quotes and newlines
/// in user input cannot break out of the instruction text.
#[must_use]
pub fn build_prompt(keyword: &str) -> String {
    let quoted = serde_json::to_string(keyword).unwrap_or_else(|_| format!("\"{keyword}\""));
    format!(
        r##"Generate a detailed moodboard for the keyword {quoted}. Return a JSON object with this exact structure:

{{
  "title": "Creative title for the moodboard",
  "keywords": [{quoted}, "related keyword 1", "related keyword 2"],
  "colors": [
    {{"hex": "#XXXXXX", "name": "Color Name 1"}},
    {{"hex": "#XXXXXX", "name": "Color Name 2"}},
    {{"hex": "#XXXXXX", "name": "Color Name 3"}},
    {{"hex": "#XXXXXX", "name": "Color Name 4"}},
    {{"hex": "#XXXXXX", "name": "Color Name 5"}}
  ],
  "fonts": [
    {{"name": "Font Name 1", "family": "Font Family 1, sans-serif", "weight": "400"}},
    {{"name": "Font Name 2", "family": "Font Family 2, serif", "weight": "700"}}
  ],
  "images": [
    {{"url": "https://images.unsplash.com/photo-relevant-image-1?w=400", "alt": "Description 1"}},
    {{"url": "https://images.unsplash.com/photo-relevant-image-2?w=400", "alt": "Description 2"}},
    {{"url": "https://images.unsplash.com/photo-relevant-image-3?w=400", "alt": "Description 3"}},
    {{"url": "https://images.unsplash.com/photo-relevant-image-4?w=400", "alt": "Description 4"}},
    {{"url": "https://images.unsplash.com/photo-relevant-image-5?w=400", "alt": "Description 5"}}
  ]
}}

Use exactly 5 colors, each a 6-digit hex value prefixed with "#", and exactly 2 fonts. Choose colors that match the aesthetic of {quoted}. Select fonts that complement the theme. Use real Unsplash photo IDs for images that relate to the concept. Return only valid JSON, no other text."##
    )
}

// =============================================================================
// PARSING
// =============================================================================

/// Parse model output into a validated moodboard.
///
/// Parsing is strict: surrounding whitespace is ignored, anything else that
/// is not a single JSON object fails. Any `id` the model invents is dropped.
///
/// # Errors
///
/// [`GenerationError::Parse`] for non-JSON output, [`GenerationError::Shape`]
/// when the completed board violates the moodboard invariants.
pub fn parse_moodboard(text: &str, keyword: &str) -> Result<Moodboard, GenerationError> {
    let draft: MoodboardDraft =
        serde_json::from_str(text.trim()).map_err(|e| GenerationError::Parse(e.to_string()))?;
    let board = Moodboard { id: None, ..draft.complete(keyword) };
    board.validate()?;
    Ok(board)
}

fn truncate_for_log(text: &str) -> &str {
    match text.char_indices().nth(LOGGED_OUTPUT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Generate a moodboard for `raw_keyword` on behalf of `user_id`.
///
/// # Errors
///
/// Input errors (empty or oversized keyword) and missing configuration are
/// returned before the rate limiter or the LLM is touched. Rate limiting is
/// checked before the upstream call.
pub async fn generate(state: &AppState, user_id: Uuid, raw_keyword: &str) -> Result<Moodboard, GenerationError> {
    let keyword = normalize_keyword(raw_keyword).ok_or(GenerationError::EmptyKeyword)?;
    if keyword.chars().count() > MAX_KEYWORD_CHARS {
        return Err(GenerationError::KeywordTooLong);
    }
    let llm = state.llm.as_ref().ok_or(GenerationError::LlmNotConfigured)?;

    if let Err(e) = state.rate_limiter.check_and_record(user_id) {
        warn!(%user_id, error = %e, "generate: rate limited");
        return Err(e.into());
    }

    info!(%user_id, keyword_len = keyword.len(), model = llm.model(), "generate: request");

    let messages = [Message::user(build_prompt(&keyword))];
    let response = match llm.chat(SYSTEM_PROMPT, &messages).await {
        Ok(r) => r,
        Err(e) => {
            if let LlmError::ApiResponse { status, body } = &e {
                warn!(%user_id, status, body = truncate_for_log(body), "generate: upstream error status");
            } else {
                warn!(%user_id, error = %e, "generate: upstream request failed");
            }
            return Err(e.into());
        }
    };

    info!(
        %user_id,
        model = %response.model,
        stop_reason = %response.stop_reason,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "generate: completion received"
    );

    parse_moodboard(&response.text, &keyword).inspect_err(|e| {
        warn!(%user_id, error = %e, raw = truncate_for_log(&response.text), "generate: unusable completion");
    })
}

#[cfg(test)]
#[path = "generation_test.rs"]
mod tests;
