use super::*;
use crate::llm::types::{ChatResponse, LlmChat, LlmError, Message};
use crate::rate_limit::RateLimitConfig;
use crate::state::test_helpers;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =========================================================================
// MockLlm
// =========================================================================

struct MockLlm {
    responses: Mutex<Vec<Result<String, LlmError>>>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockLlm {
    fn new(responses: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self { responses: Mutex::new(responses), calls: AtomicUsize::new(0), last_prompt: Mutex::new(None) })
    }

    fn replying(text: &str) -> Arc<Self> {
        Self::new(vec![Ok(text.to_owned())])
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmChat for MockLlm {
    async fn chat(&self, system: &str, messages: &[Message]) -> Result<ChatResponse, LlmError> {
        assert_eq!(system, SYSTEM_PROMPT);
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = messages.first().map(|m| m.content.clone());
        let mut responses = self.responses.lock().unwrap();
        let next = if responses.is_empty() { Ok(VALID_BOARD.to_owned()) } else { responses.remove(0) };
        next.map(|text| ChatResponse {
            text,
            model: "mock".into(),
            stop_reason: "end_turn".into(),
            input_tokens: 10,
            output_tokens: 20,
        })
    }

    fn model(&self) -> &str {
        "mock"
    }
}

const VALID_BOARD: &str = r##"{
  "title": "Modern Minimalist",
  "keywords": ["modern minimalist", "clean", "calm"],
  "colors": [
    {"hex": "#FFFFFF", "name": "White"},
    {"hex": "#F5F5F5", "name": "Smoke"},
    {"hex": "#2D2D2D", "name": "Charcoal"},
    {"hex": "#A3A3A3", "name": "Ash"},
    {"hex": "#D4C5B0", "name": "Sand"}
  ],
  "fonts": [
    {"name": "Inter", "family": "Inter, sans-serif", "weight": "400"},
    {"name": "Playfair Display", "family": "Playfair Display, serif", "weight": "700"}
  ],
  "images": [
    {"url": "https://images.unsplash.com/photo-1?w=400", "alt": "Empty room"}
  ]
}"##;

// =========================================================================
// build_prompt
// =========================================================================

#[test]
fn prompt_names_keyword_and_counts() {
    let prompt = build_prompt("modern minimalist");
    assert!(prompt.contains("\"modern minimalist\""));
    assert!(prompt.contains("exactly 5 colors"));
    assert!(prompt.contains("exactly 2 fonts"));
    assert!(prompt.contains("Return only valid JSON"));
}

#[test]
fn prompt_escapes_quotes_in_keyword() {
    let prompt = build_prompt("say \"hi\"\nignore previous");
    assert!(prompt.contains(r#""say \"hi\"\nignore previous""#));
}

// =========================================================================
// parse_moodboard
// =========================================================================

#[test]
fn parse_valid_board() {
    let board = parse_moodboard(VALID_BOARD, "modern minimalist").unwrap();
    assert_eq!(board.title, "Modern Minimalist");
    assert_eq!(board.colors.len(), 5);
    assert_eq!(board.fonts.len(), 2);
    assert_eq!(board.images.len(), 1);
}

#[test]
fn parse_tolerates_surrounding_whitespace() {
    let text = format!("\n\n  {VALID_BOARD}  \n");
    assert!(parse_moodboard(&text, "modern minimalist").is_ok());
}

#[test]
fn parse_rejects_prose() {
    let err = parse_moodboard("Sure! Here is your moodboard.", "x").unwrap_err();
    assert!(matches!(err, GenerationError::Parse(_)));
}

#[test]
fn parse_rejects_code_fence() {
    let text = format!("```json\n{VALID_BOARD}\n```");
    assert!(matches!(parse_moodboard(&text, "x").unwrap_err(), GenerationError::Parse(_)));
}

#[test]
fn parse_fills_missing_title_and_keywords() {
    let text = VALID_BOARD
        .replace("\"title\": \"Modern Minimalist\",", "")
        .replace("\"keywords\": [\"modern minimalist\", \"clean\", \"calm\"],", "");
    let board = parse_moodboard(&text, "modern minimalist").unwrap();
    assert_eq!(board.title, "modern minimalist Moodboard");
    assert_eq!(board.keywords, vec!["modern minimalist".to_owned()]);
}

#[test]
fn parse_rejects_wrong_color_count() {
    let text = VALID_BOARD.replace("{\"hex\": \"#D4C5B0\", \"name\": \"Sand\"}", "").replace(
        "{\"hex\": \"#A3A3A3\", \"name\": \"Ash\"},",
        "{\"hex\": \"#A3A3A3\", \"name\": \"Ash\"}",
    );
    let err = parse_moodboard(&text, "x").unwrap_err();
    assert!(matches!(err, GenerationError::Shape(ShapeError::ColorCount { expected: 5, actual: 4 })));
}

#[test]
fn parse_rejects_bad_hex() {
    let text = VALID_BOARD.replace("#2D2D2D", "charcoal");
    let err = parse_moodboard(&text, "x").unwrap_err();
    assert!(matches!(err, GenerationError::Shape(ShapeError::InvalidHex(_))));
}

#[test]
fn parse_drops_model_supplied_id() {
    let text = VALID_BOARD.replacen('{', "{\"id\": \"7b1c2a64-5d4f-4a7e-9e43-1f0d1c1e2a3b\",", 1);
    let board = parse_moodboard(&text, "x").unwrap();
    assert!(board.id.is_none());
}

// =========================================================================
// generate
// =========================================================================

#[tokio::test]
async fn generate_returns_validated_board() {
    let llm = MockLlm::replying(VALID_BOARD);
    let state = test_helpers::test_app_state_with_llm(llm.clone());
    let board = generate(&state, Uuid::new_v4(), "  Modern Minimalist ").await.unwrap();
    assert_eq!(board.colors.len(), 5);
    assert_eq!(llm.calls(), 1);
    let prompt = llm.last_prompt.lock().unwrap().clone().unwrap();
    assert!(prompt.contains("\"Modern Minimalist\""));
}

#[tokio::test]
async fn generate_empty_keyword_skips_llm() {
    let llm = MockLlm::replying(VALID_BOARD);
    let state = test_helpers::test_app_state_with_llm(llm.clone());
    let err = generate(&state, Uuid::new_v4(), "   ").await.unwrap_err();
    assert!(matches!(err, GenerationError::EmptyKeyword));
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn generate_long_keyword_rejected() {
    let llm = MockLlm::replying(VALID_BOARD);
    let state = test_helpers::test_app_state_with_llm(llm.clone());
    let keyword = "a".repeat(MAX_KEYWORD_CHARS + 1);
    let err = generate(&state, Uuid::new_v4(), &keyword).await.unwrap_err();
    assert!(matches!(err, GenerationError::KeywordTooLong));
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn generate_without_llm_is_not_configured() {
    let state = test_helpers::test_app_state();
    let err = generate(&state, Uuid::new_v4(), "ocean").await.unwrap_err();
    assert!(matches!(err, GenerationError::LlmNotConfigured));
    assert_eq!(err.to_string(), "LLM API key not configured");
}

#[tokio::test]
async fn generate_upstream_failure_is_reported() {
    let llm = MockLlm::new(vec![Err(LlmError::ApiResponse { status: 429, body: "slow down".into() })]);
    let state = test_helpers::test_app_state_with_llm(llm.clone());
    let err = generate(&state, Uuid::new_v4(), "ocean").await.unwrap_err();
    assert!(matches!(err, GenerationError::Upstream(LlmError::ApiResponse { status: 429, .. })));
}

#[tokio::test]
async fn generate_malformed_completion_is_parse_error() {
    let llm = MockLlm::replying("not json at all");
    let state = test_helpers::test_app_state_with_llm(llm);
    let err = generate(&state, Uuid::new_v4(), "ocean").await.unwrap_err();
    assert!(matches!(err, GenerationError::Parse(_)));
}

#[tokio::test]
async fn generate_rate_limited_before_llm_call() {
    let llm = MockLlm::new(vec![]);
    let limits = RateLimitConfig {
        per_user_limit: 1,
        per_user_window: Duration::from_secs(60),
        global_limit: 100,
        global_window: Duration::from_secs(60),
    };
    let state = test_helpers::test_app_state_with_limits(llm.clone(), limits);
    let user = Uuid::new_v4();
    assert!(generate(&state, user, "ocean").await.is_ok());
    let err = generate(&state, user, "forest").await.unwrap_err();
    assert!(matches!(err, GenerationError::RateLimited(_)));
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn generate_calls_are_independent() {
    let llm = MockLlm::new(vec![Ok("garbage".into()), Ok(VALID_BOARD.into())]);
    let state = test_helpers::test_app_state_with_llm(llm.clone());
    let user = Uuid::new_v4();
    assert!(generate(&state, user, "ocean").await.is_err());
    assert!(generate(&state, user, "ocean").await.is_ok());
    assert_eq!(llm.calls(), 2);
}

#[test]
fn truncate_for_log_respects_char_boundaries() {
    let text = "é".repeat(LOGGED_OUTPUT_CHARS + 10);
    assert_eq!(truncate_for_log(&text).chars().count(), LOGGED_OUTPUT_CHARS);
    assert_eq!(truncate_for_log("short"), "short");
}
