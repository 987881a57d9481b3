//! Email access-code auth service.
//!
//! Creates and verifies short-lived six-character codes linked to an email.
//! Signing in with a code that verifies creates the user on first use; there
//! is no separate registration step.

use rand::Rng;
use resend_rs::Resend;
use resend_rs::types::CreateEmailBaseOptions;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::env::{non_blank, parse_bool};

const CODE_LEN: usize = 6;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const MAX_FAILED_ATTEMPTS: i32 = 5;
const MAX_DISPLAY_NAME_CHARS: usize = 80;
const EMAIL_AUTH_TEMPLATE: &str = include_str!("../../templates/email_auth.html");

#[derive(Debug, thiserror::Error)]
pub enum EmailAuthError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("invalid code")]
    InvalidCode,
    #[error("expired or incorrect code")]
    VerificationFailed,
    #[error("email delivery is not configured")]
    DeliveryUnavailable,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("email delivery failed: {0}")]
    EmailDelivery(String),
}

// =============================================================================
// DELIVERY
// =============================================================================

/// How access codes reach the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailDelivery {
    /// Send through the Resend API.
    Resend { api_key: String, from: String },
    /// Return the code in the HTTP response. Local development only.
    DevEcho,
    /// No delivery path; code requests are refused.
    Disabled,
}

impl EmailDelivery {
    /// Read `RESEND_API_KEY`/`RESEND_FROM`, falling back to
    /// `AUTH_DEV_ECHO_CODE`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let (Some(api_key), Some(from)) = (non_blank(&lookup, "RESEND_API_KEY"), non_blank(&lookup, "RESEND_FROM")) {
            return Self::Resend { api_key, from };
        }
        let dev_echo = lookup("AUTH_DEV_ECHO_CODE")
            .and_then(|raw| parse_bool(&raw))
            .unwrap_or(false);
        if dev_echo { Self::DevEcho } else { Self::Disabled }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Deliver `code` to `to_email`. Returns the code itself only in
    /// [`EmailDelivery::DevEcho`] mode.
    ///
    /// # Errors
    ///
    /// [`EmailAuthError::DeliveryUnavailable`] when disabled, or the Resend
    /// failure message.
    pub async fn deliver(&self, to_email: &str, code: &str) -> Result<Option<String>, EmailAuthError> {
        match self {
            Self::Resend { api_key, from } => {
                send_access_code_email(api_key, from, to_email, code).await?;
                Ok(None)
            }
            Self::DevEcho => {
                tracing::warn!(email = %to_email, "AUTH_DEV_ECHO_CODE enabled; returning access code in response");
                Ok(Some(code.to_owned()))
            }
            Self::Disabled => Err(EmailAuthError::DeliveryUnavailable),
        }
    }
}

// =============================================================================
// CODES
// =============================================================================

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

#[must_use]
pub fn normalize_code(code: &str) -> Option<String> {
    let normalized = code.trim().to_ascii_uppercase();
    if normalized.len() != CODE_LEN || !normalized.bytes().all(|c| CODE_ALPHABET.contains(&c)) {
        return None;
    }
    Some(normalized)
}

#[must_use]
pub fn generate_access_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[must_use]
pub fn hash_access_code(code: &str) -> String {
    let digest = Sha256::digest(code.as_bytes());
    super::session::bytes_to_hex(&digest)
}

/// Trimmed display name, or `None` when blank. Long names are cut.
#[must_use]
pub fn normalize_display_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_DISPLAY_NAME_CHARS).collect())
}

fn name_from_email(email: &str) -> String {
    email
        .split('@')
        .next()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("user")
        .to_owned()
}

// =============================================================================
// DATABASE
// =============================================================================

/// Upsert the user for `email` and store a fresh code, returning it in clear.
///
/// Any previous unconsumed code for the address is discarded. A supplied
/// display name replaces the stored one; otherwise an existing name is kept.
pub async fn request_access_code(
    pool: &PgPool,
    email: &str,
    display_name: Option<&str>,
) -> Result<String, EmailAuthError> {
    let normalized = normalize_email(email).ok_or(EmailAuthError::InvalidEmail)?;
    let display_name = display_name.and_then(normalize_display_name);
    let default_name = name_from_email(&normalized);

    sqlx::query(
        r"INSERT INTO users (email, name)
          VALUES ($1, COALESCE($2, $3))
          ON CONFLICT (email) DO UPDATE SET name = COALESCE($2, users.name)",
    )
    .bind(&normalized)
    .bind(display_name)
    .bind(default_name)
    .execute(pool)
    .await?;

    sqlx::query("DELETE FROM email_login_codes WHERE email = $1 AND consumed_at IS NULL")
        .bind(&normalized)
        .execute(pool)
        .await?;

    let code = generate_access_code();
    sqlx::query("INSERT INTO email_login_codes (email, code_hash) VALUES ($1, $2)")
        .bind(&normalized)
        .bind(hash_access_code(&code))
        .execute(pool)
        .await?;

    Ok(code)
}

/// Consume a code and return the user it signs in.
///
/// Wrong guesses count against the latest live code; after
/// `MAX_FAILED_ATTEMPTS` it is burned.
pub async fn verify_access_code(pool: &PgPool, email: &str, code: &str) -> Result<Uuid, EmailAuthError> {
    let normalized_email = normalize_email(email).ok_or(EmailAuthError::InvalidEmail)?;
    let normalized_code = normalize_code(code).ok_or(EmailAuthError::InvalidCode)?;
    let code_hash = hash_access_code(&normalized_code);

    let update = sqlx::query(
        r"UPDATE email_login_codes
          SET consumed_at = now()
          WHERE id = (
              SELECT id
              FROM email_login_codes
              WHERE email = $1
                AND consumed_at IS NULL
                AND expires_at > now()
              ORDER BY created_at DESC
              LIMIT 1
          )
          AND code_hash = $2
          RETURNING id",
    )
    .bind(&normalized_email)
    .bind(&code_hash)
    .fetch_optional(pool)
    .await?;

    if update.is_none() {
        sqlx::query(
            r"UPDATE email_login_codes
              SET attempts = attempts + 1,
                  consumed_at = CASE WHEN attempts + 1 >= $2 THEN now() ELSE consumed_at END
              WHERE id = (
                  SELECT id
                  FROM email_login_codes
                  WHERE email = $1
                    AND consumed_at IS NULL
                    AND expires_at > now()
                  ORDER BY created_at DESC
                  LIMIT 1
              )",
        )
        .bind(&normalized_email)
        .bind(MAX_FAILED_ATTEMPTS)
        .execute(pool)
        .await?;
        return Err(EmailAuthError::VerificationFailed);
    }

    let user_row = sqlx::query("SELECT id FROM users WHERE email = $1")
        .bind(&normalized_email)
        .fetch_optional(pool)
        .await?;

    user_row
        .map(|row| row.get("id"))
        .ok_or(EmailAuthError::VerificationFailed)
}

// =============================================================================
// RESEND
// =============================================================================

pub async fn send_access_code_email(
    resend_api_key: &str,
    resend_from: &str,
    to_email: &str,
    code: &str,
) -> Result<(), EmailAuthError> {
    let resend = Resend::new(resend_api_key);
    let html = render_email_auth_template(to_email, code);
    let email = CreateEmailBaseOptions::new(resend_from, [to_email], "Your Moodboard Generator sign-in code").with_html(&html);
    resend
        .emails
        .send(email)
        .await
        .map_err(|e| EmailAuthError::EmailDelivery(e.to_string()))?;
    Ok(())
}

#[must_use]
pub fn render_email_auth_template(email: &str, code: &str) -> String {
    EMAIL_AUTH_TEMPLATE
        .replace("{{EMAIL}}", email)
        .replace("{{CODE}}", code)
}

#[cfg(test)]
#[path = "email_auth_test.rs"]
mod tests;
