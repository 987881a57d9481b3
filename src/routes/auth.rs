//! Auth routes — email access codes, session refresh, profile, logout.

use axum::extract::{FromRef, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use moodboards::{RequestCodeBody, RequestCodeResponse, SessionToken, UserProfile, VerifyCodeBody};
use time::Duration;

use crate::env::env_bool;
use crate::services::email_auth::{self, EmailAuthError};
use crate::services::session;
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";
const SESSION_MAX_AGE_DAYS: i64 = 30;

pub(crate) fn cookie_secure() -> bool {
    env_bool("COOKIE_SECURE").unwrap_or(false)
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .max_age(Duration::days(SESSION_MAX_AGE_DAYS))
        .build()
}

fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .max_age(Duration::ZERO)
        .build()
}

/// Session token from `Authorization: Bearer` or the session cookie.
/// The header wins when both are present.
pub(crate) fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_owned());
    }

    let jar = CookieJar::from_headers(headers);
    jar.get(COOKIE_NAME)
        .map(Cookie::value)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the bearer token or session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: session::SessionUser,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = session_token_from_headers(&parts.headers).ok_or(StatusCode::UNAUTHORIZED)?;

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, &token)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "session lookup failed");
                StatusCode::INTERNAL_SERVER_ERROR
            })?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { user, token })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/email/request-code` — issue and deliver an access code.
pub async fn request_email_code(State(state): State<AppState>, Json(body): Json<RequestCodeBody>) -> Response {
    if !state.email.is_enabled() {
        return (StatusCode::SERVICE_UNAVAILABLE, "email sign-in is not configured").into_response();
    }
    let Some(email) = email_auth::normalize_email(&body.email) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let code = match email_auth::request_access_code(&state.pool, &email, body.display_name.as_deref()).await {
        Ok(code) => code,
        Err(e) => return email_error_response(&e),
    };

    match state.email.deliver(&email, &code).await {
        Ok(echoed) => Json(RequestCodeResponse { sent: echoed.is_none(), code: echoed }).into_response(),
        Err(e) => email_error_response(&e),
    }
}

/// `POST /api/auth/email/verify-code` — exchange a code for a session.
pub async fn verify_email_code(State(state): State<AppState>, Json(body): Json<VerifyCodeBody>) -> Response {
    let user_id = match email_auth::verify_access_code(&state.pool, &body.email, &body.code).await {
        Ok(id) => id,
        Err(e) => return email_error_response(&e),
    };

    let token = match session::create_session(&state.pool, user_id).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "session creation failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session").into_response();
        }
    };

    tracing::info!(%user_id, "signed in with email code");
    let jar = CookieJar::new().add(session_cookie(token.clone()));
    (jar, Json(SessionToken { token })).into_response()
}

/// `POST /api/auth/refresh` — rotate the current session token.
pub async fn refresh(State(state): State<AppState>, auth: AuthUser) -> Response {
    match session::rotate_session(&state.pool, &auth.token).await {
        Ok(Some(token)) => {
            let jar = CookieJar::new().add(session_cookie(token.clone()));
            (jar, Json(SessionToken { token })).into_response()
        }
        Ok(None) => StatusCode::UNAUTHORIZED.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "session rotation failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `GET /api/auth/me` — return current user.
pub async fn me(auth: AuthUser) -> Json<UserProfile> {
    Json(auth.user.into())
}

/// `POST /api/auth/logout` — delete session, clear cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(e) = session::delete_session(&state.pool, &auth.token).await {
        tracing::warn!(error = %e, "session delete failed during logout");
    }
    let jar = CookieJar::new().add(cleared_session_cookie());
    (jar, StatusCode::NO_CONTENT)
}

pub(crate) fn email_error_to_status(err: &EmailAuthError) -> StatusCode {
    match err {
        EmailAuthError::InvalidEmail | EmailAuthError::InvalidCode => StatusCode::BAD_REQUEST,
        EmailAuthError::VerificationFailed => StatusCode::UNAUTHORIZED,
        EmailAuthError::DeliveryUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        EmailAuthError::EmailDelivery(_) => StatusCode::BAD_GATEWAY,
        EmailAuthError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn email_error_response(err: &EmailAuthError) -> Response {
    let status = email_error_to_status(err);
    if status.is_server_error() {
        tracing::error!(error = %err, "email auth failed");
    }
    (status, err.to_string()).into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
