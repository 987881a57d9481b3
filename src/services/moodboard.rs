//! Moodboard store — saved boards per user.
//!
//! DESIGN
//! ======
//! Boards are stored one row each: scalar columns for ownership and
//! visibility, `text[]` for keywords, and `jsonb` for the palette, fonts, and
//! images. A board is visible to its owner, and to everyone once marked
//! public. Writes are owner-only; rows owned by someone else look missing.

use moodboards::{Color, Font, Image, Moodboard, SaveMoodboardRequest, SavedMoodboard, ShapeError};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MoodboardError {
    #[error("moodboard not found: {0}")]
    NotFound(Uuid),
    #[error("cannot save a moodboard for another user")]
    Forbidden,
    #[error("invalid moodboard: {0}")]
    Invalid(#[from] ShapeError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

const RETURNED_COLUMNS: &str = r#"id, user_id, is_public, title, keywords, color_palette, fonts, images,
    to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at"#;

fn saved_from_row(row: &PgRow) -> Result<SavedMoodboard, sqlx::Error> {
    let id: Uuid = row.try_get("id")?;
    let Json(colors): Json<Vec<Color>> = row.try_get("color_palette")?;
    let Json(fonts): Json<Vec<Font>> = row.try_get("fonts")?;
    let Json(images): Json<Vec<Image>> = row.try_get("images")?;
    Ok(SavedMoodboard {
        id,
        user_id: row.try_get("user_id")?,
        is_public: row.try_get("is_public")?,
        created_at: row.try_get("created_at")?,
        moodboard: Moodboard {
            id: Some(id),
            title: row.try_get("title")?,
            keywords: row.try_get("keywords")?,
            colors,
            fonts,
            images,
        },
    })
}

// =============================================================================
// CRUD
// =============================================================================

/// Save a board on behalf of the signed-in user.
///
/// # Errors
///
/// [`MoodboardError::Forbidden`] when the request names another user,
/// [`MoodboardError::Invalid`] when the board fails shape validation. Both
/// are checked before touching the database.
pub async fn save_for_user(
    pool: &PgPool,
    session_user: Uuid,
    request: &SaveMoodboardRequest,
) -> Result<SavedMoodboard, MoodboardError> {
    if request.user_id != session_user {
        return Err(MoodboardError::Forbidden);
    }
    insert_moodboard(pool, session_user, &request.moodboard).await
}

/// Insert a board. Any id already on `board` is ignored; the store assigns one.
///
/// # Errors
///
/// Returns [`MoodboardError::Invalid`] or a database error.
pub async fn insert_moodboard(pool: &PgPool, user_id: Uuid, board: &Moodboard) -> Result<SavedMoodboard, MoodboardError> {
    board.validate()?;
    let sql = format!(
        "INSERT INTO moodboards (user_id, title, keywords, color_palette, fonts, images)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {RETURNED_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(user_id)
        .bind(&board.title)
        .bind(&board.keywords)
        .bind(Json(&board.colors))
        .bind(Json(&board.fonts))
        .bind(Json(&board.images))
        .fetch_one(pool)
        .await?;
    let saved = saved_from_row(&row)?;
    info!(moodboard_id = %saved.id, %user_id, "moodboard saved");
    Ok(saved)
}

/// Fetch a board visible to `viewer`.
///
/// # Errors
///
/// [`MoodboardError::NotFound`] when the board does not exist, or is private
/// and owned by someone else.
pub async fn get_moodboard(pool: &PgPool, id: Uuid, viewer: Uuid) -> Result<SavedMoodboard, MoodboardError> {
    let sql = format!("SELECT {RETURNED_COLUMNS} FROM moodboards WHERE id = $1 AND (user_id = $2 OR is_public)");
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(viewer)
        .fetch_optional(pool)
        .await?
        .ok_or(MoodboardError::NotFound(id))?;
    Ok(saved_from_row(&row)?)
}

/// List the boards owned by `user_id`, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_moodboards(pool: &PgPool, user_id: Uuid) -> Result<Vec<SavedMoodboard>, MoodboardError> {
    let sql = format!("SELECT {RETURNED_COLUMNS} FROM moodboards WHERE user_id = $1 ORDER BY created_at DESC, id");
    let rows = sqlx::query(&sql).bind(user_id).fetch_all(pool).await?;
    rows.iter()
        .map(|row| saved_from_row(row).map_err(MoodboardError::from))
        .collect()
}

/// Mark an owned board public or private.
///
/// # Errors
///
/// [`MoodboardError::NotFound`] unless `owner` owns the board.
pub async fn set_visibility(
    pool: &PgPool,
    id: Uuid,
    owner: Uuid,
    is_public: bool,
) -> Result<SavedMoodboard, MoodboardError> {
    let sql = format!("UPDATE moodboards SET is_public = $3 WHERE id = $1 AND user_id = $2 RETURNING {RETURNED_COLUMNS}");
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(owner)
        .bind(is_public)
        .fetch_optional(pool)
        .await?
        .ok_or(MoodboardError::NotFound(id))?;
    info!(moodboard_id = %id, is_public, "moodboard visibility changed");
    Ok(saved_from_row(&row)?)
}

/// Delete an owned board.
///
/// # Errors
///
/// [`MoodboardError::NotFound`] unless `owner` owns the board.
pub async fn delete_moodboard(pool: &PgPool, id: Uuid, owner: Uuid) -> Result<(), MoodboardError> {
    let result = sqlx::query("DELETE FROM moodboards WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(MoodboardError::NotFound(id));
    }
    info!(moodboard_id = %id, "moodboard deleted");
    Ok(())
}

#[cfg(test)]
#[path = "moodboard_test.rs"]
mod tests;
