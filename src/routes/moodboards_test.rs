use super::*;
use moodboards::ShapeError;

#[test]
fn moodboard_error_to_status_maps_not_found() {
    assert_eq!(moodboard_error_to_status(MoodboardError::NotFound(Uuid::nil())), StatusCode::NOT_FOUND);
}

#[test]
fn moodboard_error_to_status_maps_forbidden() {
    assert_eq!(moodboard_error_to_status(MoodboardError::Forbidden), StatusCode::FORBIDDEN);
}

#[test]
fn moodboard_error_to_status_maps_invalid() {
    let err = MoodboardError::Invalid(ShapeError::ColorCount { expected: 5, actual: 3 });
    assert_eq!(moodboard_error_to_status(err), StatusCode::BAD_REQUEST);
}

#[test]
fn moodboard_error_to_status_maps_database() {
    let err = MoodboardError::Database(sqlx::Error::RowNotFound);
    assert_eq!(moodboard_error_to_status(err), StatusCode::INTERNAL_SERVER_ERROR);
}
