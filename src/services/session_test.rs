use super::*;

// =============================================================================
// bytes_to_hex
// =============================================================================

#[test]
fn bytes_to_hex_empty() {
    assert_eq!(bytes_to_hex(&[]), "");
}

#[test]
fn bytes_to_hex_leading_zero() {
    assert_eq!(bytes_to_hex(&[0x0a, 0x00]), "0a00");
}

#[test]
fn bytes_to_hex_multi_byte() {
    assert_eq!(bytes_to_hex(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
}

// =============================================================================
// generate_token
// =============================================================================

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_two_calls_differ() {
    assert_ne!(generate_token(), generate_token());
}

// =============================================================================
// SessionUser
// =============================================================================

#[test]
fn session_user_converts_to_profile() {
    let id = Uuid::new_v4();
    let user = SessionUser {
        id,
        name: "ada".into(),
        email: Some("ada@example.com".into()),
        avatar_url: None,
    };
    let profile: moodboards::UserProfile = user.into();
    assert_eq!(profile.id, id);
    assert_eq!(profile.name, "ada");
    assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
    assert!(profile.avatar_url.is_none());
}

// =============================================================================
// LIVE DB
// =============================================================================

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::services::test_db::{live_pool, seed_user};

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn create_validate_rotate_delete() {
        let pool = live_pool().await;
        let user_id = seed_user(&pool, "session-flow").await;

        let token = create_session(&pool, user_id).await.unwrap();
        let user = validate_session(&pool, &token).await.unwrap().unwrap();
        assert_eq!(user.id, user_id);

        let fresh = rotate_session(&pool, &token).await.unwrap().unwrap();
        assert_ne!(fresh, token);
        assert!(validate_session(&pool, &token).await.unwrap().is_none());
        assert!(validate_session(&pool, &fresh).await.unwrap().is_some());

        delete_session(&pool, &fresh).await.unwrap();
        assert!(validate_session(&pool, &fresh).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn rotate_unknown_token_is_none() {
        let pool = live_pool().await;
        assert!(rotate_session(&pool, "nope").await.unwrap().is_none());
    }
}
