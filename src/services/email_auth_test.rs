use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn normalize_email_accepts_basic_address() {
    assert_eq!(normalize_email("  USER@Example.com "), Some("user@example.com".to_owned()));
}

#[test]
fn normalize_email_rejects_invalid_values() {
    assert_eq!(normalize_email(""), None);
    assert_eq!(normalize_email("user"), None);
    assert_eq!(normalize_email("@example.com"), None);
    assert_eq!(normalize_email("user@"), None);
    assert_eq!(normalize_email("a@b@c"), None);
}

#[test]
fn normalize_code_accepts_upper_and_normalizes() {
    let code = generate_access_code();
    assert_eq!(normalize_code(&code), Some(code.clone()));
    assert_eq!(normalize_code(" abc234 "), Some("ABC234".to_owned()));
}

#[test]
fn normalize_code_rejects_bad_shapes() {
    assert_eq!(normalize_code("abc23"), None);
    assert_eq!(normalize_code("abc2345"), None);
    assert_eq!(normalize_code("ABC1I0"), None);
    assert_eq!(normalize_code("ABC23!"), None);
}

#[test]
fn generate_access_code_shape() {
    let code = generate_access_code();
    assert_eq!(code.len(), 6);
    assert!(code.bytes().all(|c| CODE_ALPHABET.contains(&c)));
}

#[test]
fn hash_access_code_is_stable_hex() {
    let a = hash_access_code("ABC234");
    assert_eq!(a, hash_access_code("ABC234"));
    assert_ne!(a, hash_access_code("ABC235"));
    assert_eq!(a.len(), 64);
}

#[test]
fn display_name_trimmed_and_capped() {
    assert_eq!(normalize_display_name("  Ada  "), Some("Ada".to_owned()));
    assert_eq!(normalize_display_name("   "), None);
    let long = "x".repeat(200);
    assert_eq!(normalize_display_name(&long).map(|n| n.chars().count()), Some(MAX_DISPLAY_NAME_CHARS));
}

#[test]
fn name_from_email_uses_local_part() {
    assert_eq!(name_from_email("ada@example.com"), "ada");
}

#[test]
fn render_template_injects_email_and_code() {
    let html = render_email_auth_template("user@example.com", "ABC234");
    assert!(html.contains("user@example.com"));
    assert!(html.contains("ABC234"));
    assert!(!html.contains("{{EMAIL}}"));
    assert!(!html.contains("{{CODE}}"));
}

// =============================================================================
// EmailDelivery
// =============================================================================

#[test]
fn delivery_prefers_resend_when_configured() {
    let delivery = EmailDelivery::from_lookup(lookup_from(&[
        ("RESEND_API_KEY", "re_123"),
        ("RESEND_FROM", "Moodboards <hi@example.com>"),
        ("AUTH_DEV_ECHO_CODE", "true"),
    ]));
    assert_eq!(
        delivery,
        EmailDelivery::Resend { api_key: "re_123".into(), from: "Moodboards <hi@example.com>".into() }
    );
}

#[test]
fn delivery_needs_both_resend_values() {
    let delivery = EmailDelivery::from_lookup(lookup_from(&[("RESEND_API_KEY", "re_123")]));
    assert_eq!(delivery, EmailDelivery::Disabled);
}

#[test]
fn delivery_dev_echo_flag() {
    let delivery = EmailDelivery::from_lookup(lookup_from(&[("AUTH_DEV_ECHO_CODE", "1")]));
    assert_eq!(delivery, EmailDelivery::DevEcho);
    assert!(delivery.is_enabled());
}

#[test]
fn delivery_defaults_to_disabled() {
    let delivery = EmailDelivery::from_lookup(lookup_from(&[("AUTH_DEV_ECHO_CODE", "nah")]));
    assert_eq!(delivery, EmailDelivery::Disabled);
    assert!(!delivery.is_enabled());
}

#[tokio::test]
async fn dev_echo_returns_code() {
    let echoed = EmailDelivery::DevEcho.deliver("a@b.c", "ABC234").await.unwrap();
    assert_eq!(echoed.as_deref(), Some("ABC234"));
}

#[tokio::test]
async fn disabled_delivery_refuses() {
    let err = EmailDelivery::Disabled.deliver("a@b.c", "ABC234").await.unwrap_err();
    assert!(matches!(err, EmailAuthError::DeliveryUnavailable));
}

// =============================================================================
// LIVE DB
// =============================================================================

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::services::test_db::live_pool;

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn request_then_verify_signs_in() {
        let pool = live_pool().await;
        let email = format!("{}@example.com", Uuid::new_v4());
        let code = request_access_code(&pool, &email, Some("Ada")).await.unwrap();
        let user_id = verify_access_code(&pool, &email, &code.to_ascii_lowercase()).await.unwrap();

        let name: String = sqlx::query("SELECT name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .unwrap()
            .get("name");
        assert_eq!(name, "Ada");

        let reused = verify_access_code(&pool, &email, &code).await;
        assert!(matches!(reused, Err(EmailAuthError::VerificationFailed)));
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn wrong_guesses_burn_the_code() {
        let pool = live_pool().await;
        let email = format!("{}@example.com", Uuid::new_v4());
        let code = request_access_code(&pool, &email, None).await.unwrap();
        let wrong = if code == "AAAAAA" { "BBBBBB" } else { "AAAAAA" };
        for _ in 0..MAX_FAILED_ATTEMPTS {
            assert!(verify_access_code(&pool, &email, wrong).await.is_err());
        }
        assert!(matches!(
            verify_access_code(&pool, &email, &code).await,
            Err(EmailAuthError::VerificationFailed)
        ));
    }
}
