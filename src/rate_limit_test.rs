use super::*;

fn limiter(per_user: usize, global: usize) -> RateLimiter {
    RateLimiter::new(RateLimitConfig {
        per_user_limit: per_user,
        per_user_window: Duration::from_secs(60),
        global_limit: global,
        global_window: Duration::from_secs(60),
    })
}

#[test]
fn allows_up_to_per_user_limit() {
    let rl = limiter(3, 100);
    let user = Uuid::new_v4();
    for _ in 0..3 {
        assert!(rl.check_and_record(user).is_ok());
    }
    let err = rl.check_and_record(user).unwrap_err();
    assert!(matches!(err, RateLimitError::PerUserExceeded { limit: 3, window_secs: 60 }));
}

#[test]
fn users_are_limited_independently() {
    let rl = limiter(1, 100);
    assert!(rl.check_and_record(Uuid::new_v4()).is_ok());
    assert!(rl.check_and_record(Uuid::new_v4()).is_ok());
}

#[test]
fn global_limit_spans_users() {
    let rl = limiter(10, 2);
    assert!(rl.check_and_record(Uuid::new_v4()).is_ok());
    assert!(rl.check_and_record(Uuid::new_v4()).is_ok());
    let err = rl.check_and_record(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, RateLimitError::GlobalExceeded { limit: 2, .. }));
}

#[test]
fn rejected_request_is_not_recorded() {
    let rl = limiter(10, 1);
    let user = Uuid::new_v4();
    assert!(rl.check_and_record(user).is_ok());
    assert!(rl.check_and_record(user).is_err());
    let inner = rl.inner.lock().unwrap();
    assert_eq!(inner.user_requests[&user].len(), 1);
    assert_eq!(inner.global_requests.len(), 1);
}

#[test]
fn window_expiry_frees_capacity() {
    let rl = limiter(1, 10);
    let user = Uuid::new_v4();
    let start = Instant::now();
    assert!(rl.check_and_record_at(user, start).is_ok());
    assert!(rl.check_and_record_at(user, start + Duration::from_secs(30)).is_err());
    assert!(
        rl.check_and_record_at(user, start + Duration::from_secs(61))
            .is_ok()
    );
}

#[test]
fn idle_users_are_forgotten() {
    let rl = limiter(5, 100);
    let start = Instant::now();
    for _ in 0..3 {
        rl.check_and_record_at(Uuid::new_v4(), start).unwrap();
    }
    assert_eq!(rl.inner.lock().unwrap().user_requests.len(), 3);

    let active = Uuid::new_v4();
    rl.check_and_record_at(active, start + Duration::from_secs(61)).unwrap();
    let inner = rl.inner.lock().unwrap();
    assert_eq!(inner.user_requests.len(), 1);
    assert!(inner.user_requests.contains_key(&active));
}

#[test]
fn clones_share_state() {
    let rl = limiter(1, 10);
    let clone = rl.clone();
    let user = Uuid::new_v4();
    assert!(rl.check_and_record(user).is_ok());
    assert!(clone.check_and_record(user).is_err());
}

#[test]
fn error_messages_name_the_limit() {
    let err = RateLimitError::PerUserExceeded { limit: 10, window_secs: 60 };
    assert_eq!(err.to_string(), "per-user rate limit exceeded (max 10 requests/60s)");
}
