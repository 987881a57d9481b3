use super::stub::{self, Hits};
use super::*;
use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;

#[test]
fn base_url_trailing_slash_is_trimmed() {
    let api = ApiClient::new("http://localhost:3000/");
    assert_eq!(api.url("/healthz"), "http://localhost:3000/healthz");
}

#[tokio::test]
async fn ping_ok() {
    let base = stub::spawn(Router::new().route("/healthz", get(|| async { StatusCode::OK }))).await;
    ApiClient::new(&base).ping().await.unwrap();
}

#[tokio::test]
async fn ping_reports_status() {
    let base = stub::spawn(Router::new().route("/healthz", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))).await;
    let err = ApiClient::new(&base).ping().await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 503, .. }));
}

#[tokio::test]
async fn error_body_message_is_preferred() {
    let router = Router::new().route(
        "/boom",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(serde_json::json!({ "error": "LLM API key not configured", "details": "logs" })),
            )
        }),
    );
    let base = stub::spawn(router).await;
    let api = ApiClient::new(&base);
    let err = send_json::<serde_json::Value>(api.request(Method::GET, "/boom")).await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "LLM API key not configured");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn plain_text_error_body_is_kept() {
    let router = Router::new().route("/nope", get(|| async { (StatusCode::BAD_REQUEST, "bad input") }));
    let base = stub::spawn(router).await;
    let err = send_json::<serde_json::Value>(ApiClient::new(&base).request(Method::GET, "/nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 400, ref message } if message == "bad input"));
}

#[tokio::test]
async fn undecodable_body_is_decode_error() {
    let router = Router::new().route("/text", get(|| async { "not json" }));
    let base = stub::spawn(router).await;
    let err = send_json::<serde_json::Value>(ApiClient::new(&base).request(Method::GET, "/text"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn authed_requires_session_and_sends_bearer() {
    let hits = Hits::default();
    let recorder = hits.clone();
    let router = Router::new().route(
        "/who",
        get(move |headers: HeaderMap| {
            let hits = recorder.clone();
            async move {
                hits.record("GET", "/who", &headers);
                axum::Json(serde_json::json!({}))
            }
        }),
    );
    let base = stub::spawn(router).await;
    let api = ApiClient::new(&base);

    let (_keep, signed_out) = stub::signed_out();
    assert!(matches!(api.authed(Method::GET, "/who", &signed_out), Err(ApiError::SignedOut)));

    let (_keep, ctx) = stub::signed_in("tok-1", uuid::Uuid::new_v4()).await;
    let (request, session) = api.authed(Method::GET, "/who", &ctx).unwrap();
    assert_eq!(session.token, "tok-1");
    send_json::<serde_json::Value>(request).await.unwrap();
    assert_eq!(hits.all(), vec!["GET /who Bearer tok-1".to_owned()]);
}
