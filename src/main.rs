mod db;
mod env;
mod llm;
mod rate_limit;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use llm::LlmChat;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let pool = db::init_pool(&database_url)
        .await
        .expect("database init failed");

    // Generation answers 500 until an LLM credential is configured.
    let llm: Option<Arc<dyn LlmChat>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured; generation disabled");
            None
        }
    };

    let email = services::email_auth::EmailDelivery::from_env();
    match &email {
        services::email_auth::EmailDelivery::Resend { from, .. } => {
            tracing::info!(%from, "email sign-in via Resend");
        }
        services::email_auth::EmailDelivery::DevEcho => {
            tracing::warn!("email sign-in codes are echoed in responses (AUTH_DEV_ECHO_CODE)");
        }
        services::email_auth::EmailDelivery::Disabled => {
            tracing::warn!("email sign-in disabled; set RESEND_API_KEY and RESEND_FROM");
        }
    }

    let rate_limits = rate_limit::RateLimitConfig::from_env();
    let state = state::AppState::new(pool, llm, rate_limits, email);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "moodgen listening");
    axum::serve(listener, app).await.expect("server failed");
}
