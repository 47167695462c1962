use mock_server::MockState;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let api_key = std::env::var("MICROCMS_API_KEY").unwrap_or_else(|_| "dev-key".to_string());
    let draft_key = std::env::var("MICROCMS_GLOBAL_DRAFT_KEY").unwrap_or_default();

    let state = MockState::new(api_key)
        .with_global_draft_key(draft_key)
        .with_content("blogs", json!({"id": "hello-world", "title": "Hello, world"}))
        .with_draft("blogs", json!({"id": "upcoming", "title": "Coming soon"}));

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    mock_server::run(listener, state).await
}
