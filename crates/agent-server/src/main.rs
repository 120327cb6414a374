//! Wealth Advisor HTTP Server
//!
//! Axum-based server providing REST API and WebSocket endpoints for the
//! wealth advisor agent.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{LlmProvider, MemorySessionStore};
use agent_runtime::OllamaProvider;
use wealth_advisor::{AdvisorConfig, Backends};

use crate::handlers::{chat_handler, chat_stream_handler, health_check, list_tools};
use crate::state::AppState;

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/tools", get(list_tools))
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/stream", get(chat_stream_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let provider = Arc::new(OllamaProvider::from_env()?);
    match provider.health_check().await {
        Ok(true) => {
            let models = provider.list_models().await.unwrap_or_default();
            let models: Vec<_> = models.iter().map(|m| m.id.as_str()).collect();
            tracing::info!(?models, "Connected to Ollama");
        }
        Ok(false) | Err(_) => {
            tracing::warn!("Ollama not available - chat requests will fail until it is running");
        }
    }

    let config = AdvisorConfig::from_env();
    let backends = Backends::connect(&config).await;
    let tools = backends.tool_registry();
    tracing::info!(tools = ?tools.names(), status = ?backends.status(), "Registered tools");

    let state = AppState {
        provider,
        tools: Arc::new(tools),
        sessions: Arc::new(MemorySessionStore::new()),
        backends: backends.status(),
        default_model: std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".into()),
    };

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Wealth advisor server running on http://{addr}");
    tracing::info!("  GET  /health          - Health check");
    tracing::info!("  GET  /api/tools       - Tool schemas");
    tracing::info!("  POST /api/chat        - Send message");
    tracing::info!("  GET  /api/chat/stream - WebSocket chat");

    axum::serve(listener, router(state)).await?;

    Ok(())
}
