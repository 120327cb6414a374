//! HTTP/WebSocket Handlers

use axum::{
    Json,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;

use agent_core::{AgentError, Message as ChatMessage, SessionId, ToolSchema};
use wealth_advisor::BackendStatus;

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub ollama_connected: bool,
    pub tools: BackendStatus,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub session_id: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ollama_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        ollama_connected,
        tools: state.backends,
    })
}

/// Declared tool schemas
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolSchema>> {
    Json(state.tools.schemas())
}

/// Main chat endpoint (non-streaming)
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "EMPTY_MESSAGE", "message is required"));
    }

    respond(&state, payload).await.map(Json).map_err(|e| {
        tracing::error!(error = %e, "Agent error");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "AGENT_ERROR", e.user_message())
    })
}

/// Run one user turn inside the caller's session
async fn respond(state: &AppState, request: ChatRequest) -> Result<ChatResponse, AgentError> {
    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .map_or_else(SessionId::new, SessionId::from_string);
    let model = request.model.unwrap_or_else(|| state.default_model.clone());

    let mut session = state.sessions.load_or_create(&session_id)?;
    session.conversation.push(ChatMessage::user(request.message));

    let answer = state.agent(&model).run(&mut session.conversation).await?;

    session.touch();
    state.sessions.save(&session)?;

    Ok(ChatResponse {
        message: answer,
        session_id: session_id.to_string(),
        model,
    })
}

/// WebSocket chat
pub async fn chat_stream_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_stream(socket, state))
}

async fn handle_stream(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::error!(error = %e, "WebSocket error");
                break;
            }
            _ => continue,
        };

        let reply = match serde_json::from_str::<ChatRequest>(text.as_str()) {
            Ok(request) => match respond(&state, request).await {
                Ok(response) => json!({
                    "type": "response",
                    "message": response.message,
                    "session_id": response.session_id,
                    "model": response.model,
                }),
                Err(e) => {
                    tracing::error!(error = %e, "Agent error");
                    json!({ "type": "error", "error": e.user_message() })
                }
            },
            Err(e) => json!({ "type": "error", "error": e.to_string() }),
        };

        if sender.send(Message::Text(reply.to_string().into())).await.is_err() {
            break;
        }
    }

    tracing::debug!("WebSocket client disconnected");
}
