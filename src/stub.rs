use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::webhook::DEFAULT_ACTION;

// -----------------------------------------------------------------------------
// Local stand-in for the n8n chat flow
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub chat_input: String,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ActionQuery {
    pub action: Option<String>,
}

pub struct StubState {
    pub greeting: String,
}

pub fn router(greeting: impl Into<String>) -> Router {
    let state = Arc::new(StubState {
        greeting: greeting.into(),
    });

    Router::new()
        .route("/webhook/chat", post(chat_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serves `router` on an ephemeral local port and returns the bound address.
pub async fn spawn(router: Router) -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("Stub webhook stopped with error: {}", e);
        }
    });

    info!("Stub webhook listening on {}", addr);
    Ok(addr)
}

async fn chat_handler(
    State(state): State<Arc<StubState>>,
    Query(query): Query<ActionQuery>,
    Json(payload): Json<ChatPayload>,
) -> impl IntoResponse {
    if query.action.as_deref() != Some(DEFAULT_ACTION) {
        error!("Stub webhook called without action={}", DEFAULT_ACTION);
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "unknown action" })),
        );
    }

    info!(
        "Stub webhook received message for session {}",
        payload.session_id
    );

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "output": format!("{} You said: {}", state.greeting, payload.chat_input)
        })),
    )
}
