//! HTTP Tool Server
//!
//! Exposes a [`ToolRegistry`] to external agent callers over HTTP, keyed by
//! the same operation names and schemas the in-process agent uses.
//!
//! # Architecture
//!
//! ```text
//! Note tools (factory, injected NoteService)
//!         ↓
//! ToolRegistry (dispatch + validation)
//!         ↓
//! HTTP Endpoints (POST /tools/list, POST /tools/execute)
//!         ↓
//! External agents/clients
//! ```
//!
//! Per-request failures are reported as structured `{"error": …}` bodies and
//! never take the process down. Only available on the `tool-server` feature
//! (requires axum and tower).

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use log::{info, warn};
use serde_json::{json, Value};

use crate::notellm::tool_protocol::{ToolError, ToolRegistry};

/// Configuration for the tool server process.
#[derive(Debug, Clone)]
pub struct ToolServerConfig {
    /// Socket address to bind to (e.g. "127.0.0.1:8080").
    pub addr: SocketAddr,
    /// Optional bearer token required on every request.
    pub bearer_token: Option<String>,
}

#[derive(Clone)]
struct ServerState {
    registry: Arc<ToolRegistry>,
    bearer_token: Option<String>,
}

/// Build the tool-server router for the given registry.
pub fn router(registry: Arc<ToolRegistry>, bearer_token: Option<String>) -> Router {
    let state = ServerState {
        registry,
        bearer_token,
    };
    Router::new()
        .route("/tools/list", post(list_tools))
        .route("/tools/execute", post(execute_tool))
        .with_state(state)
}

/// Bind the configured address and serve until the process is stopped.
pub async fn serve(
    config: ToolServerConfig,
    registry: Arc<ToolRegistry>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = router(registry, config.bearer_token);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("tool server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn authorize(state: &ServerState, headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let expected = match &state.bearer_token {
        Some(token) => token,
        None => return Ok(()),
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if presented == Some(expected.as_str()) {
        Ok(())
    } else {
        warn!("rejected request with missing or invalid bearer token");
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        ))
    }
}

async fn list_tools(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }

    (
        StatusCode::OK,
        Json(json!({ "tools": state.registry.list_tools() })),
    )
}

async fn execute_tool(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }

    let tool_name = match payload.get("tool").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": "missing 'tool' field" })),
            );
        }
    };
    let parameters = payload.get("parameters").cloned().unwrap_or(Value::Null);

    match state.registry.execute(&tool_name, parameters).await {
        Ok(result) => (StatusCode::OK, Json(json!({ "result": result }))),
        Err(err @ ToolError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": err.to_string() })),
        ),
        Err(err @ ToolError::InvalidInput(_)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": err.to_string() })),
        ),
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": err.to_string() })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notellm::tool_protocol::{Tool, ToolMetadata, ToolParameter, ToolParameterType};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::util::ServiceExt;

    fn test_registry() -> Arc<ToolRegistry> {
        let echo = Tool::new(
            ToolMetadata::new("echo", "Echoes its input back").with_parameter(
                ToolParameter::new("text", ToolParameterType::String).required(),
            ),
            Arc::new(|args| {
                Box::pin(async move { Ok(args["text"].as_str().unwrap_or_default().to_string()) })
            }),
        );
        Arc::new(ToolRegistry::from_tools(vec![echo]).unwrap())
    }

    fn state_with_token(token: Option<&str>) -> ServerState {
        ServerState {
            registry: test_registry(),
            bearer_token: token.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_execute_success_wraps_result() {
        let (status, Json(body)) = execute_tool(
            State(state_with_token(None)),
            HeaderMap::new(),
            Json(json!({ "tool": "echo", "parameters": { "text": "hi" } })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "hi");
    }

    #[tokio::test]
    async fn test_execute_unknown_tool_is_404() {
        let (status, Json(body)) = execute_tool(
            State(state_with_token(None)),
            HeaderMap::new(),
            Json(json!({ "tool": "nope", "parameters": {} })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_execute_invalid_input_is_422() {
        let (status, Json(body)) = execute_tool(
            State(state_with_token(None)),
            HeaderMap::new(),
            Json(json!({ "tool": "echo", "parameters": {} })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("text"));
    }

    #[tokio::test]
    async fn test_list_tools_returns_metadata() {
        let (status, Json(body)) =
            list_tools(State(state_with_token(None)), HeaderMap::new()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tools"][0]["name"], "echo");
    }

    #[tokio::test]
    async fn test_router_enforces_bearer_token() {
        let app = router(test_registry(), Some("secret".to_string()));

        let denied = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tools/list")
                    .header("content-type", "application/json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);

        let allowed = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/tools/list")
                    .header("content-type", "application/json")
                    .header("authorization", "Bearer secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);

        let bytes = to_bytes(allowed.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["tools"][0]["name"], "echo");
    }
}
