//! HTTP/SSE transport for MCP

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::capabilities::Capabilities;
use crate::error::ServerResult;
use crate::protocol::{ClientPeer, McpMessage, RequestHandler};

/// Path clients POST session messages to
const MESSAGES_PATH: &str = "/mcp/messages";

/// Shared state for HTTP handlers
struct AppState {
    capabilities: Arc<Capabilities>,
    /// Stateless handler behind `POST /mcp`
    handler: RequestHandler,
    sessions: Mutex<HashMap<String, SseSession>>,
}

impl AppState {
    fn sessions(&self) -> MutexGuard<'_, HashMap<String, SseSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One open `GET /mcp/sse` stream
#[derive(Clone)]
struct SseSession {
    handler: Arc<RequestHandler>,
    peer: ClientPeer,
}

/// Removes the session once its event stream is dropped
struct SessionGuard {
    state: Arc<AppState>,
    session_id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(session) = self.state.sessions().remove(&self.session_id) {
            session.peer.cancel_all();
        }
        info!("SSE session {} closed", self.session_id);
    }
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    #[serde(rename = "sessionId")]
    session_id: String,
}

/// HTTP transport for MCP protocol
pub struct HttpTransport {
    capabilities: Arc<Capabilities>,
    port: u16,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(capabilities: Arc<Capabilities>, port: u16) -> Self {
        Self { capabilities, port }
    }

    /// Routes served by this transport
    pub fn router(&self) -> Router {
        let state = Arc::new(AppState {
            capabilities: self.capabilities.clone(),
            handler: RequestHandler::new(self.capabilities.clone()),
            sessions: Mutex::new(HashMap::new()),
        });

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/", get(health))
            .route("/health", get(health))
            .route("/mcp", post(handle_mcp_request))
            .route("/mcp/sse", get(handle_mcp_sse))
            .route(MESSAGES_PATH, post(handle_session_message))
            .layer(cors)
            .with_state(state)
    }

    /// Run the HTTP server
    pub async fn run(&self) -> ServerResult<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Starting MCP HTTP server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}

/// Health check endpoint
async fn health() -> &'static str {
    "OK"
}

/// Handle MCP JSON-RPC request via HTTP POST
async fn handle_mcp_request(
    State(state): State<Arc<AppState>>,
    Json(message): Json<McpMessage>,
) -> Response {
    debug!("HTTP request: {:?}", message.method);

    match state.handler.handle(message).await {
        Some(response) => Json(response).into_response(),
        // Notifications carry no reply
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Open an SSE session. The first event names the endpoint for this
/// session's messages; responses and server requests follow as `message`
/// events.
async fn handle_mcp_sse(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = Uuid::new_v4().to_string();
    let (peer, mut outbound) = ClientPeer::channel();
    let handler =
        Arc::new(RequestHandler::new(state.capabilities.clone()).with_peer(peer.clone()));

    state
        .sessions()
        .insert(session_id.clone(), SseSession { handler, peer });
    info!("SSE session {} opened", session_id);

    let endpoint = format!("{}?sessionId={}", MESSAGES_PATH, session_id);
    let guard = SessionGuard {
        state: state.clone(),
        session_id,
    };

    let stream = async_stream::stream! {
        let _guard = guard;
        yield Ok(Event::default().event("endpoint").data(endpoint));

        while let Some(message) = outbound.recv().await {
            match serde_json::to_string(&message) {
                Ok(data) => yield Ok(Event::default().event("message").data(data)),
                Err(e) => error!("Failed to serialize SSE message: {}", e),
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Accept a message for an SSE session; the answer goes out on its stream
async fn handle_session_message(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
    Json(message): Json<McpMessage>,
) -> StatusCode {
    let session = state.sessions().get(&query.session_id).cloned();
    let Some(session) = session else {
        warn!("Message for unknown SSE session {}", query.session_id);
        return StatusCode::NOT_FOUND;
    };

    debug!("SSE session {} message: {:?}", query.session_id, message.method);

    if message.method.is_none() {
        session.handler.handle(message).await;
    } else {
        tokio::spawn(async move {
            if let Some(response) = session.handler.handle(message).await {
                session.peer.send(response);
            }
        });
    }

    StatusCode::ACCEPTED
}
