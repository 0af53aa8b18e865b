//! Requests sent from the server to the connected client

use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::types::{McpError, McpMessage};

/// How long a server-initiated request waits for the client
pub const CLIENT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Handle on the client side of a session.
///
/// A connected peer shares the transport's outbound queue: responses and
/// server-initiated requests go through [`send`](Self::send), and replies
/// from the client are matched back to waiting requests by id. A detached
/// peer (the default) belongs to transports that cannot carry requests
/// towards the client.
#[derive(Clone, Default)]
pub struct ClientPeer {
    link: Option<Arc<PeerLink>>,
}

struct PeerLink {
    outbound: mpsc::UnboundedSender<McpMessage>,
    pending: Mutex<HashMap<u64, oneshot::Sender<McpMessage>>>,
    next_id: AtomicU64,
    sampling: AtomicBool,
}

impl PeerLink {
    fn pending(&self) -> MutexGuard<'_, HashMap<u64, oneshot::Sender<McpMessage>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ClientPeer {
    /// Connected peer plus the queue the transport drains towards the client
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<McpMessage>) {
        let (outbound, receiver) = mpsc::unbounded_channel();
        let link = PeerLink {
            outbound,
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            sampling: AtomicBool::new(false),
        };
        (
            Self {
                link: Some(Arc::new(link)),
            },
            receiver,
        )
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Whether the client advertised `sampling` during initialization
    pub fn supports_sampling(&self) -> bool {
        self.link
            .as_ref()
            .is_some_and(|link| link.sampling.load(Ordering::Acquire))
    }

    pub(crate) fn set_sampling(&self, enabled: bool) {
        if let Some(link) = &self.link {
            link.sampling.store(enabled, Ordering::Release);
        }
    }

    /// Queue a message for the client; false once the transport is gone
    pub fn send(&self, message: McpMessage) -> bool {
        self.link
            .as_ref()
            .is_some_and(|link| link.outbound.send(message).is_ok())
    }

    /// Send a request to the client and wait for its result
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, McpError> {
        let link = self.link.as_ref().ok_or_else(|| {
            McpError::internal_error("This transport cannot send requests to the client")
        })?;

        let id = link.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();
        link.pending().insert(id, reply_tx);

        debug!("Sending {} request {} to client", method, id);

        if link
            .outbound
            .send(McpMessage::request(id, method, Some(params)))
            .is_err()
        {
            link.pending().remove(&id);
            return Err(McpError::internal_error("Client disconnected"));
        }

        let reply = match tokio::time::timeout(CLIENT_REQUEST_TIMEOUT, reply_rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => return Err(McpError::internal_error("Client disconnected")),
            Err(_) => {
                link.pending().remove(&id);
                return Err(McpError::internal_error(format!(
                    "Client did not answer {} in time",
                    method
                )));
            }
        };

        match (reply.result, reply.error) {
            (_, Some(error)) => Err(error),
            (result, None) => Ok(result.unwrap_or(Value::Null)),
        }
    }

    /// Hand a client response to the request waiting for it; false when
    /// nothing is waiting
    pub(crate) fn resolve(&self, response: McpMessage) -> bool {
        let Some(link) = &self.link else {
            return false;
        };
        let Some(id) = response.id.as_ref().and_then(Value::as_u64) else {
            return false;
        };

        match link.pending().remove(&id) {
            Some(waiting) => waiting.send(response).is_ok(),
            None => false,
        }
    }

    /// Fail every outstanding request, e.g. when the client goes away
    pub(crate) fn cancel_all(&self) {
        if let Some(link) = &self.link {
            link.pending().clear();
        }
    }
}
