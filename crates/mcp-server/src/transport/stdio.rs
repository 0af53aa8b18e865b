//! stdio transport for MCP

use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::capabilities::Capabilities;
use crate::error::ServerResult;
use crate::protocol::{ClientPeer, McpError, McpMessage, RequestHandler};

/// Newline-delimited JSON-RPC over stdin/stdout.
///
/// Requests run as separate tasks so a tool waiting on the client (for
/// sampling) does not block reading the client's reply.
pub struct StdioTransport {
    capabilities: Arc<Capabilities>,
}

impl StdioTransport {
    /// Create a new stdio transport
    pub fn new(capabilities: Arc<Capabilities>) -> Self {
        Self { capabilities }
    }

    /// Serve stdin until EOF
    pub async fn run(&self) -> ServerResult<()> {
        info!("Starting MCP server on stdio");
        let reader = BufReader::new(tokio::io::stdin());
        self.serve(reader, tokio::io::stdout()).await
    }

    /// Serve one message per line from `reader`, answering on `writer`
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> ServerResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (peer, mut outbound) = ClientPeer::channel();
        let handler =
            Arc::new(RequestHandler::new(self.capabilities.clone()).with_peer(peer.clone()));

        let mut lines = reader.lines();
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("EOF received, shutting down");
                        break;
                    };

                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    debug!("Received: {}", line);

                    match serde_json::from_str::<McpMessage>(line) {
                        // Client responses only complete a pending request
                        Ok(message) if message.method.is_none() => {
                            handler.handle(message).await;
                        }
                        Ok(message) => {
                            let handler = handler.clone();
                            let peer = peer.clone();
                            in_flight.spawn(async move {
                                if let Some(response) = handler.handle(message).await {
                                    peer.send(response);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Failed to parse message: {}", e);
                            let response =
                                McpMessage::error_response(None, McpError::parse_error());
                            write_message(&mut writer, &response).await?;
                        }
                    }
                }
                Some(message) = outbound.recv() => {
                    write_message(&mut writer, &message).await?;
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        error!("Request task failed: {}", e);
                    }
                }
            }
        }

        // No replies can arrive after EOF
        peer.cancel_all();
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!("Request task failed: {}", e);
            }
        }
        while let Ok(message) = outbound.try_recv() {
            write_message(&mut writer, &message).await?;
        }

        Ok(())
    }
}

async fn write_message<W>(writer: &mut W, message: &McpMessage) -> ServerResult<()>
where
    W: AsyncWrite + Unpin,
{
    let line = serde_json::to_string(message)?;
    debug!("Sending: {}", line);
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_one_response_per_request_line() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            "{not json\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":99,"result":{}}"#,
            "\n",
        );

        let transport = StdioTransport::new(Arc::new(Capabilities::new()));
        let mut output = Vec::new();
        transport.serve(input.as_bytes(), &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);

        // Requests run concurrently, so match answers by id
        let by_id = |id: Value| lines.iter().find(|line| line["id"] == id).unwrap();
        assert_eq!(by_id(json!(1))["result"], json!({}));
        assert_eq!(by_id(Value::Null)["error"]["code"], -32700);
        assert_eq!(by_id(json!(2))["result"]["tools"], json!([]));
    }
}
