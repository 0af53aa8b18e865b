//! Guided operation lookup over stdio: the server asks the client to sample
//! an operation id and answers the tool call once the client replies.

use std::path::PathBuf;
use std::sync::Arc;

use paystack_mcp_server::tools::GetPaystackOperationGuided;
use paystack_mcp_server::{Capabilities, StdioTransport};
use paystack_openapi::OpenApiParser;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, WriteHalf};

type ClientReader = Lines<BufReader<tokio::io::ReadHalf<DuplexStream>>>;

async fn transport() -> StdioTransport {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../openapi-parser/tests/fixtures/paystack.openapi.yaml");
    let mut parser = OpenApiParser::new(path);
    parser.parse().await;

    let guided = GetPaystackOperationGuided::new(Arc::new(parser));
    StdioTransport::new(Arc::new(Capabilities::new().with_tool(guided)))
}

async fn send(writer: &mut WriteHalf<DuplexStream>, message: Value) {
    let mut line = message.to_string();
    line.push('\n');
    writer.write_all(line.as_bytes()).await.unwrap();
}

async fn receive(reader: &mut ClientReader) -> Value {
    let line = reader
        .next_line()
        .await
        .unwrap()
        .expect("server closed the stream");
    serde_json::from_str(&line).unwrap()
}

fn initialize(capabilities: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": capabilities,
            "clientInfo": {"name": "test-client", "version": "1.0"}
        }
    })
}

fn guided_call() -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "tools/call",
        "params": {
            "name": "get_paystack_operation_guided",
            "arguments": {"query": "Show me the details of transaction 42"}
        }
    })
}

#[tokio::test]
async fn test_guided_lookup_round_trips_through_client_sampling() {
    let (client, server) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server);
    let serving = tokio::spawn(async move {
        transport()
            .await
            .serve(BufReader::new(server_read), server_write)
            .await
    });

    let (client_read, mut client_write) = tokio::io::split(client);
    let mut replies = BufReader::new(client_read).lines();

    send(&mut client_write, initialize(json!({"sampling": {}}))).await;
    assert_eq!(receive(&mut replies).await["id"], 1);

    send(&mut client_write, guided_call()).await;

    let sampling = receive(&mut replies).await;
    assert_eq!(sampling["method"], "sampling/createMessage");
    assert_eq!(sampling["params"]["maxTokens"], 1024);
    let prompt = sampling["params"]["messages"][0]["content"]["text"]
        .as_str()
        .unwrap();
    assert!(prompt.contains("transaction_fetch"));
    assert!(prompt.contains("Show me the details of transaction 42"));

    send(
        &mut client_write,
        json!({
            "jsonrpc": "2.0",
            "id": sampling["id"],
            "result": {
                "role": "assistant",
                "content": {"type": "text", "text": "transaction_fetch"},
                "model": "test-model"
            }
        }),
    )
    .await;

    let answer = receive(&mut replies).await;
    assert_eq!(answer["id"], 2);
    let text = answer["result"]["content"][0]["text"].as_str().unwrap();
    let operation: Value = serde_json::from_str(text).unwrap();
    assert_eq!(operation["method"], "get");
    assert_eq!(operation["pathParameter"][0]["name"], "id");

    client_write.shutdown().await.unwrap();
    serving.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_guided_lookup_needs_sampling_capability() {
    let (client, server) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server);
    let serving = tokio::spawn(async move {
        transport()
            .await
            .serve(BufReader::new(server_read), server_write)
            .await
    });

    let (client_read, mut client_write) = tokio::io::split(client);
    let mut replies = BufReader::new(client_read).lines();

    send(&mut client_write, initialize(json!({}))).await;
    receive(&mut replies).await;

    send(&mut client_write, guided_call()).await;
    let answer = receive(&mut replies).await;
    assert_eq!(answer["id"], 2);
    assert_eq!(answer["result"]["isError"], true);

    client_write.shutdown().await.unwrap();
    serving.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_eof_fails_an_unanswered_sampling_request() {
    let (client, server) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server);
    let serving = tokio::spawn(async move {
        transport()
            .await
            .serve(BufReader::new(server_read), server_write)
            .await
    });

    let (client_read, mut client_write) = tokio::io::split(client);
    let mut replies = BufReader::new(client_read).lines();

    send(&mut client_write, initialize(json!({"sampling": {}}))).await;
    receive(&mut replies).await;
    send(&mut client_write, guided_call()).await;
    assert_eq!(receive(&mut replies).await["method"], "sampling/createMessage");

    // Hang up without answering
    client_write.shutdown().await.unwrap();

    let answer = receive(&mut replies).await;
    assert_eq!(answer["id"], 2);
    assert_eq!(
        answer["result"]["content"][0]["text"],
        "Operation with ID cannot be inferred."
    );
    serving.await.unwrap().unwrap();
}
