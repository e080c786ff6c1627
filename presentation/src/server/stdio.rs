//! Stdio JSON-RPC server
//!
//! Reads newline-delimited frames, runs every tool call as its own task and
//! writes responses through a single writer task so frames never
//! interleave. At end of input the server waits for running calls so a
//! piped batch gets every answer; shutdown, a read error or a failed write
//! cancels them instead.

use crate::protocol::jsonrpc::{JsonRpcResponse, RpcError, codes, id_key};
use crate::protocol::stream::{Call, CallStyle, Frame, Notification, parse_frame};
use gateway_application::ExecutionDispatcher;
use gateway_domain::ToolRequest;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Protocol revision reported when the caller does not name one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

type InFlight = Arc<Mutex<HashMap<String, CancellationToken>>>;

pub struct StdioServer {
    dispatcher: Arc<ExecutionDispatcher>,
}

impl StdioServer {
    pub fn new(dispatcher: Arc<ExecutionDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Serve on the process's stdin and stdout until EOF or `shutdown`.
    pub async fn run(&self, shutdown: CancellationToken) -> std::io::Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout(), shutdown)
            .await
    }

    pub async fn serve<R, W>(
        &self,
        reader: R,
        writer: W,
        shutdown: CancellationToken,
    ) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        // Child tokens of `requests` are handed to every running call
        let requests = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let writer_task = tokio::spawn(write_frames(writer, rx, requests.clone()));

        let in_flight: InFlight = Arc::new(Mutex::new(HashMap::new()));
        let mut tasks = JoinSet::new();
        let mut lines = BufReader::new(reader).lines();

        info!("Serving JSON-RPC on stdio");
        let read_result = loop {
            while tasks.try_join_next().is_some() {}

            let line = tokio::select! {
                _ = shutdown.cancelled() => break Ok(()),
                // Output is gone; nobody can receive further answers
                _ = requests.cancelled() => break Ok(()),
                line = lines.next_line() => line,
            };
            match line {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => {
                    self.handle_line(&line, &tx, &requests, &in_flight, &mut tasks);
                }
                Ok(None) => {
                    debug!("Input closed");
                    break Ok(());
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read from input");
                    break Err(e);
                }
            }
        };

        if read_result.is_err() || shutdown.is_cancelled() {
            requests.cancel();
        } else if !tasks.is_empty() {
            debug!(running = tasks.len(), "Waiting for running calls");
        }
        loop {
            tokio::select! {
                joined = tasks.join_next() => {
                    if joined.is_none() {
                        break;
                    }
                }
                _ = shutdown.cancelled(), if !requests.is_cancelled() => {
                    info!(running = tasks.len(), "Shutdown requested; cancelling running calls");
                    requests.cancel();
                }
            }
        }
        drop(tx);
        if let Err(e) = writer_task.await {
            warn!(error = %e, "Writer task failed");
        }
        info!("Stdio server stopped");
        read_result
    }

    fn handle_line(
        &self,
        line: &str,
        tx: &mpsc::UnboundedSender<String>,
        requests: &CancellationToken,
        in_flight: &InFlight,
        tasks: &mut JoinSet<()>,
    ) {
        let frame = match parse_frame(line, self.dispatcher.registry()) {
            Ok(frame) => frame,
            Err(e) => {
                debug!(code = e.error.code, message = %e.error.message, "Rejected frame");
                send(tx, JsonRpcResponse::failure(e.id, e.error));
                return;
            }
        };

        match frame {
            Frame::Notification(Notification::Cancelled { request_id }) => {
                let key = id_key(&request_id);
                if let Ok(map) = in_flight.lock()
                    && let Some(token) = map.get(&key)
                {
                    info!(request_id = %key, "Cancelling request");
                    token.cancel();
                }
            }
            Frame::Notification(Notification::Initialized) => debug!("Client initialized"),
            Frame::Notification(Notification::Other(method)) => {
                debug!(method = %method, "Ignoring notification");
            }
            Frame::Request { id, call } => match call {
                Call::Initialize { protocol_version } => {
                    send(tx, JsonRpcResponse::success(id, initialize_result(protocol_version)));
                }
                Call::ListTools => {
                    send(tx, JsonRpcResponse::success(id, self.tools_result()));
                }
                Call::ListModels => {
                    send(tx, JsonRpcResponse::success(id, self.models_result()));
                }
                Call::CloseThread(token) => {
                    let dispatcher = self.dispatcher.clone();
                    let tx = tx.clone();
                    tasks.spawn(async move {
                        let response = match dispatcher.close_thread(&token).await {
                            Ok(closed) => JsonRpcResponse::success(
                                id,
                                json!({ "continuation_id": token.as_str(), "closed": closed }),
                            ),
                            Err(e) => JsonRpcResponse::failure(id, RpcError::from_gateway(&e, None)),
                        };
                        send(&tx, response);
                    });
                }
                Call::Tool { request, style } => {
                    let key = id_key(&id);
                    let cancel = requests.child_token();
                    if let Ok(mut map) = in_flight.lock() {
                        if map.contains_key(&key) {
                            warn!(request_id = %key, "Request id already in flight");
                            send(
                                tx,
                                JsonRpcResponse::failure(
                                    id,
                                    RpcError::new(
                                        codes::INVALID_REQUEST,
                                        format!("Invalid request: id {key} is already in flight"),
                                    ),
                                ),
                            );
                            return;
                        }
                        map.insert(key.clone(), cancel.clone());
                    }
                    let dispatcher = self.dispatcher.clone();
                    let in_flight = in_flight.clone();
                    let tx = tx.clone();
                    tasks.spawn(async move {
                        let response = run_tool(&dispatcher, id, &request, style, &cancel).await;
                        if let Ok(mut map) = in_flight.lock() {
                            map.remove(&key);
                        }
                        send(&tx, response);
                    });
                }
            },
        }
    }

    fn tools_result(&self) -> Value {
        let tools: Vec<Value> = self
            .dispatcher
            .list_tools()
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "inputSchema": tool.input_schema(),
                    "requiredCapabilities": tool.required_capabilities,
                    "acceptsFiles": tool.accepts_files,
                    "acceptsImages": tool.accepts_images,
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    fn models_result(&self) -> Value {
        let models: Vec<Value> = self
            .dispatcher
            .list_models()
            .iter()
            .map(|entry| {
                let mut value = serde_json::to_value(entry).unwrap_or(Value::Null);
                value["available"] = json!(entry.is_available());
                value
            })
            .collect();
        json!({ "models": models })
    }
}

async fn run_tool(
    dispatcher: &ExecutionDispatcher,
    id: Value,
    request: &ToolRequest,
    style: CallStyle,
    cancel: &CancellationToken,
) -> JsonRpcResponse {
    match dispatcher.dispatch(request, cancel).await {
        Ok(response) => {
            let structured = serde_json::to_value(&response).unwrap_or(Value::Null);
            let result = match style {
                CallStyle::Canonical => structured,
                CallStyle::Mcp => json!({
                    "content": [{ "type": "text", "text": response.content }],
                    "structuredContent": structured,
                    "isError": false,
                }),
            };
            JsonRpcResponse::success(id, result)
        }
        Err(e) => JsonRpcResponse::failure(
            id,
            RpcError::from_gateway(&e.error, e.continuation_id.as_ref()),
        ),
    }
}

fn initialize_result(protocol_version: Option<String>) -> Value {
    json!({
        "protocolVersion": protocol_version.unwrap_or_else(|| DEFAULT_PROTOCOL_VERSION.to_string()),
        "serverInfo": {
            "name": "zen-gateway",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "capabilities": { "tools": {} },
    })
}

fn send(tx: &mpsc::UnboundedSender<String>, response: JsonRpcResponse) {
    if tx.send(response.to_line()).is_err() {
        debug!("Writer closed; dropping response");
    }
}

/// Drain `rx` into `writer`. A failed write cancels `requests`.
async fn write_frames<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<String>,
    requests: CancellationToken,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(mut line) = rx.recv().await {
        line.push('\n');
        let written = match writer.write_all(line.as_bytes()).await {
            Ok(()) => writer.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            warn!(error = %e, "Failed to write response; cancelling running calls");
            requests.cancel();
            break;
        }
    }
}
