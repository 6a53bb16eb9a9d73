//! MCP server over newline-delimited stdio.
//!
//! Each request runs in its own task so a slow upstream call never blocks
//! the read loop; responses funnel through one writer task and may leave
//! in a different order than the requests arrived.

pub mod codec;
pub mod router;

use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tokio_util::sync::CancellationToken;

use crate::http::{HttpPipeline, ReqwestTransport};
use crate::resources::ResourceStore;
use crate::tools::{ToolContext, ToolRegistry};
use crate::types::{rpc_codes, BuildInfo, Config, Error, Result};
use codec::{decode, Incoming, JsonRpcResponse, MAX_LINE_BYTES};

/// Outgoing messages buffered between request tasks and the writer.
const OUTBOX_CAPACITY: usize = 64;

/// Tool registry plus invocation context, shared by every request task.
#[derive(Debug)]
pub struct McpServer {
    registry: ToolRegistry,
    ctx: ToolContext,
    cancel: CancellationToken,
}

impl McpServer {
    pub fn new(registry: ToolRegistry, ctx: ToolContext) -> Self {
        Self {
            registry,
            ctx,
            cancel: CancellationToken::new(),
        }
    }

    /// Wire the production stack from configuration.
    pub fn from_config(config: &Config, build: BuildInfo) -> Result<Self> {
        config.validate()?;

        let transport = ReqwestTransport::new(config.api.request_timeout)?;
        let pipeline = HttpPipeline::standard(
            &build,
            &config.retry,
            config.api.request_timeout,
            Arc::new(transport),
        );
        let registry = ToolRegistry::builtin()?.filtered(&config.tools);
        tracing::info!(
            tools = ?registry.list_names(),
            policies = ?pipeline.policy_names(),
            "mcp_server_configured"
        );

        let ctx = ToolContext {
            pipeline: Arc::new(pipeline),
            resources: Arc::new(ResourceStore::new(config.resources.default_ttl)),
            api: config.api.clone(),
            build,
            inline_limit_bytes: config.resources.inline_limit_bytes,
        };
        Ok(Self::new(registry, ctx))
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn context(&self) -> &ToolContext {
        &self.ctx
    }

    /// Stop reading input. In-flight requests still complete.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Handle one input line. `None` when no reply is due.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        match decode(line) {
            Incoming::Request { id, method, params } => {
                let response = match router::route_request(self, &method, params).await {
                    Ok(result) => JsonRpcResponse::success(id, result),
                    Err(err) => {
                        tracing::debug!(method = %method, error = %err, "rpc_request_failed");
                        JsonRpcResponse::failure(id, err.to_rpc_code(), err.to_string())
                    }
                };
                Some(response)
            }
            Incoming::Notification { method } => {
                tracing::debug!(method = %method, "rpc_notification");
                None
            }
            Incoming::Response => None,
            Incoming::Invalid(response) => Some(response),
        }
    }

    /// Serve until EOF on `reader` or [`McpServer::shutdown`], then drain.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_BYTES));
        let (tx, mut rx) = mpsc::channel::<JsonRpcResponse>(OUTBOX_CAPACITY);

        let writer_task = tokio::spawn(async move {
            let mut sink = FramedWrite::new(writer, LinesCodec::new());
            while let Some(response) = rx.recv().await {
                sink.send(response.encode()).await?;
            }
            Ok::<(), LinesCodecError>(())
        });

        let mut in_flight = JoinSet::new();
        // FramedRead yields a single `None` after a decode error, then resumes.
        let mut recovering = false;
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("mcp_server_shutdown_requested");
                    break;
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "rpc_task_failed");
                    }
                }
                next = lines.next() => match next {
                    None if recovering => {
                        recovering = false;
                    }
                    None => {
                        tracing::info!("stdin_closed");
                        break;
                    }
                    Some(Ok(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        let server = self.clone();
                        let tx = tx.clone();
                        in_flight.spawn(async move {
                            if let Some(response) = server.handle_line(&line).await {
                                // A closed outbox means the writer failed; serve reports it.
                                let _ = tx.send(response).await;
                            }
                        });
                    }
                    Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                        tracing::warn!(limit = MAX_LINE_BYTES, "rpc_line_too_long");
                        recovering = true;
                        let response = JsonRpcResponse::failure(
                            serde_json::Value::Null,
                            rpc_codes::INVALID_REQUEST,
                            format!("Message exceeds {} bytes", MAX_LINE_BYTES),
                        );
                        let _ = tx.send(response).await;
                    }
                    Some(Err(LinesCodecError::Io(e))) => {
                        tracing::error!(error = %e, "stdin_read_failed");
                        break;
                    }
                },
            }
        }

        let pending = in_flight.len();
        if pending > 0 {
            tracing::info!(pending, "draining_in_flight_requests");
        }
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "rpc_task_failed");
            }
        }
        drop(tx);

        match writer_task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(LinesCodecError::Io(e))) => Err(Error::Io(e)),
            Ok(Err(e)) => Err(Error::internal(format!("stdout write failed: {}", e))),
            Err(e) => Err(Error::internal(format!("writer task failed: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::context::testing::{context, ScriptedTransport};
    use serde_json::{json, Value};

    fn server() -> McpServer {
        let ctx = context(ScriptedTransport::new(Vec::new()), None);
        McpServer::new(ToolRegistry::builtin().unwrap(), ctx)
    }

    async fn call(server: &McpServer, line: &str) -> Value {
        let response = server.handle_line(line).await.unwrap();
        serde_json::from_str(&response.encode()).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_echoes_supported_version() {
        let server = server();
        let reply = call(
            &server,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","clientInfo":{"name":"t"}}}"#,
        )
        .await;
        assert_eq!(reply["result"]["protocolVersion"], "2025-03-26");
        assert_eq!(reply["result"]["serverInfo"]["name"], env!("CARGO_PKG_NAME"));
        assert!(reply["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_initialize_unknown_version_gets_ours() {
        let server = server();
        let reply = call(
            &server,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"1999-01-01"}}"#,
        )
        .await;
        assert_eq!(reply["result"]["protocolVersion"], router::PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_notification_has_no_reply() {
        let server = server();
        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let server = server();
        let reply = call(&server, r#"{"jsonrpc":"2.0","id":2,"method":"tools/destroy"}"#).await;
        assert_eq!(reply["error"]["code"], rpc_codes::METHOD_NOT_FOUND);
        assert_eq!(reply["id"], 2);
    }

    #[tokio::test]
    async fn test_tools_call_without_name() {
        let server = server();
        let reply = call(
            &server,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"arguments":{}}}"#,
        )
        .await;
        assert_eq!(reply["error"]["code"], rpc_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_tools_call_local_tool() {
        let server = server();
        let reply = call(
            &server,
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"version_tool"}}"#,
        )
        .await;
        assert_eq!(reply["result"]["isError"], false);
        assert_eq!(
            reply["result"]["structuredContent"]["version"],
            env!("CARGO_PKG_VERSION")
        );
    }

    #[tokio::test]
    async fn test_resources_read_and_miss() {
        let server = server();
        server.context().resources.create(
            "r1",
            "geo-mcp://temp/r1",
            crate::resources::ResourceData::Json(json!({"k": "v"})),
            None,
            None,
        );

        let listed = call(&server, r#"{"jsonrpc":"2.0","id":5,"method":"resources/list"}"#).await;
        assert_eq!(listed["result"]["resources"][0]["uri"], "geo-mcp://temp/r1");

        let read = call(
            &server,
            r#"{"jsonrpc":"2.0","id":6,"method":"resources/read","params":{"uri":"geo-mcp://temp/r1"}}"#,
        )
        .await;
        assert_eq!(read["result"]["contents"][0]["mimeType"], "application/json");

        let miss = call(
            &server,
            r#"{"jsonrpc":"2.0","id":7,"method":"resources/read","params":{"uri":"geo-mcp://temp/none"}}"#,
        )
        .await;
        assert_eq!(miss["error"]["code"], rpc_codes::RESOURCE_NOT_FOUND);
    }
}
