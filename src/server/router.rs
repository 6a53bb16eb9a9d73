//! Method dispatch for MCP requests.

use serde_json::{json, Value};

use super::McpServer;
use crate::schema::empty_object;
use crate::types::{Error, Result};

/// Protocol revision this server implements.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Revisions a client may ask for and get echoed back.
const SUPPORTED_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// Route a request to its handler.
pub async fn route_request(server: &McpServer, method: &str, params: Value) -> Result<Value> {
    match method {
        "initialize" => Ok(initialize(server, &params)),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": server.registry().listing() })),
        "tools/call" => call_tool(server, params).await,
        "resources/list" => Ok(list_resources(server)),
        "resources/templates/list" => Ok(json!({ "resourceTemplates": [] })),
        "resources/read" => read_resource(server, &params),
        _ => Err(Error::method_not_found(method)),
    }
}

fn initialize(server: &McpServer, params: &Value) -> Value {
    let requested = params.get("protocolVersion").and_then(Value::as_str);
    let version = requested
        .filter(|v| SUPPORTED_VERSIONS.contains(v))
        .unwrap_or(PROTOCOL_VERSION);
    let client = params
        .get("clientInfo")
        .and_then(|c| c.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    tracing::info!(client, protocol = version, requested = ?requested, "mcp_initialize");

    let build = &server.context().build;
    json!({
        "protocolVersion": version,
        "capabilities": {
            "tools": { "listChanged": false },
            "resources": { "subscribe": false, "listChanged": false },
        },
        "serverInfo": {
            "name": build.name,
            "version": build.version,
        },
    })
}

async fn call_tool(server: &McpServer, params: Value) -> Result<Value> {
    let name = str_field(&params, "name")?;
    let arguments = match params.get("arguments") {
        None | Some(Value::Null) => empty_object(),
        Some(arguments) => arguments.clone(),
    };
    let result = server
        .registry()
        .call(&name, arguments, server.context())
        .await;
    Ok(result.to_value())
}

fn list_resources(server: &McpServer) -> Value {
    let resources: Vec<Value> = server
        .context()
        .resources
        .list()
        .iter()
        .map(|resource| resource.listing())
        .collect();
    json!({ "resources": resources })
}

fn read_resource(server: &McpServer, params: &Value) -> Result<Value> {
    let uri = str_field(params, "uri")?;
    let resource = server
        .context()
        .resources
        .get(&uri)
        .ok_or_else(|| Error::not_found(format!("Resource not found: {}", uri)))?;
    Ok(json!({ "contents": [resource.data.to_contents(&resource.uri)] }))
}

pub fn str_field(body: &Value, key: &str) -> Result<String> {
    body.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| Error::validation(format!("Missing required field: {}", key)))
}
