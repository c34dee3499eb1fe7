//! MCP news source.
//!
//! Calls a single tool on an MCP server over JSON-RPC 2.0 (plain HTTP POST)
//! and pulls the snippet text out of the tool result.  The envelope we accept
//! is, in order of preference:
//!
//! * `result.content[0].text` (the standard MCP tool result shape),
//! * `result` as a bare string,
//! * anything else under `result`, pretty-printed as JSON.
//!
//! A response with no `result` at all yields [`NO_NEWS_FOUND`] rather than
//! an error.  A `content` list whose first entry is not an object is a
//! [`FetchError::Decode`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{FetchError, Fetcher};
use crate::config::KEY_PLACEHOLDER;

/// Text returned when the service answers without a `result`.
pub const NO_NEWS_FOUND: &str = "No news found.";

/// Suffix appended to every query so the snippet is plain prose.
const QUERY_SUFFIX: &str = ", remove citations and dont use markdown";

/// Where and how to reach the MCP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpConfig {
    /// JSON-RPC endpoint.
    pub url: String,
    /// Tool invoked through `tools/call`.
    pub tool: String,
    /// Query text; `{key}` is replaced with the key being fetched.
    pub query_template: String,
    /// Bound on the whole request, connect to last body byte.
    pub timeout: Duration,
}

/// JSON-RPC 2.0 request.
#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// A [`Fetcher`] backed by an MCP server tool.
pub struct McpFetcher {
    client: reqwest::Client,
    config: McpConfig,
    next_id: AtomicU64,
}

impl McpFetcher {
    /// Create a fetcher.  Fails only if the HTTP client cannot be built
    /// (e.g. no TLS backend available).
    pub fn new(config: McpConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().build()?;
        info!(url = %config.url, tool = %config.tool, "MCP fetcher initialised");
        Ok(Self {
            client,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    /// The natural-language query sent upstream for `key`.
    pub fn query_for(&self, key: &str) -> String {
        self.config.query_template.replace(KEY_PLACEHOLDER, key)
    }

    fn request_for(&self, key: &str) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method: "tools/call",
            params: json!({
                "name": self.config.tool,
                "arguments": {
                    "messages": [
                        { "role": "user", "content": format!("{}{QUERY_SUFFIX}", self.query_for(key)) }
                    ],
                    "output_format": "json"
                }
            }),
        }
    }

    async fn call(&self, key: &str) -> Result<String, FetchError> {
        let request = self.request_for(key);
        debug!(key = %key, id = request.id, "sending tools/call");

        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        debug!(key = %key, status = status.as_u16(), "MCP server responded");
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            return Err(FetchError::Rpc(describe_rpc_error(error)));
        }

        extract_text(body.get("result"))
    }
}

#[async_trait]
impl Fetcher for McpFetcher {
    async fn fetch(&self, key: &str) -> Result<String, FetchError> {
        let timeout = self.config.timeout;
        tokio::time::timeout(timeout, self.call(key))
            .await
            .map_err(|_| FetchError::Timeout(timeout))?
    }
}

/// Pull the snippet text out of a JSON-RPC `result`.
///
/// This is a pure function (no I/O) so that tests can exercise every
/// envelope shape without a server.
pub fn extract_text(result: Option<&Value>) -> Result<String, FetchError> {
    let result = match result {
        None | Some(Value::Null) => return Ok(NO_NEWS_FOUND.to_string()),
        Some(result) => result,
    };

    let first = result
        .get("content")
        .and_then(Value::as_array)
        .and_then(|content| content.first());
    if let Some(first) = first {
        if !first.is_object() {
            return Err(FetchError::Decode(format!(
                "content entry is not an object: {first}"
            )));
        }
        let text = first
            .get("text")
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty());
        if let Some(text) = text {
            return Ok(text.to_string());
        }
    }

    Ok(match result {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    })
}

fn describe_rpc_error(error: &Value) -> String {
    match serde_json::from_value::<JsonRpcError>(error.clone()) {
        Ok(rpc) => format!("JSON-RPC error {}: {}", rpc.code, rpc.message),
        Err(_) => error.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
