//! donebell Plugin SDK: serves a hook handler table to a host process.
//!
//! The host talks to the plugin over stdin/stdout using NDJSON JSON-RPC 2.0
//! (one JSON object per line).
//!
//! # Host → Plugin
//!
//! | Method               | Params                    | Result                      |
//! |----------------------|---------------------------|-----------------------------|
//! | `initialize`         | `{ context }`             | `{ plugin, hooks }`         |
//! | `event`              | `{ event }`               | `null`                      |
//! | `tool.execute.after` | `{ input, output }`       | `null`                      |
//! | `hooks`              | `{}`                      | `{ hooks }`                 |
//! | `shutdown`           | `{}`                      | `null`, then the loop exits |
//!
//! Messages without an `id` are notifications and get no response.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use donebell_plugin_sdk::{PluginFactory, run_plugin};
//! use donebell_hooks::HandlerTable;
//! use donebell_types::PluginContext;
//!
//! struct MyPlugin;
//!
//! #[async_trait::async_trait]
//! impl PluginFactory for MyPlugin {
//!     fn name(&self) -> &str { "my-plugin" }
//!
//!     async fn create(&self, context: PluginContext) -> anyhow::Result<HandlerTable> {
//!         Ok(HandlerTable::new())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     run_plugin(&MyPlugin).await.unwrap();
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use donebell_hooks::HandlerTable;
pub use donebell_types::{Event, PluginContext, ToolExecuteInput, ToolExecuteOutput};

// ──────────────────── JSON-RPC types ────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonRpcMessage {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl JsonRpcResponse {
    fn ok(id: Option<u64>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Option<u64>, code: i64, message: String) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(JsonRpcError { code, message }),
        }
    }
}

const PARSE_ERROR: i64 = -32700;
const INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InitializeParams {
    #[serde(default)]
    context: PluginContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InitializeResult {
    plugin: String,
    hooks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EventParams {
    event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolExecuteAfterParams {
    #[serde(default)]
    input: ToolExecuteInput,
    #[serde(default)]
    output: ToolExecuteOutput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HooksResult {
    hooks: Vec<String>,
}

// ──────────────────── Plugin trait ────────────────────

/// Builds a plugin's handler table from the host context.
#[async_trait::async_trait]
pub trait PluginFactory: Send + Sync {
    /// Plugin identifier reported back on `initialize`.
    fn name(&self) -> &str;

    /// Suppress the loop's own warnings (unparseable lines, failed
    /// notifications from the host).
    fn quiet(&self) -> bool {
        false
    }

    /// Called once per `initialize` request.
    async fn create(&self, context: PluginContext) -> anyhow::Result<HandlerTable>;
}

// ──────────────────── Main loop ────────────────────

/// Run the plugin loop on this process's stdin/stdout.
///
/// Returns when stdin is closed or a `shutdown` request is received.
pub async fn run_plugin(factory: &impl PluginFactory) -> anyhow::Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let mut writer = tokio::io::stdout();
    serve(reader, &mut writer, factory).await
}

/// Run the plugin loop over arbitrary line-oriented streams.
pub async fn serve<R, W>(
    reader: R,
    writer: &mut W,
    factory: &impl PluginFactory,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut table: Option<HandlerTable> = None;
    let quiet = factory.quiet();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let msg: JsonRpcMessage = match serde_json::from_str(&line) {
            Ok(m) => m,
            Err(e) => {
                if !quiet {
                    tracing::warn!(error = %e, "Unparseable message from host");
                }
                let resp = JsonRpcResponse::err(None, PARSE_ERROR, format!("Parse error: {e}"));
                write_message(writer, &resp).await?;
                continue;
            }
        };

        let result = handle_request(factory, &mut table, &msg).await;

        if let Some(req_id) = msg.id {
            let resp = match result {
                Ok(value) => JsonRpcResponse::ok(Some(req_id), value),
                Err(e) => JsonRpcResponse::err(Some(req_id), INTERNAL_ERROR, e.to_string()),
            };
            write_message(writer, &resp).await?;
        } else if let Err(e) = result {
            if !quiet {
                tracing::warn!(method = %msg.method, error = %e, "Notification failed");
            }
        }

        if msg.method == "shutdown" {
            break;
        }
    }

    Ok(())
}

/// Write one message as a single NDJSON line.
async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    msg: &impl Serialize,
) -> anyhow::Result<()> {
    let mut line = serde_json::to_string(msg)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

fn parse_params<T: DeserializeOwned>(msg: &JsonRpcMessage) -> anyhow::Result<T> {
    msg.params
        .as_ref()
        .map(|p| serde_json::from_value(p.clone()))
        .transpose()?
        .ok_or_else(|| anyhow::anyhow!("Missing params for {}", msg.method))
}

fn initialized(table: &Option<HandlerTable>) -> anyhow::Result<&HandlerTable> {
    table
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Plugin not initialized"))
}

async fn handle_request(
    factory: &impl PluginFactory,
    table: &mut Option<HandlerTable>,
    msg: &JsonRpcMessage,
) -> anyhow::Result<Value> {
    match msg.method.as_str() {
        "initialize" => {
            let params: InitializeParams = match &msg.params {
                Some(_) => parse_params(msg)?,
                None => InitializeParams {
                    context: PluginContext::default(),
                },
            };

            let created = factory.create(params.context).await?;
            let hooks = created.hooks().into_iter().map(String::from).collect();
            *table = Some(created);

            Ok(serde_json::to_value(InitializeResult {
                plugin: factory.name().to_string(),
                hooks,
            })?)
        }
        "event" => {
            let params: EventParams = parse_params(msg)?;
            initialized(table)?.emit_event(params.event).await;
            Ok(Value::Null)
        }
        "tool.execute.after" => {
            let params: ToolExecuteAfterParams = parse_params(msg)?;
            initialized(table)?
                .emit_tool_execute_after(params.input, params.output)
                .await;
            Ok(Value::Null)
        }
        "hooks" => {
            let hooks = initialized(table)?
                .hooks()
                .into_iter()
                .map(String::from)
                .collect();
            Ok(serde_json::to_value(HooksResult { hooks })?)
        }
        "shutdown" => Ok(Value::Null),
        other => anyhow::bail!("Unknown method: {other}"),
    }
}
