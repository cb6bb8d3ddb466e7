//! Model Context Protocol server over stdio.
//!
//! Frames are newline-delimited JSON-RPC 2.0 messages. stdout carries only
//! protocol frames; all logging goes to stderr.

use crate::api::{self, ExtractOptions};
use crate::pg::container::DEFAULT_POSTGRES_IMAGE;
use crate::render::OutputFormat;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "mig2schema";

/// Provider used by `extract_schema` when the caller names none.
pub const DEFAULT_TOOL_PROVIDER: &str = "pg_dump";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    jsonrpc: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
struct Response {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl Response {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Result payload of a `tools/call`.
fn tool_result(text: String, is_error: bool) -> Value {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    })
}

fn tool_definitions() -> Value {
    json!({
        "tools": [
            {
                "name": "extract_schema",
                "description": "Extract database schema from PostgreSQL migration files",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "migration_directory": {
                            "type": "string",
                            "description": "Path to directory containing migration files"
                        },
                        "format": {
                            "type": "string",
                            "enum": ["sql", "info"],
                            "description": "Output format: 'sql' for CREATE statements (default) or 'info' for a readable report"
                        },
                        "provider": {
                            "type": "string",
                            "description": "Schema extraction provider (default: pg_dump)"
                        },
                        "postgres_image": {
                            "type": "string",
                            "description": format!("PostgreSQL Docker image to use (default: {DEFAULT_POSTGRES_IMAGE})")
                        }
                    },
                    "required": ["migration_directory"]
                }
            },
            {
                "name": "validate_migrations",
                "description": "Validate migration files in directory without running them",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "migration_directory": {
                            "type": "string",
                            "description": "Path to directory containing migration files"
                        }
                    },
                    "required": ["migration_directory"]
                }
            }
        ]
    })
}

/// `sql` (the default) selects DDL; any other value selects the info report.
fn tool_format(raw: Option<&str>) -> OutputFormat {
    match raw {
        None => OutputFormat::Sql,
        Some(value) if value.eq_ignore_ascii_case("sql") => OutputFormat::Sql,
        Some(_) => OutputFormat::Info,
    }
}

fn string_arg<'a>(arguments: &'a Value, key: &str) -> Option<&'a str> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct McpServer;

impl McpServer {
    pub fn new() -> Self {
        Self
    }

    /// Serves requests from stdin until it is closed.
    pub async fn run_stdio(&self) -> std::io::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Reads one frame per line from `reader` and writes replies to `writer`.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(name = SERVER_NAME, version = env!("CARGO_PKG_VERSION"), "mcp server started");
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(reply) = self.handle_message(&line).await {
                writer.write_all(reply.to_string().as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        info!("stdin closed, mcp server stopping");
        Ok(())
    }

    /// Handles one raw frame. Returns `None` for notifications.
    pub async fn handle_message(&self, line: &str) -> Option<Value> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "failed to parse request");
                return Some(to_value(Response::failure(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {e}"),
                )));
            }
        };

        let request: Request = match serde_json::from_value(raw) {
            Ok(request) => request,
            Err(e) => {
                return Some(to_value(Response::failure(
                    Value::Null,
                    INVALID_REQUEST,
                    format!("Invalid request: {e}"),
                )))
            }
        };

        let id = request.id.clone();
        let method = match (&request.jsonrpc, &request.method) {
            (Some(version), Some(method)) if version == "2.0" => method.clone(),
            _ => {
                return Some(to_value(Response::failure(
                    id.unwrap_or(Value::Null),
                    INVALID_REQUEST,
                    "Invalid request: expected jsonrpc \"2.0\" and a method",
                )))
            }
        };

        // Notifications carry no id and never get a reply.
        let Some(id) = id else {
            debug!(method = %method, "notification received");
            return None;
        };

        debug!(method = %method, "request received");
        let response = match method.as_str() {
            "initialize" => Response::success(id, self.initialize()),
            "ping" => Response::success(id, json!({})),
            "tools/list" => Response::success(id, tool_definitions()),
            "tools/call" => match serde_json::from_value::<ToolCall>(request.params) {
                Ok(call) => match self.call_tool(&call).await {
                    Some(result) => Response::success(id, result),
                    None => Response::failure(
                        id,
                        INVALID_PARAMS,
                        format!("Unknown tool: {}", call.name),
                    ),
                },
                Err(e) => Response::failure(id, INVALID_PARAMS, format!("Invalid params: {e}")),
            },
            other => Response::failure(id, METHOD_NOT_FOUND, format!("Method not found: {other}")),
        };

        Some(to_value(response))
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            }
        })
    }

    /// Runs a tool. `None` means the tool does not exist.
    async fn call_tool(&self, call: &ToolCall) -> Option<Value> {
        info!(tool = %call.name, "tool call");
        let outcome = match call.name.as_str() {
            "extract_schema" => self.extract_schema(&call.arguments).await,
            "validate_migrations" => self.validate_migrations(&call.arguments),
            _ => return None,
        };

        Some(match outcome {
            Ok(text) => tool_result(text, false),
            Err(message) => {
                warn!(tool = %call.name, error = %message, "tool call failed");
                tool_result(message, true)
            }
        })
    }

    async fn extract_schema(&self, arguments: &Value) -> Result<String, String> {
        let dir = string_arg(arguments, "migration_directory")
            .ok_or("migration_directory parameter is required")?;
        let format = tool_format(string_arg(arguments, "format"));
        let provider = string_arg(arguments, "provider").unwrap_or(DEFAULT_TOOL_PROVIDER);
        let image = string_arg(arguments, "postgres_image").unwrap_or(DEFAULT_POSTGRES_IMAGE);

        let options = ExtractOptions::new(dir)
            .with_format(format)
            .with_provider(provider)
            .with_postgres_image(image);

        let result = api::extract(options).await.map_err(|e| e.to_string())?;
        Ok(format!("schema extracted successfully:\n\n{}", result.output))
    }

    fn validate_migrations(&self, arguments: &Value) -> Result<String, String> {
        let dir = string_arg(arguments, "migration_directory")
            .ok_or("migration_directory parameter is required")?;

        let report =
            api::validate_migrations(&PathBuf::from(dir)).map_err(|e| e.to_string())?;
        Ok(format!(
            "migration validation completed:\n\n{}",
            report.to_json()
        ))
    }
}

fn to_value(response: Response) -> Value {
    serde_json::to_value(response).unwrap_or(Value::Null)
}
