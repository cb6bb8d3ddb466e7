use super::{ExtractParams, SchemaProvider, SchemaResult};
use crate::render::OutputFormat;
use crate::util::{sanitize_connection_error, Result, SchemaError};
use async_trait::async_trait;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use tokio::process::Command;
use tracing::debug;

static PUBLIC_QUALIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(TABLE|TABLE ONLY|ON|ON ONLY|REFERENCES|SEQUENCE) public\.").unwrap()
});

const PG_DUMP_ARGS: &[&str] = &[
    "--schema-only",
    "--no-owner",
    "--no-privileges",
    "--no-tablespaces",
    "--no-comments",
];

/// Shells out to `pg_dump --schema-only`. Only produces SQL.
#[derive(Debug, Clone)]
pub struct PgDumpProvider {
    binary: String,
}

impl PgDumpProvider {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn resolve_binary(&self) -> Option<PathBuf> {
        let candidate = PathBuf::from(&self.binary);
        if candidate.components().count() > 1 {
            return candidate.is_file().then_some(candidate);
        }

        let paths = std::env::var_os("PATH")?;
        std::env::split_paths(&paths)
            .map(|dir| dir.join(&self.binary))
            .find(|path| path.is_file())
    }
}

impl Default for PgDumpProvider {
    fn default() -> Self {
        Self::new("pg_dump")
    }
}

#[async_trait]
impl SchemaProvider for PgDumpProvider {
    fn name(&self) -> &'static str {
        "pg_dump"
    }

    fn is_available(&self) -> bool {
        self.resolve_binary().is_some()
    }

    fn supports_format(&self, format: OutputFormat) -> bool {
        format == OutputFormat::Sql
    }

    async fn extract_schema(&self, params: &ExtractParams) -> Result<SchemaResult> {
        let connection_string = params.connection_string.as_deref().ok_or_else(|| {
            SchemaError::ProviderError("pg_dump provider requires a connection string".into())
        })?;

        if !self.supports_format(params.format) {
            return Err(SchemaError::ProviderError(format!(
                "pg_dump provider only supports sql format, got {}",
                params.format
            )));
        }

        validate_connection_string(connection_string)?;
        debug!("extracting schema using pg_dump provider");

        let mut command = Command::new(&self.binary);
        command.args(PG_DUMP_ARGS);
        for schema in &params.target_schemas {
            command.arg("--schema").arg(schema);
        }
        command.arg(connection_string);

        let output = command.output().await.map_err(|e| {
            SchemaError::ProviderError(format!(
                "Failed to run {}: {e}. Make sure the PostgreSQL client tools are installed",
                self.binary
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SchemaError::ProviderError(format!(
                "pg_dump failed with exit code {:?}:\nstderr: {}",
                output.status.code(),
                sanitize_connection_error(connection_string, &stderr)
            )));
        }

        let sql = String::from_utf8(output.stdout).map_err(|e| {
            SchemaError::ProviderError(format!("pg_dump produced invalid UTF-8 output: {e}"))
        })?;

        Ok(SchemaResult {
            schema: None,
            raw_sql: Some(clean_pg_dump_output(&sql)),
            format: OutputFormat::Sql,
        })
    }
}

fn validate_connection_string(connection_string: &str) -> Result<()> {
    let valid_scheme = ["postgres://", "postgresql://"]
        .iter()
        .any(|scheme| connection_string.starts_with(scheme));
    if !valid_scheme {
        return Err(SchemaError::ProviderError(
            "failed to parse connection string: expected a postgres:// URL".into(),
        ));
    }
    Ok(())
}

/// Strips a `pg_dump --schema-only` script down to the DDL: comments, session
/// settings, extension statements, sequence definitions and `public.`
/// qualifiers are removed.
pub fn clean_pg_dump_output(sql: &str) -> String {
    let mut cleaned: Vec<&str> = Vec::new();
    let mut skip_until_semicolon = false;

    for line in sql.lines() {
        let trimmed = line.trim();

        if skip_until_semicolon {
            if trimmed.ends_with(';') {
                skip_until_semicolon = false;
            }
            continue;
        }

        if trimmed.is_empty() || trimmed.starts_with("--") || trimmed.starts_with('\\') {
            continue;
        }

        if trimmed.contains("CREATE EXTENSION") || trimmed.contains("COMMENT ON EXTENSION") {
            continue;
        }

        if trimmed.starts_with("SET ") || trimmed.starts_with("SELECT ") {
            continue;
        }

        if trimmed.contains("search_path") || trimmed.contains("CREATE SEQUENCE") {
            skip_until_semicolon = !trimmed.ends_with(';');
            continue;
        }

        // Sequence ownership is noise once the sequences themselves are gone.
        if trimmed.starts_with("ALTER SEQUENCE") {
            skip_until_semicolon = !trimmed.ends_with(';');
            continue;
        }

        cleaned.push(line);
    }

    let joined = cleaned.join("\n");
    let unqualified = PUBLIC_QUALIFIER.replace_all(&joined, "$1 ");
    format!("{}\n", unqualified.trim())
}
