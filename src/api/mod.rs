//! High-level API for embedding mig2schema in other applications.
//!
//! The CLI and the MCP server are thin layers over these functions. Both
//! async and blocking variants are available.
//!
//! # Example
//!
//! ```no_run
//! use mig2schema::api::{extract_blocking, ExtractOptions};
//! use mig2schema::render::OutputFormat;
//!
//! let result = extract_blocking(
//!     ExtractOptions::new("./migrations").with_format(OutputFormat::Sql),
//! )
//! .unwrap();
//!
//! println!("{}", result.output);
//! ```
//!
//! Note: Blocking variants create a new tokio runtime per call. For
//! high-frequency usage, prefer the async API with a shared runtime.

mod error;
mod options;
mod results;

pub use error::Error;
pub use options::{ExtractOptions, DEFAULT_PROVIDER};
pub use results::{ExtractResult, MigrationEntry, ValidationReport};

use crate::migrations::{FileMigrationReader, Migration, MigrationReader};
use crate::pg::{DatabaseManager, PostgresContainer};
use crate::provider::{ExtractParams, ProviderRegistry, SchemaProvider, SchemaResult};
use crate::render::{render_info, render_sql, OutputFormat};
use crate::util::SchemaError;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

// ============================================================================
// Helper functions
// ============================================================================

fn read_migrations(reader: &dyn MigrationReader, dir: &Path) -> Result<Vec<Migration>, Error> {
    reader.discover_migrations(dir).map_err(|e| match e {
        SchemaError::DirectoryError(message) => Error::directory(dir, message),
        other => Error::directory(dir, other.to_string()),
    })
}

/// Like [`read_migrations`], but an empty directory is an error.
fn load_migrations(reader: &dyn MigrationReader, dir: &Path) -> Result<Vec<Migration>, Error> {
    let migrations = read_migrations(reader, dir)?;
    if migrations.is_empty() {
        return Err(Error::no_migrations(dir));
    }
    Ok(migrations)
}

/// Looks up `name` in `registry` and checks it can run here.
pub fn resolve_provider(
    registry: &ProviderRegistry,
    name: &str,
) -> Result<Arc<dyn SchemaProvider>, Error> {
    let provider = registry
        .get(name)
        .ok_or_else(|| Error::unknown_provider(name))?;
    if !provider.is_available() {
        return Err(Error::provider_unavailable(name));
    }
    Ok(provider)
}

async fn migrate_and_extract(
    options: &ExtractOptions,
    migrations: &[Migration],
    database: &mut dyn DatabaseManager,
    provider: &dyn SchemaProvider,
) -> Result<SchemaResult, Error> {
    database
        .setup()
        .await
        .map_err(|e| Error::setup(e.to_string()))?;

    info!(count = migrations.len(), "running migrations");
    database
        .run_migrations(migrations)
        .await
        .map_err(|e| Error::migration(e.to_string()))?;

    let params = ExtractParams {
        pool: database.pool(),
        connection_string: database.connection_string(),
        target_schemas: options.target_schemas.clone(),
        format: options.format,
    };

    info!(provider = provider.name(), "extracting schema");
    provider
        .extract_schema(&params)
        .await
        .map_err(|e| Error::introspection(e.to_string()))
}

fn render_output(
    result: &SchemaResult,
    format: OutputFormat,
    provider: &str,
) -> Result<String, Error> {
    let unsupported = || Error::UnsupportedFormat {
        provider: provider.to_string(),
        format: format.to_string(),
    };

    match format {
        OutputFormat::Sql => match (&result.raw_sql, &result.schema) {
            (Some(sql), _) => Ok(sql.clone()),
            (None, Some(schema)) => Ok(render_sql(schema)),
            (None, None) => Err(unsupported()),
        },
        OutputFormat::Info => result
            .schema
            .as_ref()
            .map(render_info)
            .ok_or_else(unsupported),
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Applies every migration in `options.migration_dir` to a throwaway
/// PostgreSQL container and renders the resulting schema.
pub async fn extract(options: ExtractOptions) -> Result<ExtractResult, Error> {
    let registry = ProviderRegistry::with_defaults();
    let provider = resolve_provider(&registry, &options.provider)?;
    let mut database = PostgresContainer::new(&options.postgres_image);

    extract_with(&options, &FileMigrationReader, &mut database, provider.as_ref()).await
}

/// [`extract`] with every collaborator supplied by the caller.
///
/// The database is always closed before returning, whether or not the run
/// succeeded. Close failures are logged and never replace the run's result.
pub async fn extract_with(
    options: &ExtractOptions,
    reader: &dyn MigrationReader,
    database: &mut dyn DatabaseManager,
    provider: &dyn SchemaProvider,
) -> Result<ExtractResult, Error> {
    if !provider.supports_format(options.format) {
        return Err(Error::UnsupportedFormat {
            provider: provider.name().to_string(),
            format: options.format.to_string(),
        });
    }

    let migrations = load_migrations(reader, &options.migration_dir)?;
    info!(
        dir = %options.migration_dir.display(),
        count = migrations.len(),
        "found migrations"
    );

    let outcome = migrate_and_extract(options, &migrations, database, provider).await;

    if let Err(e) = database.close().await {
        error!(error = %e, "failed to close database");
    }

    let result = outcome?;
    let output = render_output(&result, options.format, provider.name())?;
    let fingerprint = result.schema.as_ref().map(|s| s.fingerprint());
    debug!(fingerprint = ?fingerprint, "schema extracted");

    Ok(ExtractResult {
        output,
        format: options.format,
        provider: provider.name().to_string(),
        migrations_applied: migrations.len(),
        schema: result.schema,
        fingerprint,
    })
}

/// Lists the migrations in `dir` without touching a database. A directory
/// with no migrations yields an empty report.
pub fn validate_migrations(dir: &Path) -> Result<ValidationReport, Error> {
    validate_migrations_with(&FileMigrationReader, dir)
}

pub fn validate_migrations_with(
    reader: &dyn MigrationReader,
    dir: &Path,
) -> Result<ValidationReport, Error> {
    let migrations = read_migrations(reader, dir)?;
    Ok(ValidationReport::from_migrations(&migrations))
}

/// Names of the built-in providers usable in this environment, sorted.
pub fn list_providers() -> Vec<&'static str> {
    ProviderRegistry::with_defaults().list_available()
}

// ============================================================================
// Blocking variants
// ============================================================================

fn create_runtime() -> Result<tokio::runtime::Runtime, Error> {
    tokio::runtime::Runtime::new().map_err(|e| Error::runtime(e.to_string()))
}

/// Blocking variant of [`extract`].
///
/// Creates a new tokio runtime for each call. For high-frequency usage,
/// prefer the async API with a shared runtime.
pub fn extract_blocking(options: ExtractOptions) -> Result<ExtractResult, Error> {
    create_runtime()?.block_on(extract(options))
}
