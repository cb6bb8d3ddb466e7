use super::{ExtractParams, SchemaProvider, SchemaResult};
use crate::pg::connection::PgConnection;
use crate::pg::introspect::introspect_schema;
use crate::render::{render_sql, OutputFormat};
use crate::util::{Result, SchemaError};
use async_trait::async_trait;
use tracing::debug;

/// Introspects the catalog with plain SQL queries over the open pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeProvider;

#[async_trait]
impl SchemaProvider for NativeProvider {
    fn name(&self) -> &'static str {
        "native"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn supports_format(&self, _format: OutputFormat) -> bool {
        true
    }

    async fn extract_schema(&self, params: &ExtractParams) -> Result<SchemaResult> {
        let pool = params.pool.clone().ok_or_else(|| {
            SchemaError::ProviderError("native provider requires a database connection".into())
        })?;

        debug!(format = %params.format, "extracting schema using native provider");
        let connection = PgConnection::from_pool(pool);
        let schema = introspect_schema(&connection, &params.target_schemas).await?;

        let raw_sql = match params.format {
            OutputFormat::Sql => Some(render_sql(&schema)),
            OutputFormat::Info => None,
        };

        Ok(SchemaResult {
            schema: Some(schema),
            raw_sql,
            format: params.format,
        })
    }
}
