//! Schema extraction strategies.
//!
//! A provider turns a migrated database into a [`SchemaResult`]. Providers are
//! looked up by name through a [`ProviderRegistry`].

mod native;
mod pg_dump;

pub use native::NativeProvider;
pub use pg_dump::{clean_pg_dump_output, PgDumpProvider};

use crate::model::Schema;
use crate::render::OutputFormat;
use crate::util::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Everything a provider may need to reach the migrated database.
#[derive(Debug, Clone)]
pub struct ExtractParams {
    /// Open pool, used by query-based providers.
    pub pool: Option<Pool<Postgres>>,
    /// Full connection URL, used by external tools.
    pub connection_string: Option<String>,
    /// Database schemas to read.
    pub target_schemas: Vec<String>,
    pub format: OutputFormat,
}

/// Output of a provider run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaResult {
    /// Parsed snapshot, when the provider produces one.
    pub schema: Option<Schema>,
    /// DDL text, when the provider produces it directly.
    pub raw_sql: Option<String>,
    pub format: OutputFormat,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this provider can run in the current environment.
    fn is_available(&self) -> bool;

    /// Whether this provider can produce `format`.
    fn supports_format(&self, format: OutputFormat) -> bool;

    async fn extract_schema(&self, params: &ExtractParams) -> Result<SchemaResult>;
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: BTreeMap<&'static str, Arc<dyn SchemaProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in `native` and `pg_dump` providers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(NativeProvider));
        registry.register(Arc::new(PgDumpProvider::default()));
        registry
    }

    /// Adds a provider, replacing any previous one with the same name.
    pub fn register(&mut self, provider: Arc<dyn SchemaProvider>) {
        self.providers.insert(provider.name(), provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SchemaProvider>> {
        self.providers.get(name).cloned()
    }

    /// Names of registered providers that are usable here, sorted.
    pub fn list_available(&self) -> Vec<&'static str> {
        self.providers
            .iter()
            .filter(|(_, provider)| provider.is_available())
            .map(|(name, _)| *name)
            .collect()
    }

    /// Names of every registered provider, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.providers.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_provider(name: &'static str, available: bool) -> Arc<dyn SchemaProvider> {
        let mut provider = MockSchemaProvider::new();
        provider.expect_name().return_const(name);
        provider.expect_is_available().return_const(available);
        provider.expect_supports_format().return_const(true);
        Arc::new(provider)
    }

    #[test]
    fn get_returns_registered_provider() {
        let mut registry = ProviderRegistry::new();
        registry.register(mock_provider("native", true));

        assert_eq!(registry.get("native").unwrap().name(), "native");
        assert!(registry.get("pg_dump").is_none());
    }

    #[test]
    fn list_available_filters_and_sorts() {
        let mut registry = ProviderRegistry::new();
        registry.register(mock_provider("zeta", true));
        registry.register(mock_provider("alpha", true));
        registry.register(mock_provider("offline", false));

        assert_eq!(registry.list_available(), vec!["alpha", "zeta"]);
        assert_eq!(registry.names(), vec!["alpha", "offline", "zeta"]);
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let mut registry = ProviderRegistry::new();
        registry.register(mock_provider("native", false));
        registry.register(mock_provider("native", true));

        assert_eq!(registry.list_available(), vec!["native"]);
    }

    #[test]
    fn defaults_contain_native_and_pg_dump() {
        let registry = ProviderRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["native", "pg_dump"]);
        assert!(registry.list_available().contains(&"native"));
    }
}
