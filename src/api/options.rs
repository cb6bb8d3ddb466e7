use crate::pg::container::DEFAULT_POSTGRES_IMAGE;
use crate::render::OutputFormat;
use std::path::PathBuf;

pub const DEFAULT_PROVIDER: &str = "native";

/// Options for extracting a schema from a migration directory.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Directory holding `*.up.sql` / `*.down.sql` files
    pub migration_dir: PathBuf,
    /// Rendering to produce
    pub format: OutputFormat,
    /// Registered provider name (default: "native")
    pub provider: String,
    /// Docker image for the throwaway database
    pub postgres_image: String,
    /// PostgreSQL schemas to introspect (default: ["public"])
    pub target_schemas: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            migration_dir: PathBuf::new(),
            format: OutputFormat::Info,
            provider: DEFAULT_PROVIDER.to_string(),
            postgres_image: DEFAULT_POSTGRES_IMAGE.to_string(),
            target_schemas: vec!["public".into()],
        }
    }
}

impl ExtractOptions {
    /// Create new extract options with required fields.
    pub fn new(migration_dir: impl Into<PathBuf>) -> Self {
        Self {
            migration_dir: migration_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_postgres_image(mut self, image: impl Into<String>) -> Self {
        self.postgres_image = image.into();
        self
    }

    /// Set target schemas.
    pub fn with_target_schemas(mut self, schemas: Vec<String>) -> Self {
        self.target_schemas = schemas;
        self
    }
}
