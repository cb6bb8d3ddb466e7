use std::path::Path;
use thiserror::Error;

/// Structured error type for mig2schema library operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Migration directory error ({path}): {message}")]
    Directory { path: String, message: String },

    #[error("No migration files found in directory: {path}")]
    NoMigrations { path: String },

    #[error("Failed to set up database: {message}")]
    Setup { message: String },

    #[error("Failed to run migrations: {message}")]
    Migration { message: String },

    #[error("Failed to extract schema: {message}")]
    Introspection { message: String },

    #[error("Unknown provider: {name}. Use --list-providers to see available providers")]
    UnknownProvider { name: String },

    #[error("Provider '{name}' is not available in this environment")]
    ProviderUnavailable { name: String },

    #[error("Provider '{provider}' does not support the {format} format")]
    UnsupportedFormat { provider: String, format: String },

    #[error("Runtime error: {message}")]
    Runtime { message: String },
}

impl Error {
    pub fn directory(path: &Path, message: impl Into<String>) -> Self {
        Self::Directory {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    pub fn no_migrations(path: &Path) -> Self {
        Self::NoMigrations {
            path: path.display().to_string(),
        }
    }

    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }

    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration {
            message: message.into(),
        }
    }

    pub fn introspection(message: impl Into<String>) -> Self {
        Self::Introspection {
            message: message.into(),
        }
    }

    pub fn unknown_provider(name: impl Into<String>) -> Self {
        Self::UnknownProvider { name: name.into() }
    }

    pub fn provider_unavailable(name: impl Into<String>) -> Self {
        Self::ProviderUnavailable { name: name.into() }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }
}
