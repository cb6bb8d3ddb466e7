use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static URL_PASSWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.-]*://[^:/@]+):[^@]*@").unwrap());

/// Masks the password component of a connection URL so it can be logged.
pub fn sanitize_url(url: &str) -> String {
    URL_PASSWORD.replace(url, "$1:****@").to_string()
}

/// Replaces every occurrence of the raw connection URL inside an error message
/// with its sanitized form.
pub fn sanitize_connection_error(url: &str, message: &str) -> String {
    if url.is_empty() {
        return message.to_string();
    }
    message.replace(url, &sanitize_url(url))
}

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Directory error: {0}")]
    DirectoryError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
