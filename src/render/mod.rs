//! Text projections of a [`Schema`] snapshot.
//!
//! Both renderers share [`display_type`] and never fail: they only read the
//! snapshot and emit tables in the order they were introspected.

mod info;
mod sql;
mod types;

pub use info::render_info;
pub use sql::render_sql;
pub use types::display_type;

use crate::model::Schema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which rendering the caller asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human readable report.
    #[default]
    Info,
    /// `create table` / `create index` statements.
    Sql,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Info => "info",
            OutputFormat::Sql => "sql",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(OutputFormat::Info),
            "sql" => Ok(OutputFormat::Sql),
            other => Err(format!("unsupported format: {other} (expected 'info' or 'sql')")),
        }
    }
}

pub fn render(schema: &Schema, format: OutputFormat) -> String {
    match format {
        OutputFormat::Info => render_info(schema),
        OutputFormat::Sql => render_sql(schema),
    }
}
