use crate::migrations::Migration;
use crate::model::Schema;
use crate::render::OutputFormat;
use serde::Serialize;

/// Result of extracting a schema.
#[derive(Debug, Clone)]
pub struct ExtractResult {
    /// Rendered output in the requested format
    pub output: String,
    pub format: OutputFormat,
    /// Provider that produced the schema
    pub provider: String,
    /// Number of migrations applied
    pub migrations_applied: usize,
    /// Parsed snapshot (absent for providers that only emit DDL)
    pub schema: Option<Schema>,
    /// Fingerprint of `schema`, when present
    pub fingerprint: Option<String>,
}

/// Migration listing produced without touching a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub migration_count: usize,
    pub migrations: Vec<MigrationEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationEntry {
    pub name: String,
    pub up_file: String,
    pub has_down_file: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_file: Option<String>,
}

impl From<&Migration> for MigrationEntry {
    fn from(migration: &Migration) -> Self {
        Self {
            name: migration.name.clone(),
            up_file: migration.up_path.display().to_string(),
            has_down_file: migration.has_down(),
            down_file: migration
                .down_path
                .as_ref()
                .map(|p| p.display().to_string()),
        }
    }
}

impl ValidationReport {
    pub fn from_migrations(migrations: &[Migration]) -> Self {
        Self {
            valid: true,
            migration_count: migrations.len(),
            migrations: migrations.iter().map(MigrationEntry::from).collect(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("ValidationReport must serialize")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn report_json_omits_missing_down_file() {
        let migrations = vec![
            Migration {
                name: "001_users".into(),
                up_path: PathBuf::from("m/001_users.up.sql"),
                down_path: Some(PathBuf::from("m/001_users.down.sql")),
            },
            Migration {
                name: "002_posts".into(),
                up_path: PathBuf::from("m/002_posts.up.sql"),
                down_path: None,
            },
        ];

        let report = ValidationReport::from_migrations(&migrations);
        assert!(report.valid);
        assert_eq!(report.migration_count, 2);

        let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(json["migrations"][0]["down_file"], "m/001_users.down.sql");
        assert_eq!(json["migrations"][0]["has_down_file"], true);
        assert!(json["migrations"][1].get("down_file").is_none());
        assert_eq!(json["migrations"][1]["has_down_file"], false);
    }
}
