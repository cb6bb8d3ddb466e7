use crate::util::{Result, SchemaError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub const UP_SUFFIX: &str = ".up.sql";
pub const DOWN_SUFFIX: &str = ".down.sql";

/// A forward migration file and, when present, its reverse counterpart.
///
/// `name` is the file name with the up/down suffix stripped. It is the sort
/// key and therefore the execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Migration {
    pub name: String,
    pub up_path: PathBuf,
    pub down_path: Option<PathBuf>,
}

impl Migration {
    pub fn has_down(&self) -> bool {
        self.down_path.is_some()
    }
}

/// Source of migrations for a directory.
#[cfg_attr(test, mockall::automock)]
pub trait MigrationReader: Send + Sync {
    fn discover_migrations(&self, dir: &Path) -> Result<Vec<Migration>>;
}

/// Reads migrations from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileMigrationReader;

impl MigrationReader for FileMigrationReader {
    fn discover_migrations(&self, dir: &Path) -> Result<Vec<Migration>> {
        discover_migrations(dir)
    }
}

/// Recursively scans `dir` for `*.up.sql` / `*.down.sql` pairs.
pub fn discover_migrations(dir: &Path) -> Result<Vec<Migration>> {
    debug!(directory = %dir.display(), "scanning migration directory");
    let files = list_files(dir)?;
    let migrations = pair_migrations(files);
    info!(
        directory = %dir.display(),
        count = migrations.len(),
        "parsed migrations"
    );
    Ok(migrations)
}

/// Groups a file listing into migrations sorted by name.
///
/// Files that are neither up nor down fragments are ignored. A down fragment
/// without a matching up fragment produces nothing.
pub fn pair_migrations<I>(paths: I) -> Vec<Migration>
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut up_files: BTreeMap<String, PathBuf> = BTreeMap::new();
    let mut down_files: BTreeMap<String, PathBuf> = BTreeMap::new();

    for path in paths {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if let Some(base) = file_name.strip_suffix(UP_SUFFIX) {
            debug!(name = base, file = %path.display(), "found up migration");
            up_files.insert(base.to_string(), path);
        } else if let Some(base) = file_name.strip_suffix(DOWN_SUFFIX) {
            debug!(name = base, file = %path.display(), "found down migration");
            down_files.insert(base.to_string(), path);
        }
    }

    for orphan in down_files.keys().filter(|k| !up_files.contains_key(*k)) {
        debug!(name = %orphan, "ignoring down migration without up migration");
    }

    // BTreeMap iteration is already ordered by name.
    up_files
        .into_iter()
        .map(|(name, up_path)| {
            let down_path = down_files.remove(&name);
            Migration {
                name,
                up_path,
                down_path,
            }
        })
        .collect()
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(SchemaError::DirectoryError(format!(
            "migration directory does not exist: {}",
            dir.display()
        )));
    }
    if !dir.is_dir() {
        return Err(SchemaError::DirectoryError(format!(
            "not a directory: {}",
            dir.display()
        )));
    }

    // Symlinked directories are not descended into, so link cycles cannot
    // recurse. Symlinks to regular files are listed like files.
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            SchemaError::DirectoryError(format!("failed to walk {}: {e}", dir.display()))
        })?;

        let file_type = entry.file_type();
        if file_type.is_file() || (file_type.is_symlink() && entry.path().is_file()) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    Ok(files)
}
