//! Migration script discovery and ordering.
//!
//! A catalog is the set of `.sql` files sitting directly inside the scripts
//! directory. Each file name must start with a run of decimal digits; that run
//! (leading zeros ignored) is the script's migration index. Gaps in the
//! numbering are fine, two files with the same index are not.

use crate::error::{CoreError, CoreResult, IndexCollision};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// File suffix recognized as a migration script.
pub const SCRIPT_SUFFIX: &str = ".sql";

/// One upgrade script found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationUnit {
    /// Index parsed from the leading digits of the file name
    pub index: i64,

    /// Location of the script
    pub path: PathBuf,
}

impl MigrationUnit {
    pub fn new(index: i64, path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            path: path.into(),
        }
    }

    /// Path rendered for logs and the ledger `file` column.
    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

impl fmt::Display for MigrationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.index, self.path.display())
    }
}

/// Extract the migration index from a script file name.
///
/// Grammar: `DIGIT+ ANY* ".sql"`. Returns `None` when the name lacks the
/// suffix, has no leading digits, or the digits do not fit in an `i64`.
///
/// ```
/// use su_core::catalog::parse_index;
///
/// assert_eq!(parse_index("007_init.sql"), Some(7));
/// assert_eq!(parse_index("54_other.sql"), Some(54));
/// assert_eq!(parse_index("init.sql"), None);
/// ```
pub fn parse_index(file_name: &str) -> Option<i64> {
    let stem = file_name.strip_suffix(SCRIPT_SUFFIX)?;
    let digits_end = stem
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(stem.len());
    let digits = &stem[..digits_end];
    if digits.is_empty() {
        return None;
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Some(0);
    }
    significant.parse().ok()
}

/// Discover migration scripts in `dir`, sorted ascending by index.
///
/// Only regular files directly inside `dir` whose name ends in `.sql` are
/// considered. Every file with an unparseable name is reported at once.
/// Duplicate indices are not checked here; see [`validate_unique_order`].
pub fn discover(dir: &Path) -> CoreResult<Vec<MigrationUnit>> {
    let dir_display = dir.display().to_string();

    if !dir.exists() {
        return Err(CoreError::NotFound { path: dir_display });
    }
    if !dir.is_dir() {
        return Err(CoreError::NotADirectory { path: dir_display });
    }

    let entries = fs::read_dir(dir).map_err(|source| CoreError::IoWithPath {
        path: dir_display.clone(),
        source,
    })?;

    let mut units = Vec::new();
    let mut malformed = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|source| CoreError::IoWithPath {
            path: dir_display.clone(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.ends_with(SCRIPT_SUFFIX) {
            continue;
        }

        match parse_index(&file_name) {
            Some(index) => units.push(MigrationUnit::new(index, path)),
            None => malformed.push(path.display().to_string()),
        }
    }

    if units.is_empty() && malformed.is_empty() {
        return Err(CoreError::EmptyCatalog { path: dir_display });
    }

    if !malformed.is_empty() {
        malformed.sort();
        return Err(CoreError::MalformedName { files: malformed });
    }

    units.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.path.cmp(&b.path)));
    log::debug!("Discovered {} script(s) in {}", units.len(), dir_display);
    Ok(units)
}

/// Fail if any two units share an index.
///
/// Works on any ordering of `units`; every colliding pair is reported against
/// the first file seen with that index.
pub fn validate_unique_order(units: &[MigrationUnit]) -> CoreResult<()> {
    let mut sorted: Vec<&MigrationUnit> = units.iter().collect();
    sorted.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.path.cmp(&b.path)));

    let mut collisions = Vec::new();
    let mut group_start: Option<&MigrationUnit> = None;

    for unit in sorted {
        match group_start {
            Some(first) if first.index == unit.index && first.path != unit.path => {
                collisions.push(IndexCollision {
                    index: unit.index,
                    path_a: first.display_path(),
                    path_b: unit.display_path(),
                });
            }
            Some(first) if first.index == unit.index => {}
            _ => group_start = Some(unit),
        }
    }

    if collisions.is_empty() {
        Ok(())
    } else {
        Err(CoreError::DuplicateIndex { collisions })
    }
}

/// Discover and validate the catalog in `dir`.
///
/// This is the full configuration check that must pass before any database
/// work starts.
pub fn load_catalog(dir: &Path) -> CoreResult<Vec<MigrationUnit>> {
    let units = discover(dir)?;
    validate_unique_order(&units)?;
    Ok(units)
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
