//! Compile-command records.
//!
//! One JSON record per object file, in the compilation-database convention
//! consumed by editor and analysis tooling. Write-only from this core: the
//! record is produced before the compiler runs and never read back, so
//! tooling sees the attempted command even when compilation fails.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::COMMAND_RECORD_SUFFIX;
use crate::paths::append_suffix;
use crate::rules::types::BuildError;

/// One compile invocation as consumed by external tooling.
///
/// Field names are fixed by the compilation-database convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
  /// Absolute working directory of the invocation.
  pub directory: String,
  /// Ordered argument vector, including the compiler executable.
  pub arguments: Vec<String>,
  /// Source path relative to `directory`.
  pub file: String,
}

/// Command-record path derived from an object path.
pub fn record_path(object_file: &Path) -> PathBuf {
  append_suffix(object_file, COMMAND_RECORD_SUFFIX)
}

/// Write `record` to `path`.
pub fn write_record(record: &CommandRecord, path: &Path) -> Result<(), BuildError> {
  let contents = serde_json::to_string_pretty(record).map_err(|error| BuildError::WriteRecord {
    path: path.display().to_string(),
    message: error.to_string(),
  })?;

  std::fs::write(path, format!("{contents}\n")).map_err(|error| BuildError::WriteRecord {
    path: path.display().to_string(),
    message: error.to_string(),
  })
}
