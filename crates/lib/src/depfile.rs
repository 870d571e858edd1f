//! Makefile-style dependency record reader.
//!
//! Compilers invoked with `-MMD -MF <file> -MT dependencies` emit a single
//! record naming every header the translation unit included:
//!
//! ```make
//! dependencies: src/main.c include/app.h \
//!   include/util.h
//! ```
//!
//! The reader returns the prerequisites of the `dependencies` pseudo-target as
//! an ordered, deduplicated list of paths. A missing depfile is the normal
//! clean-build case and yields an empty list; a present-but-malformed file is
//! an error, never silently empty.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::DEPFILE_TARGET;

/// Errors reading or parsing a dependency file.
#[derive(Debug, Error)]
pub enum DepfileError {
  #[error("failed to read depfile {path}: {message}")]
  Io { path: String, message: String },

  #[error("malformed depfile {path}: {message}")]
  Malformed { path: String, message: String },

  #[error("depfile {path} has no `{target}` record")]
  MissingTarget { path: String, target: &'static str },
}

/// Read the implicit dependencies recorded at `depfile_path`.
///
/// Relative entries resolve against `root` (the owning source file's project
/// root); absolute entries pass through. Duplicates collapse to their first
/// occurrence, order otherwise preserved.
pub fn read(depfile_path: &Path, root: &Path) -> Result<Vec<PathBuf>, DepfileError> {
  let contents = match std::fs::read_to_string(depfile_path) {
    Ok(contents) => contents,
    Err(error) if error.kind() == io::ErrorKind::NotFound => {
      debug!(path = %depfile_path.display(), "no depfile, no implicit dependencies");
      return Ok(Vec::new());
    }
    Err(error) => {
      return Err(DepfileError::Io {
        path: depfile_path.display().to_string(),
        message: error.to_string(),
      });
    }
  };

  let entries = parse(&contents, depfile_path)?;

  let mut seen = HashSet::new();
  let mut dependencies = Vec::new();
  for entry in entries {
    let resolved = resolve_entry(&entry, root);
    if seen.insert(resolved.clone()) {
      dependencies.push(resolved);
    }
  }

  Ok(dependencies)
}

/// Resolve one prerequisite entry against the source root.
fn resolve_entry(entry: &str, root: &Path) -> PathBuf {
  let entry = Path::new(entry);
  if entry.is_absolute() {
    entry.to_path_buf()
  } else {
    root.join(entry)
  }
}

/// Parse the record body and return the raw prerequisite entries of the
/// `dependencies` pseudo-target.
fn parse(contents: &str, depfile_path: &Path) -> Result<Vec<String>, DepfileError> {
  // Backslash-newline continuations join into one logical record line.
  let logical = contents.replace("\\\r\n", " ").replace("\\\n", " ");

  for line in logical.lines() {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }

    let Some((target, prerequisites)) = line.split_once(':') else {
      return Err(DepfileError::Malformed {
        path: depfile_path.display().to_string(),
        message: format!("record without ':' separator: `{line}`"),
      });
    };

    if target.trim() == DEPFILE_TARGET {
      return Ok(split_prerequisites(prerequisites));
    }
  }

  Err(DepfileError::MissingTarget {
    path: depfile_path.display().to_string(),
    target: DEPFILE_TARGET,
  })
}

/// Split a prerequisite list on whitespace, honoring backslash-escaped spaces
/// inside paths.
fn split_prerequisites(list: &str) -> Vec<String> {
  let mut entries = Vec::new();
  let mut current = String::new();
  let mut chars = list.chars().peekable();

  while let Some(c) = chars.next() {
    match c {
      '\\' => match chars.peek() {
        Some(' ') => {
          current.push(' ');
          chars.next();
        }
        Some('\\') => {
          current.push('\\');
          chars.next();
        }
        _ => current.push('\\'),
      },
      c if c.is_whitespace() => {
        if !current.is_empty() {
          entries.push(std::mem::take(&mut current));
        }
      }
      c => current.push(c),
    }
  }
  if !current.is_empty() {
    entries.push(current);
  }

  entries
}
