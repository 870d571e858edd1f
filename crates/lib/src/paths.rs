//! Root-relative and shortest-path computation.
//!
//! Compiler invocations and depfiles use paths relative to the project root so
//! that build output stays relocatable. These helpers are pure functions over
//! path components and never touch the filesystem.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Error resolving a path against a project root.
#[derive(Debug, Error)]
pub enum PathError {
  #[error("path {path} is not under root {root}")]
  NotUnderRoot { path: String, root: String },
}

/// Strip `root` from `path`.
///
/// Fails if `path` does not live under `root`; rules reject such sources up
/// front rather than emitting an absolute path into a compiler invocation.
pub fn relative_to_root(path: &Path, root: &Path) -> Result<PathBuf, PathError> {
  path
    .strip_prefix(root)
    .map(Path::to_path_buf)
    .map_err(|_| PathError::NotUnderRoot {
      path: path.display().to_string(),
      root: root.display().to_string(),
    })
}

/// The shortest traversal from `base` to `path`.
///
/// Returns the plain relative form when `path` is under `base`, otherwise a
/// `../`-walk computed from the common component prefix. When the two paths
/// share no components at all (different roots), `path` is returned as given.
pub fn shortest_path(path: &Path, base: &Path) -> PathBuf {
  if let Ok(stripped) = path.strip_prefix(base) {
    if stripped.as_os_str().is_empty() {
      return PathBuf::from(".");
    }
    return stripped.to_path_buf();
  }

  let path_components: Vec<Component> = path.components().collect();
  let base_components: Vec<Component> = base.components().collect();

  let common = path_components
    .iter()
    .zip(base_components.iter())
    .take_while(|(a, b)| a == b)
    .count();

  if common == 0 {
    return path.to_path_buf();
  }

  let mut relative = PathBuf::new();
  for _ in common..base_components.len() {
    relative.push("..");
  }
  for component in &path_components[common..] {
    relative.push(component.as_os_str());
  }

  if relative.as_os_str().is_empty() {
    PathBuf::from(".")
  } else {
    relative
  }
}

/// Append a literal suffix to a path, `foo/bar.c` + `.o` -> `foo/bar.c.o`.
pub fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
  let mut appended = OsString::from(path.as_os_str());
  appended.push(suffix);
  PathBuf::from(appended)
}

/// Render a path for an argument vector.
pub fn argv_path(path: &Path) -> String {
  dunce::simplified(path).display().to_string()
}
