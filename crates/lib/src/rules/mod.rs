//! The rule abstraction and source-file classification.
//!
//! A rule maps declared inputs to declared outputs via a side-effecting apply
//! step. The engine ships a closed set of rules (three compile variants
//! selected by extension class, one link rule, and the aggregate native rule)
//! dispatched statically rather than through a registry.

pub mod compile;
pub mod link;
pub mod native;
pub mod types;

pub use compile::{CompileRequest, CompileRule};
pub use link::{LinkRequest, LinkRule};
pub use native::{NativeRequest, NativeRule};
pub use types::{BuildError, CompileOutcome, LinkOutcome, NativeOutcome};

use std::path::{Path, PathBuf};

use crate::consts::OBJECT_SUFFIX;
use crate::env::BuildEnv;
use crate::paths::{self, PathError};

/// A unit of work mapping declared inputs to declared outputs.
///
/// `inputs` includes implicit dependencies recovered from a previous
/// invocation (a compile rule's depfile); the external scheduler uses it for
/// staleness comparison before deciding to `apply`.
#[allow(async_fn_in_trait)]
pub trait Rule {
  type Request;
  type Outcome;

  /// Stable rule name, used in logs and applicability errors.
  fn name(&self) -> &'static str;

  /// Every path this rule would read for `request`.
  fn inputs(&self, request: &Self::Request) -> Result<Vec<PathBuf>, BuildError>;

  /// Every path this rule would create or overwrite for `request`.
  fn outputs(&self, request: &Self::Request) -> Vec<PathBuf>;

  /// Run the rule to completion.
  async fn apply(&self, request: &Self::Request, env: &BuildEnv) -> Result<Self::Outcome, BuildError>;
}

/// Language family of a source file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
  /// `.s`, `.S`, `.asm`: no preprocessor, so no depfile tracking.
  Assembly,
  /// `.c`, `.m`: compiled with the C driver and `cflags`.
  C,
  /// `.cpp`, `.cxx`, `.cc`, `.mm`: compiled with the C++ driver and `cxxflags`.
  Cpp,
}

impl SourceKind {
  /// Classify a source path, or `None` for an unrecognized extension.
  pub fn classify(path: &Path) -> Option<Self> {
    match path.extension()?.to_str()? {
      "s" | "S" | "asm" => Some(SourceKind::Assembly),
      "c" | "m" => Some(SourceKind::C),
      "cpp" | "cxx" | "cc" | "mm" => Some(SourceKind::Cpp),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      SourceKind::Assembly => "assembly",
      SourceKind::C => "c",
      SourceKind::Cpp => "c++",
    }
  }
}

/// A source file rooted in a project tree.
///
/// Identity is the absolute path; the root anchors every relative path the
/// compiler sees. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
  path: PathBuf,
  root: PathBuf,
  relative: PathBuf,
}

impl SourceFile {
  /// A source at `path` under project `root`.
  ///
  /// Fails if `path` does not live under `root`.
  pub fn new(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Result<Self, PathError> {
    let path = path.into();
    let root = root.into();
    let relative = paths::relative_to_root(&path, &root)?;
    Ok(Self { path, root, relative })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// The path relative to the project root.
  pub fn relative_path(&self) -> &Path {
    &self.relative
  }

  pub fn kind(&self) -> Option<SourceKind> {
    SourceKind::classify(&self.path)
  }
}

/// Deterministic object path: `build_prefix / (relative source path + ".o")`.
///
/// The prefix already encodes configuration identity, so object files are
/// never shared across configurations.
pub fn object_path(build_prefix: &Path, source: &SourceFile) -> PathBuf {
  build_prefix.join(paths::append_suffix(source.relative_path(), OBJECT_SUFFIX))
}
