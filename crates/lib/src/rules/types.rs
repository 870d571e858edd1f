//! Error and outcome types for rule invocations.

use std::path::PathBuf;

use kiln_platform::ArtifactKind;
use thiserror::Error;

use crate::depfile::DepfileError;
use crate::paths::PathError;

/// Errors that can abort a rule invocation.
///
/// No variant is recoverable within this core: a failed compile produces no
/// outcome, and a failed link leaves no artifact behind. Retry policy belongs
/// to the external scheduler.
#[derive(Debug, Error)]
pub enum BuildError {
  /// A rule was asked to process a file outside its extension pattern.
  #[error("rule {rule} cannot process {path}: unrecognized extension")]
  NotApplicable { rule: &'static str, path: String },

  /// A dependency file exists but cannot be parsed.
  #[error(transparent)]
  Depfile(#[from] DepfileError),

  /// A source or search path does not resolve against its project root.
  #[error(transparent)]
  PathOutsideRoot(#[from] PathError),

  /// The compiler or linker executable could not be started.
  #[error("failed to spawn {program}: {message}")]
  Spawn { program: String, message: String },

  /// The compiler or linker exited non-zero.
  #[error("command failed with exit code {code:?}: {command}")]
  CommandFailed { command: String, code: Option<i32> },

  /// A link rule received an empty object set.
  #[error("nothing to link into {artifact}: no object files")]
  NoObjects { artifact: String },

  /// The compile-command record could not be written.
  #[error("failed to write command record {path}: {message}")]
  WriteRecord { path: String, message: String },

  /// The environment could not be fingerprinted for prefix derivation.
  #[error("failed to fingerprint environment: {0}")]
  Checksum(#[from] serde_json::Error),

  /// Directory creation or file write failure.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Result of one compile invocation.
#[derive(Debug, Clone)]
pub struct CompileOutcome {
  /// The object file the compiler produced.
  pub object_file: PathBuf,
  /// Headers recorded by the previous invocation's depfile, resolved against
  /// the source root. Empty on a clean build. The external scheduler compares
  /// these against the object's timestamp to decide staleness.
  pub implicit_dependencies: Vec<PathBuf>,
}

/// Result of one link invocation.
#[derive(Debug, Clone)]
pub struct LinkOutcome {
  pub artifact: PathBuf,
  pub kind: ArtifactKind,
}

/// Result of one aggregate native build.
#[derive(Debug, Clone)]
pub struct NativeOutcome {
  pub artifact: PathBuf,
  pub kind: ArtifactKind,
  /// The prefix all object files were placed under.
  pub build_prefix: PathBuf,
  /// Per-source compile outcomes, in source order.
  pub objects: Vec<CompileOutcome>,
}
