//! Immutable build configuration and its checksum.
//!
//! A `BuildEnv` is composed by the caller (target system, toolchain presets)
//! before it reaches this crate, and is read-only within a rule invocation.
//! Its checksum fingerprints every value that reaches a compiler or linker
//! argument vector; the checksum keys the build prefix, so any flag change
//! lands object files in a fresh directory instead of silently reusing
//! incompatible ones.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::consts::ENV_CHECKSUM_PREFIX_LEN;

/// Configuration fingerprint keying the build prefix.
///
/// A truncated lowercase-hex SHA-256 of the invocation-affecting environment
/// values, e.g. `"a1b2c3d4e5f6789012ab"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvChecksum(pub String);

impl EnvChecksum {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for EnvChecksum {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Build configuration consumed by rule invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildEnv {
  /// C compiler driver, also used for assembly sources.
  pub cc: String,
  /// C++ compiler driver.
  pub cxx: String,
  /// Archiver for static libraries.
  pub ar: String,
  /// Link driver for dynamic libraries and executables.
  pub ld: String,
  /// Flags for C-family and assembly compiles, order preserved.
  pub cflags: Vec<String>,
  /// Flags for C++-family compiles, order preserved.
  pub cxxflags: Vec<String>,
  /// Flags appended to dynamic-library and executable links, order preserved.
  pub linkflags: Vec<String>,
  /// Header search directories, emitted as `-I` in the given order.
  pub header_search_paths: Vec<PathBuf>,
  /// Base directory under which per-configuration prefixes are allocated.
  pub build_prefix: PathBuf,
}

impl BuildEnv {
  /// A minimal environment: `ld` defaults to the C++ driver, `ar` to `ar`.
  pub fn new(cc: impl Into<String>, cxx: impl Into<String>, build_prefix: impl Into<PathBuf>) -> Self {
    let cxx = cxx.into();
    Self {
      cc: cc.into(),
      ld: cxx.clone(),
      cxx,
      ar: "ar".to_string(),
      cflags: Vec::new(),
      cxxflags: Vec::new(),
      linkflags: Vec::new(),
      header_search_paths: Vec::new(),
      build_prefix: build_prefix.into(),
    }
  }

  pub fn with_cflags(mut self, cflags: Vec<String>) -> Self {
    self.cflags = cflags;
    self
  }

  pub fn with_cxxflags(mut self, cxxflags: Vec<String>) -> Self {
    self.cxxflags = cxxflags;
    self
  }

  pub fn with_linkflags(mut self, linkflags: Vec<String>) -> Self {
    self.linkflags = linkflags;
    self
  }

  pub fn with_header_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
    self.header_search_paths = paths;
    self
  }

  pub fn with_ar(mut self, ar: impl Into<String>) -> Self {
    self.ar = ar.into();
    self
  }

  pub fn with_ld(mut self, ld: impl Into<String>) -> Self {
    self.ld = ld.into();
    self
  }

  /// Fingerprint of every value that affects a compiler or linker invocation.
  ///
  /// Equal environments always produce equal checksums; any change to a tool
  /// path, a flag (including order), or a search path changes the checksum.
  /// The base `build_prefix` is excluded: it decides where output lands, not
  /// what the tools do.
  pub fn checksum(&self) -> Result<EnvChecksum, serde_json::Error> {
    #[derive(Serialize)]
    struct Fingerprint<'a> {
      cc: &'a str,
      cxx: &'a str,
      ar: &'a str,
      ld: &'a str,
      cflags: &'a [String],
      cxxflags: &'a [String],
      linkflags: &'a [String],
      header_search_paths: &'a [PathBuf],
    }

    let serialized = serde_json::to_string(&Fingerprint {
      cc: &self.cc,
      cxx: &self.cxx,
      ar: &self.ar,
      ld: &self.ld,
      cflags: &self.cflags,
      cxxflags: &self.cxxflags,
      linkflags: &self.linkflags,
      header_search_paths: &self.header_search_paths,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    let full = format!("{:x}", hasher.finalize());
    Ok(EnvChecksum(full[..ENV_CHECKSUM_PREFIX_LEN].to_string()))
  }
}
