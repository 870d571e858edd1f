//! Artifact classification by target-path suffix

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// What a link invocation produces, decided by the artifact path's extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    StaticLibrary,
    DynamicLibrary,
    Executable,
}

impl ArtifactKind {
    /// Classify a target path by suffix convention.
    ///
    /// `.a`/`.lib` are archives, `.so`/`.dylib`/`.dll` are shared libraries,
    /// everything else (including `.exe` and extensionless paths) links as an
    /// executable. All platforms' suffixes are recognized so that a target
    /// declaration written on one OS still classifies on another.
    pub fn classify(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("a") | Some("lib") => ArtifactKind::StaticLibrary,
            Some("so") | Some("dylib") | Some("dll") => ArtifactKind::DynamicLibrary,
            _ => ArtifactKind::Executable,
        }
    }

    /// Returns the kind name as used in logs and diagnostics
    pub const fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::StaticLibrary => "static-library",
            ArtifactKind::DynamicLibrary => "dynamic-library",
            ArtifactKind::Executable => "executable",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
