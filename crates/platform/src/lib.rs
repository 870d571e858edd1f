//! Platform conventions for native build artifacts
//!
//! This crate provides the platform-dependent pieces of native linking:
//! - Host OS detection
//! - Artifact classification by target-path suffix (archive, shared object, executable)
//! - Conventional library and executable file naming

mod artifact;
mod platform;

pub use artifact::ArtifactKind;
pub use platform::Platform;
