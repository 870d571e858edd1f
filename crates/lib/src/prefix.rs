//! Build-prefix allocation.
//!
//! Every configuration gets its own output subtree: object files for one set
//! of flags never collide with another's, which is what makes incremental
//! rebuilds across configurations safe without manual cleaning. An explicit
//! prefix bypasses the derivation; the caller then owns isolation.

use std::path::{Path, PathBuf};

use crate::env::{BuildEnv, EnvChecksum};

/// Resolve the build prefix for one aggregate invocation.
///
/// An explicit prefix is used verbatim; otherwise the checksum keys a
/// subdirectory of `base`.
pub fn resolve(explicit: Option<&Path>, base: &Path, checksum: &EnvChecksum) -> PathBuf {
  match explicit {
    Some(path) => path.to_path_buf(),
    None => base.join(checksum.as_str()),
  }
}

/// Resolve against `env`'s own base prefix and fingerprint.
pub fn resolve_for_env(explicit: Option<&Path>, env: &BuildEnv) -> Result<PathBuf, serde_json::Error> {
  match explicit {
    Some(path) => Ok(path.to_path_buf()),
    None => Ok(env.build_prefix.join(env.checksum()?.as_str())),
  }
}
