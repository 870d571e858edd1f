//! Link rule: object files into a library or executable.
//!
//! The artifact path's extension decides the tool: archiver for static
//! libraries, link driver (with the platform's shared flag) for dynamic ones,
//! plain link driver for executables. Object order is load-bearing for
//! symbol resolution and is passed through verbatim.
//!
//! Precondition (enforced by the caller's scheduler, not here): every compile
//! feeding this rule has completed.

use std::io;
use std::path::{Path, PathBuf};

use kiln_platform::{ArtifactKind, Platform};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::env::BuildEnv;
use crate::paths::argv_path;
use crate::process::{self, Invocation};
use crate::rules::Rule;
use crate::rules::types::{BuildError, LinkOutcome};

/// A non-empty, ordered object set and the artifact to produce.
#[derive(Debug, Clone)]
pub struct LinkRequest {
  pub object_files: Vec<PathBuf>,
  pub artifact: PathBuf,
}

/// Links object files into the artifact named by the request.
#[derive(Debug, Clone, Copy)]
pub struct LinkRule {
  platform: Platform,
}

impl LinkRule {
  pub fn new() -> Self {
    Self {
      platform: Platform::host(),
    }
  }

  /// A rule targeting a specific platform's link conventions.
  pub fn for_platform(platform: Platform) -> Self {
    Self { platform }
  }

  fn invocation(&self, request: &LinkRequest, env: &BuildEnv, kind: ArtifactKind, cwd: &Path) -> Invocation {
    let artifact = argv_path(&request.artifact);

    let mut invocation = match kind {
      ArtifactKind::StaticLibrary => Invocation::new(&env.ar, cwd).arg("rcs").arg(artifact),
      ArtifactKind::DynamicLibrary => Invocation::new(&env.ld, cwd)
        .arg(self.platform.shared_library_flag())
        .arg("-o")
        .arg(artifact),
      ArtifactKind::Executable => Invocation::new(&env.ld, cwd).arg("-o").arg(artifact),
    };

    invocation = invocation.args(request.object_files.iter().map(|object| argv_path(object)));

    // Archives take no link flags.
    if kind != ArtifactKind::StaticLibrary {
      invocation = invocation.args(env.linkflags.iter().cloned());
    }

    invocation
  }

  /// A failed link must not leave an artifact a caller could mistake for a
  /// successful one.
  async fn remove_partial_artifact(&self, artifact: &Path) {
    match fs::remove_file(artifact).await {
      Ok(()) => debug!(artifact = %artifact.display(), "removed partial artifact"),
      Err(error) if error.kind() == io::ErrorKind::NotFound => {}
      Err(error) => warn!(
        artifact = %artifact.display(),
        error = %error,
        "failed to remove partial artifact"
      ),
    }
  }
}

impl Default for LinkRule {
  fn default() -> Self {
    Self::new()
  }
}

impl Rule for LinkRule {
  type Request = LinkRequest;
  type Outcome = LinkOutcome;

  fn name(&self) -> &'static str {
    "link"
  }

  fn inputs(&self, request: &LinkRequest) -> Result<Vec<PathBuf>, BuildError> {
    Ok(request.object_files.clone())
  }

  fn outputs(&self, request: &LinkRequest) -> Vec<PathBuf> {
    vec![request.artifact.clone()]
  }

  async fn apply(&self, request: &LinkRequest, env: &BuildEnv) -> Result<LinkOutcome, BuildError> {
    if request.object_files.is_empty() {
      return Err(BuildError::NoObjects {
        artifact: request.artifact.display().to_string(),
      });
    }

    let kind = ArtifactKind::classify(&request.artifact);

    let parent = request.artifact.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
      fs::create_dir_all(parent).await?;
    }
    let cwd = parent.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));

    let invocation = self.invocation(request, env, kind, &cwd);

    info!(
      rule = self.name(),
      artifact = %request.artifact.display(),
      kind = kind.as_str(),
      objects = request.object_files.len(),
      "linking"
    );

    if let Err(error) = process::run(&invocation).await {
      self.remove_partial_artifact(&request.artifact).await;
      return Err(error);
    }

    Ok(LinkOutcome {
      artifact: request.artifact.clone(),
      kind,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn empty_object_set_is_rejected() {
    let request = LinkRequest {
      object_files: Vec::new(),
      artifact: PathBuf::from("/out/libdemo.a"),
    };
    let env = BuildEnv::new("cc", "c++", "/build");

    let result = LinkRule::new().apply(&request, &env).await;
    assert!(matches!(result, Err(BuildError::NoObjects { .. })));
  }

  #[test]
  fn inputs_are_the_objects_and_output_is_the_artifact() {
    let rule = LinkRule::new();
    let request = LinkRequest {
      object_files: vec![PathBuf::from("/objs/a.o"), PathBuf::from("/objs/b.o")],
      artifact: PathBuf::from("/out/demo"),
    };

    assert_eq!(rule.inputs(&request).unwrap(), request.object_files);
    assert_eq!(rule.outputs(&request), vec![PathBuf::from("/out/demo")]);
  }

  #[cfg(unix)]
  mod with_stub_tools {
    use super::*;
    use crate::testutil::{fake_tool, failing_tool, tool_log};
    use tempfile::TempDir;

    fn stub_env(temp: &TempDir, tool: &Path) -> BuildEnv {
      let tool = tool.display().to_string();
      BuildEnv::new(tool.clone(), tool.clone(), temp.path().join("build")).with_ar(tool)
    }

    #[tokio::test]
    async fn object_order_is_preserved() {
      let temp = TempDir::new().unwrap();
      let ld = fake_tool(temp.path(), "ld", "exit 0");
      let env = stub_env(&temp, &ld);

      let request = LinkRequest {
        object_files: vec![
          PathBuf::from("/objs/a.o"),
          PathBuf::from("/objs/b.o"),
          PathBuf::from("/objs/c.o"),
        ],
        artifact: temp.path().join("out/demo"),
      };
      LinkRule::for_platform(Platform::Linux).apply(&request, &env).await.unwrap();

      let log = tool_log(temp.path(), "ld");
      assert_eq!(log.len(), 1);
      assert!(log[0].ends_with("/objs/a.o /objs/b.o /objs/c.o"));
    }

    #[tokio::test]
    async fn static_library_uses_the_archiver() {
      let temp = TempDir::new().unwrap();
      let ar = fake_tool(temp.path(), "ar", "exit 0");
      let env = stub_env(&temp, &ar).with_linkflags(vec!["-pthread".to_string()]);

      let request = LinkRequest {
        object_files: vec![PathBuf::from("/objs/a.o")],
        artifact: temp.path().join("out/libdemo.a"),
      };
      let outcome = LinkRule::for_platform(Platform::Linux).apply(&request, &env).await.unwrap();

      assert_eq!(outcome.kind, ArtifactKind::StaticLibrary);
      let log = tool_log(temp.path(), "ar");
      // rcs, artifact, objects; link flags do not reach the archiver.
      assert_eq!(log[0], format!("rcs {} /objs/a.o", temp.path().join("out/libdemo.a").display()));
    }

    #[tokio::test]
    async fn dynamic_library_gets_the_shared_flag() {
      let temp = TempDir::new().unwrap();
      let ld = fake_tool(temp.path(), "ld", "exit 0");
      let env = stub_env(&temp, &ld).with_linkflags(vec!["-pthread".to_string()]);

      let request = LinkRequest {
        object_files: vec![PathBuf::from("/objs/a.o")],
        artifact: temp.path().join("out/libdemo.so"),
      };
      let outcome = LinkRule::for_platform(Platform::Linux).apply(&request, &env).await.unwrap();

      assert_eq!(outcome.kind, ArtifactKind::DynamicLibrary);
      let log = tool_log(temp.path(), "ld");
      assert_eq!(
        log[0],
        format!(
          "-shared -o {} /objs/a.o -pthread",
          temp.path().join("out/libdemo.so").display()
        )
      );
    }

    #[tokio::test]
    async fn executable_links_with_plain_output_flag() {
      let temp = TempDir::new().unwrap();
      let ld = fake_tool(temp.path(), "ld", "exit 0");
      let env = stub_env(&temp, &ld);

      let request = LinkRequest {
        object_files: vec![PathBuf::from("/objs/a.o")],
        artifact: temp.path().join("out/demo"),
      };
      let outcome = LinkRule::for_platform(Platform::Linux).apply(&request, &env).await.unwrap();

      assert_eq!(outcome.kind, ArtifactKind::Executable);
      let log = tool_log(temp.path(), "ld");
      assert_eq!(
        log[0],
        format!("-o {} /objs/a.o", temp.path().join("out/demo").display())
      );
    }

    #[tokio::test]
    async fn failed_link_removes_the_partial_artifact() {
      let temp = TempDir::new().unwrap();
      let artifact = temp.path().join("out/demo");
      // Stub writes a partial artifact, then fails.
      let body = format!(": > \"{}\"\nexit 1", artifact.display());
      let ld = fake_tool(temp.path(), "ld", &body);
      let env = stub_env(&temp, &ld);

      let request = LinkRequest {
        object_files: vec![PathBuf::from("/objs/a.o")],
        artifact: artifact.clone(),
      };
      let result = LinkRule::for_platform(Platform::Linux).apply(&request, &env).await;

      assert!(matches!(result, Err(BuildError::CommandFailed { code: Some(1), .. })));
      assert!(!artifact.exists());
    }

    #[tokio::test]
    async fn failed_link_without_partial_artifact_still_fails_cleanly() {
      let temp = TempDir::new().unwrap();
      let ld = failing_tool(temp.path(), "ld", 2);
      let env = stub_env(&temp, &ld);

      let request = LinkRequest {
        object_files: vec![PathBuf::from("/objs/a.o")],
        artifact: temp.path().join("out/demo"),
      };
      let result = LinkRule::for_platform(Platform::Linux).apply(&request, &env).await;

      assert!(matches!(result, Err(BuildError::CommandFailed { code: Some(2), .. })));
    }
  }
}
