//! Aggregate rule: compile a source set into the build prefix, then link.
//!
//! This is the only place the environment checksum turns into a build prefix:
//! without an explicit prefix, every object for one configuration lands under
//! one deterministic, configuration-unique subtree, which is what makes
//! incremental rebuilds across configurations safe without manual cleaning.

use std::path::PathBuf;

use kiln_platform::Platform;
use tracing::info;

use crate::env::BuildEnv;
use crate::prefix;
use crate::rules::compile::{CompileRequest, CompileRule};
use crate::rules::link::{LinkRequest, LinkRule};
use crate::rules::types::{BuildError, NativeOutcome};
use crate::rules::{Rule, SourceFile, object_path};

/// Sources, target artifact, and an optional explicit build prefix.
#[derive(Debug, Clone)]
pub struct NativeRequest {
  /// Source files in link order.
  pub source_files: Vec<SourceFile>,
  /// Target library or executable path; its extension selects the link kind.
  pub artifact: PathBuf,
  /// Overrides the checksum-derived prefix. The caller then owns
  /// configuration isolation.
  pub build_prefix: Option<PathBuf>,
}

/// Builds a native library or executable from sources.
#[derive(Debug, Clone, Copy)]
pub struct NativeRule {
  link: LinkRule,
}

impl NativeRule {
  pub fn new() -> Self {
    Self { link: LinkRule::new() }
  }

  /// A rule targeting a specific platform's link conventions.
  pub fn for_platform(platform: Platform) -> Self {
    Self {
      link: LinkRule::for_platform(platform),
    }
  }
}

impl Default for NativeRule {
  fn default() -> Self {
    Self::new()
  }
}

impl Rule for NativeRule {
  type Request = NativeRequest;
  type Outcome = NativeOutcome;

  fn name(&self) -> &'static str {
    "build.native"
  }

  fn inputs(&self, request: &NativeRequest) -> Result<Vec<PathBuf>, BuildError> {
    Ok(request.source_files.iter().map(|source| source.path().to_path_buf()).collect())
  }

  fn outputs(&self, request: &NativeRequest) -> Vec<PathBuf> {
    vec![request.artifact.clone()]
  }

  async fn apply(&self, request: &NativeRequest, env: &BuildEnv) -> Result<NativeOutcome, BuildError> {
    let build_prefix = prefix::resolve_for_env(request.build_prefix.as_deref(), env)?;

    info!(
      rule = self.name(),
      artifact = %request.artifact.display(),
      prefix = %build_prefix.display(),
      sources = request.source_files.len(),
      "building native target"
    );

    // Any compile failure aborts before the link rule runs.
    let mut objects = Vec::with_capacity(request.source_files.len());
    for source in &request.source_files {
      let rule = CompileRule::for_source(source)?;
      let compile_request = CompileRequest {
        object_file: object_path(&build_prefix, source),
        source_file: source.clone(),
      };
      objects.push(rule.apply(&compile_request, env).await?);
    }

    let link_request = LinkRequest {
      object_files: objects.iter().map(|outcome| outcome.object_file.clone()).collect(),
      artifact: request.artifact.clone(),
    };
    let link_outcome = self.link.apply(&link_request, env).await?;

    Ok(NativeOutcome {
      artifact: link_outcome.artifact,
      kind: link_outcome.kind,
      build_prefix,
      objects,
    })
  }
}
