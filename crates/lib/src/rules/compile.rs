//! Compile rules: one source file to one object file.
//!
//! Three variants share one implementation, differing in extension pattern,
//! compiler selection, and whether the preprocessor emits a depfile. The
//! depfile produced by an invocation is consumed on the *next* invocation to
//! recover implicit header dependencies; the command record is written before
//! the compiler runs.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::commands::{self, CommandRecord};
use crate::consts::{DEPFILE_SUFFIX, DEPFILE_TARGET};
use crate::depfile;
use crate::env::BuildEnv;
use crate::paths::{append_suffix, argv_path, shortest_path};
use crate::process::{self, Invocation};
use crate::rules::types::{BuildError, CompileOutcome};
use crate::rules::{Rule, SourceFile, SourceKind};

/// One source file and the object path chosen by the caller.
#[derive(Debug, Clone)]
pub struct CompileRequest {
  pub source_file: SourceFile,
  pub object_file: PathBuf,
}

/// Compile rule for one language family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileRule {
  kind: SourceKind,
}

impl CompileRule {
  pub fn new(kind: SourceKind) -> Self {
    Self { kind }
  }

  /// Select the variant matching `source`'s extension class.
  pub fn for_source(source: &SourceFile) -> Result<Self, BuildError> {
    match SourceKind::classify(source.path()) {
      Some(kind) => Ok(Self { kind }),
      None => Err(BuildError::NotApplicable {
        rule: "compile",
        path: source.path().display().to_string(),
      }),
    }
  }

  pub fn kind(&self) -> SourceKind {
    self.kind
  }

  /// Dependency file sitting next to the object file.
  ///
  /// Derived from the object path, not stored: implicit outputs are pure
  /// functions of the explicit one.
  pub fn dependency_file(object_file: &Path) -> PathBuf {
    append_suffix(object_file, DEPFILE_SUFFIX)
  }

  /// Assembly has no preprocessor: no depfile, no command record.
  fn tracks_dependencies(&self) -> bool {
    self.kind != SourceKind::Assembly
  }

  fn compiler<'a>(&self, env: &'a BuildEnv) -> &'a str {
    match self.kind {
      SourceKind::Cpp => &env.cxx,
      SourceKind::C | SourceKind::Assembly => &env.cc,
    }
  }

  fn language_flags<'a>(&self, env: &'a BuildEnv) -> &'a [String] {
    match self.kind {
      SourceKind::Cpp => &env.cxxflags,
      SourceKind::C | SourceKind::Assembly => &env.cflags,
    }
  }

  fn ensure_applicable(&self, source: &SourceFile) -> Result<(), BuildError> {
    if SourceKind::classify(source.path()) == Some(self.kind) {
      Ok(())
    } else {
      Err(BuildError::NotApplicable {
        rule: self.name(),
        path: source.path().display().to_string(),
      })
    }
  }

  /// Build the compiler invocation for `request`.
  ///
  /// All paths are relative to the source root, which is also the working
  /// directory, so depfiles and command records stay relocatable.
  fn invocation(&self, request: &CompileRequest, env: &BuildEnv) -> Invocation {
    let source = &request.source_file;
    let root = source.root();

    let mut invocation = Invocation::new(self.compiler(env), root)
      .arg("-c")
      .arg(argv_path(source.relative_path()))
      .arg("-o")
      .arg(argv_path(&shortest_path(&request.object_file, root)));

    if self.tracks_dependencies() {
      let dependency_file = Self::dependency_file(&request.object_file);
      invocation = invocation
        .arg("-MMD")
        .arg("-MF")
        .arg(argv_path(&shortest_path(&dependency_file, root)))
        .arg("-MT")
        .arg(DEPFILE_TARGET);
    }

    invocation = invocation.args(self.language_flags(env).iter().cloned());

    for search_path in &env.header_search_paths {
      invocation = invocation.arg("-I").arg(argv_path(&shortest_path(search_path, root)));
    }

    invocation
  }
}

impl Rule for CompileRule {
  type Request = CompileRequest;
  type Outcome = CompileOutcome;

  fn name(&self) -> &'static str {
    match self.kind {
      SourceKind::Assembly => "compile.asm",
      SourceKind::C => "compile.c",
      SourceKind::Cpp => "compile.cpp",
    }
  }

  fn inputs(&self, request: &CompileRequest) -> Result<Vec<PathBuf>, BuildError> {
    let mut inputs = vec![request.source_file.path().to_path_buf()];
    if self.tracks_dependencies() {
      inputs.extend(depfile::read(
        &Self::dependency_file(&request.object_file),
        request.source_file.root(),
      )?);
    }
    Ok(inputs)
  }

  fn outputs(&self, request: &CompileRequest) -> Vec<PathBuf> {
    let mut outputs = vec![request.object_file.clone()];
    if self.tracks_dependencies() {
      outputs.push(Self::dependency_file(&request.object_file));
      outputs.push(commands::record_path(&request.object_file));
    }
    outputs
  }

  async fn apply(&self, request: &CompileRequest, env: &BuildEnv) -> Result<CompileOutcome, BuildError> {
    self.ensure_applicable(&request.source_file)?;

    let source = &request.source_file;
    let root = source.root();

    // Read the previous invocation's depfile before the compiler overwrites it.
    let implicit_dependencies = if self.tracks_dependencies() {
      depfile::read(&Self::dependency_file(&request.object_file), root)?
    } else {
      Vec::new()
    };
    if !implicit_dependencies.is_empty() {
      debug!(
        source = %source.relative_path().display(),
        count = implicit_dependencies.len(),
        "recovered implicit dependencies"
      );
    }

    if let Some(parent) = request.object_file.parent() {
      // Idempotent, safe under concurrent creation by sibling compiles.
      fs::create_dir_all(parent).await?;
    }

    let invocation = self.invocation(request, env);

    if self.tracks_dependencies() {
      let record = CommandRecord {
        directory: argv_path(root),
        arguments: invocation.argv(),
        file: argv_path(source.relative_path()),
      };
      commands::write_record(&record, &commands::record_path(&request.object_file))?;
    }

    info!(
      rule = self.name(),
      source = %source.relative_path().display(),
      object = %request.object_file.display(),
      "compiling"
    );
    process::run(&invocation).await?;

    Ok(CompileOutcome {
      object_file: request.object_file.clone(),
      implicit_dependencies,
    })
  }
}
