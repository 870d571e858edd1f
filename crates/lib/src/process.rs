//! External compiler/linker invocation.
//!
//! A rule builds an `Invocation` (argument vector, working directory, optional
//! environment overrides) and runs it to completion. The child's exit status
//! is the only success signal; stdout/stderr are captured and surfaced through
//! logging, not parsed.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tokio::process::Command;
use tracing::debug;

use crate::rules::types::BuildError;

/// One external tool invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: PathBuf,
  /// Overrides merged over the inherited environment.
  pub env: BTreeMap<String, String>,
}

impl Invocation {
  pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: cwd.into(),
      env: BTreeMap::new(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }

  /// Full argument vector including the program itself.
  pub fn argv(&self) -> Vec<String> {
    std::iter::once(self.program.clone()).chain(self.args.iter().cloned()).collect()
  }

  /// Rendered command line for error reporting.
  pub fn command_line(&self) -> String {
    self.argv().join(" ")
  }
}

/// Run an invocation to completion.
///
/// A non-zero exit aborts the calling rule; this core never retries.
pub async fn run(invocation: &Invocation) -> Result<(), BuildError> {
  debug!(
    program = %invocation.program,
    cwd = %invocation.cwd.display(),
    args = ?invocation.args,
    "spawning process"
  );

  let output = Command::new(&invocation.program)
    .args(&invocation.args)
    .current_dir(&invocation.cwd)
    .envs(&invocation.env)
    .output()
    .await
    .map_err(|error| BuildError::Spawn {
      program: invocation.program.clone(),
      message: error.to_string(),
    })?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "process stderr");
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "process stdout");
    }

    return Err(BuildError::CommandFailed {
      command: invocation.command_line(),
      code: output.status.code(),
    });
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::{shell_cmd, touch_file};
  use tempfile::TempDir;

  #[tokio::test]
  async fn successful_invocation_returns_ok() {
    let temp = TempDir::new().unwrap();
    let (program, args) = shell_cmd("exit 0");
    let invocation = Invocation::new(program, temp.path()).args(args);

    run(&invocation).await.unwrap();
  }

  #[tokio::test]
  async fn non_zero_exit_carries_command_line_and_code() {
    let temp = TempDir::new().unwrap();
    let (program, args) = shell_cmd("exit 3");
    let invocation = Invocation::new(program, temp.path()).args(args);

    let result = run(&invocation).await;
    match result {
      Err(BuildError::CommandFailed { command, code }) => {
        assert!(command.contains("exit 3"));
        assert_eq!(code, Some(3));
      }
      other => panic!("expected CommandFailed, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn missing_program_is_a_spawn_error() {
    let temp = TempDir::new().unwrap();
    let invocation = Invocation::new("kiln-no-such-tool", temp.path());

    let result = run(&invocation).await;
    assert!(matches!(result, Err(BuildError::Spawn { .. })));
  }

  #[tokio::test]
  async fn working_directory_is_honored() {
    let temp = TempDir::new().unwrap();
    let (program, args) = touch_file("cwd_marker");
    let invocation = Invocation::new(program, temp.path()).args(args);

    run(&invocation).await.unwrap();
    assert!(temp.path().join("cwd_marker").exists());
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn env_overrides_reach_the_child() {
    let temp = TempDir::new().unwrap();
    let (program, args) = shell_cmd("test \"$KILN_TEST_VAR\" = expected");
    let invocation = Invocation::new(program, temp.path())
      .args(args)
      .env("KILN_TEST_VAR", "expected");

    run(&invocation).await.unwrap();
  }

  #[test]
  fn argv_includes_the_program() {
    let invocation = Invocation::new("cc", "/root").arg("-c").arg("main.c");
    assert_eq!(invocation.argv(), vec!["cc", "-c", "main.c"]);
    assert_eq!(invocation.command_line(), "cc -c main.c");
  }
}
