//! Test utilities for kiln-lib.
//!
//! Helpers for tests that execute real processes: portable shell one-liners
//! and fake compiler/linker scripts that record their argument vectors.

#[cfg(unix)]
use std::path::{Path, PathBuf};

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Returns the command and args to create a marker file in the current directory.
#[cfg(unix)]
pub fn touch_file(filename: &str) -> (&'static str, Vec<String>) {
  ("/usr/bin/touch", vec![filename.to_string()])
}

#[cfg(windows)]
pub fn touch_file(filename: &str) -> (&'static str, Vec<String>) {
  (
    "powershell.exe",
    vec![
      "-NoProfile".to_string(),
      "-Command".to_string(),
      format!("New-Item -ItemType File -Path '{}' -Force | Out-Null", filename),
    ],
  )
}

/// Write an executable stub tool that runs `body` as a shell script.
///
/// The stub appends its argument vector to `<dir>/<name>.log` (one line per
/// invocation) before running `body`, so tests can assert on exactly what a
/// rule invoked.
#[cfg(unix)]
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let log = dir.join(format!("{name}.log"));
  let path = dir.join(name);
  let script = format!("#!/bin/sh\nprintf '%s\\n' \"$*\" >> \"{}\"\n{}\n", log.display(), body);
  std::fs::write(&path, script).unwrap();

  let mut permissions = std::fs::metadata(&path).unwrap().permissions();
  permissions.set_mode(0o755);
  std::fs::set_permissions(&path, permissions).unwrap();

  path
}

/// A stub compiler: touches the `-o` object and, when `-MF` is present,
/// writes a depfile recording `headers`.
#[cfg(unix)]
pub fn fake_compiler(dir: &Path, name: &str, headers: &[&str]) -> PathBuf {
  let record = if headers.is_empty() {
    "dependencies:".to_string()
  } else {
    format!("dependencies: {}", headers.join(" "))
  };
  let body = format!(
    r#"obj=""; dep=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) obj="$2"; shift ;;
    -MF) dep="$2"; shift ;;
  esac
  shift
done
[ -n "$obj" ] && : > "$obj"
[ -n "$dep" ] && printf '%s\n' '{record}' > "$dep"
exit 0"#,
    record = record
  );
  fake_tool(dir, name, &body)
}

/// A stub tool that exits with `code` without producing output files.
#[cfg(unix)]
pub fn failing_tool(dir: &Path, name: &str, code: i32) -> PathBuf {
  fake_tool(dir, name, &format!("exit {code}"))
}

/// Read a fake tool's invocation log, one argument-vector line per entry.
#[cfg(unix)]
pub fn tool_log(dir: &Path, name: &str) -> Vec<String> {
  match std::fs::read_to_string(dir.join(format!("{name}.log"))) {
    Ok(contents) => contents.lines().map(str::to_string).collect(),
    Err(_) => Vec::new(),
  }
}
