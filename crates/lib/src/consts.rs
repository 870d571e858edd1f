//! Fixed names and suffixes shared across the rule engine.

/// Pseudo-target name for generated dependency records (`-MT dependencies`).
pub const DEPFILE_TARGET: &str = "dependencies";

/// Suffix appended to a source's relative path to derive its object file.
pub const OBJECT_SUFFIX: &str = ".o";

/// Suffix appended to an object path to derive its dependency file.
pub const DEPFILE_SUFFIX: &str = ".d";

/// Suffix appended to an object path to derive its compile-command record.
pub const COMMAND_RECORD_SUFFIX: &str = ".compile_command.json";

/// Length of the truncated environment checksum that keys build prefixes.
pub const ENV_CHECKSUM_PREFIX_LEN: usize = 20;
