//! kiln-lib: incremental compile/link rules for native targets
//!
//! This crate provides the rule engine underneath a native-code build plugin:
//! - `rules`: typed compile, link, and aggregate rules (inputs, outputs, apply)
//! - `depfile`: Makefile-style dependency records driving implicit inputs
//! - `env` / `prefix`: immutable build configuration and the checksum-keyed
//!   build prefix isolating object files per configuration
//! - `process`: external compiler/linker invocation
//! - `commands`: compile-command records for external tooling
//!
//! Scheduling is the caller's concern: rules are invoked synchronously, one at
//! a time per rule, and compile invocations for distinct object paths may run
//! concurrently. A link rule must only run after all of its compiles complete.

pub mod commands;
pub mod consts;
pub mod depfile;
pub mod env;
pub mod paths;
pub mod prefix;
pub mod process;
pub mod rules;

#[cfg(test)]
pub(crate) mod testutil;
