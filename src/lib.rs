//! Rule-driven text editing for system administration.
//!
//! sysedit edits configuration files with a small rule language: a rule
//! string moves a cursor through a line buffer with regex searches and then
//! inserts, replaces or deletes text, with registers, markers and jumps for
//! control flow. A few standalone passes cover the common cases
//! without rules.
//!
//! The public API is organised into these layers:
//!
//! - **[`rules`]**: parse, check and apply rule strings
//! - **[`text`]**: the line-buffer host with file I/O and standalone passes
//! - **[`config`]**: TOML settings and JSON adapt-variables forms
//! - **[`resources`]**: idempotent `check + apply` primitives
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

/// Command-line argument definitions.
pub mod cli;
/// Top-level subcommand orchestration.
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod resources;
pub mod rules;
pub mod text;
