//! CLI subcommand handlers.
//!
//! This module groups the implementations for each `topaz-publish`
//! subcommand plus the default publish action, keeping `cli.rs` focused on
//! argument definitions.

pub mod auth;
pub mod completions;
pub mod fetch;
pub mod publish;
pub mod version;
