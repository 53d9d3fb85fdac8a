//! CLI module - command-line interface
//!
//! Contains the REPL, its commands, and the connectivity smoke test.

pub mod check;
pub mod commands;
pub mod repl;

pub use check::run_check;
pub use repl::Repl;
