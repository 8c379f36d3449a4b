//! Guide CLI library - exposes modules for testing.

pub mod commands;
pub mod repl;
