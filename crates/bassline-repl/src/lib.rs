//! Bassline REPL - Interactive command-line interface for the Bassline word
//! interpreter
//!
//! This crate provides REPL (Read-Eval-Print Loop) functionality for Bassline,
//! including command parsing, multi-line input handling, and chron dispatch.

pub mod repl;

// Re-export commonly used types for convenience
pub use repl::{BufferNotifier, DefaultNotifier, Repl, ReplCommand, ReplNotifier};
