//! CLI module for argument parsing and output formatting.
//!
//! The host side of the engine: turns command line flags into a
//! `ValidationConfig` and renders a `ValidationReport`.

pub mod args;
pub mod output;
