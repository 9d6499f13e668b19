//! # protoscribe-cli
//!
//! CLI library for compiling extracted type-definition IR into Protocol
//! Buffers schema files.
//!
//! This crate provides the front-end functionality for the `protoscribe`
//! binary: configuration loading and merging, IR input, manual packaging
//! file parsing, and file output.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration management and TOML parsing
//! - [`ir_input`] - Loading pre-extracted IR programs from JSON
//! - [`packaging_file`] - Manual packaging override file parsing
//! - [`writer`] - File output and dry-run support
//! - [`error`] - Error types and handling

pub mod config;
pub mod error;
pub mod ir_input;
pub mod packaging_file;
pub mod writer;

// Re-export main types for convenience
pub use config::{Config, ConfigManager};
pub use error::{CliError, CliResult};
pub use ir_input::IrLoader;
pub use writer::{FileWriter, WriteResult};
