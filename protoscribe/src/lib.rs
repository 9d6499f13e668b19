//! # protoscribe
//!
//! A compiler from an extracted intermediate representation (IR) of type
//! definitions to Protocol Buffers IDL text.
//!
//! The IR is produced by an external extractor that inspects a compiled
//! binary whose original `.proto` sources are unavailable. Because that
//! graph is reverse-engineered, it may contain namespace-crossing reference
//! cycles, colliding type names and proto2-only field labels; this crate
//! turns it into a *structurally valid* schema set: no circular imports, no
//! duplicate identifiers in a scope, and field modifiers correct for the
//! selected syntax dialect.
//!
//! ## Pipeline
//!
//! One pass per stage, no backtracking - except that breaking an import
//! cycle merges two files, which re-runs name resolution over the merged
//! scope:
//!
//! 1. [`ir`] - the read-only input graph.
//! 2. [`packaging`] - assign every namespace to an output package and file
//!    (identity, manual override, or automatic prefix grouping; dump mode
//!    collapses everything into one file).
//! 3. [`resolver`] - detect per-file name collisions and disambiguate them
//!    deterministically, or fail.
//! 4. [`graph`] - derive the import graph between files and make it a DAG,
//!    either by failing on a cycle or by inlining files into each other.
//! 5. [`planner`] / [`emitter`] - decide final paths and render each file
//!    as proto2 or proto3 text.
//!
//! ## Quick start
//!
//! ```rust
//! use protoscribe::ir::{Field, FieldLabel, FieldType, IrNamespace, IrProgram, ScalarType, TypeDef};
//! use protoscribe::{CompilerConfig, ProtoCompiler};
//!
//! let program = IrProgram::new().with_namespace(
//!     IrNamespace::new("Game").with_type(TypeDef::message(
//!         "Card",
//!         "Game.Card",
//!         vec![Field::new("id", 1, FieldLabel::Required, FieldType::Scalar(ScalarType::Int32))],
//!     )),
//! );
//!
//! let compiler = ProtoCompiler::new(program, CompilerConfig::default());
//! let outputs = compiler.compile().expect("structurally valid IR");
//! assert_eq!(outputs[0].path.to_string_lossy(), "Game.proto");
//! ```
//!
//! Compilation is fail-fast: either every planned file is produced or none
//! is, so any emitted file set is mutually import-consistent.

pub mod compiler;
pub mod emitter;
pub mod error;
pub mod graph;
pub mod ir;
pub mod options;
pub mod packaging;
pub mod planner;
pub mod resolver;

// Re-export the compilation surface
pub use compiler::{CompilerConfig, ProtoCompiler};
pub use emitter::Syntax;
pub use error::{CompileError, CompileResult};
pub use ir::{IrNamespace, IrProgram};
pub use options::FileOptions;
pub use packaging::{ManualPackaging, PackagingPolicy, DUMP_FILE_NAME};
pub use planner::OutputFile;
pub use resolver::NameTable;
