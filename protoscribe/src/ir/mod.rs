//! Intermediate Representation (IR) module.
//!
//! This module defines the output-agnostic data structures produced by an
//! extractor from a compiled binary. The IR is a passive graph: the compiler
//! reads it but never mutates it. Type definitions reference each other by
//! identity (the referent's fully qualified original name), never by a
//! resolved display name.

pub mod program;
pub mod types;

pub use program::{IrNamespace, IrProgram};
pub use types::{EnumValue, Field, FieldLabel, FieldType, RpcMethod, ScalarType, TypeBody, TypeDef};
