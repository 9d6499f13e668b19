//! Error types for the compiler.
//!
//! Every error aborts the whole compilation run; there is no partial-success
//! mode. Either every planned output file is produced or none is.

use thiserror::Error;

/// Result type alias for compiler operations.
pub type CompileResult<T> = Result<T, CompileError>;

/// Main error type for a compilation run.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Invalid configuration, reported before any file is emitted.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Two type identities claim the same name in one output scope.
    #[error("name collision: {0}")]
    NameCollision(#[from] NameCollisionError),

    /// The output file graph contains an import cycle.
    #[error("circular dependency: {0}")]
    CircularDependency(#[from] CircularDependencyError),

    /// The input IR violates an invariant the compiler relies on.
    #[error("malformed IR: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Invalid configuration or option registration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A file option was registered with an empty key.
    #[error("file option key must not be empty")]
    EmptyOptionKey,

    /// A namespace appears more than once in the manual packaging table.
    #[error("namespace '{namespace}' is mapped twice in the manual packaging table ('{first}' and '{second}')")]
    AmbiguousManualEntry {
        namespace: String,
        first: String,
        second: String,
    },
}

/// Two distinct type identities would share a local name in the same
/// output file.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{first}' and '{second}' both emit '{name}' in {scope}")]
pub struct NameCollisionError {
    /// The colliding local name.
    pub name: String,

    /// The output file whose scope the collision occurs in.
    pub scope: String,

    /// Fully qualified identity of the first claimant.
    pub first: String,

    /// Fully qualified identity of the second claimant.
    pub second: String,
}

/// An import cycle among output files.
///
/// Protocol Buffers import statements cannot form cycles, so a cycle here is
/// a hard structural defect in the reconstructed IR.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{}", .cycle.join(" -> "))]
pub struct CircularDependencyError {
    /// The ordered file cycle, first file repeated at the end.
    pub cycle: Vec<String>,
}

/// A malformed input IR. Never auto-corrected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A message declares the same field tag more than once.
    #[error("message '{message}' declares field tag {tag} more than once")]
    DuplicateTag { message: String, tag: u32 },

    /// A type references an identity that does not exist in the program.
    #[error("'{referrer}' references unknown type '{target}'")]
    DanglingReference { referrer: String, target: String },
}
