//! Compilation pipeline facade.
//!
//! The pipeline is single-threaded and synchronous: validate the IR, assign
//! packages, resolve names, resolve the import graph, then plan and emit.
//! The first hard error aborts the run; no partial output is returned.

use crate::emitter::{Emitter, Syntax};
use crate::error::{CompileResult, ConfigError, InvariantViolation};
use crate::graph::{GraphResolver, ImportGraph};
use crate::ir::{IrNamespace, IrProgram, TypeBody};
use crate::options::FileOptions;
use crate::packaging::{Packager, PackagingPolicy};
use crate::planner::{OutputFile, OutputPlanner};
use crate::resolver::NameResolver;

/// Configuration consumed by the compiler core.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Output dialect.
    pub syntax: Syntax,

    /// Collapse the whole program into the single dump file.
    pub dump_mode: bool,

    /// Namespace-to-package policy. Ignored in dump mode.
    pub packaging: PackagingPolicy,

    /// Break import cycles by inlining instead of failing.
    pub resolve_circular_dependencies: bool,

    /// Rename colliding types instead of failing.
    pub resolve_name_collisions: bool,

    /// Mirror package paths as directories in the output layout.
    pub package_structured: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            syntax: Syntax::Proto2,
            dump_mode: false,
            packaging: PackagingPolicy::Identity,
            resolve_circular_dependencies: false,
            resolve_name_collisions: false,
            package_structured: true,
        }
    }
}

/// Compiles an IR program into a set of proto files.
///
/// File options may be registered any number of times before [`compile`]
/// (later registrations with the same key overwrite earlier ones); they are
/// applied identically to every emitted file.
///
/// [`compile`]: ProtoCompiler::compile
pub struct ProtoCompiler {
    program: IrProgram,
    config: CompilerConfig,
    file_options: FileOptions,
}

impl ProtoCompiler {
    /// Create a compiler over an extracted program.
    pub fn new(program: IrProgram, config: CompilerConfig) -> Self {
        Self {
            program,
            config,
            file_options: FileOptions::new(),
        }
    }

    /// Register a file-level option applied to every emitted file.
    pub fn register_file_option<F>(&mut self, key: impl Into<String>, value: F) -> Result<(), ConfigError>
    where
        F: Fn(&IrNamespace, &str) -> String + Send + Sync + 'static,
    {
        self.file_options.register(key, value)
    }

    /// Run the whole pipeline, producing every planned output file.
    pub fn compile(&self) -> CompileResult<Vec<OutputFile>> {
        self.validate_ir()?;
        tracing::debug!(namespaces = self.program.namespaces.len(), "validated IR");

        let packager = Packager::new(self.config.packaging.clone())
            .with_dump_mode(self.config.dump_mode);
        let assignment = packager.assign(&self.program);
        tracing::debug!(files = assignment.files().len(), "assigned packages");

        let resolver = NameResolver::new(self.config.resolve_name_collisions);
        let names = resolver.resolve(&self.program, &assignment)?;

        // A single dump file trivially has no cross-file imports, so the
        // graph resolver is skipped entirely in dump mode.
        let (assignment, graph, names) = if self.config.dump_mode {
            (assignment, ImportGraph::default(), names)
        } else {
            let resolution = GraphResolver::new(self.config.resolve_circular_dependencies)
                .resolve(&self.program, assignment)?;
            tracing::debug!(
                edges = resolution.graph.edge_count(),
                merged = resolution.merged,
                "resolved import graph"
            );
            // Merging files widens name scopes; renamings must be recomputed.
            let names = if resolution.merged {
                resolver.resolve(&self.program, &resolution.assignment)?
            } else {
                names
            };
            (resolution.assignment, resolution.graph, names)
        };

        let emitter = Emitter::new(
            self.config.syntax,
            &names,
            self.program.type_owners(),
            &assignment,
            &self.file_options,
        );
        let outputs = OutputPlanner::new(self.config.package_structured).plan(
            &self.program,
            &assignment,
            &graph,
            &emitter,
        );
        tracing::debug!(files = outputs.len(), "emitted output files");

        Ok(outputs)
    }

    /// Check the IR preconditions the compiler relies on but never repairs.
    fn validate_ir(&self) -> Result<(), InvariantViolation> {
        let owners = self.program.type_owners();

        for (_, def) in self.program.types() {
            if let TypeBody::Message { fields } = &def.body {
                let mut seen = std::collections::BTreeSet::new();
                for field in fields {
                    if !seen.insert(field.tag) {
                        return Err(InvariantViolation::DuplicateTag {
                            message: def.full_name.clone(),
                            tag: field.tag,
                        });
                    }
                }
            }

            for identity in def.referenced_identities() {
                if !owners.contains_key(identity) {
                    return Err(InvariantViolation::DanglingReference {
                        referrer: def.full_name.clone(),
                        target: identity.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
