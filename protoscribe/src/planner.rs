//! Output planning: final file paths and per-file emission.
//!
//! The planner walks the finalized assignment, decides each file's relative
//! path, and drives the emitter once per file. No path is produced twice,
//! and directory structure is implied by the path segments when package
//! structuring is on.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::emitter::{Emitter, FileUnit};
use crate::graph::ImportGraph;
use crate::ir::{IrNamespace, IrProgram};
use crate::packaging::{PackageAssignment, PackageTarget};

/// A finalized output file: relative path plus rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// Path relative to the output root.
    pub path: PathBuf,

    /// Complete proto text.
    pub content: String,
}

/// Plans file paths and collects emitted text.
#[derive(Debug, Clone, Copy)]
pub struct OutputPlanner {
    package_structured: bool,
}

impl OutputPlanner {
    /// Create a planner. With `package_structured` the package path becomes
    /// a directory hierarchy; without it every file lands flat in the
    /// output root under its dotted name.
    pub fn new(package_structured: bool) -> Self {
        Self { package_structured }
    }

    /// Emit every planned file, sorted by path.
    pub fn plan(
        &self,
        program: &IrProgram,
        assignment: &PackageAssignment,
        graph: &ImportGraph,
        emitter: &Emitter<'_>,
    ) -> Vec<OutputFile> {
        let targets: BTreeMap<&str, &PackageTarget> = assignment
            .files()
            .into_iter()
            .map(|t| (t.file.as_str(), t))
            .collect();

        // Namespaces grouped per file, preserving IR declaration order.
        let mut by_file: BTreeMap<&str, Vec<&IrNamespace>> = BTreeMap::new();
        for ns in &program.namespaces {
            if let Some(target) = assignment.target(&ns.name) {
                by_file.entry(target.file.as_str()).or_default().push(ns);
            }
        }

        let mut outputs = Vec::new();
        for (file, namespaces) in by_file {
            let Some(target) = targets.get(file) else {
                continue;
            };

            let mut imports: Vec<String> = graph
                .imports_of(file)
                .into_iter()
                .filter_map(|imported| targets.get(imported).map(|t| self.file_path_str(t)))
                .collect();
            imports.sort();

            let unit = FileUnit {
                file,
                package: target.package.as_str(),
                namespaces,
                imports,
            };

            outputs.push(OutputFile {
                path: PathBuf::from(self.file_path_str(target)),
                content: emitter.emit_file(&unit),
            });
        }

        outputs
    }

    /// Relative path of one output file, slash-separated.
    fn file_path_str(&self, target: &PackageTarget) -> String {
        if !self.package_structured || target.package.is_empty() {
            target.file.clone()
        } else {
            format!("{}.proto", target.package.replace('.', "/"))
        }
    }
}
