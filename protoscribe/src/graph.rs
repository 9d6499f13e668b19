//! Import graph construction and cycle resolution.
//!
//! Import edges are derived from cross-namespace type references whose
//! endpoints land in different output files. Protocol Buffers imports cannot
//! form cycles, so the edge set must be a DAG before emission; this module
//! enforces that invariant rather than assuming it.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::CircularDependencyError;
use crate::ir::IrProgram;
use crate::packaging::{PackageAssignment, PackageTarget};

/// Directed import graph over output files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl ImportGraph {
    /// Files imported by `file`, sorted.
    pub fn imports_of(&self, file: &str) -> Vec<&str> {
        self.edges
            .get(file)
            .map(|targets| targets.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// All files in the graph, sorted.
    pub fn files(&self) -> Vec<&str> {
        self.edges.keys().map(String::as_str).collect()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }
}

/// Result of graph resolution.
#[derive(Debug, Clone)]
pub struct GraphResolution {
    /// The possibly merge-updated assignment.
    pub assignment: PackageAssignment,

    /// The final acyclic import graph.
    pub graph: ImportGraph,

    /// Whether any files were merged. A merge widens name scopes, so the
    /// caller must re-run name resolution.
    pub merged: bool,
}

/// Builds the import graph and breaks cycles when configured to.
#[derive(Debug, Clone, Copy)]
pub struct GraphResolver {
    resolve_cycles: bool,
}

impl GraphResolver {
    /// Create a resolver. When `resolve_cycles` is false any cycle fails
    /// the compilation with the ordered file cycle.
    pub fn new(resolve_cycles: bool) -> Self {
        Self { resolve_cycles }
    }

    /// Resolve the import graph for the given assignment.
    ///
    /// Cycles are broken by inlining: the edge whose source file has the
    /// fewest outgoing edges is selected (ties broken by file name) and its
    /// two endpoint files are merged into one compilation unit, until the
    /// graph is acyclic. Identical inputs always merge identically.
    pub fn resolve(
        &self,
        program: &IrProgram,
        mut assignment: PackageAssignment,
    ) -> Result<GraphResolution, CircularDependencyError> {
        let mut merged = false;

        loop {
            let edges = build_edges(program, &assignment);
            let Some(cycle) = find_cycle(&edges) else {
                return Ok(GraphResolution {
                    assignment,
                    graph: ImportGraph { edges },
                    merged,
                });
            };

            if !self.resolve_cycles {
                return Err(CircularDependencyError { cycle });
            }

            let (from, to) = select_cycle_edge(&edges, &cycle);
            let (survivor, absorbed) = if from <= to { (from, to) } else { (to, from) };
            let target = survivor_target(&assignment, &survivor);

            tracing::debug!(%absorbed, into = %survivor, "inlining file to break import cycle");
            assignment.merge_file(&absorbed, &target);
            merged = true;
        }
    }
}

/// Derive the edge set from cross-file type references. Every output file
/// is present as a node, even without edges.
fn build_edges(
    program: &IrProgram,
    assignment: &PackageAssignment,
) -> BTreeMap<String, BTreeSet<String>> {
    let owners = program.type_owners();
    let mut edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for target in assignment.files() {
        edges.entry(target.file.clone()).or_default();
    }

    for (ns, def) in program.types() {
        let Some(source) = assignment.target(&ns.name) else {
            continue;
        };
        for identity in def.referenced_identities() {
            let Some(owner) = owners.get(identity) else {
                continue;
            };
            let Some(dest) = assignment.target(owner) else {
                continue;
            };
            if dest.file != source.file {
                edges
                    .entry(source.file.clone())
                    .or_default()
                    .insert(dest.file.clone());
            }
        }
    }

    edges
}

/// Find an import cycle, if any. Returns the ordered file cycle with the
/// first file repeated at the end.
fn find_cycle(edges: &BTreeMap<String, BTreeSet<String>>) -> Option<Vec<String>> {
    let mut visited = BTreeSet::new();
    let mut path = Vec::new();

    for file in edges.keys() {
        if !visited.contains(file.as_str()) {
            if let Some(cycle) = visit(file, edges, &mut visited, &mut path) {
                return Some(cycle);
            }
        }
    }

    None
}

fn visit(
    file: &str,
    edges: &BTreeMap<String, BTreeSet<String>>,
    visited: &mut BTreeSet<String>,
    path: &mut Vec<String>,
) -> Option<Vec<String>> {
    if let Some(start) = path.iter().position(|f| f == file) {
        let mut cycle: Vec<String> = path[start..].to_vec();
        cycle.push(file.to_string());
        return Some(cycle);
    }

    if visited.contains(file) {
        return None;
    }

    path.push(file.to_string());

    if let Some(targets) = edges.get(file) {
        for target in targets {
            if let Some(cycle) = visit(target, edges, visited, path) {
                return Some(cycle);
            }
        }
    }

    path.pop();
    visited.insert(file.to_string());
    None
}

/// Select the cycle edge whose source has the fewest outgoing edges,
/// breaking ties by file name.
fn select_cycle_edge(
    edges: &BTreeMap<String, BTreeSet<String>>,
    cycle: &[String],
) -> (String, String) {
    cycle
        .windows(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .min_by_key(|(from, to)| {
            let degree = edges.get(from).map(BTreeSet::len).unwrap_or(0);
            (degree, from.clone(), to.clone())
        })
        .unwrap_or_else(|| (cycle[0].clone(), cycle[0].clone()))
}

fn survivor_target(assignment: &PackageAssignment, survivor: &str) -> PackageTarget {
    assignment
        .files()
        .into_iter()
        .find(|t| t.file == survivor)
        .cloned()
        .unwrap_or_else(|| PackageTarget {
            package: String::new(),
            file: survivor.to_string(),
        })
}
