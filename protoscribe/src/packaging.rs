//! Packaging: assignment of namespaces to output packages and files.
//!
//! The assignment is derived state, rebuilt on every compile run; the IR is
//! never touched. Three mutually exclusive policies are supported, and dump
//! mode overrides all of them.

use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::ir::IrProgram;

/// Name of the single output file produced in dump mode.
pub const DUMP_FILE_NAME: &str = "dump.proto";

/// Policy selecting how namespaces are grouped into packages.
#[derive(Debug, Clone, Default)]
pub enum PackagingPolicy {
    /// One package per namespace, mirroring the original qualified name.
    #[default]
    Identity,

    /// Externally supplied mapping; unmapped namespaces fall back to
    /// Identity.
    Manual(ManualPackaging),

    /// Namespaces sharing their first `min_depth` dotted segments are
    /// grouped into a package named by that shared prefix. Namespaces with
    /// fewer segments, or with no partner sharing the prefix, keep Identity.
    Automatic { min_depth: usize },
}

/// Validated manual packaging table (namespace identity → package path).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualPackaging {
    map: BTreeMap<String, String>,
}

impl ManualPackaging {
    /// Build the table from raw entries, rejecting any namespace that
    /// appears twice. The ambiguity is reported before any emission starts.
    pub fn from_entries<I>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut map: BTreeMap<String, String> = BTreeMap::new();
        for (namespace, package) in entries {
            let package = package.replace('/', ".");
            if let Some(first) = map.get(&namespace) {
                return Err(ConfigError::AmbiguousManualEntry {
                    namespace,
                    first: first.clone(),
                    second: package,
                });
            }
            map.insert(namespace, package);
        }
        Ok(Self { map })
    }

    /// Package assigned to a namespace, if present.
    pub fn get(&self, namespace: &str) -> Option<&str> {
        self.map.get(namespace).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Output location of one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageTarget {
    /// Dotted package path; empty for the dump file.
    pub package: String,

    /// Output file identifier.
    pub file: String,
}

impl PackageTarget {
    fn for_package(package: String) -> Self {
        let file = format!("{package}.proto");
        Self { package, file }
    }
}

/// Mapping from namespace identity to an output package and file.
///
/// Derived, rebuilt each compile run; consumed by the dependency graph
/// resolver and the output planner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageAssignment {
    targets: BTreeMap<String, PackageTarget>,
}

impl PackageAssignment {
    /// Target of one namespace.
    pub fn target(&self, namespace: &str) -> Option<&PackageTarget> {
        self.targets.get(namespace)
    }

    /// Distinct output files, sorted.
    pub fn files(&self) -> Vec<&PackageTarget> {
        let mut seen = BTreeMap::new();
        for target in self.targets.values() {
            seen.entry(target.file.as_str()).or_insert(target);
        }
        seen.into_values().collect()
    }

    /// Iterate (namespace, target) pairs in namespace order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PackageTarget)> {
        self.targets.iter().map(|(ns, t)| (ns.as_str(), t))
    }

    /// Move every namespace assigned to `from_file` into `to`.
    ///
    /// Used by the dependency graph resolver when it inlines one file into
    /// another to break an import cycle.
    pub fn merge_file(&mut self, from_file: &str, to: &PackageTarget) {
        for target in self.targets.values_mut() {
            if target.file == from_file {
                *target = to.clone();
            }
        }
    }

    fn insert(&mut self, namespace: String, target: PackageTarget) {
        self.targets.insert(namespace, target);
    }
}

/// Assigns every namespace of a program to an output package and file.
#[derive(Debug, Clone, Default)]
pub struct Packager {
    policy: PackagingPolicy,
    dump_mode: bool,
}

impl Packager {
    /// Create a packager with the given policy.
    pub fn new(policy: PackagingPolicy) -> Self {
        Self {
            policy,
            dump_mode: false,
        }
    }

    /// Override every policy with the single dump file.
    pub fn with_dump_mode(mut self, dump_mode: bool) -> Self {
        self.dump_mode = dump_mode;
        self
    }

    /// Produce the assignment for every namespace of the program.
    pub fn assign(&self, program: &IrProgram) -> PackageAssignment {
        let mut assignment = PackageAssignment::default();

        if self.dump_mode {
            let target = PackageTarget {
                package: String::new(),
                file: DUMP_FILE_NAME.to_string(),
            };
            for ns in &program.namespaces {
                assignment.insert(ns.name.clone(), target.clone());
            }
            return assignment;
        }

        match &self.policy {
            PackagingPolicy::Identity => {
                for ns in &program.namespaces {
                    assignment.insert(ns.name.clone(), PackageTarget::for_package(ns.name.clone()));
                }
            }
            PackagingPolicy::Manual(manual) => {
                for ns in &program.namespaces {
                    let package = manual
                        .get(&ns.name)
                        .map(str::to_string)
                        .unwrap_or_else(|| ns.name.clone());
                    assignment.insert(ns.name.clone(), PackageTarget::for_package(package));
                }
            }
            PackagingPolicy::Automatic { min_depth } => {
                let min_depth = (*min_depth).max(1);
                let mut groups: BTreeMap<String, Vec<&str>> = BTreeMap::new();
                for ns in &program.namespaces {
                    let segments: Vec<&str> = ns.segments().collect();
                    if segments.len() >= min_depth {
                        groups
                            .entry(segments[..min_depth].join("."))
                            .or_default()
                            .push(&ns.name);
                    }
                }
                let grouped: BTreeMap<&str, &str> = groups
                    .iter()
                    .filter(|(_, members)| members.len() >= 2)
                    .flat_map(|(prefix, members)| {
                        members.iter().map(move |ns| (*ns, prefix.as_str()))
                    })
                    .collect();

                for ns in &program.namespaces {
                    let package = grouped
                        .get(ns.name.as_str())
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| ns.name.clone());
                    assignment.insert(ns.name.clone(), PackageTarget::for_package(package));
                }
            }
        }

        assignment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::IrNamespace;

    fn program(names: &[&str]) -> IrProgram {
        names
            .iter()
            .fold(IrProgram::new(), |p, n| p.with_namespace(IrNamespace::new(*n)))
    }

    #[test]
    fn test_identity_policy_mirrors_namespace_names() {
        let assignment = Packager::new(PackagingPolicy::Identity).assign(&program(&["A.Foo", "B"]));

        let target = assignment.target("A.Foo").unwrap();
        assert_eq!(target.package, "A.Foo");
        assert_eq!(target.file, "A.Foo.proto");
        assert_eq!(assignment.target("B").unwrap().file, "B.proto");
    }

    #[test]
    fn test_manual_policy_with_identity_fallback() {
        let manual = ManualPackaging::from_entries(vec![
            ("A".to_string(), "shared".to_string()),
            ("B".to_string(), "shared".to_string()),
        ])
        .unwrap();
        let assignment =
            Packager::new(PackagingPolicy::Manual(manual)).assign(&program(&["A", "B", "C"]));

        assert_eq!(assignment.target("A").unwrap().file, "shared.proto");
        assert_eq!(assignment.target("B").unwrap().file, "shared.proto");
        assert_eq!(assignment.target("C").unwrap().file, "C.proto");
    }

    #[test]
    fn test_manual_duplicate_namespace_is_ambiguous() {
        let err = ManualPackaging::from_entries(vec![
            ("A".to_string(), "x".to_string()),
            ("A".to_string(), "y".to_string()),
        ])
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::AmbiguousManualEntry { namespace, .. } if namespace == "A"
        ));
    }

    #[test]
    fn test_manual_normalizes_slash_delimited_paths() {
        let manual =
            ManualPackaging::from_entries(vec![("A".to_string(), "my/game".to_string())]).unwrap();
        assert_eq!(manual.get("A"), Some("my.game"));
    }

    #[test]
    fn test_automatic_groups_on_shared_prefix() {
        let assignment = Packager::new(PackagingPolicy::Automatic { min_depth: 2 })
            .assign(&program(&["My.Game.Net", "My.Game.Util", "My.Tool", "Other.X"]));

        assert_eq!(assignment.target("My.Game.Net").unwrap().package, "My.Game");
        assert_eq!(assignment.target("My.Game.Util").unwrap().package, "My.Game");
        // No partner shares the first two segments.
        assert_eq!(assignment.target("My.Tool").unwrap().package, "My.Tool");
        assert_eq!(assignment.target("Other.X").unwrap().package, "Other.X");
    }

    #[test]
    fn test_automatic_keeps_distinct_top_segments_apart() {
        let assignment = Packager::new(PackagingPolicy::Automatic { min_depth: 2 })
            .assign(&program(&["A.Foo", "B.Foo"]));

        assert_eq!(assignment.target("A.Foo").unwrap().package, "A.Foo");
        assert_eq!(assignment.target("B.Foo").unwrap().package, "B.Foo");
        assert_eq!(assignment.files().len(), 2);
    }

    #[test]
    fn test_dump_mode_overrides_policy() {
        let assignment = Packager::new(PackagingPolicy::Identity)
            .with_dump_mode(true)
            .assign(&program(&["A", "B", "C"]));

        for ns in ["A", "B", "C"] {
            let target = assignment.target(ns).unwrap();
            assert_eq!(target.file, DUMP_FILE_NAME);
            assert_eq!(target.package, "");
        }
        assert_eq!(assignment.files().len(), 1);
    }

    #[test]
    fn test_merge_file_reassigns_namespaces() {
        let mut assignment =
            Packager::new(PackagingPolicy::Identity).assign(&program(&["A", "B"]));
        let to = assignment.target("A").unwrap().clone();

        assignment.merge_file("B.proto", &to);

        assert_eq!(assignment.target("B").unwrap().file, "A.proto");
        assert_eq!(assignment.files().len(), 1);
    }
}
