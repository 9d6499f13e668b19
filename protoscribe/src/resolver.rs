//! Name collision detection and disambiguation.
//!
//! Collision scopes are output files, not namespaces: packaging may merge
//! several namespaces into one file, and two types that were distinct in the
//! IR may then claim the same local name. The resolver produces the
//! identity → emitted-name table consulted by every later stage.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::NameCollisionError;
use crate::ir::{IrProgram, TypeDef};
use crate::packaging::PackageAssignment;

/// One-directional mapping from type identity to emitted name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    names: BTreeMap<String, String>,
}

impl NameTable {
    /// The name a type identity is emitted under.
    pub fn emitted_name(&self, identity: &str) -> Option<&str> {
        self.names.get(identity).map(String::as_str)
    }

    /// Number of mapped identities.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn insert(&mut self, identity: String, name: String) {
        self.names.insert(identity, name);
    }
}

/// Detects and, when enabled, disambiguates name collisions per output file.
#[derive(Debug, Clone, Copy)]
pub struct NameResolver {
    resolve_collisions: bool,
}

impl NameResolver {
    /// Create a resolver. When `resolve_collisions` is false any collision
    /// fails the compilation.
    pub fn new(resolve_collisions: bool) -> Self {
        Self { resolve_collisions }
    }

    /// Compute the emitted name of every type definition.
    ///
    /// Reruns over the same IR and assignment produce identical renamings:
    /// groups are visited in name order and claimants in order of their
    /// fully qualified original name.
    pub fn resolve(
        &self,
        program: &IrProgram,
        assignment: &PackageAssignment,
    ) -> Result<NameTable, NameCollisionError> {
        let mut table = NameTable::default();

        for (file, defs) in scopes(program, assignment) {
            let mut by_name: BTreeMap<&str, Vec<&ScopedDef<'_>>> = BTreeMap::new();
            for def in &defs {
                by_name.entry(def.def.name.as_str()).or_default().push(def);
            }

            // Names kept as-is never move; seed the used set with them so a
            // disambiguated name cannot shadow one.
            let mut used: BTreeSet<String> = by_name
                .iter()
                .filter(|(_, claimants)| claimants.len() == 1)
                .map(|(name, _)| name.to_string())
                .collect();

            for (name, claimants) in &by_name {
                if claimants.len() == 1 {
                    let def = claimants[0];
                    table.insert(def.def.full_name.clone(), def.def.name.clone());
                    continue;
                }

                if !self.resolve_collisions {
                    return Err(NameCollisionError {
                        name: name.to_string(),
                        scope: file.to_string(),
                        first: claimants[0].def.full_name.clone(),
                        second: claimants[1].def.full_name.clone(),
                    });
                }

                for def in claimants {
                    let base = format!("{}_{}", def.def.name, def.namespace_short);
                    let mut candidate = base.clone();
                    let mut n = 2;
                    while used.contains(&candidate) {
                        candidate = format!("{base}_{n}");
                        n += 1;
                    }
                    tracing::debug!(
                        identity = %def.def.full_name,
                        scope = %file,
                        emitted = %candidate,
                        "resolved name collision"
                    );
                    used.insert(candidate.clone());
                    table.insert(def.def.full_name.clone(), candidate);
                }
            }
        }

        Ok(table)
    }
}

struct ScopedDef<'a> {
    def: &'a TypeDef,
    namespace_short: &'a str,
}

/// Group type definitions by output file, claimants ordered by their fully
/// qualified original name.
fn scopes<'a>(
    program: &'a IrProgram,
    assignment: &'a PackageAssignment,
) -> BTreeMap<&'a str, Vec<ScopedDef<'a>>> {
    let mut scopes: BTreeMap<&str, Vec<ScopedDef<'_>>> = BTreeMap::new();
    for (ns, def) in program.types() {
        if let Some(target) = assignment.target(&ns.name) {
            scopes.entry(target.file.as_str()).or_default().push(ScopedDef {
                def,
                namespace_short: &ns.short_name,
            });
        }
    }
    for defs in scopes.values_mut() {
        defs.sort_by(|a, b| a.def.full_name.cmp(&b.def.full_name));
    }
    scopes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{EnumValue, IrNamespace, TypeDef};
    use crate::packaging::{ManualPackaging, Packager, PackagingPolicy};

    fn enum_def(name: &str, full: &str) -> TypeDef {
        TypeDef::enumeration(name, full, vec![EnumValue::new("NONE", 0)])
    }

    fn two_namespace_program() -> IrProgram {
        IrProgram::new()
            .with_namespace(IrNamespace::new("A").with_type(enum_def("Bar", "A.Bar")))
            .with_namespace(IrNamespace::new("B").with_type(enum_def("Bar", "B.Bar")))
    }

    fn shared_assignment(program: &IrProgram) -> PackageAssignment {
        let manual = ManualPackaging::from_entries(vec![
            ("A".to_string(), "shared".to_string()),
            ("B".to_string(), "shared".to_string()),
        ])
        .unwrap();
        Packager::new(PackagingPolicy::Manual(manual)).assign(program)
    }

    #[test]
    fn test_no_collision_keeps_names() {
        let program = two_namespace_program();
        let assignment = Packager::new(PackagingPolicy::Identity).assign(&program);

        let table = NameResolver::new(false).resolve(&program, &assignment).unwrap();
        assert_eq!(table.emitted_name("A.Bar"), Some("Bar"));
        assert_eq!(table.emitted_name("B.Bar"), Some("Bar"));
    }

    #[test]
    fn test_collision_fails_when_resolution_disabled() {
        let program = two_namespace_program();
        let assignment = shared_assignment(&program);

        let err = NameResolver::new(false).resolve(&program, &assignment).unwrap_err();
        assert_eq!(err.name, "Bar");
        assert_eq!(err.scope, "shared.proto");
        assert_eq!(err.first, "A.Bar");
        assert_eq!(err.second, "B.Bar");
    }

    #[test]
    fn test_collision_renames_with_namespace_suffix() {
        let program = two_namespace_program();
        let assignment = shared_assignment(&program);

        let table = NameResolver::new(true).resolve(&program, &assignment).unwrap();
        assert_eq!(table.emitted_name("A.Bar"), Some("Bar_A"));
        assert_eq!(table.emitted_name("B.Bar"), Some("Bar_B"));
    }

    #[test]
    fn test_matching_suffixes_fall_back_to_numbers() {
        // Both namespaces end in the same segment, so the short-name suffix
        // cannot tell them apart.
        let program = IrProgram::new()
            .with_namespace(IrNamespace::new("X.Core").with_type(enum_def("Bar", "X.Core.Bar")))
            .with_namespace(IrNamespace::new("Y.Core").with_type(enum_def("Bar", "Y.Core.Bar")));
        let manual = ManualPackaging::from_entries(vec![
            ("X.Core".to_string(), "shared".to_string()),
            ("Y.Core".to_string(), "shared".to_string()),
        ])
        .unwrap();
        let assignment = Packager::new(PackagingPolicy::Manual(manual)).assign(&program);

        let table = NameResolver::new(true).resolve(&program, &assignment).unwrap();
        assert_eq!(table.emitted_name("X.Core.Bar"), Some("Bar_Core"));
        assert_eq!(table.emitted_name("Y.Core.Bar"), Some("Bar_Core_2"));
    }

    #[test]
    fn test_rename_avoids_existing_names() {
        // A type already named Bar_A sits in the scope the rename would pick.
        let program = IrProgram::new()
            .with_namespace(
                IrNamespace::new("A")
                    .with_type(enum_def("Bar", "A.Bar"))
                    .with_type(enum_def("Bar_A", "A.Bar_A")),
            )
            .with_namespace(IrNamespace::new("B").with_type(enum_def("Bar", "B.Bar")));
        let manual = ManualPackaging::from_entries(vec![
            ("A".to_string(), "shared".to_string()),
            ("B".to_string(), "shared".to_string()),
        ])
        .unwrap();
        let assignment = Packager::new(PackagingPolicy::Manual(manual)).assign(&program);

        let table = NameResolver::new(true).resolve(&program, &assignment).unwrap();
        assert_eq!(table.emitted_name("A.Bar_A"), Some("Bar_A"));
        assert_eq!(table.emitted_name("A.Bar"), Some("Bar_A_2"));
        assert_eq!(table.emitted_name("B.Bar"), Some("Bar_B"));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let program = two_namespace_program();
        let assignment = shared_assignment(&program);
        let resolver = NameResolver::new(true);

        let first = resolver.resolve(&program, &assignment).unwrap();
        let second = resolver.resolve(&program, &assignment).unwrap();
        assert_eq!(first, second);
    }
}
