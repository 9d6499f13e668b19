//! Program and namespace IR.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::TypeDef;

/// One extracted namespace.
///
/// Created once by the extractor and read-only to the compiler. The
/// namespace's stable identity is its fully qualified original name;
/// distinct namespaces never share it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrNamespace {
    /// Fully qualified original name, dotted.
    pub name: String,

    /// Last segment of the qualified name.
    pub short_name: String,

    /// Comment lines attached to the namespace.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,

    /// Type definitions in declaration order.
    #[serde(default)]
    pub types: Vec<TypeDef>,
}

impl IrNamespace {
    /// Create an empty namespace. The short name is the last dotted segment.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let short_name = name.rsplit('.').next().unwrap_or(&name).to_string();
        Self {
            name,
            short_name,
            comments: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Add a type definition.
    pub fn with_type(mut self, def: TypeDef) -> Self {
        self.types.push(def);
        self
    }

    /// Add a comment line.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }

    /// Dotted segments of the qualified name.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.name.split('.')
    }
}

/// Root of the IR graph: an ordered collection of namespaces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IrProgram {
    /// Namespaces in extraction order.
    pub namespaces: Vec<IrNamespace>,
}

impl IrProgram {
    /// Create an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace.
    pub fn with_namespace(mut self, namespace: IrNamespace) -> Self {
        self.namespaces.push(namespace);
        self
    }

    /// All type definitions with their owning namespace, in declaration order.
    pub fn types(&self) -> impl Iterator<Item = (&IrNamespace, &TypeDef)> {
        self.namespaces
            .iter()
            .flat_map(|ns| ns.types.iter().map(move |def| (ns, def)))
    }

    /// Map from type identity to owning namespace identity.
    pub fn type_owners(&self) -> BTreeMap<&str, &str> {
        self.types()
            .map(|(ns, def)| (def.full_name.as_str(), ns.name.as_str()))
            .collect()
    }

    /// Look up a namespace by identity.
    pub fn namespace(&self, name: &str) -> Option<&IrNamespace> {
        self.namespaces.iter().find(|ns| ns.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::{EnumValue, TypeDef};

    #[test]
    fn test_short_name_is_last_segment() {
        assert_eq!(IrNamespace::new("My.Game.Net").short_name, "Net");
        assert_eq!(IrNamespace::new("Flat").short_name, "Flat");
    }

    #[test]
    fn test_type_owners() {
        let program = IrProgram::new()
            .with_namespace(
                IrNamespace::new("A").with_type(TypeDef::enumeration(
                    "Zone",
                    "A.Zone",
                    vec![EnumValue::new("NONE", 0)],
                )),
            )
            .with_namespace(
                IrNamespace::new("B").with_type(TypeDef::enumeration(
                    "Zone",
                    "B.Zone",
                    vec![EnumValue::new("NONE", 0)],
                )),
            );

        let owners = program.type_owners();
        assert_eq!(owners.get("A.Zone"), Some(&"A"));
        assert_eq!(owners.get("B.Zone"), Some(&"B"));
        assert_eq!(owners.get("C.Zone"), None);
    }

    #[test]
    fn test_types_preserve_declaration_order() {
        let program = IrProgram::new().with_namespace(
            IrNamespace::new("A")
                .with_type(TypeDef::enumeration("First", "A.First", vec![]))
                .with_type(TypeDef::enumeration("Second", "A.Second", vec![])),
        );

        let names: Vec<_> = program.types().map(|(_, def)| def.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }
}
