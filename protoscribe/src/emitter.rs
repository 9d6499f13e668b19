//! Rendering of IR entities into Protocol Buffers IDL text.
//!
//! One emitter handles both dialects, parameterized by an explicit
//! [`Syntax`] value; the dialects differ only in a small set of rendering
//! rules (header line, field labels, default values). Tag numbers are
//! emitted exactly as the IR gives them - the emitter never renumbers.

use std::collections::BTreeMap;

use crate::ir::{EnumValue, Field, FieldLabel, FieldType, IrNamespace, RpcMethod, TypeBody, TypeDef};
use crate::options::FileOptions;
use crate::packaging::PackageAssignment;
use crate::resolver::NameTable;

const INDENT: &str = "  ";

/// Output dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Syntax {
    /// proto2: no syntax header, explicit field labels, default values.
    #[default]
    Proto2,

    /// proto3: syntax header, singular fields carry no label, no custom
    /// defaults.
    Proto3,
}

impl Syntax {
    /// The header line, when the dialect requires one.
    pub fn header(&self) -> Option<&'static str> {
        match self {
            Syntax::Proto2 => None,
            Syntax::Proto3 => Some("syntax = \"proto3\";"),
        }
    }
}

/// Everything needed to render one output file.
#[derive(Debug)]
pub struct FileUnit<'a> {
    /// Output file identifier, passed to file option functions.
    pub file: &'a str,

    /// Dotted package path; empty packages emit no declaration.
    pub package: &'a str,

    /// Namespaces merged into this file, in IR declaration order.
    pub namespaces: Vec<&'a IrNamespace>,

    /// Finalized import paths, sorted lexicographically.
    pub imports: Vec<String>,
}

/// Renders file units into proto2 or proto3 text.
pub struct Emitter<'a> {
    syntax: Syntax,
    names: &'a NameTable,
    owners: BTreeMap<&'a str, &'a str>,
    assignment: &'a PackageAssignment,
    options: &'a FileOptions,
}

impl<'a> Emitter<'a> {
    /// Create an emitter over resolved names and the final assignment.
    pub fn new(
        syntax: Syntax,
        names: &'a NameTable,
        owners: BTreeMap<&'a str, &'a str>,
        assignment: &'a PackageAssignment,
        options: &'a FileOptions,
    ) -> Self {
        Self {
            syntax,
            names,
            owners,
            assignment,
            options,
        }
    }

    /// Render one output file.
    ///
    /// Emission order: syntax header, package declaration, file options
    /// (sorted by key), imports (sorted), then type definitions in IR
    /// declaration order.
    pub fn emit_file(&self, unit: &FileUnit<'_>) -> String {
        let mut blocks: Vec<String> = Vec::new();

        if let Some(header) = self.syntax.header() {
            blocks.push(header.to_string());
        }

        if !unit.package.is_empty() {
            blocks.push(format!("package {};", unit.package));
        }

        if let Some(first_ns) = unit.namespaces.first() {
            let options = self.options.render(first_ns, unit.file);
            if !options.is_empty() {
                blocks.push(options.join("\n"));
            }
        }

        if !unit.imports.is_empty() {
            let imports: Vec<String> = unit
                .imports
                .iter()
                .map(|path| format!("import \"{path}\";"))
                .collect();
            blocks.push(imports.join("\n"));
        }

        for ns in &unit.namespaces {
            if !ns.comments.is_empty() {
                blocks.push(comment_lines(&ns.comments, 0).join("\n"));
            }
            for def in &ns.types {
                blocks.push(self.emit_type(def, unit.file));
            }
        }

        let mut text = blocks.join("\n\n");
        text.push('\n');
        text
    }

    fn emit_type(&self, def: &TypeDef, file: &str) -> String {
        let name = self.emitted_name(&def.full_name);
        let mut lines = comment_lines(&def.comments, 0);

        match &def.body {
            TypeBody::Message { fields } => {
                if fields.is_empty() {
                    lines.push(format!("message {name} {{}}"));
                } else {
                    lines.push(format!("message {name} {{"));
                    for field in fields {
                        lines.extend(comment_lines(&field.comments, 1));
                        lines.push(format!("{INDENT}{}", self.field_declaration(field, file)));
                    }
                    lines.push("}".to_string());
                }
            }
            TypeBody::Enum { values } => {
                if values.is_empty() {
                    lines.push(format!("enum {name} {{}}"));
                } else {
                    lines.push(format!("enum {name} {{"));
                    // Aliased values are legal only with allow_alias set.
                    if has_aliased_values(values) {
                        lines.push(format!("{INDENT}option allow_alias = true;"));
                    }
                    for value in values {
                        lines.extend(comment_lines(&value.comments, 1));
                        lines.push(format!("{INDENT}{}", value_declaration(value)));
                    }
                    lines.push("}".to_string());
                }
            }
            TypeBody::Service { methods } => {
                if methods.is_empty() {
                    lines.push(format!("service {name} {{}}"));
                } else {
                    lines.push(format!("service {name} {{"));
                    for method in methods {
                        lines.extend(comment_lines(&method.comments, 1));
                        lines.push(format!("{INDENT}{}", self.rpc_declaration(method, file)));
                    }
                    lines.push("}".to_string());
                }
            }
        }

        lines.join("\n")
    }

    fn field_declaration(&self, field: &Field, file: &str) -> String {
        let ty = self.render_type(&field.ty, file);

        // Maps carry no label in either dialect.
        let label = if matches!(field.ty, FieldType::Map { .. }) {
            None
        } else {
            match (self.syntax, field.label) {
                (Syntax::Proto2, FieldLabel::Required) => Some("required "),
                (Syntax::Proto2, FieldLabel::Optional) => Some("optional "),
                (_, FieldLabel::Repeated) => Some("repeated "),
                // proto3 degrades required/optional to singular fields.
                (Syntax::Proto3, _) => None,
            }
        };

        let default = match (&field.default, self.syntax) {
            (Some(value), Syntax::Proto2) => format!(" [default = {value}]"),
            _ => String::new(),
        };

        format!(
            "{}{} {} = {}{};",
            label.unwrap_or(""),
            ty,
            field.name,
            field.tag,
            default
        )
    }

    fn rpc_declaration(&self, method: &RpcMethod, file: &str) -> String {
        let input = self.render_reference(&method.input, file);
        let output = self.render_reference(&method.output, file);
        let input = if method.client_streaming {
            format!("stream {input}")
        } else {
            input
        };
        let output = if method.server_streaming {
            format!("stream {output}")
        } else {
            output
        };
        format!("rpc {} ({}) returns ({});", method.name, input, output)
    }

    fn render_type(&self, ty: &FieldType, file: &str) -> String {
        match ty {
            FieldType::Scalar(scalar) => scalar.keyword().to_string(),
            FieldType::Reference(identity) => self.render_reference(identity, file),
            FieldType::Map { key, value } => format!(
                "map<{}, {}>",
                key.keyword(),
                self.render_type(value, file)
            ),
        }
    }

    /// Resolve a type identity to its emitted spelling: the bare emitted
    /// name within the same file, the fully qualified emitted name across
    /// files.
    fn render_reference(&self, identity: &str, file: &str) -> String {
        let name = self.emitted_name(identity);
        let target = self
            .owners
            .get(identity)
            .and_then(|owner| self.assignment.target(owner));
        match target {
            Some(target) if target.file != file && !target.package.is_empty() => {
                format!(".{}.{}", target.package, name)
            }
            _ => name,
        }
    }

    fn emitted_name(&self, identity: &str) -> String {
        self.names
            .emitted_name(identity)
            .unwrap_or_else(|| identity.rsplit('.').next().unwrap_or(identity))
            .to_string()
    }
}

fn value_declaration(value: &EnumValue) -> String {
    format!("{} = {};", value.name, value.number)
}

fn has_aliased_values(values: &[EnumValue]) -> bool {
    let mut seen = std::collections::BTreeSet::new();
    values.iter().any(|v| !seen.insert(v.number))
}

/// Comment lines written verbatim, `// `-prefixed and indented to the
/// nesting depth of the construct they precede.
fn comment_lines(comments: &[String], depth: usize) -> Vec<String> {
    let indent = INDENT.repeat(depth);
    comments
        .iter()
        .map(|line| format!("{indent}// {line}"))
        .collect()
}
