//! Type definition IR.
//!
//! A [`TypeDef`] is one message, enum or service extracted from the input
//! binary. Its identity is its fully qualified original name; cross-type
//! references carry that identity and are resolved to emitted names only at
//! render time.

use serde::{Deserialize, Serialize};

/// Scalar wire types of the Protocol Buffers language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    /// The proto keyword for this scalar.
    pub fn keyword(&self) -> &'static str {
        match self {
            ScalarType::Double => "double",
            ScalarType::Float => "float",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Uint32 => "uint32",
            ScalarType::Uint64 => "uint64",
            ScalarType::Sint32 => "sint32",
            ScalarType::Sint64 => "sint64",
            ScalarType::Fixed32 => "fixed32",
            ScalarType::Fixed64 => "fixed64",
            ScalarType::Sfixed32 => "sfixed32",
            ScalarType::Sfixed64 => "sfixed64",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
        }
    }
}

/// Declared semantic type of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum FieldType {
    /// A built-in scalar.
    Scalar(ScalarType),

    /// Reference to another type definition by identity.
    Reference(String),

    /// A proto map. Keys are restricted to scalars by the proto language.
    Map {
        key: ScalarType,
        value: Box<FieldType>,
    },
}

impl FieldType {
    /// Create a reference to another type definition.
    pub fn reference(identity: impl Into<String>) -> Self {
        FieldType::Reference(identity.into())
    }

    /// The identity this type refers to, if any. Maps refer through their
    /// value type.
    pub fn referenced_identity(&self) -> Option<&str> {
        match self {
            FieldType::Scalar(_) => None,
            FieldType::Reference(identity) => Some(identity),
            FieldType::Map { value, .. } => value.referenced_identity(),
        }
    }
}

/// Occurrence rule of a field.
///
/// Meaningful as written only under proto2; proto3 collapses required and
/// optional into plain singular fields at emission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldLabel {
    Required,
    Optional,
    Repeated,
}

/// A single message field.
///
/// Tag uniqueness within the owning message is an IR precondition; the
/// compiler verifies it and never renumbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name as extracted.
    pub name: String,

    /// Wire tag number, emitted exactly as given.
    pub tag: u32,

    /// Occurrence rule.
    pub label: FieldLabel,

    /// Declared semantic type.
    pub ty: FieldType,

    /// Textual default value, rendered verbatim under proto2 (string
    /// defaults must already carry their quotes); proto3 ignores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Comment lines preceding the field declaration.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, tag: u32, label: FieldLabel, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            tag,
            label,
            ty,
            default: None,
            comments: Vec::new(),
        }
    }

    /// Set the proto2 default value.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Add a preceding comment line.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }
}

/// A single enum value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    /// Value name as extracted.
    pub name: String,

    /// Numeric value, emitted exactly as given.
    pub number: i32,

    /// Comment lines preceding the value.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl EnumValue {
    /// Create a new enum value.
    pub fn new(name: impl Into<String>, number: i32) -> Self {
        Self {
            name: name.into(),
            number,
            comments: Vec::new(),
        }
    }

    /// Add a preceding comment line.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }
}

/// A single service method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcMethod {
    /// Method name as extracted.
    pub name: String,

    /// Identity of the input message type.
    pub input: String,

    /// Identity of the output message type.
    pub output: String,

    /// Whether the client streams its input.
    #[serde(default)]
    pub client_streaming: bool,

    /// Whether the server streams its output.
    #[serde(default)]
    pub server_streaming: bool,

    /// Comment lines preceding the method.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl RpcMethod {
    /// Create a new unary method.
    pub fn new(name: impl Into<String>, input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            output: output.into(),
            client_streaming: false,
            server_streaming: false,
            comments: Vec::new(),
        }
    }

    /// Mark the input as streamed.
    pub fn with_client_streaming(mut self, streaming: bool) -> Self {
        self.client_streaming = streaming;
        self
    }

    /// Mark the output as streamed.
    pub fn with_server_streaming(mut self, streaming: bool) -> Self {
        self.server_streaming = streaming;
        self
    }

    /// Add a preceding comment line.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }
}

/// One extracted type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    /// Local name within the owning namespace.
    pub name: String,

    /// Fully qualified original name. Stable identity used for
    /// cross-referencing; never changed by the compiler.
    pub full_name: String,

    /// Comment lines preceding the definition.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,

    /// The definition body.
    pub body: TypeBody,
}

/// Body of a type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TypeBody {
    /// Message with fields in declaration order.
    Message { fields: Vec<Field> },

    /// Enum with values in declaration order.
    Enum { values: Vec<EnumValue> },

    /// Service with methods in declaration order.
    Service { methods: Vec<RpcMethod> },
}

impl TypeDef {
    /// Create a message definition.
    pub fn message(
        name: impl Into<String>,
        full_name: impl Into<String>,
        fields: Vec<Field>,
    ) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            comments: Vec::new(),
            body: TypeBody::Message { fields },
        }
    }

    /// Create an enum definition.
    pub fn enumeration(
        name: impl Into<String>,
        full_name: impl Into<String>,
        values: Vec<EnumValue>,
    ) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            comments: Vec::new(),
            body: TypeBody::Enum { values },
        }
    }

    /// Create a service definition.
    pub fn service(
        name: impl Into<String>,
        full_name: impl Into<String>,
        methods: Vec<RpcMethod>,
    ) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            comments: Vec::new(),
            body: TypeBody::Service { methods },
        }
    }

    /// Add a preceding comment line.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }

    /// Identities of every type definition this one refers to, in
    /// declaration order. Duplicates are preserved.
    pub fn referenced_identities(&self) -> Vec<&str> {
        match &self.body {
            TypeBody::Message { fields } => fields
                .iter()
                .filter_map(|f| f.ty.referenced_identity())
                .collect(),
            TypeBody::Enum { .. } => Vec::new(),
            TypeBody::Service { methods } => methods
                .iter()
                .flat_map(|m| [m.input.as_str(), m.output.as_str()])
                .collect(),
        }
    }
}
