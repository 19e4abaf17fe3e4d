//! Resolved types as reported by the semantic oracle.
//!
//! A [`ResolvedType`] is the oracle's view of a type: its display name, the
//! package that defines it (for defined types only), its structural shape and
//! its resolved method set. The analysis layer never inspects type syntax; it
//! only ever classifies these handles.

use serde::{Deserialize, Serialize};

use super::{ChanDir, PackageRef};

/// Basic type names the generator can synthesize values for.
pub const PRIMITIVE_TYPE_NAMES: &[&str] = &[
    "bool",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
    "float32",
    "float64",
    "complex64",
    "complex128",
    "string",
    "byte",
    "rune",
];

pub fn is_primitive_name(name: &str) -> bool {
    PRIMITIVE_TYPE_NAMES.contains(&name)
}

/// Map an untyped constant kind onto the type it defaults to.
///
/// Typed names come back unchanged.
pub fn default_type_name(name: &str) -> &str {
    match name {
        "untyped int" => "int",
        "untyped float" => "float64",
        "untyped rune" => "rune",
        "untyped string" => "string",
        "untyped bool" => "bool",
        "untyped complex" => "complex128",
        other => other,
    }
}

/// Oracle handle for one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedType {
    /// Stable display name, e.g. `int`, `[]string`, `geometry.Point`.
    pub name: String,
    /// Defining package of a declared type; `None` for predeclared and
    /// type-literal types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<PackageRef>,
    pub shape: TypeShape,
    /// Resolved method set (including promoted methods).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeShape {
    Basic {
        underlying: String,
    },
    Array {
        element: Box<ResolvedType>,
        length: u64,
    },
    Slice {
        element: Box<ResolvedType>,
    },
    Map {
        key: Box<ResolvedType>,
        element: Box<ResolvedType>,
    },
    Chan {
        element: Box<ResolvedType>,
        direction: ChanDir,
    },
    Pointer {
        element: Box<ResolvedType>,
    },
    Struct {
        fields: Vec<ResolvedField>,
    },
    Interface {
        #[serde(default)]
        implementers: Vec<String>,
    },
    Func,
    TypeParam,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ResolvedType,
    pub exported: bool,
}

/// One entry of a method set, with parameter and result types by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub results: Vec<String>,
}

impl MethodSignature {
    /// `Error() string`
    pub fn is_error_method(&self) -> bool {
        self.name == "Error" && self.params.is_empty() && self.results == ["string"]
    }
}

impl ResolvedType {
    /// Predeclared basic type such as `int` or `string`.
    pub fn basic(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            shape: TypeShape::Basic {
                underlying: name.clone(),
            },
            name,
            origin: None,
            methods: Vec::new(),
        }
    }

    /// The predeclared `error` interface.
    pub fn error() -> Self {
        Self {
            name: "error".to_string(),
            origin: None,
            shape: TypeShape::Interface {
                implementers: Vec::new(),
            },
            methods: vec![MethodSignature {
                name: "Error".to_string(),
                params: Vec::new(),
                results: vec!["string".to_string()],
            }],
        }
    }

    pub fn with_origin(mut self, origin: PackageRef) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_methods(mut self, methods: Vec<MethodSignature>) -> Self {
        self.methods = methods;
        self
    }

    /// True when the method set satisfies the single-method error protocol.
    pub fn implements_error(&self) -> bool {
        self.methods.iter().any(MethodSignature::is_error_method)
    }
}
