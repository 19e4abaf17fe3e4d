//! Signature, constant and import analysis for test generation.
//!
//! One [`AnalysisUnit`] is produced per requested source file. Each supported
//! function becomes an [`AnalyzedFunction`] carrying its own type pool, its
//! harvested literal constants and the imports needed to call it from a
//! generated test. Functions the generator cannot call are listed by name,
//! never reported as errors.
//!
//! # Layout
//!
//! - [`classifier`]: resolved type to [`AnalyzedType`]
//! - [`support`]: which signatures are expressible
//! - [`signature`]: per-file driver building the records
//! - [`constants`] and [`imports`]: body walks feeding the records
//! - [`batch`]: parallel driver over many files

pub mod batch;
pub mod classifier;
pub mod constants;
pub mod imports;
pub mod signature;
pub mod support;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::syntax::{ChanDir, Position};

pub use batch::analyze_targets;
pub use classifier::{classify, classify_type};
pub use signature::analyze_file;
pub use support::{check_support, Support, UnsupportedReason};

/// Types referenced by one function, keyed by display name.
pub type TypePool = BTreeMap<String, AnalyzedType>;

/// Classified shape of a type. Nested types refer to pool entries by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AnalyzedType {
    #[serde(rename_all = "camelCase")]
    Named {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        defining_module: Option<String>,
        implements_error_protocol: bool,
        underlying: String,
    },
    #[serde(rename_all = "camelCase")]
    Interface {
        name: String,
        known_implementers: Vec<String>,
    },
    Primitive {
        name: String,
    },
    Struct {
        name: String,
        fields: Vec<AnalyzedField>,
    },
    #[serde(rename_all = "camelCase")]
    Array {
        name: String,
        element_type: String,
        length: u64,
    },
    #[serde(rename_all = "camelCase")]
    Slice { name: String, element_type: String },
    #[serde(rename_all = "camelCase")]
    Map {
        name: String,
        key_type: String,
        element_type: String,
    },
    #[serde(rename_all = "camelCase")]
    Chan {
        name: String,
        element_type: String,
        direction: ChanDir,
    },
    #[serde(rename_all = "camelCase")]
    Pointer { name: String, element_type: String },
}

impl AnalyzedType {
    /// Display name, unique within one type pool.
    pub fn name(&self) -> &str {
        match self {
            Self::Named { name, .. }
            | Self::Interface { name, .. }
            | Self::Primitive { name }
            | Self::Struct { name, .. }
            | Self::Array { name, .. }
            | Self::Slice { name, .. }
            | Self::Map { name, .. }
            | Self::Chan { name, .. }
            | Self::Pointer { name, .. } => name,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive { .. })
    }

    pub fn is_error_protocol(&self) -> bool {
        matches!(
            self,
            Self::Named {
                implements_error_protocol: true,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub exported: bool,
}

/// A parameter, result or receiver slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedVariable {
    pub name: String,
    /// Key into the owning function's type pool.
    #[serde(rename = "type")]
    pub type_name: String,
}

/// An import a generated caller needs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequiredImport {
    pub path: String,
    /// Local name used in source; `.` for unqualified access.
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedFunction {
    pub name: String,
    pub type_pool: TypePool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<AnalyzedVariable>,
    pub parameters: Vec<AnalyzedVariable>,
    pub results: Vec<AnalyzedVariable>,
    /// Literal values keyed by primitive type name, in source order.
    pub constants: BTreeMap<String, Vec<String>>,
    pub required_imports: Vec<RequiredImport>,
    pub declaration_order: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisUnit {
    pub file_path: PathBuf,
    pub defining_module: String,
    pub analyzed_functions: Vec<AnalyzedFunction>,
    pub not_supported_names: Vec<String>,
    pub not_found_names: Vec<String>,
}

// ============================================================================
// Batch protocol
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisTarget {
    pub file_path: PathBuf,
    #[serde(default)]
    pub target_function_names: Vec<String>,
    #[serde(default)]
    pub target_method_names: Vec<String>,
}

impl AnalysisTarget {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            target_function_names: Vec::new(),
            target_method_names: Vec::new(),
        }
    }

    pub fn with_functions(mut self, names: &[&str]) -> Self {
        self.target_function_names = names.iter().map(|name| name.to_string()).collect();
        self
    }

    pub fn with_methods(mut self, names: &[&str]) -> Self {
        self.target_method_names = names.iter().map(|name| name.to_string()).collect();
        self
    }

    /// No explicit names: every top-level function is considered.
    pub fn is_whole_file(&self) -> bool {
        self.target_function_names.is_empty() && self.target_method_names.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisTargets {
    pub targets: Vec<AnalysisTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResults {
    pub results: Vec<AnalysisUnit>,
    pub int_size: u32,
}
