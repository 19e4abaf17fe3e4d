//! Which function signatures the generator can call directly.

use std::fmt;
use std::path::Path;

use super::{classifier, TypePool};
use crate::errors::{Error, Result};
use crate::syntax::{Field, FuncDecl};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Support {
    Supported,
    Unsupported(UnsupportedReason),
}

impl Support {
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedReason {
    Receiver,
    TypeParameters,
    Variadic,
    Parameter { name: String, type_name: String },
    Result { index: usize, type_name: String },
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Receiver => write!(f, "has a receiver"),
            Self::TypeParameters => write!(f, "has type parameters"),
            Self::Variadic => write!(f, "is variadic"),
            Self::Parameter { name, type_name } => {
                write!(f, "parameter `{}` has non-primitive type {}", name, type_name)
            }
            Self::Result { index, type_name } => {
                write!(f, "result #{} has unsupported type {}", index, type_name)
            }
        }
    }
}

/// Decide whether `func` is expressible for generation.
///
/// A slot with no oracle-resolved type is an infrastructure failure and is
/// returned as [`Error::TypeResolution`], not as an unsupported signature.
pub fn check_support(func: &FuncDecl, file: &Path) -> Result<Support> {
    if func.receiver.is_some() {
        return Ok(Support::Unsupported(UnsupportedReason::Receiver));
    }
    if !func.type_params.is_empty() {
        return Ok(Support::Unsupported(UnsupportedReason::TypeParameters));
    }
    if func.is_variadic() {
        return Ok(Support::Unsupported(UnsupportedReason::Variadic));
    }

    let mut scratch = TypePool::new();

    for (index, field) in func.signature.params.iter().enumerate() {
        let resolved = resolved_slot(field, func, file, || format!("parameter #{}", index))?;
        let key = classifier::classify(resolved, &mut scratch);
        if !scratch[&key].is_primitive() {
            return Ok(Support::Unsupported(UnsupportedReason::Parameter {
                name: slot_name(field),
                type_name: key,
            }));
        }
    }

    for (index, field) in func.signature.results.iter().enumerate() {
        let resolved = resolved_slot(field, func, file, || format!("result #{}", index))?;
        let key = classifier::classify(resolved, &mut scratch);
        let analyzed = &scratch[&key];
        if !analyzed.is_primitive() && !analyzed.is_error_protocol() {
            return Ok(Support::Unsupported(UnsupportedReason::Result {
                index,
                type_name: key,
            }));
        }
    }

    Ok(Support::Supported)
}

pub(crate) fn resolved_slot<'a>(
    field: &'a Field,
    func: &FuncDecl,
    file: &Path,
    slot: impl FnOnce() -> String,
) -> Result<&'a crate::syntax::ResolvedType> {
    field.resolved.as_ref().ok_or_else(|| Error::TypeResolution {
        file: file.to_path_buf(),
        function: func.qualified_name(),
        slot: slot(),
    })
}

fn slot_name(field: &Field) -> String {
    field
        .names
        .iter()
        .map(|ident| ident.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
