//! Resolved type to [`AnalyzedType`] classification.
//!
//! The error protocol wins over everything else. Otherwise the shape decides,
//! in the order array, slice, map, chan, pointer, struct, interface,
//! named-over-basic and finally primitive. Func and type-parameter shapes
//! have no generator model and classify as interfaces without implementers.

use super::{AnalyzedField, AnalyzedType, TypePool};
use crate::syntax::{ChanDir, ResolvedType, TypeShape};

/// Classify `ty`, registering it and every type it mentions in `pool`.
///
/// Returns the pool key of `ty`.
pub fn classify(ty: &ResolvedType, pool: &mut TypePool) -> String {
    if let Some(existing) = pool.get(&ty.name) {
        return existing.name().to_string();
    }
    let analyzed = classify_into(ty, pool);
    let name = analyzed.name().to_string();
    pool.insert(name.clone(), analyzed);
    name
}

/// Classify a single type, discarding the pool of nested types.
pub fn classify_type(ty: &ResolvedType) -> AnalyzedType {
    let mut pool = TypePool::new();
    classify_into(ty, &mut pool)
}

fn classify_into(ty: &ResolvedType, pool: &mut TypePool) -> AnalyzedType {
    let name = ty.name.clone();

    if ty.implements_error() {
        let underlying = classify(&underlying_of(ty), pool);
        return AnalyzedType::Named {
            name,
            defining_module: ty.origin.as_ref().map(|origin| origin.path.clone()),
            implements_error_protocol: true,
            underlying,
        };
    }

    match &ty.shape {
        TypeShape::Array { element, length } => AnalyzedType::Array {
            name,
            element_type: classify(element, pool),
            length: *length,
        },
        TypeShape::Slice { element } => AnalyzedType::Slice {
            name,
            element_type: classify(element, pool),
        },
        TypeShape::Map { key, element } => AnalyzedType::Map {
            name,
            key_type: classify(key, pool),
            element_type: classify(element, pool),
        },
        TypeShape::Chan { element, direction } => AnalyzedType::Chan {
            name,
            element_type: classify(element, pool),
            direction: *direction,
        },
        TypeShape::Pointer { element } => AnalyzedType::Pointer {
            name,
            element_type: classify(element, pool),
        },
        TypeShape::Struct { fields } => AnalyzedType::Struct {
            name,
            fields: fields
                .iter()
                .map(|field| AnalyzedField {
                    name: field.name.clone(),
                    type_name: classify(&field.ty, pool),
                    exported: field.exported,
                })
                .collect(),
        },
        TypeShape::Interface { implementers } => AnalyzedType::Interface {
            name,
            known_implementers: implementers.clone(),
        },
        TypeShape::Func | TypeShape::TypeParam => AnalyzedType::Interface {
            name,
            known_implementers: Vec::new(),
        },
        TypeShape::Basic { underlying } if ty.origin.is_some() => AnalyzedType::Named {
            name,
            defining_module: ty.origin.as_ref().map(|origin| origin.path.clone()),
            implements_error_protocol: false,
            underlying: classify(&ResolvedType::basic(underlying.clone()), pool),
        },
        TypeShape::Basic { .. } => AnalyzedType::Primitive { name },
    }
}

/// The anonymous type underlying `ty`: same shape, literal name, no methods.
fn underlying_of(ty: &ResolvedType) -> ResolvedType {
    match &ty.shape {
        TypeShape::Basic { underlying } => ResolvedType::basic(underlying.clone()),
        shape => ResolvedType {
            name: literal_name(ty),
            origin: None,
            shape: shape.clone(),
            methods: Vec::new(),
        },
    }
}

/// Go spelling of the type literal behind `ty`.
pub fn literal_name(ty: &ResolvedType) -> String {
    match &ty.shape {
        TypeShape::Basic { underlying } => underlying.clone(),
        TypeShape::Array { element, length } => format!("[{}]{}", length, element.name),
        TypeShape::Slice { element } => format!("[]{}", element.name),
        TypeShape::Map { key, element } => format!("map[{}]{}", key.name, element.name),
        TypeShape::Chan { element, direction } => match direction {
            ChanDir::Both => format!("chan {}", element.name),
            ChanDir::Send => format!("chan<- {}", element.name),
            ChanDir::Recv => format!("<-chan {}", element.name),
        },
        TypeShape::Pointer { element } => format!("*{}", element.name),
        TypeShape::Struct { fields } => {
            let fields: Vec<String> = fields
                .iter()
                .map(|field| format!("{} {}", field.name, field.ty.name))
                .collect();
            format!("struct{{{}}}", fields.join("; "))
        }
        TypeShape::Interface { .. } => {
            let methods: Vec<String> = ty
                .methods
                .iter()
                .map(|method| {
                    let results = match method.results.len() {
                        0 => String::new(),
                        1 => format!(" {}", method.results[0]),
                        _ => format!(" ({})", method.results.join(", ")),
                    };
                    format!("{}({}){}", method.name, method.params.join(", "), results)
                })
                .collect();
            format!("interface{{{}}}", methods.join("; "))
        }
        TypeShape::Func | TypeShape::TypeParam => ty.name.clone(),
    }
}
