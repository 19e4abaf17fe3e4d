//! Property-based tests for classification, support filtering and probe placement
//!
//! These verify invariants that must hold for every input:
//! - Classification is total and its type pool is closed under references
//! - A supported signature only mentions primitive parameters
//! - Every probe id is emitted exactly once and every decision gains its arm

mod common;

use common::*;
use proptest::prelude::*;
use seedprobe::analysis::{check_support, classify, AnalyzedType, Support, TypePool};
use seedprobe::config::InstrumentConfig;
use seedprobe::instrument::instrument_sources;
use seedprobe::syntax::types::PRIMITIVE_TYPE_NAMES;
use seedprobe::syntax::{
    Block, ChanDir, Else, Expr, ForStmt, PackageRef, ResolvedField, ResolvedType, Stmt, TypeShape,
};
use std::path::Path;

// ============================================================================
// Strategies
// ============================================================================

fn primitive() -> impl Strategy<Value = ResolvedType> {
    prop::sample::select(PRIMITIVE_TYPE_NAMES).prop_map(|name| ResolvedType::basic(name))
}

fn leaf_type() -> impl Strategy<Value = ResolvedType> {
    let package = PackageRef::new("example.com/m/units", "units");
    prop_oneof![
        4 => primitive(),
        1 => Just(ResolvedType::error()),
        1 => primitive().prop_map(move |inner| named(&package, "Unit", inner)),
        1 => Just(ResolvedType {
            name: "func()".to_string(),
            origin: None,
            shape: TypeShape::Func,
            methods: Vec::new(),
        }),
    ]
}

fn composite(shape: TypeShape, name: String) -> ResolvedType {
    ResolvedType {
        name,
        origin: None,
        shape,
        methods: Vec::new(),
    }
}

fn resolved_type() -> impl Strategy<Value = ResolvedType> {
    leaf_type().prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(slice_of),
            (inner.clone(), 1u64..8).prop_map(|(element, length)| {
                let name = format!("[{}]{}", length, element.name);
                composite(
                    TypeShape::Array {
                        element: Box::new(element),
                        length,
                    },
                    name,
                )
            }),
            (primitive(), inner.clone()).prop_map(|(key, element)| {
                let name = format!("map[{}]{}", key.name, element.name);
                composite(
                    TypeShape::Map {
                        key: Box::new(key),
                        element: Box::new(element),
                    },
                    name,
                )
            }),
            inner.clone().prop_map(|element| {
                let name = format!("*{}", element.name);
                composite(
                    TypeShape::Pointer {
                        element: Box::new(element),
                    },
                    name,
                )
            }),
            inner.clone().prop_map(|element| {
                let name = format!("chan {}", element.name);
                composite(
                    TypeShape::Chan {
                        element: Box::new(element),
                        direction: ChanDir::Both,
                    },
                    name,
                )
            }),
            prop::collection::vec(inner, 0..3).prop_map(|types| {
                let fields: Vec<ResolvedField> = types
                    .into_iter()
                    .enumerate()
                    .map(|(i, ty)| ResolvedField {
                        name: format!("F{}", i),
                        ty,
                        exported: true,
                    })
                    .collect();
                let name = format!(
                    "struct{{{}}}",
                    fields
                        .iter()
                        .map(|field| format!("{} {}", field.name, field.ty.name))
                        .collect::<Vec<_>>()
                        .join("; ")
                );
                composite(TypeShape::Struct { fields }, name)
            }),
        ]
    })
}

fn stmt() -> impl Strategy<Value = Stmt> {
    let leaf = prop_oneof![
        Just(call("work")),
        Just(ret(Expr::ident("x"))),
        Just(Stmt::Block(Block::default())),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        let body = prop::collection::vec(inner, 0..4);
        prop_oneof![
            (body.clone(), prop::option::of(body.clone())).prop_map(|(then, otherwise)| {
                let mut stmt = if_then(cond("c"), then);
                stmt.otherwise = otherwise.map(|stmts| Box::new(Else::Block(Block::new(stmts))));
                Stmt::If(stmt)
            }),
            (1usize..5).prop_map(else_if_chain),
            (prop::collection::vec(1u64..9, 0..4), any::<bool>())
                .prop_map(|(cases, with_default)| switch("x", &cases, with_default)),
            (1usize..4).prop_map(|n| {
                let channels: Vec<String> = (0..n).map(|i| format!("ch{}", i)).collect();
                let names: Vec<&str> = channels.iter().map(String::as_str).collect();
                select(&names)
            }),
            (
                prop::collection::vec(prop::sample::select(vec!["int", "string", "error"]), 0..4),
                any::<bool>(),
            )
                .prop_map(|(types, with_default)| type_switch(&types, with_default)),
            body.clone().prop_map(|stmts| range_over("xs", stmts)),
            body.clone().prop_map(|stmts| Stmt::For(ForStmt {
                init: None,
                cond: None,
                post: None,
                body: Block::new(stmts),
            })),
            body.prop_map(|stmts| Stmt::Block(Block::new(stmts))),
        ]
    })
}

// ============================================================================
// Helpers
// ============================================================================

fn references(ty: &AnalyzedType) -> Vec<&str> {
    match ty {
        AnalyzedType::Named { underlying, .. } => vec![underlying.as_str()],
        AnalyzedType::Interface { .. } | AnalyzedType::Primitive { .. } => Vec::new(),
        AnalyzedType::Struct { fields, .. } => {
            fields.iter().map(|field| field.type_name.as_str()).collect()
        }
        AnalyzedType::Array { element_type, .. }
        | AnalyzedType::Slice { element_type, .. }
        | AnalyzedType::Chan { element_type, .. }
        | AnalyzedType::Pointer { element_type, .. } => vec![element_type.as_str()],
        AnalyzedType::Map {
            key_type,
            element_type,
            ..
        } => vec![key_type.as_str(), element_type.as_str()],
    }
}

fn trimmed_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim_start)
}

proptest! {
    /// Property: classification always yields a pool entry, and every name an
    /// entry refers to is itself in the pool
    #[test]
    fn prop_classification_is_total_and_closed(ty in resolved_type()) {
        let mut pool = TypePool::new();
        let key = classify(&ty, &mut pool);

        prop_assert!(pool.contains_key(&key));
        prop_assert_eq!(pool[&key].name(), key.as_str());
        for (name, analyzed) in &pool {
            prop_assert_eq!(analyzed.name(), name.as_str());
            for referenced in references(analyzed) {
                prop_assert!(pool.contains_key(referenced), "{} missing from pool", referenced);
            }
        }
    }

    /// Property: a supported function only takes primitive parameters and
    /// only returns primitives or error protocol values
    #[test]
    fn prop_supported_signatures_are_primitive(
        params in prop::collection::vec(resolved_type(), 0..4),
        results in prop::collection::vec(resolved_type(), 0..3),
    ) {
        let decl = func(
            "F",
            params
                .iter()
                .enumerate()
                .map(|(i, ty)| param(&format!("p{}", i), ty.clone()))
                .collect(),
            results.iter().cloned().map(result).collect(),
            Vec::new(),
        );

        let support = check_support(&decl, Path::new("f.go")).unwrap();
        let mut pool = TypePool::new();
        let param_primitive = params
            .iter()
            .all(|ty| {
                let key = classify(ty, &mut pool);
                pool[&key].is_primitive()
            });
        let results_ok = results.iter().all(|ty| {
            let key = classify(ty, &mut pool);
            pool[&key].is_primitive() || pool[&key].is_error_protocol()
        });
        prop_assert_eq!(support == Support::Supported, param_primitive && results_ok);
    }

    /// Property: every allocated id appears exactly once in the output, every
    /// if gains an else and every switch a default
    #[test]
    fn prop_probes_are_complete(stmts in prop::collection::vec(stmt(), 0..6)) {
        let source = file("calc", vec![func("F", Vec::new(), Vec::new(), stmts)]);
        let package = instrument_sources(
            &[("calc.go".to_string(), source)],
            &InstrumentConfig::default(),
            &["F".to_string()],
        )
        .unwrap();
        let printed = &package.files[0].source;

        prop_assert!(package.probes >= 1);
        for id in 1..=package.probes {
            let probe = format!("__ut_cover_tab__[\"{}\"]++", id);
            prop_assert_eq!(occurrences(printed, &probe), 1);
        }
        prop_assert_eq!(occurrences(printed, "__ut_cover_tab__["), package.probes as usize);
        prop_assert_eq!(
            package.function_to_counters["F"].len() as u64,
            package.probes
        );

        let ifs = trimmed_lines(printed).filter(|line| line.starts_with("if ")).count();
        let elses = trimmed_lines(printed).filter(|line| line.starts_with("} else {")).count();
        prop_assert_eq!(ifs, elses);

        let switches = trimmed_lines(printed).filter(|line| line.starts_with("switch ")).count();
        let defaults = trimmed_lines(printed).filter(|line| *line == "default:").count();
        prop_assert_eq!(switches, defaults);
    }
}
