mod common;

use common::*;
use pretty_assertions::assert_eq;
use seedprobe::analysis::signature::analyze_source;
use seedprobe::analysis::{
    analyze_file, analyze_targets, AnalysisTarget, AnalysisTargets, AnalyzedType, RequiredImport,
};
use seedprobe::errors::Error;
use seedprobe::syntax::{Expr, Field, LitKind, PackageRef, ResolvedType};
use seedprobe::{DumpOracle, MemoryOracle};
use std::collections::BTreeMap;
use tempfile::TempDir;

fn abs() -> seedprobe::syntax::FuncDecl {
    func(
        "Abs",
        vec![param("x", int())],
        vec![result(int())],
        vec![
            define("one", lit(LitKind::Int, "1", "untyped int", "1")),
            define(
                "minus",
                negated(lit(LitKind::Int, "1", "untyped int", "1"), "untyped int", "-1"),
            ),
            define("greeting", lit(LitKind::String, "\"hi\"", "untyped string", "hi")),
            ret(Expr::ident("x")),
        ],
    )
}

#[test]
fn test_constants_are_bucketed_by_default_type() {
    let source = file("calc", vec![abs()]);
    let unit = analyze_source(&source, &AnalysisTarget::new("calc.go")).unwrap();

    let mut expected = BTreeMap::new();
    expected.insert("int".to_string(), vec!["1".to_string(), "-1".to_string()]);
    expected.insert("string".to_string(), vec!["hi".to_string()]);
    assert_eq!(unit.analyzed_functions[0].constants, expected);
}

#[test]
fn test_duplicate_constants_are_kept() {
    let body = vec![
        define("a", lit(LitKind::Int, "7", "untyped int", "7")),
        define("b", lit(LitKind::Int, "7", "untyped int", "7")),
    ];
    let source = file("calc", vec![func("Seven", Vec::new(), Vec::new(), body)]);
    let unit = analyze_source(&source, &AnalysisTarget::new("calc.go")).unwrap();
    assert_eq!(unit.analyzed_functions[0].constants["int"], vec!["7", "7"]);
}

#[test]
fn test_supported_function_record() {
    let source = file("calc", vec![abs()]);
    let unit = analyze_source(&source, &AnalysisTarget::new("calc.go").with_functions(&["Abs"]))
        .unwrap();

    assert_eq!(unit.defining_module, "example.com/m/calc");
    assert!(unit.not_supported_names.is_empty());
    assert!(unit.not_found_names.is_empty());

    let abs = &unit.analyzed_functions[0];
    assert_eq!(abs.name, "Abs");
    assert_eq!(abs.parameters.len(), 1);
    assert_eq!(abs.parameters[0].name, "x");
    assert_eq!(abs.parameters[0].type_name, "int");
    assert_eq!(abs.results[0].name, "");
    assert_eq!(
        abs.type_pool["int"],
        AnalyzedType::Primitive {
            name: "int".to_string()
        }
    );
}

#[test]
fn test_error_result_is_supported() {
    let parse = func(
        "Parse",
        vec![param("s", string())],
        vec![result(int()), result(ResolvedType::error())],
        vec![ret(Expr::ident("nil"))],
    );
    let unit = analyze_source(&file("calc", vec![parse]), &AnalysisTarget::new("calc.go")).unwrap();

    let parse = &unit.analyzed_functions[0];
    assert_eq!(parse.results[1].type_name, "error");
    assert!(parse.type_pool["error"].is_error_protocol());
}

#[test]
fn test_unsupported_and_missing_names_are_sorted_values() {
    let geometry = PackageRef::new("example.com/m/geometry", "geometry");
    let mut variadic = func(
        "Sum",
        vec![Field::new(&["xs"], Expr::Ellipsis(Some(Box::new(Expr::ident("int")))))
            .with_resolved(slice_of(int()))],
        vec![result(int())],
        Vec::new(),
    );
    variadic.position.line = 3;
    let source = file(
        "calc",
        vec![
            variadic,
            func("Lengths", vec![param("xs", slice_of(int()))], Vec::new(), Vec::new()),
            func(
                "Scale",
                vec![param("c", named(&geometry, "Celsius", int()))],
                Vec::new(),
                Vec::new(),
            ),
            method("Rect", "Area", Vec::new()),
            empty_func("Ok"),
        ],
    );
    let target = AnalysisTarget::new("calc.go")
        .with_functions(&["Zeta", "Sum", "Lengths", "Scale", "Ok", "Alpha"])
        .with_methods(&["Rect.Area", "Rect.Perimeter"]);

    let unit = analyze_source(&source, &target).unwrap();

    let analyzed: Vec<&str> = unit
        .analyzed_functions
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(analyzed, vec!["Ok"]);
    assert_eq!(
        unit.not_supported_names,
        vec!["Lengths", "Rect.Area", "Scale", "Sum"]
    );
    assert_eq!(unit.not_found_names, vec!["Alpha", "Rect.Perimeter", "Zeta"]);
}

#[test]
fn test_missing_resolved_type_is_fatal() {
    let unresolved = func(
        "Broken",
        vec![Field::new(&["x"], Expr::ident("int"))],
        Vec::new(),
        Vec::new(),
    );
    let err = analyze_source(&file("calc", vec![unresolved]), &AnalysisTarget::new("calc.go"))
        .unwrap_err();
    assert!(matches!(err, Error::TypeResolution { .. }));
    assert_eq!(err.category(), "Type resolution");
}

#[test]
fn test_required_imports_cover_qualified_and_dot_access() {
    let strconv = PackageRef::new("strconv", "strconv");
    let strings = PackageRef::new("strings", "strings");
    let body = vec![
        define(
            "n",
            Expr::call(qualified(&strconv, "Itoa"), vec![Expr::ident("x")]),
        ),
        define(
            "u",
            Expr::call(
                Expr::Ident(seedprobe::syntax::Ident::resolved(
                    "ToUpper",
                    seedprobe::syntax::Resolution::Declared {
                        package: Some(strings.clone()),
                        package_level: true,
                    },
                )),
                vec![Expr::ident("n")],
            ),
        ),
        ret(Expr::ident("u")),
    ];
    let show = func("Show", vec![param("x", int())], vec![result(string())], body);
    let unit = analyze_source(&file("calc", vec![show]), &AnalysisTarget::new("calc.go")).unwrap();

    assert_eq!(
        unit.analyzed_functions[0].required_imports,
        vec![
            RequiredImport {
                path: "strconv".to_string(),
                alias: "strconv".to_string(),
            },
            RequiredImport {
                path: "strings".to_string(),
                alias: ".".to_string(),
            },
        ]
    );
}

#[test]
fn test_batch_keeps_input_order_and_reports_int_size() {
    let oracle = MemoryOracle::new()
        .with_int_size(32)
        .with_file("b.go", file("b", vec![empty_func("B")]))
        .with_file("a.go", file("a", vec![empty_func("A")]));
    let targets = AnalysisTargets {
        targets: vec![AnalysisTarget::new("b.go"), AnalysisTarget::new("a.go")],
    };

    let results = analyze_targets(&oracle, &targets).unwrap();
    assert_eq!(results.int_size, 32);
    let paths: Vec<_> = results
        .results
        .iter()
        .map(|unit| unit.file_path.to_string_lossy().into_owned())
        .collect();
    assert_eq!(paths, vec!["b.go", "a.go"]);
}

#[test]
fn test_batch_aborts_on_unloadable_file() {
    let oracle = MemoryOracle::new().with_file("a.go", file("a", vec![empty_func("A")]));
    let targets = AnalysisTargets {
        targets: vec![AnalysisTarget::new("a.go"), AnalysisTarget::new("missing.go")],
    };
    assert!(analyze_targets(&oracle, &targets).is_err());
}

#[test]
fn test_reanalysis_serializes_identically() {
    let dir = TempDir::new().unwrap();
    let source = file("calc", vec![at(abs(), 4), at(empty_func("Noop"), 12)]);
    let paths = write_module(dir.path(), &[("calc/calc.go", &source)]);
    let oracle = DumpOracle::new(DUMP_SUFFIX);
    let targets = AnalysisTargets {
        targets: vec![AnalysisTarget::new(paths[0].clone())],
    };

    let first = serde_json::to_string_pretty(&analyze_targets(&oracle, &targets).unwrap()).unwrap();
    let second =
        serde_json::to_string_pretty(&analyze_targets(&oracle, &targets).unwrap()).unwrap();
    assert_eq!(first, second);
    assert!(first.contains("\"intSize\": 64"));
    assert!(first.contains("\"analyzedFunctions\""));
}

#[test]
fn test_dump_oracle_reads_sidecar() {
    let dir = TempDir::new().unwrap();
    let paths = write_module(dir.path(), &[("calc.go", &file("calc", vec![abs()]))]);

    let unit = analyze_file(&DumpOracle::new(DUMP_SUFFIX), &AnalysisTarget::new(&paths[0]))
        .unwrap();
    assert_eq!(unit.analyzed_functions.len(), 1);

    let missing = analyze_file(
        &DumpOracle::new(DUMP_SUFFIX),
        &AnalysisTarget::new(dir.path().join("nope.go")),
    )
    .unwrap_err();
    assert_eq!(missing.category(), "Oracle");
}
