// Syntax-tree builders shared by the seedprobe integration tests
#![allow(dead_code)]

use seedprobe::syntax::{
    AssignOp, BasicLit, Block, CaseClause, CaseLabel, CommClause, CommLabel, Constant, Decl, Else,
    Expr, Field, FuncDecl, FuncType, Ident, IfStmt, LitKind, PackageRef, Position, RangeStmt,
    Resolution, ResolvedType, SelectStmt, SourceFile, Stmt, SwitchStmt, TypeShape,
    TypeSwitchStmt, UnaryOp,
};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Types
// ============================================================================

pub fn int() -> ResolvedType {
    ResolvedType::basic("int")
}

pub fn string() -> ResolvedType {
    ResolvedType::basic("string")
}

pub fn slice_of(element: ResolvedType) -> ResolvedType {
    ResolvedType {
        name: format!("[]{}", element.name),
        origin: None,
        shape: TypeShape::Slice {
            element: Box::new(element),
        },
        methods: Vec::new(),
    }
}

/// `type <name> <underlying>` declared in `package`.
pub fn named(package: &PackageRef, name: &str, underlying: ResolvedType) -> ResolvedType {
    ResolvedType {
        name: format!("{}.{}", package.name, name),
        origin: Some(package.clone()),
        shape: underlying.shape,
        methods: Vec::new(),
    }
}

// ============================================================================
// Declarations
// ============================================================================

pub fn param(name: &str, ty: ResolvedType) -> Field {
    let syntax = Expr::ident(ty.name.clone());
    Field::new(&[name], syntax).with_resolved(ty)
}

pub fn result(ty: ResolvedType) -> Field {
    let syntax = Expr::ident(ty.name.clone());
    Field::new(&[], syntax).with_resolved(ty)
}

pub fn func(name: &str, params: Vec<Field>, results: Vec<Field>, stmts: Vec<Stmt>) -> FuncDecl {
    FuncDecl {
        name: name.to_string(),
        receiver: None,
        type_params: Vec::new(),
        signature: FuncType { params, results },
        body: Some(Block::new(stmts)),
        position: Position::default(),
    }
}

pub fn at(mut func: FuncDecl, line: u32) -> FuncDecl {
    func.position = Position { line, column: 1 };
    func
}

pub fn method(receiver: &str, name: &str, stmts: Vec<Stmt>) -> FuncDecl {
    let mut decl = func(name, Vec::new(), Vec::new(), stmts);
    decl.receiver = Some(Field::new(&["r"], Expr::star(Expr::ident(receiver))));
    decl
}

/// A no-op function: `func <name>() {}`.
pub fn empty_func(name: &str) -> FuncDecl {
    func(name, Vec::new(), Vec::new(), Vec::new())
}

pub fn file(package: &str, funcs: Vec<FuncDecl>) -> SourceFile {
    let mut file = SourceFile::new(package, format!("example.com/m/{}", package));
    file.decls = funcs.into_iter().map(Decl::Func).collect();
    file
}

// ============================================================================
// Statements and expressions
// ============================================================================

pub fn call(name: &str) -> Stmt {
    Stmt::Expr(Expr::call(Expr::ident(name), Vec::new()))
}

pub fn ret(value: Expr) -> Stmt {
    Stmt::Return(vec![value])
}

pub fn cond(name: &str) -> Expr {
    Expr::ident(name)
}

pub fn if_then(condition: Expr, then: Vec<Stmt>) -> IfStmt {
    IfStmt {
        init: None,
        cond: condition,
        then: Block::new(then),
        otherwise: None,
    }
}

/// `if c0 {} else if c1 {} ... else if c<depth-1> {}` with no final else.
pub fn else_if_chain(depth: usize) -> Stmt {
    let mut chain: Option<IfStmt> = None;
    for level in (0..depth).rev() {
        let mut link = if_then(cond(&format!("c{}", level)), vec![call("work")]);
        link.otherwise = chain.map(|next| Box::new(Else::If(next)));
        chain = Some(link);
    }
    chain.map(Stmt::If).unwrap_or(Stmt::Empty)
}

pub fn switch(tag: &str, cases: &[u64], with_default: bool) -> Stmt {
    let mut clauses: Vec<CaseClause> = cases
        .iter()
        .map(|value| CaseClause {
            label: CaseLabel::Exprs(vec![Expr::int_lit(*value)]),
            body: vec![call("work")],
        })
        .collect();
    if with_default {
        clauses.push(CaseClause::default_case(vec![call("fallback")]));
    }
    Stmt::Switch(SwitchStmt {
        init: None,
        tag: Some(Expr::ident(tag)),
        clauses,
    })
}

/// `switch v := value.(type) { case T1: work() ... }`
pub fn type_switch(types: &[&str], with_default: bool) -> Stmt {
    let mut clauses: Vec<CaseClause> = types
        .iter()
        .map(|ty| CaseClause {
            label: CaseLabel::Exprs(vec![Expr::ident(*ty)]),
            body: vec![call("work")],
        })
        .collect();
    if with_default {
        clauses.push(CaseClause::default_case(vec![call("fallback")]));
    }
    Stmt::TypeSwitch(TypeSwitchStmt {
        init: None,
        assign: Box::new(define(
            "v",
            Expr::TypeAssert {
                x: Box::new(Expr::ident("value")),
                ty: None,
            },
        )),
        clauses,
    })
}

/// `for _, v := range xs { <body> }`
pub fn range_over(collection: &str, body: Vec<Stmt>) -> Stmt {
    Stmt::Range(RangeStmt {
        key: Some(Expr::ident("_")),
        value: Some(Expr::ident("v")),
        define: true,
        x: Expr::ident(collection),
        body: Block::new(body),
    })
}

/// `select { case <-ch: work() ... }`
pub fn select(channels: &[&str]) -> Stmt {
    Stmt::Select(SelectStmt {
        clauses: channels
            .iter()
            .map(|ch| CommClause {
                label: CommLabel::Comm(Box::new(Stmt::Expr(Expr::Unary {
                    op: UnaryOp::Recv,
                    x: Box::new(Expr::ident(*ch)),
                    constant: None,
                }))),
                body: vec![call("work")],
            })
            .collect(),
    })
}

pub fn define(name: &str, value: Expr) -> Stmt {
    Stmt::Assign {
        lhs: vec![Expr::ident(name)],
        op: AssignOp::Define,
        rhs: vec![value],
    }
}

/// Literal carrying the oracle's constant value.
pub fn lit(kind: LitKind, raw: &str, type_name: &str, value: &str) -> Expr {
    Expr::BasicLit(BasicLit {
        kind,
        value: raw.to_string(),
        constant: Some(Constant {
            type_name: type_name.to_string(),
            value: value.to_string(),
        }),
    })
}

pub fn negated(inner: Expr, type_name: &str, value: &str) -> Expr {
    Expr::Unary {
        op: UnaryOp::Neg,
        x: Box::new(inner),
        constant: Some(Constant {
            type_name: type_name.to_string(),
            value: value.to_string(),
        }),
    }
}

/// `pkg.Name` with both identifiers resolved.
pub fn qualified(package: &PackageRef, name: &str) -> Expr {
    Expr::Selector {
        x: Box::new(Expr::Ident(Ident::resolved(
            package.name.clone(),
            Resolution::Package(package.clone()),
        ))),
        sel: Ident::resolved(
            name,
            Resolution::Declared {
                package: Some(package.clone()),
                package_level: true,
            },
        ),
    }
}

// ============================================================================
// On-disk modules
// ============================================================================

pub const DUMP_SUFFIX: &str = ".ast.json";

/// Write `go.mod`, the printed sources and their sidecar dumps.
///
/// Returns the absolute path of each written source file.
pub fn write_module(root: &Path, files: &[(&str, &SourceFile)]) -> Vec<PathBuf> {
    fs::write(root.join("go.mod"), "module example.com/m\n\ngo 1.22\n").unwrap();
    files
        .iter()
        .map(|(relative, source)| {
            let path = root.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, seedprobe::print_file(source)).unwrap();
            write_dump(&path, source);
            path
        })
        .collect()
}

pub fn write_dump(source_path: &Path, file: &SourceFile) {
    let mut dump = source_path.as_os_str().to_owned();
    dump.push(DUMP_SUFFIX);
    fs::write(PathBuf::from(dump), serde_json::to_string(file).unwrap()).unwrap();
}

/// Count occurrences of `needle` in `haystack`.
pub fn occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
