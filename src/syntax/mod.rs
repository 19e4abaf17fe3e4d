//! Closed syntax model of a resolved Go source file.
//!
//! The semantic oracle parses and type-checks the source; this module only
//! describes the tree it hands over. Every control-flow shape is a variant of
//! a closed enum so that passes dispatch with exhaustive `match` and a missed
//! shape is a compile error rather than a silently skipped branch.
//!
//! Decision constructs model their optional arms explicitly:
//! [`IfStmt::otherwise`] is an `Option<Else>`, switch clauses carry a
//! [`CaseLabel`] and select clauses a [`CommLabel`], so synthesizing a missing
//! arm is a structural edit rather than a nil check.

pub mod printer;
pub mod types;
pub mod visit;

use serde::{Deserialize, Serialize};

pub use printer::print_file;
pub use types::{MethodSignature, ResolvedField, ResolvedType, TypeShape};

// ============================================================================
// Packages and identifiers
// ============================================================================

/// Import path plus the package's declared name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackageRef {
    pub path: String,
    pub name: String,
}

impl PackageRef {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }
}

/// What an identifier refers to, as resolved by the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The identifier names an imported package (the `fmt` in `fmt.Println`).
    Package(PackageRef),
    /// Any other declared object. Universe objects have no package.
    Declared {
        #[serde(default)]
        package: Option<PackageRef>,
        #[serde(default)]
        package_level: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resolution: None,
        }
    }

    pub fn resolved(name: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            name: name.into(),
            resolution: Some(resolution),
        }
    }
}

/// Source position of a declaration, used as its ordering key.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

// ============================================================================
// Files and declarations
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub package_name: String,
    /// Import path of the package this file belongs to.
    #[serde(default)]
    pub package_path: String,
    #[serde(default)]
    pub decls: Vec<Decl>,
}

impl SourceFile {
    pub fn new(package_name: impl Into<String>, package_path: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            package_path: package_path.into(),
            decls: Vec::new(),
        }
    }

    pub fn functions(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Func(func) => Some(func),
            Decl::Gen(_) => None,
        })
    }

    pub fn imports(&self) -> impl Iterator<Item = &ImportSpec> {
        self.decls
            .iter()
            .filter_map(|decl| match decl {
                Decl::Gen(gen) if gen.kind == GenKind::Import => Some(gen.specs.iter()),
                _ => None,
            })
            .flatten()
            .filter_map(|spec| match spec {
                Spec::Import(import) => Some(import),
                _ => None,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decl {
    Func(FuncDecl),
    Gen(GenDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<Field>,
    pub signature: FuncType,
    #[serde(default)]
    pub body: Option<Block>,
    #[serde(default)]
    pub position: Position,
}

impl FuncDecl {
    /// `Name` for functions, `Receiver.Name` for methods.
    pub fn qualified_name(&self) -> String {
        match self.receiver_type_name() {
            Some(receiver) => format!("{}.{}", receiver, self.name),
            None => self.name.clone(),
        }
    }

    /// Base type name of the receiver with pointers and type arguments stripped.
    pub fn receiver_type_name(&self) -> Option<String> {
        fn base(expr: &Expr) -> Option<String> {
            match expr {
                Expr::Ident(ident) => Some(ident.name.clone()),
                Expr::Star(inner) | Expr::Paren(inner) => base(inner),
                Expr::Index { x, .. } => base(x),
                Expr::Selector { sel, .. } => Some(sel.name.clone()),
                _ => None,
            }
        }
        self.receiver.as_ref().and_then(|field| base(&field.ty))
    }

    pub fn is_variadic(&self) -> bool {
        self.signature
            .params
            .last()
            .is_some_and(|field| matches!(field.ty, Expr::Ellipsis(_)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenDecl {
    pub kind: GenKind,
    pub specs: Vec<Spec>,
    /// Printed as a parenthesized group.
    #[serde(default)]
    pub grouped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenKind {
    Import,
    Const,
    Type,
    Var,
}

impl GenKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Const => "const",
            Self::Type => "type",
            Self::Var => "var",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpec {
    /// Local name, `.` for dot imports, `_` for blank imports.
    #[serde(default)]
    pub alias: Option<String>,
    /// Unquoted import path.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    #[serde(default)]
    pub ty: Option<Expr>,
    #[serde(default)]
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSpec {
    pub name: Ident,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<Field>,
    /// `type A = B`
    #[serde(default)]
    pub alias: bool,
    pub ty: Expr,
}

/// Parameter, result, struct field or interface method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub names: Vec<Ident>,
    pub ty: Expr,
    /// Raw struct tag including its quotes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedType>,
}

impl Field {
    pub fn new(names: &[&str], ty: Expr) -> Self {
        Self {
            names: names.iter().map(|name| Ident::new(*name)).collect(),
            ty,
            tag: None,
            resolved: None,
        }
    }

    pub fn with_resolved(mut self, resolved: ResolvedType) -> Self {
        self.resolved = Some(resolved);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FuncType {
    #[serde(default)]
    pub params: Vec<Field>,
    #[serde(default)]
    pub results: Vec<Field>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    Decl(GenDecl),
    Empty,
    Labeled {
        label: String,
        stmt: Box<Stmt>,
    },
    Expr(Expr),
    Send {
        chan: Expr,
        value: Expr,
    },
    IncDec {
        x: Expr,
        op: IncDecOp,
    },
    Assign {
        lhs: Vec<Expr>,
        op: AssignOp,
        rhs: Vec<Expr>,
    },
    Go(Expr),
    Defer(Expr),
    Return(Vec<Expr>),
    Branch {
        kind: BranchKind,
        #[serde(default)]
        label: Option<String>,
    },
    Block(Block),
    If(IfStmt),
    Switch(SwitchStmt),
    TypeSwitch(TypeSwitchStmt),
    Select(SelectStmt),
    For(ForStmt),
    Range(RangeStmt),
}

impl Stmt {
    pub fn is_return(&self) -> bool {
        matches!(self, Self::Return(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncDecOp {
    Inc,
    Dec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignOp {
    Assign,
    Define,
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::Define => ":=",
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::Mul => "*=",
            Self::Quo => "/=",
            Self::Rem => "%=",
            Self::And => "&=",
            Self::Or => "|=",
            Self::Xor => "^=",
            Self::Shl => "<<=",
            Self::Shr => ">>=",
            Self::AndNot => "&^=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

impl BranchKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Goto => "goto",
            Self::Fallthrough => "fallthrough",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    #[serde(default)]
    pub init: Option<Box<Stmt>>,
    pub cond: Expr,
    pub then: Block,
    #[serde(default)]
    pub otherwise: Option<Box<Else>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Else {
    Block(Block),
    If(IfStmt),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchStmt {
    #[serde(default)]
    pub init: Option<Box<Stmt>>,
    #[serde(default)]
    pub tag: Option<Expr>,
    pub clauses: Vec<CaseClause>,
}

/// `switch x := v.(type) { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSwitchStmt {
    #[serde(default)]
    pub init: Option<Box<Stmt>>,
    /// Either `x := v.(type)` or the bare expression statement `v.(type)`.
    pub assign: Box<Stmt>,
    pub clauses: Vec<CaseClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseClause {
    pub label: CaseLabel,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

impl CaseClause {
    pub fn default_case(body: Vec<Stmt>) -> Self {
        Self {
            label: CaseLabel::Default,
            body,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self.label, CaseLabel::Default)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseLabel {
    /// Values for an expression switch, types for a type switch.
    Exprs(Vec<Expr>),
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStmt {
    pub clauses: Vec<CommClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommClause {
    pub label: CommLabel,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

impl CommClause {
    pub fn is_default(&self) -> bool {
        matches!(self.label, CommLabel::Default)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommLabel {
    /// A send statement or a receive (expression or assignment).
    Comm(Box<Stmt>),
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStmt {
    #[serde(default)]
    pub init: Option<Box<Stmt>>,
    #[serde(default)]
    pub cond: Option<Expr>,
    #[serde(default)]
    pub post: Option<Box<Stmt>>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeStmt {
    #[serde(default)]
    pub key: Option<Expr>,
    #[serde(default)]
    pub value: Option<Expr>,
    /// `:=` rather than `=`.
    #[serde(default)]
    pub define: bool,
    pub x: Expr,
    pub body: Block,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Ident(Ident),
    BasicLit(BasicLit),
    CompositeLit {
        #[serde(default)]
        ty: Option<Box<Expr>>,
        #[serde(default)]
        elts: Vec<Expr>,
    },
    FuncLit {
        ty: FuncType,
        body: Block,
    },
    Paren(Box<Expr>),
    Selector {
        x: Box<Expr>,
        sel: Ident,
    },
    /// Indexing or generic instantiation (`m[k]`, `Pair[int, string]`).
    Index {
        x: Box<Expr>,
        indices: Vec<Expr>,
    },
    Slice {
        x: Box<Expr>,
        #[serde(default)]
        low: Option<Box<Expr>>,
        #[serde(default)]
        high: Option<Box<Expr>>,
        #[serde(default)]
        max: Option<Box<Expr>>,
    },
    /// `x.(T)`; `ty` is `None` for the `x.(type)` switch guard.
    TypeAssert {
        x: Box<Expr>,
        #[serde(default)]
        ty: Option<Box<Expr>>,
    },
    Call {
        fun: Box<Expr>,
        #[serde(default)]
        args: Vec<Expr>,
        /// Trailing `...` on the last argument.
        #[serde(default)]
        spread: bool,
    },
    Star(Box<Expr>),
    Unary {
        op: UnaryOp,
        x: Box<Expr>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        constant: Option<Constant>,
    },
    Binary {
        x: Box<Expr>,
        op: BinaryOp,
        y: Box<Expr>,
    },
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    /// `[N]T`, `[...]T` (len = `Ellipsis(None)`) or `[]T` (len = `None`).
    ArrayType {
        #[serde(default)]
        len: Option<Box<Expr>>,
        elt: Box<Expr>,
    },
    StructType {
        #[serde(default)]
        fields: Vec<Field>,
    },
    FuncType(FuncType),
    InterfaceType {
        #[serde(default)]
        methods: Vec<Field>,
    },
    MapType {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ChanType {
        dir: ChanDir,
        value: Box<Expr>,
    },
    Ellipsis(Option<Box<Expr>>),
}

/// Double-quoted Go string literal for `text`.
pub fn go_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => {
                let code = u32::from(c);
                if code < 0x80 {
                    quoted.push_str(&format!("\\x{:02x}", code));
                } else {
                    quoted.push_str(&format!("\\u{:04x}", code));
                }
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(Ident::new(name))
    }

    /// String literal; `text` is the unquoted content.
    pub fn string_lit(text: &str) -> Self {
        Self::BasicLit(BasicLit {
            kind: LitKind::String,
            value: go_quote(text),
            constant: None,
        })
    }

    pub fn int_lit(value: u64) -> Self {
        Self::BasicLit(BasicLit {
            kind: LitKind::Int,
            value: value.to_string(),
            constant: None,
        })
    }

    pub fn call(fun: Expr, args: Vec<Expr>) -> Self {
        Self::Call {
            fun: Box::new(fun),
            args,
            spread: false,
        }
    }

    pub fn star(x: Expr) -> Self {
        Self::Star(Box::new(x))
    }

    pub fn index(x: Expr, index: Expr) -> Self {
        Self::Index {
            x: Box::new(x),
            indices: vec![index],
        }
    }

    pub fn binary(x: Expr, op: BinaryOp, y: Expr) -> Self {
        Self::Binary {
            x: Box::new(x),
            op,
            y: Box::new(y),
        }
    }

    pub fn slice_of(elt: Expr) -> Self {
        Self::ArrayType {
            len: None,
            elt: Box::new(elt),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicLit {
    pub kind: LitKind,
    /// Raw source text, quotes included for strings and runes.
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<Constant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

/// Compile-time value recorded by the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constant {
    pub type_name: String,
    /// Exact textual value; strings unquoted.
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    Xor,
    Addr,
    Recv,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Plus => "+",
            Self::Not => "!",
            Self::Xor => "^",
            Self::Addr => "&",
            Self::Recv => "<-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    LogOr,
    LogAnd,
    Eql,
    Neq,
    Lss,
    Leq,
    Gtr,
    Geq,
    Add,
    Sub,
    Or,
    Xor,
    Mul,
    Quo,
    Rem,
    Shl,
    Shr,
    And,
    AndNot,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LogOr => "||",
            Self::LogAnd => "&&",
            Self::Eql => "==",
            Self::Neq => "!=",
            Self::Lss => "<",
            Self::Leq => "<=",
            Self::Gtr => ">",
            Self::Geq => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Mul => "*",
            Self::Quo => "/",
            Self::Rem => "%",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::And => "&",
            Self::AndNot => "&^",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}
