//! Deterministic Go source printer.
//!
//! Output is a pure function of the tree: tabs for indentation, one statement
//! per line, `} else {` chaining and case labels at switch depth. Re-printing
//! an unchanged tree is byte-identical, which keeps repeated instrumentation
//! runs diffable.

use super::{
    BinaryOp, Block, CaseClause, CaseLabel, ChanDir, CommClause, CommLabel, Decl, Else, Expr,
    Field, FuncDecl, FuncType, GenDecl, IfStmt, IncDecOp, Spec, Stmt,
};

/// Render a whole file.
pub fn print_file(file: &super::SourceFile) -> String {
    let mut printer = Printer::default();
    printer.write("package ");
    printer.write(&file.package_name);
    printer.newline();
    for decl in &file.decls {
        printer.newline();
        printer.decl(decl);
        printer.newline();
    }
    printer.out
}

/// Render a single function declaration.
pub fn print_func(func: &FuncDecl) -> String {
    let mut printer = Printer::default();
    printer.func_decl(func);
    printer.out
}

/// Render a statement at depth zero.
pub fn print_stmt(stmt: &Stmt) -> String {
    let mut printer = Printer::default();
    printer.stmt(stmt);
    printer.out
}

pub fn print_expr(expr: &Expr) -> String {
    let mut printer = Printer::default();
    printer.expr(expr);
    printer.out
}

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::LogOr => 1,
        BinaryOp::LogAnd => 2,
        BinaryOp::Eql
        | BinaryOp::Neq
        | BinaryOp::Lss
        | BinaryOp::Leq
        | BinaryOp::Gtr
        | BinaryOp::Geq => 3,
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Or | BinaryOp::Xor => 4,
        BinaryOp::Mul
        | BinaryOp::Quo
        | BinaryOp::Rem
        | BinaryOp::Shl
        | BinaryOp::Shr
        | BinaryOp::And
        | BinaryOp::AndNot => 5,
    }
}

const UNARY_PRECEDENCE: u8 = 6;
const PRIMARY_PRECEDENCE: u8 = 7;

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Binary { op, .. } => binary_precedence(*op),
        Expr::Unary { .. } | Expr::Star(_) => UNARY_PRECEDENCE,
        _ => PRIMARY_PRECEDENCE,
    }
}

/// Whether `op` written directly before `operand` would lex as a different
/// token, e.g. `- -x` as the decrement `--x` or `& ^x` as `&^x`.
fn glues(op: &str, operand: &Expr) -> bool {
    let next = match operand {
        Expr::Unary { op, .. } => op.as_str().chars().next(),
        Expr::Star(_) => Some('*'),
        _ => None,
    };
    matches!(
        (op.chars().last(), next),
        (Some('-'), Some('-')) | (Some('+'), Some('+')) | (Some('&'), Some('&' | '^'))
    )
}

#[derive(Default)]
struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push('\n');
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push('\t');
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Func(func) => self.func_decl(func),
            Decl::Gen(gen) => self.gen_decl(gen),
        }
    }

    fn func_decl(&mut self, func: &FuncDecl) {
        self.write("func ");
        if let Some(receiver) = &func.receiver {
            self.write("(");
            self.field(receiver);
            self.write(") ");
        }
        self.write(&func.name);
        self.type_params(&func.type_params);
        self.signature(&func.signature);
        if let Some(body) = &func.body {
            self.write(" ");
            self.block(body);
        }
    }

    fn gen_decl(&mut self, gen: &GenDecl) {
        self.write(gen.kind.keyword());
        if gen.grouped || gen.specs.len() != 1 {
            self.write(" (");
            self.newline();
            self.depth += 1;
            for spec in &gen.specs {
                self.indent();
                self.spec(spec);
                self.newline();
            }
            self.depth -= 1;
            self.indent();
            self.write(")");
        } else {
            for spec in &gen.specs {
                self.write(" ");
                self.spec(spec);
            }
        }
    }

    fn spec(&mut self, spec: &Spec) {
        match spec {
            Spec::Import(import) => {
                if let Some(alias) = &import.alias {
                    self.write(alias);
                    self.write(" ");
                }
                self.write("\"");
                self.write(&import.path);
                self.write("\"");
            }
            Spec::Value(value) => {
                self.ident_list(value.names.iter().map(|ident| ident.name.as_str()));
                if let Some(ty) = &value.ty {
                    self.write(" ");
                    self.expr(ty);
                }
                if !value.values.is_empty() {
                    self.write(" = ");
                    self.expr_list(&value.values);
                }
            }
            Spec::Type(ty) => {
                self.write(&ty.name.name);
                self.type_params(&ty.type_params);
                self.write(if ty.alias { " = " } else { " " });
                self.expr(&ty.ty);
            }
        }
    }

    fn type_params(&mut self, params: &[Field]) {
        if params.is_empty() {
            return;
        }
        self.write("[");
        self.field_list(params);
        self.write("]");
    }

    fn signature(&mut self, ty: &FuncType) {
        self.write("(");
        self.field_list(&ty.params);
        self.write(")");
        match ty.results.as_slice() {
            [] => {}
            [single] if single.names.is_empty() => {
                self.write(" ");
                self.expr(&single.ty);
            }
            results => {
                self.write(" (");
                self.field_list(results);
                self.write(")");
            }
        }
    }

    fn field_list(&mut self, fields: &[Field]) {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.field(field);
        }
    }

    fn field(&mut self, field: &Field) {
        if !field.names.is_empty() {
            self.ident_list(field.names.iter().map(|ident| ident.name.as_str()));
            self.write(" ");
        }
        self.expr(&field.ty);
        if let Some(tag) = &field.tag {
            self.write(" ");
            self.write(tag);
        }
    }

    fn ident_list<'a>(&mut self, names: impl Iterator<Item = &'a str>) {
        for (i, name) in names.enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(name);
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn block(&mut self, block: &Block) {
        self.write("{");
        self.newline();
        self.depth += 1;
        self.stmt_list(&block.stmts);
        self.depth -= 1;
        self.indent();
        self.write("}");
    }

    fn stmt_list(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            if matches!(stmt, Stmt::Empty) {
                continue;
            }
            self.indent();
            self.stmt(stmt);
            self.newline();
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(gen) => self.gen_decl(gen),
            Stmt::Empty => {}
            Stmt::Labeled { label, stmt } => {
                self.write(label);
                self.write(":");
                if !matches!(**stmt, Stmt::Empty) {
                    self.newline();
                    self.indent();
                    self.stmt(stmt);
                }
            }
            Stmt::Expr(expr) => self.expr(expr),
            Stmt::Send { chan, value } => {
                self.expr(chan);
                self.write(" <- ");
                self.expr(value);
            }
            Stmt::IncDec { x, op } => {
                self.expr(x);
                self.write(match op {
                    IncDecOp::Inc => "++",
                    IncDecOp::Dec => "--",
                });
            }
            Stmt::Assign { lhs, op, rhs } => {
                self.expr_list(lhs);
                self.write(" ");
                self.write(op.as_str());
                self.write(" ");
                self.expr_list(rhs);
            }
            Stmt::Go(call) => {
                self.write("go ");
                self.expr(call);
            }
            Stmt::Defer(call) => {
                self.write("defer ");
                self.expr(call);
            }
            Stmt::Return(results) => {
                self.write("return");
                if !results.is_empty() {
                    self.write(" ");
                    self.expr_list(results);
                }
            }
            Stmt::Branch { kind, label } => {
                self.write(kind.keyword());
                if let Some(label) = label {
                    self.write(" ");
                    self.write(label);
                }
            }
            Stmt::Block(block) => self.block(block),
            Stmt::If(stmt) => self.if_stmt(stmt),
            Stmt::Switch(switch) => {
                self.write("switch");
                if let Some(init) = &switch.init {
                    self.write(" ");
                    self.stmt(init);
                    self.write(";");
                }
                if let Some(tag) = &switch.tag {
                    self.write(" ");
                    self.expr(tag);
                }
                self.write(" {");
                self.newline();
                for clause in &switch.clauses {
                    self.case_clause(clause);
                }
                self.indent();
                self.write("}");
            }
            Stmt::TypeSwitch(switch) => {
                self.write("switch ");
                if let Some(init) = &switch.init {
                    self.stmt(init);
                    self.write("; ");
                }
                self.stmt(&switch.assign);
                self.write(" {");
                self.newline();
                for clause in &switch.clauses {
                    self.case_clause(clause);
                }
                self.indent();
                self.write("}");
            }
            Stmt::Select(select) => {
                self.write("select {");
                self.newline();
                for clause in &select.clauses {
                    self.comm_clause(clause);
                }
                self.indent();
                self.write("}");
            }
            Stmt::For(stmt) => {
                self.write("for ");
                if stmt.init.is_none() && stmt.post.is_none() {
                    if let Some(cond) = &stmt.cond {
                        self.expr(cond);
                        self.write(" ");
                    }
                } else {
                    if let Some(init) = &stmt.init {
                        self.stmt(init);
                    }
                    self.write("; ");
                    if let Some(cond) = &stmt.cond {
                        self.expr(cond);
                    }
                    self.write(";");
                    if let Some(post) = &stmt.post {
                        self.write(" ");
                        self.stmt(post);
                    }
                    self.write(" ");
                }
                self.block(&stmt.body);
            }
            Stmt::Range(stmt) => {
                self.write("for ");
                if let Some(key) = &stmt.key {
                    self.expr(key);
                    if let Some(value) = &stmt.value {
                        self.write(", ");
                        self.expr(value);
                    }
                    self.write(if stmt.define { " := " } else { " = " });
                }
                self.write("range ");
                self.expr(&stmt.x);
                self.write(" ");
                self.block(&stmt.body);
            }
        }
    }

    fn if_stmt(&mut self, stmt: &IfStmt) {
        self.write("if ");
        if let Some(init) = &stmt.init {
            self.stmt(init);
            self.write("; ");
        }
        self.expr(&stmt.cond);
        self.write(" ");
        self.block(&stmt.then);
        match stmt.otherwise.as_deref() {
            Some(Else::Block(block)) => {
                self.write(" else ");
                self.block(block);
            }
            Some(Else::If(nested)) => {
                self.write(" else ");
                self.if_stmt(nested);
            }
            None => {}
        }
    }

    fn case_clause(&mut self, clause: &CaseClause) {
        self.indent();
        match &clause.label {
            CaseLabel::Exprs(exprs) => {
                self.write("case ");
                self.expr_list(exprs);
            }
            CaseLabel::Default => self.write("default"),
        }
        self.write(":");
        self.newline();
        self.depth += 1;
        self.stmt_list(&clause.body);
        self.depth -= 1;
    }

    fn comm_clause(&mut self, clause: &CommClause) {
        self.indent();
        match &clause.label {
            CommLabel::Comm(comm) => {
                self.write("case ");
                self.stmt(comm);
            }
            CommLabel::Default => self.write("default"),
        }
        self.write(":");
        self.newline();
        self.depth += 1;
        self.stmt_list(&clause.body);
        self.depth -= 1;
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expr_list(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.expr(expr);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        self.expr_prec(expr, 0);
    }

    fn expr_prec(&mut self, expr: &Expr, min: u8) {
        let wrap = precedence(expr) < min;
        if wrap {
            self.write("(");
        }
        self.expr_inner(expr);
        if wrap {
            self.write(")");
        }
    }

    fn expr_inner(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(ident) => self.write(&ident.name),
            Expr::BasicLit(lit) => self.write(&lit.value),
            Expr::CompositeLit { ty, elts } => {
                if let Some(ty) = ty {
                    self.expr_prec(ty, PRIMARY_PRECEDENCE);
                }
                self.write("{");
                self.expr_list(elts);
                self.write("}");
            }
            Expr::FuncLit { ty, body } => {
                self.write("func");
                self.signature(ty);
                self.write(" ");
                self.block(body);
            }
            Expr::Paren(x) => {
                self.write("(");
                self.expr(x);
                self.write(")");
            }
            Expr::Selector { x, sel } => {
                self.expr_prec(x, PRIMARY_PRECEDENCE);
                self.write(".");
                self.write(&sel.name);
            }
            Expr::Index { x, indices } => {
                self.expr_prec(x, PRIMARY_PRECEDENCE);
                self.write("[");
                self.expr_list(indices);
                self.write("]");
            }
            Expr::Slice { x, low, high, max } => {
                self.expr_prec(x, PRIMARY_PRECEDENCE);
                self.write("[");
                if let Some(low) = low {
                    self.expr(low);
                }
                self.write(":");
                if let Some(high) = high {
                    self.expr(high);
                }
                if let Some(max) = max {
                    self.write(":");
                    self.expr(max);
                }
                self.write("]");
            }
            Expr::TypeAssert { x, ty } => {
                self.expr_prec(x, PRIMARY_PRECEDENCE);
                self.write(".(");
                match ty {
                    Some(ty) => self.expr(ty),
                    None => self.write("type"),
                }
                self.write(")");
            }
            Expr::Call { fun, args, spread } => {
                self.expr_prec(fun, PRIMARY_PRECEDENCE);
                self.write("(");
                self.expr_list(args);
                if *spread {
                    self.write("...");
                }
                self.write(")");
            }
            Expr::Star(x) => {
                self.write("*");
                self.expr_prec(x, UNARY_PRECEDENCE);
            }
            Expr::Unary { op, x, .. } => {
                let text = op.as_str();
                self.write(text);
                if glues(text, x) {
                    self.write(" ");
                }
                self.expr_prec(x, UNARY_PRECEDENCE);
            }
            Expr::Binary { x, op, y } => {
                let prec = binary_precedence(*op);
                self.expr_prec(x, prec);
                self.write(" ");
                self.write(op.as_str());
                self.write(" ");
                self.expr_prec(y, prec + 1);
            }
            Expr::KeyValue { key, value } => {
                self.expr(key);
                self.write(": ");
                self.expr(value);
            }
            Expr::ArrayType { len, elt } => {
                self.write("[");
                if let Some(len) = len {
                    self.expr(len);
                }
                self.write("]");
                self.expr(elt);
            }
            Expr::StructType { fields } => {
                if fields.is_empty() {
                    self.write("struct{}");
                    return;
                }
                self.write("struct {");
                self.newline();
                self.depth += 1;
                for field in fields {
                    self.indent();
                    self.field(field);
                    self.newline();
                }
                self.depth -= 1;
                self.indent();
                self.write("}");
            }
            Expr::FuncType(ty) => {
                self.write("func");
                self.signature(ty);
            }
            Expr::InterfaceType { methods } => {
                if methods.is_empty() {
                    self.write("interface{}");
                    return;
                }
                self.write("interface {");
                self.newline();
                self.depth += 1;
                for method in methods {
                    self.indent();
                    self.interface_elem(method);
                    self.newline();
                }
                self.depth -= 1;
                self.indent();
                self.write("}");
            }
            Expr::MapType { key, value } => {
                self.write("map[");
                self.expr(key);
                self.write("]");
                self.expr(value);
            }
            Expr::ChanType { dir, value } => {
                self.write(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.expr(value);
            }
            Expr::Ellipsis(elt) => {
                self.write("...");
                if let Some(elt) = elt {
                    self.expr(elt);
                }
            }
        }
    }

    /// Interface methods print as `Name(params) results`; embedded types as-is.
    fn interface_elem(&mut self, field: &Field) {
        match (&field.names[..], &field.ty) {
            ([name], Expr::FuncType(ty)) => {
                self.write(&name.name);
                self.signature(ty);
            }
            _ => self.field(field),
        }
    }
}
