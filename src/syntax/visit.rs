//! Read-only traversal over the syntax tree.
//!
//! Each `visit_*` method defaults to the matching `walk_*` function, which
//! recurses into the node's children in source order. Override a method to
//! observe a node and call the `walk_*` function to keep descending.

use super::{
    Block, CaseClause, CaseLabel, CommClause, CommLabel, Decl, Else, Expr, Field, FuncDecl,
    FuncType, GenDecl, Ident, IfStmt, Spec, Stmt,
};

pub trait Visit<'ast> {
    fn visit_decl(&mut self, decl: &'ast Decl) {
        walk_decl(self, decl);
    }

    fn visit_func_decl(&mut self, func: &'ast FuncDecl) {
        walk_func_decl(self, func);
    }

    fn visit_gen_decl(&mut self, gen: &'ast GenDecl) {
        walk_gen_decl(self, gen);
    }

    fn visit_field(&mut self, field: &'ast Field) {
        walk_field(self, field);
    }

    fn visit_block(&mut self, block: &'ast Block) {
        walk_block(self, block);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_if(&mut self, stmt: &'ast IfStmt) {
        walk_if(self, stmt);
    }

    fn visit_case_clause(&mut self, clause: &'ast CaseClause) {
        walk_case_clause(self, clause);
    }

    fn visit_comm_clause(&mut self, clause: &'ast CommClause) {
        walk_comm_clause(self, clause);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }

    fn visit_ident(&mut self, _ident: &'ast Ident) {}
}

pub fn walk_decl<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, decl: &'ast Decl) {
    match decl {
        Decl::Func(func) => v.visit_func_decl(func),
        Decl::Gen(gen) => v.visit_gen_decl(gen),
    }
}

pub fn walk_func_decl<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, func: &'ast FuncDecl) {
    if let Some(receiver) = &func.receiver {
        v.visit_field(receiver);
    }
    for param in &func.type_params {
        v.visit_field(param);
    }
    walk_func_type(v, &func.signature);
    if let Some(body) = &func.body {
        v.visit_block(body);
    }
}

pub fn walk_func_type<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, ty: &'ast FuncType) {
    for field in ty.params.iter().chain(&ty.results) {
        v.visit_field(field);
    }
}

pub fn walk_gen_decl<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, gen: &'ast GenDecl) {
    for spec in &gen.specs {
        match spec {
            Spec::Import(_) => {}
            Spec::Value(value) => {
                for name in &value.names {
                    v.visit_ident(name);
                }
                if let Some(ty) = &value.ty {
                    v.visit_expr(ty);
                }
                for expr in &value.values {
                    v.visit_expr(expr);
                }
            }
            Spec::Type(ty) => {
                v.visit_ident(&ty.name);
                for param in &ty.type_params {
                    v.visit_field(param);
                }
                v.visit_expr(&ty.ty);
            }
        }
    }
}

/// Field names are declarations, not references, so only the type is walked.
pub fn walk_field<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, field: &'ast Field) {
    v.visit_expr(&field.ty);
}

pub fn walk_block<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, block: &'ast Block) {
    for stmt in &block.stmts {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, stmt: &'ast Stmt) {
    match stmt {
        Stmt::Decl(gen) => v.visit_gen_decl(gen),
        Stmt::Empty | Stmt::Branch { .. } => {}
        Stmt::Labeled { stmt, .. } => v.visit_stmt(stmt),
        Stmt::Expr(expr) | Stmt::Go(expr) | Stmt::Defer(expr) => v.visit_expr(expr),
        Stmt::Send { chan, value } => {
            v.visit_expr(chan);
            v.visit_expr(value);
        }
        Stmt::IncDec { x, .. } => v.visit_expr(x),
        Stmt::Assign { lhs, rhs, .. } => {
            for expr in lhs.iter().chain(rhs) {
                v.visit_expr(expr);
            }
        }
        Stmt::Return(results) => {
            for expr in results {
                v.visit_expr(expr);
            }
        }
        Stmt::Block(block) => v.visit_block(block),
        Stmt::If(stmt) => v.visit_if(stmt),
        Stmt::Switch(switch) => {
            if let Some(init) = &switch.init {
                v.visit_stmt(init);
            }
            if let Some(tag) = &switch.tag {
                v.visit_expr(tag);
            }
            for clause in &switch.clauses {
                v.visit_case_clause(clause);
            }
        }
        Stmt::TypeSwitch(switch) => {
            if let Some(init) = &switch.init {
                v.visit_stmt(init);
            }
            v.visit_stmt(&switch.assign);
            for clause in &switch.clauses {
                v.visit_case_clause(clause);
            }
        }
        Stmt::Select(select) => {
            for clause in &select.clauses {
                v.visit_comm_clause(clause);
            }
        }
        Stmt::For(stmt) => {
            if let Some(init) = &stmt.init {
                v.visit_stmt(init);
            }
            if let Some(cond) = &stmt.cond {
                v.visit_expr(cond);
            }
            if let Some(post) = &stmt.post {
                v.visit_stmt(post);
            }
            v.visit_block(&stmt.body);
        }
        Stmt::Range(stmt) => {
            if let Some(key) = &stmt.key {
                v.visit_expr(key);
            }
            if let Some(value) = &stmt.value {
                v.visit_expr(value);
            }
            v.visit_expr(&stmt.x);
            v.visit_block(&stmt.body);
        }
    }
}

pub fn walk_if<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, stmt: &'ast IfStmt) {
    if let Some(init) = &stmt.init {
        v.visit_stmt(init);
    }
    v.visit_expr(&stmt.cond);
    v.visit_block(&stmt.then);
    match stmt.otherwise.as_deref() {
        Some(Else::Block(block)) => v.visit_block(block),
        Some(Else::If(nested)) => v.visit_if(nested),
        None => {}
    }
}

pub fn walk_case_clause<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, clause: &'ast CaseClause) {
    if let CaseLabel::Exprs(exprs) = &clause.label {
        for expr in exprs {
            v.visit_expr(expr);
        }
    }
    for stmt in &clause.body {
        v.visit_stmt(stmt);
    }
}

pub fn walk_comm_clause<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, clause: &'ast CommClause) {
    if let CommLabel::Comm(comm) = &clause.label {
        v.visit_stmt(comm);
    }
    for stmt in &clause.body {
        v.visit_stmt(stmt);
    }
}

pub fn walk_expr<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, expr: &'ast Expr) {
    match expr {
        Expr::Ident(ident) => v.visit_ident(ident),
        Expr::BasicLit(_) => {}
        Expr::CompositeLit { ty, elts } => {
            if let Some(ty) = ty {
                v.visit_expr(ty);
            }
            for elt in elts {
                v.visit_expr(elt);
            }
        }
        Expr::FuncLit { ty, body } => {
            walk_func_type(v, ty);
            v.visit_block(body);
        }
        Expr::Paren(x) | Expr::Star(x) => v.visit_expr(x),
        Expr::Selector { x, sel } => {
            v.visit_expr(x);
            v.visit_ident(sel);
        }
        Expr::Index { x, indices } => {
            v.visit_expr(x);
            for index in indices {
                v.visit_expr(index);
            }
        }
        Expr::Slice { x, low, high, max } => {
            v.visit_expr(x);
            for bound in [low, high, max].into_iter().flatten() {
                v.visit_expr(bound);
            }
        }
        Expr::TypeAssert { x, ty } => {
            v.visit_expr(x);
            if let Some(ty) = ty {
                v.visit_expr(ty);
            }
        }
        Expr::Call { fun, args, .. } => {
            v.visit_expr(fun);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        Expr::Unary { x, .. } => v.visit_expr(x),
        Expr::Binary { x, y, .. } => {
            v.visit_expr(x);
            v.visit_expr(y);
        }
        Expr::KeyValue { key, value } => {
            v.visit_expr(key);
            v.visit_expr(value);
        }
        Expr::ArrayType { len, elt } => {
            if let Some(len) = len {
                v.visit_expr(len);
            }
            v.visit_expr(elt);
        }
        Expr::StructType { fields } => {
            for field in fields {
                v.visit_field(field);
            }
        }
        Expr::FuncType(ty) => walk_func_type(v, ty),
        Expr::InterfaceType { methods } => {
            for method in methods {
                v.visit_field(method);
            }
        }
        Expr::MapType { key, value } => {
            v.visit_expr(key);
            v.visit_expr(value);
        }
        Expr::ChanType { value, .. } => v.visit_expr(value),
        Expr::Ellipsis(elt) => {
            if let Some(elt) = elt {
                v.visit_expr(elt);
            }
        }
    }
}
