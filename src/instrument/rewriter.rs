//! Probe placement.
//!
//! One [`Instrumenter`] owns all mutable state of a run: the id allocator,
//! the function currently being rewritten and the attribution map. Nothing
//! is global, so independent packages can be instrumented on separate
//! threads with separate instances.
//!
//! Placement rules:
//!
//! - every statement list gets a probe before each statement up to and
//!   including the first `return`; an empty list gets exactly one probe
//! - an `if` without `else` gains an empty `else`; an `else if` is wrapped in
//!   a block so the chain link has its own probe
//! - expression and type switches gain an empty `default` when missing
//! - `select` never gains a `default`, since that would make it non-blocking
//! - loop bodies are instrumented as plain blocks
//! - function literals are instrumented as part of the enclosing function

use std::collections::{BTreeMap, BTreeSet};

use super::backend::{CounterBackend, CounterId, FunctionPatch, IdAllocator, IdPolicy};
use crate::errors::Result;
use crate::syntax::{
    Block, CaseClause, CaseLabel, CommClause, CommLabel, Decl, Else, Expr, FuncDecl, GenDecl,
    GenKind, IfStmt, SourceFile, Spec, Stmt,
};

pub struct Instrumenter<'b> {
    backend: &'b dyn CounterBackend,
    ids: IdAllocator,
    current_function: Option<String>,
    tracked: BTreeSet<String>,
    function_to_counters: BTreeMap<String, Vec<CounterId>>,
}

impl<'b> Instrumenter<'b> {
    pub fn new(
        backend: &'b dyn CounterBackend,
        policy: IdPolicy,
        tracked: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            backend,
            ids: IdAllocator::new(policy),
            current_function: None,
            tracked: tracked.into_iter().collect(),
            function_to_counters: BTreeMap::new(),
        }
    }

    /// Probe ids attributed to each tracked function, in insertion order.
    pub fn finish(self) -> BTreeMap<String, Vec<CounterId>> {
        self.function_to_counters
    }

    pub fn probes_emitted(&self) -> u64 {
        self.ids.allocated()
    }

    /// Functions are tracked by bare name, methods only as `Receiver.Method`.
    fn is_tracked(&self, name: &str) -> bool {
        self.tracked.contains(name)
    }

    // ========================================================================
    // Files and declarations
    // ========================================================================

    pub fn instrument_file(&mut self, file: &SourceFile) -> Result<SourceFile> {
        let mut decls = Vec::with_capacity(file.decls.len());
        for decl in &file.decls {
            match decl {
                Decl::Func(func) => match self.instrument_func(func)? {
                    Some(FunctionPatch::Replace(func)) => decls.push(Decl::Func(func)),
                    Some(FunctionPatch::Shadow { original, shadow }) => {
                        decls.push(Decl::Func(original));
                        decls.push(Decl::Func(shadow));
                    }
                    None => decls.push(decl.clone()),
                },
                Decl::Gen(gen) if gen.kind != GenKind::Import && self.backend.covers(false) => {
                    self.current_function = None;
                    decls.push(Decl::Gen(self.gen_decl(gen.clone())?));
                }
                Decl::Gen(_) => decls.push(decl.clone()),
            }
        }
        Ok(SourceFile {
            package_name: file.package_name.clone(),
            package_path: file.package_path.clone(),
            decls,
        })
    }

    /// `None` when the function is left as is.
    pub fn instrument_func(&mut self, func: &FuncDecl) -> Result<Option<FunctionPatch>> {
        let Some(body) = &func.body else {
            return Ok(None);
        };
        let name = func.qualified_name();
        let tracked = self.is_tracked(&name);
        if !self.backend.covers(tracked) {
            return Ok(None);
        }

        let _span = tracing::trace_span!("instrument_func", function = %name, tracked).entered();
        self.current_function = tracked.then_some(name);

        let mut instrumented = func.clone();
        instrumented.body = Some(self.block(body.clone())?);
        self.current_function = None;

        Ok(Some(self.backend.finalize(func.clone(), instrumented)))
    }

    fn gen_decl(&mut self, mut gen: GenDecl) -> Result<GenDecl> {
        for spec in &mut gen.specs {
            if let Spec::Value(value) = spec {
                value.values = self.exprs(std::mem::take(&mut value.values))?;
            }
        }
        Ok(gen)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn probe(&mut self) -> Result<Vec<Stmt>> {
        let id = self.ids.next_id();
        if let Some(function) = &self.current_function {
            self.function_to_counters
                .entry(function.clone())
                .or_default()
                .push(id);
        }
        self.backend.emit_probe(&id)
    }

    fn block(&mut self, block: Block) -> Result<Block> {
        Ok(Block::new(self.stmt_list(block.stmts)?))
    }

    fn stmt_list(&mut self, stmts: Vec<Stmt>) -> Result<Vec<Stmt>> {
        if stmts.is_empty() {
            return self.probe();
        }
        let mut out = Vec::with_capacity(stmts.len() * 2);
        let mut reachable = true;
        for stmt in stmts {
            if reachable {
                out.extend(self.probe()?);
            }
            let returns = stmt.is_return();
            out.push(self.stmt(stmt)?);
            if returns {
                reachable = false;
            }
        }
        Ok(out)
    }

    fn boxed_stmt(&mut self, stmt: Box<Stmt>) -> Result<Box<Stmt>> {
        Ok(Box::new(self.stmt(*stmt)?))
    }

    fn opt_stmt(&mut self, stmt: Option<Box<Stmt>>) -> Result<Option<Box<Stmt>>> {
        stmt.map(|stmt| self.boxed_stmt(stmt)).transpose()
    }

    fn stmt(&mut self, stmt: Stmt) -> Result<Stmt> {
        Ok(match stmt {
            Stmt::Decl(gen) => Stmt::Decl(self.gen_decl(gen)?),
            Stmt::Empty | Stmt::Branch { .. } => stmt,
            Stmt::Labeled { label, stmt } => Stmt::Labeled {
                label,
                stmt: self.boxed_stmt(stmt)?,
            },
            Stmt::Expr(expr) => Stmt::Expr(self.expr(expr)?),
            Stmt::Send { chan, value } => Stmt::Send {
                chan: self.expr(chan)?,
                value: self.expr(value)?,
            },
            Stmt::IncDec { x, op } => Stmt::IncDec {
                x: self.expr(x)?,
                op,
            },
            Stmt::Assign { lhs, op, rhs } => Stmt::Assign {
                lhs: self.exprs(lhs)?,
                op,
                rhs: self.exprs(rhs)?,
            },
            Stmt::Go(call) => Stmt::Go(self.expr(call)?),
            Stmt::Defer(call) => Stmt::Defer(self.expr(call)?),
            Stmt::Return(results) => Stmt::Return(self.exprs(results)?),
            Stmt::Block(block) => Stmt::Block(self.block(block)?),
            Stmt::If(stmt) => Stmt::If(self.if_stmt(stmt)?),
            Stmt::Switch(mut switch) => {
                switch.init = self.opt_stmt(switch.init)?;
                switch.tag = self.opt_expr(switch.tag)?;
                switch.clauses = self.case_clauses(switch.clauses)?;
                Stmt::Switch(switch)
            }
            Stmt::TypeSwitch(mut switch) => {
                switch.init = self.opt_stmt(switch.init)?;
                switch.assign = self.boxed_stmt(switch.assign)?;
                switch.clauses = self.case_clauses(switch.clauses)?;
                Stmt::TypeSwitch(switch)
            }
            Stmt::Select(mut select) => {
                select.clauses = select
                    .clauses
                    .into_iter()
                    .map(|clause| self.comm_clause(clause))
                    .collect::<Result<_>>()?;
                Stmt::Select(select)
            }
            Stmt::For(mut stmt) => {
                stmt.init = self.opt_stmt(stmt.init)?;
                stmt.cond = self.opt_expr(stmt.cond)?;
                stmt.post = self.opt_stmt(stmt.post)?;
                stmt.body = self.block(stmt.body)?;
                Stmt::For(stmt)
            }
            Stmt::Range(mut stmt) => {
                stmt.x = self.expr(stmt.x)?;
                stmt.body = self.block(stmt.body)?;
                Stmt::Range(stmt)
            }
        })
    }

    fn if_stmt(&mut self, stmt: IfStmt) -> Result<IfStmt> {
        let init = self.opt_stmt(stmt.init)?;
        let cond = self.expr(stmt.cond)?;
        let then = self.block(stmt.then)?;
        let otherwise = match stmt.otherwise.map(|otherwise| *otherwise) {
            None => Else::Block(self.block(Block::default())?),
            Some(Else::Block(block)) => Else::Block(self.block(block)?),
            Some(Else::If(nested)) => {
                Else::Block(self.block(Block::new(vec![Stmt::If(nested)]))?)
            }
        };
        Ok(IfStmt {
            init,
            cond,
            then,
            otherwise: Some(Box::new(otherwise)),
        })
    }

    fn case_clauses(&mut self, mut clauses: Vec<CaseClause>) -> Result<Vec<CaseClause>> {
        if !clauses.iter().any(CaseClause::is_default) {
            clauses.push(CaseClause::default_case(Vec::new()));
        }
        clauses
            .into_iter()
            .map(|clause| {
                let label = match clause.label {
                    CaseLabel::Exprs(exprs) => CaseLabel::Exprs(self.exprs(exprs)?),
                    CaseLabel::Default => CaseLabel::Default,
                };
                Ok(CaseClause {
                    label,
                    body: self.stmt_list(clause.body)?,
                })
            })
            .collect()
    }

    fn comm_clause(&mut self, clause: CommClause) -> Result<CommClause> {
        let label = match clause.label {
            CommLabel::Comm(comm) => CommLabel::Comm(self.boxed_stmt(comm)?),
            CommLabel::Default => CommLabel::Default,
        };
        Ok(CommClause {
            label,
            body: self.stmt_list(clause.body)?,
        })
    }

    // ========================================================================
    // Expressions: only function literals change
    // ========================================================================

    fn exprs(&mut self, exprs: Vec<Expr>) -> Result<Vec<Expr>> {
        exprs.into_iter().map(|expr| self.expr(expr)).collect()
    }

    fn boxed(&mut self, expr: Box<Expr>) -> Result<Box<Expr>> {
        Ok(Box::new(self.expr(*expr)?))
    }

    fn opt_expr(&mut self, expr: Option<Expr>) -> Result<Option<Expr>> {
        expr.map(|expr| self.expr(expr)).transpose()
    }

    fn opt_boxed(&mut self, expr: Option<Box<Expr>>) -> Result<Option<Box<Expr>>> {
        expr.map(|expr| self.boxed(expr)).transpose()
    }

    fn expr(&mut self, expr: Expr) -> Result<Expr> {
        Ok(match expr {
            Expr::FuncLit { ty, body } => Expr::FuncLit {
                ty,
                body: self.block(body)?,
            },
            Expr::CompositeLit { ty, elts } => Expr::CompositeLit {
                ty,
                elts: self.exprs(elts)?,
            },
            Expr::Paren(x) => Expr::Paren(self.boxed(x)?),
            Expr::Selector { x, sel } => Expr::Selector {
                x: self.boxed(x)?,
                sel,
            },
            Expr::Index { x, indices } => Expr::Index {
                x: self.boxed(x)?,
                indices: self.exprs(indices)?,
            },
            Expr::Slice { x, low, high, max } => Expr::Slice {
                x: self.boxed(x)?,
                low: self.opt_boxed(low)?,
                high: self.opt_boxed(high)?,
                max: self.opt_boxed(max)?,
            },
            Expr::TypeAssert { x, ty } => Expr::TypeAssert {
                x: self.boxed(x)?,
                ty,
            },
            Expr::Call { fun, args, spread } => Expr::Call {
                fun: self.boxed(fun)?,
                args: self.exprs(args)?,
                spread,
            },
            Expr::Star(x) => Expr::Star(self.boxed(x)?),
            Expr::Unary { op, x, constant } => Expr::Unary {
                op,
                x: self.boxed(x)?,
                constant,
            },
            Expr::Binary { x, op, y } => Expr::Binary {
                x: self.boxed(x)?,
                op,
                y: self.boxed(y)?,
            },
            Expr::KeyValue { key, value } => Expr::KeyValue {
                key: self.boxed(key)?,
                value: self.boxed(value)?,
            },
            Expr::Ident(_)
            | Expr::BasicLit(_)
            | Expr::ArrayType { .. }
            | Expr::StructType { .. }
            | Expr::FuncType(_)
            | Expr::InterfaceType { .. }
            | Expr::MapType { .. }
            | Expr::ChanType { .. }
            | Expr::Ellipsis(_) => expr,
        })
    }
}
