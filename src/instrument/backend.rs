//! Counter backends and probe id allocation.
//!
//! The rewriter decides *where* probes go; a [`CounterBackend`] decides what
//! a probe looks like and how an instrumented function is spliced back into
//! the file.

use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh64::xxh64;

use crate::config::{BackendKind, IdPolicyKind, InstrumentConfig};
use crate::errors::{Error, Result};
use crate::syntax::{
    AssignOp, BinaryOp, Block, Decl, Expr, Field, FuncDecl, GenDecl, GenKind, Ident, IfStmt,
    IncDecOp, SourceFile, Spec, Stmt, ValueSpec,
};

// ============================================================================
// Probe ids
// ============================================================================

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CounterId(pub u64);

impl fmt::Display for CounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPolicy {
    /// 1, 2, 3, ...
    Sequential,
    /// xxh64 of the sequence number, truncated to `bucket_bits` bits.
    Hashed { bucket_bits: u32 },
}

impl IdPolicy {
    pub fn from_config(config: &InstrumentConfig) -> Self {
        match config.id_policy {
            IdPolicyKind::Sequential => Self::Sequential,
            IdPolicyKind::Hashed => Self::Hashed {
                bucket_bits: config.hash_bucket_bits,
            },
        }
    }
}

/// Hands out probe ids for one instrumentation run.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    policy: IdPolicy,
    next: u64,
}

impl IdAllocator {
    pub fn new(policy: IdPolicy) -> Self {
        Self { policy, next: 1 }
    }

    pub fn next_id(&mut self) -> CounterId {
        let seq = self.next;
        self.next += 1;
        match self.policy {
            IdPolicy::Sequential => CounterId(seq),
            IdPolicy::Hashed { bucket_bits } => {
                let mask = if bucket_bits >= 64 {
                    u64::MAX
                } else {
                    (1u64 << bucket_bits) - 1
                };
                CounterId(xxh64(&seq.to_le_bytes(), 0) & mask)
            }
        }
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next - 1
    }
}

// ============================================================================
// Backend interface
// ============================================================================

/// How an instrumented function replaces its original.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionPatch {
    Replace(FuncDecl),
    /// Keep `original` and add `shadow` right after it.
    Shadow { original: FuncDecl, shadow: FuncDecl },
}

/// A file the backend adds to the instrumented package.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    pub file_name: String,
    pub file: SourceFile,
}

pub trait CounterBackend: Send + Sync {
    /// Whether a function (tracked or not) gets probes at all.
    /// Package-level initializers ask with `tracked = false`.
    fn covers(&self, tracked: bool) -> bool;

    /// Statements recording that the probe `id` executed.
    fn emit_probe(&self, id: &CounterId) -> Result<Vec<Stmt>>;

    fn finalize(&self, original: FuncDecl, instrumented: FuncDecl) -> FunctionPatch;

    fn support_files(&self, package_name: &str) -> Vec<GeneratedFile>;
}

pub fn backend_from_config(config: &InstrumentConfig) -> Box<dyn CounterBackend> {
    match config.backend {
        BackendKind::Table => Box::new(TableBackend::new(
            &config.counter_table_name,
            &config.table_file_name,
        )),
        BackendKind::Trace => Box::new(TraceBackend::new(
            &config.trace_parameter_name,
            config.max_trace_length,
        )),
    }
}

// ============================================================================
// Table backend
// ============================================================================

/// `<table>["<id>"]++` against one package-wide map.
#[derive(Debug, Clone)]
pub struct TableBackend {
    table_name: String,
    file_name: String,
}

impl TableBackend {
    pub fn new(table_name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            file_name: file_name.into(),
        }
    }
}

impl CounterBackend for TableBackend {
    fn covers(&self, _tracked: bool) -> bool {
        true
    }

    fn emit_probe(&self, id: &CounterId) -> Result<Vec<Stmt>> {
        Ok(vec![Stmt::IncDec {
            x: Expr::index(
                Expr::ident(&self.table_name),
                Expr::string_lit(&id.to_string()),
            ),
            op: IncDecOp::Inc,
        }])
    }

    fn finalize(&self, _original: FuncDecl, instrumented: FuncDecl) -> FunctionPatch {
        FunctionPatch::Replace(instrumented)
    }

    fn support_files(&self, package_name: &str) -> Vec<GeneratedFile> {
        let table = ValueSpec {
            names: vec![crate::syntax::Ident::new(&self.table_name)],
            ty: None,
            values: vec![Expr::call(
                Expr::ident("make"),
                vec![Expr::MapType {
                    key: Box::new(Expr::ident("string")),
                    value: Box::new(Expr::ident("int")),
                }],
            )],
        };
        let mut file = SourceFile::new(package_name, "");
        file.decls.push(Decl::Gen(GenDecl {
            kind: GenKind::Var,
            specs: vec![Spec::Value(table)],
            grouped: false,
        }));
        vec![GeneratedFile {
            file_name: self.file_name.clone(),
            file,
        }]
    }
}

// ============================================================================
// Trace backend
// ============================================================================

pub const TRACED_PREFIX: &str = "__traced_";
pub const TRACED_SUFFIX: &str = "__";

pub fn traced_name(name: &str) -> String {
    format!("{}{}{}", TRACED_PREFIX, name, TRACED_SUFFIX)
}

/// Bounded append of probe ids to a `*[]uint16` passed to a shadow function.
#[derive(Debug, Clone)]
pub struct TraceBackend {
    parameter_name: String,
    max_length: usize,
}

impl TraceBackend {
    pub fn new(parameter_name: impl Into<String>, max_length: usize) -> Self {
        Self {
            parameter_name: parameter_name.into(),
            max_length,
        }
    }

    fn trace(&self) -> Expr {
        Expr::star(Expr::ident(&self.parameter_name))
    }
}

impl CounterBackend for TraceBackend {
    fn covers(&self, tracked: bool) -> bool {
        tracked
    }

    fn emit_probe(&self, id: &CounterId) -> Result<Vec<Stmt>> {
        if id.0 > u64::from(u16::MAX) {
            return Err(Error::Instrumentation(format!(
                "probe id {} does not fit the uint16 trace",
                id
            )));
        }
        let append = Stmt::Assign {
            lhs: vec![self.trace()],
            op: AssignOp::Assign,
            rhs: vec![Expr::call(
                Expr::ident("append"),
                vec![self.trace(), Expr::int_lit(id.0)],
            )],
        };
        Ok(vec![Stmt::If(IfStmt {
            init: None,
            cond: Expr::binary(
                Expr::call(Expr::ident("len"), vec![self.trace()]),
                BinaryOp::Lss,
                Expr::int_lit(self.max_length as u64),
            ),
            then: Block::new(vec![append]),
            otherwise: None,
        })])
    }

    fn finalize(&self, original: FuncDecl, mut instrumented: FuncDecl) -> FunctionPatch {
        instrumented.name = traced_name(&original.name);

        // Go parameters are either all named or all unnamed.
        let params = &mut instrumented.signature.params;
        for field in params.iter_mut().filter(|field| field.names.is_empty()) {
            field.names.push(Ident::new("_"));
        }
        let trace = Field::new(
            &[self.parameter_name.as_str()],
            Expr::star(Expr::slice_of(Expr::ident("uint16"))),
        );
        // A variadic parameter has to stay last.
        let at = if instrumented.is_variadic() {
            instrumented.signature.params.len() - 1
        } else {
            instrumented.signature.params.len()
        };
        instrumented.signature.params.insert(at, trace);

        FunctionPatch::Shadow {
            original,
            shadow: instrumented,
        }
    }

    fn support_files(&self, _package_name: &str) -> Vec<GeneratedFile> {
        Vec::new()
    }
}
