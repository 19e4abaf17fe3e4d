//! Literal constant harvesting for fuzzing seeds.

use std::collections::BTreeMap;

use crate::syntax::types::{default_type_name, is_primitive_name};
use crate::syntax::visit::{self, Visit};
use crate::syntax::{Block, Constant, Expr, UnaryOp};

/// Collects literal values bucketed by primitive type name.
///
/// Duplicates are kept: how often a value appears is itself a seed signal.
#[derive(Debug, Default)]
pub struct ConstantHarvester {
    buckets: BTreeMap<String, Vec<String>>,
}

impl ConstantHarvester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn harvest(body: &Block) -> BTreeMap<String, Vec<String>> {
        let mut harvester = Self::new();
        harvester.visit_block(body);
        harvester.finish()
    }

    pub fn finish(self) -> BTreeMap<String, Vec<String>> {
        self.buckets
    }

    fn record(&mut self, constant: &Constant) {
        let type_name = default_type_name(&constant.type_name);
        if !is_primitive_name(type_name) {
            tracing::trace!(type_name, "skipping non-primitive constant");
            return;
        }
        self.buckets
            .entry(type_name.to_string())
            .or_default()
            .push(constant.value.clone());
    }
}

impl<'ast> Visit<'ast> for ConstantHarvester {
    fn visit_expr(&mut self, expr: &'ast Expr) {
        match expr {
            Expr::BasicLit(lit) => {
                if let Some(constant) = &lit.constant {
                    self.record(constant);
                }
            }
            // Signed literals are one seed, not a literal plus its negation.
            Expr::Unary {
                op: UnaryOp::Neg | UnaryOp::Plus,
                x,
                constant: Some(constant),
            } if matches!(**x, Expr::BasicLit(_)) => self.record(constant),
            _ => visit::walk_expr(self, expr),
        }
    }
}
