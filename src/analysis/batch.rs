//! Parallel batch analysis.
//!
//! Files are independent: each gets its own type pools and accumulators, so
//! they are analyzed on the rayon pool and collected back in input order.
//! The first infrastructure failure aborts the batch.

use rayon::prelude::*;

use super::signature::analyze_file;
use super::{AnalysisResults, AnalysisTargets};
use crate::errors::Result;
use crate::oracle::SemanticOracle;

pub fn analyze_targets(
    oracle: &dyn SemanticOracle,
    targets: &AnalysisTargets,
) -> Result<AnalysisResults> {
    let results = targets
        .targets
        .par_iter()
        .map(|target| analyze_file(oracle, target))
        .collect::<Result<Vec<_>>>()?;

    let analyzed: usize = results
        .iter()
        .map(|unit| unit.analyzed_functions.len())
        .sum();
    tracing::info!(
        files = results.len(),
        functions = analyzed,
        "analysis finished"
    );

    Ok(AnalysisResults {
        results,
        int_size: oracle.int_size(),
    })
}
