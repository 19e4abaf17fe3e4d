// Export modules for library usage
pub mod analysis;
pub mod cli;
pub mod config;
pub mod errors;
pub mod instrument;
pub mod io;
pub mod oracle;
pub mod syntax;

// Re-export commonly used types
pub use crate::analysis::{
    analyze_file, analyze_targets, AnalysisResults, AnalysisTarget, AnalysisTargets,
    AnalysisUnit, AnalyzedFunction, AnalyzedType, TypePool,
};

pub use crate::config::{BackendKind, IdPolicyKind, InstrumentConfig, OracleConfig, SeedprobeConfig};

pub use crate::errors::{Error, Result};

pub use crate::instrument::{
    instrument_package, instrument_sources, CounterBackend, CounterId, InstrumentationResult,
    InstrumentationTarget,
};

pub use crate::oracle::{CommandOracle, DumpOracle, MemoryOracle, SemanticOracle};

pub use crate::syntax::{print_file, SourceFile};
