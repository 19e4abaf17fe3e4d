//! Branch-coverage instrumentation of a Go package.
//!
//! [`instrument_package`] loads every source file of the target package
//! through the oracle, rewrites them with one [`Instrumenter`], prints them
//! and writes the result into a fresh copy of the enclosing module. Any
//! failure aborts the run before the copy is kept; there is no partial
//! output.

pub mod backend;
pub mod rewriter;
pub mod workspace;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use backend::{
    backend_from_config, CounterBackend, CounterId, FunctionPatch, GeneratedFile, IdAllocator,
    IdPolicy, TableBackend, TraceBackend,
};
pub use rewriter::Instrumenter;
pub use workspace::{find_module_root, ModuleCopy};

use crate::config::InstrumentConfig;
use crate::errors::{Error, Result};
use crate::io::find_package_files;
use crate::oracle::SemanticOracle;
use crate::syntax::{print_file, SourceFile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentationTarget {
    /// Directory of the package to instrument.
    pub target_module_path: PathBuf,
    #[serde(default)]
    pub tracked_function_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentationResult {
    pub instrumented_package_path: PathBuf,
    pub instrumented_module_copy_path: PathBuf,
    pub tracked_function_to_counter_ids: BTreeMap<String, Vec<CounterId>>,
}

/// One rewritten source file, already printed.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentedFile {
    pub file_name: String,
    pub source: String,
}

/// In-memory result of rewriting a package.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentedPackage {
    pub package_name: String,
    /// Rewritten originals followed by backend support files.
    pub files: Vec<InstrumentedFile>,
    pub function_to_counters: BTreeMap<String, Vec<CounterId>>,
    pub probes: u64,
}

/// Rewrite already-loaded package files, in the given order.
pub fn instrument_sources(
    sources: &[(String, SourceFile)],
    config: &InstrumentConfig,
    tracked: &[String],
) -> Result<InstrumentedPackage> {
    let package_name = package_name_of(sources)?;
    let backend = backend_from_config(config);
    let mut instrumenter = Instrumenter::new(
        backend.as_ref(),
        IdPolicy::from_config(config),
        tracked.iter().cloned(),
    );

    let mut files = Vec::with_capacity(sources.len() + 1);
    for (file_name, source) in sources {
        let _span = tracing::debug_span!("instrument_file", file = %file_name).entered();
        let rewritten = instrumenter.instrument_file(source)?;
        files.push(InstrumentedFile {
            file_name: file_name.clone(),
            source: print_file(&rewritten),
        });
    }

    for generated in backend.support_files(&package_name) {
        if sources.iter().any(|(name, _)| *name == generated.file_name) {
            return Err(Error::Instrumentation(format!(
                "package already contains a file named {}",
                generated.file_name
            )));
        }
        files.push(InstrumentedFile {
            file_name: generated.file_name,
            source: print_file(&generated.file),
        });
    }

    let probes = instrumenter.probes_emitted();
    let function_to_counters = instrumenter.finish();
    for name in tracked {
        if !function_to_counters.contains_key(name) {
            tracing::warn!(function = %name, "tracked function not found in package");
        }
    }

    Ok(InstrumentedPackage {
        package_name,
        files,
        function_to_counters,
        probes,
    })
}

fn package_name_of(sources: &[(String, SourceFile)]) -> Result<String> {
    let (_, first) = sources
        .first()
        .ok_or_else(|| Error::Instrumentation("package has no Go source files".to_string()))?;
    if let Some((name, other)) = sources
        .iter()
        .find(|(_, file)| file.package_name != first.package_name)
    {
        return Err(Error::Instrumentation(format!(
            "{} declares package {} but the package is {}",
            name, other.package_name, first.package_name
        )));
    }
    Ok(first.package_name.clone())
}

/// Instrument the package at `target.target_module_path`.
pub fn instrument_package(
    oracle: &dyn SemanticOracle,
    target: &InstrumentationTarget,
    config: &InstrumentConfig,
) -> Result<InstrumentationResult> {
    let package_dir = target.target_module_path.as_path();
    let _span =
        tracing::debug_span!("instrument_package", package = %package_dir.display()).entered();

    let module_root = find_module_root(package_dir)?;
    let package_dir = package_dir
        .canonicalize()
        .map_err(|e| Error::io(package_dir, e))?;
    let relative = package_dir
        .strip_prefix(&module_root)
        .map_err(|e| Error::workspace(&package_dir, e.to_string()))?
        .to_path_buf();

    let paths = find_package_files(&package_dir, &config.exclude_patterns)?;
    let sources = paths
        .par_iter()
        .map(|path| Ok((file_name(path)?, oracle.load(path)?)))
        .collect::<Result<Vec<_>>>()?;

    let package = instrument_sources(&sources, config, &target.tracked_function_names)?;

    let output_root = config
        .output_root
        .clone()
        .unwrap_or_else(std::env::temp_dir);
    let copy = ModuleCopy::create(&module_root, &output_root)?;
    for file in &package.files {
        copy.write(&relative.join(&file.file_name), &file.source)?;
    }
    let copy_root = copy.persist();

    tracing::info!(
        files = sources.len(),
        probes = package.probes,
        copy = %copy_root.display(),
        "instrumentation finished"
    );

    Ok(InstrumentationResult {
        instrumented_package_path: copy_root.join(&relative),
        instrumented_module_copy_path: copy_root,
        tracked_function_to_counter_ids: package.function_to_counters,
    })
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Instrumentation(format!("{} has no file name", path.display())))
}
