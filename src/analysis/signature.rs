//! Per-file driver: select functions, filter, and build records.

use std::collections::BTreeMap;
use std::path::Path;

use super::constants::ConstantHarvester;
use super::imports::ImportResolver;
use super::support::{check_support, resolved_slot, Support};
use super::{classifier, AnalysisTarget, AnalysisUnit, AnalyzedFunction, AnalyzedVariable, TypePool};
use crate::errors::Result;
use crate::oracle::SemanticOracle;
use crate::syntax::{Field, FuncDecl, SourceFile};

/// Analyze one requested file.
pub fn analyze_file(oracle: &dyn SemanticOracle, target: &AnalysisTarget) -> Result<AnalysisUnit> {
    let path = target.file_path.as_path();
    let _span = tracing::debug_span!("analyze_file", file = %path.display()).entered();

    let file = oracle.load(path)?;
    analyze_source(&file, target)
}

/// Analyze an already-resolved tree for `target`.
pub fn analyze_source(file: &SourceFile, target: &AnalysisTarget) -> Result<AnalysisUnit> {
    let path = target.file_path.as_path();
    let selection = select_functions(file, target);

    let mut analyzed_functions = Vec::new();
    let mut not_supported_names = Vec::new();

    for func in selection.candidates {
        match check_support(func, path)? {
            Support::Supported => {
                analyzed_functions.push(analyze_function(func, path, &file.package_path)?);
            }
            Support::Unsupported(reason) => {
                tracing::debug!(function = %func.qualified_name(), %reason, "not supported");
                not_supported_names.push(func.qualified_name());
            }
        }
    }

    analyzed_functions.sort_by_key(|func| func.declaration_order);
    let mut not_found_names = selection.not_found;
    sort_names(&mut not_supported_names);
    sort_names(&mut not_found_names);

    Ok(AnalysisUnit {
        file_path: target.file_path.clone(),
        defining_module: file.package_path.clone(),
        analyzed_functions,
        not_supported_names,
        not_found_names,
    })
}

fn sort_names(names: &mut Vec<String>) {
    names.sort();
    names.dedup();
}

struct Selection<'a> {
    candidates: Vec<&'a FuncDecl>,
    not_found: Vec<String>,
}

/// Resolve requested names against the file's declarations.
fn select_functions<'a>(file: &'a SourceFile, target: &AnalysisTarget) -> Selection<'a> {
    if target.is_whole_file() {
        return Selection {
            candidates: file.functions().collect(),
            not_found: Vec::new(),
        };
    }

    let mut candidates = Vec::new();
    let mut not_found = Vec::new();

    for name in &target.target_function_names {
        match file
            .functions()
            .find(|func| func.receiver.is_none() && &func.name == name)
        {
            Some(func) => push_unique(&mut candidates, func),
            None => not_found.push(name.clone()),
        }
    }

    for name in &target.target_method_names {
        let found = file.functions().find(|func| {
            func.receiver.is_some() && (&func.qualified_name() == name || &func.name == name)
        });
        match found {
            Some(func) => push_unique(&mut candidates, func),
            None => not_found.push(name.clone()),
        }
    }

    Selection {
        candidates,
        not_found,
    }
}

fn push_unique<'a>(candidates: &mut Vec<&'a FuncDecl>, func: &'a FuncDecl) {
    if !candidates.iter().any(|seen| std::ptr::eq(*seen, func)) {
        candidates.push(func);
    }
}

/// Build the record for a function that passed the support filter.
pub fn analyze_function(
    func: &FuncDecl,
    file: &Path,
    package_path: &str,
) -> Result<AnalyzedFunction> {
    let mut type_pool = TypePool::new();

    let parameters = variables(&func.signature.params, func, file, "parameter", &mut type_pool)?;
    let results = variables(&func.signature.results, func, file, "result", &mut type_pool)?;

    let constants = func
        .body
        .as_ref()
        .map(ConstantHarvester::harvest)
        .unwrap_or_else(BTreeMap::new);

    Ok(AnalyzedFunction {
        name: func.qualified_name(),
        type_pool,
        receiver: None,
        parameters,
        results,
        constants,
        required_imports: ImportResolver::resolve(package_path, func),
        declaration_order: func.position,
    })
}

/// One variable per declared name; unnamed slots get an empty name.
fn variables(
    fields: &[Field],
    func: &FuncDecl,
    file: &Path,
    kind: &str,
    pool: &mut TypePool,
) -> Result<Vec<AnalyzedVariable>> {
    let mut out = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let resolved = resolved_slot(field, func, file, || format!("{} #{}", kind, index))?;
        let type_name = classifier::classify(resolved, pool);
        if field.names.is_empty() {
            out.push(AnalyzedVariable {
                name: String::new(),
                type_name,
            });
        } else {
            out.extend(field.names.iter().map(|ident| AnalyzedVariable {
                name: ident.name.clone(),
                type_name: type_name.clone(),
            }));
        }
    }
    Ok(out)
}
