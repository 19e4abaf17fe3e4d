//! Adapters for the semantic oracle.
//!
//! The oracle owns parsing and type checking of Go source. Everything here
//! only fetches the resolved tree it produces, either from a sidecar dump on
//! disk, from an external resolver process, or from memory.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::{OracleConfig, OracleKind};
use crate::errors::{Error, Result};
use crate::syntax::SourceFile;

/// Source of resolved syntax trees.
pub trait SemanticOracle: Send + Sync {
    /// Parse and resolve one source file.
    fn load(&self, path: &Path) -> Result<SourceFile>;

    /// Native `int` width in bits.
    fn int_size(&self) -> u32;
}

/// Build the oracle described by the configuration.
pub fn from_config(config: &OracleConfig) -> Result<Box<dyn SemanticOracle>> {
    match config.kind {
        OracleKind::Dump => Ok(Box::new(
            DumpOracle::new(&config.dump_suffix).with_int_size(config.int_size),
        )),
        OracleKind::Command => {
            let program = config
                .command
                .as_deref()
                .ok_or_else(|| Error::Config("oracle.command is not set".to_string()))?;
            let oracle = CommandOracle::locate(program)?
                .with_args(config.args.clone())
                .with_int_size(config.int_size);
            Ok(Box::new(oracle))
        }
    }
}

fn parse_dump(path: &Path, json: &str) -> Result<SourceFile> {
    serde_json::from_str(json).map_err(|source| Error::json(path, source))
}

// ============================================================================
// Sidecar dumps
// ============================================================================

/// Reads `<source><suffix>` written ahead of time by the resolver.
#[derive(Debug, Clone)]
pub struct DumpOracle {
    suffix: String,
    int_size: u32,
}

impl DumpOracle {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            int_size: 64,
        }
    }

    pub fn with_int_size(mut self, int_size: u32) -> Self {
        self.int_size = int_size;
        self
    }

    pub fn dump_path(&self, source: &Path) -> PathBuf {
        let mut name = OsString::from(source.as_os_str());
        name.push(&self.suffix);
        PathBuf::from(name)
    }
}

impl SemanticOracle for DumpOracle {
    fn load(&self, path: &Path) -> Result<SourceFile> {
        let dump = self.dump_path(path);
        let json = fs::read_to_string(&dump).map_err(|e| {
            Error::oracle(path, format!("cannot read dump {}: {}", dump.display(), e))
        })?;
        tracing::trace!(dump = %dump.display(), "loaded oracle dump");
        parse_dump(&dump, &json)
    }

    fn int_size(&self) -> u32 {
        self.int_size
    }
}

// ============================================================================
// External resolver
// ============================================================================

/// Runs `<program> <args...> <source>` and parses stdout as a dump.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    program: PathBuf,
    args: Vec<String>,
    int_size: u32,
}

impl CommandOracle {
    /// Resolve `program` through `PATH` (or use it directly when it is a path).
    pub fn locate(program: &str) -> Result<Self> {
        let resolved = which::which(program).map_err(|e| {
            Error::oracle(program, format!("resolver executable not found: {}", e))
        })?;
        Ok(Self::new(resolved))
    }

    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            int_size: 64,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_int_size(mut self, int_size: u32) -> Self {
        self.int_size = int_size;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl SemanticOracle for CommandOracle {
    fn load(&self, path: &Path) -> Result<SourceFile> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .output()
            .map_err(|e| {
                Error::oracle(
                    path,
                    format!("failed to run {}: {}", self.program.display(), e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::oracle(
                path,
                format!("resolver exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|_| Error::oracle(path, "resolver output is not valid UTF-8"))?;
        parse_dump(path, &stdout)
    }

    fn int_size(&self) -> u32 {
        self.int_size
    }
}

// ============================================================================
// In-memory trees
// ============================================================================

/// Serves pre-built trees keyed by path.
#[derive(Debug, Clone)]
pub struct MemoryOracle {
    files: HashMap<PathBuf, SourceFile>,
    int_size: u32,
}

impl Default for MemoryOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryOracle {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
            int_size: 64,
        }
    }

    pub fn with_int_size(mut self, int_size: u32) -> Self {
        self.int_size = int_size;
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, file: SourceFile) {
        self.files.insert(path.into(), file);
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, file: SourceFile) -> Self {
        self.insert(path, file);
        self
    }
}

impl SemanticOracle for MemoryOracle {
    fn load(&self, path: &Path) -> Result<SourceFile> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| Error::oracle(path, "no tree registered for this path"))
    }

    fn int_size(&self) -> u32 {
        self.int_size
    }
}
