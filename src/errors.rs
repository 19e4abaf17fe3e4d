//! Shared error types for analysis and instrumentation runs.
//!
//! Everything in here is a *batch-level* failure: a bad input file, an oracle
//! that cannot produce a tree, an unresolved type, or a write that did not
//! land. Per-item outcomes (unsupported or missing functions) are ordinary
//! values in the analysis records and never surface as an [`Error`].

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for seedprobe operations
#[derive(Debug, Error)]
pub enum Error {
    /// File system related errors
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed protocol or dump JSON
    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The semantic oracle could not produce a resolved tree
    #[error("Oracle failed for {}: {message}", path.display())]
    Oracle { path: PathBuf, message: String },

    /// A signature slot arrived without a resolved type
    #[error("Unresolved type for {slot} of `{function}` in {}", file.display())]
    TypeResolution {
        file: PathBuf,
        function: String,
        slot: String,
    },

    /// Rewriting a package failed
    #[error("Instrumentation error: {0}")]
    Instrumentation(String),

    /// Copying or preparing the instrumented module failed
    #[error("Workspace error at {}: {message}", path.display())]
    Workspace { path: PathBuf, message: String },

    /// Pattern errors
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

impl Error {
    /// Create an I/O error with path context
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a JSON error with path context
    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn oracle(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Oracle {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    pub fn workspace(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Workspace {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io { .. } => "I/O",
            Self::Json { .. } => "Protocol",
            Self::Config(_) => "Config",
            Self::Oracle { .. } => "Oracle",
            Self::TypeResolution { .. } => "Type resolution",
            Self::Instrumentation(_) => "Instrumentation",
            Self::Workspace { .. } => "Workspace",
            Self::Pattern(_) => "Pattern",
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for attaching a path to raw I/O results
pub trait IoResultExt<T> {
    fn with_path(self, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::io(path, source))
    }
}
