use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::{Error, Result};

/// Lists the source files of one Go package directory.
///
/// Only regular `*.go` files directly inside the directory are considered;
/// subdirectories are other packages.
pub struct PackageWalker {
    root: PathBuf,
    exclude_patterns: Vec<glob::Pattern>,
}

impl PackageWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            exclude_patterns: Vec::new(),
        }
    }

    /// File-name globs to leave out, e.g. `*_test.go`.
    pub fn with_exclude_patterns(mut self, patterns: &[String]) -> Result<Self> {
        self.exclude_patterns = patterns
            .iter()
            .map(|pattern| glob::Pattern::new(pattern))
            .collect::<std::result::Result<_, _>>()?;
        Ok(self)
    }

    /// Matching files sorted by file name.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| Error::io(&self.root, e.into()))?;
            if entry.file_type().is_file() && self.should_process(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|name| name.to_string_lossy()) else {
            return false;
        };
        if !name.ends_with(".go") {
            return false;
        }
        !self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(&name))
    }
}

pub fn find_package_files(root: &Path, exclude_patterns: &[String]) -> Result<Vec<PathBuf>> {
    PackageWalker::new(root.to_path_buf())
        .with_exclude_patterns(exclude_patterns)?
        .walk()
}
