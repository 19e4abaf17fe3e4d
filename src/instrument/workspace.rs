//! Isolated module copies for instrumented output.
//!
//! The original module is never modified. Each run copies the whole module
//! tree into a fresh directory, overwrites the instrumented files there, and
//! only keeps the directory once everything has been written.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

use crate::errors::{Error, IoResultExt, Result};

pub const GO_MOD: &str = "go.mod";
const COPY_PREFIX: &str = "seedprobe-";

/// Nearest ancestor of `start` (inclusive) that holds a `go.mod`.
pub fn find_module_root(start: &Path) -> Result<PathBuf> {
    let start = start.canonicalize().with_path(start)?;
    start
        .ancestors()
        .find(|dir| dir.join(GO_MOD).is_file())
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::workspace(&start, "no go.mod found in any parent directory"))
}

/// A module copy under construction. Dropped copies are deleted.
#[derive(Debug)]
pub struct ModuleCopy {
    dir: TempDir,
    files_copied: usize,
}

impl ModuleCopy {
    /// Copy `module_root` into a new directory under `output_root`.
    pub fn create(module_root: &Path, output_root: &Path) -> Result<Self> {
        fs::create_dir_all(output_root).with_path(output_root)?;
        let output_root = output_root.canonicalize().with_path(output_root)?;
        let module_root = module_root.canonicalize().with_path(module_root)?;
        let dir = tempfile::Builder::new()
            .prefix(COPY_PREFIX)
            .tempdir_in(&output_root)
            .with_path(&output_root)?;
        let files_copied = copy_tree(&module_root, dir.path())?;
        tracing::debug!(
            from = %module_root.display(),
            to = %dir.path().display(),
            files = files_copied,
            "copied module"
        );
        Ok(Self { dir, files_copied })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn files_copied(&self) -> usize {
        self.files_copied
    }

    /// Write `contents` at `relative` inside the copy.
    pub fn write(&self, relative: &Path, contents: &str) -> Result<PathBuf> {
        let target = self.dir.path().join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).with_path(parent)?;
        }
        fs::write(&target, contents).with_path(&target)?;
        Ok(target)
    }

    /// Keep the directory on disk and return its path.
    pub fn persist(self) -> PathBuf {
        self.dir.keep()
    }
}

/// Recursively copy `from` into the existing directory `to`, skipping `.git`.
fn copy_tree(from: &Path, to: &Path) -> Result<usize> {
    let mut copied = 0;
    let walker = WalkDir::new(from)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git" && !entry.path().starts_with(to));

    for entry in walker {
        let entry = entry.map_err(|e| Error::workspace(from, e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| Error::workspace(entry.path(), e.to_string()))?;
        let target = to.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).with_path(&target)?;
        } else if file_type.is_file() || file_type.is_symlink() {
            fs::copy(entry.path(), &target).with_path(entry.path())?;
            copied += 1;
        }
    }
    Ok(copied)
}
