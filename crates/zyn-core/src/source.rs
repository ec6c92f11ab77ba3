//! Source units and directory orchestration.
//!
//! [`SourceCode`] wraps an in-memory snippet, [`SourceFile`] a file on disk,
//! and [`SourceModule`] a directory tree of source files. Module loading is
//! sequential by default with an opt-in worker-pool path that parallelizes
//! per-file parsing only; a single unit's lazy fields always resolve on the
//! thread that first reads them.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::printer::{Printable, PrintError, PrinterDispatcher};
use crate::provider::{SyntaxProvider, TranslationUnit, UnitError};
use crate::syntax::SourceElement;

/// File extension of recognized source files, without the dot.
pub const SOURCE_EXTENSION: &str = "zig";

/// Failure to load a module from a directory.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("path '{0}' does not exist")]
    NotFound(PathBuf),
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    Unit(#[from] UnitError),
}

/// Shared behavior of anything backed by one translation unit.
pub trait SemanticSource {
    fn unit(&self) -> &TranslationUnit;

    /// Classifies the unit's root nodes into semantic elements, in source
    /// order. Unmodelled roots are omitted.
    fn content(&self) -> Vec<SourceElement<'_>> {
        self.unit()
            .root_nodes()
            .into_iter()
            .filter_map(SourceElement::classify)
            .collect()
    }

    /// Renders the unit's semantic content through the given dispatcher.
    fn print_with(&self, dispatcher: &PrinterDispatcher) -> Result<String, PrintError> {
        let elements = self.content();
        dispatcher.print(&Printable::Unit(&elements))
    }
}

/// An in-memory piece of source text.
#[derive(Debug)]
pub struct SourceCode {
    unit: TranslationUnit,
}

impl SourceCode {
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            unit: TranslationUnit::from_source(source),
        }
    }

    pub fn release(self) {
        self.unit.release();
    }
}

impl SemanticSource for SourceCode {
    fn unit(&self) -> &TranslationUnit {
        &self.unit
    }
}

/// A parsed source file on disk.
#[derive(Debug)]
pub struct SourceFile {
    unit: TranslationUnit,
}

impl SourceFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, UnitError> {
        let unit = TranslationUnit::from_path(path)?;
        Ok(Self { unit })
    }

    /// The file's path as given at open time.
    pub fn path(&self) -> &Path {
        // from_path always records the path
        self.unit.path().unwrap_or(Path::new(""))
    }

    pub fn release(self) {
        self.unit.release();
    }
}

impl SemanticSource for SourceFile {
    fn unit(&self) -> &TranslationUnit {
        &self.unit
    }
}

/// A directory tree of source files, parsed into one unit per file.
///
/// Files appear in discovery order: a deterministic name-sorted walk,
/// independent of which worker finishes first in pooled mode.
#[derive(Debug)]
pub struct SourceModule {
    root: PathBuf,
    files: Vec<SourceFile>,
}

impl SourceModule {
    /// Loads every source file under `root`, parsing sequentially.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, ModuleError> {
        let root = root.as_ref();
        let paths = discover(root)?;
        let files = paths
            .iter()
            .map(SourceFile::open)
            .collect::<Result<Vec<_>, _>>()?;
        info!(root = %root.display(), files = files.len(), "loaded source module");
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    /// Loads every source file under `root`, distributing per-file parsing
    /// across the worker pool. The provider is initialized before any worker
    /// starts; its native state must not be created concurrently.
    pub fn load_parallel(root: impl AsRef<Path>) -> Result<Self, ModuleError> {
        let root = root.as_ref();
        let paths = discover(root)?;
        SyntaxProvider::initialize();
        let files = paths
            .par_iter()
            .map(SourceFile::open)
            .collect::<Result<Vec<_>, _>>()?;
        info!(root = %root.display(), files = files.len(), "loaded source module");
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

pub(crate) fn discover(root: &Path) -> Result<Vec<PathBuf>, ModuleError> {
    if !root.exists() {
        return Err(ModuleError::NotFound(root.to_path_buf()));
    }
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
        {
            paths.push(entry.into_path());
        }
    }
    debug!(root = %root.display(), count = paths.len(), "discovered source files");
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::PrinterDispatcher;

    fn write_tree(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, contents).unwrap();
        }
        dir
    }

    #[test]
    fn in_memory_source_exposes_content() {
        let code = SourceCode::from_source("fn f() void {}\nconst x = 1;");
        let content = code.content();

        assert_eq!(content.len(), 2);
        assert_eq!(content[0].name(), Some("f"));
        code.release();
    }

    #[test]
    fn source_file_round_trips_through_printer() {
        let dir = write_tree(&[("a.zig", "pub fn main() void {}\n")]);
        let file = SourceFile::open(dir.path().join("a.zig")).unwrap();

        assert_eq!(file.path(), dir.path().join("a.zig"));
        let dispatcher = PrinterDispatcher::with_defaults();
        assert_eq!(file.print_with(&dispatcher).unwrap(), "pub fn main() void {}");
    }

    #[test]
    fn module_discovers_in_sorted_order() {
        let dir = write_tree(&[
            ("b.zig", "const b = 2;"),
            ("a.zig", "const a = 1;"),
            ("nested/c.zig", "const c = 3;"),
            ("ignored.txt", "not source"),
        ]);
        let module = SourceModule::load(dir.path()).unwrap();

        let names: Vec<_> = module
            .files()
            .iter()
            .map(|f| f.path().file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["a.zig", "b.zig", "c.zig"]);
    }

    #[test]
    fn parallel_load_preserves_discovery_order() {
        let files: Vec<(String, String)> = (0..16)
            .map(|i| (format!("f{i:02}.zig"), format!("const v{i} = {i};")))
            .collect();
        let borrowed: Vec<(&str, &str)> = files
            .iter()
            .map(|(n, c)| (n.as_str(), c.as_str()))
            .collect();
        let dir = write_tree(&borrowed);

        let sequential = SourceModule::load(dir.path()).unwrap();
        let parallel = SourceModule::load_parallel(dir.path()).unwrap();

        let order = |m: &SourceModule| -> Vec<PathBuf> {
            m.files().iter().map(|f| f.path().to_path_buf()).collect()
        };
        assert_eq!(order(&sequential), order(&parallel));
    }

    #[test]
    fn missing_root_fails_loudly() {
        let result = SourceModule::load("/nonexistent/zyn-module");
        assert!(matches!(result, Err(ModuleError::NotFound(_))));
    }

    #[test]
    fn unreadable_file_aborts_the_batch() {
        let dir = write_tree(&[("a.zig", "const a = 1;")]);
        let result = SourceFile::open(dir.path().join("missing.zig"));
        assert!(matches!(result, Err(UnitError::Read { .. })));
    }
}
