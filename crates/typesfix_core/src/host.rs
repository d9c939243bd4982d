use anyhow::Result;
use dashmap::DashMap;
use log::trace;
use std::path::{Path, PathBuf};

use crate::types::{InstallTask, Warning};

/// What the extension needs from the editor (or other environment) hosting it.
///
/// Documents are addressed by path. Adapters own the document buffers, the
/// diagnostic store and the task runner; the scanner and fix logic only go
/// through this trait.
pub trait EditorHost {
    /// Current text of the document, including unsaved edits
    fn document_text(&self, document: &Path) -> Result<String>;

    /// Persist unsaved edits of the document
    fn save_document(&self, document: &Path) -> Result<()>;

    /// Workspace folder containing the document, if any
    fn workspace_folder(&self, document: &Path) -> Option<PathBuf>;

    /// Whether `relative` exists inside `folder`
    fn file_exists(&self, folder: &Path, relative: &str) -> Result<bool>;

    /// Replace the document's diagnostics with `warnings`
    fn publish_diagnostics(&self, document: &Path, warnings: Vec<Warning>);

    /// Start a background task
    fn run_task(&self, task: &InstallTask) -> Result<()>;
}

/// Per-document diagnostic store with whole-set replacement.
///
/// Concurrent publishes for the same document are not ordered; whichever
/// lands last is kept.
#[derive(Debug, Default)]
pub struct DiagnosticCollection {
    entries: DashMap<PathBuf, Vec<Warning>>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, document: &Path, warnings: Vec<Warning>) {
        trace!("Replacing diagnostics for {} ({} entries)", document.display(), warnings.len());
        self.entries.insert(document.to_path_buf(), warnings);
    }

    pub fn get(&self, document: &Path) -> Vec<Warning> {
        self.entries.get(document).map(|w| w.value().clone()).unwrap_or_default()
    }

    pub fn delete(&self, document: &Path) {
        self.entries.remove(document);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Snapshot of every document and its diagnostics, sorted by path
    pub fn snapshot(&self) -> Vec<(PathBuf, Vec<Warning>)> {
        let mut all: Vec<_> =
            self.entries.iter().map(|e| (e.key().clone(), e.value().clone())).collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    pub fn len(&self) -> usize {
        self.entries.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
