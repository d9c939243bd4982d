use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
    sync::Mutex,
};

use typesfix_core::{DiagnosticCollection, EditorHost, InstallTask, Warning, strip_bom};

/// Result of an install task run by the terminal host
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub task: InstallTask,
    /// `None` when the task was only printed
    pub status: Option<ExitStatus>,
}

impl TaskOutcome {
    /// Printed tasks count as done, spawned ones only when they exit cleanly
    pub fn succeeded(&self) -> bool {
        self.status.is_none_or(|status| status.success())
    }
}

/// Host backed by the filesystem: documents are files on disk, diagnostics are
/// kept in memory for reporting and install tasks are child processes.
#[derive(Debug)]
pub struct WorkspaceHost {
    root: PathBuf,
    dry_run: bool,
    diagnostics: DiagnosticCollection,
    outcomes: Mutex<Vec<TaskOutcome>>,
}

impl WorkspaceHost {
    pub fn new(root: PathBuf, dry_run: bool) -> Self {
        Self { root, dry_run, diagnostics: DiagnosticCollection::new(), outcomes: Mutex::default() }
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Drain the outcomes recorded since the last call
    pub fn take_outcomes(&self) -> Vec<TaskOutcome> {
        match self.outcomes.lock() {
            Ok(mut outcomes) => std::mem::take(&mut *outcomes),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    fn record(&self, outcome: TaskOutcome) {
        match self.outcomes.lock() {
            Ok(mut outcomes) => outcomes.push(outcome),
            Err(poisoned) => poisoned.into_inner().push(outcome),
        }
    }
}

impl EditorHost for WorkspaceHost {
    fn document_text(&self, document: &Path) -> Result<String> {
        let text = fs::read_to_string(document)
            .with_context(|| format!("Failed to read {}", document.display()))?;
        Ok(strip_bom(&text).to_string())
    }

    fn save_document(&self, document: &Path) -> Result<()> {
        // Documents are read straight from disk, so there are no pending edits
        debug!("Nothing to save for {}", document.display());
        Ok(())
    }

    fn workspace_folder(&self, document: &Path) -> Option<PathBuf> {
        if document.starts_with(&self.root) {
            Some(self.root.clone())
        } else {
            document.parent().map(Path::to_path_buf)
        }
    }

    fn file_exists(&self, folder: &Path, relative: &str) -> Result<bool> {
        let p = folder.join(relative);
        p.try_exists().with_context(|| format!("Failed to check {}", p.display()))
    }

    fn publish_diagnostics(&self, document: &Path, warnings: Vec<Warning>) {
        self.diagnostics.set(document, warnings);
    }

    fn run_task(&self, task: &InstallTask) -> Result<()> {
        if self.dry_run {
            info!("[{}] dry run: {}", task.label, task.command);
            self.record(TaskOutcome { task: task.clone(), status: None });
            return Ok(());
        }

        info!("[{}] running `{}` in {}", task.label, task.command, task.cwd.display());
        let status = Command::new(&task.command.program)
            .args(&task.command.args)
            .current_dir(&task.cwd)
            .status()
            .with_context(|| format!("Failed to launch `{}`", task.command))?;
        if !status.success() {
            warn!("`{}` exited with {}", task.command, status);
        }
        self.record(TaskOutcome { task: task.clone(), status: Some(status) });
        Ok(())
    }
}
