use std::{fmt, path::PathBuf};

use crate::constants::{TASK_LABEL, TASK_SOURCE};

/// Zero-based line and UTF-16 column, the unit editor protocols address text in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextPosition {
    pub line: usize,
    pub character: usize,
}

impl TextPosition {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Half-open range between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextRange {
    pub start: TextPosition,
    pub end: TextPosition,
}

impl TextRange {
    pub fn new(start: TextPosition, end: TextPosition) -> Self {
        Self { start, end }
    }

    /// Range covering `start..end` columns of a single line
    pub fn on_line(line: usize, start: usize, end: usize) -> Self {
        Self { start: TextPosition::new(line, start), end: TextPosition::new(line, end) }
    }

    /// True when the ranges overlap or touch. An empty range (a cursor) touching
    /// either edge of `self` counts, mirroring how editors ask for fixes at a caret.
    pub fn intersects(&self, other: &TextRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start.line + 1, self.start.character + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

/// A diagnostic attached to one dependency name in a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub severity: Severity,
    pub message: String,
    pub code: String,
    pub source: String,
    pub range: TextRange,
}

/// Command invocation carried by a fix action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub command: String,
    pub title: String,
    pub arguments: TextRange,
}

/// Quick fix offered for a "missing types" warning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixAction {
    pub title: String,
    pub kind: String,
    pub is_preferred: bool,
    pub diagnostics: Vec<Warning>,
    pub command: CommandInvocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Yarn,
}

impl PackageManager {
    /// Command that adds `package` as a development dependency
    pub fn install_command(self, package: &str) -> InstallCommand {
        let (program, args) = match self {
            PackageManager::Yarn => ("yarn", ["add", "--dev"]),
            PackageManager::Npm => ("npm", ["i", "--save-dev"]),
        };
        let mut args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        args.push(package.to_string());
        InstallCommand { program: program.to_string(), args }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for InstallCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Background task a host runs to install a types package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTask {
    pub label: String,
    pub source: String,
    /// Workspace folder the command runs in
    pub cwd: PathBuf,
    pub command: InstallCommand,
}

impl InstallTask {
    pub fn new(cwd: PathBuf, command: InstallCommand) -> Self {
        Self { label: TASK_LABEL.to_string(), source: TASK_SOURCE.to_string(), cwd, command }
    }
}
