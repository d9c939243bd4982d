//! Core of the types installer.
//!
//! This crate flags `package.json` dependencies that ship no TypeScript
//! declarations and builds the quick fix that installs the matching
//! `@types/*` package. Hosts implement [`EditorHost`] and drive a
//! [`TypesInstaller`], which scans manifests into diagnostics, offers fixes
//! at a range and runs the install command. Workspace and manifest discovery
//! helpers are exported for hosts that work from disk.

mod constants;
mod extension;
mod fix;
mod host;
mod lookup;
mod manifest;
mod scanner;
mod text;
mod types;
mod workspace;

// Re-export public API
pub use constants::{DIAGNOSTIC_CODE, MANIFEST_FILE};
pub use extension::TypesInstaller;
pub use host::{DiagnosticCollection, EditorHost};
pub use manifest::types_package_name;
pub use text::{strip_bom, text_in_range};
pub use types::{
    CommandInvocation, FixAction, InstallCommand, InstallTask, PackageManager, Severity,
    TextPosition, TextRange, Warning,
};
pub use workspace::{collect_manifests, find_workspace_root};
