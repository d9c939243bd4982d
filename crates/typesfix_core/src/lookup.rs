use anyhow::{Context, Result};
use log::trace;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    constants::{DECLARATION_FILE, MANIFEST_FILE, NODE_MODULES},
    manifest::Manifest,
};

/// Questions the scanner asks about locally installed packages.
pub trait PackageLookup {
    /// Manifest of the installed package, `None` when it is not installed
    fn resolve_manifest(&self, package: &str) -> Result<Option<Manifest>>;

    /// Whether the installed package folder contains `index.d.ts`
    fn has_declaration_file(&self, package: &str) -> Result<bool>;
}

/// Looks packages up in `node_modules`, starting next to the manifest and
/// walking up to the workspace root so hoisted installs are found.
#[derive(Debug, Clone)]
pub struct NodeModulesLookup {
    start_dir: PathBuf,
    workspace_root: PathBuf,
}

impl NodeModulesLookup {
    pub fn new(start_dir: impl Into<PathBuf>, workspace_root: impl Into<PathBuf>) -> Self {
        Self { start_dir: start_dir.into(), workspace_root: workspace_root.into() }
    }

    /// Lookup for the manifest at `manifest_path`, bounded by `workspace_root`
    pub fn for_manifest(manifest_path: &Path, workspace_root: &Path) -> Self {
        let start = manifest_path.parent().unwrap_or(workspace_root);
        Self::new(start, workspace_root)
    }

    pub fn package_dir(&self, package: &str) -> Option<PathBuf> {
        trace!("Walking up from {:?} to find node_modules for '{}'", self.start_dir, package);
        let mut current_dir = self.start_dir.as_path();

        loop {
            let candidate = current_dir.join(NODE_MODULES).join(package);
            if candidate.is_dir() {
                trace!("Found installed package at {:?}", candidate);
                return Some(candidate);
            }

            // Stop at workspace root
            if current_dir == self.workspace_root.as_path() {
                break;
            }

            current_dir = current_dir.parent()?;
        }

        trace!("Package '{}' is not installed", package);
        None
    }
}

impl PackageLookup for NodeModulesLookup {
    fn resolve_manifest(&self, package: &str) -> Result<Option<Manifest>> {
        let Some(dir) = self.package_dir(package) else {
            return Ok(None);
        };
        let manifest_path = dir.join(MANIFEST_FILE);
        let text = fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
        let manifest = Manifest::parse(&text)
            .with_context(|| format!("Invalid manifest {}", manifest_path.display()))?;
        Ok(Some(manifest))
    }

    fn has_declaration_file(&self, package: &str) -> Result<bool> {
        let Some(dir) = self.package_dir(package) else {
            return Ok(false);
        };
        let declaration = dir.join(DECLARATION_FILE);
        declaration
            .try_exists()
            .with_context(|| format!("Failed to check {}", declaration.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    #[test]
    fn test_resolve_manifest_not_installed() {
        let temp_dir = TempDir::new().unwrap();
        let lookup = NodeModulesLookup::new(temp_dir.path(), temp_dir.path());
        assert_eq!(lookup.resolve_manifest("lodash").unwrap(), None);
        assert!(!lookup.has_declaration_file("lodash").unwrap());
    }

    #[test]
    fn test_resolve_manifest_reads_types() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(
            root,
            "node_modules/dayjs/package.json",
            r#"{ "name": "dayjs", "types": "index.d.ts" }"#,
        );

        let lookup = NodeModulesLookup::new(root, root);
        let manifest = lookup.resolve_manifest("dayjs").unwrap().unwrap();
        assert_eq!(manifest.name, "dayjs");
        assert!(manifest.declares_types());
    }

    #[test]
    fn test_resolve_manifest_with_byte_order_mark() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(
            root,
            "node_modules/dayjs/package.json",
            "\u{feff}{ \"name\": \"dayjs\", \"types\": \"index.d.ts\" }",
        );

        let lookup = NodeModulesLookup::new(root, root);
        let manifest = lookup.resolve_manifest("dayjs").unwrap().unwrap();
        assert!(manifest.declares_types());
    }

    #[test]
    fn test_resolve_manifest_invalid_json_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "node_modules/broken/package.json", "{ not json");

        let lookup = NodeModulesLookup::new(root, root);
        assert!(lookup.resolve_manifest("broken").is_err());
    }

    #[test]
    fn test_has_declaration_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "node_modules/with-dts/index.d.ts", "export {};");
        create_test_file(root, "node_modules/without-dts/index.js", "module.exports = {};");

        let lookup = NodeModulesLookup::new(root, root);
        assert!(lookup.has_declaration_file("with-dts").unwrap());
        assert!(!lookup.has_declaration_file("without-dts").unwrap());
    }

    #[test]
    fn test_scoped_package_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "node_modules/@scope/pkg/index.d.ts", "export {};");

        let lookup = NodeModulesLookup::new(root, root);
        assert!(lookup.has_declaration_file("@scope/pkg").unwrap());
    }

    #[test]
    fn test_walks_up_to_hoisted_node_modules() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let manifest = create_test_file(root, "packages/web/package.json", "{}");
        create_test_file(root, "node_modules/react/index.d.ts", "export {};");

        let lookup = NodeModulesLookup::for_manifest(&manifest, root);
        assert_eq!(lookup.package_dir("react"), Some(root.join("node_modules/react")));
    }

    #[test]
    fn test_does_not_walk_above_workspace_root() {
        let temp_dir = TempDir::new().unwrap();
        let outer = temp_dir.path();
        create_test_file(outer, "node_modules/react/index.d.ts", "export {};");
        let workspace = outer.join("workspace");
        let manifest = create_test_file(&workspace, "package.json", "{}");

        let lookup = NodeModulesLookup::for_manifest(&manifest, &workspace);
        assert_eq!(lookup.package_dir("react"), None);
    }
}
