use anyhow::{Result, anyhow};
use ignore::WalkBuilder;
use log::{debug, trace};
use std::path::{Path, PathBuf};

use crate::constants::{MANIFEST_FILE, NODE_MODULES};

/// Nearest ancestor of `start` (inclusive) that contains a `package.json`,
/// falling back to the enclosing git root.
pub fn find_workspace_root(start: &Path) -> Result<PathBuf> {
    debug!("Searching for workspace root from {:?}", start);
    let mut current_dir = start;
    loop {
        if current_dir.join(MANIFEST_FILE).is_file() {
            debug!("Found workspace root at: {:?}", current_dir);
            return Ok(current_dir.to_path_buf());
        }
        match current_dir.parent() {
            Some(parent) => current_dir = parent,
            None => break,
        }
    }

    debug!("No package.json above {:?}, looking for a git root", start);
    find_git_root(start)
}

pub fn find_git_root(start: &Path) -> Result<PathBuf> {
    debug!("Searching for git root");
    let mut current_dir = start.to_path_buf();
    trace!("Starting search from: {:?}", current_dir);

    loop {
        let git_dir = current_dir.join(".git");
        trace!("Checking for .git at: {:?}", git_dir);
        if git_dir.exists() {
            debug!("Found git root at: {:?}", current_dir);
            return Ok(current_dir);
        }

        // Try to move up to parent directory
        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => {
                debug!("Could not find .git directory in any parent folder");
                return Err(anyhow!("Could not find .git directory in any parent folder"));
            }
        }
    }
}

/// Every `package.json` under `root`, honouring ignore files and never
/// descending into `node_modules`. Sorted for stable output.
pub fn collect_manifests(root: &Path) -> Result<Vec<PathBuf>> {
    debug!("Collecting manifests under {}", root.display());
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .ignore(true)
        .git_ignore(true)
        .filter_entry(|entry| entry.file_name() != NODE_MODULES)
        .build();

    let mut manifests = Vec::new();
    for res in walker {
        let dent = res?;
        let p = dent.path();
        if p.is_file() && p.file_name().and_then(|n| n.to_str()) == Some(MANIFEST_FILE) {
            trace!("Found manifest: {}", p.display());
            manifests.push(p.to_path_buf());
        }
    }
    manifests.sort();
    debug!("Collected {} manifests", manifests.len());
    Ok(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
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
    fn test_find_workspace_root_nearest_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "package.json", "{}");
        create_test_file(root, "packages/web/package.json", "{}");
        let nested = root.join("packages/web/src/components");
        fs::create_dir_all(&nested).unwrap();

        let found = find_workspace_root(&nested).unwrap();
        assert_eq!(found, root.join("packages/web"));
    }

    #[test]
    fn test_find_git_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        let subdir = root.join("src").join("components");
        fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_git_root(&subdir).unwrap(), root);
    }

    #[test]
    fn test_collect_manifests_skips_node_modules() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "package.json", "{}");
        create_test_file(root, "packages/api/package.json", "{}");
        create_test_file(root, "node_modules/lodash/package.json", "{}");
        create_test_file(root, "packages/api/node_modules/zod/package.json", "{}");
        create_test_file(root, "packages/api/src/index.ts", "");

        let manifests = collect_manifests(root).unwrap();
        assert_eq!(
            manifests,
            vec![root.join("package.json"), root.join("packages/api/package.json")]
        );
    }

    #[test]
    fn test_collect_manifests_empty() {
        let temp_dir = TempDir::new().unwrap();
        assert!(collect_manifests(temp_dir.path()).unwrap().is_empty());
    }
}
