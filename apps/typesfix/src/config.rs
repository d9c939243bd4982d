use anyhow::{Result, anyhow, bail};
use clap::Args;
use log::{debug, info};
use path_clean::clean;
use std::{env, path::PathBuf};

use typesfix_core::{MANIFEST_FILE, collect_manifests, find_workspace_root};

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Root directory of the workspace (defaults to the nearest folder with a package.json)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Manifests to scan (defaults to every package.json under the root)
    #[arg(value_name = "MANIFEST")]
    pub manifests: Vec<PathBuf>,
}

impl Config {
    /// Resolve the root directory and the manifests to scan
    pub fn initialize(&mut self) -> Result<()> {
        let cwd = env::current_dir()?;
        let root = if let Some(r) = self.root.take() {
            debug!("Using provided root directory: {:?}", r);
            let r = clean(cwd.join(r));
            r.canonicalize().unwrap_or(r)
        } else {
            debug!("No root provided, searching for workspace root");
            find_workspace_root(&cwd)?
        };
        info!("Using root directory: {}", root.display());

        self.manifests = if self.manifests.is_empty() {
            collect_manifests(&root)?
        } else {
            self.manifests
                .iter()
                .map(|m| {
                    if m.file_name().is_none_or(|name| name != MANIFEST_FILE) {
                        bail!("{} is not a {}", m.display(), MANIFEST_FILE);
                    }
                    let p = clean(cwd.join(m));
                    Ok(p.canonicalize().unwrap_or(p))
                })
                .collect::<Result<_>>()?
        };
        if self.manifests.is_empty() {
            bail!("No package.json found under {}", root.display());
        }
        debug!("Scanning {} manifests", self.manifests.len());

        self.root = Some(root);
        Ok(())
    }

    /// Get the root directory, returning an error if not initialized
    pub fn root(&self) -> Result<&PathBuf> {
        self.root
            .as_ref()
            .ok_or_else(|| anyhow!("Config not initialized - call initialize() first"))
    }
}

#[derive(Debug, Clone, Args)]
pub struct FixConfig {
    #[command(flatten)]
    pub scope: Config,

    /// Only install types for these dependencies
    #[arg(long = "package", value_name = "NAME")]
    pub packages: Vec<String>,

    /// Print the install commands instead of running them
    #[arg(long)]
    pub dry_run: bool,
}

impl FixConfig {
    pub fn selects(&self, package: &str) -> bool {
        self.packages.is_empty() || self.packages.iter().any(|p| p == package)
    }
}
