use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::{
    collections::HashSet,
    io::{BufWriter, Write},
    path::Path,
    time::Instant,
};

use typesfix_core::{EditorHost, TypesInstaller, text_in_range};

mod config;
mod host;
mod reporter;

use config::{Config, FixConfig};
use host::WorkspaceHost;

#[derive(Parser)]
#[command(name = "typesfix")]
#[command(about = "Find dependencies without TypeScript declarations and install their @types packages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Report dependencies that ship no type declarations
    Check(Config),
    /// Install the @types package for each reported dependency
    Fix(FixConfig),
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::Check(mut cfg) => {
            cfg.initialize()?;
            let installer = TypesInstaller::new(WorkspaceHost::new(cfg.root()?.clone(), false));

            info!("Checking {} manifests", cfg.manifests.len());
            let failures: Vec<String> = cfg
                .manifests
                .par_iter()
                .filter_map(|manifest| match installer.did_open(manifest) {
                    Ok(_) => None,
                    Err(e) => {
                        warn!("Failed to scan {}: {:#}", manifest.display(), e);
                        Some(format!("{}: {:#}", manifest.display(), e))
                    }
                })
                .collect();

            let diagnostics = installer.host().diagnostics();
            let elapsed_ms = start.elapsed().as_millis();

            if diagnostics.is_empty() && failures.is_empty() {
                info!("No missing types detected");
                reporter::print_no_warnings_message(&mut stdout, cfg.manifests.len())?;
            } else if !diagnostics.is_empty() {
                reporter::print_warnings(&mut stdout, &diagnostics.snapshot())?;
            }
            for failure in &failures {
                writeln!(stdout, "{} {}", "✗".red().bold(), failure)?;
            }
            writeln!(
                stdout,
                "\n{} Finished in {}ms on {} manifests.",
                "●".bright_blue(),
                elapsed_ms.to_string().cyan(),
                cfg.manifests.len().to_string().cyan()
            )?;
            stdout.flush()?;

            if !diagnostics.is_empty() || !failures.is_empty() {
                // Non-zero exit to fail CI
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Fix(mut cfg) => {
            cfg.scope.initialize()?;
            let installer =
                TypesInstaller::new(WorkspaceHost::new(cfg.scope.root()?.clone(), cfg.dry_run));

            let mut installed = 0;
            for manifest in &cfg.scope.manifests {
                installed += fix_manifest(&installer, &cfg, manifest, &mut stdout)?;
            }

            if installed == 0 {
                reporter::print_no_warnings_message(&mut stdout, cfg.scope.manifests.len())?;
            }
            writeln!(
                stdout,
                "\n{} Finished in {}ms ({} {}).",
                "●".bright_blue(),
                start.elapsed().as_millis().to_string().cyan(),
                installed.to_string().cyan(),
                if cfg.dry_run { "planned installs" } else { "installs" }
            )?;
            stdout.flush()?;
            Ok(())
        }
    }
}

/// Apply the install fix to every selected warning of one manifest.
///
/// The manifest is rescanned after each install since the package manager
/// rewrites it and earlier ranges may no longer line up. Returns the number of
/// installs that succeeded (or were planned, under `--dry-run`).
fn fix_manifest<W: Write>(
    installer: &TypesInstaller<WorkspaceHost>,
    cfg: &FixConfig,
    manifest: &Path,
    writer: &mut W,
) -> Result<usize> {
    let mut attempted = HashSet::new();
    let mut installed = 0;
    loop {
        let warnings = installer.did_change(manifest)?.unwrap_or_default();
        let text = installer.host().document_text(manifest)?;

        let next = warnings.iter().find_map(|w| {
            let name = text_in_range(&text, w.range)?;
            (cfg.selects(name) && !attempted.contains(name)).then(|| (name.to_string(), w))
        });
        let Some((name, warning)) = next else {
            return Ok(installed);
        };
        debug!("Fixing '{}' in {}", name, manifest.display());

        let action = installer
            .code_actions(manifest, warning.range, &warnings)?
            .into_iter()
            .find(|a| a.is_preferred)
            .ok_or_else(|| anyhow!("No fix offered for '{}'", name))?;
        installer.execute_command(&action.command.command, manifest, action.command.arguments)?;
        attempted.insert(name);

        for outcome in installer.host().take_outcomes() {
            reporter::print_outcome(writer, &outcome)?;
            if outcome.succeeded() {
                installed += 1;
            }
        }
    }
}
