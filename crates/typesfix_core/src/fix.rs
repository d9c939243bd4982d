use anyhow::{Result, anyhow, bail};
use log::{debug, info, trace};
use std::path::Path;

use crate::{
    constants::{DIAGNOSTIC_CODE, INSTALL_COMMAND_ID, QUICK_FIX_KIND, YARN_LOCKFILE},
    host::EditorHost,
    manifest::types_package_name,
    text::text_in_range,
    types::{CommandInvocation, FixAction, InstallTask, PackageManager, TextRange, Warning},
};

/// One install fix per "missing types" warning, named after the text the
/// warning currently covers in `document_text`.
pub fn provide_fixes(document_text: &str, warnings: &[Warning]) -> Vec<FixAction> {
    warnings
        .iter()
        .filter(|w| w.code == DIAGNOSTIC_CODE)
        .map(|w| {
            let package = text_in_range(document_text, w.range).unwrap_or_default();
            fix_for(package, w)
        })
        .collect()
}

fn fix_for(package: &str, warning: &Warning) -> FixAction {
    let title = format!("Install {} module...", types_package_name(package));
    trace!("Offering fix '{}' at {}", title, warning.range);
    FixAction {
        title: title.clone(),
        kind: QUICK_FIX_KIND.to_string(),
        is_preferred: true,
        diagnostics: vec![warning.clone()],
        command: CommandInvocation {
            command: INSTALL_COMMAND_ID.to_string(),
            title,
            arguments: warning.range,
        },
    }
}

/// `yarn` when the folder has a yarn lockfile, `npm` otherwise
pub fn detect_package_manager(host: &dyn EditorHost, folder: &Path) -> Result<PackageManager> {
    let manager = if host.file_exists(folder, YARN_LOCKFILE)? {
        PackageManager::Yarn
    } else {
        PackageManager::Npm
    };
    debug!("Using {:?} in {}", manager, folder.display());
    Ok(manager)
}

/// Installs the types package for the dependency named at `range`.
///
/// The name is read from the live document rather than from the diagnostic,
/// since the text may have moved since the scan. Unsaved edits are saved
/// before the install task starts so the package manager sees them.
pub fn install_types_package(
    host: &dyn EditorHost,
    document: &Path,
    range: TextRange,
) -> Result<InstallTask> {
    let text = host.document_text(document)?;
    let package = text_in_range(&text, range)
        .ok_or_else(|| anyhow!("Range {} is outside {}", range, document.display()))?
        .trim();
    if package.is_empty() {
        bail!("No dependency name at {} in {}", range, document.display());
    }
    let types_package = types_package_name(package);

    host.save_document(document)?;

    let folder = host
        .workspace_folder(document)
        .ok_or_else(|| anyhow!("{} is not inside a workspace folder", document.display()))?;
    let manager = detect_package_manager(host, &folder)?;

    let task = InstallTask::new(folder, manager.install_command(&types_package));
    info!("Installing {} with `{}`", types_package, task.command);
    host.run_task(&task)?;
    Ok(task)
}
