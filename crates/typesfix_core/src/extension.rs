use anyhow::{Result, bail};
use log::{debug, trace};
use std::path::Path;

use crate::{
    constants::{INSTALL_COMMAND_ID, MANIFEST_FILE},
    fix::{install_types_package, provide_fixes},
    host::EditorHost,
    lookup::NodeModulesLookup,
    scanner::scan,
    types::{FixAction, InstallTask, TextRange, Warning},
};

/// Wires the scanner and the install fix to a host.
///
/// Hosts forward document open/change events to [`did_open`](Self::did_open)
/// and [`did_change`](Self::did_change), ask [`code_actions`](Self::code_actions)
/// for fixes, and route command executions to
/// [`execute_command`](Self::execute_command).
pub struct TypesInstaller<H: EditorHost> {
    host: H,
}

impl<H: EditorHost> TypesInstaller<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Scan the document that is active when the host starts, if any
    pub fn activate(&self, active_document: Option<&Path>) -> Result<()> {
        debug!("Activating types installer");
        match active_document {
            Some(document) => self.refresh(document).map(|_| ()),
            None => Ok(()),
        }
    }

    pub fn did_open(&self, document: &Path) -> Result<Option<Vec<Warning>>> {
        trace!("Document opened: {}", document.display());
        self.refresh(document)
    }

    pub fn did_change(&self, document: &Path) -> Result<Option<Vec<Warning>>> {
        trace!("Document changed: {}", document.display());
        self.refresh(document)
    }

    /// Rescan `document` and replace its diagnostics. Returns `None` for
    /// documents that are not manifests.
    fn refresh(&self, document: &Path) -> Result<Option<Vec<Warning>>> {
        if !is_manifest(document) {
            trace!("Ignoring non-manifest document {}", document.display());
            return Ok(None);
        }

        let text = self.host.document_text(document)?;
        let workspace_root = self
            .host
            .workspace_folder(document)
            .or_else(|| document.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        let lookup = NodeModulesLookup::for_manifest(document, &workspace_root);

        let warnings = scan(&text, &lookup)?;
        debug!("{}: {} dependencies without types", document.display(), warnings.len());
        self.host.publish_diagnostics(document, warnings.clone());
        Ok(Some(warnings))
    }

    /// Fixes for the diagnostics among `diagnostics` that touch `range`
    pub fn code_actions(
        &self,
        document: &Path,
        range: TextRange,
        diagnostics: &[Warning],
    ) -> Result<Vec<FixAction>> {
        let at_range: Vec<Warning> =
            diagnostics.iter().filter(|d| d.range.intersects(&range)).cloned().collect();
        if at_range.is_empty() {
            return Ok(vec![]);
        }
        let text = self.host.document_text(document)?;
        Ok(provide_fixes(&text, &at_range))
    }

    pub fn execute_command(
        &self,
        command: &str,
        document: &Path,
        range: TextRange,
    ) -> Result<InstallTask> {
        match command {
            INSTALL_COMMAND_ID => install_types_package(&self.host, document, range),
            other => bail!("Unknown command '{}'", other),
        }
    }
}

fn is_manifest(document: &Path) -> bool {
    document.to_string_lossy().ends_with(MANIFEST_FILE)
}
