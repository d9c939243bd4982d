//! Fixed identifiers shared between the scanner, the fix provider and hosts.
//!
//! Diagnostics produced by the scanner are tagged with [`DIAGNOSTIC_CODE`] so the
//! fix provider can pick them back out of a host's diagnostic list, and every fix
//! action points at [`INSTALL_COMMAND_ID`].

/// Code attached to every "missing types" diagnostic
pub const DIAGNOSTIC_CODE: &str = "no-types-detected";

/// Source label shown next to the diagnostic in the host
pub const DIAGNOSTIC_SOURCE: &str = "Types Installer Helper";

/// Command bound to the quick fix; takes the diagnostic range as its only argument
pub const INSTALL_COMMAND_ID: &str = "types-installer.installTypesModule";

/// Code action kind of the install fix
pub const QUICK_FIX_KIND: &str = "quickfix";

/// Label and source of the background install task
pub const TASK_LABEL: &str = "Types Installer";
pub const TASK_SOURCE: &str = "npm";

/// Scope that DefinitelyTyped publishes declaration packages under
pub const TYPES_SCOPE: &str = "@types";

/// Manifest file name; only documents ending with this are scanned
pub const MANIFEST_FILE: &str = "package.json";

/// Folder holding installed packages
pub const NODE_MODULES: &str = "node_modules";

/// Declaration entry point looked for inside an installed package
pub const DECLARATION_FILE: &str = "index.d.ts";

/// Lockfile whose presence switches installs from npm to yarn
pub const YARN_LOCKFILE: &str = "yarn.lock";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_file_is_typescript_declaration() {
        assert!(DECLARATION_FILE.ends_with(".d.ts"));
    }

    #[test]
    fn test_types_scope_is_scoped_name() {
        assert!(TYPES_SCOPE.starts_with('@'));
        assert!(!TYPES_SCOPE.ends_with('/'));
    }
}
