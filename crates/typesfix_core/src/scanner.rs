use anyhow::{Context, Result};
use log::{debug, trace};

use crate::{
    constants::{DIAGNOSTIC_CODE, DIAGNOSTIC_SOURCE},
    lookup::PackageLookup,
    manifest::{Manifest, is_types_package, types_package_name},
    text::{find_member, object_value, position_at, root_object, strip_bom},
    types::{Severity, TextRange, Warning},
};

const DEPENDENCIES_KEY: &str = "dependencies";

/// Scans manifest text for dependencies that look like they ship no type
/// declarations.
///
/// Text that does not parse as a manifest yields no warnings. The manifest is
/// read structurally and each dependency key is then located in the text to
/// recover its range, so compact or oddly formatted manifests still report
/// accurate positions. An error is only returned when checking for a
/// declaration file fails.
pub fn scan(text: &str, lookup: &dyn PackageLookup) -> Result<Vec<Warning>> {
    // Positions are reported against the text without its byte order mark
    let text = strip_bom(text);
    let manifest = match Manifest::parse(text) {
        Ok(m) => m,
        Err(e) => {
            debug!("Skipping unparsable manifest: {:#}", e);
            return Ok(vec![]);
        }
    };

    let Some(dependencies) = &manifest.dependencies else {
        trace!("Manifest has no dependencies section");
        return Ok(vec![]);
    };

    // Only the top-level "dependencies" object anchors the search
    let section = root_object(text)
        .and_then(|root| find_member(text, root, DEPENDENCIES_KEY))
        .and_then(|key_at| object_value(text, key_at));
    let Some(section) = section else {
        debug!("Could not locate the dependencies section in the text");
        return Ok(vec![]);
    };

    let mut located = Vec::with_capacity(dependencies.len());
    for name in dependencies.keys() {
        match find_member(text, section, name) {
            Some(at) => located.push((at + 1, name.as_str())),
            None => trace!("Could not locate dependency '{}' in the text", name),
        }
    }
    located.sort_unstable_by_key(|(offset, _)| *offset);

    let mut warnings = Vec::new();
    for (offset, name) in located {
        if !should_mark(&manifest, lookup, name)? {
            trace!("Dependency '{}' has type declarations", name);
            continue;
        }

        let start = position_at(text, offset);
        let end = position_at(text, offset + name.len());
        debug!("Dependency '{}' appears to lack type declarations at {:?}", name, start);
        warnings.push(missing_types_warning(name, TextRange::new(start, end)));
    }

    debug!("Scan produced {} warnings", warnings.len());
    Ok(warnings)
}

/// Decides whether `package` should be flagged.
///
/// It is left alone when its types package is already a dev dependency, when
/// its installed manifest declares `types`, or when its folder contains
/// `index.d.ts`. A package that cannot be resolved counts as declaring nothing.
pub fn should_mark(manifest: &Manifest, lookup: &dyn PackageLookup, package: &str) -> Result<bool> {
    if is_types_package(package) {
        return Ok(false);
    }

    if manifest.has_dev_dependency(&types_package_name(package)) {
        trace!("'{}' already has a types package", package);
        return Ok(false);
    }

    match lookup.resolve_manifest(package) {
        Ok(Some(installed)) if installed.declares_types() => {
            trace!("Installed '{}' declares types", package);
            return Ok(false);
        }
        Ok(_) => {}
        Err(e) => debug!("Could not read installed manifest for '{}': {:#}", package, e),
    }

    let has_declarations = lookup
        .has_declaration_file(package)
        .with_context(|| format!("Failed to check type declarations for '{}'", package))?;
    Ok(!has_declarations)
}

fn missing_types_warning(package: &str, range: TextRange) -> Warning {
    let types_package = types_package_name(package);
    Warning {
        severity: Severity::Information,
        message: format!(
            "No \"types\" property detected in package.json. You may need to install a types package like '{}' if you want this package to work in TypeScript files, nicely.",
            types_package
        ),
        code: DIAGNOSTIC_CODE.to_string(),
        source: DIAGNOSTIC_SOURCE.to_string(),
        range,
    }
}
