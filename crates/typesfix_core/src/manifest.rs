use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::{constants::TYPES_SCOPE, text::strip_bom};

/// The fields of a `package.json` the scanner cares about.
///
/// A missing section stays `None`, which is not the same as an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub name: String,
    pub types: Option<String>,
    /// Older spelling of `types`, still honoured by the compiler
    pub typings: Option<String>,
    pub dependencies: Option<BTreeMap<String, String>>,
    pub dev_dependencies: Option<BTreeMap<String, String>>,
}

impl Manifest {
    /// Parses manifest text, ignoring a leading byte order mark
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(strip_bom(text)).context("Failed to parse package manifest")
    }

    /// True if the package ships its own declarations through `types`/`typings`
    pub fn declares_types(&self) -> bool {
        [&self.types, &self.typings]
            .into_iter()
            .any(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }

    pub fn has_dev_dependency(&self, name: &str) -> bool {
        self.dev_dependencies.as_ref().is_some_and(|deps| deps.contains_key(name))
    }
}

/// Name of the DefinitelyTyped package for `package`.
///
/// Scoped packages are flattened: `@babel/core` becomes `@types/babel__core`.
pub fn types_package_name(package: &str) -> String {
    match package.strip_prefix('@').and_then(|scoped| scoped.split_once('/')) {
        Some((scope, name)) => format!("{}/{}__{}", TYPES_SCOPE, scope, name),
        None => format!("{}/{}", TYPES_SCOPE, package),
    }
}

/// True for packages that already live in the `@types` scope
pub fn is_types_package(package: &str) -> bool {
    package.strip_prefix(TYPES_SCOPE).is_some_and(|rest| rest.starts_with('/'))
}
