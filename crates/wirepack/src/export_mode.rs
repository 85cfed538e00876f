//! Classification of an output unit's export shape

use anyhow::{Result, bail};
use log::warn;
use serde::Deserialize;

use crate::finalisers::{Dependency, ExportBinding, Format};

/// Shape of the export block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    /// Nothing is exported
    #[default]
    None,
    /// Exactly one unnamed value
    Default,
    /// One or more named exports
    Named,
}

/// Export mode requested in the output options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportModeOption {
    #[default]
    Auto,
    Default,
    Named,
    None,
}

/// Every name the output unit exposes: own exports, then named re-exports
/// and `*` for each star re-export
pub fn exported_names(exports: &[ExportBinding], dependencies: &[Dependency]) -> Vec<String> {
    let mut names: Vec<String> = exports.iter().map(|export| export.exported.clone()).collect();
    for dependency in dependencies {
        names.extend(
            dependency
                .reexport_specifiers()
                .iter()
                .map(|specifier| specifier.reexported.clone()),
        );
    }
    names
}

/// Resolve the export mode for an output unit
pub fn resolve(
    requested: ExportModeOption,
    exports: &[ExportBinding],
    dependencies: &[Dependency],
    format: Format,
) -> Result<ExportMode> {
    let names = exported_names(exports, dependencies);
    let only_default = names.len() == 1 && names[0] == "default";

    match requested {
        ExportModeOption::Named => Ok(ExportMode::Named),
        ExportModeOption::None => {
            if !names.is_empty() {
                bail!(
                    "'none' was specified for output.exports, but entry module has following exports: {}",
                    names.join(", ")
                );
            }
            Ok(ExportMode::None)
        }
        ExportModeOption::Default => {
            if !only_default {
                bail!(
                    "'default' was specified for output.exports, but entry module has following exports: {}",
                    names.join(", ")
                );
            }
            Ok(ExportMode::Default)
        }
        ExportModeOption::Auto => {
            if names.is_empty() {
                Ok(ExportMode::None)
            } else if only_default {
                Ok(ExportMode::Default)
            } else {
                if format != Format::Es && names.iter().any(|name| name == "default") {
                    warn!(
                        "Mixing named and default exports: consumers of this {format} bundle \
                         will have to use `bundle['default']` to access the default export"
                    );
                }
                Ok(ExportMode::Named)
            }
        }
    }
}
