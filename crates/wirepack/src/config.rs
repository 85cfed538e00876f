//! Output configuration
//!
//! `OutputOptions` can be built in code or loaded from a TOML file:
//!
//! ```toml
//! format = "umd"
//! name = "myBundle"
//! compact = false
//!
//! [globals]
//! jquery = "$"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;

use crate::{
    export_mode::ExportModeOption,
    finalisers::Format,
    render_options::{DeclarationKeyword, RenderOptions},
    types::FxIndexMap,
};

/// Settings that shape the emitted file
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputOptions {
    pub format: Format,
    /// Global variable for UMD and IIFE bundles, registered name for SystemJS
    pub name: Option<String>,
    /// Module id passed to `define`
    pub amd_id: Option<String>,
    /// Dependency id -> browser global, for UMD and IIFE
    pub globals: FxIndexMap<String, String>,
    pub exports: ExportModeOption,
    pub compact: bool,
    /// Target engines without accessor properties
    pub legacy: bool,
    pub freeze: bool,
    pub namespace_to_string_tag: bool,
    pub strict: bool,
    pub interop: bool,
    /// Mark named-export entry facades with `__esModule`
    pub es_module: bool,
    pub indent: String,
    /// Declare generated bindings with `const` instead of `var`
    pub prefer_const: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format: Format::default(),
            name: None,
            amd_id: None,
            globals: FxIndexMap::default(),
            exports: ExportModeOption::default(),
            compact: false,
            legacy: false,
            freeze: true,
            namespace_to_string_tag: false,
            strict: true,
            interop: true,
            es_module: true,
            indent: "\t".to_owned(),
            prefer_const: false,
        }
    }
}

impl OutputOptions {
    /// Parse options from TOML text
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse output options")
    }

    /// Load options from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading output options from {}", path.display());
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&source).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// `const` is only available outside legacy mode
    pub const fn declaration_keyword(&self) -> DeclarationKeyword {
        if self.prefer_const && !self.legacy {
            DeclarationKeyword::Const
        } else {
            DeclarationKeyword::Var
        }
    }

    /// Options used while rendering variables for `format`
    pub fn render_options(&self, format: Format) -> RenderOptions {
        RenderOptions {
            compact: self.compact,
            legacy: self.legacy,
            freeze: self.freeze,
            namespace_to_string_tag: self.namespace_to_string_tag,
            system_bindings: format == Format::System,
            indent: self.indent.clone(),
            var_or_const: self.declaration_keyword(),
        }
    }
}
