//! Output format finalisers
//!
//! A finaliser wraps the already tree-shaken and renamed chunk body in the
//! wiring of one module format. All formats share the dependency, interop
//! and export-mode logic; what differs is described by
//! [`FormatCapabilities`] and the small per-format modules that lay out the
//! wrapper syntax.

pub mod amd;
pub mod cjs;
pub mod esm;
pub mod export_block;
pub mod iife;
pub mod interop;
pub mod system;
pub mod umd;


use anyhow::Result;
use clap::ValueEnum;
use log::debug;
use serde::Deserialize;

use self::interop::DependencyBinding;
use crate::{config::OutputOptions, export_mode::ExportMode, render_options::RenderOptions};

/// Module wiring format of the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// CommonJS, loadable through a synchronous `require`
    #[default]
    #[serde(alias = "commonjs")]
    #[value(alias = "commonjs")]
    Cjs,
    /// Asynchronous module definition
    Amd,
    /// Universal module definition: CommonJS, AMD or a browser global
    Umd,
    /// Immediately invoked function expression assigning a global
    Iife,
    /// SystemJS `System.register`
    System,
    /// ES module `import` / `export` declarations
    #[serde(alias = "esm", alias = "module")]
    #[value(alias = "esm", alias = "module")]
    Es,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Cjs => "cjs",
            Self::Amd => "amd",
            Self::Umd => "umd",
            Self::Iife => "iife",
            Self::System => "system",
            Self::Es => "es",
        };
        f.write_str(name)
    }
}

/// How dependencies are loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wiring {
    /// `var dep = require('dep');`
    Require,
    /// `define(['dep'], function (dep) {})`
    DependencyArray,
    /// Runtime detection of CommonJS, AMD or globals
    Universal,
    /// Arguments read from browser globals
    Globals,
    /// `System.register` setters
    Register,
    /// `import` declarations
    Declarative,
}

/// Where the `__esModule` interop marker is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerPlacement {
    /// The format has native module semantics, no marker
    Never,
    /// `Object.defineProperty(exports, '__esModule', ...)` in the intro
    ExportsObject,
    /// On the object literal that replaces `module.exports`
    ModuleExports,
}

/// Static description of a format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatCapabilities {
    pub wiring: Wiring,
    /// Output is wrapped in a registration callback
    pub wrapper_callback: bool,
    /// External defaults go through the interop helper
    pub default_interop: bool,
    /// Emit a `'use strict'` directive
    pub strict_directive: bool,
    pub es_module_marker: MarkerPlacement,
}

impl Format {
    pub const fn capabilities(self) -> FormatCapabilities {
        match self {
            Self::Cjs => FormatCapabilities {
                wiring: Wiring::Require,
                wrapper_callback: false,
                default_interop: true,
                strict_directive: true,
                es_module_marker: MarkerPlacement::ModuleExports,
            },
            Self::Amd => FormatCapabilities {
                wiring: Wiring::DependencyArray,
                wrapper_callback: true,
                default_interop: true,
                strict_directive: true,
                es_module_marker: MarkerPlacement::ExportsObject,
            },
            Self::Umd => FormatCapabilities {
                wiring: Wiring::Universal,
                wrapper_callback: true,
                default_interop: true,
                strict_directive: true,
                es_module_marker: MarkerPlacement::ExportsObject,
            },
            Self::Iife => FormatCapabilities {
                wiring: Wiring::Globals,
                wrapper_callback: true,
                default_interop: true,
                strict_directive: true,
                es_module_marker: MarkerPlacement::ExportsObject,
            },
            Self::System => FormatCapabilities {
                wiring: Wiring::Register,
                wrapper_callback: true,
                default_interop: false,
                strict_directive: true,
                es_module_marker: MarkerPlacement::Never,
            },
            Self::Es => FormatCapabilities {
                wiring: Wiring::Declarative,
                wrapper_callback: false,
                default_interop: false,
                strict_directive: false,
                es_module_marker: MarkerPlacement::Never,
            },
        }
    }
}

/// `import { imported as local } from '...'`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImportSpecifier {
    /// Name in the dependency, `default` or `*` for the namespace
    pub imported: String,
    pub local: String,
}

/// `export { imported as reexported } from '...'`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReexportSpecifier {
    /// Name in the dependency, `*` for its namespace
    pub imported: String,
    /// Exported name, `*` for `export * from`
    pub reexported: String,
}

impl ReexportSpecifier {
    /// `export * from '...'`
    pub fn is_star(&self) -> bool {
        self.imported == "*" && self.reexported == "*"
    }
}

/// One distinct import source of the output unit
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Dependency {
    /// Specifier as it must appear in the emitted load
    pub id: String,
    /// Part of this bundle, never needs interop
    #[serde(default)]
    pub is_chunk: bool,
    /// Local binding for the dependency's namespace
    pub name: String,
    #[serde(default)]
    pub imports: Option<Vec<ImportSpecifier>>,
    #[serde(default)]
    pub reexports: Option<Vec<ReexportSpecifier>>,
    #[serde(default)]
    pub exports_names: bool,
    #[serde(default)]
    pub exports_default: bool,
}

impl Dependency {
    pub fn has_imports(&self) -> bool {
        self.imports.as_ref().is_some_and(|imports| !imports.is_empty())
    }

    pub fn has_reexports(&self) -> bool {
        self.reexports
            .as_ref()
            .is_some_and(|reexports| !reexports.is_empty())
    }

    /// Loaded for its side effects only
    pub fn is_side_effect_only(&self) -> bool {
        !self.has_imports() && !self.has_reexports()
    }

    pub fn reexport_specifiers(&self) -> &[ReexportSpecifier] {
        self.reexports.as_deref().unwrap_or_default()
    }

    pub fn import_specifiers(&self) -> &[ImportSpecifier] {
        self.imports.as_deref().unwrap_or_default()
    }
}

/// An export of the output unit itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBinding {
    pub exported: String,
    /// Rendered name of the binding
    pub local: String,
    /// Reads must observe later writes
    pub live: bool,
}

impl ExportBinding {
    pub fn new(exported: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            exported: exported.into(),
            local: local.into(),
            live: false,
        }
    }

    #[must_use]
    pub const fn live(mut self) -> Self {
        self.live = true;
        self
    }
}

/// Everything the chunking stage hands to a finaliser
#[derive(Debug, Clone, Default)]
pub struct FinaliserOptions {
    /// In first-import order
    pub dependencies: Vec<Dependency>,
    pub exports: Vec<ExportBinding>,
    pub export_mode: ExportMode,
    pub intro: String,
    pub outro: String,
    pub is_entry_module_facade: bool,
}

/// State shared by every format while finalising one chunk
#[derive(Debug)]
pub struct FinaliserContext<'a> {
    pub format: Format,
    pub capabilities: FormatCapabilities,
    pub options: &'a FinaliserOptions,
    pub output: &'a OutputOptions,
    pub render: RenderOptions,
    pub bindings: Vec<DependencyBinding<'a>>,
    /// At least one binding goes through the interop helper
    pub needs_interop: bool,
}

impl<'a> FinaliserContext<'a> {
    pub fn new(format: Format, options: &'a FinaliserOptions, output: &'a OutputOptions) -> Self {
        let capabilities = format.capabilities();
        let (bindings, needs_interop) = interop::resolve_bindings(
            &options.dependencies,
            output.interop,
            capabilities.default_interop,
        );
        Self {
            format,
            capabilities,
            options,
            output,
            render: output.render_options(format),
            bindings,
            needs_interop,
        }
    }

    pub const fn sp(&self) -> &'static str {
        self.render.sp()
    }

    pub const fn nl(&self) -> &'static str {
        self.render.nl()
    }

    /// `nl` twice, the separator between top-level blocks
    pub const fn block_separator(&self) -> &'static str {
        if self.output.compact { "" } else { "\n\n" }
    }

    pub fn var_or_const(&self) -> &'static str {
        self.render.var_or_const.as_str()
    }

    /// `'use strict';` if the format and settings ask for it
    pub fn use_strict(&self) -> String {
        if self.capabilities.strict_directive && self.output.strict {
            "'use strict';".to_owned()
        } else {
            String::new()
        }
    }

    /// The `__esModule` marker is needed for named-export entry facades
    pub fn needs_es_module_marker(&self) -> bool {
        self.options.export_mode == ExportMode::Named
            && self.options.is_entry_module_facade
            && !self.output.legacy
            && self.output.es_module
            && self.capabilities.es_module_marker != MarkerPlacement::Never
    }

    /// Marker statement on the `exports` object
    pub fn exports_marker(&self) -> String {
        let sp = self.sp();
        format!("Object.defineProperty(exports,{sp}'__esModule',{sp}{{{sp}value:{sp}true{sp}}});")
    }

    /// Bindings that receive a parameter in callback formats
    pub fn bound_dependencies(&self) -> impl Iterator<Item = &DependencyBinding<'a>> {
        self.bindings
            .iter()
            .filter(|binding| !binding.dependency.is_side_effect_only())
    }

    /// Dependencies only loaded for their side effects
    pub fn side_effect_dependencies(&self) -> impl Iterator<Item = &DependencyBinding<'a>> {
        self.bindings
            .iter()
            .filter(|binding| binding.dependency.is_side_effect_only())
    }

    /// Glue the non-empty `blocks` together with [`Self::block_separator`]
    pub fn join_blocks<I, S>(&self, blocks: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut output = String::new();
        for block in blocks {
            let block = block.as_ref();
            if block.is_empty() {
                continue;
            }
            if !output.is_empty() {
                output.push_str(self.block_separator());
            }
            output.push_str(block);
        }
        output
    }
}

/// Produce the final output text for `body` in `format`
pub fn finalise(
    format: Format,
    body: &str,
    options: &FinaliserOptions,
    output: &OutputOptions,
) -> Result<String> {
    let context = FinaliserContext::new(format, options, output);
    debug!(
        "Finalising {format} output: {} dependencies, {} exports, export mode {:?}",
        options.dependencies.len(),
        options.exports.len(),
        options.export_mode
    );
    match format {
        Format::Cjs => Ok(cjs::finalise(&context, body)),
        Format::Amd => Ok(amd::finalise(&context, body)),
        Format::Umd => umd::finalise(&context, body),
        Format::Iife => iife::finalise(&context, body),
        Format::System => Ok(system::finalise(&context, body)),
        Format::Es => Ok(esm::finalise(&context, body)),
    }
}

/// Quote a module specifier or export name as a single-quoted string literal
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// Prefix every non-empty line of `text` with `indent`
pub fn indent_lines(text: &str, indent: &str) -> String {
    if indent.is_empty() {
        return text.to_owned();
    }
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_owned()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Content shared by the callback formats (AMD, UMD, IIFE): intro, marker,
/// interop helper and bindings, body, export block, `trailer`, outro.
pub fn callback_body(context: &FinaliserContext<'_>, body: &str, trailer: &str) -> String {
    let marker = if context.needs_es_module_marker() {
        context.exports_marker()
    } else {
        String::new()
    };
    let helper = if context.needs_interop {
        interop::helper(context.output.compact)
    } else {
        ""
    };
    let unwraps = interop::callback_unwraps(context);
    let exports = export_block::render(context);
    let content = context.join_blocks([
        marker.as_str(),
        helper,
        unwraps.as_str(),
        body,
        exports.as_str(),
        trailer,
    ]);
    let content = format!("{}{content}{}", context.options.intro, context.options.outro);
    indent_lines(&content, context.render.indent())
}

/// Global variable a dependency is read from in UMD and IIFE output
pub fn dependency_global(context: &FinaliserContext<'_>, dependency: &Dependency) -> String {
    if let Some(global) = context.output.globals.get(&dependency.id) {
        return global.clone();
    }
    log::warn!(
        "No name was provided for external module '{}' in output.globals, guessing '{}'",
        dependency.id,
        dependency.name
    );
    dependency.name.clone()
}

/// Member chain for a dotted global name, e.g. `global.React.DOM`
pub fn global_path(root: &str, path: &str, legacy: bool) -> String {
    path.split('.')
        .fold(root.to_owned(), |object, segment| {
            crate::reserved_words::property_access(&object, segment, legacy)
        })
}

/// Parent objects a dotted global name needs, and the member the bundle is
/// assigned to. `my.lib` under `this` gives `this.my = this.my || {}` and
/// `this.my.lib`; a plain name needs no setup.
pub fn global_namespace(root: &str, path: &str, sp: &str, legacy: bool) -> (Vec<String>, String) {
    let mut setup = Vec::new();
    let mut object = root.to_owned();
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        object = crate::reserved_words::property_access(&object, segment, legacy);
        if segments.peek().is_some() {
            setup.push(format!("{object}{sp}={sp}{object}{sp}||{sp}{{}}"));
        }
    }
    (setup, object)
}
