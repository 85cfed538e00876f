//! Default-export interop for external dependencies
//!
//! External modules may be real ES modules exposing `default`, or plain
//! CommonJS values. `_interopDefault` returns `default` when the loaded value
//! is an object carrying one and the value itself otherwise.

use super::{Dependency, FinaliserContext};
use crate::reserved_words::property_access;

pub const INTEROP_HELPER: &str = "function _interopDefault (ex) { return (ex && (typeof ex === 'object') && 'default' in ex) ? ex['default'] : ex; }";

pub const INTEROP_HELPER_COMPACT: &str =
    "function _interopDefault(e){return(e&&(typeof e==='object')&&'default'in e)?e['default']:e}";

/// Helper definition for the requested rendering mode
pub const fn helper(compact: bool) -> &'static str {
    if compact {
        INTEROP_HELPER_COMPACT
    } else {
        INTEROP_HELPER
    }
}

/// How the output binds a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingShape {
    /// Loaded for side effects, no identifier
    SideEffect,
    /// `name` is the dependency's namespace value as loaded
    Namespace,
    /// `name` is the unwrapped default export
    InteropDefault,
    /// `name` is the namespace, `name__default` the unwrapped default
    InteropDefaultWithNames,
}

impl BindingShape {
    pub const fn is_interop(self) -> bool {
        matches!(self, Self::InteropDefault | Self::InteropDefaultWithNames)
    }
}

/// A dependency together with its binding decision
#[derive(Debug, Clone, Copy)]
pub struct DependencyBinding<'a> {
    pub dependency: &'a Dependency,
    pub shape: BindingShape,
}

impl DependencyBinding<'_> {
    /// Identifier holding the dependency's default export, if it has its own
    pub fn default_name(&self) -> Option<String> {
        match self.shape {
            BindingShape::InteropDefault => Some(self.dependency.name.clone()),
            BindingShape::InteropDefaultWithNames => {
                Some(format!("{}__default", self.dependency.name))
            }
            BindingShape::SideEffect | BindingShape::Namespace => None,
        }
    }

    /// Expression reading `imported` from this dependency
    pub fn member_expression(&self, imported: &str, legacy: bool) -> String {
        let name = &self.dependency.name;
        if imported == "*" {
            return name.clone();
        }
        if imported == "default"
            && let Some(default_name) = self.default_name()
        {
            return default_name;
        }
        property_access(name, imported, legacy)
    }
}

/// Decide how a single dependency is bound
pub fn binding_shape(dependency: &Dependency, interop: bool) -> BindingShape {
    if dependency.is_side_effect_only() {
        BindingShape::SideEffect
    } else if !interop || dependency.is_chunk || !dependency.exports_default {
        BindingShape::Namespace
    } else if dependency.exports_names {
        BindingShape::InteropDefaultWithNames
    } else {
        BindingShape::InteropDefault
    }
}

/// Bind every dependency in order. The flag reports whether the helper has
/// to be emitted, which only formats without native default handling do.
pub fn resolve_bindings(
    dependencies: &[Dependency],
    interop: bool,
    format_uses_helper: bool,
) -> (Vec<DependencyBinding<'_>>, bool) {
    let bindings: Vec<_> = dependencies
        .iter()
        .map(|dependency| DependencyBinding {
            dependency,
            shape: binding_shape(dependency, interop),
        })
        .collect();
    let needs_helper =
        format_uses_helper && bindings.iter().any(|binding| binding.shape.is_interop());
    (bindings, needs_helper)
}

/// Unwrap statements for formats that receive dependencies as callback
/// arguments (AMD, UMD, IIFE)
pub fn callback_unwraps(context: &FinaliserContext<'_>) -> String {
    if !context.capabilities.default_interop {
        return String::new();
    }
    let sp = context.sp();
    let var_or_const = context.var_or_const();
    let statements: Vec<String> = context
        .bindings
        .iter()
        .filter_map(|binding| {
            let name = &binding.dependency.name;
            match binding.shape {
                BindingShape::InteropDefault => {
                    Some(format!("{name}{sp}={sp}_interopDefault({name});"))
                }
                BindingShape::InteropDefaultWithNames => Some(format!(
                    "{var_or_const} {name}__default{sp}={sp}_interopDefault({name});"
                )),
                BindingShape::SideEffect | BindingShape::Namespace => None,
            }
        })
        .collect();
    statements.join(context.nl())
}
