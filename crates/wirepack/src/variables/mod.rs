//! Binding records
//!
//! Every named thing a module can export is a [`Variable`]. The record keeps
//! the shared capability surface (name, inclusion, reassignment) and a
//! [`VariableKind`] tag for the behaviour that differs between plain
//! declarations, synthesized namespace objects and bindings that live in an
//! external dependency.

pub mod namespace;

#[cfg(test)]
mod tests;

pub use namespace::{NamespaceVariable, Reference};

use crate::{reserved_words::property_key, render_options::RenderOptions, types::ModuleId};

/// Variant-specific data of a [`Variable`]
#[derive(Debug, Clone)]
pub enum VariableKind {
    /// A declaration inside a bundled module
    Local,
    /// The object an `import * as ns` binding resolves to
    Namespace(NamespaceVariable),
    /// A binding provided by an external dependency
    External {
        /// Specifier of the dependency the binding comes from
        source: String,
    },
}

/// A binding record in the binding graph
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    module: ModuleId,
    included: bool,
    is_reassigned: bool,
    export_name: Option<String>,
    kind: VariableKind,
}

impl Variable {
    /// Create a plain declaration
    pub fn local(module: ModuleId, name: impl Into<String>) -> Self {
        Self::with_kind(module, name, VariableKind::Local)
    }

    /// Create a binding that resolves into an external dependency
    pub fn external(module: ModuleId, name: impl Into<String>, source: impl Into<String>) -> Self {
        Self::with_kind(
            module,
            name,
            VariableKind::External {
                source: source.into(),
            },
        )
    }

    pub(crate) fn namespace(module: ModuleId, name: impl Into<String>) -> Self {
        Self::with_kind(
            module,
            name,
            VariableKind::Namespace(NamespaceVariable::default()),
        )
    }

    fn with_kind(module: ModuleId, name: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            name: name.into(),
            module,
            included: false,
            is_reassigned: false,
            export_name: None,
            kind,
        }
    }

    /// Current rendered identifier
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Renaming hook. Must not be called once rendering has started.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Module that owns this binding
    pub const fn module(&self) -> ModuleId {
        self.module
    }

    pub const fn is_included(&self) -> bool {
        self.included
    }

    pub const fn is_reassigned(&self) -> bool {
        self.is_reassigned
    }

    pub fn mark_reassigned(&mut self) {
        self.is_reassigned = true;
    }

    /// Name under which a dynamic-registration format publishes this binding
    pub fn export_name(&self) -> Option<&str> {
        self.export_name.as_deref()
    }

    pub fn set_export_name(&mut self, export_name: impl Into<String>) {
        self.export_name = Some(export_name.into());
    }

    pub const fn kind(&self) -> &VariableKind {
        &self.kind
    }

    pub const fn is_namespace(&self) -> bool {
        matches!(self.kind, VariableKind::Namespace(_))
    }

    pub const fn is_external(&self) -> bool {
        matches!(self.kind, VariableKind::External { .. })
    }

    pub const fn as_namespace(&self) -> Option<&NamespaceVariable> {
        match &self.kind {
            VariableKind::Namespace(namespace) => Some(namespace),
            _ => None,
        }
    }

    pub(crate) const fn as_namespace_mut(&mut self) -> Option<&mut NamespaceVariable> {
        match &mut self.kind {
            VariableKind::Namespace(namespace) => Some(namespace),
            _ => None,
        }
    }

    /// Whether reads of this binding must observe later writes
    pub fn needs_live_binding(&self) -> bool {
        self.is_reassigned
            || self
                .as_namespace()
                .is_some_and(NamespaceVariable::render_first)
    }

    /// Flip the inclusion flag. Returns `false` when it was already set.
    pub(crate) const fn mark_included(&mut self) -> bool {
        if self.included {
            return false;
        }
        self.included = true;
        true
    }
}

/// Render one member of an object literal that exposes `value` under `key`.
///
/// Live members become getters so later writes to the binding are observed.
/// Legacy output has no accessor syntax, so it always copies the value.
pub fn render_property(key: &str, value: &str, live: bool, options: &RenderOptions) -> String {
    let sp = options.sp();
    let indent = options.indent();
    if live && !options.legacy {
        let key = property_key(key, false);
        return format!("{indent}get {key}(){sp}{{{sp}return {value};{sp}}}");
    }
    let key = property_key(key, options.legacy);
    format!("{indent}{key}:{sp}{value}")
}

/// Render a complete object literal from already rendered members
pub fn render_object_literal(members: &[String], options: &RenderOptions) -> String {
    if members.is_empty() {
        return "{}".to_owned();
    }
    let nl = options.nl();
    format!("{{{nl}{}{nl}}}", members.join(&format!(",{nl}")))
}
