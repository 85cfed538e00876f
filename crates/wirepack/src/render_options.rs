//! Options consumed while rendering individual variables

/// Declaration keyword used for generated bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeclarationKeyword {
    #[default]
    Var,
    Const,
}

impl DeclarationKeyword {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Const => "const",
        }
    }
}

impl std::fmt::Display for DeclarationKeyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings handed to `render_block` and friends by the chunk renderer
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Drop optional whitespace and newlines
    pub compact: bool,
    /// Target engines without accessor properties or `Object.freeze`
    pub legacy: bool,
    /// Wrap namespace objects in `Object.freeze`
    pub freeze: bool,
    /// Tag namespace objects with `Symbol.toStringTag = 'Module'`
    pub namespace_to_string_tag: bool,
    /// Register bindings at runtime through `exports(name, value)`
    pub system_bindings: bool,
    /// One level of indentation
    pub indent: String,
    pub var_or_const: DeclarationKeyword,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            compact: false,
            legacy: false,
            freeze: true,
            namespace_to_string_tag: false,
            system_bindings: false,
            indent: "\t".to_owned(),
            var_or_const: DeclarationKeyword::Var,
        }
    }
}

impl RenderOptions {
    /// Optional space
    pub const fn sp(&self) -> &'static str {
        if self.compact { "" } else { " " }
    }

    /// Optional newline
    pub const fn nl(&self) -> &'static str {
        if self.compact { "" } else { "\n" }
    }

    /// Indentation, empty in compact mode
    pub fn indent(&self) -> &str {
        if self.compact { "" } else { &self.indent }
    }
}
