//! Namespace objects backing `import * as ns` bindings

use log::trace;

use super::{Variable, render_object_literal, render_property};
use crate::{
    finalisers::quote,
    render_options::RenderOptions,
    types::{FxIndexMap, ModuleId, VariableId},
};

/// A use site of a namespace binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Module the reference occurs in
    pub module: ModuleId,
    /// Identifier text at the use site
    pub name: String,
}

impl Reference {
    pub fn new(module: ModuleId, name: impl Into<String>) -> Self {
        Self {
            module,
            name: name.into(),
        }
    }
}

/// Which reference decides the rendered name of a namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamespaceNaming {
    /// The first recorded reference keeps its name
    #[default]
    FirstReference,
    /// Every new reference renames the namespace
    LastReference,
}

/// Namespace-specific state of a [`Variable`]
#[derive(Debug, Clone, Default)]
pub struct NamespaceVariable {
    /// Exported name -> aliased binding, in export-then-reexport order
    originals: FxIndexMap<String, VariableId>,
    needs_namespace_block: bool,
    referenced_early: bool,
    references: Vec<Reference>,
}

impl NamespaceVariable {
    pub const fn originals(&self) -> &FxIndexMap<String, VariableId> {
        &self.originals
    }

    pub(crate) fn set_originals(&mut self, originals: FxIndexMap<String, VariableId>) {
        self.originals = originals;
    }

    pub const fn needs_namespace_block(&self) -> bool {
        self.needs_namespace_block
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// Record a use site. Returns the name the namespace should render under.
    pub(crate) fn add_reference(&mut self, reference: Reference, naming: NamespaceNaming) -> &str {
        self.references.push(reference);
        let chosen = match naming {
            NamespaceNaming::LastReference => self.references.last(),
            NamespaceNaming::FirstReference => self.references.first(),
        };
        chosen.map_or("", |reference| reference.name.as_str())
    }

    /// Namespace half of `include`, run the first time the owning variable is
    /// included. The caller cascades inclusion to [`Self::originals`].
    pub(crate) fn include(&mut self, owner_exec_index: u32, exec_index_of: impl Fn(ModuleId) -> u32) {
        self.needs_namespace_block = true;
        self.referenced_early = self
            .references
            .iter()
            .any(|reference| exec_index_of(reference.module) <= owner_exec_index);
        trace!(
            "Namespace included with {} members (referenced early: {})",
            self.originals.len(),
            self.referenced_early
        );
    }

    /// The declaration has to be hoisted above source-ordered declarations
    pub const fn render_first(&self) -> bool {
        self.referenced_early
    }

    /// Render the namespace object declaration.
    ///
    /// `variable` is the record owning this namespace and `variables` the
    /// arena the originals index into.
    pub fn render_block(
        &self,
        variable: &Variable,
        variables: &[Variable],
        options: &RenderOptions,
    ) -> String {
        let sp = options.sp();
        let nl = options.nl();
        let name = variable.get_name();

        let members: Vec<String> = self
            .originals
            .iter()
            .map(|(key, &original)| {
                let original = &variables[original.index()];
                let live = self.referenced_early || original.is_reassigned();
                render_property(key, original.get_name(), live, options)
            })
            .collect();
        let object = render_object_literal(&members, options);

        let freeze = if options.legacy {
            format!("(Object.freeze{sp}||{sp}Object)")
        } else {
            "Object.freeze".to_owned()
        };
        let pure = if options.compact { "" } else { "/*#__PURE__*/" };
        let keyword = options.var_or_const;

        let mut output = if options.namespace_to_string_tag {
            format!("{keyword} {name}{sp}={sp}{object};")
        } else if options.freeze {
            format!("{keyword} {name}{sp}={sp}{pure}{freeze}({object});")
        } else {
            format!("{keyword} {name}{sp}={sp}{object};")
        };

        if options.namespace_to_string_tag {
            let t = options.indent();
            let else_sep = if options.compact { " " } else { "\n" };
            output.push_str(&format!(
                "{nl}if{sp}(typeof Symbol{sp}!=={sp}'undefined'{sp}&&{sp}Symbol.toStringTag){nl}"
            ));
            output.push_str(&format!(
                "{t}Object.defineProperty({name},{sp}Symbol.toStringTag,{sp}{{{sp}value:{sp}'Module'{sp}}});{nl}"
            ));
            output.push_str(&format!("else{else_sep}"));
            output.push_str(&format!(
                "{t}Object.defineProperty({name},{sp}'toString',{sp}{{{sp}value:{sp}function{sp}(){sp}{{{sp}return '[object Module]';{sp}}}{sp}}});"
            ));
            if options.freeze {
                output.push_str(&format!("{nl}{freeze}({name});"));
            }
        }

        if options.system_bindings
            && let Some(export_name) = variable.export_name()
        {
            output.push_str(&format!("{nl}exports({},{sp}{name});", quote(export_name)));
        }

        output
    }
}
