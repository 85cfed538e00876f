//! Arena of modules and bindings
//!
//! The graph stage hands us modules with their export lists already
//! resolved to bindings. This module stores them in index-addressed arenas
//! and answers the questions the renderer asks:
//! - which names a module exports (`get_exports` / `get_reexports`)
//! - which binding an exported name ultimately resolves to (`trace_export`)
//! - the object backing a star import (`namespace_of`)
//!
//! Inclusion (`include`) is driven by the external tree-shaker and runs to a
//! fixed point; calling it on an already included binding is a no-op.

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, trace};
use rustc_hash::FxHashSet;

use crate::{
    finalisers::ExportBinding,
    render_options::RenderOptions,
    types::{FxIndexMap, FxIndexSet, ModuleId, VariableId},
    variables::{Reference, Variable, namespace::NamespaceNaming},
};


/// Where a re-exported name comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReexportSource {
    pub module: ModuleId,
    /// Name in the source module, `*` for its namespace
    pub imported: String,
}

/// Export registry of a single module
#[derive(Debug, Clone)]
pub struct ModuleRecord {
    pub id: ModuleId,
    /// Identifier-safe module name, used as the default namespace name
    pub name: String,
    /// Position in execution order
    pub exec_index: u32,
    pub is_external: bool,
    /// Exported name -> binding declared in this module
    exports: FxIndexMap<String, VariableId>,
    /// Exported name -> binding declared elsewhere
    reexports: FxIndexMap<String, ReexportSource>,
    /// `export * from` targets, in source order
    star_reexports: Vec<ModuleId>,
    namespace: Option<VariableId>,
}

impl ModuleRecord {
    /// Namespace variable, if something star-imported this module
    pub const fn namespace(&self) -> Option<VariableId> {
        self.namespace
    }

    pub fn star_reexports(&self) -> &[ModuleId] {
        &self.star_reexports
    }
}

/// Modules and variables of one bundle
#[derive(Debug, Clone, Default)]
pub struct BindingGraph {
    modules: Vec<ModuleRecord>,
    variables: Vec<Variable>,
    namespace_naming: NamespaceNaming,
}

impl BindingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose how namespaces pick their rendered name
    #[must_use]
    pub const fn with_namespace_naming(mut self, naming: NamespaceNaming) -> Self {
        self.namespace_naming = naming;
        self
    }

    /// Register a bundled module
    pub fn add_module(&mut self, name: impl Into<String>, exec_index: u32) -> Result<ModuleId> {
        self.push_module(name.into(), exec_index, false)
    }

    /// Register an external dependency. Its bindings are never rendered by
    /// this crate, only referenced.
    pub fn add_external_module(&mut self, name: impl Into<String>) -> Result<ModuleId> {
        self.push_module(name.into(), u32::MAX, true)
    }

    fn push_module(
        &mut self,
        name: String,
        exec_index: u32,
        is_external: bool,
    ) -> Result<ModuleId> {
        let id = ModuleId::new(next_id(self.modules.len(), "modules")?);
        trace!("Registering module {name} as {id}");
        self.modules.push(ModuleRecord {
            id,
            name,
            exec_index,
            is_external,
            exports: FxIndexMap::default(),
            reexports: FxIndexMap::default(),
            star_reexports: Vec::new(),
            namespace: None,
        });
        Ok(id)
    }

    pub fn set_exec_index(&mut self, module: ModuleId, exec_index: u32) {
        self.modules[module.index()].exec_index = exec_index;
    }

    /// Add a binding record to the arena
    pub fn add_variable(&mut self, variable: Variable) -> Result<VariableId> {
        let id = VariableId::new(next_id(self.variables.len(), "variables")?);
        self.variables.push(variable);
        Ok(id)
    }

    /// Declare `local` as a plain binding of `module`
    pub fn add_local(
        &mut self,
        module: ModuleId,
        local: impl Into<String>,
    ) -> Result<VariableId> {
        self.add_variable(Variable::local(module, local))
    }

    /// `export { variable as exported }`
    pub fn add_export(&mut self, module: ModuleId, exported: impl Into<String>, variable: VariableId) {
        self.modules[module.index()]
            .exports
            .insert(exported.into(), variable);
    }

    /// `export { imported as exported } from source`
    pub fn add_reexport(
        &mut self,
        module: ModuleId,
        exported: impl Into<String>,
        source: ModuleId,
        imported: impl Into<String>,
    ) {
        self.modules[module.index()].reexports.insert(
            exported.into(),
            ReexportSource {
                module: source,
                imported: imported.into(),
            },
        );
    }

    /// `export * from source`
    pub fn add_star_reexport(&mut self, module: ModuleId, source: ModuleId) {
        let record = &mut self.modules[module.index()];
        if !record.star_reexports.contains(&source) {
            record.star_reexports.push(source);
        }
    }

    pub fn module(&self, id: ModuleId) -> &ModuleRecord {
        &self.modules[id.index()]
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleRecord> {
        self.modules.iter()
    }

    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id.index()]
    }

    pub fn variable_mut(&mut self, id: VariableId) -> &mut Variable {
        &mut self.variables[id.index()]
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn find_module(&self, name: &str) -> Option<ModuleId> {
        self.modules
            .iter()
            .find(|record| record.name == name)
            .map(|record| record.id)
    }

    pub fn get_module_name(&self, module: ModuleId) -> &str {
        &self.modules[module.index()].name
    }

    pub fn get_module_exec_index(&self, module: ModuleId) -> u32 {
        self.modules[module.index()].exec_index
    }

    /// Names declared and exported by `module` itself
    pub fn get_exports(&self, module: ModuleId) -> Vec<String> {
        self.modules[module.index()].exports.keys().cloned().collect()
    }

    /// Names `module` exports on behalf of other modules: explicit re-exports
    /// first, then everything reachable through `export *` except `default`.
    ///
    /// Own exports shadow star-reached names of the same name, so those are
    /// left out here.
    pub fn get_reexports(&self, module: ModuleId) -> Vec<String> {
        let mut names = FxIndexSet::default();
        let mut visited = FxHashSet::default();
        self.collect_reexports(module, &mut names, &mut visited);
        let own = &self.modules[module.index()].exports;
        names.into_iter().filter(|name| !own.contains_key(name)).collect()
    }

    /// Own exports followed by re-exports, each name once
    fn exported_names(&self, module: ModuleId) -> FxIndexSet<String> {
        self.get_exports(module)
            .into_iter()
            .chain(self.get_reexports(module))
            .collect()
    }

    fn collect_reexports(
        &self,
        module: ModuleId,
        names: &mut FxIndexSet<String>,
        visited: &mut FxHashSet<ModuleId>,
    ) {
        if !visited.insert(module) {
            return;
        }
        let record = &self.modules[module.index()];
        names.extend(record.reexports.keys().cloned());
        for &target in &record.star_reexports {
            let target_record = &self.modules[target.index()];
            // External star targets cannot be enumerated statically
            if target_record.is_external {
                continue;
            }
            for name in target_record.exports.keys() {
                // Explicit re-exports shadow star-reached names
                if name != "default" && !record.reexports.contains_key(name) {
                    names.insert(name.clone());
                }
            }
            let mut nested = FxIndexSet::default();
            self.collect_reexports(target, &mut nested, visited);
            names.extend(
                nested
                    .into_iter()
                    .filter(|name| name != "default" && !record.reexports.contains_key(name)),
            );
        }
    }

    /// Resolve `name` as exported by `module` to the binding that declares it,
    /// following re-export chains.
    ///
    /// An unresolvable name is a contract violation by the graph stage and is
    /// returned as an error.
    pub fn trace_export(&mut self, module: ModuleId, name: &str) -> Result<VariableId> {
        let mut stack = FxHashSet::default();
        self.trace_export_inner(module, name, &mut stack)?
            .ok_or_else(|| anyhow!("'{name}' is not exported by {}", self.get_module_name(module)))
    }

    fn trace_export_inner(
        &mut self,
        module: ModuleId,
        name: &str,
        stack: &mut FxHashSet<(ModuleId, String)>,
    ) -> Result<Option<VariableId>> {
        let key = (module, name.to_owned());
        if stack.contains(&key) {
            return Ok(None);
        }
        let record = &self.modules[module.index()];
        if let Some(&variable) = record.exports.get(name) {
            return Ok(Some(variable));
        }

        stack.insert(key.clone());
        let result = self.trace_through_reexports(module, name, stack);
        stack.remove(&key);
        result
    }

    fn trace_through_reexports(
        &mut self,
        module: ModuleId,
        name: &str,
        stack: &mut FxHashSet<(ModuleId, String)>,
    ) -> Result<Option<VariableId>> {
        let reexport = self.modules[module.index()].reexports.get(name).cloned();
        if let Some(source) = reexport {
            if source.imported == "*" {
                return self.namespace_of(source.module).map(Some);
            }
            if stack.contains(&(source.module, source.imported.clone())) {
                bail!(
                    "Circular re-export of '{name}' from {}",
                    self.get_module_name(module)
                );
            }
            let traced = self.trace_export_inner(source.module, &source.imported, stack)?;
            return traced.map(Some).ok_or_else(|| {
                anyhow!(
                    "'{}' is not exported by {} (re-exported as '{name}' by {})",
                    source.imported,
                    self.get_module_name(source.module),
                    self.get_module_name(module)
                )
            });
        }

        if name == "default" {
            return Ok(None);
        }
        let star_targets = self.modules[module.index()].star_reexports.clone();
        for target in star_targets {
            if let Some(variable) = self.trace_export_inner(target, name, stack)? {
                return Ok(Some(variable));
            }
        }
        Ok(None)
    }

    /// The namespace variable of `module`, created on first request
    pub fn namespace_of(&mut self, module: ModuleId) -> Result<VariableId> {
        if let Some(namespace) = self.modules[module.index()].namespace {
            return Ok(namespace);
        }
        let name = self.get_module_name(module).to_owned();
        let namespace = self.add_variable(Variable::namespace(module, name.clone()))?;
        // Registered before tracing so self-referencing star exports terminate
        self.modules[module.index()].namespace = Some(namespace);

        let mut originals = FxIndexMap::default();
        for export in self.exported_names(module) {
            let original = self
                .trace_export(module, &export)
                .with_context(|| format!("Failed to build namespace for {name}"))?;
            originals.insert(export, original);
        }
        debug!("Created namespace {name} with {} members", originals.len());

        if let Some(state) = self.variables[namespace.index()].as_namespace_mut() {
            state.set_originals(originals);
        }
        Ok(namespace)
    }

    /// Record a use site of a namespace binding and rename it accordingly
    pub fn add_reference(&mut self, namespace: VariableId, reference: Reference) -> Result<()> {
        let naming = self.namespace_naming;
        let variable = &mut self.variables[namespace.index()];
        let Some(state) = variable.as_namespace_mut() else {
            bail!("{namespace} ('{}') is not a namespace", variable.get_name());
        };
        let name = state.add_reference(reference, naming).to_owned();
        variable.set_name(name);
        Ok(())
    }

    /// Mark a binding as included, cascading through namespaces
    pub fn include(&mut self, variable: VariableId) {
        let mut worklist = vec![variable];
        let modules = &self.modules;
        while let Some(id) = worklist.pop() {
            let variable = &mut self.variables[id.index()];
            if !variable.mark_included() {
                continue;
            }
            let owner_exec_index = modules[variable.module().index()].exec_index;
            if let Some(namespace) = variable.as_namespace_mut() {
                namespace.include(owner_exec_index, |module| {
                    modules[module.index()].exec_index
                });
                // Reverse so originals are included in declaration order
                worklist.extend(namespace.originals().values().rev().copied());
            }
        }
    }

    /// Render the declaration of an included namespace
    pub fn render_namespace_block(
        &self,
        namespace: VariableId,
        options: &RenderOptions,
    ) -> Result<String> {
        let variable = &self.variables[namespace.index()];
        let state = variable
            .as_namespace()
            .ok_or_else(|| anyhow!("{namespace} ('{}') is not a namespace", variable.get_name()))?;
        Ok(state.render_block(variable, &self.variables, options))
    }

    /// Export bindings of an output unit whose entry is `module`.
    ///
    /// Bindings that resolve into external dependencies are left out; they
    /// are wired through the dependency's re-export specifiers instead.
    pub fn resolve_exports(&mut self, module: ModuleId) -> Result<Vec<ExportBinding>> {
        let names = self.exported_names(module);
        let mut exports = Vec::with_capacity(names.len());
        for exported in names {
            let id = self.trace_export(module, &exported)?;
            let variable = &self.variables[id.index()];
            if variable.is_external() {
                trace!("Export '{exported}' resolves to an external binding, skipping");
                continue;
            }
            exports.push(ExportBinding {
                local: variable.get_name().to_owned(),
                live: variable.needs_live_binding(),
                exported,
            });
        }
        Ok(exports)
    }
}

/// Arena index for the next entry, refusing to wrap around
fn next_id(len: usize, arena: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| anyhow!("Too many {arena} in one bundle ({len})"))
}
