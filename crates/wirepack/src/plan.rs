//! Render plans
//!
//! A render plan is the hand-off from the graph and chunking stages: the
//! modules of one output unit with their bindings, exports and rendered
//! code, the dependency descriptors and the intro/outro text. Plans are
//! plain TOML so the CLI and the integration tests can drive the whole
//! pipeline:
//!
//! ```toml
//! entry = "main"
//!
//! [[modules]]
//! name = "main"
//! code = "var answer = 42;"
//! locals = [{ name = "answer" }]
//! exports = { answer = "answer" }
//! ```

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, trace};
use petgraph::{graph::DiGraph, visit::DfsPostOrder};
use serde::Deserialize;

use crate::{
    binding_graph::BindingGraph,
    config::OutputOptions,
    export_mode,
    finalisers::{Dependency, FinaliserOptions, finalise, interop},
    render_options::RenderOptions,
    reserved_words::property_access,
    types::{FxIndexMap, ModuleId, VariableId},
    variables::{Reference, Variable},
};

const fn default_true() -> bool {
    true
}

/// A declaration inside a bundled module
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalPlan {
    /// Rendered (already deconflicted) name
    pub name: String,
    #[serde(default)]
    pub reassigned: bool,
    #[serde(default = "default_true")]
    pub included: bool,
    /// Runtime registration name for SystemJS
    #[serde(default)]
    pub export_name: Option<String>,
}

/// `export { imported as exported } from 'from'`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReexportPlan {
    pub exported: String,
    pub from: String,
    pub imported: String,
}

/// A use site of a module's namespace
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferencePlan {
    pub module: String,
    pub name: String,
}

/// Star-import target description
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespacePlan {
    #[serde(default = "default_true")]
    pub included: bool,
    #[serde(default)]
    pub references: Vec<ReferencePlan>,
    #[serde(default)]
    pub export_name: Option<String>,
}

/// One module of the graph
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModulePlan {
    /// Identifier-safe name; for external modules the dependency binding
    pub name: String,
    #[serde(default)]
    pub external: bool,
    /// Specifier of an external module, defaults to `name`
    #[serde(default)]
    pub source: Option<String>,
    /// Execution position; computed from `imports` when any module omits it
    #[serde(default)]
    pub exec_index: Option<u32>,
    /// Imported modules in source order
    #[serde(default)]
    pub imports: Vec<String>,
    /// Tree-shaken, renamed code of this module
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub locals: Vec<LocalPlan>,
    /// Exported name -> local name
    #[serde(default)]
    pub exports: FxIndexMap<String, String>,
    /// Names an external module provides
    #[serde(default)]
    pub bindings: Vec<String>,
    #[serde(default)]
    pub reexports: Vec<ReexportPlan>,
    #[serde(default)]
    pub star_reexports: Vec<String>,
    #[serde(default)]
    pub namespace: Option<NamespacePlan>,
}

impl ModulePlan {
    fn source(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }
}

/// Everything needed to render one output unit
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderPlan {
    /// Entry module of the output unit
    pub entry: String,
    #[serde(default = "default_true")]
    pub is_entry_module_facade: bool,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub outro: String,
    #[serde(default)]
    pub modules: Vec<ModulePlan>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// A plan turned into a binding graph
#[derive(Debug)]
pub struct PlannedChunk {
    pub graph: BindingGraph,
    pub entry: ModuleId,
    /// Bundled modules in execution order
    pub order: Vec<ModuleId>,
    pub module_ids: FxIndexMap<String, ModuleId>,
}

impl RenderPlan {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse render plan")
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading render plan from {}", path.display());
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read render plan {}", path.display()))?;
        Self::from_toml_str(&source).with_context(|| format!("Invalid render plan {}", path.display()))
    }

    /// Execution order of the bundled modules.
    ///
    /// Explicit `exec_index` values win when every bundled module has one.
    /// Otherwise modules run in depth-first post-order of their imports
    /// starting from the entry, followed by unreachable modules.
    pub fn execution_order(&self) -> Result<Vec<String>> {
        let bundled: Vec<&ModulePlan> = self.modules.iter().filter(|module| !module.external).collect();
        if bundled.iter().all(|module| module.exec_index.is_some()) {
            let mut ordered = bundled;
            ordered.sort_by_key(|module| module.exec_index);
            return Ok(ordered.iter().map(|module| module.name.clone()).collect());
        }

        let mut graph = DiGraph::<&str, ()>::new();
        let mut nodes = FxIndexMap::default();
        for module in &bundled {
            nodes.insert(module.name.as_str(), graph.add_node(module.name.as_str()));
        }
        for module in &bundled {
            let from = nodes[module.name.as_str()];
            for import in &module.imports {
                // Externals have no execution position of their own
                if let Some(&to) = nodes.get(import.as_str()) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        let entry = *nodes
            .get(self.entry.as_str())
            .ok_or_else(|| anyhow!("Entry module '{}' is not part of the plan", self.entry))?;
        let mut order: Vec<String> = Vec::with_capacity(nodes.len());
        let mut dfs = DfsPostOrder::new(&graph, entry);
        while let Some(node) = dfs.next(&graph) {
            order.push(graph[node].to_owned());
        }
        for name in nodes.keys() {
            if !order.iter().any(|ordered| ordered == name) {
                order.push((*name).to_owned());
            }
        }
        trace!("Execution order: {order:?}");
        Ok(order)
    }

    /// Expression an external binding is read through
    fn external_binding_name(&self, module: &ModulePlan, imported: &str, options: &OutputOptions) -> String {
        let dependency = self
            .dependencies
            .iter()
            .find(|dependency| dependency.id == module.source());
        match dependency {
            Some(dependency) => interop::DependencyBinding {
                dependency,
                shape: interop::binding_shape(dependency, options.interop),
            }
            .member_expression(imported, options.legacy),
            None => property_access(&module.name, imported, options.legacy),
        }
    }

    /// Build the binding graph, trace namespaces and apply inclusion
    pub fn build(&self, options: &OutputOptions) -> Result<PlannedChunk> {
        let order = self.execution_order()?;
        let mut graph = BindingGraph::new();
        let mut module_ids: FxIndexMap<String, ModuleId> = FxIndexMap::default();

        for module in &self.modules {
            if module_ids.contains_key(&module.name) {
                bail!("Module '{}' is declared twice", module.name);
            }
            let id = if module.external {
                graph.add_external_module(&module.name)?
            } else {
                let exec_index = order
                    .iter()
                    .position(|name| name == &module.name)
                    .unwrap_or(order.len());
                graph.add_module(&module.name, u32::try_from(exec_index)?)?
            };
            module_ids.insert(module.name.clone(), id);
        }
        let lookup = |name: &str| -> Result<ModuleId> {
            module_ids
                .get(name)
                .copied()
                .ok_or_else(|| anyhow!("Unknown module '{name}'"))
        };

        let mut included: Vec<VariableId> = Vec::new();
        for module in &self.modules {
            let id = lookup(&module.name)?;
            let mut locals: FxIndexMap<&str, VariableId> = FxIndexMap::default();
            for local in &module.locals {
                let variable = graph.add_local(id, &local.name)?;
                if local.reassigned {
                    graph.variable_mut(variable).mark_reassigned();
                }
                if let Some(export_name) = &local.export_name {
                    graph.variable_mut(variable).set_export_name(export_name);
                }
                if local.included {
                    included.push(variable);
                }
                locals.insert(local.name.as_str(), variable);
            }
            for (exported, local) in &module.exports {
                let variable = *locals.get(local.as_str()).ok_or_else(|| {
                    anyhow!("Module '{}' exports unknown local '{local}'", module.name)
                })?;
                graph.add_export(id, exported, variable);
            }
            for binding in &module.bindings {
                let name = self.external_binding_name(module, binding, options);
                let variable = graph.add_variable(Variable::external(id, name, module.source()))?;
                graph.add_export(id, binding, variable);
            }
        }

        for module in &self.modules {
            let id = lookup(&module.name)?;
            for reexport in &module.reexports {
                graph.add_reexport(id, &reexport.exported, lookup(&reexport.from)?, &reexport.imported);
            }
            for source in &module.star_reexports {
                graph.add_star_reexport(id, lookup(source)?);
            }
        }

        for module in &self.modules {
            let Some(namespace_plan) = &module.namespace else {
                continue;
            };
            let namespace = graph.namespace_of(lookup(&module.name)?)?;
            for reference in &namespace_plan.references {
                graph.add_reference(namespace, Reference::new(lookup(&reference.module)?, &reference.name))?;
            }
            if let Some(export_name) = &namespace_plan.export_name {
                graph.variable_mut(namespace).set_export_name(export_name);
            }
            if namespace_plan.included {
                included.push(namespace);
            }
        }

        for variable in included {
            graph.include(variable);
        }

        let order = order
            .iter()
            .map(|name| lookup(name))
            .collect::<Result<Vec<_>>>()?;
        let entry = lookup(&self.entry)?;
        Ok(PlannedChunk {
            graph,
            entry,
            order,
            module_ids,
        })
    }

    /// Render the output unit in the configured format
    pub fn render(&self, options: &OutputOptions) -> Result<String> {
        let PlannedChunk { mut graph, entry, order, .. } = self.build(options)?;
        let render_options = options.render_options(options.format);
        let body = self.assemble_body(&graph, &order, &render_options)?;

        let exports = graph.resolve_exports(entry)?;
        let export_mode = export_mode::resolve(options.exports, &exports, &self.dependencies, options.format)?;
        let finaliser_options = FinaliserOptions {
            dependencies: self.dependencies.clone(),
            exports,
            export_mode,
            intro: self.intro.clone(),
            outro: self.outro.clone(),
            is_entry_module_facade: self.is_entry_module_facade,
        };
        finalise(options.format, &body, &finaliser_options, options)
    }

    /// Concatenate module code in execution order, placing each included
    /// namespace block after its module, or ahead of everything when it is
    /// read before its module finishes running
    pub fn assemble_body(
        &self,
        graph: &BindingGraph,
        order: &[ModuleId],
        options: &RenderOptions,
    ) -> Result<String> {
        let mut hoisted = Vec::new();
        let mut blocks = Vec::new();
        for &module in order {
            let name = graph.get_module_name(module);
            let code = self
                .modules
                .iter()
                .find(|plan| plan.name == name)
                .map_or("", |plan| plan.code.trim_end());
            if !code.is_empty() {
                blocks.push(code.to_owned());
            }
            let Some(namespace) = graph.module(module).namespace() else {
                continue;
            };
            let variable = graph.variable(namespace);
            let Some(state) = variable.as_namespace() else {
                continue;
            };
            if !state.needs_namespace_block() {
                continue;
            }
            let block = graph.render_namespace_block(namespace, options)?;
            if state.render_first() {
                hoisted.push(block);
            } else {
                blocks.push(block);
            }
        }
        let separator = if options.compact { "" } else { "\n\n" };
        Ok(hoisted
            .into_iter()
            .chain(blocks)
            .collect::<Vec<_>>()
            .join(separator))
    }
}
