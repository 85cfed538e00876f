//! Trailing export block of an output unit
//!
//! The block depends on the export mode and on the format's export
//! mechanism: `module.exports`, an `exports` object handed to a callback,
//! `exports()` registration calls or `export` declarations.

use super::{FinaliserContext, Format, MarkerPlacement, quote};
use crate::{
    export_mode::ExportMode,
    reserved_words::property_access,
    variables::{render_object_literal, render_property},
};

/// One entry of a named export block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportMember {
    pub exported: String,
    /// Expression producing the value
    pub value: String,
    pub live: bool,
}

/// Render the export block for `context`, empty when nothing is exported
pub fn render(context: &FinaliserContext<'_>) -> String {
    match context.options.export_mode {
        ExportMode::None => String::new(),
        ExportMode::Default => render_default(context),
        ExportMode::Named => match context.format {
            Format::Cjs => render_module_exports(context),
            Format::Amd | Format::Umd | Format::Iife => render_exports_object(context),
            Format::System => render_system(context),
            Format::Es => render_declarations(context),
        },
    }
}

fn own_default(context: &FinaliserContext<'_>) -> Option<String> {
    context
        .options
        .exports
        .iter()
        .find(|export| export.exported == "default")
        .map(|export| export.local.clone())
}

/// Expression exported as `default`
pub fn default_expression(context: &FinaliserContext<'_>) -> Option<String> {
    if let Some(local) = own_default(context) {
        return Some(local);
    }
    context.bindings.iter().find_map(|binding| {
        binding
            .dependency
            .reexport_specifiers()
            .iter()
            .find(|specifier| specifier.reexported == "default")
            .map(|specifier| binding.member_expression(&specifier.imported, context.output.legacy))
    })
}

fn render_default(context: &FinaliserContext<'_>) -> String {
    // Declarative formats publish re-exported defaults next to the import
    let expression = match context.format {
        Format::System | Format::Es => own_default(context),
        Format::Cjs | Format::Amd | Format::Umd | Format::Iife => default_expression(context),
    };
    let Some(expression) = expression else {
        return String::new();
    };
    let sp = context.sp();
    match context.format {
        Format::Cjs => format!("module.exports{sp}={sp}{expression};"),
        Format::Amd | Format::Umd | Format::Iife => format!("return {expression};"),
        Format::System => format!("exports('default',{sp}{expression});"),
        Format::Es => format!("export default {expression};"),
    }
}

/// Own exports followed by named re-exports of dependencies
pub fn named_members(context: &FinaliserContext<'_>) -> Vec<ExportMember> {
    let own = context.options.exports.iter().map(|export| ExportMember {
        exported: export.exported.clone(),
        value: export.local.clone(),
        live: export.live,
    });
    let reexported = context.bindings.iter().flat_map(|binding| {
        binding
            .dependency
            .reexport_specifiers()
            .iter()
            .filter(|specifier| !specifier.is_star())
            .map(move |specifier| ExportMember {
                exported: specifier.reexported.clone(),
                value: binding.member_expression(&specifier.imported, context.output.legacy),
                // Property reads on the dependency are re-evaluated on access
                live: specifier.imported != "*",
            })
    });
    own.chain(reexported).collect()
}

/// Copy every non-default export of star re-exported dependencies onto
/// `target`, leaving names the output unit exports itself alone
fn render_star_reexports(context: &FinaliserContext<'_>, target: &str) -> Vec<String> {
    let sp = context.sp();
    context
        .bindings
        .iter()
        .filter(|binding| {
            binding
                .dependency
                .reexport_specifiers()
                .iter()
                .any(|specifier| specifier.is_star())
        })
        .map(|binding| {
            let source = &binding.dependency.name;
            let assign = if context.output.legacy {
                format!("{target}[k]{sp}={sp}{source}[k];")
            } else {
                format!(
                    "Object.defineProperty({target},{sp}k,{sp}{{{sp}enumerable:{sp}true,{sp}get:{sp}function{sp}(){sp}{{{sp}return {source}[k];{sp}}}{sp}}});"
                )
            };
            format!(
                "Object.keys({source}).forEach(function{sp}(k){sp}{{{sp}if{sp}(k{sp}!=={sp}'default'{sp}&&{sp}!Object.prototype.hasOwnProperty.call({target},{sp}k)){sp}{assign}{sp}}});"
            )
        })
        .collect()
}

/// `module.exports = { ... };`
fn render_module_exports(context: &FinaliserContext<'_>) -> String {
    let sp = context.sp();
    let members: Vec<String> = named_members(context)
        .iter()
        .map(|member| render_property(&member.exported, &member.value, member.live, &context.render))
        .collect();
    let mut object = render_object_literal(&members, &context.render);
    if context.needs_es_module_marker()
        && context.capabilities.es_module_marker == MarkerPlacement::ModuleExports
    {
        object = format!(
            "Object.defineProperty({object},{sp}'__esModule',{sp}{{{sp}value:{sp}true{sp}}})"
        );
    }

    let mut statements = vec![format!("module.exports{sp}={sp}{object};")];
    statements.extend(render_star_reexports(context, "module.exports"));
    statements.join(context.nl())
}

/// Assignments onto the `exports` object passed to a callback
fn render_exports_object(context: &FinaliserContext<'_>) -> String {
    let sp = context.sp();
    let legacy = context.output.legacy;
    let mut statements: Vec<String> = named_members(context)
        .into_iter()
        .map(|member| {
            if member.live && !legacy {
                format!(
                    "Object.defineProperty(exports,{sp}{},{sp}{{{sp}enumerable:{sp}true,{sp}get:{sp}function{sp}(){sp}{{{sp}return {};{sp}}}{sp}}});",
                    quote(&member.exported),
                    member.value
                )
            } else {
                let target = property_access("exports", &member.exported, legacy);
                format!("{target}{sp}={sp}{};", member.value)
            }
        })
        .collect();
    statements.extend(render_star_reexports(context, "exports"));
    statements.join(context.nl())
}

/// `exports('name', value)` registrations. Re-exports are published from
/// the dependency setters instead.
fn render_system(context: &FinaliserContext<'_>) -> String {
    let sp = context.sp();
    match context.options.exports.as_slice() {
        [] => String::new(),
        [export] => format!("exports({},{sp}{});", quote(&export.exported), export.local),
        exports => {
            let members: Vec<String> = exports
                .iter()
                .map(|export| render_property(&export.exported, &export.local, false, &context.render))
                .collect();
            format!("exports({});", render_object_literal(&members, &context.render))
        }
    }
}

/// `export { a, b as c };`
fn render_declarations(context: &FinaliserContext<'_>) -> String {
    if context.options.exports.is_empty() {
        return String::new();
    }
    let sp = context.sp();
    let specifiers: Vec<String> = context
        .options
        .exports
        .iter()
        .map(|export| {
            if export.local == export.exported {
                export.local.clone()
            } else {
                format!("{} as {}", export.local, export.exported)
            }
        })
        .collect();
    format!("export{sp}{{{sp}{}{sp}}};", specifiers.join(&format!(",{sp}")))
}
