//! SystemJS output
//!
//! Dependencies arrive through `setters` and exports are published with
//! `exports(name, value)`, so bindings stay live without interop helpers.

use super::{
    FinaliserContext, export_block, indent_lines,
    interop::{BindingShape, DependencyBinding},
    quote,
};
use crate::{
    reserved_words::property_access,
    variables::{render_object_literal, render_property},
};

/// Statements run when `binding`'s module becomes available
fn setter_statements(context: &FinaliserContext<'_>, binding: &DependencyBinding<'_>) -> Vec<String> {
    let sp = context.sp();
    let legacy = context.output.legacy;
    let name = &binding.dependency.name;
    let default_member = property_access("module", "default", legacy);
    let mut statements = Vec::new();

    if binding.dependency.has_imports() {
        match binding.shape {
            BindingShape::InteropDefault => {
                statements.push(format!("{name}{sp}={sp}{default_member};"));
            }
            BindingShape::InteropDefaultWithNames => {
                statements.push(format!("{name}{sp}={sp}module;"));
                statements.push(format!("{name}__default{sp}={sp}{default_member};"));
            }
            BindingShape::Namespace | BindingShape::SideEffect => {
                statements.push(format!("{name}{sp}={sp}module;"));
            }
        }
    }

    let specifiers = binding.dependency.reexport_specifiers();
    if specifiers.iter().any(|specifier| specifier.is_star()) {
        statements.push(format!(
            "var _setter{sp}={sp}{{}};{sp}for{sp}(var _$p in module){sp}{{{sp}if{sp}(_$p{sp}!=={sp}'default'){sp}_setter[_$p]{sp}={sp}module[_$p];{sp}}}{sp}exports(_setter);"
        ));
    }
    let named: Vec<(String, String)> = specifiers
        .iter()
        .filter(|specifier| !specifier.is_star())
        .map(|specifier| {
            let value = if specifier.imported == "*" {
                "module".to_owned()
            } else {
                property_access("module", &specifier.imported, legacy)
            };
            (specifier.reexported.clone(), value)
        })
        .collect();
    match named.as_slice() {
        [] => {}
        [(exported, value)] => statements.push(format!("exports({},{sp}{value});", quote(exported))),
        _ => {
            let members: Vec<String> = named
                .iter()
                .map(|(exported, value)| render_property(exported, value, false, &context.render))
                .collect();
            statements.push(format!(
                "exports({});",
                render_object_literal(&members, &context.render)
            ));
        }
    }
    statements
}

fn render_setter(context: &FinaliserContext<'_>, binding: &DependencyBinding<'_>, t: &str) -> String {
    let sp = context.sp();
    let nl = context.nl();
    let statements = setter_statements(context, binding);
    if statements.is_empty() {
        return format!("function{sp}(){sp}{{}}");
    }
    let inner = indent_lines(&statements.join(nl), &t.repeat(3));
    format!("function{sp}(module){sp}{{{nl}{inner}{nl}{t}{t}}}")
}

pub fn finalise(context: &FinaliserContext<'_>, body: &str) -> String {
    let sp = context.sp();
    let nl = context.nl();
    let t = context.render.indent();
    let separator = format!(",{sp}");

    let registered_name = context
        .output
        .name
        .as_ref()
        .map(|name| format!("{},{sp}", quote(name)))
        .unwrap_or_default();
    let dependency_ids: Vec<String> = context
        .bindings
        .iter()
        .map(|binding| quote(&binding.dependency.id))
        .collect();

    let mut declared: Vec<String> = Vec::new();
    for binding in &context.bindings {
        if !binding.dependency.has_imports() {
            continue;
        }
        declared.push(binding.dependency.name.clone());
        if binding.shape == BindingShape::InteropDefaultWithNames {
            declared.push(format!("{}__default", binding.dependency.name));
        }
    }

    let mut output = format!(
        "System.register({registered_name}[{}],{sp}function{sp}(exports,{sp}module){sp}{{{nl}",
        dependency_ids.join(&separator)
    );
    let use_strict = context.use_strict();
    if !use_strict.is_empty() {
        output.push_str(&format!("{t}{use_strict}{nl}"));
    }
    if !declared.is_empty() {
        output.push_str(&format!("{t}var {};{nl}", declared.join(&separator)));
    }
    output.push_str(&format!("{t}return{sp}{{{nl}"));

    if !context.bindings.is_empty() {
        let setters: Vec<String> = context
            .bindings
            .iter()
            .map(|binding| render_setter(context, binding, t))
            .collect();
        output.push_str(&format!("{t}{t}setters:{sp}[{}],{nl}", setters.join(&separator)));
    }

    let exports = export_block::render(context);
    let content = context.join_blocks([body, exports.as_str()]);
    let content = format!("{}{content}{}", context.options.intro, context.options.outro);
    let content = indent_lines(&content, &t.repeat(3));
    output.push_str(&format!(
        "{t}{t}execute:{sp}function{sp}(){sp}{{{nl}{nl}{content}{nl}{nl}{t}{t}}}{nl}"
    ));
    output.push_str(&format!("{t}}};{nl}}});"));
    output
}
