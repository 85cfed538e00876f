//! CommonJS output
//!
//! Flat top-level statements: `require` wiring, then the body, then a
//! `module.exports` block.

use super::{
    FinaliserContext, export_block,
    interop::{self, BindingShape, DependencyBinding},
    quote,
};

pub fn finalise(context: &FinaliserContext<'_>, body: &str) -> String {
    let nl = context.nl();

    let mut intro = String::new();
    let use_strict = context.use_strict();
    if !use_strict.is_empty() {
        intro.push_str(&use_strict);
        intro.push_str(nl);
        intro.push_str(nl);
    }
    intro.push_str(&context.options.intro);

    let import_block = if context.output.compact {
        compact_import_block(context)
    } else {
        readable_import_block(context)
    };

    if context.needs_interop {
        intro.push_str(interop::helper(context.output.compact));
        intro.push_str(context.block_separator());
    }
    if !import_block.is_empty() {
        intro.push_str(&import_block);
        intro.push_str(context.block_separator());
    }

    let mut output = intro;
    output.push_str(body);

    let export_block = export_block::render(context);
    if !export_block.is_empty() {
        output.push_str(context.block_separator());
        output.push_str(&export_block);
    }
    output.push_str(&context.options.outro);
    output
}

/// One statement per dependency
fn readable_import_block(context: &FinaliserContext<'_>) -> String {
    let var_or_const = context.var_or_const();
    context
        .bindings
        .iter()
        .map(|DependencyBinding { dependency, shape }| {
            let id = quote(&dependency.id);
            let name = &dependency.name;
            match shape {
                BindingShape::SideEffect => format!("require({id});"),
                BindingShape::Namespace => format!("{var_or_const} {name} = require({id});"),
                BindingShape::InteropDefaultWithNames => format!(
                    "{var_or_const} {name} = require({id});\n{var_or_const} {name}__default = _interopDefault({name});"
                ),
                BindingShape::InteropDefault => {
                    format!("{var_or_const} {name} = _interopDefault(require({id}));")
                }
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Consecutive bindings merged into a single declaration
fn compact_import_block(context: &FinaliserContext<'_>) -> String {
    let var_or_const = context.var_or_const();
    let mut block = String::new();
    let mut defining_variable = false;

    for DependencyBinding { dependency, shape } in &context.bindings {
        let id = quote(&dependency.id);
        let name = &dependency.name;
        if *shape == BindingShape::SideEffect {
            if !block.is_empty() {
                block.push(if defining_variable { ';' } else { ',' });
            }
            defining_variable = false;
            block.push_str(&format!("require({id})"));
            continue;
        }

        if defining_variable {
            block.push(',');
        } else {
            if !block.is_empty() {
                block.push(';');
            }
            block.push_str(var_or_const);
            block.push(' ');
        }
        defining_variable = true;

        match shape {
            BindingShape::InteropDefaultWithNames => block.push_str(&format!(
                "{name}=require({id}),{name}__default=_interopDefault({name})"
            )),
            BindingShape::InteropDefault => {
                block.push_str(&format!("{name}=_interopDefault(require({id}))"));
            }
            BindingShape::Namespace | BindingShape::SideEffect => {
                block.push_str(&format!("{name}=require({id})"));
            }
        }
    }

    if !block.is_empty() {
        block.push(';');
    }
    block
}
