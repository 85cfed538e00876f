//! IIFE output: a function expression invoked with browser globals

use anyhow::{Result, bail};

use super::{FinaliserContext, callback_body, dependency_global, global_namespace};
use crate::{export_mode::ExportMode, reserved_words::is_valid_identifier};

pub fn finalise(context: &FinaliserContext<'_>, body: &str) -> Result<String> {
    let sp = context.sp();
    let nl = context.nl();
    let mode = context.options.export_mode;
    let separator = format!(",{sp}");

    let assignment = match (&context.output.name, mode) {
        (_, ExportMode::None) => String::new(),
        (None, _) => bail!("You must supply output.name for IIFE bundles that have exports"),
        (Some(name), _) if is_valid_identifier(name) => format!("var {name}{sp}={sp}"),
        (Some(name), _) => {
            let (setup, target) = global_namespace("this", name, sp, context.output.legacy);
            let setup = setup
                .iter()
                .map(|line| format!("{line};{nl}"))
                .collect::<Vec<_>>()
                .concat();
            format!("{setup}{target}{sp}={sp}")
        }
    };

    let mut parameters = Vec::new();
    let mut arguments = Vec::new();
    if mode == ExportMode::Named {
        parameters.push("exports".to_owned());
        arguments.push("{}".to_owned());
    }
    for binding in context.bound_dependencies() {
        parameters.push(binding.dependency.name.clone());
        arguments.push(dependency_global(context, binding.dependency));
    }

    let use_strict = context.use_strict();
    let use_strict = if use_strict.is_empty() {
        String::new()
    } else {
        format!("{sp}{use_strict}")
    };

    let trailer = if mode == ExportMode::Named {
        "return exports;"
    } else {
        ""
    };
    let content = callback_body(context, body, trailer);
    Ok(format!(
        "{assignment}(function{sp}({}){sp}{{{use_strict}{nl}{nl}{content}{nl}{nl}}}({}));",
        parameters.join(&separator),
        arguments.join(&separator)
    ))
}
