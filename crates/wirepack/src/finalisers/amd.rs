//! AMD output: `define([deps], function (args) { ... });`

use super::{FinaliserContext, callback_body, quote};
use crate::export_mode::ExportMode;

/// Dependency array entries and matching callback parameters.
///
/// Side-effect-only dependencies go last in the array and get no parameter,
/// so the parameters stay aligned with the array.
pub fn dependencies_and_parameters(context: &FinaliserContext<'_>) -> (Vec<String>, Vec<String>) {
    let mut dependencies = Vec::new();
    let mut parameters = Vec::new();
    if context.options.export_mode == ExportMode::Named {
        dependencies.push("'exports'".to_owned());
        parameters.push("exports".to_owned());
    }
    for binding in context.bound_dependencies() {
        dependencies.push(quote(&binding.dependency.id));
        parameters.push(binding.dependency.name.clone());
    }
    dependencies.extend(
        context
            .side_effect_dependencies()
            .map(|binding| quote(&binding.dependency.id)),
    );
    (dependencies, parameters)
}

pub fn finalise(context: &FinaliserContext<'_>, body: &str) -> String {
    let sp = context.sp();
    let nl = context.nl();
    let (dependencies, parameters) = dependencies_and_parameters(context);

    let mut define_params = String::new();
    if let Some(id) = &context.output.amd_id {
        define_params.push_str(&format!("{},{sp}", quote(id)));
    }
    if !dependencies.is_empty() {
        define_params.push_str(&format!("[{}],{sp}", dependencies.join(&format!(",{sp}"))));
    }

    let use_strict = context.use_strict();
    let use_strict = if use_strict.is_empty() {
        String::new()
    } else {
        format!("{sp}{use_strict}")
    };

    let content = callback_body(context, body, "");
    format!(
        "define({define_params}function{sp}({}){sp}{{{use_strict}{nl}{nl}{content}{nl}{nl}}});",
        parameters.join(&format!(",{sp}"))
    )
}
