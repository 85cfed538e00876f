//! UMD output
//!
//! The factory is invoked through CommonJS when `exports`/`module` exist,
//! through `define` when an AMD loader is present, and with browser globals
//! otherwise.

use anyhow::{Result, bail};

use super::{
    FinaliserContext, amd, callback_body, dependency_global, global_namespace, global_path, quote,
};
use crate::export_mode::ExportMode;

pub fn finalise(context: &FinaliserContext<'_>, body: &str) -> Result<String> {
    let sp = context.sp();
    let nl = context.nl();
    let t = context.render.indent();
    let mode = context.options.export_mode;

    let global_name = context.output.name.as_deref();
    if mode != ExportMode::None && global_name.is_none() {
        bail!("You must supply output.name for UMD bundles that have exports");
    }

    let (amd_dependencies, parameters) = amd::dependencies_and_parameters(context);

    let mut cjs_args: Vec<String> = Vec::new();
    let mut global_args: Vec<String> = Vec::new();
    for binding in context.bound_dependencies() {
        cjs_args.push(format!("require({})", quote(&binding.dependency.id)));
        global_args.push(global_path(
            "global",
            &dependency_global(context, binding.dependency),
            context.output.legacy,
        ));
    }
    cjs_args.extend(
        context
            .side_effect_dependencies()
            .map(|binding| format!("require({})", quote(&binding.dependency.id))),
    );

    let separator = format!(",{sp}");
    let (global_setup, global_target) = global_name
        .map(|name| global_namespace("global", name, sp, context.output.legacy))
        .unwrap_or_default();
    let assign_global = |value: &str| {
        global_setup
            .iter()
            .cloned()
            .chain(std::iter::once(format!("{global_target}{sp}={sp}{value}")))
            .collect::<Vec<_>>()
            .join(&separator)
    };

    let cjs_call = match mode {
        ExportMode::Named => {
            let args = std::iter::once("exports".to_owned()).chain(cjs_args);
            format!("factory({})", args.collect::<Vec<_>>().join(&separator))
        }
        ExportMode::Default => format!("module.exports{sp}={sp}factory({})", cjs_args.join(&separator)),
        ExportMode::None => format!("factory({})", cjs_args.join(&separator)),
    };

    let mut amd_params = String::new();
    if let Some(id) = &context.output.amd_id {
        amd_params.push_str(&format!("{},{sp}", quote(id)));
    }
    if !amd_dependencies.is_empty() {
        amd_params.push_str(&format!("[{}],{sp}", amd_dependencies.join(&separator)));
    }

    let global_call = match mode {
        ExportMode::Named => {
            let args = std::iter::once(format!("({})", assign_global("{}"))).chain(global_args);
            format!("(factory({}))", args.collect::<Vec<_>>().join(&separator))
        }
        ExportMode::Default => format!(
            "({})",
            assign_global(&format!("factory({})", global_args.join(&separator)))
        ),
        ExportMode::None => format!("factory({})", global_args.join(&separator)),
    };

    let wrapper_intro = format!(
        "(function{sp}(global,{sp}factory){sp}{{{nl}\
         {t}typeof exports{sp}==={sp}'object'{sp}&&{sp}typeof module{sp}!=={sp}'undefined'{sp}?{sp}{cjs_call}{sp}:{nl}\
         {t}typeof define{sp}==={sp}'function'{sp}&&{sp}define.amd{sp}?{sp}define({amd_params}factory){sp}:{nl}\
         {t}{global_call};{nl}\
         }}(this,{sp}(function{sp}({}){sp}{{",
        parameters.join(&separator)
    );

    let use_strict = context.use_strict();
    let use_strict = if use_strict.is_empty() {
        String::new()
    } else {
        format!("{sp}{use_strict}")
    };

    let content = callback_body(context, body, "");
    Ok(format!(
        "{wrapper_intro}{use_strict}{nl}{nl}{content}{nl}{nl}}})));"
    ))
}
