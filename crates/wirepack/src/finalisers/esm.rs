//! ES module output: native `import` / `export` declarations

use super::{Dependency, FinaliserContext, ImportSpecifier, export_block, quote};

fn specifier_list(pairs: &[(&str, &str)], sp: &str) -> String {
    let rendered: Vec<String> = pairs
        .iter()
        .map(|(name, alias)| {
            if name == alias {
                (*name).to_owned()
            } else {
                format!("{name} as {alias}")
            }
        })
        .collect();
    format!("{{{sp}{}{sp}}}", rendered.join(&format!(",{sp}")))
}

fn import_statements(dependency: &Dependency, sp: &str) -> Vec<String> {
    let id = quote(&dependency.id);
    let specifiers = dependency.import_specifiers();
    let default_import = specifiers
        .iter()
        .find(|specifier| specifier.imported == "default")
        .map(|specifier| specifier.local.as_str());
    let star_import = specifiers
        .iter()
        .find(|specifier| specifier.imported == "*")
        .map(|specifier| specifier.local.as_str());
    let named: Vec<(&str, &str)> = specifiers
        .iter()
        .filter(|specifier| specifier.imported != "default" && specifier.imported != "*")
        .map(|ImportSpecifier { imported, local }| (imported.as_str(), local.as_str()))
        .collect();

    let mut statements = Vec::new();
    // A namespace import cannot share a clause with named imports
    if let Some(star) = star_import {
        let clause = default_import.map_or_else(
            || format!("* as {star}"),
            |default| format!("{default},{sp}* as {star}"),
        );
        statements.push(format!("import {clause} from{sp}{id};"));
        if !named.is_empty() {
            statements.push(format!("import {} from{sp}{id};", specifier_list(&named, sp)));
        }
    } else if default_import.is_some() || !named.is_empty() {
        let mut clause = String::new();
        if let Some(default) = default_import {
            clause.push_str(default);
        }
        if !named.is_empty() {
            if !clause.is_empty() {
                clause.push(',');
                clause.push_str(sp);
            }
            clause.push_str(&specifier_list(&named, sp));
        }
        statements.push(format!("import {clause} from{sp}{id};"));
    }
    statements
}

fn reexport_statements(dependency: &Dependency, sp: &str) -> Vec<String> {
    let id = quote(&dependency.id);
    let specifiers = dependency.reexport_specifiers();
    let mut statements = Vec::new();
    if specifiers.iter().any(|specifier| specifier.is_star()) {
        statements.push(format!("export *{sp}from{sp}{id};"));
    }
    for specifier in specifiers
        .iter()
        .filter(|specifier| specifier.imported == "*" && specifier.reexported != "*")
    {
        statements.push(format!("export * as {} from{sp}{id};", specifier.reexported));
    }
    let named: Vec<(&str, &str)> = specifiers
        .iter()
        .filter(|specifier| specifier.imported != "*")
        .map(|specifier| (specifier.imported.as_str(), specifier.reexported.as_str()))
        .collect();
    if !named.is_empty() {
        statements.push(format!("export {} from{sp}{id};", specifier_list(&named, sp)));
    }
    statements
}

/// `import` and re-export declarations for every dependency, in order
pub fn import_block(context: &FinaliserContext<'_>) -> String {
    let sp = context.sp();
    let mut statements = Vec::new();
    for binding in &context.bindings {
        let dependency = binding.dependency;
        if dependency.is_side_effect_only() {
            statements.push(format!("import {};", quote(&dependency.id)));
            continue;
        }
        statements.extend(import_statements(dependency, sp));
        statements.extend(reexport_statements(dependency, sp));
    }
    statements.join(context.nl())
}

pub fn finalise(context: &FinaliserContext<'_>, body: &str) -> String {
    let import_block = import_block(context);
    let export_block = export_block::render(context);
    let content = context.join_blocks([import_block.as_str(), body, export_block.as_str()]);
    format!("{}{content}{}", context.options.intro, context.options.outro)
}
