use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wirepack::{
    Format, OutputOptions, RenderPlan,
    finalisers::interop::INTEROP_HELPER,
};

const NAMESPACE_PLAN: &str = r#"
entry = "main"

[[modules]]
name = "main"
imports = ["foo"]
code = "var answer = ns.a + ns.b;"
locals = [{ name = "answer" }]
exports = { answer = "answer" }

[[modules]]
name = "foo"
code = """
var a = 1;
var b = 2;
"""
locals = [{ name = "a" }, { name = "b" }]
exports = { a = "a", b = "b" }
namespace = { references = [{ module = "main", name = "ns" }] }
"#;

fn options(format: Format) -> OutputOptions {
    OutputOptions {
        format,
        ..OutputOptions::default()
    }
}

#[test]
fn test_render_plan_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let plan_path = temp_dir.path().join("plan.toml");
    fs::write(&plan_path, NAMESPACE_PLAN).unwrap();

    let plan = RenderPlan::load(&plan_path).unwrap();
    let rendered = plan.render(&options(Format::Cjs)).unwrap();

    assert_eq!(
        rendered,
        "'use strict';\n\n\
         var a = 1;\n\
         var b = 2;\n\n\
         var ns = /*#__PURE__*/Object.freeze({\n\ta: a,\n\tb: b\n});\n\n\
         var answer = ns.a + ns.b;\n\n\
         module.exports = Object.defineProperty({\n\tanswer: answer\n}, '__esModule', { value: true });"
    );
}

#[test]
fn test_missing_plan_file_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let error = RenderPlan::load(&temp_dir.path().join("missing.toml")).unwrap_err();
    assert!(error.to_string().contains("missing.toml"));
}

#[test]
fn test_execution_order_follows_imports() {
    let plan = RenderPlan::from_toml_str(
        r#"
entry = "a"

[[modules]]
name = "a"
imports = ["b", "c"]

[[modules]]
name = "b"
imports = ["d"]

[[modules]]
name = "c"

[[modules]]
name = "d"

[[modules]]
name = "orphan"
"#,
    )
    .unwrap();

    assert_eq!(
        plan.execution_order().unwrap(),
        vec!["d", "b", "c", "a", "orphan"]
    );
}

#[test]
fn test_explicit_exec_indices_win() {
    let plan = RenderPlan::from_toml_str(
        r#"
entry = "a"

[[modules]]
name = "a"
exec_index = 1
imports = ["b"]

[[modules]]
name = "b"
exec_index = 0

[[modules]]
name = "ext"
external = true
"#,
    )
    .unwrap();
    assert_eq!(plan.execution_order().unwrap(), vec!["b", "a"]);
}

#[test]
fn test_cyclic_namespace_is_hoisted_with_getters() {
    let plan = RenderPlan::from_toml_str(
        r#"
entry = "main"

[[modules]]
name = "main"
imports = ["foo"]
code = "var x = 1;"
locals = [{ name = "x" }]
exports = { x = "x" }
namespace = { references = [{ module = "foo", name = "main_ns" }] }

[[modules]]
name = "foo"
imports = ["main"]
code = "function read() { return main_ns.x; }"
"#,
    )
    .unwrap();

    let rendered = plan.render(&options(Format::Es)).unwrap();
    assert_eq!(
        rendered,
        "var main_ns = /*#__PURE__*/Object.freeze({\n\tget x() { return x; }\n});\n\n\
         function read() { return main_ns.x; }\n\n\
         var x = 1;\n\n\
         export { x };"
    );
}

#[test]
fn test_external_bindings_inside_namespace() {
    let plan = RenderPlan::from_toml_str(
        r#"
entry = "main"

[[modules]]
name = "main"
imports = ["foo", "ext"]
code = "console.log(foo.lib);"

[[modules]]
name = "foo"
reexports = [{ exported = "lib", from = "ext", imported = "default" }]
namespace = { references = [{ module = "main", name = "foo" }] }

[[modules]]
name = "ext"
external = true
bindings = ["default"]

[[dependencies]]
id = "ext"
name = "ext"
imports = [{ imported = "default", local = "ext" }]
exports_default = true
"#,
    )
    .unwrap();

    let rendered = plan.render(&options(Format::Cjs)).unwrap();
    assert_eq!(
        rendered,
        format!(
            "'use strict';\n\n{INTEROP_HELPER}\n\n\
             var ext = _interopDefault(require('ext'));\n\n\
             var foo = /*#__PURE__*/Object.freeze({{\n\tlib: ext\n}});\n\n\
             console.log(foo.lib);"
        )
    );
}

#[test]
fn test_excluded_namespace_is_not_rendered() {
    let plan = RenderPlan::from_toml_str(
        r#"
entry = "main"

[[modules]]
name = "main"
code = "go();"
namespace = { included = false }
"#,
    )
    .unwrap();
    let rendered = plan.render(&options(Format::Es)).unwrap();
    assert_eq!(rendered, "go();");
}

#[test]
fn test_system_registers_exported_namespace() {
    let plan = RenderPlan::from_toml_str(
        r#"
entry = "main"

[[modules]]
name = "main"
imports = ["foo"]

[[modules]]
name = "foo"
code = "var a = 1;"
locals = [{ name = "a" }]
exports = { a = "a" }
namespace = { references = [{ module = "main", name = "foo" }], export_name = "foo" }
"#,
    )
    .unwrap();
    let mut options = options(Format::System);
    options.freeze = false;

    let rendered = plan.render(&options).unwrap();
    assert!(rendered.contains("\t\t\tvar foo = {\n\t\t\t\ta: a\n\t\t\t};\n\t\t\texports('foo', foo);"));
}

#[test]
fn test_unknown_entry_is_an_error() {
    let plan = RenderPlan::from_toml_str("entry = \"nowhere\"").unwrap();
    let error = plan.render(&options(Format::Cjs)).unwrap_err();
    assert!(error.to_string().contains("nowhere"));
}

#[test]
fn test_export_of_unknown_local_is_an_error() {
    let plan = RenderPlan::from_toml_str(
        r#"
entry = "main"

[[modules]]
name = "main"
exports = { a = "missing" }
"#,
    )
    .unwrap();
    let error = plan.render(&options(Format::Cjs)).unwrap_err();
    assert!(error.to_string().contains("unknown local 'missing'"));
}

#[test]
fn test_explicit_export_mode_conflict_is_an_error() {
    let plan = RenderPlan::from_toml_str(
        r#"
entry = "main"

[[modules]]
name = "main"
locals = [{ name = "a" }]
exports = { a = "a" }
"#,
    )
    .unwrap();
    let options = OutputOptions::from_toml_str("exports = \"none\"").unwrap();
    let error = plan.render(&options).unwrap_err();
    assert!(error.to_string().contains("'none' was specified"));
}

#[test]
fn test_duplicate_module_is_an_error() {
    let plan = RenderPlan::from_toml_str(
        r#"
entry = "main"

[[modules]]
name = "main"
exec_index = 0

[[modules]]
name = "main"
exec_index = 1
"#,
    )
    .unwrap();
    let error = plan.render(&options(Format::Cjs)).unwrap_err();
    assert!(error.to_string().contains("declared twice"));
}

#[test]
fn test_own_export_shadows_star_reexport_in_output() {
    let plan = RenderPlan::from_toml_str(
        r#"
entry = "main"

[[modules]]
name = "main"
imports = ["lib"]
code = "var a = 3;"
locals = [{ name = "a" }]
exports = { a = "a" }
star_reexports = ["lib"]

[[modules]]
name = "lib"
code = """
var a$1 = 1;
var b = 2;
"""
locals = [{ name = "a$1" }, { name = "b" }]
exports = { a = "a$1", b = "b" }
"#,
    )
    .unwrap();

    let rendered = plan.render(&options(Format::Es)).unwrap();
    assert_eq!(
        rendered,
        "var a$1 = 1;\nvar b = 2;\n\nvar a = 3;\n\nexport { a, b };"
    );

    let rendered = plan.render(&options(Format::Cjs)).unwrap();
    assert!(rendered.contains("({\n\ta: a,\n\tb: b\n}"), "{rendered}");
}
