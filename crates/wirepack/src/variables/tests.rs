//! Tests for variable records and namespace rendering

use pretty_assertions::assert_eq;

use super::*;
use crate::{
    binding_graph::BindingGraph,
    types::VariableId,
    variables::namespace::NamespaceNaming,
};

/// `foo` (exec 1) exports `a` and `b`; `importer` runs at `importer_exec`
/// and star-imports `foo` as `foo`.
fn namespace_fixture(importer_exec: u32) -> (BindingGraph, VariableId) {
    let mut graph = BindingGraph::new();
    let foo = graph.add_module("foo", 1).unwrap();
    let importer = graph.add_module("importer", importer_exec).unwrap();
    let a = graph.add_local(foo, "a").unwrap();
    let b = graph.add_local(foo, "b").unwrap();
    graph.add_export(foo, "a", a);
    graph.add_export(foo, "b", b);
    let namespace = graph.namespace_of(foo).unwrap();
    graph
        .add_reference(namespace, Reference::new(importer, "foo"))
        .unwrap();
    (graph, namespace)
}

fn render(graph: &BindingGraph, namespace: VariableId, options: &RenderOptions) -> String {
    graph.render_namespace_block(namespace, options).unwrap()
}

#[test]
fn test_local_variable_defaults() {
    let variable = Variable::local(ModuleId::new(0), "x");
    assert_eq!(variable.get_name(), "x");
    assert!(!variable.is_included());
    assert!(!variable.is_reassigned());
    assert!(!variable.is_namespace());
    assert!(!variable.needs_live_binding());
    assert_eq!(variable.export_name(), None);
}

#[test]
fn test_reassigned_variable_needs_live_binding() {
    let mut variable = Variable::local(ModuleId::new(0), "counter");
    variable.mark_reassigned();
    assert!(variable.needs_live_binding());
}

#[test]
fn test_mark_included_reports_first_transition_only() {
    let mut variable = Variable::external(ModuleId::new(3), "dep.x", "dep");
    assert!(variable.is_external());
    assert!(variable.mark_included());
    assert!(!variable.mark_included());
    assert!(variable.is_included());
}

#[test]
fn test_render_property_plain_and_live() {
    let options = RenderOptions::default();
    assert_eq!(render_property("a", "a$1", false, &options), "\ta: a$1");
    assert_eq!(
        render_property("a", "a$1", true, &options),
        "\tget a() { return a$1; }"
    );
}

#[test]
fn test_render_property_legacy_copies_live_values() {
    let options = RenderOptions {
        legacy: true,
        ..RenderOptions::default()
    };
    assert_eq!(render_property("default", "main", true, &options), "\t'default': main");
}

#[test]
fn test_render_object_literal_empty() {
    assert_eq!(render_object_literal(&[], &RenderOptions::default()), "{}");
}

#[test]
fn test_namespace_block_plain() {
    let (mut graph, namespace) = namespace_fixture(2);
    graph.include(namespace);
    let state = graph.variable(namespace).as_namespace().unwrap();
    assert!(state.needs_namespace_block());
    assert!(!state.render_first());

    assert_eq!(
        render(&graph, namespace, &RenderOptions::default()),
        "var foo = /*#__PURE__*/Object.freeze({\n\ta: a,\n\tb: b\n});"
    );
}

#[test]
fn test_namespace_referenced_early_uses_getters() {
    let (mut graph, namespace) = namespace_fixture(0);
    graph.include(namespace);
    assert!(graph.variable(namespace).as_namespace().unwrap().render_first());
    assert!(graph.variable(namespace).needs_live_binding());

    assert_eq!(
        render(&graph, namespace, &RenderOptions::default()),
        "var foo = /*#__PURE__*/Object.freeze({\n\tget a() { return a; },\n\tget b() { return b; }\n});"
    );
}

#[test]
fn test_reference_from_same_exec_position_counts_as_early() {
    let (mut graph, namespace) = namespace_fixture(1);
    graph.include(namespace);
    assert!(graph.variable(namespace).as_namespace().unwrap().render_first());
}

#[test]
fn test_reassigned_original_uses_getter() {
    let (mut graph, namespace) = namespace_fixture(2);
    let b = graph.variable(namespace).as_namespace().unwrap().originals()["b"];
    graph.variable_mut(b).mark_reassigned();
    graph.include(namespace);

    assert_eq!(
        render(&graph, namespace, &RenderOptions::default()),
        "var foo = /*#__PURE__*/Object.freeze({\n\ta: a,\n\tget b() { return b; }\n});"
    );
}

#[test]
fn test_unreferenced_namespace_is_not_early() {
    let mut graph = BindingGraph::new();
    let foo = graph.add_module("foo", 0).unwrap();
    let x = graph.add_local(foo, "x").unwrap();
    graph.add_export(foo, "x", x);
    let namespace = graph.namespace_of(foo).unwrap();
    graph.include(namespace);
    assert!(!graph.variable(namespace).as_namespace().unwrap().render_first());
}

#[test]
fn test_namespace_block_legacy() {
    let (mut graph, namespace) = namespace_fixture(0);
    graph.include(namespace);
    let options = RenderOptions {
        legacy: true,
        ..RenderOptions::default()
    };

    assert_eq!(
        render(&graph, namespace, &options),
        "var foo = /*#__PURE__*/(Object.freeze || Object)({\n\ta: a,\n\tb: b\n});"
    );
}

#[test]
fn test_namespace_block_without_freeze() {
    let (mut graph, namespace) = namespace_fixture(2);
    graph.include(namespace);
    let options = RenderOptions {
        freeze: false,
        ..RenderOptions::default()
    };

    assert_eq!(
        render(&graph, namespace, &options),
        "var foo = {\n\ta: a,\n\tb: b\n};"
    );
}

#[test]
fn test_namespace_block_compact() {
    let (mut graph, namespace) = namespace_fixture(2);
    graph.include(namespace);
    let options = RenderOptions {
        compact: true,
        ..RenderOptions::default()
    };

    assert_eq!(
        render(&graph, namespace, &options),
        "var foo=Object.freeze({a:a,b:b});"
    );
}

#[test]
fn test_namespace_block_to_string_tag_then_freeze() {
    let (mut graph, namespace) = namespace_fixture(2);
    graph.include(namespace);
    let options = RenderOptions {
        namespace_to_string_tag: true,
        ..RenderOptions::default()
    };

    let expected = "var foo = {\n\ta: a,\n\tb: b\n};\n\
                    if (typeof Symbol !== 'undefined' && Symbol.toStringTag)\n\
                    \tObject.defineProperty(foo, Symbol.toStringTag, { value: 'Module' });\n\
                    else\n\
                    \tObject.defineProperty(foo, 'toString', { value: function () { return '[object Module]'; } });\n\
                    Object.freeze(foo);";
    assert_eq!(render(&graph, namespace, &options), expected);
}

#[test]
fn test_namespace_block_system_registration() {
    let (mut graph, namespace) = namespace_fixture(2);
    graph.variable_mut(namespace).set_export_name("ns");
    graph.include(namespace);
    let options = RenderOptions {
        system_bindings: true,
        freeze: false,
        ..RenderOptions::default()
    };

    assert_eq!(
        render(&graph, namespace, &options),
        "var foo = {\n\ta: a,\n\tb: b\n};\nexports('ns', foo);"
    );
}

#[test]
fn test_namespace_block_is_deterministic() {
    let (mut graph, namespace) = namespace_fixture(2);
    graph.include(namespace);
    let options = RenderOptions::default();
    assert_eq!(
        render(&graph, namespace, &options),
        render(&graph, namespace, &options)
    );
}

#[test]
fn test_empty_namespace_renders_empty_object() {
    let mut graph = BindingGraph::new();
    let empty = graph.add_module("empty", 0).unwrap();
    let namespace = graph.namespace_of(empty).unwrap();
    graph.include(namespace);

    assert_eq!(
        render(&graph, namespace, &RenderOptions::default()),
        "var empty = /*#__PURE__*/Object.freeze({});"
    );
}

#[test]
fn test_last_reference_naming_renames_on_every_reference() {
    let mut graph = BindingGraph::new().with_namespace_naming(NamespaceNaming::LastReference);
    let foo = graph.add_module("foo", 0).unwrap();
    let main = graph.add_module("main", 1).unwrap();
    let namespace = graph.namespace_of(foo).unwrap();
    graph.add_reference(namespace, Reference::new(main, "first")).unwrap();
    graph.add_reference(namespace, Reference::new(main, "second")).unwrap();
    assert_eq!(graph.variable(namespace).get_name(), "second");
    assert_eq!(graph.variable(namespace).as_namespace().unwrap().references().len(), 2);
}

#[test]
fn test_first_reference_names_the_namespace_by_default() {
    let mut graph = BindingGraph::new();
    let foo = graph.add_module("foo", 0).unwrap();
    let main = graph.add_module("main", 1).unwrap();
    let namespace = graph.namespace_of(foo).unwrap();
    graph.add_reference(namespace, Reference::new(main, "first")).unwrap();
    graph.add_reference(namespace, Reference::new(main, "second")).unwrap();
    assert_eq!(graph.variable(namespace).get_name(), "first");
}
