//! Chain resolution tests.
//!
//! Covers default-member elision, indexer routing, dynamic members, and
//! the cycle guard, against a catalog shaped like the survey object
//! model this engine serves (questions, categories, tables).

use once_cell::sync::Lazy;

use mrscript::catalog::{
    Argument, InterfaceDef, MethodDef, PropertyDef, ResolvedGraph, ScalarKind, TypeRef,
};
use mrscript::resolve::{AccessError, AccessStep, resolve_chain, trace_chain};

const VARIANT: mrscript::Ty = mrscript::Ty::scalar(ScalarKind::Variant);
const LONG: mrscript::Ty = mrscript::Ty::scalar(ScalarKind::Long);

/// Shared survey-model catalog. Each test only reads the graph.
static GRAPH: Lazy<ResolvedGraph> = Lazy::new(|| {
    ResolvedGraph::build(vec![
        // IQuestion: default indexer `Item`, dynamic sub-questions
        // (`Q.Loop1` is a child not present in the catalog).
        InterfaceDef::new("IQuestion")
            .with_default_member("Item")
            .with_dynamic_members()
            .with_property(
                PropertyDef::new("Item", TypeRef::scalar(ScalarKind::Variant)).with_indexer(
                    Argument::new("Index", TypeRef::scalar(ScalarKind::Variant)),
                ),
            )
            .with_property(PropertyDef::new("FullName", TypeRef::scalar(ScalarKind::String)))
            .with_property(PropertyDef::new("Categories", TypeRef::named("ICategories"))),
        // ICategories: collection with a required indexer.
        InterfaceDef::new("ICategories")
            .with_default_member("Item")
            .with_property(
                PropertyDef::new("Item", TypeRef::named("ICategory")).with_indexer(
                    Argument::new("Index", TypeRef::scalar(ScalarKind::Variant)),
                ),
            )
            .with_property(PropertyDef::new("Count", TypeRef::scalar(ScalarKind::Long))),
        InterfaceDef::new("ICategory")
            .with_default_member("Name")
            .with_property(PropertyDef::new("Name", TypeRef::scalar(ScalarKind::String))),
        // IStyle: no default member at all.
        InterfaceDef::new("IStyle")
            .with_property(PropertyDef::new("Width", TypeRef::scalar(ScalarKind::Long))),
        // ILabel: zero-argument default property.
        InterfaceDef::new("ILabel")
            .with_default_member("Text")
            .with_property(PropertyDef::new("Text", TypeRef::scalar(ScalarKind::String))),
        // Default member chain: ICell -> ILabel -> String.
        InterfaceDef::new("ICell")
            .with_default_member("Label")
            .with_property(PropertyDef::new("Label", TypeRef::named("ILabel"))),
        // Self-referential default member, for the cycle guard.
        InterfaceDef::new("ISelf")
            .with_default_member("Value")
            .with_property(PropertyDef::new("Value", TypeRef::named("ISelf"))),
        // A void method and a collection-returning method.
        InterfaceDef::new("IDocument")
            .with_method(MethodDef::sub("Clear"))
            .with_method(
                MethodDef::new("TableNames", TypeRef::scalar(ScalarKind::String))
                    .returns_collection(),
            ),
    ])
    .expect("test catalog is well formed")
});

fn root(name: &str) -> mrscript::Ty {
    GRAPH.interface_ty(name).unwrap()
}

// ============================================================================
// DEFAULT-MEMBER ELISION
// ============================================================================

#[test]
fn test_value_position_elides_default_property() {
    // [ILabel] used as a value is its default `Text`.
    let implied = resolve_chain(&GRAPH, root("ILabel"), &[]).unwrap();
    let explicit = resolve_chain(&GRAPH, root("ILabel"), &[AccessStep::member("Text")]).unwrap();
    assert_eq!(implied, explicit);
    assert!(implied.is_scalar(ScalarKind::String));
}

#[test]
fn test_elision_recurses_through_interfaces() {
    // ICell -> Label (ILabel) -> Text (String)
    let ty = resolve_chain(&GRAPH, root("ICell"), &[]).unwrap();
    assert!(ty.is_scalar(ScalarKind::String));
}

#[test]
fn test_no_default_member_means_no_elision() {
    let ty = resolve_chain(&GRAPH, root("IStyle"), &[]).unwrap();
    assert_eq!(ty, root("IStyle"));
}

#[test]
fn test_required_indexer_blocks_implicit_elision() {
    // ICategories' default is Item[Index] with a required subscript, so a
    // bare ICategories value stays ICategories.
    let ty = resolve_chain(&GRAPH, root("ICategories"), &[]).unwrap();
    assert_eq!(ty, root("ICategories"));
}

#[test]
fn test_default_member_cycle_is_detected() {
    let err = resolve_chain(&GRAPH, root("ISelf"), &[]).unwrap_err();
    assert_eq!(
        err,
        AccessError::DefaultPropertyCycle {
            interface: "ISelf".into()
        }
    );
}

// ============================================================================
// INDEXER ROUTING
// ============================================================================

#[test]
fn test_index_equals_explicit_default_index() {
    let routed = resolve_chain(
        &GRAPH,
        root("ICategories"),
        &[AccessStep::index(LONG)],
    )
    .unwrap();
    let explicit = resolve_chain(
        &GRAPH,
        root("ICategories"),
        &[AccessStep::member("Item"), AccessStep::index(LONG)],
    )
    .unwrap();
    assert_eq!(routed, explicit);
}

#[test]
fn test_index_yield_gets_terminal_elision() {
    // Categories[0] is an ICategory; in value position that elides to its
    // default `Name`.
    let ty = resolve_chain(
        &GRAPH,
        root("ICategories"),
        &[AccessStep::index(LONG)],
    )
    .unwrap();
    assert!(ty.is_scalar(ScalarKind::String));

    // The un-elided type is visible through the trace.
    let trace = trace_chain(
        &GRAPH,
        root("ICategories"),
        &[AccessStep::index(LONG)],
    )
    .unwrap();
    assert_eq!(trace.after_step[0], root("ICategory"));
}

#[test]
fn test_indexing_defaultless_interface_fails() {
    let err = resolve_chain(&GRAPH, root("IStyle"), &[AccessStep::index(LONG)]).unwrap_err();
    assert_eq!(
        err,
        AccessError::NotIndexable {
            type_name: "IStyle".into()
        }
    );
}

#[test]
fn test_index_cycle_is_detected() {
    let err = resolve_chain(&GRAPH, root("ISelf"), &[AccessStep::index(LONG)]).unwrap_err();
    assert!(matches!(err, AccessError::DefaultPropertyCycle { .. }));
}

// ============================================================================
// DYNAMIC MEMBERS
// ============================================================================

#[test]
fn test_dynamic_member_scenario() {
    // Q["Loop1"][{ExhibitA}] written as Q.Loop1[{ExhibitA}]: `Loop1` is a
    // sub-question not in the catalog; it resolves through the default
    // indexer, and indexing the Variant it yields stays Variant.
    let q = root("IQuestion");
    let dynamic = resolve_chain(
        &GRAPH,
        q,
        &[AccessStep::member("Loop1"), AccessStep::index(VARIANT)],
    )
    .unwrap();
    let explicit = resolve_chain(
        &GRAPH,
        q,
        &[
            AccessStep::member("Loop1"),
            AccessStep::member("Item"),
            AccessStep::index(VARIANT),
        ],
    )
    .unwrap();
    assert_eq!(dynamic, VARIANT);
    assert_eq!(dynamic, explicit);
}

#[test]
fn test_dynamic_member_call_arguments_go_unchecked() {
    // `Q.Loop1(5, 6)`: Loop1's signature is not in the catalog, so any
    // argument list is accepted and the result is the dynamic yield.
    let ty = resolve_chain(
        &GRAPH,
        root("IQuestion"),
        &[AccessStep::call("Loop1", vec![LONG, LONG])],
    )
    .unwrap();
    assert_eq!(ty, VARIANT);
}

#[test]
fn test_declared_members_win_over_dynamic_fallback() {
    let ty = resolve_chain(&GRAPH, root("IQuestion"), &[AccessStep::member("FullName")])
        .unwrap();
    assert!(ty.is_scalar(ScalarKind::String));
}

#[test]
fn test_unknown_member_without_dynamic_flag_fails() {
    let err = resolve_chain(&GRAPH, root("ICategory"), &[AccessStep::member("Loop1")])
        .unwrap_err();
    assert_eq!(
        err,
        AccessError::UnknownMember {
            interface: "ICategory".into(),
            member: "Loop1".into()
        }
    );
}

// ============================================================================
// COLLECTIONS AND CALLS
// ============================================================================

#[test]
fn test_collection_returning_method_indexes_to_element() {
    let ty = resolve_chain(
        &GRAPH,
        root("IDocument"),
        &[
            AccessStep::call("TableNames", vec![]),
            AccessStep::index(LONG),
        ],
    )
    .unwrap();
    assert!(ty.is_scalar(ScalarKind::String));
}

#[test]
fn test_com_call_syntax_on_indexer_property() {
    // ICategories.Item(0), call parentheses instead of brackets.
    let called = resolve_chain(
        &GRAPH,
        root("ICategories"),
        &[AccessStep::call("Item", vec![LONG])],
    )
    .unwrap();
    let indexed = resolve_chain(
        &GRAPH,
        root("ICategories"),
        &[AccessStep::member("Item"), AccessStep::index(LONG)],
    )
    .unwrap();
    assert_eq!(called, indexed);
}

#[test]
fn test_chain_is_case_insensitive() {
    let a = resolve_chain(&GRAPH, root("iquestion"), &[AccessStep::member("fullname")])
        .unwrap();
    let b = resolve_chain(&GRAPH, root("IQuestion"), &[AccessStep::member("FullName")])
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_deep_chain_over_the_reference_cycle() {
    // Walks IQuestion → Categories → [i] → back into the graph several
    // times; must terminate without unbounded recursion.
    let steps = vec![
        AccessStep::member("Categories"),
        AccessStep::index(LONG),
        AccessStep::member("Name"),
    ];
    let ty = resolve_chain(&GRAPH, root("IQuestion"), &steps).unwrap();
    assert!(ty.is_scalar(ScalarKind::String));
}
