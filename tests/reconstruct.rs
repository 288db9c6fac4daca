//! Tests for rebuilding expression trees from graphs.
mod common;
use common::*;
use exprgraph::prelude::*;
use exprgraph::reconstruct::reconstruct_document_traced;

fn engine(registry: &OperationRegistry) -> LayoutEngine<'_> {
    LayoutEngine::new(registry, LayoutConfig::default())
}

fn add_constant(state: GraphState, id: &str, value: Literal) -> GraphState {
    state
        .add_node(GraphNode::constant(
            Some(id.to_string()),
            value,
            Position::default(),
            &LayoutConfig::default(),
        ))
        .unwrap()
}

fn add_operation(state: GraphState, registry: &OperationRegistry, id: &str, name: &str) -> GraphState {
    state
        .add_node(GraphNode::operation(
            Some(id.to_string()),
            name,
            Position::default(),
            registry,
            &LayoutConfig::default(),
        ))
        .unwrap()
}

#[test]
fn test_round_trip_of_documents() {
    let registry = OperationRegistry::with_defaults();
    let documents = vec![
        parse_expression_document(&and_document()).unwrap(),
        parse_expression_document(&if_literal_document()).unwrap(),
        parse_expression_document(&study_rules_document()).unwrap(),
        vec![sample_rule(), custom_expression(), Expression::leaf("getContext")],
        vec![Expression::new("and", vec![exp(Expression::leaf("X"))])],
    ];

    for expressions in documents {
        let state = engine(&registry).layout_document(&expressions);
        assert_eq!(reconstruct_document(&state).unwrap(), expressions);
    }
}

#[test]
fn test_round_trip_without_registry() {
    let registry = OperationRegistry::new();
    let expressions = vec![sample_rule(), custom_expression()];
    let state = engine(&registry).layout_document(&expressions);

    assert!(state.nodes.iter().all(|n| n.kind == NodeKind::Other));
    assert_eq!(reconstruct_document(&state).unwrap(), expressions);
}

#[test]
fn test_single_root_reconstruction() {
    let registry = OperationRegistry::with_defaults();
    let state = layout(&sample_rule(), &registry);

    assert_eq!(reconstruct(&state, "root.0").unwrap(), sample_rule());
    let condition = reconstruct(&state, "root.0.1").unwrap();
    assert_eq!(condition.name, "and");
    assert_eq!(condition.node_count(), 6);
}

#[test]
fn test_disconnected_required_slot_is_reported() {
    let registry = OperationRegistry::with_defaults();
    let expressions = parse_expression_document(&and_document()).unwrap();
    let state = engine(&registry)
        .layout_document(&expressions)
        .disconnect("root.0-1");

    assert_eq!(
        reconstruct_document(&state),
        Err(ReconstructionError::MissingRequiredSlot {
            node_id: "root.0".to_string(),
            slot: 1,
            label: "arg 1".to_string(),
        })
    );
}

#[test]
fn test_constant_node_becomes_literal_argument() {
    let registry = OperationRegistry::with_defaults();
    let expressions = parse_expression_document(&and_document()).unwrap();
    let state = engine(&registry)
        .layout_document(&expressions)
        .disconnect("root.0-1");
    let state = add_constant(state, "c1", Literal::Number(1.0));
    let state = state.connect("root.0", 1, "c1").unwrap();

    // The detached `Y` stays in the graph but is not part of the document.
    assert!(state.node("root.0.1").is_some());
    assert_eq!(
        reconstruct_document(&state).unwrap(),
        vec![Expression::new(
            "and",
            vec![exp(Expression::leaf("X")), num(1.0)]
        )]
    );
}

#[test]
fn test_edge_takes_precedence_over_inline_value() {
    let registry = OperationRegistry::with_defaults();
    let expressions = parse_expression_document(&if_literal_document()).unwrap();
    let state = engine(&registry).layout_document(&expressions);
    let state = add_operation(state, &registry, "check", "isDefined");
    let state = add_constant(state, "v", Literal::String("x".to_string()));
    let state = state.connect("check", 0, "v").unwrap();
    let state = state.connect("root.0", 0, "check").unwrap();

    let rebuilt = reconstruct_document(&state).unwrap();
    assert_eq!(
        rebuilt[0].args[0],
        exp(Expression::new("isDefined", vec![string("x")]))
    );

    // Without the edge the inline literal is used again.
    let state = state.disconnect("root.0-0");
    let rebuilt = reconstruct_document(&state).unwrap();
    assert_eq!(rebuilt[0].args[0], string("cond"));
}

#[test]
fn test_optional_trailing_slot_is_dropped() {
    let registry = OperationRegistry::with_defaults();
    let state = add_operation(GraphState::new(), &registry, "if", "IF");
    let state = add_constant(state, "a", Literal::String("cond".to_string()));
    let state = add_constant(state, "b", Literal::Number(1.0));
    let state = state
        .connect("if", 0, "a")
        .and_then(|s| s.connect("if", 1, "b"))
        .and_then(|s| s.add_root("if"))
        .unwrap();

    assert_eq!(
        reconstruct_document(&state).unwrap(),
        vec![Expression::new("IF", vec![string("cond"), num(1.0)])]
    );
}

#[test]
fn test_empty_palette_node_reports_first_required_slot() {
    let registry = OperationRegistry::with_defaults();
    let state = add_operation(GraphState::new(), &registry, "if", "IF");
    let state = add_constant(state, "a", Literal::String("cond".to_string()));
    let state = state.connect("if", 0, "a").unwrap();

    assert_eq!(
        reconstruct(&state, "if"),
        Err(ReconstructionError::MissingRequiredSlot {
            node_id: "if".to_string(),
            slot: 1,
            label: "true-branch".to_string(),
        })
    );
}

#[test]
fn test_interior_gap_in_optional_slots_is_rejected() {
    let mut registry = OperationRegistry::with_defaults();
    registry.register(OperationSchema::new(
        "pick",
        NodeKind::DynamicValue,
        Arity::Fixed(3),
        0,
        &[],
    ));
    let state = add_operation(GraphState::new(), &registry, "p", "pick");
    let state = add_constant(state, "c", Literal::Number(2.0));

    // Nothing connected: every optional position is dropped.
    assert_eq!(reconstruct(&state, "p").unwrap(), Expression::leaf("pick"));

    let state = state.connect("p", 2, "c").unwrap();
    assert_eq!(
        reconstruct(&state, "p"),
        Err(ReconstructionError::MissingRequiredSlot {
            node_id: "p".to_string(),
            slot: 0,
            label: "arg 0".to_string(),
        })
    );
}

#[test]
fn test_cycle_is_detected() {
    let registry = OperationRegistry::with_defaults();
    let expressions = parse_expression_document(&and_document()).unwrap();
    let state = engine(&registry)
        .layout_document(&expressions)
        .disconnect("root.0-1");
    let state = add_operation(state, &registry, "n", "not");
    let state = state
        .connect("root.0", 1, "n")
        .and_then(|s| s.connect("n", 0, "root.0"))
        .unwrap();

    // The loop runs through a top-level rule, which must stay listed.
    assert_eq!(state.roots, vec!["root.0"]);
    let expected = ReconstructionError::CyclicGraph {
        node_id: "root.0".to_string(),
        path: vec!["root.0".to_string(), "n".to_string(), "root.0".to_string()],
    };
    assert_eq!(reconstruct(&state, "root.0"), Err(expected.clone()));
    assert_eq!(reconstruct_document(&state), Err(expected));
}

#[test]
fn test_plugging_root_into_unrelated_node_is_not_a_cycle() {
    let registry = OperationRegistry::with_defaults();
    let expressions = parse_expression_document(&and_document()).unwrap();
    let state = engine(&registry).layout_document(&expressions);
    let state = add_operation(state, &registry, "n", "not");
    let state = state.connect("n", 0, "root.0").unwrap();

    assert!(state.roots.is_empty());
    assert!(reconstruct_document(&state).unwrap().is_empty());
    assert_eq!(
        reconstruct(&state, "n").unwrap(),
        Expression::new("not", vec![exp(expressions[0].clone())])
    );
}

#[test]
fn test_self_loop_is_detected() {
    let registry = OperationRegistry::with_defaults();
    let state = add_operation(GraphState::new(), &registry, "n", "not");
    let state = state.connect("n", 0, "n").unwrap();

    assert!(matches!(
        reconstruct(&state, "n"),
        Err(ReconstructionError::CyclicGraph { node_id, .. }) if node_id == "n"
    ));
}

#[test]
fn test_constant_cannot_be_a_root() {
    let state = add_constant(GraphState::new(), "c", Literal::Number(1.0));
    assert_eq!(
        reconstruct(&state, "c"),
        Err(ReconstructionError::ConstantRoot("c".to_string()))
    );

    let mut state = state;
    state.roots.push("c".to_string());
    assert!(matches!(
        reconstruct_document(&state),
        Err(ReconstructionError::ConstantRoot(_))
    ));
}

#[test]
fn test_unnamed_operation_is_rejected() {
    let registry = OperationRegistry::with_defaults();
    let node = GraphNode::for_kind(
        NodeKind::Other,
        Some("blank".to_string()),
        Position::default(),
        &registry,
        &LayoutConfig::default(),
    );
    let state = GraphState::new()
        .add_node(node)
        .and_then(|s| s.add_root("blank"))
        .unwrap();

    assert_eq!(
        reconstruct_document(&state),
        Err(ReconstructionError::UnnamedOperation("blank".to_string()))
    );
}

#[test]
fn test_missing_nodes_are_reported() {
    let registry = OperationRegistry::with_defaults();
    let state = layout(&sample_rule(), &registry);

    assert_eq!(
        reconstruct(&state, "nope"),
        Err(ReconstructionError::NodeNotFound {
            missing_node_id: "nope".to_string(),
            referenced_from: "<root>".to_string(),
        })
    );

    let mut broken = state.clone();
    broken.nodes.retain(|n| n.id != "root.0.2");
    assert_eq!(
        reconstruct(&broken, "root.0"),
        Err(ReconstructionError::NodeNotFound {
            missing_node_id: "root.0.2".to_string(),
            referenced_from: "root.0".to_string(),
        })
    );
}

#[test]
fn test_unreachable_nodes_do_not_affect_result() {
    let registry = OperationRegistry::with_defaults();
    let state = layout(&sample_rule(), &registry);
    let state = add_operation(state, &registry, "orphan", "IF");
    let state = add_constant(state, "loose", Literal::Number(9.0));

    assert_eq!(reconstruct_document(&state).unwrap(), vec![sample_rule()]);
}

#[test]
fn test_trace_maps_tree_paths_to_node_keys() {
    let registry = OperationRegistry::with_defaults();
    let expressions = parse_expression_document(&study_rules_document()).unwrap();
    let state = engine(&registry).layout_document(&expressions);
    let trace = reconstruct_document_traced(&state).unwrap();

    assert_eq!(trace.expressions, expressions);
    assert_eq!(trace.visited.len(), state.nodes.len());
    for node in &state.nodes {
        let path = parse_node_id(&node.id).unwrap();
        assert_eq!(trace.keys.get(&path), Some(&node.key));
    }
}
