//! End-to-end scenarios through the engine.
//!
//! Each test builds a model, runs requests through [`Engine::execute`] (or
//! a [`Session`]), and checks both the resulting model and the shape of the
//! trace that explains it.

use indexmap::IndexMap;

use nexus_core::expression::tokenize;
use nexus_core::graph::{Distance, GraphModel};
use nexus_core::heap::{HeapKind, HeapModel};
use nexus_core::linear::QueueModel;
use nexus_core::list::ListModel;
use nexus_core::polynomial::Polynomial;
use nexus_core::tree::{TraversalOrder, TreeKind, TreeModel};
use nexus_core::{IdAllocator, Phase, StructureModel};

use nexus_engine::request::{
    ExpressionOp, GraphOp, HeapOp, HuffmanOp, ListOp, PolynomialOp, QueueOp, TreeOp,
};
use nexus_engine::verify::invariants::{check_model, check_trace};
use nexus_engine::{Engine, EngineConfig, OperationRequest, Session};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn apply_all(engine: &Engine, model: StructureModel, requests: &[OperationRequest]) -> StructureModel {
    requests.iter().fold(model, |model, request| {
        let outcome = engine.execute(&model, request).unwrap();
        assert!(check_trace(&outcome).is_empty());
        outcome.new_model
    })
}

fn inserts(keys: &[i64]) -> Vec<OperationRequest> {
    keys.iter()
        .map(|&key| OperationRequest::Tree(TreeOp::Insert { key }))
        .collect()
}

fn as_tree(model: &StructureModel) -> &TreeModel {
    match model {
        StructureModel::Tree(tree) => tree,
        other => panic!("expected a tree, got {}", other.family()),
    }
}

// ---------------------------------------------------------------------------
// Search trees
// ---------------------------------------------------------------------------

#[test]
fn avl_duplicate_insert_is_refused() {
    let engine = Engine::default();
    let model = apply_all(
        &engine,
        StructureModel::Tree(TreeModel::new(TreeKind::Avl)),
        &inserts(&[5, 3, 8]),
    );
    let outcome = engine
        .execute(&model, &OperationRequest::Tree(TreeOp::Insert { key: 3 }))
        .unwrap();
    assert_eq!(outcome.trace.count(Phase::Duplicate), 1);
    assert_eq!(outcome.new_model, model);
    insta::assert_snapshot!(as_tree(&outcome.new_model).shape(), @"5(3,8)");
}

#[test]
fn avl_ascending_inserts_stay_balanced() {
    let engine = Engine::default();
    let keys: Vec<i64> = (1..=7).collect();
    let model = apply_all(
        &engine,
        StructureModel::Tree(TreeModel::new(TreeKind::Avl)),
        &inserts(&keys),
    );
    assert!(check_model(&model).is_empty());
    insta::assert_snapshot!(as_tree(&model).shape(), @"4(2(1,3),6(5,7))");
}

#[test]
fn bst_delete_then_traverse() {
    let engine = Engine::default();
    let mut requests = inserts(&[50, 30, 70, 20, 40, 60, 80]);
    requests.push(OperationRequest::Tree(TreeOp::Delete { key: 50 }));
    let model = apply_all(
        &engine,
        StructureModel::Tree(TreeModel::new(TreeKind::Bst)),
        &requests,
    );
    assert_eq!(as_tree(&model).keys(), vec![20, 30, 40, 60, 70, 80]);

    let outcome = engine
        .execute(
            &model,
            &OperationRequest::Tree(TreeOp::Traverse {
                order: TraversalOrder::PreOrder,
            }),
        )
        .unwrap();
    assert_eq!(outcome.trace.count(Phase::Visit), 6);
    assert_eq!(outcome.new_model, model);
}

// ---------------------------------------------------------------------------
// Heap
// ---------------------------------------------------------------------------

#[test]
fn min_heap_extracts_in_order() {
    let engine = Engine::default();
    let requests: Vec<OperationRequest> = [7, 2, 9, 4, 1]
        .iter()
        .map(|&value| OperationRequest::Heap(HeapOp::Insert { value }))
        .collect();
    let mut model = apply_all(
        &engine,
        StructureModel::Heap(HeapModel::new(HeapKind::Min)),
        &requests,
    );

    let mut extracted = Vec::new();
    for _ in 0..5 {
        let StructureModel::Heap(heap) = &model else {
            panic!("expected a heap");
        };
        extracted.push(heap.root().map(|e| e.value));
        model = engine
            .execute(&model, &OperationRequest::Heap(HeapOp::ExtractRoot))
            .unwrap()
            .new_model;
        assert!(check_model(&model).is_empty());
    }
    assert_eq!(extracted, vec![Some(1), Some(2), Some(4), Some(7), Some(9)]);

    let empty = engine
        .execute(&model, &OperationRequest::Heap(HeapOp::ExtractRoot))
        .unwrap();
    assert_eq!(empty.trace.terminal_phase(), Some(Phase::Rejected));
}

// ---------------------------------------------------------------------------
// Shortest paths
// ---------------------------------------------------------------------------

#[test]
fn dijkstra_prefers_two_short_hops() {
    let mut graph = GraphModel::new(false);
    let a = graph.add_vertex("A").unwrap();
    let b = graph.add_vertex("B").unwrap();
    let c = graph.add_vertex("C").unwrap();
    graph.add_edge(a, b, 4).unwrap();
    graph.add_edge(a, c, 1).unwrap();
    graph.add_edge(c, b, 1).unwrap();

    let outcome = Engine::default()
        .execute(
            &StructureModel::Graph(graph),
            &OperationRequest::Graph(GraphOp::ShortestPaths { source: a }),
        )
        .unwrap();
    let StructureModel::Graph(graph) = &outcome.new_model else {
        panic!("expected a graph");
    };
    assert_eq!(graph.distance(a), Distance::Finite(0));
    assert_eq!(graph.distance(c), Distance::Finite(1));
    assert_eq!(graph.distance(b), Distance::Finite(2));

    let settled: Vec<_> = outcome
        .trace
        .iter()
        .filter(|s| s.phase == Phase::ExtractMin)
        .map(|s| s.highlighted[0])
        .collect();
    assert_eq!(settled, vec![a, c, b]);

    let path = graph.path_to(b).unwrap();
    insta::assert_snapshot!(graph.path_labels(&path), @"A→C→B");
}

#[test]
fn dijkstra_refuses_negative_edges() {
    let mut graph = GraphModel::new(true);
    let a = graph.add_vertex("A").unwrap();
    let b = graph.add_vertex("B").unwrap();
    graph.add_edge(a, b, -3).unwrap();
    let model = StructureModel::Graph(graph);
    let outcome = Engine::default()
        .execute(&model, &OperationRequest::Graph(GraphOp::ShortestPaths { source: a }))
        .unwrap();
    assert_eq!(outcome.trace.phases(), vec![Phase::Error]);
    assert_eq!(outcome.new_model, model);
}

// ---------------------------------------------------------------------------
// Constructive requests
// ---------------------------------------------------------------------------

#[test]
fn huffman_classic_table() {
    let frequencies: IndexMap<String, u64> = [("a", 5), ("b", 9), ("c", 12), ("d", 13), ("e", 16), ("f", 45)]
        .iter()
        .map(|(s, f)| (s.to_string(), *f))
        .collect();
    let outcome = Engine::default()
        .execute(
            &StructureModel::List(ListModel::new()),
            &OperationRequest::Huffman(HuffmanOp::Build { frequencies }),
        )
        .unwrap();
    let StructureModel::Huffman(forest) = &outcome.new_model else {
        panic!("expected a huffman forest");
    };
    assert_eq!(forest.codes["f"], "0");
    assert_eq!(forest.codes["a"].len(), 4);
    assert_eq!(forest.codes["b"].len(), 4);
    assert_eq!(forest.weighted_length(), 224);
    assert!(check_model(&outcome.new_model).is_empty());
}

#[test]
fn infix_to_postfix_respects_precedence() {
    let engine = Engine::default();
    let convert = |expr: &str| {
        let request = OperationRequest::Expression(ExpressionOp::InfixToPostfix {
            tokens: tokenize(expr),
        });
        let outcome = engine
            .execute(&StructureModel::List(ListModel::new()), &request)
            .unwrap();
        let StructureModel::Expression(conversion) = outcome.new_model else {
            panic!("expected a conversion");
        };
        conversion.postfix()
    };
    insta::assert_snapshot!(convert("a + b * c"), @"a b c * +");
    insta::assert_snapshot!(convert("( a + b ) * c"), @"a b + c *");
}

#[test]
fn polynomial_product_combines_like_terms() {
    // (2x + 3)(x - 1) = 2x^2 + x - 3
    let mut ids = IdAllocator::default();
    let left = Polynomial::from_pairs(&[(2, 1), (3, 0)], &mut ids).unwrap();
    let right = Polynomial::from_pairs(&[(1, 1), (-1, 0)], &mut ids).unwrap();
    let outcome = Engine::default()
        .execute(
            &StructureModel::List(ListModel::new()),
            &OperationRequest::Polynomial(PolynomialOp::Multiply { left, right }),
        )
        .unwrap();
    let StructureModel::Polynomial(product) = &outcome.new_model else {
        panic!("expected a product");
    };
    assert_eq!(product.result_polynomial().pairs(), vec![(2, 2), (1, 1), (-3, 0)]);
    assert_eq!(outcome.trace.count(Phase::Multiply), 4);
    assert_eq!(outcome.trace.count(Phase::Combine), 1);
}

// ---------------------------------------------------------------------------
// Linear structures
// ---------------------------------------------------------------------------

#[test]
fn bounded_queue_blocks_when_full() {
    let engine = Engine::default();
    let enqueue = |m: &str| {
        OperationRequest::Queue(QueueOp::Enqueue {
            message: m.to_string(),
        })
    };
    let model = apply_all(
        &engine,
        StructureModel::Queue(QueueModel::with_capacity(2)),
        &[enqueue("x"), enqueue("y")],
    );
    let outcome = engine.execute(&model, &enqueue("z")).unwrap();
    assert_eq!(outcome.trace.phases(), vec![Phase::Blocked]);
    assert_eq!(outcome.new_model, model);
}

#[test]
fn list_insert_at_and_search() {
    let engine = Engine::default();
    let model = apply_all(
        &engine,
        StructureModel::List(ListModel::new()),
        &[
            OperationRequest::List(ListOp::InsertTail { value: 1 }),
            OperationRequest::List(ListOp::InsertTail { value: 3 }),
            OperationRequest::List(ListOp::InsertAt { index: 1, value: 2 }),
        ],
    );
    let StructureModel::List(list) = &model else {
        panic!("expected a list");
    };
    assert_eq!(list.values(), vec![1, 2, 3]);

    let miss = engine
        .execute(&model, &OperationRequest::List(ListOp::Search { value: 9 }))
        .unwrap();
    assert_eq!(miss.trace.terminal_phase(), Some(Phase::NotFound));
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[test]
fn session_undo_restores_previous_tree() {
    let mut session = Session::new(
        StructureModel::Tree(TreeModel::new(TreeKind::Avl)),
        EngineConfig::default(),
    );
    for request in inserts(&[10, 20, 30]) {
        session.apply(&request).unwrap();
    }
    assert_eq!(as_tree(session.model()).shape(), "20(10,30)");
    assert!(session.undo());
    assert_eq!(as_tree(session.model()).shape(), "10(-,20)");
    assert!(session.redo());
    assert_eq!(as_tree(session.model()).shape(), "20(10,30)");
}

#[test]
fn requests_round_trip_through_json() {
    let json = r#"{"structure":"heap","request":{"op":"insert","value":4}}"#;
    let request: OperationRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request, OperationRequest::Heap(HeapOp::Insert { value: 4 }));
    assert_eq!(serde_json::to_string(&request).unwrap(), json);
}
