//! Built-in scenarios for `nexus demo`.

use clap::ValueEnum;
use indexmap::IndexMap;

use nexus_core::expression::tokenize;
use nexus_core::graph::GraphModel;
use nexus_core::heap::{HeapKind, HeapModel};
use nexus_core::linear::QueueModel;
use nexus_core::polynomial::Polynomial;
use nexus_core::tree::{TreeKind, TreeModel};
use nexus_core::{CoreError, IdAllocator, StructureModel, Trace};
use nexus_engine::request::{
    ExpressionOp, GraphOp, HeapOp, HuffmanOp, PolynomialOp, QueueOp, TreeOp,
};
use nexus_engine::{Engine, EngineError, OperationRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// AVL inserts 5, 3, 8, then a duplicate 3.
    Avl,
    /// Rotations on ascending AVL inserts 10, 20, 30.
    Rotations,
    /// Min-heap inserts then one extraction.
    Heap,
    /// Shortest paths on the triangle A-B(4), A-C(1), C-B(1).
    Dijkstra,
    /// Huffman codes for a:5 b:9 c:12 d:13 e:16 f:45.
    Huffman,
    /// Enqueue on a full capacity-2 queue.
    Queue,
    /// Infix "a + b * c" to postfix.
    Infix,
    /// (x + 1)(x - 1).
    Polynomial,
}

/// Runs `scenario` request by request, returning one titled trace per
/// request.
pub fn run(engine: &Engine, scenario: Scenario) -> Result<Vec<(String, Trace<StructureModel>)>, EngineError> {
    let (model, requests) = setup(scenario)?;
    tracing::info!(?scenario, requests = requests.len(), "running demo");
    let mut model = model;
    let mut traces = Vec::with_capacity(requests.len());
    for request in requests {
        let outcome = engine.execute(&model, &request)?;
        traces.push((title(&request), outcome.trace));
        model = outcome.new_model;
    }
    Ok(traces)
}

fn setup(scenario: Scenario) -> Result<(StructureModel, Vec<OperationRequest>), CoreError> {
    let tree_inserts = |keys: &[i64]| {
        keys.iter()
            .map(|&key| OperationRequest::Tree(TreeOp::Insert { key }))
            .collect::<Vec<_>>()
    };
    Ok(match scenario {
        Scenario::Avl => (
            StructureModel::Tree(TreeModel::new(TreeKind::Avl)),
            tree_inserts(&[5, 3, 8, 3]),
        ),
        Scenario::Rotations => (
            StructureModel::Tree(TreeModel::new(TreeKind::Avl)),
            tree_inserts(&[10, 20, 30]),
        ),
        Scenario::Heap => {
            let mut requests: Vec<OperationRequest> = [7, 2, 9, 1]
                .iter()
                .map(|&value| OperationRequest::Heap(HeapOp::Insert { value }))
                .collect();
            requests.push(OperationRequest::Heap(HeapOp::ExtractRoot));
            (StructureModel::Heap(HeapModel::new(HeapKind::Min)), requests)
        }
        Scenario::Dijkstra => {
            let mut graph = GraphModel::new(false);
            let a = graph.add_vertex("A")?;
            let b = graph.add_vertex("B")?;
            let c = graph.add_vertex("C")?;
            graph.add_edge(a, b, 4)?;
            graph.add_edge(a, c, 1)?;
            graph.add_edge(c, b, 1)?;
            (
                StructureModel::Graph(graph),
                vec![OperationRequest::Graph(GraphOp::ShortestPaths { source: a })],
            )
        }
        Scenario::Huffman => {
            let frequencies: IndexMap<String, u64> =
                [("a", 5), ("b", 9), ("c", 12), ("d", 13), ("e", 16), ("f", 45)]
                    .iter()
                    .map(|(s, f)| (s.to_string(), *f))
                    .collect();
            (
                StructureModel::Huffman(Default::default()),
                vec![OperationRequest::Huffman(HuffmanOp::Build { frequencies })],
            )
        }
        Scenario::Queue => {
            let enqueue = |m: &str| {
                OperationRequest::Queue(QueueOp::Enqueue {
                    message: m.to_string(),
                })
            };
            (
                StructureModel::Queue(QueueModel::with_capacity(2)),
                vec![enqueue("x"), enqueue("y"), enqueue("z")],
            )
        }
        Scenario::Infix => (
            StructureModel::Expression(Default::default()),
            vec![OperationRequest::Expression(ExpressionOp::InfixToPostfix {
                tokens: tokenize("a + b * c"),
            })],
        ),
        Scenario::Polynomial => {
            let mut ids = IdAllocator::default();
            let left = Polynomial::from_pairs(&[(1, 1), (1, 0)], &mut ids)?;
            let right = Polynomial::from_pairs(&[(1, 1), (-1, 0)], &mut ids)?;
            (
                StructureModel::Polynomial(nexus_core::polynomial::ProductModel::new(
                    Polynomial::default(),
                    Polynomial::default(),
                )),
                vec![OperationRequest::Polynomial(PolynomialOp::Multiply { left, right })],
            )
        }
    })
}

fn title(request: &OperationRequest) -> String {
    match serde_json::to_value(request) {
        Ok(value) => format!("{} {}", request.family(), value["request"]),
        Err(_) => request.family().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::Phase;

    #[test]
    fn every_scenario_runs() {
        let engine = Engine::default();
        for scenario in Scenario::value_variants() {
            let traces = run(&engine, *scenario).unwrap();
            assert!(!traces.is_empty());
            assert!(traces.iter().all(|(_, trace)| !trace.is_empty()));
        }
    }

    #[test]
    fn queue_scenario_ends_blocked() {
        let traces = run(&Engine::default(), Scenario::Queue).unwrap();
        let (_, last) = traces.last().unwrap();
        assert_eq!(last.terminal_phase(), Some(Phase::Blocked));
    }
}
