//! Single-source shortest paths (Dijkstra) executor.
//!
//! The priority queue is a `BinaryHeap<Reverse<(distance, vertex)>>` with
//! lazy deletion: an improved distance pushes a fresh entry, and stale
//! entries are skipped when popped. Equal distances settle the smaller
//! vertex id first. The model's `frontier` mirrors the live queue entries
//! so every snapshot shows what is still pending.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use nexus_core::graph::{Distance, FrontierEntry, GraphModel};
use nexus_core::{NodeId, Outcome, Phase};

use super::Executor;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::recorder::TraceRecorder;
use crate::request::GraphOp;

#[derive(Debug, Clone, Default)]
pub struct DijkstraExecutor {
    config: EngineConfig,
}

impl DijkstraExecutor {
    pub fn new(config: EngineConfig) -> Self {
        DijkstraExecutor { config }
    }

    /// Computes shortest distances from `source` to every vertex.
    ///
    /// A negative edge weight or an unknown source produces a single
    /// `Error` step and leaves the graph untouched.
    pub fn shortest_paths(
        &self,
        model: &GraphModel,
        source: NodeId,
    ) -> Result<Outcome<GraphModel>, EngineError> {
        model.validate()?;
        let mut rec = TraceRecorder::new(&self.config);
        let mut graph = model.clone();

        if let Some(edge) = graph.negative_edge() {
            let description = format!(
                "Edge {}–{} has negative weight {}: shortest paths need non-negative weights",
                graph.label(edge.from),
                graph.label(edge.to),
                edge.weight
            );
            rec.record(Phase::Error, [edge.from, edge.to], &graph, description)?;
            return Ok(rec.finish(graph));
        }
        if graph.vertex(source).is_none() {
            rec.record(
                Phase::Error,
                [],
                &graph,
                format!("Source {source} is not a vertex of this graph"),
            )?;
            return Ok(rec.finish(graph));
        }

        let adjacency = graph.adjacency();
        graph.reset_search();
        graph.source = Some(source);
        set_distance(&mut graph, source, 0, None)?;
        let mut queue = BinaryHeap::new();
        queue.push(Reverse((0i64, source)));
        refresh_frontier(&mut graph);
        let source_label = graph.label(source);
        rec.record(
            Phase::Initialize,
            [source],
            &graph,
            format!("dist({source_label}) = 0; every other vertex starts at ∞"),
        )?;

        while let Some(Reverse((distance, vertex))) = queue.pop() {
            if graph.vertex(vertex).is_some_and(|v| v.settled) {
                continue;
            }
            if let Some(v) = graph.vertex_mut(vertex) {
                v.settled = true;
            }
            refresh_frontier(&mut graph);
            let label = graph.label(vertex);
            rec.record(
                Phase::ExtractMin,
                [vertex],
                &graph,
                format!("Extract {label} at distance {distance}: it is now final"),
            )?;

            let edges = adjacency.get(&vertex).map(Vec::as_slice).unwrap_or_default();
            for &(neighbor, weight) in edges {
                if graph.vertex(neighbor).is_some_and(|v| v.settled) {
                    continue;
                }
                let candidate = distance.saturating_add(weight);
                let current = graph.distance(neighbor);
                let target = graph.label(neighbor);
                if Distance::Finite(candidate) < current {
                    set_distance(&mut graph, neighbor, candidate, Some(vertex))?;
                    queue.push(Reverse((candidate, neighbor)));
                    refresh_frontier(&mut graph);
                    rec.record(
                        Phase::RelaxEdge,
                        [vertex, neighbor],
                        &graph,
                        format!(
                            "{distance} + {weight} = {candidate} < {current}: dist({target}) = {candidate} via {label}"
                        ),
                    )?;
                } else {
                    rec.record(
                        Phase::RelaxNoOp,
                        [vertex, neighbor],
                        &graph,
                        format!("{distance} + {weight} = {candidate} ≥ {current}: keep dist({target})"),
                    )?;
                }
            }
        }

        let unreachable: Vec<NodeId> = graph
            .vertices
            .values()
            .filter(|v| !v.settled)
            .map(|v| v.id)
            .collect();
        for id in unreachable {
            rec.record(
                Phase::Unreachable,
                [id],
                &graph,
                format!("{} is unreachable from {source_label}: distance stays ∞", graph.label(id)),
            )?;
        }

        let summary = graph
            .vertices
            .values()
            .map(|v| format!("{}={}", v.label, v.distance))
            .collect::<Vec<_>>()
            .join(", ");
        rec.record(
            Phase::Done,
            [source],
            &graph,
            format!("Shortest distances from {source_label}: {summary}"),
        )?;
        Ok(rec.finish(graph))
    }
}

impl Executor for DijkstraExecutor {
    type Model = GraphModel;
    type Request = GraphOp;

    fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn execute(&self, model: &GraphModel, request: &GraphOp) -> Result<Outcome<GraphModel>, EngineError> {
        match *request {
            GraphOp::ShortestPaths { source } => self.shortest_paths(model, source),
        }
    }
}

fn set_distance(
    graph: &mut GraphModel,
    id: NodeId,
    distance: i64,
    previous: Option<NodeId>,
) -> Result<(), EngineError> {
    let vertex = graph
        .vertex_mut(id)
        .ok_or(EngineError::MissingNode { node: id })?;
    vertex.distance = Distance::Finite(distance);
    vertex.previous = previous;
    Ok(())
}

/// Live queue entries: unsettled vertices with a finite distance, ordered
/// the way the queue will pop them.
fn refresh_frontier(graph: &mut GraphModel) {
    let mut frontier: Vec<FrontierEntry> = graph
        .vertices
        .values()
        .filter(|v| !v.settled)
        .filter_map(|v| {
            v.distance.finite().map(|distance| FrontierEntry {
                vertex: v.id,
                distance,
            })
        })
        .collect();
    frontier.sort_by_key(|e| (e.distance, e.vertex));
    graph.frontier = frontier;
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::IdAllocator;

    fn triangle() -> (GraphModel, NodeId, NodeId, NodeId) {
        let mut g = GraphModel::new(false);
        let a = g.add_vertex("A").unwrap();
        let b = g.add_vertex("B").unwrap();
        let c = g.add_vertex("C").unwrap();
        g.add_edge(a, b, 4).unwrap();
        g.add_edge(a, c, 1).unwrap();
        g.add_edge(c, b, 1).unwrap();
        (g, a, b, c)
    }

    #[test]
    fn settles_in_distance_order() {
        let (g, a, b, c) = triangle();
        let outcome = DijkstraExecutor::default().shortest_paths(&g, a).unwrap();
        let settled: Vec<NodeId> = outcome
            .trace
            .iter()
            .filter(|s| s.phase == Phase::ExtractMin)
            .map(|s| s.highlighted[0])
            .collect();
        assert_eq!(settled, vec![a, c, b]);
        let result = &outcome.new_model;
        assert_eq!(result.distance(b), Distance::Finite(2));
        assert_eq!(result.distance(c), Distance::Finite(1));
        let path = result.path_to(b).unwrap();
        assert_eq!(result.path_labels(&path), "A→C→B");
        assert!(result.frontier.is_empty());
    }

    #[test]
    fn relaxations_are_traced() {
        let (g, a, ..) = triangle();
        let outcome = DijkstraExecutor::default().shortest_paths(&g, a).unwrap();
        assert_eq!(outcome.trace.count(Phase::RelaxEdge), 3);
        assert_eq!(outcome.trace.terminal_phase(), Some(Phase::Done));
    }

    #[test]
    fn non_improving_edge_is_a_no_op() {
        let mut g = GraphModel::new(true);
        let a = g.add_vertex("A").unwrap();
        let b = g.add_vertex("B").unwrap();
        let c = g.add_vertex("C").unwrap();
        g.add_edge(a, b, 1).unwrap();
        g.add_edge(a, c, 2).unwrap();
        g.add_edge(b, c, 5).unwrap();
        let outcome = DijkstraExecutor::default().shortest_paths(&g, a).unwrap();
        assert_eq!(outcome.trace.count(Phase::RelaxNoOp), 1);
        assert_eq!(outcome.new_model.distance(c), Distance::Finite(2));
    }

    #[test]
    fn frontier_tracks_pending_vertices() {
        let (g, a, b, c) = triangle();
        let outcome = DijkstraExecutor::default().shortest_paths(&g, a).unwrap();
        let after_first_relaxations = outcome
            .trace
            .iter()
            .filter(|s| s.phase == Phase::RelaxEdge)
            .nth(1)
            .unwrap();
        let pending: Vec<NodeId> = after_first_relaxations
            .snapshot
            .frontier
            .iter()
            .map(|e| e.vertex)
            .collect();
        assert_eq!(pending, vec![c, b]);
    }

    #[test]
    fn unreachable_vertices_keep_infinity() {
        let (mut g, a, ..) = triangle();
        let d = g.add_vertex("D").unwrap();
        let outcome = DijkstraExecutor::default().shortest_paths(&g, a).unwrap();
        assert_eq!(outcome.trace.count(Phase::Unreachable), 1);
        assert_eq!(outcome.new_model.distance(d), Distance::Infinite);
        assert!(outcome.new_model.path_to(d).is_none());
    }

    #[test]
    fn negative_weight_is_an_error_step() {
        let (mut g, a, b, _) = triangle();
        g.add_edge(a, b, -3).unwrap();
        let outcome = DijkstraExecutor::default().shortest_paths(&g, a).unwrap();
        assert_eq!(outcome.trace.phases(), vec![Phase::Error]);
        assert_eq!(outcome.new_model, g);
    }

    #[test]
    fn unknown_source_is_an_error_step() {
        let (g, ..) = triangle();
        let outcome = DijkstraExecutor::default()
            .shortest_paths(&g, NodeId(99))
            .unwrap();
        assert_eq!(outcome.trace.terminal_phase(), Some(Phase::Error));
    }

    #[test]
    fn matches_petgraph_reference() {
        let (g, a, ..) = triangle();
        let outcome = DijkstraExecutor::default().shortest_paths(&g, a).unwrap();
        let (pg, index) = g.to_petgraph();
        let reference = petgraph::algo::dijkstra(&pg, index[&a], None, |e| *e.weight());
        assert_eq!(reference.len(), 3);
        for (node, cost) in reference {
            assert_eq!(outcome.new_model.distance(pg[node]), Distance::Finite(cost));
        }
    }

    #[test]
    fn equal_distances_settle_smaller_id_first() {
        let mut g = GraphModel::new(false);
        let a = g.add_vertex("A").unwrap();
        let c = g.add_vertex("C").unwrap();
        let b = g.add_vertex("B").unwrap();
        g.add_edge(a, b, 1).unwrap();
        g.add_edge(a, c, 1).unwrap();
        let outcome = DijkstraExecutor::default().shortest_paths(&g, a).unwrap();
        let settled: Vec<NodeId> = outcome
            .trace
            .iter()
            .filter(|s| s.phase == Phase::ExtractMin)
            .map(|s| s.highlighted[0])
            .collect();
        assert_eq!(settled, vec![NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(settled, vec![a, c, b]);
    }

    #[test]
    fn sparse_ids_run_without_dense_indexing() {
        let mut g = GraphModel::new(false);
        g.ids = IdAllocator::starting_at(4_000_000_000);
        let a = g.add_vertex("A").unwrap();
        let b = g.add_vertex("B").unwrap();
        g.add_edge(a, b, 7).unwrap();
        let outcome = DijkstraExecutor::default().shortest_paths(&g, a).unwrap();
        assert_eq!(outcome.trace.terminal_phase(), Some(Phase::Done));
        assert_eq!(outcome.new_model.distance(b), Distance::Finite(7));
    }
}
