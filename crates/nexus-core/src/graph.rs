//! Weighted graph model for shortest-path traces.
//!
//! Vertices are stored by id; edges are `(from, to, weight)` records between
//! vertex ids. The model also carries the per-vertex search state (tentative
//! distance, predecessor, settled flag) and the current frontier, so every
//! snapshot of a Dijkstra run is self-contained.
//!
//! [`GraphModel::adjacency`] is the lookup the shortest-path executor walks;
//! [`GraphModel::to_petgraph`] exposes the same topology as a petgraph
//! `StableGraph` for cross-checking against petgraph's own algorithms.

use std::collections::BTreeMap;
use std::fmt;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::{id_map, IdAllocator, Identified, NodeId};

/// Tentative distance. `Finite` sorts before `Infinite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Distance {
    Finite(i64),
    Infinite,
}

impl Distance {
    pub fn finite(self) -> Option<i64> {
        match self {
            Distance::Finite(d) => Some(d),
            Distance::Infinite => None,
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Finite(d) => write!(f, "{d}"),
            Distance::Infinite => f.write_str("∞"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: NodeId,
    pub label: String,
    pub distance: Distance,
    pub previous: Option<NodeId>,
    pub settled: bool,
}

impl Identified for Vertex {
    fn id(&self) -> NodeId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: i64,
}

/// One pending entry of the search priority queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontierEntry {
    pub vertex: NodeId,
    pub distance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphModel {
    pub directed: bool,
    #[serde(with = "id_map")]
    pub vertices: BTreeMap<NodeId, Vertex>,
    pub edges: Vec<Edge>,
    /// Source of the last search, if one has run.
    pub source: Option<NodeId>,
    /// Pending queue entries, ordered by `(distance, vertex)`.
    pub frontier: Vec<FrontierEntry>,
    pub ids: IdAllocator,
}

impl GraphModel {
    pub fn new(directed: bool) -> Self {
        GraphModel {
            directed,
            vertices: BTreeMap::new(),
            edges: Vec::new(),
            source: None,
            frontier: Vec::new(),
            ids: IdAllocator::default(),
        }
    }

    pub fn add_vertex(&mut self, label: impl Into<String>) -> Result<NodeId, CoreError> {
        let id = self.ids.allocate()?;
        self.vertices.insert(
            id,
            Vertex {
                id,
                label: label.into(),
                distance: Distance::Infinite,
                previous: None,
                settled: false,
            },
        );
        Ok(id)
    }

    /// Adds an edge. Negative weights are accepted here; the shortest-path
    /// executor refuses them with an explicit error step.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weight: i64) -> Result<(), CoreError> {
        for end in [from, to] {
            if !self.vertices.contains_key(&end) {
                return Err(CoreError::DanglingRelation { from, to: end });
            }
        }
        self.edges.push(Edge { from, to, weight });
        Ok(())
    }

    pub fn vertex(&self, id: NodeId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn vertex_mut(&mut self, id: NodeId) -> Option<&mut Vertex> {
        self.vertices.get_mut(&id)
    }

    pub fn vertex_by_label(&self, label: &str) -> Option<NodeId> {
        self.vertices
            .values()
            .find(|v| v.label == label)
            .map(|v| v.id)
    }

    pub fn label(&self, id: NodeId) -> String {
        self.vertices
            .get(&id)
            .map_or_else(|| id.to_string(), |v| v.label.clone())
    }

    pub fn distance(&self, id: NodeId) -> Distance {
        self.vertices.get(&id).map_or(Distance::Infinite, |v| v.distance)
    }

    /// First edge with a negative weight, if any.
    pub fn negative_edge(&self) -> Option<&Edge> {
        self.edges.iter().find(|e| e.weight < 0)
    }

    /// Clears all search state, keeping topology.
    pub fn reset_search(&mut self) {
        for v in self.vertices.values_mut() {
            v.distance = Distance::Infinite;
            v.previous = None;
            v.settled = false;
        }
        self.source = None;
        self.frontier.clear();
    }

    /// Outgoing `(neighbour, weight)` lists for every vertex, each sorted by
    /// neighbour id then weight. Undirected edges are listed under both ends.
    pub fn adjacency(&self) -> BTreeMap<NodeId, Vec<(NodeId, i64)>> {
        let mut adjacency: BTreeMap<NodeId, Vec<(NodeId, i64)>> =
            self.vertices.keys().map(|&id| (id, Vec::new())).collect();
        for edge in &self.edges {
            adjacency
                .entry(edge.from)
                .or_default()
                .push((edge.to, edge.weight));
            if !self.directed && edge.from != edge.to {
                adjacency
                    .entry(edge.to)
                    .or_default()
                    .push((edge.from, edge.weight));
            }
        }
        for list in adjacency.values_mut() {
            list.sort_unstable();
        }
        adjacency
    }

    /// Outgoing `(neighbour, weight)` pairs of one vertex in ascending
    /// neighbour id, then ascending weight.
    pub fn neighbors(&self, id: NodeId) -> Vec<(NodeId, i64)> {
        let mut out: Vec<(NodeId, i64)> = self
            .edges
            .iter()
            .filter_map(|e| {
                if e.from == id {
                    Some((e.to, e.weight))
                } else if !self.directed && e.to == id {
                    Some((e.from, e.weight))
                } else {
                    None
                }
            })
            .collect();
        out.sort_unstable();
        out
    }

    /// Builds a petgraph view with one node per vertex, weighted by its id,
    /// along with the index each vertex was given.
    ///
    /// Undirected edges are inserted in both directions.
    pub fn to_petgraph(&self) -> (StableDiGraph<NodeId, i64>, BTreeMap<NodeId, NodeIndex>) {
        let mut graph = StableDiGraph::with_capacity(self.vertices.len(), self.edges.len());
        let index: BTreeMap<NodeId, NodeIndex> = self
            .vertices
            .keys()
            .map(|&id| (id, graph.add_node(id)))
            .collect();
        for edge in &self.edges {
            let (Some(&from), Some(&to)) = (index.get(&edge.from), index.get(&edge.to)) else {
                continue;
            };
            graph.add_edge(from, to, edge.weight);
            if !self.directed && from != to {
                graph.add_edge(to, from, edge.weight);
            }
        }
        (graph, index)
    }

    /// Vertices from the search source to `target` along `previous` links.
    /// `None` when the target is unreachable or unknown.
    pub fn path_to(&self, target: NodeId) -> Option<Vec<NodeId>> {
        let vertex = self.vertices.get(&target)?;
        if vertex.distance == Distance::Infinite {
            return None;
        }
        let mut path = vec![target];
        let mut cursor = vertex.previous;
        while let Some(id) = cursor {
            if path.len() > self.vertices.len() {
                return None;
            }
            path.push(id);
            cursor = self.vertices.get(&id).and_then(|v| v.previous);
        }
        path.reverse();
        Some(path)
    }

    /// Labels joined with arrows, e.g. `A→C→B`.
    pub fn path_labels(&self, path: &[NodeId]) -> String {
        path.iter()
            .map(|id| self.label(*id))
            .collect::<Vec<_>>()
            .join("→")
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for (key, vertex) in &self.vertices {
            if *key != vertex.id {
                return Err(CoreError::MisfiledNode {
                    key: *key,
                    actual: vertex.id,
                });
            }
            if vertex.id >= self.ids.peek() {
                return Err(CoreError::StaleAllocator { next: self.ids.peek() });
            }
            if let Some(prev) = vertex.previous {
                if !self.vertices.contains_key(&prev) {
                    return Err(CoreError::DanglingRelation {
                        from: vertex.id,
                        to: prev,
                    });
                }
            }
        }
        for edge in &self.edges {
            for end in [edge.from, edge.to] {
                if !self.vertices.contains_key(&end) {
                    return Err(CoreError::DanglingRelation {
                        from: edge.from,
                        to: end,
                    });
                }
            }
        }
        for entry in &self.frontier {
            if !self.vertices.contains_key(&entry.vertex) {
                return Err(CoreError::DanglingRelation {
                    from: entry.vertex,
                    to: entry.vertex,
                });
            }
        }
        if let Some(source) = self.source {
            if !self.vertices.contains_key(&source) {
                return Err(CoreError::MissingRoot { id: source });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn distance_ordering() {
        assert!(Distance::Finite(100) < Distance::Infinite);
        assert!(Distance::Finite(1) < Distance::Finite(2));
        assert_eq!(Distance::Infinite.to_string(), "∞");
    }

    #[test]
    fn undirected_neighbors_see_both_directions() {
        let (g, a, b, c) = triangle();
        assert_eq!(g.neighbors(b), vec![(a, 4), (c, 1)]);
        assert_eq!(g.neighbors(a), vec![(b, 4), (c, 1)]);
    }

    #[test]
    fn directed_neighbors_are_outgoing_only() {
        let mut g = GraphModel::new(true);
        let a = g.add_vertex("A").unwrap();
        let b = g.add_vertex("B").unwrap();
        g.add_edge(a, b, 2).unwrap();
        assert_eq!(g.neighbors(a), vec![(b, 2)]);
        assert!(g.neighbors(b).is_empty());
    }

    #[test]
    fn petgraph_view_skips_removed_vertices() {
        let (mut g, a, b, c) = triangle();
        g.vertices.remove(&b);
        g.edges.retain(|e| e.from != b && e.to != b);
        let (pg, index) = g.to_petgraph();
        assert_eq!(pg.node_count(), 2);
        assert_eq!(pg.edge_count(), 2);
        assert_eq!(pg[index[&c]], c);
        assert!(!index.contains_key(&b));
        assert_eq!(g.neighbors(a), vec![(c, 1)]);
    }

    #[test]
    fn sparse_ids_stay_proportional_to_vertices() {
        let mut g = GraphModel::new(false);
        g.ids = IdAllocator::starting_at(4_000_000_000);
        let a = g.add_vertex("A").unwrap();
        let b = g.add_vertex("B").unwrap();
        g.add_edge(a, b, 3).unwrap();
        let (pg, _) = g.to_petgraph();
        assert_eq!(pg.node_count(), 2);
        let adjacency = g.adjacency();
        assert_eq!(adjacency[&a], vec![(b, 3)]);
        assert_eq!(adjacency[&b], vec![(a, 3)]);
    }

    #[test]
    fn exhausted_id_space_is_an_error() {
        let mut g = GraphModel::new(false);
        g.ids = IdAllocator::starting_at(u32::MAX);
        assert_eq!(g.add_vertex("A"), Err(CoreError::IdsExhausted));
        assert!(g.vertices.is_empty());
    }

    #[test]
    fn adjacency_agrees_with_neighbors() {
        let (g, a, b, c) = triangle();
        let adjacency = g.adjacency();
        for id in [a, b, c] {
            assert_eq!(adjacency[&id], g.neighbors(id));
        }
    }

    #[test]
    fn add_edge_rejects_unknown_vertex() {
        let (mut g, a, ..) = triangle();
        assert!(g.add_edge(a, NodeId(9), 1).is_err());
    }

    #[test]
    fn path_follows_previous_links() {
        let (mut g, a, b, c) = triangle();
        g.vertex_mut(a).unwrap().distance = Distance::Finite(0);
        g.vertex_mut(c).unwrap().distance = Distance::Finite(1);
        g.vertex_mut(c).unwrap().previous = Some(a);
        g.vertex_mut(b).unwrap().distance = Distance::Finite(2);
        g.vertex_mut(b).unwrap().previous = Some(c);
        let path = g.path_to(b).unwrap();
        assert_eq!(g.path_labels(&path), "A→C→B");
    }

    #[test]
    fn distance_wire_format() {
        insta::assert_json_snapshot!(Distance::Finite(3), @r#"
        {
          "finite": 3
        }
        "#);
        insta::assert_json_snapshot!(Distance::Infinite, @r#""infinite""#);
    }
}
