//! Input graph handed to the layout.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// Requirements on vertex identifiers.
pub trait VertexId: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> VertexId for T {}

/// Vertices plus undirected edges. Self-loops and repeated edges are
/// accepted here and filtered when a [`LayoutContext`](crate::LayoutContext)
/// is built.
#[derive(Debug, Clone)]
pub struct Graph<V> {
    vertices: Vec<V>,
    known: HashSet<V>,
    edges: Vec<(V, V)>,
}

impl<V> Default for Graph<V> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            known: HashSet::new(),
            edges: Vec::new(),
        }
    }
}

impl<V: VertexId> Graph<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex; returns `false` if it was already present.
    pub fn add_vertex(&mut self, vertex: V) -> bool {
        if self.known.insert(vertex.clone()) {
            self.vertices.push(vertex);
            true
        } else {
            false
        }
    }

    /// Add an edge, registering unknown endpoints as vertices.
    pub fn add_edge(&mut self, a: V, b: V) {
        self.add_vertex(a.clone());
        self.add_vertex(b.clone());
        self.edges.push((a, b));
    }

    pub fn contains(&self, vertex: &V) -> bool {
        self.known.contains(vertex)
    }

    /// Vertices in insertion order.
    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    pub fn edges(&self) -> &[(V, V)] {
        &self.edges
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

impl<V: VertexId> FromIterator<(V, V)> for Graph<V> {
    fn from_iter<I: IntoIterator<Item = (V, V)>>(iter: I) -> Self {
        let mut graph = Graph::new();
        for (a, b) in iter {
            graph.add_edge(a, b);
        }
        graph
    }
}

impl<V, E, Ty, Ix> From<&petgraph::Graph<V, E, Ty, Ix>> for Graph<V>
where
    V: VertexId,
    Ty: petgraph::EdgeType,
    Ix: petgraph::graph::IndexType,
{
    fn from(source: &petgraph::Graph<V, E, Ty, Ix>) -> Self {
        let mut graph = Graph::new();
        for weight in source.node_weights() {
            graph.add_vertex(weight.clone());
        }
        for edge in source.raw_edges() {
            graph.add_edge(
                source[edge.source()].clone(),
                source[edge.target()].clone(),
            );
        }
        graph
    }
}
