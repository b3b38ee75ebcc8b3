//! Mapping between graph vertices and simulated points.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use tracing::{debug, warn};

use crate::{BoundingBox, Graph, LayoutRequest, Point, Vector2D, VertexId};

/// Owns the points of one layout run.
///
/// Every vertex of the simple graph has exactly one [`Point`], stored either
/// in the moving or in the fixed map. Both maps are keyed by the vertex's
/// node index, which keeps iteration order identical from run to run.
#[derive(Debug, Clone)]
pub struct LayoutContext<V> {
    /// Simple graph: no self-loops, parallel edges collapsed.
    graph: UnGraph<V, ()>,
    index: HashMap<V, NodeIndex>,
    moving_points: BTreeMap<NodeIndex, Point>,
    fixed_points: BTreeMap<NodeIndex, Point>,
    /// Caller-supplied starting positions.
    initial_points: BTreeMap<NodeIndex, Point>,
    fixed_nodes: BTreeSet<NodeIndex>,
    /// Points that already received a position (initial or from a setup).
    placed: BTreeSet<NodeIndex>,
    center: Vector2D,
}

impl<V: VertexId> LayoutContext<V> {
    /// Build the simple graph and one unplaced point per vertex.
    pub fn new(source: &Graph<V>) -> Self {
        let mut graph = UnGraph::with_capacity(source.vertex_count(), source.edge_count());
        let mut index = HashMap::with_capacity(source.vertex_count());
        for vertex in source.vertices() {
            index.insert(vertex.clone(), graph.add_node(vertex.clone()));
        }

        let mut self_loops = 0usize;
        for (a, b) in source.edges() {
            let (ia, ib) = (index[a], index[b]);
            if ia == ib {
                self_loops += 1;
                continue;
            }
            graph.update_edge(ia, ib, ());
        }
        debug!(
            vertices = graph.node_count(),
            edges = graph.edge_count(),
            self_loops,
            collapsed = source.edge_count() - self_loops - graph.edge_count(),
            "built simple graph"
        );

        let moving_points = graph
            .node_indices()
            .map(|n| {
                let mut point = Point::at(0.0, 0.0);
                point.set_degree(graph.neighbors(n).count());
                (n, point)
            })
            .collect();

        Self {
            graph,
            index,
            moving_points,
            fixed_points: BTreeMap::new(),
            initial_points: BTreeMap::new(),
            fixed_nodes: BTreeSet::new(),
            placed: BTreeSet::new(),
            center: Vector2D::ZERO,
        }
    }

    /// Record starting positions. Vertices outside the graph are skipped.
    pub fn set_initial_positions<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = (V, Vector2D)>,
    {
        for (vertex, position) in positions {
            match self.index.get(&vertex) {
                Some(&n) => {
                    self.initial_points
                        .insert(n, Point::at(position.x, position.y));
                }
                None => warn!(?vertex, "initial position for unknown vertex ignored"),
            }
        }
    }

    /// Mark vertices as fixed. Unknown vertices are dropped with a warning.
    pub fn set_fixed_nodes<I>(&mut self, vertices: I)
    where
        I: IntoIterator<Item = V>,
    {
        for vertex in vertices {
            match self.index.get(&vertex) {
                Some(&n) => {
                    self.fixed_nodes.insert(n);
                    if let Some(point) = self.moving_points.remove(&n) {
                        self.fixed_points.insert(n, point);
                    }
                }
                None => warn!(?vertex, "fixed vertex not in graph, dropped"),
            }
        }
    }

    /// Fix vertices at the given positions: initial position plus fixed status.
    pub fn set_fixed_positions<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = (V, Vector2D)>,
    {
        let positions: Vec<(V, Vector2D)> = positions.into_iter().collect();
        self.set_initial_positions(positions.iter().cloned());
        self.set_fixed_nodes(positions.into_iter().map(|(v, _)| v));
    }

    /// Apply everything a [`LayoutRequest`] carries.
    pub fn apply_request(&mut self, request: LayoutRequest<V>) {
        self.set_center(request.center);
        self.set_initial_positions(request.initial_positions);
        self.set_fixed_nodes(request.fixed_nodes);
        self.set_fixed_positions(request.fixed_positions);
    }

    pub fn set_center(&mut self, center: Vector2D) {
        self.center = center;
    }

    pub fn center(&self) -> Vector2D {
        self.center
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Edges of the simple graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn vertex(&self, node: NodeIndex) -> &V {
        &self.graph[node]
    }

    pub fn node_index(&self, vertex: &V) -> Option<NodeIndex> {
        self.index.get(vertex).copied()
    }

    pub fn is_fixed(&self, vertex: &V) -> bool {
        self.node_index(vertex)
            .is_some_and(|n| self.fixed_points.contains_key(&n))
    }

    pub fn point(&self, vertex: &V) -> Option<&Point> {
        self.node_index(vertex).and_then(|n| self.point_at(n))
    }

    pub fn point_at(&self, node: NodeIndex) -> Option<&Point> {
        self.moving_points
            .get(&node)
            .or_else(|| self.fixed_points.get(&node))
    }

    pub fn point_at_mut(&mut self, node: NodeIndex) -> Option<&mut Point> {
        match self.moving_points.get_mut(&node) {
            Some(point) => Some(point),
            None => self.fixed_points.get_mut(&node),
        }
    }

    pub fn moving_points(&self) -> &BTreeMap<NodeIndex, Point> {
        &self.moving_points
    }

    pub(crate) fn moving_points_mut(&mut self) -> &mut BTreeMap<NodeIndex, Point> {
        &mut self.moving_points
    }

    pub fn fixed_points(&self) -> &BTreeMap<NodeIndex, Point> {
        &self.fixed_points
    }

    pub fn initial_points(&self) -> &BTreeMap<NodeIndex, Point> {
        &self.initial_points
    }

    pub fn fixed_nodes(&self) -> &BTreeSet<NodeIndex> {
        &self.fixed_nodes
    }

    pub fn neighbors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(node)
    }

    /// Edges of the simple graph as node-index pairs.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.graph.edge_references().map(|e| (e.source(), e.target()))
    }

    /// Edges of the simple graph as vertex pairs.
    pub fn vertex_edges(&self) -> impl Iterator<Item = (&V, &V)> + '_ {
        self.edges().map(|(a, b)| (&self.graph[a], &self.graph[b]))
    }

    pub fn is_placed(&self, node: NodeIndex) -> bool {
        self.placed.contains(&node)
    }

    /// Copy initial positions onto their points and return, in node order,
    /// the points still lacking a position.
    pub(crate) fn apply_initial_positions(&mut self) -> Vec<NodeIndex> {
        let initial: Vec<(NodeIndex, Vector2D)> = self
            .initial_points
            .iter()
            .map(|(&n, p)| (n, p.position()))
            .collect();
        for (n, position) in initial {
            self.place(n, position);
        }
        self.graph
            .node_indices()
            .filter(|n| !self.placed.contains(n))
            .collect()
    }

    pub(crate) fn place(&mut self, node: NodeIndex, position: Vector2D) {
        if let Some(point) = self.point_at_mut(node) {
            point.set_position(position);
            point.set_velocity(Vector2D::ZERO);
            self.placed.insert(node);
        }
    }

    /// Box around every point, fixed ones included.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.moving_points.values().chain(self.fixed_points.values()))
    }

    /// Current position of every vertex.
    pub fn positions(&self) -> HashMap<V, Vector2D> {
        self.moving_points
            .iter()
            .chain(self.fixed_points.iter())
            .map(|(&n, p)| (self.graph[n].clone(), p.position()))
            .collect()
    }

    /// Total kinetic energy of the movable points.
    pub fn energy(&self) -> f64 {
        self.moving_points.values().map(Point::energy).sum()
    }
}
