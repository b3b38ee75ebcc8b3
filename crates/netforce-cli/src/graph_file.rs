//! JSON graph descriptions read by `netforce layout`.
//!
//! ```json
//! {
//!   "vertices": ["a", "b", "c"],
//!   "edges": [["a", "b"], ["b", "c"]],
//!   "initial": {"a": [0.0, 0.0]},
//!   "fixed": {"c": [100.0, 0.0]},
//!   "fixed_nodes": ["a"]
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use netforce_layout::{Graph, LayoutRequest, Vector2D};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphFile {
    pub vertices: Vec<String>,
    pub edges: Vec<(String, String)>,
    /// Starting positions.
    #[serde(default)]
    pub initial: HashMap<String, [f64; 2]>,
    /// Vertices pinned at the given positions.
    #[serde(default)]
    pub fixed: HashMap<String, [f64; 2]>,
    /// Vertices pinned wherever setup puts them (or at their initial position).
    #[serde(default)]
    pub fixed_nodes: Vec<String>,
}

impl GraphFile {
    pub fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read graph from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse graph file {}", path.display()))
    }

    pub fn graph(&self) -> Graph<String> {
        let mut graph = Graph::new();
        for v in &self.vertices {
            graph.add_vertex(v.clone());
        }
        for (a, b) in &self.edges {
            graph.add_edge(a.clone(), b.clone());
        }
        graph
    }

    pub fn request(&self) -> LayoutRequest<String> {
        let positions = |map: &HashMap<String, [f64; 2]>| -> HashMap<String, Vector2D> {
            map.iter()
                .map(|(k, &p)| (k.clone(), Vector2D::from(p)))
                .collect()
        };
        LayoutRequest {
            initial_positions: positions(&self.initial),
            fixed_nodes: self.fixed_nodes.clone(),
            fixed_positions: positions(&self.fixed),
            center: Vector2D::ZERO,
        }
    }
}

/// Position map written by `netforce layout`, sorted by vertex.
pub fn positions_json(positions: &HashMap<String, Vector2D>) -> Result<String> {
    let sorted: BTreeMap<&str, [f64; 2]> = positions
        .iter()
        .map(|(k, &p)| (k.as_str(), p.into()))
        .collect();
    Ok(serde_json::to_string_pretty(&sorted)?)
}
