//! Force-directed layout of graphs with a Barnes-Hut quadtree.
//!
//! Vertices become points that repel each other, edges pull their endpoints
//! together and a weak force keeps everything near a center. Fixed points
//! push on the others but never move.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    ┌───────────────┐    ┌──────────────────────────┐
//! │  Graph<V>    │───▶│ LayoutContext │───▶│ Setup (initial positions)│
//! │ (caller ids) │    │ (simple graph,│    │ random / barycenter /    │
//! └──────────────┘    │  points)      │    │ circle / passthrough     │
//!                     └───────────────┘    └──────────────────────────┘
//!                                                       │
//!                                                       ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      ForceLayout<V, M> step                         │
//! │  ┌─────────────┐   ┌─────────────┐   ┌────────────┐   ┌──────────┐  │
//! │  │  Quadtree   │──▶│  Repulsion  │──▶│ Attraction │──▶│ M::integ-│  │
//! │  │ (Barnes-Hut)│   │ (far field) │   │ + centering│   │ rate     │  │
//! │  └─────────────┘   └─────────────┘   └────────────┘   └──────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                   │
//!                                   ▼
//!                    positions: HashMap<V, Vector2D>
//! ```
//!
//! `M` is a [`ForceModel`]: [`SpringModel`] (spring embedder with damping)
//! or [`Atlas2Model`] (degree-weighted forces with adaptive speed).
//!
//! ## Performance
//!
//! - Exact pairwise repulsion: O(n²) per iteration
//! - Barnes-Hut approximation: O(n log n) per iteration
//!
//! ## Example
//!
//! ```
//! use netforce_layout::{layout, Graph, LayoutConfig, LayoutRequest};
//!
//! let graph: Graph<&str> = [("a", "b"), ("b", "c")].into_iter().collect();
//! let outcome = layout(&graph, &LayoutConfig::default(), LayoutRequest::default()).unwrap();
//! assert_eq!(outcome.positions.len(), 3);
//! ```

mod bounding_box;
mod context;
mod engine;
mod error;
pub mod force;
mod graph;
pub mod parameters;
mod point;
pub mod quadtree;
pub mod setup;
pub mod svg;
mod vector;

use std::collections::HashMap;

use tracing::debug;

pub use bounding_box::BoundingBox;
pub use context::LayoutContext;
pub use engine::{ForceLayout, LayoutState, LayoutStats, StopReason};
pub use error::LayoutError;
pub use force::{Atlas2Model, ForceModel, SpringModel};
pub use graph::{Graph, VertexId};
pub use parameters::{
    Algorithm, Atlas2Parameters, LayoutConfig, SimulationParameters, SpringParameters,
};
pub use point::Point;
pub use quadtree::Quadtree;
pub use setup::{Setup, SetupKind};
pub use vector::Vector2D;

/// Result type for layout operations.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Caller-supplied positions and constraints for one run.
#[derive(Debug, Clone)]
pub struct LayoutRequest<V> {
    /// Starting positions; the setup strategy only places the rest.
    pub initial_positions: HashMap<V, Vector2D>,
    /// Vertices that keep their starting position.
    pub fixed_nodes: Vec<V>,
    /// Shorthand for an initial position plus fixed status.
    pub fixed_positions: HashMap<V, Vector2D>,
    pub center: Vector2D,
}

impl<V> Default for LayoutRequest<V> {
    fn default() -> Self {
        Self {
            initial_positions: HashMap::new(),
            fixed_nodes: Vec::new(),
            fixed_positions: HashMap::new(),
            center: Vector2D::ZERO,
        }
    }
}

/// Final positions of a run plus how it ended.
#[derive(Debug, Clone)]
pub struct LayoutOutcome<V> {
    pub positions: HashMap<V, Vector2D>,
    pub stats: LayoutStats,
}

/// Lay out `graph` in one call.
pub fn layout<V: VertexId>(
    graph: &Graph<V>,
    config: &LayoutConfig,
    request: LayoutRequest<V>,
) -> Result<LayoutOutcome<V>> {
    let mut context = LayoutContext::new(graph);
    context.apply_request(request);

    let (context, stats) = run_layout(context, config)?;
    Ok(LayoutOutcome {
        positions: context.positions(),
        stats,
    })
}

/// Validate `config`, place the points and run the selected force model on a
/// prepared context.
pub fn run_layout<V: VertexId>(
    mut context: LayoutContext<V>,
    config: &LayoutConfig,
) -> Result<(LayoutContext<V>, LayoutStats)> {
    config.validate()?;
    debug!(algorithm = config.algorithm.name(), setup = ?config.setup, "running layout");
    config.setup.run(&mut context)?;

    match &config.algorithm {
        Algorithm::Spring(params) => drive(
            context,
            SpringModel::new(params.clone()),
            &config.simulation,
        ),
        Algorithm::Atlas2(params) => drive(
            context,
            Atlas2Model::new(params.clone()),
            &config.simulation,
        ),
    }
}

fn drive<V: VertexId, M: ForceModel>(
    context: LayoutContext<V>,
    model: M,
    params: &SimulationParameters,
) -> Result<(LayoutContext<V>, LayoutStats)> {
    let mut engine = ForceLayout::new(context, model, params.clone());
    engine.start();
    let stats = engine.run()?;
    Ok((engine.into_context(), stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_is_rejected_before_running() {
        let graph: Graph<u8> = [(0, 1)].into_iter().collect();
        let mut config = LayoutConfig::default();
        config.simulation.opening_angle = -1.0;
        let err = layout(&graph, &config, LayoutRequest::default()).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidParameter { name: "opening_angle", .. }));
    }

    #[test]
    fn test_empty_graph() {
        let graph: Graph<u8> = Graph::new();
        let outcome = layout(&graph, &LayoutConfig::default(), LayoutRequest::default()).unwrap();
        assert!(outcome.positions.is_empty());
        assert_eq!(outcome.stats.iterations, 0);
        assert_eq!(outcome.stats.stop_reason, StopReason::NothingToMove);
    }

    #[test]
    fn test_center_is_respected() {
        let graph: Graph<u8> = [(0, 1), (1, 2)].into_iter().collect();
        let request = LayoutRequest {
            center: Vector2D::new(500.0, 500.0),
            ..Default::default()
        };
        let outcome = layout(&graph, &LayoutConfig::default(), request).unwrap();
        let bbox = BoundingBox::from_positions(outcome.positions.values().copied()).unwrap();
        assert!(bbox.center().distance_to(&Vector2D::new(500.0, 500.0)) < 200.0);
    }
}
