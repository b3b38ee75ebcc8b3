//! Initial placement of points that have no position yet.

use std::f64::consts::TAU;

use petgraph::graph::NodeIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{LayoutContext, LayoutError, Result, Vector2D, VertexId};

/// Assigns starting positions.
///
/// Caller-supplied initial positions always win; a strategy only decides
/// where the remaining points go. Fixed points without an initial position
/// are placed the same way and then stay put.
pub trait Setup {
    /// Position for `node`, the `rank`-th of `total` unplaced points.
    fn place<V: VertexId>(
        &mut self,
        ctx: &LayoutContext<V>,
        node: NodeIndex,
        rank: usize,
        total: usize,
    ) -> Result<Vector2D>;

    fn run<V: VertexId>(&mut self, ctx: &mut LayoutContext<V>) -> Result<()> {
        let unplaced = ctx.apply_initial_positions();
        let total = unplaced.len();
        debug!(
            supplied = ctx.vertex_count() - total,
            unplaced = total,
            "placing points"
        );
        for (rank, node) in unplaced.into_iter().enumerate() {
            let position = self.place(ctx, node, rank, total)?;
            ctx.place(node, position);
        }
        Ok(())
    }
}

/// Uniformly random positions in a square around the layout center.
#[derive(Debug, Clone)]
pub struct SquareRandomSetup {
    side: f64,
    rng: StdRng,
}

impl SquareRandomSetup {
    pub fn new(seed: u64, side: f64) -> Self {
        Self {
            side,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Setup for SquareRandomSetup {
    fn place<V: VertexId>(
        &mut self,
        ctx: &LayoutContext<V>,
        _node: NodeIndex,
        _rank: usize,
        _total: usize,
    ) -> Result<Vector2D> {
        Ok(ctx.center() + random_offset(&mut self.rng, self.side))
    }
}

/// Like [`SquareRandomSetup`], but a point with already placed neighbours
/// starts near their barycenter.
#[derive(Debug, Clone)]
pub struct SquareRandomBarycenterSetup {
    side: f64,
    jitter: f64,
    rng: StdRng,
}

impl SquareRandomBarycenterSetup {
    pub fn new(seed: u64, side: f64) -> Self {
        Self {
            side,
            jitter: side / 10.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Setup for SquareRandomBarycenterSetup {
    fn place<V: VertexId>(
        &mut self,
        ctx: &LayoutContext<V>,
        node: NodeIndex,
        _rank: usize,
        _total: usize,
    ) -> Result<Vector2D> {
        let mut sum = Vector2D::ZERO;
        let mut count = 0usize;
        for neighbor in ctx.neighbors(node) {
            if ctx.is_placed(neighbor) {
                if let Some(point) = ctx.point_at(neighbor) {
                    sum += point.position();
                    count += 1;
                }
            }
        }

        if count == 0 {
            Ok(ctx.center() + random_offset(&mut self.rng, self.side))
        } else {
            Ok(sum / count as f64 + random_offset(&mut self.rng, self.jitter))
        }
    }
}

/// Points evenly spread on a circle around the layout center.
#[derive(Debug, Clone, Copy)]
pub struct CircleSetup {
    pub radius: f64,
}

impl Setup for CircleSetup {
    fn place<V: VertexId>(
        &mut self,
        ctx: &LayoutContext<V>,
        _node: NodeIndex,
        rank: usize,
        total: usize,
    ) -> Result<Vector2D> {
        let angle = TAU * rank as f64 / total.max(1) as f64;
        Ok(ctx.center() + Vector2D::new(angle.cos(), angle.sin()) * self.radius)
    }
}

/// Uses the supplied positions as they are; every point must have one.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughSetup;

impl Setup for PassthroughSetup {
    fn place<V: VertexId>(
        &mut self,
        ctx: &LayoutContext<V>,
        node: NodeIndex,
        _rank: usize,
        _total: usize,
    ) -> Result<Vector2D> {
        Err(LayoutError::MissingInitialPosition {
            vertex: format!("{:?}", ctx.vertex(node)),
        })
    }
}

fn random_offset(rng: &mut StdRng, side: f64) -> Vector2D {
    Vector2D::new(
        (rng.random::<f64>() - 0.5) * side,
        (rng.random::<f64>() - 0.5) * side,
    )
}

/// Serializable choice of setup strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SetupKind {
    SquareRandom { seed: u64, side: f64 },
    SquareRandomBarycenter { seed: u64, side: f64 },
    Circle { radius: f64 },
    Passthrough,
}

impl Default for SetupKind {
    fn default() -> Self {
        SetupKind::SquareRandomBarycenter {
            seed: 0,
            side: 100.0,
        }
    }
}

impl SetupKind {
    /// Replace the seed of a randomized strategy.
    pub fn with_seed(self, seed: u64) -> Self {
        match self {
            SetupKind::SquareRandom { side, .. } => SetupKind::SquareRandom { seed, side },
            SetupKind::SquareRandomBarycenter { side, .. } => {
                SetupKind::SquareRandomBarycenter { seed, side }
            }
            other => other,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let (name, value) = match self {
            SetupKind::SquareRandom { side, .. }
            | SetupKind::SquareRandomBarycenter { side, .. } => ("side", *side),
            SetupKind::Circle { radius } => ("radius", *radius),
            SetupKind::Passthrough => return Ok(()),
        };
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(LayoutError::invalid(
                name,
                format!("must be finite and >= 0, got {value}"),
            ))
        }
    }

    pub fn run<V: VertexId>(&self, ctx: &mut LayoutContext<V>) -> Result<()> {
        match *self {
            SetupKind::SquareRandom { seed, side } => SquareRandomSetup::new(seed, side).run(ctx),
            SetupKind::SquareRandomBarycenter { seed, side } => {
                SquareRandomBarycenterSetup::new(seed, side).run(ctx)
            }
            SetupKind::Circle { radius } => CircleSetup { radius }.run(ctx),
            SetupKind::Passthrough => PassthroughSetup.run(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Graph;

    fn path(n: usize) -> Graph<usize> {
        (1..n).map(|i| (i - 1, i)).collect()
    }

    #[test]
    fn test_random_setup_is_reproducible() {
        let graph = path(6);
        let mut a = LayoutContext::new(&graph);
        let mut b = LayoutContext::new(&graph);
        SquareRandomSetup::new(7, 50.0).run(&mut a).unwrap();
        SquareRandomSetup::new(7, 50.0).run(&mut b).unwrap();
        assert_eq!(a.positions(), b.positions());

        let mut c = LayoutContext::new(&graph);
        SquareRandomSetup::new(8, 50.0).run(&mut c).unwrap();
        assert_ne!(a.positions(), c.positions());
    }

    #[test]
    fn test_random_setup_stays_in_square() {
        let mut ctx = LayoutContext::new(&path(20));
        ctx.set_center(Vector2D::new(100.0, -100.0));
        SquareRandomSetup::new(1, 10.0).run(&mut ctx).unwrap();
        for p in ctx.positions().values() {
            assert!((p.x - 100.0).abs() <= 5.0);
            assert!((p.y + 100.0).abs() <= 5.0);
        }
    }

    #[test]
    fn test_initial_positions_are_kept() {
        let mut ctx = LayoutContext::new(&path(3));
        ctx.set_initial_positions([(1, Vector2D::new(42.0, 24.0))]);
        SquareRandomSetup::new(0, 10.0).run(&mut ctx).unwrap();
        assert_eq!(ctx.point(&1).unwrap().position(), Vector2D::new(42.0, 24.0));
    }

    #[test]
    fn test_barycenter_setup_starts_near_neighbours() {
        let mut ctx = LayoutContext::new(&path(3));
        ctx.set_initial_positions([(0, Vector2D::new(1000.0, 1000.0))]);
        SquareRandomBarycenterSetup::new(3, 10.0).run(&mut ctx).unwrap();

        // 1 follows 0, 2 follows 1; jitter is a tenth of the square
        let p1 = ctx.point(&1).unwrap().position();
        let p2 = ctx.point(&2).unwrap().position();
        assert!(p1.distance_to(&Vector2D::new(1000.0, 1000.0)) <= 1.0);
        assert!(p2.distance_to(&p1) <= 1.0);
    }

    #[test]
    fn test_circle_setup() {
        let mut ctx = LayoutContext::new(&path(4));
        CircleSetup { radius: 10.0 }.run(&mut ctx).unwrap();
        for p in ctx.positions().values() {
            assert!((p.magnitude() - 10.0).abs() < 1e-9);
        }
        assert_eq!(ctx.point(&0).unwrap().position(), Vector2D::new(10.0, 0.0));
    }

    #[test]
    fn test_passthrough_requires_every_position() {
        let mut ctx = LayoutContext::new(&path(2));
        ctx.set_initial_positions([(0, Vector2D::ZERO)]);
        let err = PassthroughSetup.run(&mut ctx).unwrap_err();
        assert!(matches!(err, LayoutError::MissingInitialPosition { ref vertex } if vertex == "1"));

        let mut ctx = LayoutContext::new(&path(2));
        ctx.set_initial_positions([(0, Vector2D::ZERO), (1, Vector2D::new(1.0, 1.0))]);
        PassthroughSetup.run(&mut ctx).unwrap();
    }

    #[test]
    fn test_setup_kind_with_seed() {
        let kind = SetupKind::default().with_seed(99);
        assert_eq!(
            kind,
            SetupKind::SquareRandomBarycenter {
                seed: 99,
                side: 100.0
            }
        );
        assert_eq!(SetupKind::Passthrough.with_seed(1), SetupKind::Passthrough);
    }
}
