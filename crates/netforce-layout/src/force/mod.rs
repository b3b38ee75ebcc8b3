//! Force models plugged into the shared simulation loop.

mod atlas2;
mod spring;

pub use atlas2::Atlas2Model;
pub use spring::SpringModel;

use crate::{Point, Vector2D};

/// Added to distances in force denominators so coincident points never
/// divide by zero.
pub const DISTANCE_EPSILON: f64 = 0.01;

/// The pieces that differ between force-directed variants.
///
/// [`ForceLayout`](crate::ForceLayout) owns the iteration: it calls the three
/// force hooks for every movable point, then hands the points to
/// [`integrate`](ForceModel::integrate).
pub trait ForceModel {
    fn name(&self) -> &'static str;

    /// Mass used for repulsion and quadtree aggregation.
    fn mass(&self, point: &Point) -> f64;

    /// Force on a point at `target` pushed away from a body at `source`.
    fn repulsion(
        &self,
        target: Vector2D,
        target_mass: f64,
        source: Vector2D,
        source_mass: f64,
    ) -> Vector2D;

    /// Force on a point at `point` from an edge to `other`.
    fn attraction(&self, point: Vector2D, other: Vector2D) -> Vector2D;

    /// Force pulling a point toward the layout center.
    fn centering(&self, point: Vector2D, mass: f64, center: Vector2D) -> Vector2D;

    /// Turn accumulated forces into motion. Points arrive in the same order
    /// every step. Returns the total kinetic energy afterwards.
    fn integrate(&mut self, points: &mut [&mut Point]) -> f64;

    /// Whether the wall-clock timeout applies to this model.
    fn honours_timeout(&self) -> bool {
        true
    }
}
