//! Spring-embedder forces.

use super::{ForceModel, DISTANCE_EPSILON};
use crate::parameters::SpringParameters;
use crate::{Point, Vector2D};

/// Inverse-square repulsion, Hooke springs on edges, linear pull toward the
/// center and damped velocity integration.
#[derive(Debug, Clone)]
pub struct SpringModel {
    params: SpringParameters,
}

impl SpringModel {
    pub fn new(params: SpringParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SpringParameters {
        &self.params
    }
}

impl ForceModel for SpringModel {
    fn name(&self) -> &'static str {
        "spring"
    }

    fn mass(&self, point: &Point) -> f64 {
        point.mass()
    }

    fn repulsion(
        &self,
        target: Vector2D,
        _target_mass: f64,
        source: Vector2D,
        source_mass: f64,
    ) -> Vector2D {
        let direction = Vector2D::unit_between(&source, &target);
        let dist_sq = Vector2D::between(&source, &target).magnitude_squared();
        direction * (self.params.repulsion * source_mass / (dist_sq + DISTANCE_EPSILON))
    }

    fn attraction(&self, point: Vector2D, other: Vector2D) -> Vector2D {
        let displacement = point.distance_to(&other) - self.params.spring_length;
        Vector2D::unit_between(&point, &other) * (self.params.stiffness * displacement)
    }

    fn centering(&self, point: Vector2D, _mass: f64, center: Vector2D) -> Vector2D {
        Vector2D::between(&point, &center) * self.params.center_attraction
    }

    fn integrate(&mut self, points: &mut [&mut Point]) -> f64 {
        let dt = self.params.time_step;
        let mut energy = 0.0;
        for point in points.iter_mut() {
            let mut velocity = (point.velocity() + point.force() * dt) * self.params.damping;
            if velocity.magnitude() > self.params.max_speed {
                velocity = velocity.normalized() * self.params.max_speed;
            }
            point.set_velocity(velocity);
            point.set_position(point.position() + velocity * dt);
            energy += point.energy();
        }
        energy
    }
}
