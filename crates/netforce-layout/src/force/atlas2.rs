//! ForceAtlas2-style forces with adaptive speed.
//!
//! Masses are `degree + 1`, so hubs push harder and are pulled harder by
//! gravity. Instead of a damping factor, every step measures how much each
//! point's force changed direction ("swing") versus how much it kept pulling
//! the same way ("traction") and derives a global speed from the ratio.

use super::{ForceModel, DISTANCE_EPSILON};
use crate::parameters::Atlas2Parameters;
use crate::{Point, Vector2D};

#[derive(Debug, Clone)]
pub struct Atlas2Model {
    params: Atlas2Parameters,
    /// Forces of the previous step, in point order.
    previous_forces: Vec<Vector2D>,
    global_speed: f64,
}

impl Atlas2Model {
    pub fn new(params: Atlas2Parameters) -> Self {
        Self {
            params,
            previous_forces: Vec::new(),
            global_speed: 1.0,
        }
    }

    pub fn params(&self) -> &Atlas2Parameters {
        &self.params
    }

    /// Speed shared by every point for the last step.
    pub fn global_speed(&self) -> f64 {
        self.global_speed
    }
}

impl ForceModel for Atlas2Model {
    fn name(&self) -> &'static str {
        "atlas2"
    }

    fn mass(&self, point: &Point) -> f64 {
        point.degree() as f64 + 1.0
    }

    fn repulsion(
        &self,
        target: Vector2D,
        target_mass: f64,
        source: Vector2D,
        source_mass: f64,
    ) -> Vector2D {
        let direction = Vector2D::unit_between(&source, &target);
        let distance = target.distance_to(&source);
        let magnitude =
            self.params.repulsion * target_mass * source_mass / (distance + DISTANCE_EPSILON);
        direction * magnitude
    }

    fn attraction(&self, point: Vector2D, other: Vector2D) -> Vector2D {
        if self.params.lin_log {
            let distance = point.distance_to(&other);
            Vector2D::unit_between(&point, &other) * (self.params.attraction * distance.ln_1p())
        } else {
            Vector2D::between(&point, &other) * self.params.attraction
        }
    }

    fn centering(&self, point: Vector2D, mass: f64, center: Vector2D) -> Vector2D {
        if self.params.strong_gravity {
            Vector2D::between(&point, &center) * (self.params.gravity * mass)
        } else {
            Vector2D::unit_between(&point, &center) * (self.params.gravity * mass)
        }
    }

    fn integrate(&mut self, points: &mut [&mut Point]) -> f64 {
        if self.previous_forces.len() != points.len() {
            self.previous_forces = vec![Vector2D::ZERO; points.len()];
        }

        let mut swings = Vec::with_capacity(points.len());
        let mut total_swing = 0.0;
        let mut total_traction = 0.0;
        for (point, previous) in points.iter().zip(&self.previous_forces) {
            let mass = self.mass(point);
            let force = point.force();
            let swing = (force - *previous).magnitude();
            let traction = (force + *previous).magnitude() / 2.0;
            total_swing += mass * swing;
            total_traction += mass * traction;
            swings.push(swing);
        }

        let ceiling = self.global_speed * self.params.max_global_speed_increase_ratio;
        self.global_speed = if total_swing > 0.0 {
            (self.params.swing_tolerance * total_traction / total_swing).min(ceiling)
        } else {
            ceiling
        };

        let mut energy = 0.0;
        for ((point, previous), swing) in points
            .iter_mut()
            .zip(self.previous_forces.iter_mut())
            .zip(swings)
        {
            let force = point.force();
            let mut speed = self.params.speed_factor * self.global_speed
                / (1.0 + self.global_speed * swing.sqrt());
            let magnitude = force.magnitude();
            if magnitude > 0.0 {
                speed = speed.min(self.params.max_speed_factor / magnitude);
            }

            let displacement = force * speed;
            point.set_velocity(displacement);
            point.set_position(point.position() + displacement);
            energy += point.energy();
            *previous = force;
        }
        energy
    }

    fn honours_timeout(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> Atlas2Model {
        Atlas2Model::new(Atlas2Parameters::default())
    }

    #[test]
    fn test_mass_is_degree_plus_one() {
        let mut point = Point::at(0.0, 0.0);
        point.set_degree(3);
        assert_eq!(model().mass(&point), 4.0);
    }

    #[test]
    fn test_repulsion_scales_with_both_masses() {
        let m = model();
        let light = m.repulsion(Vector2D::new(10.0, 0.0), 1.0, Vector2D::ZERO, 1.0);
        let heavy = m.repulsion(Vector2D::new(10.0, 0.0), 2.0, Vector2D::ZERO, 3.0);
        assert!(light.x > 0.0);
        assert!((heavy.x / light.x - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_lin_log_attraction_is_weaker_at_distance() {
        let linear = model();
        let log = Atlas2Model::new(Atlas2Parameters {
            lin_log: true,
            ..Default::default()
        });
        let far = Vector2D::new(100.0, 0.0);
        assert_eq!(linear.attraction(Vector2D::ZERO, far), Vector2D::new(100.0, 0.0));
        let f = log.attraction(Vector2D::ZERO, far);
        assert!((f.x - 101.0f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_gravity_modes() {
        let weak = model();
        let strong = Atlas2Model::new(Atlas2Parameters {
            strong_gravity: true,
            ..Default::default()
        });
        let p = Vector2D::new(0.0, 50.0);
        let g = weak.params().gravity;
        assert!((weak.centering(p, 2.0, Vector2D::ZERO).y + 2.0 * g).abs() < 1e-12);
        assert!((strong.centering(p, 2.0, Vector2D::ZERO).y + 100.0 * g).abs() < 1e-9);
    }

    #[test]
    fn test_displacement_is_capped() {
        let mut m = model();
        let mut point = Point::at(0.0, 0.0);
        point.apply_force(Vector2D::new(1.0e6, 0.0));
        m.integrate(&mut [&mut point]);
        assert!(point.position().x > 0.0);
        assert!(point.position().x <= m.params().max_speed_factor + 1e-9);
    }

    #[test]
    fn test_global_speed_growth_is_bounded() {
        let mut m = model();
        let mut point = Point::at(0.0, 0.0);
        let before = m.global_speed();
        for _ in 0..5 {
            point.reset_forces();
            point.apply_force(Vector2D::new(0.1, 0.0));
            let previous = m.global_speed();
            m.integrate(&mut [&mut point]);
            let ceiling = previous * m.params().max_global_speed_increase_ratio;
            assert!(m.global_speed() <= ceiling + 1e-12);
        }
        assert!(m.global_speed() > before);
    }
}
