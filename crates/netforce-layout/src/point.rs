//! Simulated particles.

use crate::{LayoutError, Result, Vector2D};

/// A particle of the simulation: one per graph vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    position: Vector2D,
    velocity: Vector2D,
    force: Vector2D,
    mass: f64,
    /// Degree of the vertex in the simple graph.
    degree: usize,
}

impl Point {
    /// Create a resting point. Fails for a negative mass.
    pub fn new(position: Vector2D, mass: f64) -> Result<Self> {
        check_mass(mass)?;
        Ok(Self {
            position,
            velocity: Vector2D::ZERO,
            force: Vector2D::ZERO,
            mass,
            degree: 0,
        })
    }

    /// Unit-mass point at `(x, y)`.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Vector2D::new(x, y),
            velocity: Vector2D::ZERO,
            force: Vector2D::ZERO,
            mass: 1.0,
            degree: 0,
        }
    }

    pub fn position(&self) -> Vector2D {
        self.position
    }

    pub fn set_position(&mut self, position: Vector2D) {
        self.position = position;
    }

    pub fn velocity(&self) -> Vector2D {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vector2D) {
        self.velocity = velocity;
    }

    /// Sum of the forces applied since the last [`reset_forces`](Self::reset_forces).
    pub fn force(&self) -> Vector2D {
        self.force
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Change the mass. The non-negativity check applies here too.
    pub fn set_mass(&mut self, mass: f64) -> Result<()> {
        check_mass(mass)?;
        self.mass = mass;
        Ok(())
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub(crate) fn set_degree(&mut self, degree: usize) {
        self.degree = degree;
    }

    pub fn apply_force(&mut self, force: Vector2D) {
        self.force += force;
    }

    pub fn reset_forces(&mut self) {
        self.force = Vector2D::ZERO;
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.position.x - other.position.x;
        let dy = self.position.y - other.position.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Kinetic energy, ½·m·|v|².
    pub fn energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.magnitude_squared()
    }
}

fn check_mass(mass: f64) -> Result<()> {
    // NaN fails this check as well
    if mass >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::NegativeMass { mass })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_mass_rejected() {
        let err = Point::new(Vector2D::ZERO, -1.0).unwrap_err();
        assert!(matches!(err, LayoutError::NegativeMass { mass } if mass == -1.0));
    }

    #[test]
    fn test_zero_mass_accepted() {
        let point = Point::new(Vector2D::new(1.0, 2.0), 0.0).unwrap();
        assert_eq!(point.mass(), 0.0);
        assert_eq!(point.energy(), 0.0);
    }

    #[test]
    fn test_set_mass_revalidates() {
        let mut point = Point::at(0.0, 0.0);
        assert!(point.set_mass(-0.5).is_err());
        assert_eq!(point.mass(), 1.0);
        point.set_mass(3.0).unwrap();
        assert_eq!(point.mass(), 3.0);
    }

    #[test]
    fn test_forces_accumulate_until_reset() {
        let mut point = Point::at(0.0, 0.0);
        point.apply_force(Vector2D::new(1.0, 0.0));
        point.apply_force(Vector2D::new(0.5, 2.0));
        assert_eq!(point.force(), Vector2D::new(1.5, 2.0));
        point.reset_forces();
        assert_eq!(point.force(), Vector2D::ZERO);
    }

    #[test]
    fn test_energy_and_distance() {
        let mut point = Point::new(Vector2D::ZERO, 2.0).unwrap();
        point.set_velocity(Vector2D::new(3.0, 4.0));
        assert_eq!(point.energy(), 25.0);
        assert_eq!(point.distance_to(&Point::at(3.0, 4.0)), 5.0);
    }
}
