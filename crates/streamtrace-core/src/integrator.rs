//! Numerical integration schemes for advancing along a vector field.
//!
//! Every scheme samples the field, normalizes the samples and moves by a
//! signed step length; the sign selects the tracing direction. When a
//! sample is exactly zero there is no direction to follow and the input
//! position is returned unchanged, which the tracer reports as a stall.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::field::VectorField;

/// Advances a position by one step through a vector field.
pub trait Integrator {
    /// Returns the next position after a step of signed length `step`.
    fn step(&self, field: &VectorField, position: Vec3, step: f32) -> Vec3;
}

/// Samples the field and normalizes the result, or `None` for a zero sample.
fn direction_at(field: &VectorField, position: Vec3) -> Option<Vec3> {
    let v = field.interpolate_vector(position);
    if v == Vec3::ZERO {
        None
    } else {
        Some(v.normalize())
    }
}

/// Forward Euler: `p + h * v(p) / |v(p)|`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euler;

impl Integrator for Euler {
    fn step(&self, field: &VectorField, position: Vec3, step: f32) -> Vec3 {
        match direction_at(field, position) {
            Some(d) => position + step * d,
            None => position,
        }
    }
}

/// Second-order midpoint scheme.
///
/// Takes a half step along the local direction, resamples there and moves
/// the starting position a full step along the midpoint direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Midpoint;

impl Integrator for Midpoint {
    fn step(&self, field: &VectorField, position: Vec3, step: f32) -> Vec3 {
        let Some(d1) = direction_at(field, position) else {
            return position;
        };
        let Some(d2) = direction_at(field, position + 0.5 * step * d1) else {
            return position;
        };
        position + step * d2
    }
}

/// Classic fourth-order Runge-Kutta on normalized samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct RungeKutta4;

impl Integrator for RungeKutta4 {
    fn step(&self, field: &VectorField, position: Vec3, step: f32) -> Vec3 {
        let Some(k1) = direction_at(field, position) else {
            return position;
        };
        let Some(k2) = direction_at(field, position + 0.5 * step * k1) else {
            return position;
        };
        let Some(k3) = direction_at(field, position + 0.5 * step * k2) else {
            return position;
        };
        let Some(k4) = direction_at(field, position + step * k3) else {
            return position;
        };
        position + step / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4)
    }
}

/// The available integration schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IntegrationMethod {
    /// First-order forward Euler.
    Euler,
    /// Second-order midpoint.
    #[default]
    Midpoint,
    /// Fourth-order Runge-Kutta.
    RungeKutta4,
}

impl Integrator for IntegrationMethod {
    fn step(&self, field: &VectorField, position: Vec3, step: f32) -> Vec3 {
        match self {
            IntegrationMethod::Euler => Euler.step(field, position, step),
            IntegrationMethod::Midpoint => Midpoint.step(field, position, step),
            IntegrationMethod::RungeKutta4 => RungeKutta4.step(field, position, step),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec3;

    fn uniform_field(dims: UVec3, v: Vec3) -> VectorField {
        let n = (dims.x * dims.y * dims.z) as usize;
        VectorField::from_vectors(vec![v; n], dims).unwrap()
    }

    /// Field pointing along +x for x < 2 and along +y from x = 2 on.
    fn turning_field() -> VectorField {
        let dims = UVec3::new(5, 5, 1);
        let mut data = Vec::new();
        for x in 0..5 {
            for _y in 0..5 {
                data.push(if x < 2 { Vec3::X } else { Vec3::Y });
            }
        }
        VectorField::from_vectors(data, dims).unwrap()
    }

    #[test]
    fn test_euler_uniform() {
        let field = uniform_field(UVec3::splat(5), Vec3::new(2.0, 0.0, 0.0));
        let next = Euler.step(&field, Vec3::splat(2.0), 0.5);
        assert_eq!(next, Vec3::new(2.5, 2.0, 2.0));
        let back = Euler.step(&field, Vec3::splat(2.0), -0.5);
        assert_eq!(back, Vec3::new(1.5, 2.0, 2.0));
    }

    #[test]
    fn test_euler_normalizes() {
        let field = uniform_field(UVec3::splat(5), Vec3::new(0.0, 3.0, 4.0));
        let next = Euler.step(&field, Vec3::ZERO, 1.0);
        assert!((next - Vec3::new(0.0, 0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_zero_sample_stalls() {
        let field = uniform_field(UVec3::splat(3), Vec3::ZERO);
        let p = Vec3::new(1.0, 1.0, 1.0);
        for method in [
            IntegrationMethod::Euler,
            IntegrationMethod::Midpoint,
            IntegrationMethod::RungeKutta4,
        ] {
            assert_eq!(method.step(&field, p, 0.5), p);
        }
    }

    #[test]
    fn test_out_of_bounds_stalls() {
        let field = uniform_field(UVec3::splat(3), Vec3::X);
        let p = Vec3::new(5.0, 1.0, 1.0);
        assert_eq!(Midpoint.step(&field, p, 0.5), p);
    }

    #[test]
    fn test_midpoint_uses_intermediate_sample() {
        let field = turning_field();
        let start = Vec3::new(1.0, 1.0, 0.0);
        // Half step lands on x = 2 where the field points along +y.
        let next = Midpoint.step(&field, start, 2.0);
        assert!((next - Vec3::new(1.0, 3.0, 0.0)).length() < 1e-6);
        // Euler only sees the start sample.
        let euler = Euler.step(&field, start, 2.0);
        assert!((euler - Vec3::new(3.0, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_midpoint_stalls_on_zero_intermediate() {
        let mut data = vec![Vec3::ZERO; 3];
        data[0] = Vec3::X;
        let field = VectorField::from_vectors(data, UVec3::new(3, 1, 1)).unwrap();
        // Intermediate point (1, 0, 0) holds a zero vector.
        assert_eq!(Midpoint.step(&field, Vec3::ZERO, 2.0), Vec3::ZERO);
    }

    #[test]
    fn test_rk4_uniform_matches_euler() {
        let field = uniform_field(UVec3::splat(6), Vec3::new(1.0, 1.0, 0.0));
        let p = Vec3::splat(2.0);
        let rk4 = RungeKutta4.step(&field, p, 0.75);
        let euler = Euler.step(&field, p, 0.75);
        assert!((rk4 - euler).length() < 1e-5);
    }

    #[test]
    fn test_method_dispatch() {
        let field = turning_field();
        let p = Vec3::new(1.5, 1.0, 0.0);
        assert_eq!(
            IntegrationMethod::Euler.step(&field, p, 1.0),
            Euler.step(&field, p, 1.0)
        );
        assert_eq!(
            IntegrationMethod::Midpoint.step(&field, p, 1.0),
            Midpoint.step(&field, p, 1.0)
        );
        assert_eq!(IntegrationMethod::default(), IntegrationMethod::Midpoint);
    }
}
