//! Principal-direction extraction from symmetric tensor volumes.
//!
//! Each voxel stores the six independent components of a symmetric 3x3
//! tensor in the order `xx, yy, zz, xy, xz, yz`. The field direction of a
//! voxel is the eigenvector belonging to the largest eigenvalue.

use glam::Vec3;
use nalgebra::Matrix3;
use rayon::prelude::*;

/// Components with magnitude at or below this are treated as zero.
pub const TENSOR_EPSILON: f32 = 1e-5;

const MAX_EIGEN_ITERATIONS: usize = 100;

/// Snaps NaN and near-zero tensor components to exactly zero.
///
/// A voxel whose components all snap to zero becomes an invalid cell in the
/// resulting field instead of carrying noise or NaN into it.
pub fn sanitize_component(value: f32) -> f32 {
    if value.is_nan() || value.abs() <= TENSOR_EPSILON {
        0.0
    } else {
        value
    }
}

/// A symmetric 3x3 tensor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SymmetricTensor {
    pub xx: f32,
    pub yy: f32,
    pub zz: f32,
    pub xy: f32,
    pub xz: f32,
    pub yz: f32,
}

impl SymmetricTensor {
    /// Builds a tensor from six sanitized components (`xx, yy, zz, xy, xz, yz`).
    pub fn from_components(components: &[f32; 6]) -> Self {
        let [xx, yy, zz, xy, xz, yz] = components.map(sanitize_component);
        Self {
            xx,
            yy,
            zz,
            xy,
            xz,
            yz,
        }
    }

    /// Returns true if every component is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Returns true if every component is finite.
    pub fn is_finite(&self) -> bool {
        [self.xx, self.yy, self.zz, self.xy, self.xz, self.yz]
            .iter()
            .all(|c| c.is_finite())
    }

    /// Returns the unit eigenvector of the largest eigenvalue.
    ///
    /// Zero tensors, tensors whose decomposition does not converge and
    /// tensors with a non-finite eigenvector yield the zero vector.
    pub fn principal_direction(&self) -> Vec3 {
        if self.is_zero() {
            return Vec3::ZERO;
        }
        if !self.is_finite() {
            log::warn!("skipping non-finite tensor {self:?}");
            return Vec3::ZERO;
        }

        #[rustfmt::skip]
        let matrix = Matrix3::new(
            self.xx, self.xy, self.xz,
            self.xy, self.yy, self.yz,
            self.xz, self.yz, self.zz,
        );
        let Some(eigen) = matrix.try_symmetric_eigen(f32::EPSILON, MAX_EIGEN_ITERATIONS) else {
            log::warn!("eigen decomposition did not converge for tensor {self:?}");
            return Vec3::ZERO;
        };

        let mut largest = 0;
        for (i, value) in eigen.eigenvalues.iter().enumerate() {
            if *value > eigen.eigenvalues[largest] {
                largest = i;
            }
        }

        let column = eigen.eigenvectors.column(largest);
        let direction = Vec3::new(column[0], column[1], column[2]);
        if direction.is_finite() {
            direction
        } else {
            log::warn!("non-finite eigenvector for tensor {self:?}");
            Vec3::ZERO
        }
    }
}

/// Reduces a tensor buffer (6 floats per voxel) to one direction per voxel.
pub fn principal_directions(data: &[f32]) -> Vec<Vec3> {
    let directions: Vec<Vec3> = data
        .par_chunks_exact(6)
        .map(|chunk| match chunk.try_into() {
            Ok(components) => SymmetricTensor::from_components(components).principal_direction(),
            Err(_) => Vec3::ZERO,
        })
        .collect();

    let degenerate = directions.iter().filter(|d| **d == Vec3::ZERO).count();
    log::debug!(
        "processed {} tensors, {degenerate} degenerate",
        directions.len()
    );
    directions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_parallel(a: Vec3, b: Vec3) {
        assert!(
            (a.dot(b).abs() - 1.0).abs() < 1e-4,
            "{a} is not parallel to {b}"
        );
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component(f32::NAN), 0.0);
        assert_eq!(sanitize_component(1e-6), 0.0);
        assert_eq!(sanitize_component(-1e-5), 0.0);
        assert_eq!(sanitize_component(2e-5), 2e-5);
        assert_eq!(sanitize_component(-3.0), -3.0);
    }

    #[test]
    fn test_diagonal_tensor() {
        let tensor = SymmetricTensor::from_components(&[1.0, 5.0, 2.0, 0.0, 0.0, 0.0]);
        assert_parallel(tensor.principal_direction(), Vec3::Y);
    }

    #[test]
    fn test_off_diagonal_tensor() {
        // Eigenvalues 3 (along (1,1,0)) and 1 (along (1,-1,0)), plus 0.5 on z.
        let tensor = SymmetricTensor::from_components(&[2.0, 2.0, 0.5, 1.0, 0.0, 0.0]);
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert_parallel(tensor.principal_direction(), expected);
    }

    #[test]
    fn test_direction_is_unit() {
        let tensor = SymmetricTensor::from_components(&[0.3, 0.7, 0.2, 0.1, -0.05, 0.2]);
        assert!((tensor.principal_direction().length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_and_poisoned_tensors() {
        let zero = SymmetricTensor::from_components(&[0.0; 6]);
        assert_eq!(zero.principal_direction(), Vec3::ZERO);

        let noise = SymmetricTensor::from_components(&[f32::NAN, 1e-7, -1e-6, 0.0, f32::NAN, 0.0]);
        assert!(noise.is_zero());
        assert_eq!(noise.principal_direction(), Vec3::ZERO);
    }

    #[test]
    fn test_infinite_tensor() {
        let tensor = SymmetricTensor::from_components(&[f32::INFINITY, 1.0, 1.0, 0.0, 0.0, 0.0]);
        assert!(!tensor.is_finite());
        assert_eq!(tensor.principal_direction(), Vec3::ZERO);
    }

    #[test]
    fn test_trailing_partial_tensor_ignored() {
        let mut data = vec![0.0, 0.0, 2.0, 0.0, 0.0, 0.0];
        data.extend_from_slice(&[1.0, 1.0, 1.0]);
        let directions = principal_directions(&data);
        assert_eq!(directions.len(), 1);
        assert_parallel(directions[0], Vec3::Z);
    }

    #[test]
    fn test_principal_directions() {
        let data = [
            1.0, 0.0, 0.0, 0.0, 0.0, 0.0, // along x
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, // empty voxel
            0.0, 0.0, 4.0, 0.0, 0.0, 0.0, // along z
        ];
        let directions = principal_directions(&data);
        assert_eq!(directions.len(), 3);
        assert_parallel(directions[0], Vec3::X);
        assert_eq!(directions[1], Vec3::ZERO);
        assert_parallel(directions[2], Vec3::Z);
    }
}
