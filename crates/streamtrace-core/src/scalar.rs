//! Scalar intensity sampling used by intensity-driven seeders.

use glam::{UVec3, Vec3};

use crate::error::{Result, StreamtraceError};
use crate::volume::RawVolume;

/// Samples a scalar intensity at a continuous grid position.
pub trait ScalarSampler: Sync {
    /// Returns the intensity at `p`.
    fn sample(&self, p: Vec3) -> f32;
}

impl<F> ScalarSampler for F
where
    F: Fn(Vec3) -> f32 + Sync,
{
    fn sample(&self, p: Vec3) -> f32 {
        self(p)
    }
}

/// A dense scalar volume with trilinear sampling.
///
/// Positions are clamped into `[0, dim - 1.01]` before sampling, so every
/// query returns a value and never reads past the last voxel.
#[derive(Debug, Clone)]
pub struct ScalarVolume {
    dims: UVec3,
    data: Vec<f32>,
}

impl ScalarVolume {
    /// Margin kept from the upper grid edge when clamping.
    const EDGE_MARGIN: f32 = 1.01;

    /// Creates a scalar volume from one value per voxel.
    pub fn new(data: Vec<f32>, dims: UVec3) -> Result<Self> {
        let volume = RawVolume::scalars(dims, data)?;
        Ok(Self {
            dims,
            data: volume.into_data(),
        })
    }

    /// Creates a scalar volume from a raw single-component volume.
    pub fn from_raw(volume: RawVolume) -> Result<Self> {
        if volume.components() != RawVolume::SCALAR_COMPONENTS {
            return Err(StreamtraceError::InvalidComponents {
                expected: RawVolume::SCALAR_COMPONENTS,
                actual: volume.components(),
            });
        }
        let dims = volume.dims();
        Ok(Self {
            dims,
            data: volume.into_data(),
        })
    }

    /// Returns the grid dimensions.
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Returns the value stored at a voxel.
    pub fn value(&self, x: u32, y: u32, z: u32) -> f32 {
        let index = (x as usize * self.dims.y as usize + y as usize) * self.dims.z as usize
            + z as usize;
        self.data[index]
    }
}

impl ScalarSampler for ScalarVolume {
    // Coordinates are clamped non-negative before truncation.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn sample(&self, p: Vec3) -> f32 {
        if p.is_nan() {
            return 0.0;
        }
        let upper = (self.dims.as_vec3() - Self::EDGE_MARGIN).max(Vec3::ZERO);
        let p = p.clamp(Vec3::ZERO, upper);

        let last = self.dims - UVec3::ONE;
        let x0 = p.x as u32;
        let y0 = p.y as u32;
        let z0 = p.z as u32;
        let x1 = (x0 + 1).min(last.x);
        let y1 = (y0 + 1).min(last.y);
        let z1 = (z0 + 1).min(last.z);

        let wx = p.x - x0 as f32;
        let wy = p.y - y0 as f32;
        let wz = p.z - z0 as f32;

        let v00 = self.value(x0, y0, z0) * (1.0 - wz) + self.value(x0, y0, z1) * wz;
        let v01 = self.value(x0, y1, z0) * (1.0 - wz) + self.value(x0, y1, z1) * wz;
        let v10 = self.value(x1, y0, z0) * (1.0 - wz) + self.value(x1, y0, z1) * wz;
        let v11 = self.value(x1, y1, z0) * (1.0 - wz) + self.value(x1, y1, z1) * wz;

        let v0 = v00 * (1.0 - wy) + v01 * wy;
        let v1 = v10 * (1.0 - wy) + v11 * wy;
        v0 * (1.0 - wx) + v1 * wx
    }
}
