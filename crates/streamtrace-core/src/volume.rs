//! Raw volumetric buffers and the data-loading seam.
//!
//! File decoding lives outside this crate. A loader hands over a
//! [`RawVolume`] through the [`VolumeSource`] trait; the vector field then
//! validates it during construction.

use glam::UVec3;

use crate::error::{Result, StreamtraceError};

/// A flat per-voxel buffer with grid dimensions.
///
/// Voxel `(x, y, z)` starts at `((x * ny + y) * nz + z) * components`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawVolume {
    dims: UVec3,
    components: usize,
    data: Vec<f32>,
}

impl RawVolume {
    /// Components per voxel of a scalar volume.
    pub const SCALAR_COMPONENTS: usize = 1;
    /// Components per voxel of a vector volume.
    pub const VECTOR_COMPONENTS: usize = 3;
    /// Components per voxel of a symmetric tensor volume.
    pub const TENSOR_COMPONENTS: usize = 6;

    /// Creates a volume, checking that the buffer matches the dimensions.
    pub fn new(dims: UVec3, components: usize, data: Vec<f32>) -> Result<Self> {
        if components == 0 {
            return Err(StreamtraceError::InvalidComponents {
                expected: Self::SCALAR_COMPONENTS,
                actual: 0,
            });
        }
        let expected = buffer_len(dims, components)?;
        if data.len() != expected {
            return Err(StreamtraceError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            dims,
            components,
            data,
        })
    }

    /// Creates a vector volume (3 floats per voxel).
    pub fn vectors(dims: UVec3, data: Vec<f32>) -> Result<Self> {
        Self::new(dims, Self::VECTOR_COMPONENTS, data)
    }

    /// Creates a symmetric tensor volume (6 floats per voxel).
    pub fn tensors(dims: UVec3, data: Vec<f32>) -> Result<Self> {
        Self::new(dims, Self::TENSOR_COMPONENTS, data)
    }

    /// Creates a scalar volume (1 float per voxel).
    pub fn scalars(dims: UVec3, data: Vec<f32>) -> Result<Self> {
        Self::new(dims, Self::SCALAR_COMPONENTS, data)
    }

    /// Returns the grid dimensions.
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Returns the number of floats per voxel.
    pub fn components(&self) -> usize {
        self.components
    }

    /// Returns the number of voxels.
    pub fn num_voxels(&self) -> usize {
        self.data.len() / self.components
    }

    /// Returns the raw buffer.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consumes the volume and returns the raw buffer.
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }
}

/// Number of floats in a buffer of `components` values per voxel.
///
/// Fails on a zero dimension or when the count overflows `usize`.
pub(crate) fn buffer_len(dims: UVec3, components: usize) -> Result<usize> {
    if dims.cmpeq(UVec3::ZERO).any() {
        return Err(StreamtraceError::EmptyDimensions(dims));
    }
    (dims.x as usize)
        .checked_mul(dims.y as usize)
        .and_then(|n| n.checked_mul(dims.z as usize))
        .and_then(|n| n.checked_mul(components))
        .ok_or(StreamtraceError::DimensionsTooLarge(dims))
}

/// Supplies raw volume data, typically decoded from a file.
pub trait VolumeSource {
    /// Reads the volume, or explains why it cannot be read.
    fn read_volume(&self) -> Result<RawVolume>;
}

impl VolumeSource for RawVolume {
    fn read_volume(&self) -> Result<RawVolume> {
        Ok(self.clone())
    }
}

impl<F> VolumeSource for F
where
    F: Fn() -> Result<RawVolume>,
{
    fn read_volume(&self) -> Result<RawVolume> {
        self()
    }
}
