//! Dense 3D vector field with boundary and validity semantics.
//!
//! Samples live on an integer lattice; cell `(x, y, z)` is stored at linear
//! index `(x * ny + y) * nz + z`. Continuous positions are expressed in the
//! same grid-index space.
//!
//! A cell whose raw vector is exactly zero marks a point outside the sampled
//! domain. The [validity mask](VectorField::validity_mask) caches this once at
//! construction and never changes afterwards, even when axis flips change.

use glam::{IVec3, UVec3, Vec3};

use crate::error::{Result, StreamtraceError};
use crate::options::FlipAxes;
use crate::tensor;
use crate::volume::{buffer_len, RawVolume, VolumeSource};

/// A dense vector field sampled on a regular 3D grid.
#[derive(Debug, Clone)]
pub struct VectorField {
    /// One raw (unflipped) vector per cell.
    data: Vec<Vec3>,
    /// Number of cells along each axis.
    dims: UVec3,
    /// Sign flips applied on lookup.
    flip: FlipAxes,
    /// `true` where the raw vector is non-zero.
    mask: Vec<bool>,
}

impl VectorField {
    /// Creates a field from a flat buffer of 3 floats per cell.
    pub fn from_components(data: &[f32], dims: UVec3) -> Result<Self> {
        let expected = buffer_len(dims, RawVolume::VECTOR_COMPONENTS)?;
        if data.len() != expected {
            return Err(StreamtraceError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        let vectors = data
            .chunks_exact(RawVolume::VECTOR_COMPONENTS)
            .map(Vec3::from_slice)
            .collect();
        Self::from_vectors(vectors, dims)
    }

    /// Creates a field from one vector per cell.
    pub fn from_vectors(data: Vec<Vec3>, dims: UVec3) -> Result<Self> {
        let expected = buffer_len(dims, 1)?;
        if data.len() != expected {
            return Err(StreamtraceError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        let mask: Vec<bool> = data.iter().map(|v| *v != Vec3::ZERO).collect();
        let valid = mask.iter().filter(|&&m| m).count();
        log::info!(
            "loaded vector field {}x{}x{} ({valid} of {expected} cells valid)",
            dims.x,
            dims.y,
            dims.z
        );

        Ok(Self {
            data,
            dims,
            flip: FlipAxes::NONE,
            mask,
        })
    }

    /// Creates a field from a buffer of symmetric tensors (6 floats per cell),
    /// keeping the principal eigenvector of each tensor.
    pub fn from_tensors(data: &[f32], dims: UVec3) -> Result<Self> {
        let expected = buffer_len(dims, RawVolume::TENSOR_COMPONENTS)?;
        if data.len() != expected {
            return Err(StreamtraceError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        log::debug!("extracting principal directions from {} tensors", expected / 6);
        Self::from_vectors(tensor::principal_directions(data), dims)
    }

    /// Creates a field from a volume source.
    ///
    /// Vector volumes (3 components) are used as-is; tensor volumes
    /// (6 components) are reduced to their principal directions.
    pub fn load(source: &impl VolumeSource) -> Result<Self> {
        let volume = source.read_volume()?;
        match volume.components() {
            RawVolume::VECTOR_COMPONENTS => Self::from_components(volume.data(), volume.dims()),
            RawVolume::TENSOR_COMPONENTS => Self::from_tensors(volume.data(), volume.dims()),
            other => Err(StreamtraceError::InvalidComponents {
                expected: RawVolume::VECTOR_COMPONENTS,
                actual: other,
            }),
        }
    }

    /// Sets the axis flips and returns the field.
    #[must_use]
    pub fn with_flip(mut self, flip: FlipAxes) -> Self {
        self.flip = flip;
        self
    }

    /// Returns the grid dimensions.
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    /// Returns the total number of cells.
    pub fn num_cells(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of cells holding a non-zero vector.
    pub fn num_valid_cells(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    /// Returns the current axis flips.
    pub fn flip(&self) -> FlipAxes {
        self.flip
    }

    /// Changes the axis flips. The validity mask is unaffected.
    pub fn set_flip(&mut self, flip: FlipAxes) {
        self.flip = flip;
    }

    /// Returns the linear index of a cell, or `None` outside the grid.
    pub fn cell_index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        let dims = self.dims.as_ivec3();
        if x < 0 || y < 0 || z < 0 || x >= dims.x || y >= dims.y || z >= dims.z {
            return None;
        }
        // Non-negative and bounded by the dimensions checked above.
        #[allow(clippy::cast_sign_loss)]
        let (x, y, z) = (x as usize, y as usize, z as usize);
        Some((x * self.dims.y as usize + y) * self.dims.z as usize + z)
    }

    /// Returns the vector stored at a lattice cell.
    ///
    /// Out-of-grid coordinates yield the zero vector.
    pub fn get_vector(&self, x: i32, y: i32, z: i32) -> Vec3 {
        match self.cell_index(x, y, z) {
            Some(index) => self.apply_flip(self.data[index]),
            None => Vec3::ZERO,
        }
    }

    /// Returns the trilinearly interpolated vector at a continuous position.
    ///
    /// Positions failing [`is_in_bounds`](Self::is_in_bounds) yield the zero
    /// vector. At lattice points the result equals [`get_vector`](Self::get_vector).
    pub fn interpolate_vector(&self, p: Vec3) -> Vec3 {
        if !self.is_in_bounds(p) {
            return Vec3::ZERO;
        }

        let last = self.dims.as_ivec3() - IVec3::ONE;
        let lower = p
            .floor()
            .as_ivec3()
            .clamp(IVec3::ZERO, (last - IVec3::ONE).max(IVec3::ZERO));
        let upper = (lower + IVec3::ONE).min(last);
        let w = (p - lower.as_vec3()).clamp(Vec3::ZERO, Vec3::ONE);

        let corner = |x: i32, y: i32, z: i32| self.get_vector(x, y, z);
        let lerp = |a: Vec3, b: Vec3, t: f32| a * (1.0 - t) + b * t;

        let c00 = lerp(
            corner(lower.x, lower.y, lower.z),
            corner(lower.x, lower.y, upper.z),
            w.z,
        );
        let c01 = lerp(
            corner(lower.x, upper.y, lower.z),
            corner(lower.x, upper.y, upper.z),
            w.z,
        );
        let c10 = lerp(
            corner(upper.x, lower.y, lower.z),
            corner(upper.x, lower.y, upper.z),
            w.z,
        );
        let c11 = lerp(
            corner(upper.x, upper.y, lower.z),
            corner(upper.x, upper.y, upper.z),
            w.z,
        );

        let c0 = lerp(c00, c01, w.y);
        let c1 = lerp(c10, c11, w.y);
        lerp(c0, c1, w.x)
    }

    /// Returns whether a position lies in `[0, dim - 1]` on every axis.
    pub fn is_in_bounds(&self, p: Vec3) -> bool {
        let last = (self.dims - UVec3::ONE).as_vec3();
        p.cmpge(Vec3::ZERO).all() && p.cmple(last).all()
    }

    /// Returns the validity mask after checking the caller's dimensions.
    pub fn validity_mask(&self, dims: UVec3) -> Result<&[bool]> {
        if dims != self.dims {
            return Err(StreamtraceError::DimensionMismatch {
                expected: self.dims,
                actual: dims,
            });
        }
        Ok(&self.mask)
    }

    /// Returns whether a lattice cell holds a non-zero vector.
    ///
    /// Out-of-grid cells are invalid.
    pub fn is_valid_cell(&self, x: i32, y: i32, z: i32) -> bool {
        self.cell_index(x, y, z).is_some_and(|i| self.mask[i])
    }

    /// Returns whether a continuous position is in bounds and its nearest
    /// cell is valid.
    pub fn is_valid_position(&self, p: Vec3) -> bool {
        if !self.is_in_bounds(p) {
            return false;
        }
        let cell = nearest_cell(p);
        self.is_valid_cell(cell.x, cell.y, cell.z)
    }

    fn apply_flip(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            if self.flip.x { -v.x } else { v.x },
            if self.flip.y { -v.y } else { v.y },
            if self.flip.z { -v.z } else { v.z },
        )
    }
}

/// Rounds a continuous position to its nearest lattice cell.
pub fn nearest_cell(p: Vec3) -> IVec3 {
    p.round().as_ivec3()
}
