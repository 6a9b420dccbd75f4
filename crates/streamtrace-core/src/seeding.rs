//! Seed point generators.
//!
//! Generators return candidate trace origins in grid-index space. Bad
//! input (a slice outside the grid, a click on an invalid cell, a
//! non-positive density) produces an empty list and a log message rather
//! than an error.
//!
//! Randomized generators take the caller's RNG, so a seeded
//! [`StdRng`](rand::rngs::StdRng) reproduces the same seeds.

use std::f32::consts::{PI, TAU};

use glam::{UVec3, Vec3};
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;

use crate::field::VectorField;
use crate::options::{Axis, Slice, ThresholdSeeding};
use crate::scalar::ScalarSampler;

/// Scales the sphere volume down to a practical number of disk draws.
pub const DISK_ATTENUATION: f32 = 0.01;
/// Upper bound on the number of draws [`disk`] makes for one click.
pub const MAX_DISK_DRAWS: usize = 1_000_000;

/// Intensity a voxel must exceed to be considered by [`shape_seeds`].
pub const SHAPE_INTENSITY: f32 = 0.05;
/// Intensity used when the first [`shape_seeds`] scan finds too little.
pub const SHAPE_RELAXED_INTENSITY: f32 = 0.01;
/// Voxel count below which [`shape_seeds`] rescans with the relaxed threshold.
pub const SHAPE_MIN_VOXELS: usize = 1000;
/// Seed count above which [`shape_seeds`] subsamples.
pub const SHAPE_MAX_SEEDS: usize = 10_000;
/// Fraction of `min_magnitude` a voxel vector must exceed in [`shape_seeds`].
pub const SHAPE_MAGNITUDE_FACTOR: f32 = 0.1;

/// Seeds selected per unit of density by [`shape_seeds`].
const SHAPE_SEEDS_PER_DENSITY: f32 = 1000.0;

/// Returns every valid cell on an axis-aligned slice.
///
/// A slice index outside the grid yields no seeds.
pub fn slice_grid(field: &VectorField, slice: Slice) -> Vec<Vec3> {
    let dims = field.dims().as_ivec3();
    let axis = slice.axis.index();
    if slice.index < 0 || slice.index >= dims[axis] {
        log::debug!(
            "slice {} on axis {:?} is outside the grid {}",
            slice.index,
            slice.axis,
            field.dims()
        );
        return Vec::new();
    }

    let (u_axis, v_axis) = match slice.axis {
        Axis::X => (1, 2),
        Axis::Y => (0, 2),
        Axis::Z => (0, 1),
    };

    let mut seeds = Vec::new();
    for u in 0..dims[u_axis] {
        for v in 0..dims[v_axis] {
            let mut cell = [0; 3];
            cell[axis] = slice.index;
            cell[u_axis] = u;
            cell[v_axis] = v;
            if field.is_valid_cell(cell[0], cell[1], cell[2]) {
                seeds.push(Vec3::new(cell[0] as f32, cell[1] as f32, cell[2] as f32));
            }
        }
    }

    log::info!(
        "seeded {} points on slice {} along {:?}",
        seeds.len(),
        slice.index,
        slice.axis
    );
    seeds
}

/// Number of random draws made by [`disk`] for a radius and density,
/// capped at [`MAX_DISK_DRAWS`].
// The product is checked non-negative and finite before the cast.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn disk_budget(radius: f32, density: f32) -> usize {
    let budget = (4.0 / 3.0) * PI * radius.powi(3) * density * DISK_ATTENUATION;
    if budget.is_finite() && budget > 0.0 {
        budget.min(MAX_DISK_DRAWS as f32).round() as usize
    } else {
        0
    }
}

/// Scatters seeds in a ball around a clicked point on a slice.
///
/// The click is projected onto the slice plane by replacing its coordinate
/// along the slice axis with the slice index. Draws whose position is out
/// of bounds or on an invalid cell are dropped; duplicates are kept.
pub fn disk(
    field: &VectorField,
    slice: Slice,
    click: Vec3,
    radius: f32,
    density: f32,
    rng: &mut impl Rng,
) -> Vec<Vec3> {
    let mut center = click;
    center[slice.axis.index()] = slice.index as f32;
    if !field.is_valid_position(center) {
        log::warn!("seed location {center} is outside the field or on an empty cell");
        return Vec::new();
    }

    let budget = disk_budget(radius, density);
    if budget == MAX_DISK_DRAWS {
        log::warn!("disk radius {radius} at density {density} capped to {MAX_DISK_DRAWS} draws");
    }
    let mut seeds = Vec::new();
    for _ in 0..budget {
        let r = radius * rng.gen::<f32>().sqrt();
        let theta = rng.gen_range(0.0..=PI);
        let phi = rng.gen_range(0.0..TAU);
        let offset = Vec3::new(
            r * theta.sin() * phi.cos(),
            r * theta.sin() * phi.sin(),
            r * theta.cos(),
        );
        let p = center + offset;
        if field.is_valid_position(p) {
            seeds.push(p);
        }
    }

    log::info!(
        "seeded {} of {budget} points within {radius} of {center}",
        seeds.len()
    );
    seeds
}

/// Picks seeds where a scalar intensity volume is bright and the field is
/// strong, densifying the brightest picks with jittered copies.
///
/// The grid is scanned at stride `max(1, floor(2 / density))`. If the first
/// scan finds fewer than `params.min_candidates` points, it is repeated once
/// with the relaxed thresholds. At most `density * params.seeds_per_density`
/// candidates are kept, chosen at random when there are more.
// Stride and selection counts are checked positive and finite before casting.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn threshold(
    field: &VectorField,
    sampler: &impl ScalarSampler,
    params: &ThresholdSeeding,
    density: f32,
    min_magnitude: f32,
    rng: &mut impl Rng,
) -> Vec<Vec3> {
    if !(density.is_finite() && density > 0.0) {
        log::warn!("seed density must be positive, got {density}");
        return Vec::new();
    }

    let stride = ((2.0 / density).floor() as u32).max(1);
    let mut candidates = scan_intensity(
        field,
        sampler,
        stride,
        params.intensity,
        min_magnitude * params.magnitude_factor,
    );
    if candidates.len() < params.min_candidates {
        log::debug!(
            "only {} candidates above intensity {}, rescanning with {}",
            candidates.len(),
            params.intensity,
            params.relaxed_intensity
        );
        candidates = scan_intensity(
            field,
            sampler,
            stride,
            params.relaxed_intensity,
            min_magnitude * params.relaxed_magnitude_factor,
        );
    }

    let found = candidates.len();
    let target = (density * params.seeds_per_density as f32).round() as usize;
    if found > target {
        candidates.shuffle(rng);
        candidates.truncate(target);
    }

    let last = (field.dims() - UVec3::ONE).as_vec3();
    let radius = params.jitter_radius;
    let mut seeds = Vec::with_capacity(candidates.len());
    for (p, intensity) in &candidates {
        seeds.push(*p);
        if *intensity > params.jitter_intensity && radius > 0.0 {
            for _ in 0..params.jitter_copies {
                let jitter = Vec3::new(
                    rng.gen_range(-radius..=radius),
                    rng.gen_range(-radius..=radius),
                    rng.gen_range(-radius..=radius),
                );
                seeds.push((*p + jitter).clamp(Vec3::ZERO, last));
            }
        }
    }

    log::info!(
        "threshold seeding kept {} of {found} candidates, {} seeds in total",
        candidates.len(),
        seeds.len()
    );
    seeds
}

/// Lattice points at `stride` whose intensity and field magnitude pass.
fn scan_intensity(
    field: &VectorField,
    sampler: &impl ScalarSampler,
    stride: u32,
    min_intensity: f32,
    min_magnitude: f32,
) -> Vec<(Vec3, f32)> {
    let dims = field.dims();
    let step = stride as usize;
    (0..dims.x)
        .into_par_iter()
        .step_by(step)
        .flat_map_iter(|x| {
            (0..dims.y).step_by(step).flat_map(move |y| {
                (0..dims.z)
                    .step_by(step)
                    .map(move |z| Vec3::new(x as f32, y as f32, z as f32))
            })
        })
        .filter_map(|p| {
            let intensity = sampler.sample(p);
            let strong = field.interpolate_vector(p).length() > min_magnitude;
            (intensity > min_intensity && strong).then_some((p, intensity))
        })
        .collect()
}

/// Regular lattice seeds with a per-axis density.
///
/// The stride on each axis is `max(1, dim / (2 * density))` and enumeration
/// starts one stride in from the lower face. Cells whose vector magnitude is
/// at most `min_magnitude` are skipped.
#[allow(clippy::cast_possible_wrap)]
pub fn stride_grid(field: &VectorField, densities: UVec3, min_magnitude: f32) -> Vec<Vec3> {
    let dims = field.dims();
    let stride = (dims / (2 * densities.max(UVec3::ONE))).max(UVec3::ONE);

    let mut seeds = Vec::new();
    for x in (stride.x..dims.x).step_by(stride.x as usize) {
        for y in (stride.y..dims.y).step_by(stride.y as usize) {
            for z in (stride.z..dims.z).step_by(stride.z as usize) {
                if field.get_vector(x as i32, y as i32, z as i32).length() > min_magnitude {
                    seeds.push(Vec3::new(x as f32, y as f32, z as f32));
                }
            }
        }
    }

    log::info!("stride grid {stride} produced {} seeds", seeds.len());
    seeds
}

/// Seeds every bright voxel with a non-negligible vector.
///
/// Voxels brighter than [`SHAPE_INTENSITY`] are collected, falling back to
/// [`SHAPE_RELAXED_INTENSITY`] when fewer than [`SHAPE_MIN_VOXELS`] qualify.
/// When more than [`SHAPE_MAX_SEEDS`] remain after the magnitude filter a
/// random subset of `density * 1000` is returned.
#[allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]
pub fn shape_seeds(
    field: &VectorField,
    sampler: &impl ScalarSampler,
    density: f32,
    min_magnitude: f32,
    rng: &mut impl Rng,
) -> Vec<Vec3> {
    let mut voxels = scan_intensity(field, sampler, 1, SHAPE_INTENSITY, f32::NEG_INFINITY);
    if voxels.len() < SHAPE_MIN_VOXELS {
        log::debug!(
            "only {} voxels above intensity {SHAPE_INTENSITY}, rescanning",
            voxels.len()
        );
        voxels = scan_intensity(field, sampler, 1, SHAPE_RELAXED_INTENSITY, f32::NEG_INFINITY);
    }

    let floor = SHAPE_MAGNITUDE_FACTOR * min_magnitude;
    let mut seeds: Vec<Vec3> = voxels
        .into_iter()
        .map(|(p, _)| p)
        .filter(|p| field.get_vector(p.x as i32, p.y as i32, p.z as i32).length() > floor)
        .collect();

    if seeds.len() > SHAPE_MAX_SEEDS {
        let target = (density.max(0.0) * SHAPE_SEEDS_PER_DENSITY).round() as usize;
        seeds.shuffle(rng);
        seeds.truncate(target);
    }

    log::info!("shape seeding produced {} seeds", seeds.len());
    seeds
}
