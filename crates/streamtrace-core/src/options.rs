//! Configuration options for tracing and seeding.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StreamtraceError};
use crate::integrator::IntegrationMethod;

/// Parameters of the streamline tracer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerOptions {
    /// Length of one integration step, in grid units.
    pub step_size: f32,

    /// Maximum number of accepted steps in each direction.
    pub max_steps: usize,

    /// Maximum arc length in each direction, in grid units.
    pub max_length: f32,

    /// Maximum turning angle between consecutive steps, in radians.
    pub max_angle: f32,

    /// Minimum vector magnitude used by magnitude-filtering seeders.
    pub min_magnitude: f32,

    /// Integration scheme used to advance positions.
    pub method: IntegrationMethod,

    /// Size of a dedicated worker pool for batch tracing (`None` = global pool).
    pub num_threads: Option<usize>,
}

impl Default for TracerOptions {
    fn default() -> Self {
        Self {
            step_size: 0.5,
            max_steps: 2000,
            max_length: 50.0,
            max_angle: 45.0_f32.to_radians(),
            min_magnitude: 0.01,
            method: IntegrationMethod::Midpoint,
            num_threads: None,
        }
    }
}

impl TracerOptions {
    /// Creates tracer options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the step size.
    pub fn with_step_size(mut self, step_size: f32) -> Self {
        self.step_size = step_size;
        self
    }

    /// Sets the maximum number of steps per direction.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets the maximum arc length per direction.
    pub fn with_max_length(mut self, max_length: f32) -> Self {
        self.max_length = max_length;
        self
    }

    /// Sets the maximum turning angle in radians.
    pub fn with_max_angle(mut self, max_angle: f32) -> Self {
        self.max_angle = max_angle;
        self
    }

    /// Sets the maximum turning angle in degrees.
    pub fn with_max_angle_degrees(mut self, degrees: f32) -> Self {
        self.max_angle = degrees.to_radians();
        self
    }

    /// Sets the minimum magnitude used by seeders.
    pub fn with_min_magnitude(mut self, min_magnitude: f32) -> Self {
        self.min_magnitude = min_magnitude;
        self
    }

    /// Sets the integration method.
    pub fn with_method(mut self, method: IntegrationMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the size of the dedicated worker pool.
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Checks that every parameter is in its valid range.
    pub fn validate(&self) -> Result<()> {
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(StreamtraceError::InvalidOptions(format!(
                "step_size must be finite and positive, got {}",
                self.step_size
            )));
        }
        if self.max_length.is_nan() || self.max_length <= 0.0 {
            return Err(StreamtraceError::InvalidOptions(format!(
                "max_length must be positive, got {}",
                self.max_length
            )));
        }
        if !(self.max_angle > 0.0 && self.max_angle <= std::f32::consts::PI) {
            return Err(StreamtraceError::InvalidOptions(format!(
                "max_angle must lie in (0, pi], got {}",
                self.max_angle
            )));
        }
        if self.min_magnitude.is_nan() || self.min_magnitude < 0.0 {
            return Err(StreamtraceError::InvalidOptions(format!(
                "min_magnitude must be non-negative, got {}",
                self.min_magnitude
            )));
        }
        if self.num_threads == Some(0) {
            return Err(StreamtraceError::InvalidOptions(
                "num_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-axis sign flips applied to sampled vectors.
///
/// Corrects datasets whose axis convention is mirrored relative to the
/// visualization convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipAxes {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl FlipAxes {
    /// No flips.
    pub const NONE: Self = Self {
        x: false,
        y: false,
        z: false,
    };

    /// Creates a flip configuration.
    pub fn new(x: bool, y: bool, z: bool) -> Self {
        Self { x, y, z }
    }

    /// Returns true if any axis is flipped.
    pub fn any(self) -> bool {
        self.x || self.y || self.z
    }
}

/// A grid axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    #[default]
    Z,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Converts a numeric axis index (0 = x, 1 = y, 2 = z).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns the numeric index of this axis.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// An axis-aligned slice through the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Slice {
    /// Axis normal to the slice.
    pub axis: Axis,
    /// Lattice index of the slice along `axis`.
    pub index: i32,
}

impl Slice {
    /// Creates a slice.
    pub fn new(axis: Axis, index: i32) -> Self {
        Self { axis, index }
    }
}

/// Thresholds of the intensity-driven seeder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdSeeding {
    /// Intensity a voxel must exceed on the first scan.
    pub intensity: f32,
    /// Fraction of `min_magnitude` the vector must exceed on the first scan.
    pub magnitude_factor: f32,
    /// Intensity threshold of the relaxed rescan.
    pub relaxed_intensity: f32,
    /// Magnitude fraction of the relaxed rescan.
    pub relaxed_magnitude_factor: f32,
    /// Candidate count below which the relaxed rescan runs.
    pub min_candidates: usize,
    /// Seeds selected per unit of density.
    pub seeds_per_density: usize,
    /// Intensity above which a pick is densified with jittered copies.
    pub jitter_intensity: f32,
    /// Number of jittered copies per high-intensity pick.
    pub jitter_copies: usize,
    /// Half-width of the uniform jitter, in grid units.
    pub jitter_radius: f32,
}

impl Default for ThresholdSeeding {
    fn default() -> Self {
        Self {
            intensity: 0.08,
            magnitude_factor: 0.5,
            relaxed_intensity: 0.01,
            relaxed_magnitude_factor: 0.3,
            min_candidates: 10,
            seeds_per_density: 1000,
            jitter_intensity: 0.25,
            jitter_copies: 3,
            jitter_radius: 1.0,
        }
    }
}

impl ThresholdSeeding {
    /// Creates threshold seeding options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the first-scan intensity threshold.
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Sets the relaxed-rescan intensity threshold.
    pub fn with_relaxed_intensity(mut self, intensity: f32) -> Self {
        self.relaxed_intensity = intensity;
        self
    }

    /// Sets the number of jittered copies per high-intensity pick.
    pub fn with_jitter_copies(mut self, copies: usize) -> Self {
        self.jitter_copies = copies;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracer_options_default() {
        let options = TracerOptions::default();
        assert_eq!(options.step_size, 0.5);
        assert_eq!(options.max_steps, 2000);
        assert!((options.max_angle - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert_eq!(options.method, IntegrationMethod::Midpoint);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_tracer_options_builder() {
        let options = TracerOptions::new()
            .with_step_size(1.0)
            .with_max_steps(5)
            .with_max_angle_degrees(90.0)
            .with_method(IntegrationMethod::Euler);
        assert_eq!(options.step_size, 1.0);
        assert_eq!(options.max_steps, 5);
        assert!((options.max_angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(options.method, IntegrationMethod::Euler);
    }

    #[test]
    fn test_tracer_options_validation() {
        assert!(TracerOptions::new().with_step_size(0.0).validate().is_err());
        assert!(TracerOptions::new()
            .with_step_size(f32::NAN)
            .validate()
            .is_err());
        assert!(TracerOptions::new().with_max_length(-1.0).validate().is_err());
        assert!(TracerOptions::new().with_max_angle(0.0).validate().is_err());
        assert!(TracerOptions::new().with_max_angle(4.0).validate().is_err());
        assert!(TracerOptions::new().with_num_threads(0).validate().is_err());
        assert!(TracerOptions::new()
            .with_max_length(f32::INFINITY)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_tracer_options_partial_json() {
        let options: TracerOptions =
            serde_json::from_str(r#"{ "step_size": 0.25, "method": "Euler" }"#).unwrap();
        assert_eq!(options.step_size, 0.25);
        assert_eq!(options.method, IntegrationMethod::Euler);
        assert_eq!(options.max_steps, 2000);
    }

    #[test]
    fn test_axis_index() {
        assert_eq!(Axis::from_index(0), Some(Axis::X));
        assert_eq!(Axis::from_index(2), Some(Axis::Z));
        assert_eq!(Axis::from_index(3), None);
        for axis in Axis::ALL {
            assert_eq!(Axis::from_index(axis.index()), Some(axis));
        }
    }

    #[test]
    fn test_flip_axes() {
        assert!(!FlipAxes::NONE.any());
        assert!(FlipAxes::new(false, true, false).any());
    }
}
