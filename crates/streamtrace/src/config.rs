//! Session configuration.
//!
//! A [`Config`] gathers the tracer parameters and the seeding choices in one
//! serializable value. Missing JSON keys fall back to their defaults, so a
//! config file only needs to name what it changes:
//!
//! ```
//! use streamtrace::Config;
//!
//! let config = Config::from_json_str(r#"{ "tracer": { "step_size": 0.25 } }"#).unwrap();
//! assert_eq!(config.tracer.step_size, 0.25);
//! assert_eq!(config.tracer.max_steps, 2000);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use streamtrace_core::{FlipAxes, Result, ThresholdSeeding, TracerOptions};

/// How a session picks its seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SeedingMode {
    /// Every valid cell on the active slice.
    #[default]
    SliceGrid,
    /// Random points in a ball around the clicked location.
    Disk,
}

/// Configuration of a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tracer parameters.
    pub tracer: TracerOptions,

    /// Seeding strategy used by `generate_streamlines`.
    pub seeding: SeedingMode,

    /// Draw density for disk seeding.
    pub disk_density: f32,

    /// Disk radius in grid units (`None` = derived from the grid size).
    pub disk_radius: Option<f32>,

    /// Density passed to threshold seeding.
    pub threshold_density: f32,

    /// Thresholds for intensity-driven seeding.
    pub threshold: ThresholdSeeding,

    /// Axis flips applied to the field.
    pub flip: FlipAxes,

    /// Seed for the session RNG (`None` = seeded from entropy).
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracer: TracerOptions::default(),
            seeding: SeedingMode::SliceGrid,
            disk_density: 50.0,
            disk_radius: None,
            threshold_density: 1.0,
            threshold: ThresholdSeeding::default(),
            flip: FlipAxes::NONE,
            rng_seed: None,
        }
    }
}

impl Config {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tracer parameters.
    #[must_use]
    pub fn with_tracer(mut self, tracer: TracerOptions) -> Self {
        self.tracer = tracer;
        self
    }

    /// Sets the seeding mode.
    #[must_use]
    pub fn with_seeding(mut self, seeding: SeedingMode) -> Self {
        self.seeding = seeding;
        self
    }

    /// Sets the disk seeding radius.
    #[must_use]
    pub fn with_disk_radius(mut self, radius: f32) -> Self {
        self.disk_radius = Some(radius);
        self
    }

    /// Sets the axis flips.
    #[must_use]
    pub fn with_flip(mut self, flip: FlipAxes) -> Self {
        self.flip = flip;
        self
    }

    /// Sets the RNG seed.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Parses a configuration from JSON and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.tracer.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
