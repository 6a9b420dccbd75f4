//! Interactive tracing session.
//!
//! A [`Session`] owns a vector field together with the state an interactive
//! front end manipulates: the configuration, the slice index on each axis,
//! the selected axis and the last clicked location. Each call to
//! [`Session::generate_streamlines`] runs the full seed and trace pipeline
//! against that state.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::ThreadPool;
use streamtrace_core::seeding;
use streamtrace_core::tracer::build_pool;
use streamtrace_core::{
    Axis, FlipAxes, Result, ScalarSampler, Slice, Streamline, StreamlineTracer, TraceStats,
    TracerOptions, VectorField, VolumeSource,
};

use crate::config::{Config, SeedingMode};

/// Divisor applied to the largest grid dimension to get the default disk radius.
const SEED_RADIUS_DIVISOR: f32 = 30.0;

/// A vector field plus the seeding state of an interactive viewer.
#[derive(Debug)]
pub struct Session {
    field: VectorField,
    config: Config,
    slices: [i32; 3],
    axis: Axis,
    click: Option<Vec3>,
    rng: StdRng,
    pool: Option<ThreadPool>,
}

impl Session {
    /// Creates a session over a field.
    ///
    /// Slices start in the middle of the grid on every axis and the
    /// configured axis flips are applied to the field.
    // Grid dimensions fit in i32 for any field that fits in memory.
    #[allow(clippy::cast_possible_wrap)]
    pub fn new(mut field: VectorField, config: Config) -> Result<Self> {
        config.tracer.validate()?;
        field.set_flip(config.flip);
        let pool = build_pool(&config.tracer)?;

        let middle = field.dims() / 2;
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        log::info!(
            "session started on a {} field with {:?} seeding",
            field.dims(),
            config.seeding
        );
        Ok(Self {
            field,
            config,
            slices: [middle.x as i32, middle.y as i32, middle.z as i32],
            axis: Axis::default(),
            click: None,
            rng,
            pool,
        })
    }

    /// Loads the field from a volume source and creates a session over it.
    pub fn load(source: &impl VolumeSource, config: Config) -> Result<Self> {
        Self::new(VectorField::load(source)?, config)
    }

    /// Returns the field.
    pub fn field(&self) -> &VectorField {
        &self.field
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the tracer parameters used by the next generation.
    ///
    /// The worker pool is rebuilt only when the thread count changes.
    pub fn set_tracer_options(&mut self, options: TracerOptions) -> Result<()> {
        options.validate()?;
        if options.num_threads != self.config.tracer.num_threads {
            self.pool = build_pool(&options)?;
        }
        self.config.tracer = options;
        Ok(())
    }

    /// Returns the dedicated worker pool, if a thread count is configured.
    pub fn pool(&self) -> Option<&ThreadPool> {
        self.pool.as_ref()
    }

    /// Changes the seeding mode.
    pub fn set_seeding_mode(&mut self, mode: SeedingMode) {
        self.config.seeding = mode;
    }

    /// Changes the axis flips of the field.
    pub fn set_flip(&mut self, flip: FlipAxes) {
        self.config.flip = flip;
        self.field.set_flip(flip);
    }

    /// Returns the selected axis.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Selects the axis whose slice drives seeding.
    pub fn select_axis(&mut self, axis: Axis) {
        self.axis = axis;
    }

    /// Returns the slice index on an axis.
    pub fn slice_index(&self, axis: Axis) -> i32 {
        self.slices[axis.index()]
    }

    /// Sets the slice index on an axis.
    ///
    /// Indices outside the grid are stored as given; seeding from such a
    /// slice produces nothing.
    pub fn set_slice_index(&mut self, axis: Axis, index: i32) {
        self.slices[axis.index()] = index;
    }

    /// Returns the slice on the selected axis.
    pub fn active_slice(&self) -> Slice {
        Slice::new(self.axis, self.slice_index(self.axis))
    }

    /// Sets or clears the clicked location used by disk seeding.
    pub fn set_click(&mut self, click: Option<Vec3>) {
        self.click = click;
    }

    /// Returns the last clicked location.
    pub fn click(&self) -> Option<Vec3> {
        self.click
    }

    /// Disk radius derived from the grid: the largest dimension over 30.
    #[allow(clippy::cast_precision_loss)]
    pub fn default_seed_radius(&self) -> f32 {
        self.field.dims().max_element() as f32 / SEED_RADIUS_DIVISOR
    }

    /// The configured disk radius, or [`default_seed_radius`](Self::default_seed_radius).
    pub fn seed_radius(&self) -> f32 {
        self.config
            .disk_radius
            .unwrap_or_else(|| self.default_seed_radius())
    }

    /// Generates seeds for the current mode, slice and click.
    pub fn generate_seeds(&mut self) -> Vec<Vec3> {
        let slice = self.active_slice();
        match self.config.seeding {
            SeedingMode::SliceGrid => seeding::slice_grid(&self.field, slice),
            SeedingMode::Disk => {
                let Some(click) = self.click else {
                    log::warn!("disk seeding needs a clicked location");
                    return Vec::new();
                };
                let radius = self.seed_radius();
                seeding::disk(
                    &self.field,
                    slice,
                    click,
                    radius,
                    self.config.disk_density,
                    &mut self.rng,
                )
            }
        }
    }

    /// Generates seeds where an intensity volume is bright.
    pub fn generate_threshold_seeds(&mut self, sampler: &impl ScalarSampler) -> Vec<Vec3> {
        seeding::threshold(
            &self.field,
            sampler,
            &self.config.threshold,
            self.config.threshold_density,
            self.config.tracer.min_magnitude,
            &mut self.rng,
        )
    }

    /// Traces a batch of seeds with the current tracer parameters.
    ///
    /// Runs on the session's worker pool when one is configured.
    pub fn trace(&self, seeds: &[Vec3]) -> Result<(Vec<Streamline>, TraceStats)> {
        // The session owns the pool, so the tracer must not build its own.
        let options = TracerOptions {
            num_threads: None,
            ..self.config.tracer.clone()
        };
        let tracer = StreamlineTracer::new(&self.field, options)?;
        Ok(match &self.pool {
            Some(pool) => pool.install(|| tracer.trace_all_with_stats(seeds)),
            None => tracer.trace_all_with_stats(seeds),
        })
    }

    /// Seeds and traces in one go.
    ///
    /// Returns an empty list without tracing when no seeds are produced.
    pub fn generate_streamlines(&mut self) -> Result<Vec<Streamline>> {
        let seeds = self.generate_seeds();
        if seeds.is_empty() {
            log::info!("no seeds generated, skipping streamline tracing");
            return Ok(Vec::new());
        }
        let (streamlines, _) = self.trace(&seeds)?;
        Ok(streamlines)
    }
}
