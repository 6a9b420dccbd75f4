//! Streamline tracing through a vector field.
//!
//! A streamline grows from a seed in both directions. Each direction runs a
//! small state machine: every candidate step is checked against the
//! validity mask, then for a stall, then against the turning-angle limit,
//! and the loop ends when the step or arc-length budget is spent.
//!
//! Batch tracing fans seeds out over rayon workers. Each worker keeps a
//! private list of streamlines and the lists are merged in one reduction,
//! so output order is unrelated to seed order.

use glam::Vec3;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::Result;
use crate::field::VectorField;
use crate::integrator::Integrator;
use crate::options::TracerOptions;
use crate::streamline::Streamline;

/// Relative slack on `max_length` so float accumulation does not drop the
/// last step that fits exactly.
const LENGTH_TOLERANCE: f32 = 1e-6;

/// Direction of integration relative to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Along the field.
    Forward,
    /// Against the field.
    Backward,
}

impl Direction {
    /// Returns `1.0` for forward and `-1.0` for backward.
    pub fn sign(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}

/// Why a single-direction trace ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The seed is out of bounds or on an invalid cell.
    InvalidSeed,
    /// The next step would leave the grid or land on an invalid cell.
    Mask,
    /// The integrator returned the current position.
    Stall,
    /// The path turned more sharply than the angle limit.
    Angle,
    /// The step count or arc-length budget is spent.
    Budget,
}

/// A one-directional path, excluding the seed.
#[derive(Debug, Clone, PartialEq)]
pub struct TracedPath {
    pub points: Vec<Vec3>,
    pub stop: StopReason,
}

/// Counters collected during batch tracing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceStats {
    /// Seeds submitted.
    pub seeds: usize,
    /// Streamlines returned.
    pub kept: usize,
    /// Streamlines dropped as degenerate.
    pub discarded: usize,
    /// Points across all returned streamlines.
    pub points: usize,
}

impl TraceStats {
    fn merge(self, other: Self) -> Self {
        Self {
            seeds: self.seeds + other.seeds,
            kept: self.kept + other.kept,
            discarded: self.discarded + other.discarded,
            points: self.points + other.points,
        }
    }
}

/// Traces streamlines through a borrowed vector field.
///
/// The tracer never mutates the field, so single traces can run from any
/// number of threads at once.
#[derive(Debug)]
pub struct StreamlineTracer<'a> {
    field: &'a VectorField,
    options: TracerOptions,
    pool: Option<ThreadPool>,
}

impl<'a> StreamlineTracer<'a> {
    /// Creates a tracer, validating the options.
    ///
    /// When `options.num_threads` is set a dedicated worker pool of that
    /// size is started for batch tracing.
    pub fn new(field: &'a VectorField, options: TracerOptions) -> Result<Self> {
        options.validate()?;
        let pool = build_pool(&options)?;
        Ok(Self {
            field,
            options,
            pool,
        })
    }

    /// Returns the traced field.
    pub fn field(&self) -> &'a VectorField {
        self.field
    }

    /// Returns the active options.
    pub fn options(&self) -> &TracerOptions {
        &self.options
    }

    /// Replaces the options. On error the previous options stay active.
    pub fn set_options(&mut self, options: TracerOptions) -> Result<()> {
        options.validate()?;
        let pool = if options.num_threads == self.options.num_threads {
            self.pool.take()
        } else {
            build_pool(&options)?
        };
        self.options = options;
        self.pool = pool;
        Ok(())
    }

    /// Traces one direction from `seed`; the seed itself is not included.
    pub fn trace_direction(&self, seed: Vec3, direction: Direction) -> Vec<Vec3> {
        self.trace_path(seed, direction).points
    }

    /// Traces one direction and reports why it stopped.
    pub fn trace_path(&self, seed: Vec3, direction: Direction) -> TracedPath {
        if !self.field.is_valid_position(seed) {
            log::debug!("seed {seed} is out of bounds or on an invalid cell");
            return TracedPath {
                points: Vec::new(),
                stop: StopReason::InvalidSeed,
            };
        }

        let opts = &self.options;
        let step = direction.sign() * opts.step_size;
        let length_limit = opts.max_length * (1.0 + LENGTH_TOLERANCE);

        let mut points = Vec::new();
        let mut current = seed;
        let mut previous_dir: Option<Vec3> = None;

        let stop = loop {
            let taken = points.len();
            if taken >= opts.max_steps || (taken + 1) as f32 * opts.step_size > length_limit {
                break StopReason::Budget;
            }

            let next = opts.method.step(self.field, current, step);
            if !self.field.is_valid_position(next) || !self.field.is_valid_position(current) {
                break StopReason::Mask;
            }
            if next == current {
                break StopReason::Stall;
            }

            let dir = (next - current).normalize();
            if let Some(prev) = previous_dir {
                let angle = prev.dot(dir).clamp(-1.0, 1.0).acos();
                if angle > opts.max_angle {
                    break StopReason::Angle;
                }
            }

            points.push(next);
            previous_dir = Some(dir);
            current = next;
        };

        TracedPath { points, stop }
    }

    /// Traces a full streamline through `seed`.
    ///
    /// The result is the reversed backward path, the seed, then the forward
    /// path. An invalid seed yields an empty streamline.
    pub fn trace_streamline(&self, seed: Vec3) -> Streamline {
        if !self.field.is_valid_position(seed) {
            return Streamline::default();
        }

        let backward = self.trace_direction(seed, Direction::Backward);
        let forward = self.trace_direction(seed, Direction::Forward);

        let mut points = Vec::with_capacity(backward.len() + 1 + forward.len());
        points.extend(backward.into_iter().rev());
        points.push(seed);
        points.extend(forward);
        Streamline::new(points)
    }

    /// Traces every seed in parallel, dropping degenerate streamlines.
    pub fn trace_all(&self, seeds: &[Vec3]) -> Vec<Streamline> {
        self.trace_all_with_stats(seeds).0
    }

    /// Like [`trace_all`](Self::trace_all), also returning batch counters.
    pub fn trace_all_with_stats(&self, seeds: &[Vec3]) -> (Vec<Streamline>, TraceStats) {
        let run = || {
            seeds
                .par_iter()
                .fold(
                    || (Vec::new(), TraceStats::default()),
                    |(mut lines, mut stats), seed| {
                        stats.seeds += 1;
                        let line = self.trace_streamline(*seed);
                        if line.is_degenerate() {
                            stats.discarded += 1;
                        } else {
                            stats.kept += 1;
                            stats.points += line.len();
                            lines.push(line);
                        }
                        (lines, stats)
                    },
                )
                .reduce(
                    || (Vec::new(), TraceStats::default()),
                    |(mut lines, stats), (other, other_stats)| {
                        lines.extend(other);
                        (lines, stats.merge(other_stats))
                    },
                )
        };

        let (lines, stats) = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };

        log::info!(
            "traced {} seeds: {} streamlines kept, {} discarded, {} points",
            stats.seeds,
            stats.kept,
            stats.discarded,
            stats.points
        );
        (lines, stats)
    }
}

/// Builds the dedicated worker pool requested by `options.num_threads`, if any.
///
/// Callers that trace repeatedly can keep the pool and run
/// [`StreamlineTracer::trace_all`] inside [`ThreadPool::install`].
pub fn build_pool(options: &TracerOptions) -> Result<Option<ThreadPool>> {
    let Some(threads) = options.num_threads else {
        return Ok(None);
    };
    let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
    log::debug!("started tracing pool with {threads} threads");
    Ok(Some(pool))
}
