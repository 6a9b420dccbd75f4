//! Core engine for streamtrace.
//!
//! This crate provides the sampling and tracing machinery:
//! - [`VectorField`] with exact and trilinear lookups, bounds tests and a validity mask
//! - [`Integrator`] schemes (Euler, midpoint, fourth-order Runge-Kutta)
//! - Seed generators in [`seeding`]
//! - [`StreamlineTracer`] for single and parallel batch tracing
//! - Option structs shared by all of the above

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Grid coordinates are converted to f32 positions throughout
#![allow(clippy::cast_precision_loss)]
// Types like StreamlineTracer and TracerOptions read better with the prefix
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod field;
pub mod integrator;
pub mod options;
pub mod scalar;
pub mod seeding;
pub mod streamline;
pub mod tensor;
pub mod tracer;
pub mod volume;

pub use error::{Result, StreamtraceError};
pub use field::{nearest_cell, VectorField};
pub use integrator::{Euler, IntegrationMethod, Integrator, Midpoint, RungeKutta4};
pub use options::{Axis, FlipAxes, Slice, ThresholdSeeding, TracerOptions};
pub use scalar::{ScalarSampler, ScalarVolume};
pub use streamline::{Point3, Streamline};
pub use tensor::SymmetricTensor;
pub use tracer::{Direction, StopReason, StreamlineTracer, TraceStats, TracedPath};
pub use volume::{RawVolume, VolumeSource};

// Re-export glam types for convenience
pub use glam::{IVec3, UVec3, Vec3};
