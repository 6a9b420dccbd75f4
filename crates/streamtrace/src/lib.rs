//! streamtrace: streamline tracing through volumetric vector and tensor fields.
//!
//! Streamlines are integral curves of a vector field, traced from seed
//! points in both directions. They are the standard way to show flow or
//! fiber orientation in volumetric data such as diffusion tensor images.
//!
//! # Quick Start
//!
//! ```
//! use streamtrace::*;
//!
//! fn main() -> Result<()> {
//!     init();
//!
//!     // A 16x8x8 field flowing along +x
//!     let dims = UVec3::new(16, 8, 8);
//!     let field = VectorField::from_vectors(vec![Vec3::X; 16 * 8 * 8], dims)?;
//!
//!     let tracer = StreamlineTracer::new(&field, TracerOptions::default())?;
//!     let seeds = seeding::slice_grid(&field, Slice::new(Axis::X, 8));
//!     let streamlines = tracer.trace_all(&seeds);
//!     assert_eq!(streamlines.len(), 64);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`VectorField`] owns the samples and answers lookups
//! - [`seeding`] turns a slice, a click or an intensity volume into seeds
//! - [`StreamlineTracer`] integrates from the seeds with a chosen [`IntegrationMethod`]
//! - [`Session`] keeps the interactive state and runs the whole pipeline
//!
//! Field data comes from any [`VolumeSource`]; tensor volumes are reduced
//! to their principal directions on load.

// Documentation lints - error conditions are described on the core types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

mod config;
mod init;
mod session;

pub use config::{Config, SeedingMode};
pub use init::{init, init_with_default_filter};
pub use session::Session;

// Re-export core types
pub use streamtrace_core::{
    error::{Result, StreamtraceError},
    field::{nearest_cell, VectorField},
    integrator::{Euler, IntegrationMethod, Integrator, Midpoint, RungeKutta4},
    options::{Axis, FlipAxes, Slice, ThresholdSeeding, TracerOptions},
    scalar::{ScalarSampler, ScalarVolume},
    seeding,
    streamline::{Point3, Streamline},
    tensor::SymmetricTensor,
    tracer::{Direction, StopReason, StreamlineTracer, TraceStats, TracedPath},
    volume::{RawVolume, VolumeSource},
    IVec3, UVec3, Vec3,
};
