//! Demo showing the streamtrace pipeline on synthetic data.
//!
//! Traces a swirling vector field from a slice, then a tensor field from a
//! clicked point, and prints a short summary of each batch.
//!
//! Run with `cargo run --example demo`, optionally passing a JSON config
//! path as the first argument.

use streamtrace::*;

/// A vortex around the z axis with a slow upward drift, empty outside a cylinder.
fn vortex_field(n: u32) -> Result<VectorField> {
    let c = (n - 1) as f32 / 2.0;
    let mut data = Vec::with_capacity((n * n * n) as usize);
    for x in 0..n {
        for y in 0..n {
            for _z in 0..n {
                let dx = x as f32 - c;
                let dy = y as f32 - c;
                let r = (dx * dx + dy * dy).sqrt();
                if r > c {
                    data.push(Vec3::ZERO);
                } else {
                    data.push(Vec3::new(-dy, dx, 0.3 * c).normalize_or_zero());
                }
            }
        }
    }
    VectorField::from_vectors(data, UVec3::splat(n))
}

/// Tensors whose principal axis bends from +x towards +y along y.
fn bending_tensors(n: u32) -> Result<RawVolume> {
    let mut data = Vec::new();
    for _x in 0..n {
        for y in 0..n {
            for _z in 0..n {
                let t = y as f32 / (n - 1) as f32 * std::f32::consts::FRAC_PI_2;
                let d = Vec3::new(t.cos(), t.sin(), 0.0);
                // 2 * d d^T + 0.1 * I, stored as xx, yy, zz, xy, xz, yz
                data.extend_from_slice(&[
                    2.0 * d.x * d.x + 0.1,
                    2.0 * d.y * d.y + 0.1,
                    0.1,
                    2.0 * d.x * d.y,
                    0.0,
                    0.0,
                ]);
            }
        }
    }
    RawVolume::tensors(UVec3::splat(n), data)
}

fn summarize(name: &str, streamlines: &[Streamline]) {
    let points: usize = streamlines.iter().map(Streamline::len).sum();
    let longest = streamlines
        .iter()
        .map(Streamline::arc_length)
        .fold(0.0_f32, f32::max);
    println!(
        "{name}: {} streamlines, {points} points, longest arc {longest:.2}",
        streamlines.len()
    );
}

fn main() -> Result<()> {
    init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_path(path)?,
        None => Config::new().with_rng_seed(2024),
    };

    // Slice seeding through the vortex.
    let mut session = Session::new(vortex_field(32)?, config.clone())?;
    session.select_axis(Axis::Z);
    session.set_slice_index(Axis::Z, 4);
    let streamlines = session.generate_streamlines()?;
    summarize("vortex / slice grid", &streamlines);

    // Compare integrators on the same seeds.
    let seeds = seeding::stride_grid(session.field(), UVec3::new(4, 4, 2), 0.01);
    for method in [
        IntegrationMethod::Euler,
        IntegrationMethod::Midpoint,
        IntegrationMethod::RungeKutta4,
    ] {
        session.set_tracer_options(config.tracer.clone().with_method(method))?;
        let (streamlines, stats) = session.trace(&seeds)?;
        println!("{method:?}: {stats:?}");
        summarize("vortex / stride grid", &streamlines);
    }

    // Disk seeding around a click on a tensor-derived field.
    let mut session = Session::load(
        &bending_tensors(24)?,
        config
            .with_seeding(SeedingMode::Disk)
            .with_disk_radius(3.0),
    )?;
    session.select_axis(Axis::Z);
    session.set_click(Some(Vec3::new(6.0, 6.0, 0.0)));
    let streamlines = session.generate_streamlines()?;
    summarize("tensor / disk", &streamlines);

    Ok(())
}
