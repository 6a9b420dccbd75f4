//! End-to-end tests for streamtrace: load, seed and trace.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use streamtrace::*;

fn uniform_field(dims: UVec3, v: Vec3) -> VectorField {
    let n = (dims.x * dims.y * dims.z) as usize;
    VectorField::from_vectors(vec![v; n], dims).unwrap()
}

/// Field that is +z inside a ball around `center` and empty outside.
fn ball_field(dims: UVec3, center: Vec3, radius: f32) -> VectorField {
    let mut data = Vec::new();
    for x in 0..dims.x {
        for y in 0..dims.y {
            for z in 0..dims.z {
                let cell = UVec3::new(x, y, z).as_vec3();
                data.push(if cell.distance(center) <= radius { Vec3::Z } else { Vec3::ZERO });
            }
        }
    }
    VectorField::from_vectors(data, dims).unwrap()
}

/// 4x4x4 field whose only non-zero cell is (2,2,2) = +x.
fn single_cell_field() -> VectorField {
    let mut data = vec![0.0; 4 * 4 * 4 * 3];
    data[((2 * 4 + 2) * 4 + 2) * 3] = 1.0;
    VectorField::from_components(&data, UVec3::splat(4)).unwrap()
}

#[test]
fn test_single_cell_pipeline() {
    init();
    let field = single_cell_field();
    assert_eq!(field.num_valid_cells(), 1);

    let seeds = seeding::slice_grid(&field, Slice::new(Axis::Z, 2));
    assert_eq!(seeds, vec![Vec3::new(2.0, 2.0, 2.0)]);

    let options = TracerOptions::new()
        .with_method(IntegrationMethod::Euler)
        .with_step_size(1.0)
        .with_max_steps(5);
    let tracer = StreamlineTracer::new(&field, options).unwrap();

    let forward = tracer.trace_path(seeds[0], Direction::Forward);
    assert!(forward.points.is_empty());
    assert_eq!(forward.stop, StopReason::Mask);
    assert_eq!(tracer.trace_streamline(seeds[0]).points(), seeds.as_slice());
    assert!(tracer.trace_all(&seeds).is_empty());
}

#[test]
fn test_tensor_session_pipeline() {
    init();
    // Principal axis along +z everywhere except one empty voxel.
    let dims = UVec3::new(6, 6, 12);
    let mut data = Vec::new();
    for i in 0..dims.x * dims.y * dims.z {
        if i == 0 {
            data.extend_from_slice(&[0.0; 6]);
        } else {
            data.extend_from_slice(&[0.2, 0.3, 3.0, 0.0, 0.0, 0.0]);
        }
    }
    let volume = RawVolume::tensors(dims, data).unwrap();

    let config = Config::new().with_rng_seed(1);
    let mut session = Session::load(&volume, config).unwrap();
    assert_eq!(session.field().num_valid_cells(), 6 * 6 * 12 - 1);

    session.select_axis(Axis::Z);
    session.set_slice_index(Axis::Z, 6);
    let streamlines = session.generate_streamlines().unwrap();
    assert_eq!(streamlines.len(), 36);
    for line in &streamlines {
        let (lo, hi) = line.bounding_box().unwrap();
        // Eigenvector sign is arbitrary, but the line stays on its column.
        assert!((hi.x - lo.x).abs() < 1e-4);
        assert!((hi.y - lo.y).abs() < 1e-4);
        assert!(hi.z - lo.z > 10.0);
    }
}

#[test]
fn test_load_failure() {
    let source = || -> Result<RawVolume> { Err(StreamtraceError::LoadError("truncated".into())) };
    assert!(Session::load(&source, Config::new()).is_err());
}

#[test]
fn test_flip_reverses_streamline() {
    let field = uniform_field(UVec3::new(12, 3, 3), Vec3::X);
    let seed = Vec3::new(3.0, 1.0, 1.0);
    let options = TracerOptions::new()
        .with_method(IntegrationMethod::Euler)
        .with_step_size(1.0)
        .with_max_steps(4);

    let plain = StreamlineTracer::new(&field, options.clone())
        .unwrap()
        .trace_streamline(seed);

    let flipped_field = field.with_flip(FlipAxes::new(true, false, false));
    let flipped = StreamlineTracer::new(&flipped_field, options)
        .unwrap()
        .trace_streamline(seed);

    let mut reversed = flipped.into_points();
    reversed.reverse();
    assert_eq!(plain.points(), reversed.as_slice());
}

#[test]
fn test_threshold_with_scalar_volume() {
    let dims = UVec3::splat(8);
    let field = uniform_field(dims, Vec3::Y);
    // Bright only in the upper half along x.
    let mut intensity = Vec::new();
    for x in 0..8 {
        for _ in 0..64 {
            intensity.push(if x >= 4 { 0.5 } else { 0.0 });
        }
    }
    let volume = ScalarVolume::new(intensity, dims).unwrap();

    let mut rng = StdRng::seed_from_u64(4);
    let params = ThresholdSeeding::new().with_jitter_copies(0);
    let seeds = seeding::threshold(&field, &volume, &params, 1.0, 0.01, &mut rng);

    // Stride 2 hits x = 4 and x = 6, each with a 4x4 lattice.
    assert_eq!(seeds.len(), 32);
    assert!(seeds.iter().all(|p| p.x >= 4.0));
}

#[test]
fn test_batch_stats() {
    let field = uniform_field(UVec3::new(10, 5, 5), Vec3::X);
    let tracer = StreamlineTracer::new(&field, TracerOptions::new().with_num_threads(3)).unwrap();
    let mut seeds = seeding::slice_grid(&field, Slice::new(Axis::X, 5));
    seeds.push(Vec3::new(-3.0, 0.0, 0.0));

    let (lines, stats) = tracer.trace_all_with_stats(&seeds);
    assert_eq!(stats.seeds, 26);
    assert_eq!(stats.kept, 25);
    assert_eq!(stats.discarded, 1);
    assert_eq!(stats.points, lines.iter().map(Streamline::len).sum::<usize>());
}

proptest! {
    #[test]
    fn prop_streamline_is_concatenation(
        x in 0.0f32..15.0,
        y in 0.0f32..5.0,
        z in 0.0f32..5.0,
        max_steps in 0usize..40,
    ) {
        let field = uniform_field(UVec3::new(16, 6, 6), Vec3::new(1.0, 0.3, -0.2));
        let options = TracerOptions::new().with_max_steps(max_steps);
        let tracer = StreamlineTracer::new(&field, options).unwrap();
        let seed = Vec3::new(x, y, z);

        let mut expected: Vec<Vec3> = tracer
            .trace_direction(seed, Direction::Backward)
            .into_iter()
            .rev()
            .collect();
        expected.push(seed);
        expected.extend(tracer.trace_direction(seed, Direction::Forward));

        prop_assert_eq!(tracer.trace_streamline(seed).into_points(), expected);
    }

    #[test]
    fn prop_directional_budget(
        step in 0.1f32..2.0,
        max_steps in 1usize..30,
        max_length in 0.5f32..20.0,
    ) {
        let field = uniform_field(UVec3::new(64, 4, 4), Vec3::X);
        let options = TracerOptions::new()
            .with_step_size(step)
            .with_max_steps(max_steps)
            .with_max_length(max_length);
        let tracer = StreamlineTracer::new(&field, options).unwrap();
        let seed = Vec3::new(32.0, 1.5, 1.5);

        for direction in [Direction::Forward, Direction::Backward] {
            let path = tracer.trace_direction(seed, direction);
            prop_assert!(path.len() <= max_steps);
            let mut arc = 0.0;
            let mut previous = seed;
            for p in &path {
                arc += previous.distance(*p);
                previous = *p;
            }
            prop_assert!(arc <= max_length * (1.0 + 1e-4));
        }
    }

    #[test]
    fn prop_disk_seeds_stay_on_valid_cells(
        cx in 6u32..14,
        cy in 6u32..14,
        field_radius in 2.0f32..4.0,
        seed in any::<u64>(),
    ) {
        // Valid cells only inside a ball, so the draw ball overhangs empty cells.
        let center = Vec3::new(cx as f32, cy as f32, 10.0);
        let field = ball_field(UVec3::splat(20), center, field_radius);
        let radius = 2.0 * field_radius;
        let mut rng = StdRng::seed_from_u64(seed);
        let seeds = seeding::disk(&field, Slice::new(Axis::Z, 10), center, radius, 50.0, &mut rng);
        prop_assert!(seeds.len() < seeding::disk_budget(radius, 50.0));
        for p in seeds {
            prop_assert!(p.distance(center) <= radius + 1e-3);
            prop_assert!(field.is_valid_position(p));
            prop_assert!(nearest_cell(p).as_vec3().distance(center) <= field_radius + 1e-4);
        }
    }
}
