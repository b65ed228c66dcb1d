use precision_analysis::io::{parse_records, PoseRecord};
use precision_analysis::noise::{GaussianNoise, NoiseModel, PerlinDrift};

fn records() -> Vec<PoseRecord> {
    parse_records(
        "0 100.0 200.0 300.0 45.0 30.0 15.0
1 101.0 201.0 301.0 46.0 31.0 16.0
2 102.0 202.0 302.0 47.0 32.0 17.0
3 103.0 203.0 303.0 48.0 33.0 18.0
4 104.0 204.0 304.0 49.0 34.0 19.0
",
    )
}

fn max_shift(a: &[PoseRecord], b: &[PoseRecord]) -> (f64, f64) {
    a.iter().zip(b).fold((0.0f64, 0.0f64), |(dp, da), (x, y)| {
        let p = (x.point.position - y.point.position).amax();
        let r = (x.point.orientation.to_degrees() - y.point.orientation.to_degrees()).amax();
        (dp.max(p), da.max(r))
    })
}

#[test]
fn zero_gaussian_noise_is_identity() {
    let input = records();
    let out = GaussianNoise::new(0.0, 0.0, 0.1, 42).unwrap().apply(&input);
    assert_eq!(out.len(), input.len());
    let (dp, da) = max_shift(&input, &out);
    assert!(dp < 1e-9 && da < 1e-9);
}

#[test]
fn gaussian_noise_is_seeded() {
    let input = records();
    let model = GaussianNoise::new(0.5, 0.05, 0.1, 7).unwrap();
    assert_eq!(model.apply(&input), model.apply(&input));

    let other = GaussianNoise::new(0.5, 0.05, 0.1, 8).unwrap().apply(&input);
    assert_ne!(model.apply(&input), other);
}

#[test]
fn gaussian_noise_keeps_ids_and_moves_points() {
    let input = records();
    let out = GaussianNoise::new(2.0, 0.5, 0.0, 1).unwrap().apply(&input);
    for (a, b) in input.iter().zip(&out) {
        assert_eq!(a.id, b.id);
    }
    let (dp, da) = max_shift(&input, &out);
    assert!(dp > 0.0 && dp < 20.0);
    assert!(da > 0.0 && da < 5.0);
}

#[test]
fn zero_perlin_drift_is_identity() {
    let input = records();
    let drift = PerlinDrift {
        pos_scale: 0.0,
        rot_scale: 0.0,
        ..PerlinDrift::default()
    };
    let (dp, da) = max_shift(&input, &drift.apply(&input));
    assert!(dp < 1e-9 && da < 1e-9);
}

#[test]
fn perlin_drift_is_bounded_by_scale() {
    let input = records();
    let drift = PerlinDrift::default();
    let out = drift.apply(&input);
    assert_eq!(out, drift.apply(&input));
    let (dp, da) = max_shift(&input, &out);
    // |fbm| <= (1.5 + 0.5) * 2 * scale
    assert!(dp <= 4.0 * drift.pos_scale);
    assert!(da <= 4.0 * drift.rot_scale);
    assert!(dp > 0.0);
}
