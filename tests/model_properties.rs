use std::f64::consts::{FRAC_PI_2, PI};

use rusty_iris::model::{
    CalibrationCoefficients, ColorSample, ConeActivationModel, IsoslantModel, IsoslantRecord,
    LevelDomain, ModelError, ModelGrid, StepAnomalyDetector,
};

fn gains() -> Vec<Vec<f64>> {
    vec![
        vec![5e-5, 1e-5, 1e-5],
        vec![2e-5, 4e-5, 1e-6],
        vec![1e-5, 3e-5, 2e-6],
    ]
}

#[test]
fn zero_level_returns_offset_exactly() {
    for exponent in [0.5, 1.0, 2.2, 3.7] {
        let m = ConeActivationModel::new(0.0134, 7.5, exponent);
        assert_eq!(m.evaluate(&[0.0], &LevelDomain::default()).unwrap(), vec![0.0134]);
    }
}

#[test]
fn grid_over_eight_bit_domain() {
    let grid = ModelGrid::from_slices(
        &[0.01, 0.02, 0.03],
        &gains(),
        &[2.2, 2.1, 2.0],
        LevelDomain::default(),
    )
    .unwrap();
    let xev: Vec<f64> = (0..255).map(f64::from).collect();
    let curves = grid.evaluate(&xev).unwrap();

    assert_eq!(curves.len(), 9);
    for curve in &curves {
        assert_eq!(curve.response.len(), 255);
        assert_eq!(curve.response[0], curve.model.offset);
        assert!(curve.response.windows(2).all(|w| w[0] <= w[1]), "{}", curve.label());
    }
}

#[test]
fn narrow_coefficients_raise_shape_mismatch() {
    let narrow: Vec<Vec<f64>> = gains().into_iter().map(|r| r[..2].to_vec()).collect();
    let err = CalibrationCoefficients::from_slices(&[0.0; 3], &narrow, &[1.0; 3]).unwrap_err();
    assert!(matches!(err, ModelError::ShapeMismatch { .. }));
    assert!(err.to_string().contains("gain"));
}

#[test]
fn cosine_isoslant_reference_curve() {
    let record = IsoslantRecord {
        amplitude: 0.333,
        phase: 1.57,
        frequency: None,
    };
    let model = IsoslantModel::from_record(&record, 0.667);
    assert_eq!(model.evaluate_at(1.57), 0.667 + 0.333);

    let y = model.evaluate(&[0.0, FRAC_PI_2, PI]);
    for (got, want) in y.iter().zip([0.667, 1.000, 0.667]) {
        assert!((got - want).abs() < 1e-3, "{got} vs {want}");
    }
    for (x, got) in [0.0, FRAC_PI_2, PI].iter().zip(&y) {
        let exact = 0.667 + 0.333 * (x - 1.57).cos();
        assert!((got - exact).abs() < 1e-12);
    }
}

#[test]
fn anomaly_reference_series() {
    let series = [
        ColorSample::new(0.0, 0.0, 0.0, 0.0),
        ColorSample::new(1.0, 1.0, 1.0, 1.0),
        ColorSample::new(2.0, 5.0, 5.0, 5.0),
        ColorSample::new(3.0, 5.0, 6.0, 7.0),
    ];
    let report = StepAnomalyDetector::default().detect(&series);
    assert_eq!(report.len(), 2);
    assert_eq!(report.indices(), vec![1, 2]);
    let deltas: Vec<f64> = report.flagged.iter().map(|f| f.delta).collect();
    assert_eq!(deltas, vec![1.0, 4.0]);
}

#[test]
fn anomaly_on_short_series() {
    let detector = StepAnomalyDetector::default();
    assert!(detector.detect(&[]).is_empty());
    assert!(detector
        .detect(&[ColorSample::new(0.0, 0.2, 0.4, 0.6)])
        .is_empty());
}

#[test]
fn calibration_block_feeds_the_grid() {
    let c = CalibrationCoefficients {
        offset: [0.1, 0.2, 0.3],
        gain: [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]],
        exponent: [1.0, 1.0, 1.0],
    };
    let parsed = CalibrationCoefficients::parse_text_block(&c.to_text_block()).unwrap();
    let grid = ModelGrid::new(parsed.coefficients, LevelDomain::default());
    let curves = grid.evaluate(&[2.0]).unwrap();
    // L vs B: 0.3 + 9 * 2
    assert_eq!(curves[8].response, vec![0.3 + 18.0]);
}
