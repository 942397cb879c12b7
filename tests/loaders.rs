use std::fs;
use std::sync::Arc;

use arrow::array::{Float32Array, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

use rusty_iris::data::loader;
use rusty_iris::model::{Cone, IsoslantModel, LevelDomain, ModelGrid, Primary, StepAnomalyDetector};

const MEASURED: &str = r#"{
  "rgb2sml": {
    "cone-activations": [
      [[0.0, 1.0, 4.0], [0.0, 1.0, 4.0], [0.0, 1.0, 4.0]],
      [[0.0, 1.0, 4.0], [0.0, 1.0, 4.0], [0.0, 1.0, 4.0]],
      [[0.0, 1.0, 4.0], [0.0, 1.0, 4.0], [0.0, 1.0, 4.0]]
    ],
    "levels": [
      [[0, 1, 2], [0, 1, 2], [0, 1, 2]],
      [[0, 1, 2], [0, 1, 2], [0, 1, 2]],
      [[0, 1, 2], [0, 1, 2], [0, 1, 2]]
    ]
  }
}"#;

const RECORD: &str = "\
rgb2lms:
  id: test-display
  display:
    monitor_id: ignored
  dkl: |
    # A₀ [A₀S, A₀M, A₀L]
    0, 0, 0

    # A [ArS, AgS, AbS;
    1, 1, 1
    1, 1, 1
    1, 1, 1

    # ɣ [rˠ, gˠ, bˠ]
    2, 2, 2
";

#[test]
fn measured_container_plus_calibration_record() {
    let dir = TempDir::new().unwrap();
    let container = dir.path().join("measured.json");
    let record = dir.path().join("display.rgb2lms");
    fs::write(&container, MEASURED).unwrap();
    fs::write(&record, RECORD).unwrap();

    let file = loader::load_cone_activations(&container).unwrap();
    assert!(file.coefficients.is_none());
    let coefficients = loader::load_calibration(&record).unwrap();

    let grid = ModelGrid::new(coefficients, LevelDomain::default());
    let cells = grid.pair_with(&file.dataset, &[0.0, 1.0, 2.0]).unwrap();
    let cell = &cells[Cone::M.index() * 3 + Primary::G.index()];
    assert_eq!(cell.label(), "M vs G");
    assert_eq!(cell.curve.response, vec![0.0, 1.0, 4.0]);
    assert_eq!(cell.residuals(grid.domain()).unwrap(), vec![0.0, 0.0, 0.0]);
}

#[test]
fn mismatched_container_shapes_are_rejected() {
    let dir = TempDir::new().unwrap();
    let container = dir.path().join("bad.json");
    fs::write(&container, MEASURED.replacen("[0, 1, 2]", "[0, 1]", 1)).unwrap();

    let err = loader::load_cone_activations(&container).unwrap_err();
    assert!(format!("{err:#}").contains("shape mismatch"));
}

#[test]
fn bare_coefficient_block_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("params.csv");
    fs::write(&path, "0,0,0\n1,2,3\n4,5,6\n7,8,9\n1,1,1\n# trailing\n9,9,9\n").unwrap();

    let c = loader::load_calibration(&path).unwrap();
    assert_eq!(c.gain[0], [1.0, 2.0, 3.0]);
    assert_eq!(c.exponent, [1.0, 1.0, 1.0]);
}

#[test]
fn sine_isoslant_record_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("subject.isoslant");
    fs::write(
        &path,
        "isoslant:\n  id: s1\n  subject: XX\n  dl: 0.2\n  phi: 0.5\n  freq: 2.0\n",
    )
    .unwrap();

    let record = loader::load_isoslant(&path).unwrap().unwrap();
    let model = IsoslantModel::from_record(&record, 0.66);
    assert_eq!(model.name(), "sine");
    assert!((model.evaluate_at(0.25) - 0.66).abs() < 1e-12);

    assert!(loader::load_isoslant(&dir.path().join("absent.isoslant"))
        .unwrap()
        .is_none());
}

#[test]
fn color_series_csv_and_parquet_agree() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("series.csv");
    fs::write(
        &csv_path,
        "angle, r, g, b\n0, 0, 0, 0\n1, 1, 1, 1\n2, 5, 5, 5\n3, 5, 6, 7\n",
    )
    .unwrap();

    // mixed numeric column types
    let schema = Arc::new(Schema::new(vec![
        Field::new("angle", DataType::Int64, false),
        Field::new("r", DataType::Float64, false),
        Field::new("g", DataType::Float32, false),
        Field::new("b", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![0, 1, 2, 3])),
            Arc::new(Float64Array::from(vec![0.0, 1.0, 5.0, 5.0])),
            Arc::new(Float32Array::from(vec![0.0, 1.0, 5.0, 6.0])),
            Arc::new(Float64Array::from(vec![0.0, 1.0, 5.0, 7.0])),
        ],
    )
    .unwrap();
    let pq_path = dir.path().join("series.parquet");
    let mut writer = ArrowWriter::try_new(fs::File::create(&pq_path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let from_csv = loader::load_color_series(&csv_path).unwrap();
    let from_pq = loader::load_color_series(&pq_path).unwrap();
    assert_eq!(from_csv, from_pq);

    let report = StepAnomalyDetector::default().detect(&from_pq);
    assert_eq!(report.indices(), vec![1, 2]);
}

#[test]
fn unsupported_series_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("series.xlsx");
    fs::write(&path, "").unwrap();
    let err = loader::load_color_series(&path).unwrap_err();
    assert!(err.to_string().contains("Unsupported file extension"));
}

#[test]
fn isoslant_samples_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("samples.csv");
    fs::write(&path, "0.0,0.70\n3.0,0.62\n").unwrap();
    let samples = loader::load_isoslant_samples(&path).unwrap();
    assert_eq!(samples, vec![[0.0, 0.70], [3.0, 0.62]]);
}
