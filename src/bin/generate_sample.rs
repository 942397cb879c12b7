use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use rusty_iris::data::records::{
    CalibrationFile, CalibrationRecord, ConeActivationGroup, ContainerFile, IsoslantEntry,
    IsoslantFile, LevelArray,
};
use rusty_iris::model::{
    CalibrationCoefficients, ColorSample, IsoslantModel, IsoslantRecord, ModelGrid,
};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn sample_coefficients() -> CalibrationCoefficients {
    CalibrationCoefficients {
        offset: [0.0021, 0.0134, 0.0152],
        gain: [
            [2.1e-7, 6.3e-7, 6.8e-6],
            [1.9e-6, 5.2e-6, 8.1e-7],
            [3.3e-6, 4.7e-6, 5.9e-7],
        ],
        exponent: [2.21, 2.17, 2.05],
    }
}

/// Noisy measurements at every 15th level, drawn from the sample model.
fn cone_activation_group(
    coefficients: &CalibrationCoefficients,
    rng: &mut SimpleRng,
    with_coefficients: bool,
) -> ConeActivationGroup {
    let levels: Vec<f64> = (0..=17).map(|i| (i * 15) as f64).collect();
    let mut activations = vec![vec![Vec::new(); 3]; 3];
    for (cone, primary) in ModelGrid::pairs() {
        let model = coefficients.model(cone, primary);
        activations[cone.index()][primary.index()] = levels
            .iter()
            .map(|&l| {
                let y = model.evaluate_at(l);
                y + rng.gauss(0.0, 0.01 * y.abs() + 1e-4)
            })
            .collect();
    }

    let (azero, a, gamma) = if with_coefficients {
        (
            Some(coefficients.offset.to_vec()),
            Some(coefficients.gain.iter().map(|r| r.to_vec()).collect()),
            Some(coefficients.exponent.to_vec()),
        )
    } else {
        (None, None, None)
    };

    ConeActivationGroup {
        cone_activations: activations,
        levels: LevelArray::Nested(vec![vec![levels; 3]; 3]),
        azero,
        a,
        gamma,
    }
}

/// Channel values of a hue sweep, quantised to 1/256 steps so that sums
/// and differences stay exact.
fn hue_rgb(angle: f64) -> [f64; 3] {
    [0.0, 2.094, 4.189].map(|shift| ((0.5 + 0.25 * (angle - shift).cos()) * 256.0).round() / 256.0)
}

/// A quantised hue sweep in which every 12th row steps straight along the
/// grey axis instead of following the circle.
fn color_series() -> Vec<ColorSample> {
    let n = 72;
    let angle = |i: usize| std::f64::consts::TAU * i as f64 / n as f64;
    (0..n)
        .map(|i| {
            let [r, g, b] = if i % 12 == 11 {
                hue_rgb(angle(i - 1)).map(|v| v + 4.0 / 256.0)
            } else {
                hue_rgb(angle(i))
            };
            ColorSample::new(angle(i), r, g, b)
        })
        .collect()
}

fn write_color_series_csv(path: &Path, series: &[ColorSample]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(["angle", "r", "g", "b"])?;
    for s in series {
        writer.write_record([s.x, s.r, s.g, s.b].map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_color_series_parquet(path: &Path, series: &[ColorSample]) -> Result<()> {
    let column = |f: fn(&ColorSample) -> f64| Float64Array::from(series.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("angle", DataType::Float64, false),
        Field::new("r", DataType::Float64, false),
        Field::new("g", DataType::Float64, false),
        Field::new("b", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(column(|s| s.x)),
            Arc::new(column(|s| s.r)),
            Arc::new(column(|s| s.g)),
            Arc::new(column(|s| s.b)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

fn write_yaml<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_yaml::to_string(value)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let coefficients = sample_coefficients();

    // Single container with coefficient sub-groups
    write_json(
        &out_dir.join("cone_activations.json"),
        &ContainerFile {
            rgb2sml: cone_activation_group(&coefficients, &mut rng, true),
        },
    )?;

    // Measured-only container plus a separate calibration record
    write_json(
        &out_dir.join("cone_activations_measured.json"),
        &ContainerFile {
            rgb2sml: cone_activation_group(&coefficients, &mut rng, false),
        },
    )?;
    write_yaml(
        &out_dir.join("display.rgb2lms"),
        &CalibrationFile {
            rgb2lms: CalibrationRecord {
                id: Some("sample-display".into()),
                gray_level: Some(0.66),
                dataset: Some("cone_activations_measured.json".into()),
                dkl: Some(coefficients.to_text_block()),
                coefficients: None,
            },
        },
    )?;

    // Isoslant record and noisy samples around it
    let entry = IsoslantEntry {
        id: Some("sample-subject".into()),
        subject: Some("XX".into()),
        dl: 0.0333,
        phi: 1.57,
        freq: None,
    };
    let model = IsoslantModel::from_record(&IsoslantRecord::from(&entry), 0.66);
    write_yaml(
        &out_dir.join("subject.isoslant"),
        &IsoslantFile {
            isoslant: Some(entry),
        },
    )?;

    let mut samples = csv::Writer::from_path(out_dir.join("isoslant_samples.csv"))
        .context("creating isoslant samples CSV")?;
    samples.write_record(["stimulus", "response"])?;
    for i in 0..16 {
        let x = std::f64::consts::TAU * i as f64 / 16.0;
        for _ in 0..3 {
            let y = model.evaluate_at(x) + rng.gauss(0.0, 0.01);
            samples.write_record([x.to_string(), y.to_string()])?;
        }
    }
    samples.flush()?;

    // Colour series
    let series = color_series();
    write_color_series_csv(&out_dir.join("color_series.csv"), &series)?;
    write_color_series_parquet(&out_dir.join("color_series.parquet"), &series)?;

    println!("Wrote sample inputs to {}", out_dir.display());
    Ok(())
}
