use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::records::{CalibrationFile, ContainerFile, IsoslantFile};
use crate::model::{
    CalibrationCoefficients, ColorSample, ConeActivationDataset, IsoslantRecord,
};

// ---------------------------------------------------------------------------
// Cone-activation container
// ---------------------------------------------------------------------------

/// Measured cone activations and, when the container carries them, the
/// pre-fitted coefficients.
#[derive(Debug, Clone)]
pub struct ConeActivationFile {
    pub dataset: ConeActivationDataset,
    pub coefficients: Option<CalibrationCoefficients>,
}

/// Load the JSON container with the `rgb2sml` group.
pub fn load_cone_activations(path: &Path) -> Result<ConeActivationFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading container {}", path.display()))?;
    parse_cone_activations(&text).with_context(|| format!("in {}", path.display()))
}

pub fn parse_cone_activations(text: &str) -> Result<ConeActivationFile> {
    let root: ContainerFile = serde_json::from_str(text).context("parsing container JSON")?;
    let group = root.rgb2sml;

    let dataset = group.dataset().context("rgb2sml: measured arrays")?;
    let coefficients = group
        .coefficients()
        .transpose()
        .context("rgb2sml: Azero / A / gamma")?;

    log::info!(
        "Loaded 3x3x{} cone activations ({} coefficients)",
        dataset.samples_per_cell(),
        if coefficients.is_some() { "with" } else { "without" }
    );
    Ok(ConeActivationFile {
        dataset,
        coefficients,
    })
}

// ---------------------------------------------------------------------------
// Calibration record
// ---------------------------------------------------------------------------

/// Load pre-fitted coefficients. Dispatch by extension.
///
/// Supported formats:
/// * `.yaml` / `.yml` / `.rgb2lms` – record with an `rgb2lms` map
/// * `.csv` / `.txt` – the bare 5 × 3 coefficient block
pub fn load_calibration(path: &Path) -> Result<CalibrationCoefficients> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading calibration {}", path.display()))?;

    let ext = extension(path);
    let result = match ext.as_str() {
        "yaml" | "yml" | "rgb2lms" => parse_calibration_yaml(&text),
        "csv" | "txt" => parse_calibration_block(&text),
        other => bail!("Unsupported calibration extension: .{other}"),
    };
    result.with_context(|| format!("in {}", path.display()))
}

pub fn parse_calibration_yaml(text: &str) -> Result<CalibrationCoefficients> {
    let file: CalibrationFile = serde_yaml::from_str(text).context("parsing calibration YAML")?;
    let record = file.rgb2lms;

    if let Some(named) = &record.coefficients {
        if record.dkl.is_some() {
            log::warn!("rgb2lms: both 'coefficients' and 'dkl' present, using 'coefficients'");
        }
        return named.to_coefficients().context("rgb2lms.coefficients");
    }
    match &record.dkl {
        Some(block) => parse_calibration_block(block).context("rgb2lms.dkl"),
        None => bail!("rgb2lms record has neither 'coefficients' nor 'dkl'"),
    }
}

pub fn parse_calibration_block(text: &str) -> Result<CalibrationCoefficients> {
    let parsed = CalibrationCoefficients::parse_text_block(text)?;
    if parsed.trailing_rows > 0 {
        log::warn!(
            "ignoring {} extra row(s) after calibration data",
            parsed.trailing_rows
        );
    }
    Ok(parsed.coefficients)
}

// ---------------------------------------------------------------------------
// Isoslant record and samples
// ---------------------------------------------------------------------------

/// `Ok(None)` when the file or its `isoslant` entry is absent.
pub fn load_isoslant(path: &Path) -> Result<Option<IsoslantRecord>> {
    if !path.exists() {
        log::info!("No isoslant record at {}, skipping", path.display());
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading isoslant {}", path.display()))?;
    parse_isoslant_yaml(&text).with_context(|| format!("in {}", path.display()))
}

pub fn parse_isoslant_yaml(text: &str) -> Result<Option<IsoslantRecord>> {
    let file: IsoslantFile = serde_yaml::from_str(text).context("parsing isoslant YAML")?;
    Ok(file.isoslant.as_ref().map(IsoslantRecord::from))
}

/// Two-column `stimulus, response` table. `#` comment lines are skipped, as
/// is a leading header row whose fields are both non-numeric.
pub fn load_isoslant_samples(path: &Path) -> Result<Vec<[f64; 2]>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening isoslant samples {}", path.display()))?;
    read_isoslant_samples(file).with_context(|| format!("in {}", path.display()))
}

pub fn read_isoslant_samples<R: Read>(reader: R) -> Result<Vec<[f64; 2]>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut samples = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != 2 {
            bail!("CSV row {row_no}: expected 2 fields, got {}", record.len());
        }
        let first = record.get(0).unwrap_or("");
        let second = record.get(1).unwrap_or("");
        // header only when neither field is numeric
        if row_no == 0 && first.parse::<f64>().is_err() && second.parse::<f64>().is_err() {
            continue;
        }
        samples.push([
            parse_field(first, row_no, "stimulus")?,
            parse_field(second, row_no, "response")?,
        ]);
    }
    Ok(samples)
}

// ---------------------------------------------------------------------------
// Colour series
// ---------------------------------------------------------------------------

/// Load a sequential colour series. Dispatch by extension.
///
/// Supported formats:
/// * `.csv` – header row, then `angle, r, g, b`
/// * `.parquet` – numeric columns `angle` (or `x`), `r`, `g`, `b`
pub fn load_color_series(path: &Path) -> Result<Vec<ColorSample>> {
    let ext = extension(path);
    let series = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV {}", path.display()))?;
            read_color_series_csv(file)
        }
        "parquet" | "pq" => load_color_series_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("in {}", path.display()))?;

    log::info!("Loaded colour series with {} rows", series.len());
    Ok(series)
}

/// CSV layout: a header row, then `angle, r, g, b` per row. Columns are
/// looked up by name when the header names them, positionally otherwise.
pub fn read_color_series_csv<R: Read>(reader: R) -> Result<Vec<ColorSample>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();
    let columns = series_columns(&headers);

    let mut series = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let mut values = [0.0; 4];
        for (slot, (&idx, name)) in columns.iter().zip(SERIES_FIELDS).enumerate() {
            let text = record
                .get(idx)
                .with_context(|| format!("CSV row {row_no}: missing '{name}' column"))?;
            values[slot] = parse_field(text, row_no, name)?;
        }
        series.push(ColorSample::new(values[0], values[1], values[2], values[3]));
    }
    Ok(series)
}

const SERIES_FIELDS: [&str; 4] = ["angle", "r", "g", "b"];

fn series_columns(headers: &[String]) -> [usize; 4] {
    let find = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));
    match (
        find(&["angle", "x"]),
        find(&["r"]),
        find(&["g"]),
        find(&["b"]),
    ) {
        (Some(x), Some(r), Some(g), Some(b)) => [x, r, g, b],
        _ => [0, 1, 2, 3],
    }
}

fn load_color_series_parquet(path: &Path) -> Result<Vec<ColorSample>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut series = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let x_idx = schema
            .index_of("angle")
            .or_else(|_| schema.index_of("x"))
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'angle' column"))?;
        let mut idx = [x_idx, 0, 0, 0];
        for (slot, name) in ["r", "g", "b"].iter().enumerate() {
            idx[slot + 1] = schema
                .index_of(name)
                .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
        }

        for row in 0..batch.num_rows() {
            let mut values = [0.0; 4];
            for (slot, &col_idx) in idx.iter().enumerate() {
                values[slot] = extract_f64(batch.column(col_idx), row)
                    .with_context(|| format!("Row {row}: failed to read '{}'", SERIES_FIELDS[slot]))?;
            }
            series.push(ColorSample::new(values[0], values[1], values[2], values[3]));
        }
    }

    Ok(series)
}

// -- helpers --

/// Extract a single numeric cell as `f64`. Nulls are an error.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in numeric column");
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(row)),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(row) as f64),
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| a.value(row) as f64),
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    value.context("column type does not match its array")
}

fn parse_field(text: &str, row: usize, col: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .with_context(|| format!("Row {row}, {col}: '{text}' is not a number"))
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}
