use std::path::Path;

use anyhow::{Context, Result};

use rusty_iris::data::loader;
use rusty_iris::model::{
    AnomalyReport, CalibrationCoefficients, ColorSample, ConeActivationDataset, GridCell,
    IsoslantModel, IsoslantRecord, ModelGrid, ModelResult, StepAnomalyDetector,
};
use rusty_iris::settings::Settings;

// ---------------------------------------------------------------------------
// Inputs and views
// ---------------------------------------------------------------------------

/// The kinds of file the viewer can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    ConeActivations,
    Calibration,
    Isoslant,
    IsoslantSamples,
    ColorSeries,
}

impl InputKind {
    pub const ALL: [InputKind; 5] = [
        InputKind::ConeActivations,
        InputKind::Calibration,
        InputKind::Isoslant,
        InputKind::IsoslantSamples,
        InputKind::ColorSeries,
    ];

    pub fn title(self) -> &'static str {
        match self {
            InputKind::ConeActivations => "Cone activations…",
            InputKind::Calibration => "Calibration record…",
            InputKind::Isoslant => "Isoslant record…",
            InputKind::IsoslantSamples => "Isoslant samples…",
            InputKind::ColorSeries => "Colour series…",
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            InputKind::ConeActivations => &["json"],
            InputKind::Calibration => &["yaml", "yml", "rgb2lms", "csv", "txt"],
            InputKind::Isoslant => &["yaml", "yml", "isoslant"],
            InputKind::IsoslantSamples => &["csv"],
            InputKind::ColorSeries => &["csv", "parquet", "pq"],
        }
    }
}

/// Which plot fills the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    ConeGrid,
    Isoslant,
    ColorSeries,
}

/// Fitted grid plus a per-cell residual summary.
#[derive(Debug, Clone)]
pub struct GridView {
    pub xev: Vec<f64>,
    pub cells: Vec<GridCell>,
    /// Largest absolute residual per cell, same order as `cells`.
    pub max_residual: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct SeriesView {
    pub series: Vec<ColorSample>,
    pub report: AnomalyReport,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,

    pub view: View,

    /// Measured cone activations (None until loaded).
    pub measured: Option<ConeActivationDataset>,

    /// Pre-fitted coefficients, from the container or a calibration record.
    pub coefficients: Option<CalibrationCoefficients>,

    /// Evaluated grid; present once both of the above are loaded.
    pub grid: Option<GridView>,

    pub isoslant_record: Option<IsoslantRecord>,

    /// Model built from `isoslant_record` and the configured baseline.
    pub isoslant: Option<IsoslantModel>,

    /// Measured `(hue angle, response)` pairs.
    pub isoslant_samples: Vec<[f64; 2]>,

    pub series: Option<SeriesView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            view: View::ConeGrid,
            measured: None,
            coefficients: None,
            grid: None,
            isoslant_record: None,
            isoslant: None,
            isoslant_samples: Vec::new(),
            series: None,
            status_message: None,
        }
    }

    /// Load `path` as `kind` and fold it into the state.
    pub fn load(&mut self, kind: InputKind, path: &Path) -> Result<()> {
        match kind {
            InputKind::ConeActivations => {
                let file = loader::load_cone_activations(path)?;
                let coefficients = file.coefficients.or(self.coefficients);
                self.set_grid_inputs(Some(file.dataset), coefficients)?;
                self.view = View::ConeGrid;
                Ok(())
            }
            InputKind::Calibration => {
                let coefficients = loader::load_calibration(path)?;
                self.set_grid_inputs(self.measured.clone(), Some(coefficients))
            }
            InputKind::Isoslant => {
                self.set_isoslant(loader::load_isoslant(path)?);
                self.view = View::Isoslant;
                Ok(())
            }
            InputKind::IsoslantSamples => {
                self.isoslant_samples = loader::load_isoslant_samples(path)?;
                self.view = View::Isoslant;
                Ok(())
            }
            InputKind::ColorSeries => {
                self.set_series(loader::load_color_series(path)?);
                self.view = View::ColorSeries;
                Ok(())
            }
        }
    }

    /// Replace the measured dataset and coefficients and re-evaluate the 3×3
    /// grid. Nothing is stored unless the evaluation succeeds.
    pub fn set_grid_inputs(
        &mut self,
        measured: Option<ConeActivationDataset>,
        coefficients: Option<CalibrationCoefficients>,
    ) -> Result<()> {
        self.grid = self.build_grid(measured.as_ref(), coefficients.as_ref())?;
        self.measured = measured;
        self.coefficients = coefficients;
        Ok(())
    }

    /// Evaluate the grid for a candidate dataset and coefficient pair
    /// without touching the current state.
    fn build_grid(
        &self,
        dataset: Option<&ConeActivationDataset>,
        coefficients: Option<&CalibrationCoefficients>,
    ) -> Result<Option<GridView>> {
        let (Some(dataset), Some(coefficients)) = (dataset, coefficients) else {
            return Ok(None);
        };

        let grid = ModelGrid::new(*coefficients, self.settings.level_domain());
        let xev = self.settings.evaluation_grid();
        let cells = grid
            .pair_with(dataset, &xev)
            .context("evaluating cone x primary grid")?;

        let mut max_residual = Vec::with_capacity(cells.len());
        for cell in &cells {
            let residuals = cell
                .residuals(grid.domain())
                .with_context(|| format!("residuals of {}", cell.label()))?;
            max_residual.push(residuals.iter().fold(0.0_f64, |m, r| m.max(r.abs())));
        }

        Ok(Some(GridView {
            xev,
            cells,
            max_residual,
        }))
    }

    /// Replace the isoslant record; `None` disables the curve.
    pub fn set_isoslant(&mut self, record: Option<IsoslantRecord>) {
        self.isoslant_record = record;
        self.isoslant = record
            .map(|r| IsoslantModel::from_record(&r, self.settings.isoslant_offset));
    }

    /// Change the baseline offset and rebuild the isoslant model.
    pub fn set_isoslant_offset(&mut self, offset: f64) {
        self.settings.isoslant_offset = offset;
        self.set_isoslant(self.isoslant_record);
    }

    /// Points of the model curve. Drawn at the distinct sample angles when
    /// samples are loaded, over a full hue turn otherwise.
    pub fn isoslant_curve(&self) -> Option<Vec<[f64; 2]>> {
        let model = self.isoslant.as_ref()?;
        let x: Vec<f64> = if self.isoslant_samples.is_empty() {
            rusty_iris::model::hue_domain(self.settings.hue_samples)
        } else {
            let mut x: Vec<f64> = self.isoslant_samples.iter().map(|s| s[0]).collect();
            x.sort_by(f64::total_cmp);
            x.dedup();
            x
        };
        Some(x.iter().map(|&xi| [xi, model.evaluate_at(xi)]).collect())
    }

    pub fn set_series(&mut self, series: Vec<ColorSample>) {
        let report = self.detector().detect(&series);
        log::info!("{} equal-step rows flagged", report.len());
        self.series = Some(SeriesView { series, report });
    }

    /// Change the detector tolerance and re-run detection.
    pub fn set_anomaly_tolerance(&mut self, tolerance: f64) -> Result<()> {
        StepAnomalyDetector::new(tolerance)?;
        self.settings.anomaly_tolerance = tolerance;
        if let Some(view) = self.series.take() {
            self.set_series(view.series);
        }
        Ok(())
    }

    fn detector(&self) -> StepAnomalyDetector {
        // validated in Settings::validate / set_anomaly_tolerance
        StepAnomalyDetector::new(self.settings.anomaly_tolerance).unwrap_or_default()
    }

    /// Cone activations of a series row, with the row's channels read as
    /// normalised drive values scaled to the level domain. `None` until
    /// coefficients are loaded.
    pub fn sml_for(&self, row: &ColorSample) -> Option<ModelResult<[f64; 3]>> {
        let coefficients = self.coefficients.as_ref()?;
        let scale = self.settings.level_max;
        let rgb = row.rgb().map(|v| v * scale);
        Some(coefficients.rgb_to_sml(rgb, &self.settings.level_domain()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_iris::model::ModelError;

    fn identity() -> CalibrationCoefficients {
        CalibrationCoefficients {
            offset: [0.0; 3],
            gain: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            exponent: [1.0; 3],
        }
    }

    #[test]
    fn grid_waits_for_both_inputs() {
        let mut state = AppState::default();
        state.set_grid_inputs(None, Some(identity())).unwrap();
        assert!(state.grid.is_none());

        let acts = vec![vec![vec![0.0, 10.0]; 3]; 3];
        let levels = vec![vec![vec![0.0, 10.0]; 3]; 3];
        let measured = ConeActivationDataset::from_nested(&acts, &levels).unwrap();
        state.set_grid_inputs(Some(measured), state.coefficients).unwrap();

        let grid = state.grid.as_ref().unwrap();
        assert_eq!(grid.cells.len(), 9);
        assert_eq!(grid.xev.len(), 255);
        // diagonal cells fit exactly, off-diagonal ones miss by the full level
        assert_eq!(grid.max_residual[0], 0.0);
        assert_eq!(grid.max_residual[1], 10.0);
    }

    fn dataset(levels: &[f64]) -> ConeActivationDataset {
        let cell = vec![levels.to_vec(); 3];
        ConeActivationDataset::from_nested(&vec![cell.clone(); 3], &vec![cell; 3]).unwrap()
    }

    #[test]
    fn rejected_dataset_leaves_grid_untouched() {
        let mut state = AppState::default();
        state
            .set_grid_inputs(Some(dataset(&[0.0, 10.0])), Some(identity()))
            .unwrap();

        let err = state
            .set_grid_inputs(Some(dataset(&[0.0, 10.0, 300.0])), Some(identity()))
            .unwrap_err();
        assert!(format!("{err:#}").contains("outside the valid domain"));
        assert_eq!(state.measured.as_ref().unwrap().samples_per_cell(), 2);
        assert_eq!(state.grid.as_ref().unwrap().cells[0].levels, vec![0.0, 10.0]);
    }

    #[test]
    fn rejected_container_keeps_previous_inputs() {
        let mut state = AppState::default();
        state
            .set_grid_inputs(Some(dataset(&[0.0, 10.0])), Some(identity()))
            .unwrap();

        let cell = "[[0, 1, 2], [0, 1, 2], [0, 1, 2]]";
        let out_of_range = "[[0, 1, 300], [0, 1, 300], [0, 1, 300]]";
        let json = format!(
            r#"{{"rgb2sml": {{"cone-activations": [{cell}, {cell}, {cell}], "levels": [{out_of_range}, {out_of_range}, {out_of_range}]}}}}"#
        );
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("measured.json");
        std::fs::write(&path, json).unwrap();

        assert!(state.load(InputKind::ConeActivations, &path).is_err());
        assert_eq!(state.measured.as_ref().unwrap().samples_per_cell(), 2);
        let grid = state.grid.as_ref().unwrap();
        assert_eq!(grid.cells[0].levels, vec![0.0, 10.0]);
    }

    #[test]
    fn out_of_range_series_row_reports_its_error() {
        let mut state = AppState::default();
        let row = ColorSample::new(0.0, 0.5, 2.0, 0.5);
        assert!(state.sml_for(&row).is_none());

        state.coefficients = Some(identity());
        assert!(matches!(
            state.sml_for(&row),
            Some(Err(ModelError::Domain { .. }))
        ));
        let ok = state.sml_for(&ColorSample::new(0.0, 0.0, 0.0, 1.0)).unwrap().unwrap();
        assert_eq!(ok, [0.0, 0.0, 255.0]);
    }

    #[test]
    fn tolerance_change_reruns_detection() {
        let mut state = AppState::default();
        state.set_series(vec![
            ColorSample::new(0.0, 0.0, 0.0, 0.0),
            ColorSample::new(1.0, 1.0, 1.0, 1.001),
        ]);
        assert!(state.series.as_ref().unwrap().report.is_empty());

        state.set_anomaly_tolerance(0.01).unwrap();
        assert_eq!(state.series.as_ref().unwrap().report.indices(), vec![1]);
        assert!(state.set_anomaly_tolerance(-0.5).is_err());
    }

    #[test]
    fn isoslant_curve_follows_sample_angles() {
        let mut state = AppState::default();
        assert!(state.isoslant_curve().is_none());

        state.set_isoslant(Some(IsoslantRecord {
            amplitude: 0.1,
            phase: 0.0,
            frequency: None,
        }));
        assert_eq!(state.isoslant_curve().unwrap().len(), 360);

        state.isoslant_samples = vec![[1.0, 0.7], [0.0, 0.7], [1.0, 0.6]];
        let curve = state.isoslant_curve().unwrap();
        assert_eq!(curve.len(), 2);
        assert_eq!(curve[0], [0.0, 0.66 + 0.1]);

        state.set_isoslant_offset(0.5);
        assert_eq!(state.isoslant.unwrap().baseline(), 0.5);
    }
}
