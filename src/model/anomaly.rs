use super::error::{ModelError, ModelResult};

// ---------------------------------------------------------------------------
// ColorSample – one row of a sequential colour series
// ---------------------------------------------------------------------------

/// One row of a colour series: position `x` (usually the hue angle) and the
/// three channel values. Series order is the row order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSample {
    pub x: f64,
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl ColorSample {
    pub fn new(x: f64, r: f64, g: f64, b: f64) -> Self {
        Self { x, r, g, b }
    }

    pub fn rgb(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }
}

/// First differences between row `index - 1` and row `index`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDelta {
    pub index: usize,
    pub dr: f64,
    pub dg: f64,
    pub db: f64,
}

/// Consecutive channel deltas for every step of the series.
pub fn step_deltas(series: &[ColorSample]) -> Vec<StepDelta> {
    series
        .windows(2)
        .enumerate()
        .map(|(i, w)| StepDelta {
            index: i + 1,
            dr: w[1].r - w[0].r,
            dg: w[1].g - w[0].g,
            db: w[1].b - w[0].b,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// StepAnomalyDetector
// ---------------------------------------------------------------------------

/// A step where all three channels moved by the same amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlaggedStep {
    pub index: usize,
    pub delta: f64,
    pub row: ColorSample,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnomalyReport {
    pub flagged: Vec<FlaggedStep>,
}

impl AnomalyReport {
    pub fn len(&self) -> usize {
        self.flagged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.flagged.iter().map(|f| f.index).collect()
    }
}

/// Flags degenerate (grey-axis) steps in a colour series.
///
/// Two deltas count as equal when they differ by at most `tolerance`.
/// The default tolerance of `0.0` is exact floating point equality.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepAnomalyDetector {
    tolerance: f64,
}

impl StepAnomalyDetector {
    pub fn new(tolerance: f64) -> ModelResult<Self> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ModelError::InvalidTolerance(tolerance));
        }
        Ok(Self { tolerance })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn equal(&self, a: f64, b: f64) -> bool {
        if self.tolerance == 0.0 {
            a == b
        } else {
            (a - b).abs() <= self.tolerance
        }
    }

    pub fn is_flagged(&self, step: &StepDelta) -> bool {
        self.equal(step.dr, step.dg) && self.equal(step.dg, step.db) && self.equal(step.dr, step.db)
    }

    /// Series shorter than two rows produce an empty report.
    pub fn detect(&self, series: &[ColorSample]) -> AnomalyReport {
        let flagged = step_deltas(series)
            .into_iter()
            .filter(|step| self.is_flagged(step))
            .map(|step| FlaggedStep {
                index: step.index,
                delta: step.dr,
                row: series[step.index],
            })
            .collect();
        AnomalyReport { flagged }
    }
}
