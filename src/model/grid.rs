use rayon::prelude::*;

use super::coefficients::{CalibrationCoefficients, Cone, Primary};
use super::cone::{ConeActivationModel, LevelDomain};
use super::dataset::ConeActivationDataset;
use super::error::ModelResult;

// ---------------------------------------------------------------------------
// FittedCurve / GridCell – one (cone, primary) entry of the grid
// ---------------------------------------------------------------------------

/// Model response of one (cone, primary) pair over the shared domain.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedCurve {
    pub cone: Cone,
    pub primary: Primary,
    pub model: ConeActivationModel,
    pub response: Vec<f64>,
}

impl FittedCurve {
    /// Subplot caption, e.g. `"S vs R"`.
    pub fn label(&self) -> String {
        format!("{} vs {}", self.cone, self.primary)
    }
}

/// A fitted curve paired with the measured slice of the same (cone, primary).
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub curve: FittedCurve,
    pub levels: Vec<f64>,
    pub measured: Vec<f64>,
}

impl GridCell {
    pub fn label(&self) -> String {
        self.curve.label()
    }

    /// `measured - model(level)` at every measured level.
    pub fn residuals(&self, domain: &LevelDomain) -> ModelResult<Vec<f64>> {
        let predicted = self.curve.model.evaluate(&self.levels, domain)?;
        Ok(self
            .measured
            .iter()
            .zip(&predicted)
            .map(|(m, p)| m - p)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// ModelGrid – the 3×3 cone × primary arrangement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ModelGrid {
    coefficients: CalibrationCoefficients,
    domain: LevelDomain,
}

impl ModelGrid {
    pub fn new(coefficients: CalibrationCoefficients, domain: LevelDomain) -> Self {
        Self {
            coefficients,
            domain,
        }
    }

    /// Build from untyped coefficient arrays; fails on a bad shape before
    /// anything is evaluated.
    pub fn from_slices(
        offset: &[f64],
        gain: &[Vec<f64>],
        exponent: &[f64],
        domain: LevelDomain,
    ) -> ModelResult<Self> {
        let coefficients = CalibrationCoefficients::from_slices(offset, gain, exponent)?;
        Ok(Self::new(coefficients, domain))
    }

    pub fn coefficients(&self) -> &CalibrationCoefficients {
        &self.coefficients
    }

    pub fn domain(&self) -> &LevelDomain {
        &self.domain
    }

    /// All (cone, primary) pairs in row-major order.
    pub fn pairs() -> impl Iterator<Item = (Cone, Primary)> {
        Cone::ALL
            .into_iter()
            .flat_map(|c| Primary::ALL.into_iter().map(move |p| (c, p)))
    }

    /// Evaluate the nine models over `xev`. Cells run in parallel and come
    /// back in row-major (cone, primary) order.
    pub fn evaluate(&self, xev: &[f64]) -> ModelResult<Vec<FittedCurve>> {
        let pairs: Vec<(Cone, Primary)> = Self::pairs().collect();
        pairs
            .par_iter()
            .map(|&(cone, primary)| -> ModelResult<FittedCurve> {
                let model = self.coefficients.model(cone, primary);
                let response = model.evaluate(xev, &self.domain)?;
                Ok(FittedCurve {
                    cone,
                    primary,
                    model,
                    response,
                })
            })
            .collect()
    }

    /// Evaluate over `xev` and attach each curve's measured counterpart.
    pub fn pair_with(&self, dataset: &ConeActivationDataset, xev: &[f64]) -> ModelResult<Vec<GridCell>> {
        let curves = self.evaluate(xev)?;
        Ok(curves
            .into_iter()
            .map(|curve| GridCell {
                levels: dataset.levels(curve.cone, curve.primary).to_vec(),
                measured: dataset.activations(curve.cone, curve.primary).to_vec(),
                curve,
            })
            .collect())
    }
}
