use super::coefficients::{Cone, Primary};
use super::error::{ModelError, ModelResult};

// ---------------------------------------------------------------------------
// ConeActivationDataset – measured 3×3×N activations and their levels
// ---------------------------------------------------------------------------

/// Measured activations and the stimulus levels that produced them.
///
/// Both arrays are stored flat in `[cone][primary][sample]` order and always
/// have the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ConeActivationDataset {
    activations: Vec<f64>,
    levels: Vec<f64>,
    samples: usize,
}

impl ConeActivationDataset {
    /// Build from nested `[cone][primary][sample]` arrays.
    pub fn from_nested(activations: &[Vec<Vec<f64>>], levels: &[Vec<Vec<f64>>]) -> ModelResult<Self> {
        let (activations, n) = flatten("cone-activations", activations)?;
        let (levels, m) = flatten("levels", levels)?;
        if n != m {
            return Err(ModelError::shape(
                "levels",
                format!("3x3x{n}"),
                format!("3x3x{m}"),
            ));
        }
        Ok(Self {
            activations,
            levels,
            samples: n,
        })
    }

    /// Build from nested activations and a flat level array of 9·N values,
    /// reshaped to the activation shape.
    pub fn with_flat_levels(activations: &[Vec<Vec<f64>>], levels: Vec<f64>) -> ModelResult<Self> {
        let (activations, n) = flatten("cone-activations", activations)?;
        if levels.len() != activations.len() {
            return Err(ModelError::shape(
                "levels",
                activations.len(),
                levels.len(),
            ));
        }
        Ok(Self {
            activations,
            levels,
            samples: n,
        })
    }

    /// Samples per (cone, primary) cell.
    pub fn samples_per_cell(&self) -> usize {
        self.samples
    }

    pub fn activations(&self, cone: Cone, primary: Primary) -> &[f64] {
        &self.activations[self.cell_range(cone, primary)]
    }

    pub fn levels(&self, cone: Cone, primary: Primary) -> &[f64] {
        &self.levels[self.cell_range(cone, primary)]
    }

    fn cell_range(&self, cone: Cone, primary: Primary) -> std::ops::Range<usize> {
        let start = (cone.index() * 3 + primary.index()) * self.samples;
        start..start + self.samples
    }
}

fn flatten(what: &str, nested: &[Vec<Vec<f64>>]) -> ModelResult<(Vec<f64>, usize)> {
    if nested.len() != 3 {
        return Err(ModelError::shape(what, "3x3xN", format!("{}x?x?", nested.len())));
    }
    let n = nested[0].first().map(Vec::len).unwrap_or(0);
    let mut flat = Vec::with_capacity(9 * n);
    for (c, row) in nested.iter().enumerate() {
        if row.len() != 3 {
            return Err(ModelError::shape(
                what,
                "3x3xN",
                format!("cone {c} has {} primaries", row.len()),
            ));
        }
        for (p, cell) in row.iter().enumerate() {
            if cell.len() != n {
                return Err(ModelError::shape(
                    format!("{what}[{c}][{p}]"),
                    n,
                    cell.len(),
                ));
            }
            flat.extend_from_slice(cell);
        }
    }
    Ok((flat, n))
}
