use serde::{Deserialize, Serialize};

use crate::model::{
    CalibrationCoefficients, ConeActivationDataset, IsoslantRecord, ModelResult,
};

// ---------------------------------------------------------------------------
// Cone-activation container (JSON)
// ---------------------------------------------------------------------------

/// Top level of the container: a single `rgb2sml` group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerFile {
    pub rgb2sml: ConeActivationGroup,
}

/// The `rgb2sml` group. Coefficients are optional; when absent they come
/// from a separate calibration record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConeActivationGroup {
    #[serde(rename = "cone-activations")]
    pub cone_activations: Vec<Vec<Vec<f64>>>,
    pub levels: LevelArray,
    #[serde(rename = "Azero", default, skip_serializing_if = "Option::is_none")]
    pub azero: Option<Vec<f64>>,
    #[serde(rename = "A", default, skip_serializing_if = "Option::is_none")]
    pub a: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<Vec<f64>>,
}

/// Levels are stored either with the activation shape or flat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LevelArray {
    Nested(Vec<Vec<Vec<f64>>>),
    Flat(Vec<f64>),
}

impl ConeActivationGroup {
    pub fn dataset(&self) -> ModelResult<ConeActivationDataset> {
        match &self.levels {
            LevelArray::Nested(levels) => {
                ConeActivationDataset::from_nested(&self.cone_activations, levels)
            }
            LevelArray::Flat(levels) => {
                ConeActivationDataset::with_flat_levels(&self.cone_activations, levels.clone())
            }
        }
    }

    /// `None` when the group carries no coefficient sub-groups at all.
    /// A partial set is reported as a shape error by the caller.
    pub fn coefficients(&self) -> Option<ModelResult<CalibrationCoefficients>> {
        match (&self.azero, &self.a, &self.gamma) {
            (None, None, None) => None,
            (azero, a, gamma) => Some(CalibrationCoefficients::from_slices(
                azero.as_deref().unwrap_or_default(),
                a.as_deref().unwrap_or_default(),
                gamma.as_deref().unwrap_or_default(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Calibration record (YAML)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationFile {
    pub rgb2lms: CalibrationRecord,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalibrationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "gray-level", default, skip_serializing_if = "Option::is_none")]
    pub gray_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    /// Positional comma-delimited block, 5 rows × 3 columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dkl: Option<String>,
    /// Named-field form; wins over `dkl` when both are present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficients: Option<NamedCoefficients>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCoefficients {
    pub offset: Vec<f64>,
    pub gain: Vec<Vec<f64>>,
    pub exponent: Vec<f64>,
}

impl NamedCoefficients {
    pub fn to_coefficients(&self) -> ModelResult<CalibrationCoefficients> {
        CalibrationCoefficients::from_slices(&self.offset, &self.gain, &self.exponent)
    }
}

impl From<&CalibrationCoefficients> for NamedCoefficients {
    fn from(c: &CalibrationCoefficients) -> Self {
        NamedCoefficients {
            offset: c.offset.to_vec(),
            gain: c.gain.iter().map(|row| row.to_vec()).collect(),
            exponent: c.exponent.to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Isoslant record (YAML)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IsoslantFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isoslant: Option<IsoslantEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsoslantEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Amplitude of the luminance modulation.
    pub dl: f64,
    /// Phase in radians.
    pub phi: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freq: Option<f64>,
}

impl From<&IsoslantEntry> for IsoslantRecord {
    fn from(e: &IsoslantEntry) -> Self {
        IsoslantRecord {
            amplitude: e.dl,
            phase: e.phi,
            frequency: e.freq,
        }
    }
}
