use std::f64::consts::TAU;

// ---------------------------------------------------------------------------
// IsoslantRecord / IsoslantModel – hue angle → luminance offset
// ---------------------------------------------------------------------------

/// Pre-fitted isoslant parameters. The baseline offset is not part of the
/// record; it is supplied by whoever evaluates the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsoslantRecord {
    pub amplitude: f64,
    /// Radians.
    pub phase: f64,
    /// Angular frequency; present only for the sine form.
    pub frequency: Option<f64>,
}

/// The two isoslant curve shapes. They are kept apart on purpose: a record
/// fitted against one form does not describe the same curve under the other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IsoslantModel {
    /// `offset + amplitude · cos(x − phase)`
    Cosine {
        offset: f64,
        amplitude: f64,
        phase: f64,
    },
    /// `offset + amplitude · sin(frequency · x − phase)`
    Sine {
        offset: f64,
        amplitude: f64,
        phase: f64,
        frequency: f64,
    },
}

impl IsoslantModel {
    /// Pick the variant from the fields the record carries.
    pub fn from_record(record: &IsoslantRecord, offset: f64) -> Self {
        match record.frequency {
            Some(frequency) => IsoslantModel::Sine {
                offset,
                amplitude: record.amplitude,
                phase: record.phase,
                frequency,
            },
            None => IsoslantModel::Cosine {
                offset,
                amplitude: record.amplitude,
                phase: record.phase,
            },
        }
    }

    pub fn baseline(&self) -> f64 {
        match *self {
            IsoslantModel::Cosine { offset, .. } | IsoslantModel::Sine { offset, .. } => offset,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IsoslantModel::Cosine { .. } => "cosine",
            IsoslantModel::Sine { .. } => "sine",
        }
    }

    pub fn evaluate_at(&self, x: f64) -> f64 {
        match *self {
            IsoslantModel::Cosine {
                offset,
                amplitude,
                phase,
            } => offset + amplitude * (x - phase).cos(),
            IsoslantModel::Sine {
                offset,
                amplitude,
                phase,
                frequency,
            } => offset + amplitude * (frequency * x - phase).sin(),
        }
    }

    pub fn evaluate(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&xi| self.evaluate_at(xi)).collect()
    }
}

/// `n` evenly spaced hue angles covering `[0, 2π)`.
pub fn hue_domain(n: usize) -> Vec<f64> {
    (0..n).map(|i| TAU * i as f64 / n as f64).collect()
}
