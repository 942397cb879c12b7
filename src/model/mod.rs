//! Modelling core: model evaluation and anomaly detection. No I/O, no logging.
//!
//! Architecture:
//! ```text
//!   CalibrationCoefficients ──┐        ConeActivationDataset
//!                             ▼                 │
//!                      ┌───────────┐            │
//!                      │ ModelGrid  │ 9× ConeActivationModel (rayon)
//!                      └───────────┘            │
//!                             │                 ▼
//!                             └──────► GridCell (fitted + measured)
//!
//!   IsoslantRecord + offset ──► IsoslantModel (cosine | sine) ──► curve
//!
//!   [ColorSample] ──► StepAnomalyDetector ──► AnomalyReport
//! ```

pub mod anomaly;
pub mod coefficients;
pub mod cone;
pub mod dataset;
pub mod error;
pub mod grid;
pub mod isoslant;

pub use anomaly::{AnomalyReport, ColorSample, FlaggedStep, StepAnomalyDetector, StepDelta};
pub use coefficients::{CalibrationCoefficients, Cone, ParsedCoefficients, Primary};
pub use cone::{ConeActivationModel, LevelDomain};
pub use dataset::ConeActivationDataset;
pub use error::{ModelError, ModelResult};
pub use grid::{FittedCurve, GridCell, ModelGrid};
pub use isoslant::{hue_domain, IsoslantModel, IsoslantRecord};
