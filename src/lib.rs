//! Cone-activation, isoslant and colour-series diagnostics.
//!
//! [`model`] holds the pure evaluation and detection core, [`data`] turns
//! files into core types and [`settings`] carries the evaluation defaults.

pub mod data;
pub mod model;
pub mod settings;
