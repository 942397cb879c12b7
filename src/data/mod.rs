//! Data layer: on-disk formats parsed into modelling-core types.
//!
//! Architecture:
//! ```text
//!  .json        .yaml / .csv        .yaml        .csv / .parquet
//!  container    rgb2lms record      isoslant     colour series
//!      │             │                 │               │
//!      ▼             ▼                 ▼               ▼
//!   ┌──────────────────────────────────────────────────────┐
//!   │ loader   (serde shapes in `records`)                  │
//!   └──────────────────────────────────────────────────────┘
//!      │             │                 │               │
//!      ▼             ▼                 ▼               ▼
//!  ConeActivation  Calibration     Isoslant        [ColorSample]
//!  Dataset         Coefficients    Record
//! ```

pub mod loader;
pub mod records;
