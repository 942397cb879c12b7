use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::model::{LevelDomain, StepAnomalyDetector};

/// Environment variable naming an optional YAML settings file.
pub const CONFIG_ENV: &str = "RUSTY_IRIS_CONFIG";

// ---------------------------------------------------------------------------
// Settings – evaluation defaults, overridable from YAML
// ---------------------------------------------------------------------------

/// Evaluation settings. Every field has a default, so a settings file only
/// needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Lowest valid stimulus level.
    pub level_min: f64,
    /// Highest valid stimulus level.
    pub level_max: f64,
    /// Number of integer levels `0..grid_points` the fitted curves are drawn over.
    pub grid_points: usize,
    /// Equality tolerance of the step anomaly detector (0 = exact).
    pub anomaly_tolerance: f64,
    /// Baseline luminance the isoslant curve oscillates around.
    pub isoslant_offset: f64,
    /// Hue samples used to draw the isoslant curve when no sample data is loaded.
    pub hue_samples: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level_min: 0.0,
            level_max: 255.0,
            grid_points: 255,
            anomaly_tolerance: 0.0,
            isoslant_offset: 0.66,
            hue_samples: 360,
        }
    }
}

impl Settings {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(text).context("parsing settings YAML")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Settings from `$RUSTY_IRIS_CONFIG` if it is set, defaults otherwise.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let path = Path::new(&path);
                log::info!("Loading settings from {}", path.display());
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.level_min.is_finite() && self.level_max.is_finite()) {
            bail!("level_min / level_max must be finite");
        }
        if self.level_min < 0.0 || self.level_min >= self.level_max {
            bail!(
                "invalid level domain [{}, {}]",
                self.level_min,
                self.level_max
            );
        }
        if self.grid_points == 0 || self.hue_samples == 0 {
            bail!("grid_points and hue_samples must be positive");
        }
        StepAnomalyDetector::new(self.anomaly_tolerance)?;
        Ok(())
    }

    pub fn level_domain(&self) -> LevelDomain {
        LevelDomain {
            min: self.level_min,
            max: self.level_max,
        }
    }

    /// The shared evaluation grid for fitted curves.
    pub fn evaluation_grid(&self) -> Vec<f64> {
        self.level_domain().integer_grid(self.grid_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_eight_bit_grid() {
        let s = Settings::default();
        assert_eq!(s.level_domain(), LevelDomain::EIGHT_BIT);
        let grid = s.evaluation_grid();
        assert_eq!(grid.len(), 255);
        assert_eq!(grid[254], 254.0);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let s = Settings::from_yaml("anomaly_tolerance: 0.001\nisoslant_offset: 0.7\n").unwrap();
        assert_eq!(s.anomaly_tolerance, 0.001);
        assert_eq!(s.isoslant_offset, 0.7);
        assert_eq!(s.grid_points, 255);
    }

    #[test]
    fn rejects_inverted_domain_and_unknown_keys() {
        assert!(Settings::from_yaml("level_min: 10\nlevel_max: 5\n").is_err());
        assert!(Settings::from_yaml("gird_points: 10\n").is_err());
        assert!(Settings::from_yaml("anomaly_tolerance: -1\n").is_err());
    }
}
