use super::error::{ModelError, ModelResult};

// ---------------------------------------------------------------------------
// LevelDomain – validated stimulus range
// ---------------------------------------------------------------------------

/// Closed interval of valid stimulus levels. Defaults to the 8-bit range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelDomain {
    pub min: f64,
    pub max: f64,
}

impl Default for LevelDomain {
    fn default() -> Self {
        Self::EIGHT_BIT
    }
}

impl LevelDomain {
    pub const EIGHT_BIT: LevelDomain = LevelDomain {
        min: 0.0,
        max: 255.0,
    };

    /// Levels below zero are never accepted, whatever `min` says.
    pub fn check(&self, index: usize, level: f64, exponent: f64) -> ModelResult<()> {
        if level.is_finite() && level >= self.min.max(0.0) && level <= self.max {
            Ok(())
        } else {
            Err(ModelError::Domain {
                index,
                level,
                exponent,
            })
        }
    }

    /// `0, 1, …, n-1` clipped to this domain; the usual evaluation grid.
    pub fn integer_grid(&self, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| i as f64)
            .filter(|&x| x >= self.min && x <= self.max)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ConeActivationModel – offset + gain · level^exponent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConeActivationModel {
    pub offset: f64,
    pub gain: f64,
    pub exponent: f64,
}

impl ConeActivationModel {
    pub fn new(offset: f64, gain: f64, exponent: f64) -> Self {
        Self {
            offset,
            gain,
            exponent,
        }
    }

    /// Response to a single level. The caller is responsible for the domain.
    pub fn evaluate_at(&self, level: f64) -> f64 {
        self.offset + self.gain * level.powf(self.exponent)
    }

    /// Evaluate over `levels`, failing on the first level outside `domain`.
    /// Nothing is evaluated unless every level is valid.
    pub fn evaluate(&self, levels: &[f64], domain: &LevelDomain) -> ModelResult<Vec<f64>> {
        for (i, &level) in levels.iter().enumerate() {
            domain.check(i, level, self.exponent)?;
        }
        Ok(levels.iter().map(|&l| self.evaluate_at(l)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_level_yields_offset() {
        for &(offset, gain, exponent) in &[(0.5, 3.0, 2.2), (-1.0, 0.001, 0.7), (0.0, -4.0, 1.0)] {
            let m = ConeActivationModel::new(offset, gain, exponent);
            assert_eq!(m.evaluate(&[0.0], &LevelDomain::default()).unwrap(), vec![offset]);
        }
    }

    #[test]
    fn monotone_for_positive_gain_and_exponent() {
        let m = ConeActivationModel::new(0.01, 0.0003, 2.2);
        let levels = LevelDomain::default().integer_grid(255);
        let response = m.evaluate(&levels, &LevelDomain::default()).unwrap();
        assert_eq!(response.len(), 255);
        assert!(response.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn negative_level_is_a_domain_error() {
        let m = ConeActivationModel::new(0.0, 1.0, 2.2);
        let err = m.evaluate(&[1.0, -0.5, 2.0], &LevelDomain::default()).unwrap_err();
        assert_eq!(
            err,
            ModelError::Domain {
                index: 1,
                level: -0.5,
                exponent: 2.2
            }
        );
    }

    #[test]
    fn levels_above_eight_bit_and_nan_are_rejected() {
        let m = ConeActivationModel::new(0.0, 1.0, 1.0);
        let domain = LevelDomain::default();
        assert!(m.evaluate(&[255.0], &domain).is_ok());
        assert!(m.evaluate(&[255.5], &domain).is_err());
        assert!(m.evaluate(&[f64::NAN], &domain).is_err());
    }

    #[test]
    fn negative_domain_min_is_clamped_to_zero() {
        let domain = LevelDomain {
            min: -10.0,
            max: 10.0,
        };
        assert!(domain.check(0, -1.0, 2.0).is_err());
        assert_eq!(domain.integer_grid(20).len(), 11);
    }
}
