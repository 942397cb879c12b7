use std::fmt;

use super::cone::{ConeActivationModel, LevelDomain};
use super::error::{ModelError, ModelResult};

// ---------------------------------------------------------------------------
// Cone / Primary – the two fixed index axes
// ---------------------------------------------------------------------------

/// Photoreceptor class. Index order is S, M, L.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cone {
    S,
    M,
    L,
}

impl Cone {
    pub const ALL: [Cone; 3] = [Cone::S, Cone::M, Cone::L];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Cone::S => "S",
            Cone::M => "M",
            Cone::L => "L",
        }
    }
}

/// Display primary. Index order is R, G, B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primary {
    R,
    G,
    B,
}

impl Primary {
    pub const ALL: [Primary; 3] = [Primary::R, Primary::G, Primary::B];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Primary::R => "R",
            Primary::G => "G",
            Primary::B => "B",
        }
    }
}

impl fmt::Display for Cone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Primary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// CalibrationCoefficients
// ---------------------------------------------------------------------------

/// Pre-fitted power-law coefficients of the rgb → sml transform.
///
/// `offset` is per cone, `gain` is indexed `[cone][primary]` and `exponent`
/// is per primary (shared by all three cones).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationCoefficients {
    pub offset: [f64; 3],
    pub gain: [[f64; 3]; 3],
    pub exponent: [f64; 3],
}

/// Result of parsing a positional text block.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCoefficients {
    pub coefficients: CalibrationCoefficients,
    /// Data rows found after the exponent row; they are not used.
    pub trailing_rows: usize,
}

impl CalibrationCoefficients {
    /// Build from untyped arrays, checking the 3 / 3×3 / 3 shape first.
    pub fn from_slices(offset: &[f64], gain: &[Vec<f64>], exponent: &[f64]) -> ModelResult<Self> {
        let offset: [f64; 3] = offset
            .try_into()
            .map_err(|_| ModelError::shape("offset", 3, offset.len()))?;
        let exponent: [f64; 3] = exponent
            .try_into()
            .map_err(|_| ModelError::shape("exponent", 3, exponent.len()))?;

        if gain.len() != 3 {
            return Err(ModelError::shape("gain", "3x3", format!("{}x?", gain.len())));
        }
        let mut rows = [[0.0; 3]; 3];
        for (c, row) in gain.iter().enumerate() {
            rows[c] = row.as_slice().try_into().map_err(|_| {
                ModelError::shape("gain", "3x3", format!("3x{} (row {c})", row.len()))
            })?;
        }

        Ok(Self {
            offset,
            gain: rows,
            exponent,
        })
    }

    /// Parse the comma-delimited calibration block.
    ///
    /// Layout, after dropping blank lines and `#` comments:
    /// ```text
    /// A0S, A0M, A0L        offsets
    /// ArS, AgS, AbS        gains for S
    /// ArM, AgM, AbM        gains for M
    /// ArL, AgL, AbL        gains for L
    /// gR,  gG,  gB         exponents
    /// ```
    pub fn parse_text_block(text: &str) -> ModelResult<ParsedCoefficients> {
        let mut rows: Vec<[f64; 3]> = Vec::with_capacity(5);
        let mut trailing_rows = 0;

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if rows.len() == 5 {
                trailing_rows += 1;
                continue;
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != 3 {
                return Err(ModelError::shape(
                    format!("calibration block line {}", line_no + 1),
                    "3 fields",
                    format!("{} fields", fields.len()),
                ));
            }

            let mut row = [0.0; 3];
            for (k, tok) in fields.iter().enumerate() {
                row[k] = tok.parse::<f64>().map_err(|_| ModelError::Parse {
                    line: line_no + 1,
                    field: k,
                    text: tok.to_string(),
                })?;
            }
            rows.push(row);
        }

        if rows.len() != 5 {
            return Err(ModelError::shape(
                "calibration block",
                "5 rows",
                format!("{} rows", rows.len()),
            ));
        }

        Ok(ParsedCoefficients {
            coefficients: Self {
                offset: rows[0],
                gain: [rows[1], rows[2], rows[3]],
                exponent: rows[4],
            },
            trailing_rows,
        })
    }

    /// Render the block in the commented layout accepted by [`Self::parse_text_block`].
    pub fn to_text_block(&self) -> String {
        let row = |r: &[f64; 3]| format!("{}, {}, {}\n", r[0], r[1], r[2]);

        let mut out = String::new();
        out.push_str("# A₀ [A₀S, A₀M, A₀L]\n");
        out.push_str(&row(&self.offset));
        out.push('\n');
        out.push_str("# A [ArS, AgS, AbS;\n");
        out.push_str("#    ArM, AgM, AbM;\n");
        out.push_str("#    ArL, AgL, AbL ]\n");
        for gains in &self.gain {
            out.push_str(&row(gains));
        }
        out.push('\n');
        out.push_str("# ɣ [rˠ, gˠ, bˠ]\n");
        out.push_str(&row(&self.exponent));
        out
    }

    /// The power-law model for one (cone, primary) pair.
    pub fn model(&self, cone: Cone, primary: Primary) -> ConeActivationModel {
        ConeActivationModel::new(
            self.offset[cone.index()],
            self.gain[cone.index()][primary.index()],
            self.exponent[primary.index()],
        )
    }

    /// Full forward transform of one rgb drive triplet to (S, M, L) activations:
    /// `sml[c] = offset[c] + Σp gain[c][p] · rgb[p]^exponent[p]`.
    pub fn rgb_to_sml(&self, rgb: [f64; 3], domain: &LevelDomain) -> ModelResult<[f64; 3]> {
        let mut driven = [0.0; 3];
        for primary in Primary::ALL {
            let p = primary.index();
            domain.check(p, rgb[p], self.exponent[p])?;
            driven[p] = rgb[p].powf(self.exponent[p]);
        }

        let mut sml = self.offset;
        for cone in Cone::ALL {
            let c = cone.index();
            sml[c] += (0..3).map(|p| self.gain[c][p] * driven[p]).sum::<f64>();
        }
        Ok(sml)
    }
}
