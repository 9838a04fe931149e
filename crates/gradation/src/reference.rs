//! Target curves derived from the maximum nominal aggregate size.
//!
//! - The Power-45 ideal: percent passing proportional to `d^0.45`, scaled so
//!   the finest sieve passes 0% and every sieve at or above the maximum size
//!   passes 100%.
//! - The Tarantula band: per-sieve limits on the percent *retained*.

use thiserror::Error;

use crate::{curve::GradationCurve, sieve::Sieve};

pub const POWER45_EXPONENT: f64 = 0.45;

/// Tarantula retained limits `(lower, upper)` in percent, coarsest sieve first.
const TARANTULA_LIMITS: [(f64, f64); Sieve::COUNT] = [
    (0.0, 0.0),
    (0.0, 16.0),
    (0.0, 20.0),
    (0.0, 20.0),
    (4.0, 20.0),
    (4.0, 20.0),
    (4.0, 20.0),
    (0.0, 12.0),
    (0.0, 12.0),
    (4.0, 20.0),
    (4.0, 20.0),
    (0.0, 10.0),
    (0.0, 5.0),
];

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ReferenceError {
    #[error("maximum nominal size must be finite and above {min} mm, got {value}")]
    MaxSize { value: f64, min: f64 },

    #[error("band at {sieve} has lower limit above upper limit")]
    InvertedBand { sieve: Sieve },

    #[error("band limits at {sieve} must not be NaN")]
    NotANumber { sieve: Sieve },
}

/// A closed interval `[lower, upper]` on a percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Band {
    pub lower: f64,
    pub upper: f64,
}

impl Band {
    #[must_use]
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Returns `true` if `value` lies in the band, boundaries included.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Distance from `value` to the band, zero inside.
    #[must_use]
    pub fn distance(&self, value: f64) -> f64 {
        if value < self.lower {
            self.lower - value
        } else if value > self.upper {
            value - self.upper
        } else {
            0.0
        }
    }

    fn validate(&self, sieve: Sieve) -> Result<(), ReferenceError> {
        if self.lower.is_nan() || self.upper.is_nan() {
            return Err(ReferenceError::NotANumber { sieve });
        }
        if self.lower > self.upper {
            return Err(ReferenceError::InvertedBand { sieve });
        }
        Ok(())
    }
}

/// Per-sieve limits on percent retained.
///
/// The band at a sieve applies to the material retained *on* that sieve,
/// i.e. passing the next coarser sieve but not this one. The band at the top
/// sieve applies to the material that does not pass it at all.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde-derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "[Band; 13]", into = "[Band; 13]")
)]
pub struct TarantulaBand {
    limits: [Band; Sieve::COUNT],
}

impl TarantulaBand {
    /// Creates a band from custom limits, coarsest sieve first.
    ///
    /// # Errors
    ///
    /// Returns an error if a limit is NaN or inverted.
    pub fn new(limits: [Band; Sieve::COUNT]) -> Result<Self, ReferenceError> {
        for sieve in Sieve::ALL {
            limits[sieve.index()].validate(sieve)?;
        }
        Ok(Self { limits })
    }

    /// The standard Tarantula limits for a maximum nominal size.
    ///
    /// Sieves coarser than the maximum size keep their upper limit but lose
    /// any minimum, since a smaller aggregate cannot be required there.
    #[must_use]
    pub fn standard(max_size_mm: f64) -> Self {
        let limits = Sieve::ALL.map(|sieve| {
            let (lower, upper) = TARANTULA_LIMITS[sieve.index()];
            if sieve.opening_mm() > max_size_mm {
                Band::new(0.0, upper)
            } else {
                Band::new(lower, upper)
            }
        });
        Self { limits }
    }

    #[must_use]
    pub fn get(&self, sieve: Sieve) -> Band {
        self.limits[sieve.index()]
    }

    #[must_use]
    pub fn limits(&self) -> &[Band; Sieve::COUNT] {
        &self.limits
    }
}

impl TryFrom<[Band; Sieve::COUNT]> for TarantulaBand {
    type Error = ReferenceError;

    fn try_from(limits: [Band; Sieve::COUNT]) -> Result<Self, Self::Error> {
        Self::new(limits)
    }
}

impl From<TarantulaBand> for [Band; Sieve::COUNT] {
    fn from(band: TarantulaBand) -> Self {
        band.limits
    }
}

/// Power-45 ideal percent passing for a maximum nominal size.
///
/// # Errors
///
/// Returns an error if `max_size_mm` is not finite or does not exceed the
/// finest sieve opening.
pub fn power45_curve(max_size_mm: f64) -> Result<GradationCurve, ReferenceError> {
    let finest = Sieve::No200.opening_mm();
    if !max_size_mm.is_finite() || max_size_mm <= finest {
        return Err(ReferenceError::MaxSize {
            value: max_size_mm,
            min: finest,
        });
    }

    let base = finest.powf(POWER45_EXPONENT);
    let span = max_size_mm.powf(POWER45_EXPONENT) - base;

    let passing = Sieve::ALL.map(|sieve| {
        let d = sieve.opening_mm();
        if d >= max_size_mm {
            100.0
        } else {
            ((d.powf(POWER45_EXPONENT) - base) / span * 100.0).clamp(0.0, 100.0)
        }
    });

    // Monotone in d and clamped to [0, 100] by construction.
    Ok(GradationCurve::from_array_unchecked(passing))
}

/// The ideal curve and Tarantula band for one optimization run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize))]
pub struct ReferenceCurves {
    max_size_mm: f64,
    ideal: GradationCurve,
    tarantula: TarantulaBand,
}

impl ReferenceCurves {
    /// Builds the standard references for a maximum nominal size in millimetres.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_size_mm` is not a usable size.
    pub fn new(max_size_mm: f64) -> Result<Self, ReferenceError> {
        Ok(Self {
            max_size_mm,
            ideal: power45_curve(max_size_mm)?,
            tarantula: TarantulaBand::standard(max_size_mm),
        })
    }

    /// Replaces the Tarantula band with custom limits.
    #[must_use]
    pub fn with_tarantula(mut self, tarantula: TarantulaBand) -> Self {
        self.tarantula = tarantula;
        self
    }

    #[must_use]
    pub fn max_size_mm(&self) -> f64 {
        self.max_size_mm
    }

    #[must_use]
    pub fn ideal(&self) -> &GradationCurve {
        &self.ideal
    }

    #[must_use]
    pub fn tarantula(&self) -> &TarantulaBand {
        &self.tarantula
    }
}
