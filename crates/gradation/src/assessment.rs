//! Compliance of a composite with the gradation limits.

use crate::{
    curve::GradationCurve,
    haystack::haystack_violations,
    reference::{Band, TarantulaBand},
    shilstone::{COARSE_FRACTION_MIN, FINE_FRACTION_LIMITS, coarse_fraction, fine_fraction},
    sieve::Sieve,
};

/// Tolerance on percent passing used for the working band, coarsest first.
const WORKING_TOLERANCES: [f64; Sieve::COUNT] = [
    0.0, 4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 3.0, 2.0, 3.0,
];

/// One limit the composite fails to meet.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum Violation {
    /// Percent passing outside the haystack limits.
    Haystack { sieve: Sieve, passing: f64, limits: Band },
    /// Percent retained outside the Tarantula band.
    Tarantula {
        sieve: Sieve,
        retained: f64,
        limits: Band,
    },
    /// Percent retained from #30 to #200 outside its range.
    FineFraction { value: f64, limits: Band },
    /// Percent retained from ¾" to #16 below its minimum.
    CoarseFraction { value: f64, min: f64 },
}

/// Result of checking a composite against every limit set.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct ComplianceReport {
    pub fine_fraction: f64,
    pub coarse_fraction: f64,
    pub violations: Vec<Violation>,
}

impl ComplianceReport {
    /// Returns `true` if no limit is violated.
    #[must_use]
    pub fn all_compliant(&self) -> bool {
        self.violations.is_empty()
    }

    #[must_use]
    pub fn haystack_compliant(&self) -> bool {
        !self
            .violations
            .iter()
            .any(|v| matches!(v, Violation::Haystack { .. }))
    }

    #[must_use]
    pub fn tarantula_compliant(&self) -> bool {
        !self
            .violations
            .iter()
            .any(|v| matches!(v, Violation::Tarantula { .. }))
    }

    #[must_use]
    pub fn fractions_compliant(&self) -> bool {
        !self.violations.iter().any(|v| {
            matches!(
                v,
                Violation::FineFraction { .. } | Violation::CoarseFraction { .. }
            )
        })
    }
}

/// Checks a composite against the haystack, the Tarantula band, and the
/// Shilstone fine and coarse fractions.
///
/// Violations are listed in that order, coarsest sieve first within each group.
#[must_use]
pub fn assess_compliance(composite: &GradationCurve, tarantula: &TarantulaBand) -> ComplianceReport {
    let mut violations: Vec<Violation> = haystack_violations(composite)
        .map(|(sieve, passing, limits)| Violation::Haystack {
            sieve,
            passing,
            limits,
        })
        .collect();

    violations.extend(Sieve::ALL.into_iter().filter_map(|sieve| {
        let retained = composite.retained_on(sieve);
        let limits = tarantula.get(sieve);
        (!limits.contains(retained)).then_some(Violation::Tarantula {
            sieve,
            retained,
            limits,
        })
    }));

    let fine = fine_fraction(composite);
    if !FINE_FRACTION_LIMITS.contains(fine) {
        violations.push(Violation::FineFraction {
            value: fine,
            limits: FINE_FRACTION_LIMITS,
        });
    }

    let coarse = coarse_fraction(composite);
    if coarse < COARSE_FRACTION_MIN {
        violations.push(Violation::CoarseFraction {
            value: coarse,
            min: COARSE_FRACTION_MIN,
        });
    }

    ComplianceReport {
        fine_fraction: fine,
        coarse_fraction: coarse,
        violations,
    }
}

/// Production tolerance band around a composite's percent passing.
///
/// Each limit is clamped to `[0, 100]`.
#[must_use]
pub fn working_band(composite: &GradationCurve) -> [Band; Sieve::COUNT] {
    Sieve::ALL.map(|sieve| {
        let passing = composite.percent_passing(sieve);
        let tol = WORKING_TOLERANCES[sieve.index()];
        Band::new((passing - tol).max(0.0), (passing + tol).min(100.0))
    })
}
