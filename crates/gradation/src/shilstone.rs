//! Shilstone workability diagnostics for a composite gradation.
//!
//! These values describe the blend the optimizer produced. They are reported
//! alongside the result and never feed back into the objective.

use thiserror::Error;

use crate::{
    curve::GradationCurve,
    reference::Band,
    sieve::{DomainError, Sieve},
};

/// Sieve separating the coarse fraction `Q` from the intermediate fraction.
pub const COARSE_SIEVE: Sieve = Sieve::ThreeEighthInch;

/// Sieve separating the intermediate fraction `I` from the fines.
pub const FINE_SIEVE: Sieve = Sieve::No8;

/// Zone 1 of the coarseness factor chart as `(CF, Wadj)` vertices.
pub const ZONE1_POLYGON: [(f64, f64); 7] = [
    (100.0, 27.0),
    (85.0, 27.0),
    (15.0, 37.0),
    (0.0, 37.0),
    (0.0, 45.0),
    (35.0, 45.0),
    (100.0, 36.0),
];

/// Allowed range for the percent retained from #30 to #200.
pub const FINE_FRACTION_LIMITS: Band = Band {
    lower: 24.0,
    upper: 34.0,
};

/// Minimum percent retained from ¾" to #16.
pub const COARSE_FRACTION_MIN: f64 = 15.0;

/// Distance from an edge within which a point counts as on the boundary.
const EDGE_TOL: f64 = 1e-9;

/// Chart coordinates bounding the optimal region.
const ROCKY_CF: f64 = 75.0;
const SANDY_CF: f64 = 45.0;
const OVERDESIGNED_WADJ: f64 = 45.0;
const LOW_WORKABILITY_WADJ: f64 = 27.0;

/// Coarseness factor from percent passing at the coarse and fine sieves.
///
/// With `Q = 100 - coarse` and `I = coarse - fine`, returns `100 Q / (Q + I)`.
/// When `Q + I` is not positive the factor is undefined and 0 is returned.
#[must_use]
pub fn coarseness_factor_from_passing(passing_coarse: f64, passing_fine: f64) -> f64 {
    let q = 100.0 - passing_coarse;
    let i = passing_coarse - passing_fine;
    if q + i <= 0.0 {
        tracing::warn!(q, i, "coarseness factor is undefined, using 0");
        return 0.0;
    }
    100.0 * q / (q + i)
}

/// Returns `true` when the coarseness factor at these passings is undefined.
#[must_use]
pub fn is_coarseness_degenerate(passing_coarse: f64, passing_fine: f64) -> bool {
    let q = 100.0 - passing_coarse;
    let i = passing_coarse - passing_fine;
    q + i <= 0.0
}

/// Coarseness factor of a composite using the given sieves.
///
/// # Errors
///
/// Returns [`DomainError::NotCoarser`] unless `coarse` is coarser than `fine`.
pub fn coarseness_factor(
    composite: &GradationCurve,
    coarse: Sieve,
    fine: Sieve,
) -> Result<f64, DomainError> {
    if !coarse.is_coarser_than(fine) {
        return Err(DomainError::NotCoarser { coarse, fine });
    }
    Ok(coarseness_factor_from_passing(
        composite.percent_passing(coarse),
        composite.percent_passing(fine),
    ))
}

/// Workability factor: percent passing the given sieve (normally #8).
#[must_use]
pub fn workability_factor(composite: &GradationCurve, sieve: Sieve) -> f64 {
    composite.percent_passing(sieve)
}

/// Correction to the workability factor for cement content in kg/m³.
#[must_use]
pub fn cement_adjustment(cement_kg_m3: f64) -> f64 {
    0.0588 * cement_kg_m3 - 19.647
}

/// Workability factor corrected for cement content in kg/m³.
#[must_use]
pub fn adjusted_workability_factor(workability: f64, cement_kg_m3: f64) -> f64 {
    workability + cement_adjustment(cement_kg_m3)
}

/// Whether a chart point lies in Zone 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum ZoneClassification {
    InZone1,
    OutsideZone1,
}

/// Tests `(cf, wadj)` against [`ZONE1_POLYGON`], boundary included.
#[must_use]
pub fn zone_membership(cf: f64, wadj: f64) -> ZoneClassification {
    if polygon_contains(&ZONE1_POLYGON, (cf, wadj)) {
        ZoneClassification::InZone1
    } else {
        ZoneClassification::OutsideZone1
    }
}

fn polygon_contains(polygon: &[(f64, f64)], point: (f64, f64)) -> bool {
    let (px, py) = point;
    if !px.is_finite() || !py.is_finite() {
        return false;
    }

    let edges = polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .take(polygon.len());

    let mut inside = false;
    for (&(x1, y1), &(x2, y2)) in edges {
        if on_segment((x1, y1), (x2, y2), point) {
            return true;
        }
        if (y1 > py) != (y2 > py) {
            let x_cross = x1 + (py - y1) * (x2 - x1) / (y2 - y1);
            if px < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

fn on_segment(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> bool {
    let cross = (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0);
    let length = (b.0 - a.0).hypot(b.1 - a.1);
    if cross.abs() > EDGE_TOL * length.max(1.0) {
        return false;
    }
    p.0 >= a.0.min(b.0) - EDGE_TOL
        && p.0 <= a.0.max(b.0) + EDGE_TOL
        && p.1 >= a.1.min(b.1) - EDGE_TOL
        && p.1 <= a.1.max(b.1) + EDGE_TOL
}

/// Finer reading of the chart, naming the problem when outside Zone 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum ShilstoneZone {
    /// Inside Zone 1.
    Optimal,
    /// Outside Zone 1 but within the chart's working limits.
    Transition,
    /// Coarseness factor above 75: gap graded, prone to segregation.
    Rocky,
    /// Coarseness factor below 45: high water demand.
    Sandy,
    /// Adjusted workability above 45: excess fines.
    Overdesigned,
    /// Adjusted workability below 27: too few fines for cohesion.
    LowWorkability,
}

impl ShilstoneZone {
    /// Classifies a chart point.
    ///
    /// Workability limits take precedence over coarseness limits when both
    /// are exceeded.
    #[must_use]
    pub fn classify(cf: f64, wadj: f64) -> Self {
        if zone_membership(cf, wadj) == ZoneClassification::InZone1 {
            Self::Optimal
        } else if wadj > OVERDESIGNED_WADJ {
            Self::Overdesigned
        } else if wadj < LOW_WORKABILITY_WADJ {
            Self::LowWorkability
        } else if cf > ROCKY_CF {
            Self::Rocky
        } else if cf < SANDY_CF {
            Self::Sandy
        } else {
            Self::Transition
        }
    }

    /// Corrective actions for a blend in this zone.
    ///
    /// Acceptable zones get a single confirmation instead.
    #[must_use]
    pub fn recommendations(self) -> &'static [&'static str] {
        match self {
            Self::Optimal | Self::Transition => &["The blend lies in an acceptable zone"],
            Self::Rocky => &[
                "Increase the fines (sand) content",
                "Consider a smaller maximum aggregate size",
            ],
            Self::Sandy => &[
                "Increase the coarse aggregate content",
                "Reduce the fines content",
            ],
            Self::Overdesigned => &["Reduce the share passing the #8 sieve"],
            Self::LowWorkability => &[
                "Increase the fine sand content",
                "Check the grading of the fine aggregate",
            ],
        }
    }
}

/// Percent retained from #30 through #200.
#[must_use]
pub fn fine_fraction(composite: &GradationCurve) -> f64 {
    [Sieve::No30, Sieve::No50, Sieve::No100, Sieve::No200]
        .into_iter()
        .map(|sieve| composite.retained_on(sieve))
        .sum()
}

/// Percent retained from ¾" through #16.
#[must_use]
pub fn coarse_fraction(composite: &GradationCurve) -> f64 {
    [
        Sieve::ThreeQuarterInch,
        Sieve::HalfInch,
        Sieve::ThreeEighthInch,
        Sieve::No4,
        Sieve::No8,
        Sieve::No16,
    ]
    .into_iter()
    .map(|sieve| composite.retained_on(sieve))
    .sum()
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum MortarError {
    #[error("{name} density must be finite and positive, got {value}")]
    Density { name: &'static str, value: f64 },
}

/// Inputs for the mortar factor, per cubic metre of concrete.
///
/// Densities may be given in kg/l or kg/m³; values above 100 are read as
/// kg/m³ and converted.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct MortarInputs {
    pub cement_kg: f64,
    pub cement_density: f64,
    /// Percent of the combined aggregate passing #8.
    pub passing_no8: f64,
    pub aggregate_kg: f64,
    /// Saturated surface-dry density of the sand.
    pub sand_density: f64,
    pub water_l: f64,
    pub admixtures_l: f64,
    pub air_l: f64,
}

/// Mortar volume in litres per cubic metre.
///
/// Sums the cement paste, the aggregate finer than #8, water, admixtures, and air.
///
/// # Errors
///
/// Returns an error if a density is not finite and positive.
pub fn mortar_factor(inputs: &MortarInputs) -> Result<f64, MortarError> {
    let cement_density = density_kg_per_l("cement", inputs.cement_density)?;
    let sand_density = density_kg_per_l("sand", inputs.sand_density)?;

    let cement_volume = inputs.cement_kg / cement_density;
    let fines_volume = inputs.passing_no8 / 100.0 * inputs.aggregate_kg / sand_density;

    Ok(cement_volume + fines_volume + inputs.water_l + inputs.admixtures_l + inputs.air_l)
}

fn density_kg_per_l(name: &'static str, value: f64) -> Result<f64, MortarError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(MortarError::Density { name, value });
    }
    Ok(if value > 100.0 { value / 1000.0 } else { value })
}

/// Shilstone diagnostics for one composite and cement content.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct ShilstoneReport {
    pub coarseness_factor: f64,
    pub workability_factor: f64,
    pub adjusted_workability_factor: f64,
    pub zone: ZoneClassification,
    pub detailed_zone: ShilstoneZone,
    /// Set when the coarseness factor was undefined and reported as 0.
    pub degenerate_coarseness: bool,
}

/// Computes the full set of Shilstone diagnostics on the standard sieves.
#[must_use]
pub fn analyze(composite: &GradationCurve, cement_kg_m3: f64) -> ShilstoneReport {
    let passing_coarse = composite.percent_passing(COARSE_SIEVE);
    let passing_fine = composite.percent_passing(FINE_SIEVE);

    let cf = coarseness_factor_from_passing(passing_coarse, passing_fine);
    let w = workability_factor(composite, FINE_SIEVE);
    let wadj = adjusted_workability_factor(w, cement_kg_m3);

    ShilstoneReport {
        coarseness_factor: cf,
        workability_factor: w,
        adjusted_workability_factor: wadj,
        zone: zone_membership(cf, wadj),
        detailed_zone: ShilstoneZone::classify(cf, wadj),
        degenerate_coarseness: is_coarseness_degenerate(passing_coarse, passing_fine),
    }
}
