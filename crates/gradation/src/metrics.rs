//! Scores a composite curve against the reference targets.

use crate::{
    curve::GradationCurve,
    reference::{ReferenceCurves, TarantulaBand},
    sieve::Sieve,
};

/// Mean deviation (percentage points) beyond which a region needs adjusting.
const DEVIATION_LIMIT: f64 = 5.0;

/// Sieves treated as the coarse region when assessing deviations.
const COARSE_REGION: [Sieve; 6] = [
    Sieve::TwoInch,
    Sieve::OneAndHalfInch,
    Sieve::OneInch,
    Sieve::ThreeQuarterInch,
    Sieve::HalfInch,
    Sieve::ThreeEighthInch,
];

/// Sieves treated as the fine region when assessing deviations.
const FINE_REGION: [Sieve; 4] = [Sieve::No30, Sieve::No50, Sieve::No100, Sieve::No200];

/// The two error terms and their weighted combination.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorScore {
    pub power45: f64,
    pub tarantula: f64,
    /// `power45 + lambda * tarantula`.
    pub combined: f64,
}

/// Sum of squared differences between the composite and the ideal curve.
#[must_use]
pub fn power45_error(composite: &GradationCurve, ideal: &GradationCurve) -> f64 {
    composite
        .values()
        .iter()
        .zip(ideal.values())
        .map(|(c, i)| (c - i).powi(2))
        .sum()
}

/// Squared distance of each retained percentage outside its Tarantula band.
///
/// The material retained on each sieve is checked against that sieve's band,
/// and the material that does not pass the top sieve against the top band.
/// Values inside or on the band contribute nothing.
#[must_use]
pub fn tarantula_error(composite: &GradationCurve, band: &TarantulaBand) -> f64 {
    Sieve::ALL
        .into_iter()
        .map(|sieve| band.get(sieve).distance(composite.retained_on(sieve)).powi(2))
        .sum()
}

/// Scores a composite against both references with Tarantula weight `lambda`.
#[must_use]
pub fn combined_error(composite: &GradationCurve, refs: &ReferenceCurves, lambda: f64) -> ErrorScore {
    let power45 = power45_error(composite, refs.ideal());
    let tarantula = tarantula_error(composite, refs.tarantula());
    ErrorScore {
        power45,
        tarantula,
        combined: power45 + lambda * tarantula,
    }
}

/// Root-mean-square deviation from the ideal curve over all sieves.
#[must_use]
pub fn rmse(composite: &GradationCurve, ideal: &GradationCurve) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let n = Sieve::COUNT as f64;
    (power45_error(composite, ideal) / n).sqrt()
}

/// Overall grade of a gradation by its RMSE against the ideal curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum GradationQuality {
    /// RMSE below 5.
    Excellent,
    /// RMSE below 10.
    Good,
    /// RMSE below 15.
    Fair,
    Poor,
}

impl GradationQuality {
    #[must_use]
    pub fn from_rmse(rmse: f64) -> Self {
        if rmse < 5.0 {
            Self::Excellent
        } else if rmse < 10.0 {
            Self::Good
        } else if rmse < 15.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// Suggested correction for a region that strays from the ideal curve.
///
/// Deviations are composite passing minus ideal passing, averaged over the
/// region. Positive means the composite is finer than the ideal there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum Adjustment {
    /// Coarse deviation above +5: too much passes the coarse sieves.
    IncreaseCoarse,
    /// Coarse deviation below -5: too much is retained on the coarse sieves.
    ReduceCoarse,
    /// Fine deviation below -5.
    IncreaseFines,
    /// Fine deviation above +5.
    ReduceFines,
    Keep,
}

/// How closely a composite follows the ideal curve, and what to change.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct GradationAssessment {
    pub squared_error: f64,
    pub rmse: f64,
    pub quality: GradationQuality,
    /// Mean signed deviation (composite minus ideal) over 2" to ⅜".
    pub coarse_deviation: f64,
    /// Mean signed deviation over #30 to #200.
    pub fine_deviation: f64,
    /// Never empty; holds [`Adjustment::Keep`] alone when nothing needs changing.
    pub adjustments: Vec<Adjustment>,
}

/// Grades a composite against the ideal curve.
///
/// Deviations are in percent passing, so a positive value means the blend is
/// finer than ideal over that region: more coarse aggregate is needed when
/// the coarse region passes too much, fewer fines when the fine region does.
#[must_use]
pub fn assess_gradation(composite: &GradationCurve, ideal: &GradationCurve) -> GradationAssessment {
    let squared_error = power45_error(composite, ideal);
    let rmse = rmse(composite, ideal);

    let mean_deviation = |sieves: &[Sieve]| -> f64 {
        let total: f64 = sieves
            .iter()
            .map(|s| composite.percent_passing(*s) - ideal.percent_passing(*s))
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let n = sieves.len() as f64;
        total / n
    };
    let coarse_deviation = mean_deviation(&COARSE_REGION);
    let fine_deviation = mean_deviation(&FINE_REGION);

    let mut adjustments = Vec::new();
    if coarse_deviation > DEVIATION_LIMIT {
        adjustments.push(Adjustment::IncreaseCoarse);
    } else if coarse_deviation < -DEVIATION_LIMIT {
        adjustments.push(Adjustment::ReduceCoarse);
    }
    if fine_deviation > DEVIATION_LIMIT {
        adjustments.push(Adjustment::ReduceFines);
    } else if fine_deviation < -DEVIATION_LIMIT {
        adjustments.push(Adjustment::IncreaseFines);
    }
    if adjustments.is_empty() {
        adjustments.push(Adjustment::Keep);
    }

    GradationAssessment {
        squared_error,
        rmse,
        quality: GradationQuality::from_rmse(rmse),
        coarse_deviation,
        fine_deviation,
        adjustments,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn curve(passing: [f64; Sieve::COUNT]) -> GradationCurve {
        GradationCurve::new(passing).unwrap()
    }

    fn ideal() -> GradationCurve {
        *ReferenceCurves::new(25.0).unwrap().ideal()
    }

    #[test]
    fn power45_error_is_zero_against_itself() {
        let c = ideal();
        assert_relative_eq!(power45_error(&c, &c), 0.0);

        let other = curve([
            100.0, 100.0, 90.0, 80.0, 60.0, 50.0, 40.0, 30.0, 20.0, 15.0, 10.0, 5.0, 2.0,
        ]);
        assert!(power45_error(&other, &c) > 0.0);
    }

    #[test]
    fn tarantula_error_is_zero_inside_and_on_band() {
        let band = TarantulaBand::standard(25.0);

        // Retained: 0, 0, 10, 20 (upper), 15, 10, 10, 12 (upper), 5, 4 (lower), 4, 5, 3.
        let inside = curve([
            100.0, 100.0, 90.0, 70.0, 55.0, 45.0, 35.0, 23.0, 18.0, 14.0, 10.0, 5.0, 2.0,
        ]);
        assert_relative_eq!(tarantula_error(&inside, &band), 0.0);
    }

    #[test]
    fn tarantula_error_is_positive_outside_band() {
        let band = TarantulaBand::standard(25.0);

        // 30% retained on 3/4" exceeds the 20% limit by 10.
        let outside = curve([
            100.0, 100.0, 90.0, 60.0, 50.0, 40.0, 30.0, 20.0, 15.0, 11.0, 7.0, 3.0, 1.0,
        ]);
        let error = tarantula_error(&outside, &band);
        assert!(error > 0.0);
        // Only 3/4" is outside: (30 - 20)² = 100. #30 and #50 sit on their 4% minimum.
        assert_relative_eq!(error, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn top_sieve_material_is_penalized() {
        let band = TarantulaBand::standard(25.0);

        // 3% does not pass the 2" sieve, whose band is [0, 0].
        let mut passing = [
            100.0, 100.0, 90.0, 70.0, 55.0, 45.0, 35.0, 23.0, 18.0, 14.0, 10.0, 5.0, 2.0,
        ];
        passing[0] = 97.0;
        passing[1] = 97.0;
        assert_relative_eq!(tarantula_error(&curve(passing), &band), 9.0, epsilon = 1e-9);
    }

    #[test]
    fn combined_error_weights_tarantula() {
        let refs = ReferenceCurves::new(25.0).unwrap();
        let c = curve([
            100.0, 100.0, 90.0, 60.0, 50.0, 40.0, 30.0, 20.0, 15.0, 11.0, 7.0, 3.0, 1.0,
        ]);

        let score = combined_error(&c, &refs, 0.5);

        assert_relative_eq!(score.combined, score.power45 + 0.5 * score.tarantula);
        assert_relative_eq!(score.tarantula, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn quality_grades_follow_rmse() {
        assert_eq!(GradationQuality::from_rmse(0.0), GradationQuality::Excellent);
        assert_eq!(GradationQuality::from_rmse(5.0), GradationQuality::Good);
        assert_eq!(GradationQuality::from_rmse(12.0), GradationQuality::Fair);
        assert_eq!(GradationQuality::from_rmse(15.0), GradationQuality::Poor);
    }

    #[test]
    fn ideal_curve_needs_no_adjustment() {
        let assessment = assess_gradation(&ideal(), &ideal());

        assert_relative_eq!(assessment.rmse, 0.0);
        assert_eq!(assessment.quality, GradationQuality::Excellent);
        assert_eq!(assessment.adjustments, vec![Adjustment::Keep]);
    }

    #[test]
    fn sandy_blend_is_flagged() {
        let ideal = ideal();
        let sandy = curve([
            100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 95.0, 80.0, 62.0, 40.0, 17.0, 5.0, 1.5,
        ]);

        let assessment = assess_gradation(&sandy, &ideal);

        assert!(assessment.coarse_deviation > 5.0);
        assert!(assessment.fine_deviation > 5.0);
        assert_eq!(
            assessment.adjustments,
            vec![Adjustment::IncreaseCoarse, Adjustment::ReduceFines]
        );
        assert_eq!(assessment.quality, GradationQuality::Poor);
    }

    #[test]
    fn coarse_blend_is_flagged_the_other_way() {
        let ideal = ideal();
        let rocky = curve([
            100.0, 100.0, 95.0, 70.0, 35.0, 15.0, 3.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        ]);

        let assessment = assess_gradation(&rocky, &ideal);

        assert!(assessment.coarse_deviation < -5.0);
        assert!(assessment.fine_deviation < -5.0);
        assert_eq!(
            assessment.adjustments,
            vec![Adjustment::ReduceCoarse, Adjustment::IncreaseFines]
        );
    }
}
