//! ASTM C33 "haystack" limits on percent passing.

use crate::{curve::GradationCurve, reference::Band, sieve::Sieve};

/// Passing limits in percent, coarsest sieve first. `None` means unrestricted.
const HAYSTACK_LIMITS: [Option<(f64, f64)>; Sieve::COUNT] = [
    Some((100.0, 100.0)),
    Some((95.0, 100.0)),
    None,
    None,
    None,
    None,
    None,
    None,
    Some((50.0, 85.0)),
    Some((25.0, 60.0)),
    Some((10.0, 30.0)),
    Some((2.0, 10.0)),
    Some((0.0, 5.0)),
];

/// Limits on percent passing at the sieves the haystack restricts.
#[must_use]
pub fn haystack_limit(sieve: Sieve) -> Option<Band> {
    HAYSTACK_LIMITS[sieve.index()].map(|(lower, upper)| Band::new(lower, upper))
}

/// Passing values outside the haystack, as `(sieve, passing, limits)`.
pub fn haystack_violations(
    composite: &GradationCurve,
) -> impl Iterator<Item = (Sieve, f64, Band)> + '_ {
    composite.iter().filter_map(|(sieve, passing)| {
        haystack_limit(sieve)
            .filter(|band| !band.contains(passing))
            .map(|band| (sieve, passing, band))
    })
}

/// Sum of squared distances of passing values outside the haystack.
#[must_use]
pub fn haystack_penalty(composite: &GradationCurve) -> f64 {
    haystack_violations(composite)
        .map(|(_, passing, band)| band.distance(passing).powi(2))
        .sum()
}
