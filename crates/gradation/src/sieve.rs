use std::{fmt, str::FromStr};

use thiserror::Error;

/// Absolute tolerance when matching an opening to a standard sieve.
const OPENING_TOL_MM: f64 = 1e-6;

/// Errors raised by queries outside the fixed sieve enumeration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("no standard sieve has an opening of {opening_mm} mm")]
    UnknownOpening { opening_mm: f64 },

    #[error("unrecognized sieve label `{0}`")]
    UnknownLabel(String),

    #[error("sieve {coarse} is not coarser than {fine}")]
    NotCoarser { coarse: Sieve, fine: Sieve },
}

/// One of the 13 standard ASTM E11 sieves, ordered from coarse to fine.
///
/// The derived ordering follows the sieve stack: `TwoInch < No200`, so a
/// sieve that compares less is the coarser one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-derive", serde(rename_all = "snake_case"))]
pub enum Sieve {
    TwoInch,
    OneAndHalfInch,
    OneInch,
    ThreeQuarterInch,
    HalfInch,
    ThreeEighthInch,
    No4,
    No8,
    No16,
    No30,
    No50,
    No100,
    No200,
}

const OPENINGS_MM: [f64; Sieve::COUNT] = [
    50.0, 37.5, 25.0, 19.0, 12.5, 9.5, 4.75, 2.36, 1.18, 0.60, 0.30, 0.15, 0.075,
];

const LABELS: [&str; Sieve::COUNT] = [
    "2\"", "1½\"", "1\"", "¾\"", "½\"", "⅜\"", "#4", "#8", "#16", "#30", "#50", "#100", "#200",
];

/// Extra spellings accepted by [`Sieve::from_str`], after normalization.
const ALIASES: &[(&str, Sieve)] = &[
    ("2in", Sieve::TwoInch),
    ("11/2in", Sieve::OneAndHalfInch),
    ("1-1/2in", Sieve::OneAndHalfInch),
    ("1.5in", Sieve::OneAndHalfInch),
    ("1in", Sieve::OneInch),
    ("3/4in", Sieve::ThreeQuarterInch),
    ("0.75in", Sieve::ThreeQuarterInch),
    ("1/2in", Sieve::HalfInch),
    ("0.5in", Sieve::HalfInch),
    ("3/8in", Sieve::ThreeEighthInch),
    ("0.375in", Sieve::ThreeEighthInch),
];

impl Sieve {
    /// Number of sieves in the enumeration.
    pub const COUNT: usize = 13;

    /// Every sieve, coarsest first.
    pub const ALL: [Sieve; Sieve::COUNT] = [
        Sieve::TwoInch,
        Sieve::OneAndHalfInch,
        Sieve::OneInch,
        Sieve::ThreeQuarterInch,
        Sieve::HalfInch,
        Sieve::ThreeEighthInch,
        Sieve::No4,
        Sieve::No8,
        Sieve::No16,
        Sieve::No30,
        Sieve::No50,
        Sieve::No100,
        Sieve::No200,
    ];

    /// Position in the stack, 0 for the coarsest sieve.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Nominal opening in millimetres.
    #[must_use]
    pub fn opening_mm(self) -> f64 {
        OPENINGS_MM[self.index()]
    }

    /// Conventional label, e.g. `⅜"` or `#8`.
    #[must_use]
    pub fn label(self) -> &'static str {
        LABELS[self.index()]
    }

    /// Resolves an opening in millimetres to its standard sieve.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnknownOpening`] if no sieve has that opening.
    pub fn from_opening_mm(opening_mm: f64) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|sieve| (sieve.opening_mm() - opening_mm).abs() <= OPENING_TOL_MM)
            .ok_or(DomainError::UnknownOpening { opening_mm })
    }

    /// Returns `true` if this sieve has a larger opening than `other`.
    #[must_use]
    pub fn is_coarser_than(self, other: Sieve) -> bool {
        self < other
    }

    /// The next sieve down the stack, if any.
    #[must_use]
    pub fn finer(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// The next sieve up the stack, if any.
    #[must_use]
    pub fn coarser(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }
}

impl fmt::Display for Sieve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sieve {
    type Err = DomainError;

    /// Parses `⅜"`, `3/8in`, `3/8 in`, `#8`, `No. 8`, `N°8`, or an opening
    /// such as `9.5mm`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);

        if let Some(sieve) = Self::ALL
            .into_iter()
            .find(|sieve| normalize(sieve.label()) == key)
        {
            return Ok(sieve);
        }
        if let Some((_, sieve)) = ALIASES.iter().find(|(alias, _)| *alias == key) {
            return Ok(*sieve);
        }
        if let Some(mm) = key.strip_suffix("mm").and_then(|n| n.parse::<f64>().ok()) {
            return Self::from_opening_mm(mm);
        }

        Err(DomainError::UnknownLabel(s.to_owned()))
    }
}

fn normalize(label: &str) -> String {
    let compact: String = label
        .trim()
        .to_lowercase()
        .replace(['"', '”', '″'], "in")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    for prefix in ["no.", "n°", "nº", "no"] {
        if let Some(rest) = compact.strip_prefix(prefix) {
            if rest.starts_with(|c: char| c.is_ascii_digit()) {
                return format!("#{rest}");
            }
        }
    }
    compact
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_is_ordered_coarse_to_fine() {
        for pair in Sieve::ALL.windows(2) {
            assert!(pair[0].is_coarser_than(pair[1]));
            assert!(pair[0].opening_mm() > pair[1].opening_mm());
            assert_eq!(pair[0].finer(), Some(pair[1]));
            assert_eq!(pair[1].coarser(), Some(pair[0]));
        }
        assert_eq!(Sieve::TwoInch.coarser(), None);
        assert_eq!(Sieve::No200.finer(), None);
    }

    #[test]
    fn resolves_openings() {
        assert_eq!(Sieve::from_opening_mm(9.5), Ok(Sieve::ThreeEighthInch));
        assert_eq!(Sieve::from_opening_mm(0.6), Ok(Sieve::No30));
        assert_eq!(
            Sieve::from_opening_mm(10.0),
            Err(DomainError::UnknownOpening { opening_mm: 10.0 })
        );
    }

    #[test]
    fn parses_common_labels() {
        let cases = [
            ("⅜\"", Sieve::ThreeEighthInch),
            ("3/8in", Sieve::ThreeEighthInch),
            ("3/8 in", Sieve::ThreeEighthInch),
            ("1 1/2\"", Sieve::OneAndHalfInch),
            ("#8", Sieve::No8),
            ("No. 8", Sieve::No8),
            ("N°200", Sieve::No200),
            ("no4", Sieve::No4),
            ("4.75mm", Sieve::No4),
            ("2\"", Sieve::TwoInch),
        ];

        for (label, expected) in cases {
            assert_eq!(label.parse::<Sieve>(), Ok(expected), "label {label}");
        }
    }

    #[test]
    fn rejects_unknown_labels() {
        assert!(matches!(
            "#10".parse::<Sieve>(),
            Err(DomainError::UnknownLabel(_))
        ));
        assert!(matches!(
            "7mm".parse::<Sieve>(),
            Err(DomainError::UnknownOpening { .. })
        ));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for sieve in Sieve::ALL {
            assert_eq!(sieve.to_string().parse::<Sieve>(), Ok(sieve));
        }
    }
}
