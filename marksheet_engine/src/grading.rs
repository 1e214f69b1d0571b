use crate::config::{Division, Grading};

/// Lowest percentage for each grade, highest first.
const GRADE_LADDER: [(f64, &str); 7] = [
    (91.0, "A1"),
    (81.0, "A2"),
    (71.0, "B1"),
    (61.0, "B2"),
    (51.0, "C1"),
    (41.0, "C2"),
    (33.0, "D"),
];

/// The grade below the last step of the ladder.
pub const LOWEST_GRADE: &str = "E";

// Tolerance for sums of fractional marks.
pub(crate) const MARK_EPSILON: f64 = 1e-9;

/// Rounds to 2 decimals, half away from zero.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// `obtained / max` as a percentage rounded to 2 decimals, 0 when `max` is 0.
pub fn percentage_of(obtained: f64, max: f64) -> f64 {
    if max <= 0.0 {
        0.0
    } else {
        round2(100.0 * obtained / max)
    }
}

/// The grade of a percentage. Used for subjects and for the overall result.
pub fn grade_for(percentage: f64) -> &'static str {
    GRADE_LADDER
        .iter()
        .find(|(threshold, _)| percentage >= *threshold)
        .map(|(_, grade)| *grade)
        .unwrap_or(LOWEST_GRADE)
}

/// The first division whose threshold is met or exceeded.
///
/// The divisions are expected to be sorted by decreasing threshold.
pub fn division_for(percentage: f64, grading: &Grading) -> Option<&Division> {
    grading
        .divisions
        .iter()
        .find(|d| percentage >= d.threshold_percent)
}
