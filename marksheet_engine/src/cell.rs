// All the possible contents of a mark cell, resolved once before scoring.

/// The marker for an absent student.
pub const ABSENT_MARKER: &str = "AB";

#[derive(PartialEq, Debug, Clone)]
pub enum CellValue {
    Number(f64),
    Blank,
    /// `AB`, in any case.
    Absent,
    /// Some content that is neither a number nor a known marker.
    Invalid(String),
}

impl CellValue {
    pub fn classify(raw: &str) -> CellValue {
        let s = raw.trim();
        if s.is_empty() {
            CellValue::Blank
        } else if s.eq_ignore_ascii_case(ABSENT_MARKER) {
            CellValue::Absent
        } else if let Some(x) = parse_number(s) {
            CellValue::Number(x)
        } else {
            CellValue::Invalid(s.to_string())
        }
    }
}

/// Reads a finite decimal number. `NaN` and infinities are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
}
