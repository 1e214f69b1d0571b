use log::debug;

use crate::config::{GridError, Orientation};

/// One student, after orientation normalization.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CanonicalRow {
    /// 0-based index of the student line in the original grid (row index for
    /// row-oriented sheets, column index for column-oriented ones).
    pub source_index: usize,
    /// Cells keyed by header position. Padded to the width of the header.
    pub cells: Vec<String>,
}

impl CanonicalRow {
    /// The 1-based position shown to users.
    pub fn row_number(&self) -> usize {
        self.source_index + 1
    }

    /// The content of a cell, empty when the index is out of range.
    pub fn cell(&self, idx: usize) -> &str {
        self.cells.get(idx).map(|s| s.as_str()).unwrap_or("")
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NormalizedGrid {
    pub headers: Vec<String>,
    pub rows: Vec<CanonicalRow>,
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Turns columns into rows. Short rows are padded with empty cells.
pub fn transpose(raw: &[Vec<String>]) -> Vec<Vec<String>> {
    let width = raw.iter().map(|r| r.len()).max().unwrap_or(0);
    (0..width)
        .map(|col| {
            raw.iter()
                .map(|r| r.get(col).cloned().unwrap_or_default())
                .collect()
        })
        .collect()
}

/// Produces the canonical row-per-student table.
///
/// With `Orientation::Columns`, column 0 holds the field names and every other
/// column is one student. The header is the first line that is not blank. In
/// both layouts, student lines that are entirely blank are dropped.
pub fn normalize(
    raw: &[Vec<String>],
    orientation: Orientation,
) -> Result<NormalizedGrid, GridError> {
    if raw.iter().all(|r| r.iter().all(|c| is_blank(c))) {
        return Err(GridError::Empty);
    }

    let lines: Vec<Vec<String>> = match orientation {
        Orientation::Rows => raw.to_vec(),
        Orientation::Columns => transpose(raw),
    };

    // Blank lines above the header are skipped. Student lines keep their
    // position in the original grid.
    let header_idx = lines
        .iter()
        .position(|l| !l.iter().all(|c| is_blank(c)))
        .ok_or(GridError::Empty)?;
    let header = &lines[header_idx];
    let body = &lines[header_idx + 1..];

    // Field names are counted the same way in both layouts.
    let headers: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
    let meaningful = headers.iter().filter(|h| !h.is_empty()).count();
    if meaningful < 2 {
        return Err(GridError::TooFewColumns { found: meaningful });
    }

    let mut rows: Vec<CanonicalRow> = Vec::new();
    for (idx, line) in body.iter().enumerate() {
        let source_index = header_idx + 1 + idx;
        if line.iter().all(|c| is_blank(c)) {
            debug!("normalize: dropping blank student line {}", source_index + 1);
            continue;
        }
        let mut cells = line.clone();
        if cells.len() < headers.len() {
            cells.resize(headers.len(), String::new());
        }
        rows.push(CanonicalRow {
            source_index,
            cells,
        });
    }

    if rows.is_empty() {
        return Err(GridError::NoStudentData);
    }
    debug!(
        "normalize: {:?}: {} headers, {} students",
        orientation,
        headers.len(),
        rows.len()
    );
    Ok(NormalizedGrid { headers, rows })
}
