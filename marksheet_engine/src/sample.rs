use crate::config::{Orientation, TemplateSchema};
use crate::grid::transpose;

/// The headers a mark-sheet needs for this template, identity fields first.
/// Unmapped components have no column and are left out.
pub fn sample_headers(schema: &TemplateSchema) -> Vec<String> {
    schema.column_headers()
}

/// A blank input grid for the template, with room for `blank_students` students.
pub fn sample_grid(
    schema: &TemplateSchema,
    orientation: Orientation,
    blank_students: usize,
) -> Vec<Vec<String>> {
    let headers = sample_headers(schema);
    let width = headers.len();
    let mut rows: Vec<Vec<String>> = vec![headers];
    for _ in 0..blank_students {
        rows.push(vec![String::new(); width]);
    }
    match orientation {
        Orientation::Rows => rows,
        Orientation::Columns => transpose(&rows),
    }
}
