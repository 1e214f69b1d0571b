mod augment;
pub mod builder;
mod cell;
mod config;
pub mod grading;
mod grid;
mod headers;
pub mod manual;
mod sample;
mod schema;

use chrono::NaiveDate;
use log::{debug, info, warn};
use std::collections::BTreeMap;

pub use crate::augment::augment_schema;
pub use crate::cell::{parse_number, CellValue, ABSENT_MARKER};
pub use crate::config::*;
pub use crate::grid::{normalize, transpose, CanonicalRow, NormalizedGrid};
pub use crate::headers::{build_header_index, lookup, missing_columns, HeaderIndex};
pub use crate::sample::{sample_grid, sample_headers};
pub use crate::schema::DEFAULT_COMPONENT;

use crate::grading::{division_for, grade_for, percentage_of, MARK_EPSILON};

/// The date format used when an identity field does not declare one.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

// **** Private structures ****

// The diagnostics of one student line. Nothing here stops the processing of the row.
struct RowContext {
    row_number: usize,
    diagnostics: Vec<Diagnostic>,
}

impl RowContext {
    fn new(row_number: usize) -> RowContext {
        RowContext {
            row_number,
            diagnostics: Vec::new(),
        }
    }

    fn push(
        &mut self,
        severity: Severity,
        kind: DiagnosticKind,
        locus: Locus,
        field: &str,
        message: String,
    ) {
        debug!(
            "row {}: {:?} {:?} {}: {}",
            self.row_number, severity, kind, field, message
        );
        self.diagnostics.push(Diagnostic {
            severity,
            kind,
            locus,
            field: field.to_string(),
            message,
        });
    }

    fn row_error(&mut self, kind: DiagnosticKind, field: &str, message: String) {
        let locus = Locus::Row(self.row_number);
        self.push(Severity::Error, kind, locus, field, message);
    }

    fn row_warning(&mut self, kind: DiagnosticKind, field: &str, message: String) {
        let locus = Locus::Row(self.row_number);
        self.push(Severity::Warning, kind, locus, field, message);
    }

    fn cell_error(&mut self, kind: DiagnosticKind, column: &str, field: &str, message: String) {
        let locus = self.cell(column);
        self.push(Severity::Error, kind, locus, field, message);
    }

    fn cell_warning(&mut self, kind: DiagnosticKind, column: &str, field: &str, message: String) {
        let locus = self.cell(column);
        self.push(Severity::Warning, kind, locus, field, message);
    }

    fn cell(&self, column: &str) -> Locus {
        Locus::Cell {
            row: self.row_number,
            column: column.to_string(),
        }
    }

    fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// Validates a raw mark-sheet against a template and computes the results.
///
/// Arguments:
/// * `raw` the cells as read from the file, one vector per line of the sheet
/// * `orientation` whether students are laid out in rows or in columns
/// * `schema` the template of the class. It is expected to pass
///   [`TemplateSchema::check`]; the engine does not check it again.
///
/// Problems with individual students never stop the processing: they are
/// returned as diagnostics and the student is flagged with
/// `has_blocking_errors`. A sheet that holds no student at all gives a single
/// `StructuralError` at row 0 and no record.
pub fn parse(
    raw: &[Vec<String>],
    orientation: Orientation,
    schema: &TemplateSchema,
) -> ParseOutcome {
    info!(
        "parse: template {:?}: {} lines, orientation {:?}",
        schema.name,
        raw.len(),
        orientation
    );

    let grid = match normalize(raw, orientation) {
        Ok(g) => g,
        Err(e) => {
            warn!("parse: unusable sheet: {}", e);
            return ParseOutcome {
                records: Vec::new(),
                errors: vec![Diagnostic {
                    severity: Severity::Error,
                    kind: DiagnosticKind::StructuralError,
                    locus: Locus::Row(0),
                    field: String::new(),
                    message: e.to_string(),
                }],
                warnings: Vec::new(),
            };
        }
    };

    let index = build_header_index(&grid.headers);
    let mut outcome = ParseOutcome::default();
    for row in grid.rows.iter() {
        let mut ctx = RowContext::new(row.row_number());
        let record = process_row(row, &index, schema, &mut ctx);
        for d in ctx.diagnostics {
            match d.severity {
                Severity::Error => outcome.errors.push(d),
                Severity::Warning => outcome.warnings.push(d),
            }
        }
        outcome.records.push(record);
    }

    info!(
        "parse: {} students, {} blocked, {} errors, {} warnings",
        outcome.records.len(),
        outcome
            .records
            .iter()
            .filter(|r| r.has_blocking_errors)
            .count(),
        outcome.errors.len(),
        outcome.warnings.len()
    );
    outcome
}

fn process_row(
    row: &CanonicalRow,
    index: &HeaderIndex,
    schema: &TemplateSchema,
    ctx: &mut RowContext,
) -> StudentRecord {
    let (identity, complete) = extract_identity(row, index, schema, ctx);
    if !complete {
        // Without all its identity columns, the row cannot be attributed: stop here.
        return StudentRecord {
            row_number: ctx.row_number,
            identity,
            subject_scores: BTreeMap::new(),
            selected_subjects: Vec::new(),
            aggregate: incomplete_aggregate(),
            has_blocking_errors: true,
        };
    }

    let selected = select_subjects(row, index, schema, ctx);

    let mut subject_scores: BTreeMap<String, SubjectScore> = BTreeMap::new();
    for subject in selected.iter() {
        let score = score_subject(row, index, subject, &schema.grading, ctx);
        subject_scores.insert(subject.key.clone(), score);
    }

    check_choice_groups(&selected, schema, ctx);
    let aggregate = compute_aggregate(&selected, &subject_scores, &schema.grading);

    StudentRecord {
        row_number: ctx.row_number,
        identity,
        subject_scores,
        selected_subjects: selected.iter().map(|s| s.key.clone()).collect(),
        aggregate,
        has_blocking_errors: ctx.has_errors(),
    }
}

// Phase A.
// Returns the coerced values and whether all the required columns were found.
fn extract_identity(
    row: &CanonicalRow,
    index: &HeaderIndex,
    schema: &TemplateSchema,
    ctx: &mut RowContext,
) -> (BTreeMap<String, IdentityValue>, bool) {
    let mut identity: BTreeMap<String, IdentityValue> = BTreeMap::new();
    // A missing optional column is not an error.
    let missing = missing_columns(
        index,
        schema
            .identity_fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.header.as_str()),
    );

    for field in schema.identity_fields.iter() {
        let col = match lookup(index, &field.header) {
            Some(c) => c,
            None => continue,
        };
        let raw = row.cell(col).trim();
        if raw.is_empty() {
            if field.required {
                ctx.cell_error(
                    DiagnosticKind::EmptyRequiredField,
                    &field.header,
                    &field.key,
                    format!("{} is empty", field.label),
                );
            }
            identity.insert(field.key.clone(), IdentityValue::Text(String::new()));
            continue;
        }
        let value = match field.field_type {
            FieldType::String => IdentityValue::Text(raw.to_string()),
            FieldType::Number => match parse_number(raw) {
                Some(x) => IdentityValue::Number(x),
                None => {
                    ctx.cell_error(
                        DiagnosticKind::TypeMismatch,
                        &field.header,
                        &field.key,
                        format!("{} should be a number, found {:?}", field.label, raw),
                    );
                    IdentityValue::Text(raw.to_string())
                }
            },
            FieldType::Date => {
                let fmt = field.date_format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT);
                match NaiveDate::parse_from_str(raw, fmt) {
                    Ok(d) => IdentityValue::Date(d),
                    Err(_) => {
                        ctx.cell_error(
                            DiagnosticKind::TypeMismatch,
                            &field.header,
                            &field.key,
                            format!(
                                "{} should be a date in the format {:?}, found {:?}",
                                field.label, fmt, raw
                            ),
                        );
                        IdentityValue::Text(raw.to_string())
                    }
                }
            }
        };
        identity.insert(field.key.clone(), value);
    }

    if !missing.is_empty() {
        ctx.row_error(
            DiagnosticKind::MissingColumn,
            "identity",
            format!("missing columns: {}", missing.join(", ")),
        );
    }
    (identity, missing.is_empty())
}

// Phase B.
fn select_subjects<'a>(
    row: &CanonicalRow,
    index: &HeaderIndex,
    schema: &'a TemplateSchema,
    ctx: &mut RowContext,
) -> Vec<&'a Subject> {
    let mut selected: Vec<&Subject> = Vec::new();
    for subject in schema.subjects.iter() {
        // Unmapped components and unknown columns count as blank here.
        let all_blank = subject.components.iter().all(|c| {
            subject
                .column_for(c)
                .and_then(|h| lookup(index, h))
                .map(|idx| row.cell(idx).trim().is_empty())
                .unwrap_or(true)
        });
        match (subject.optional, all_blank) {
            (true, true) => {
                debug!("row {}: skipping optional subject {}", ctx.row_number, subject.key);
            }
            (false, true) => {
                ctx.row_error(
                    DiagnosticKind::RequiredSubjectBlank,
                    &subject.key,
                    format!("no marks for the required subject {}", subject.label),
                );
            }
            (_, false) => selected.push(subject),
        }
    }
    selected
}

// Phase C.
fn score_subject(
    row: &CanonicalRow,
    index: &HeaderIndex,
    subject: &Subject,
    grading: &Grading,
    ctx: &mut RowContext,
) -> SubjectScore {
    let mut components: Vec<(String, Option<f64>)> = Vec::new();

    for component in subject.components.iter() {
        let field = format!("{}.{}", subject.key, component);
        let header = match subject.column_for(component) {
            Some(h) => h,
            None => {
                ctx.row_warning(
                    DiagnosticKind::UnmappedComponent,
                    &field,
                    format!("{} {} has no column", subject.label, component),
                );
                components.push((component.clone(), None));
                continue;
            }
        };
        let col = match lookup(index, header) {
            Some(c) => c,
            None => {
                ctx.cell_error(
                    DiagnosticKind::ColumnNotFound,
                    header,
                    &field,
                    format!("column {:?} not found in the sheet", header),
                );
                components.push((component.clone(), None));
                continue;
            }
        };

        let value = match CellValue::classify(row.cell(col)) {
            CellValue::Blank => {
                ctx.cell_warning(
                    DiagnosticKind::BlankTreatedAsZero,
                    header,
                    &field,
                    format!("blank mark for {} {} counted as 0", subject.label, component),
                );
                Some(0.0)
            }
            CellValue::Absent => {
                ctx.cell_warning(
                    DiagnosticKind::AbsentTreatedAsZero,
                    header,
                    &field,
                    format!("absent in {} {}, counted as 0", subject.label, component),
                );
                Some(0.0)
            }
            CellValue::Invalid(s) => {
                ctx.cell_error(
                    DiagnosticKind::NonNumericMark,
                    header,
                    &field,
                    format!("{:?} is not a mark", s),
                );
                None
            }
            CellValue::Number(x) => {
                let max = subject.max_for(component);
                if x < 0.0 {
                    ctx.cell_error(
                        DiagnosticKind::NegativeMark,
                        header,
                        &field,
                        format!("negative mark {}", x),
                    );
                } else if x > max + MARK_EPSILON {
                    ctx.cell_error(
                        DiagnosticKind::ExceedsComponentMax,
                        header,
                        &field,
                        format!("mark {} exceeds the maximum of {}", x, max),
                    );
                }
                // Out of range values are kept as they are.
                Some(x)
            }
        };
        components.push((component.clone(), value));
    }

    let total: f64 = components.iter().filter_map(|(_, v)| *v).sum();
    if total > subject.max_marks + MARK_EPSILON {
        ctx.row_error(
            DiagnosticKind::SubjectTotalExceedsMax,
            &subject.key,
            format!(
                "{} total {} exceeds the maximum of {}",
                subject.label, total, subject.max_marks
            ),
        );
    }

    let percentage = percentage_of(total, subject.max_marks);
    SubjectScore {
        components,
        total,
        max: subject.max_marks,
        percentage,
        grade: grade_for(percentage).to_string(),
        passed: percentage >= grading.pass_percent,
    }
}

// Phase D, first part.
fn check_choice_groups(selected: &[&Subject], schema: &TemplateSchema, ctx: &mut RowContext) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for s in selected.iter() {
        if let Some(g) = &s.choice_group {
            *counts.entry(g.as_str()).or_insert(0) += 1;
        }
    }
    for (gid, group) in schema.choice_groups.iter() {
        let count = counts.get(gid.as_str()).cloned().unwrap_or(0);
        if count < group.min_selected || count > group.max_selected {
            let expected = if group.min_selected == group.max_selected {
                format!("{}", group.min_selected)
            } else {
                format!("between {} and {}", group.min_selected, group.max_selected)
            };
            ctx.row_error(
                DiagnosticKind::ChoiceGroupViolation,
                gid,
                format!(
                    "{}: {} subjects selected, expected {}",
                    group.label, count, expected
                ),
            );
        }
    }
}

// Phase D, second part.
fn compute_aggregate(
    selected: &[&Subject],
    scores: &BTreeMap<String, SubjectScore>,
    grading: &Grading,
) -> Aggregate {
    let mut total_obtained = 0.0;
    let mut total_max = 0.0;
    let mut failed_subject_labels: Vec<String> = Vec::new();
    for subject in selected.iter() {
        if let Some(score) = scores.get(&subject.key) {
            total_obtained += score.total;
            total_max += score.max;
            if !score.passed {
                failed_subject_labels.push(subject.label.clone());
            }
        }
    }

    let percentage = percentage_of(total_obtained, total_max);
    let passed = failed_subject_labels.is_empty();
    // Failing one subject withholds the division, whatever the overall percentage.
    let division = if passed {
        division_for(percentage, grading).map(|d| d.name.clone())
    } else {
        None
    };
    Aggregate {
        total_obtained,
        total_max,
        percentage,
        grade: grade_for(percentage).to_string(),
        passed,
        division,
        failed_subject_labels,
    }
}

fn incomplete_aggregate() -> Aggregate {
    Aggregate {
        total_obtained: 0.0,
        total_max: 0.0,
        percentage: 0.0,
        grade: grade_for(0.0).to_string(),
        passed: false,
        division: None,
        failed_subject_labels: Vec::new(),
    }
}

// ******** Operations on parsed records *********

/// Replaces an identity value in every record, for instance the session or the
/// class name chosen at print time. The records are not validated again.
pub fn apply_identity_override(records: &mut [StudentRecord], key: &str, value: &IdentityValue) {
    debug!(
        "apply_identity_override: {} = {} on {} records",
        key,
        value,
        records.len()
    );
    for r in records.iter_mut() {
        r.identity.insert(key.to_string(), value.clone());
    }
}

/// The records between the 1-based positions `from` and `to`, both included.
///
/// The records keep the row numbers of the full sheet, so that diagnostics
/// still point to the right place.
pub fn select_records(
    records: &[StudentRecord],
    from: Option<usize>,
    to: Option<usize>,
) -> Vec<StudentRecord> {
    let start = from.unwrap_or(1).max(1) - 1;
    let end = to.unwrap_or(records.len()).min(records.len());
    if start >= end {
        return Vec::new();
    }
    records[start..end].to_vec()
}

#[cfg(test)]
mod tests {
    use super::builder::SchemaBuilder;
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    fn schema() -> TemplateSchema {
        SchemaBuilder::new("Class IX")
            .identity(IdentityField::new("name", "Name", "Name", FieldType::String))
            .identity(IdentityField::new("roll", "Roll No", "Roll No", FieldType::Number))
            .subject(
                Subject::new("eng", "English", 30.0, &["UT1", "UT2", "UT3"])
                    .with_component_max("UT1", 10.0)
                    .with_component_max("UT2", 10.0)
                    .with_component_max("UT3", 10.0),
            )
            .subject(Subject::new("math", "Mathematics", 100.0, &[]).optional().in_group("sci"))
            .subject(Subject::new("bio", "Biology", 100.0, &[]).optional().in_group("sci"))
            .subject(Subject::new("art", "Art", 50.0, &[]).optional())
            .choice_group("sci", 1, 1, "Science elective")
            .grading(33.0, &[("I", 60.0), ("II", 45.0), ("III", 33.0)])
            .build()
            .unwrap()
    }

    const HEADER: &[&str] = &[
        "Name",
        "Roll No",
        "English UT1",
        "English UT2",
        "English UT3",
        "Mathematics",
        "Biology",
        "Art",
    ];

    fn run(rows: &[&[&str]]) -> ParseOutcome {
        init();
        let mut all: Vec<&[&str]> = vec![HEADER];
        all.extend_from_slice(rows);
        parse(&grid(&all), Orientation::Rows, &schema())
    }

    fn kinds(ds: &[Diagnostic]) -> Vec<DiagnosticKind> {
        ds.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn clean_student() {
        let out = run(&[&["Asha", "12", "9", "8", "7", "80", "", ""]]);
        assert!(out.errors.is_empty(), "{:?}", out.errors);
        assert!(out.warnings.is_empty());
        let r = &out.records[0];
        assert_eq!(r.row_number, 2);
        assert_eq!(r.identity["name"], IdentityValue::Text("Asha".to_string()));
        assert_eq!(r.identity["roll"], IdentityValue::Number(12.0));
        assert_eq!(r.selected_subjects, vec!["eng".to_string(), "math".to_string()]);
        assert_eq!(r.subject_scores["eng"].total, 24.0);
        assert_eq!(r.aggregate.total_obtained, 104.0);
        assert_eq!(r.aggregate.total_max, 130.0);
        assert_eq!(r.aggregate.percentage, 80.0);
        assert_eq!(r.aggregate.grade, "B1");
        assert!(r.aggregate.passed);
        assert_eq!(r.aggregate.division, Some("I".to_string()));
        assert!(!r.has_blocking_errors);
    }

    #[test]
    fn absent_marker_counts_as_zero() {
        let out = run(&[&["Asha", "12", "10", "ab", "8", "80", "", ""]]);
        assert!(out.errors.is_empty(), "{:?}", out.errors);
        assert_eq!(kinds(&out.warnings), vec![DiagnosticKind::AbsentTreatedAsZero]);
        assert_eq!(
            out.warnings[0].locus,
            Locus::Cell {
                row: 2,
                column: "English UT2".to_string()
            }
        );
        let eng = &out.records[0].subject_scores["eng"];
        assert_eq!(eng.total, 18.0);
        assert_eq!(eng.components[1], ("UT2".to_string(), Some(0.0)));
    }

    #[test]
    fn blank_component_of_selected_subject_is_a_warning() {
        let out = run(&[&["Asha", "12", "10", "", "8", "80", "", ""]]);
        assert!(out.errors.is_empty());
        assert_eq!(kinds(&out.warnings), vec![DiagnosticKind::BlankTreatedAsZero]);
        assert!(!out.records[0].has_blocking_errors);
    }

    #[test]
    fn required_subject_blank() {
        let out = run(&[&["Asha", "12", "", " ", "", "80", "", ""]]);
        assert_eq!(kinds(&out.errors), vec![DiagnosticKind::RequiredSubjectBlank]);
        let r = &out.records[0];
        assert!(r.has_blocking_errors);
        assert!(!r.subject_scores.contains_key("eng"));
        assert_eq!(r.aggregate.total_max, 100.0);
    }

    #[test]
    fn component_overflow_is_reported_not_clamped() {
        let out = run(&[&["Asha", "12", "12", "5", "5", "80", "", ""]]);
        assert_eq!(kinds(&out.errors), vec![DiagnosticKind::ExceedsComponentMax]);
        let eng = &out.records[0].subject_scores["eng"];
        assert_eq!(eng.components[0], ("UT1".to_string(), Some(12.0)));
        assert_eq!(eng.total, 22.0);
    }

    #[test]
    fn additive_overflow_of_subject_total() {
        let s = SchemaBuilder::new("x")
            .identity(IdentityField::new("name", "Name", "Name", FieldType::String))
            .subject(Subject::new("sci", "Science", 20.0, &["Theory", "Practical"])
                .with_component_max("Theory", 15.0)
                .with_component_max("Practical", 10.0))
            .build()
            .unwrap();
        let raw = grid(&[
            &["Name", "Science Theory", "Science Practical"],
            &["Asha", "15", "10"],
            &["Ravi", "16", "10"],
        ]);
        let out = parse(&raw, Orientation::Rows, &s);
        assert_eq!(
            kinds(&out.errors),
            vec![
                DiagnosticKind::SubjectTotalExceedsMax,
                DiagnosticKind::ExceedsComponentMax,
                DiagnosticKind::SubjectTotalExceedsMax,
            ]
        );
        assert_eq!(out.errors[0].locus, Locus::Row(2));
        assert_eq!(out.records[1].subject_scores["sci"].total, 26.0);
    }

    #[test]
    fn negative_and_non_numeric_marks() {
        let out = run(&[&["Asha", "12", "-1", "x", "5", "80", "", ""]]);
        assert_eq!(
            kinds(&out.errors),
            vec![DiagnosticKind::NegativeMark, DiagnosticKind::NonNumericMark]
        );
        let eng = &out.records[0].subject_scores["eng"];
        assert_eq!(eng.components[1], ("UT2".to_string(), None));
        assert_eq!(eng.total, 4.0);
    }

    #[test]
    fn garbage_makes_optional_subject_selected() {
        let out = run(&[&["Asha", "12", "9", "8", "7", "80", "", "n/a"]]);
        assert_eq!(kinds(&out.errors), vec![DiagnosticKind::NonNumericMark]);
        assert!(out.records[0].subject_scores.contains_key("art"));
        assert_eq!(out.records[0].aggregate.total_max, 180.0);
    }

    #[test]
    fn choice_group_counts() {
        let both = run(&[&["Asha", "12", "9", "8", "7", "80", "70", ""]]);
        assert_eq!(kinds(&both.errors), vec![DiagnosticKind::ChoiceGroupViolation]);
        assert!(both.errors[0].message.contains("2 subjects selected"));

        let none = run(&[&["Asha", "12", "9", "8", "7", "", "", ""]]);
        assert_eq!(kinds(&none.errors), vec![DiagnosticKind::ChoiceGroupViolation]);
        assert!(none.errors[0].message.contains("0 subjects selected"));

        let one = run(&[&["Asha", "12", "9", "8", "7", "", "70", ""]]);
        assert!(one.errors.is_empty());
    }

    #[test]
    fn one_failed_subject_fails_the_student() {
        let out = run(&[&["Asha", "12", "10", "10", "10", "20", "", "50"]]);
        let a = &out.records[0].aggregate;
        // 100 / 180 overall, but 20% in Mathematics.
        assert_eq!(a.percentage, 55.56);
        assert!(!a.passed);
        assert_eq!(a.division, None);
        assert_eq!(a.failed_subject_labels, vec!["Mathematics".to_string()]);
        assert!(!out.records[0].subject_scores["math"].passed);
    }

    #[test]
    fn identity_problems() {
        let out = run(&[&["", "twelve", "9", "8", "7", "80", "", ""]]);
        assert_eq!(
            kinds(&out.errors),
            vec![DiagnosticKind::EmptyRequiredField, DiagnosticKind::TypeMismatch]
        );
        let r = &out.records[0];
        assert!(r.has_blocking_errors);
        // The subjects are still computed.
        assert_eq!(r.aggregate.total_obtained, 104.0);
        assert_eq!(r.identity["roll"], IdentityValue::Text("twelve".to_string()));
    }

    #[test]
    fn missing_identity_columns_stop_the_row() {
        init();
        let raw = grid(&[&["Student", "English UT1"], &["Asha", "9"], &["Ravi", "8"]]);
        let out = parse(&raw, Orientation::Rows, &schema());
        assert_eq!(out.records.len(), 2);
        assert_eq!(
            kinds(&out.errors),
            vec![DiagnosticKind::MissingColumn, DiagnosticKind::MissingColumn]
        );
        assert_eq!(out.errors[0].message, "missing columns: Name, Roll No");
        let r = &out.records[1];
        assert_eq!(r.row_number, 3);
        assert!(r.has_blocking_errors);
        assert!(r.subject_scores.is_empty());
        assert!(!r.aggregate.passed);
    }

    #[test]
    fn optional_identity_field() {
        let mut dob = IdentityField::new("dob", "Date of birth", "DOB", FieldType::Date);
        dob.required = false;
        dob.date_format = Some("%d/%m/%Y".to_string());
        let s = SchemaBuilder::new("x")
            .identity(IdentityField::new("name", "Name", "Name", FieldType::String))
            .identity(dob)
            .subject(Subject::new("eng", "English", 100.0, &[]))
            .build()
            .unwrap();

        let without_column = parse(&grid(&[&["Name", "English"], &["Asha", "50"]]), Orientation::Rows, &s);
        assert!(without_column.errors.is_empty());

        let out = parse(
            &grid(&[
                &["Name", "DOB", "English"],
                &["Asha", "", "50"],
                &["Ravi", "03/11/2010", "60"],
                &["Mira", "2010-11-03", "70"],
            ]),
            Orientation::Rows,
            &s,
        );
        assert_eq!(kinds(&out.errors), vec![DiagnosticKind::TypeMismatch]);
        assert_eq!(out.errors[0].locus.row(), 4);
        assert_eq!(
            out.records[1].identity["dob"],
            IdentityValue::Date(NaiveDate::from_ymd_opt(2010, 11, 3).unwrap())
        );
    }

    #[test]
    fn unmapped_and_unknown_columns() {
        let mut eng = Subject::new("eng", "English", 100.0, &["UT", "HY"]);
        eng.columns.remove("HY");
        let sci = Subject::new("sci", "Science", 100.0, &["Theory", "Practical"]);
        let s = SchemaBuilder::new("x")
            .identity(IdentityField::new("name", "Name", "Name", FieldType::String))
            .subject(eng)
            .subject(sci)
            .build()
            .unwrap();
        let out = parse(
            &grid(&[&["Name", "English UT", "Science Theory"], &["Asha", "40", "50"]]),
            Orientation::Rows,
            &s,
        );
        assert_eq!(kinds(&out.warnings), vec![DiagnosticKind::UnmappedComponent]);
        assert_eq!(kinds(&out.errors), vec![DiagnosticKind::ColumnNotFound]);
        let r = &out.records[0];
        assert_eq!(r.subject_scores["eng"].components[1], ("HY".to_string(), None));
        assert_eq!(r.subject_scores["sci"].total, 50.0);
    }

    #[test]
    fn structural_error_is_global() {
        init();
        let out = parse(&grid(&[&["Name"]]), Orientation::Rows, &schema());
        assert!(out.records.is_empty());
        assert_eq!(kinds(&out.errors), vec![DiagnosticKind::StructuralError]);
        assert_eq!(out.errors[0].locus, Locus::Row(0));
    }

    #[test]
    fn transposed_sheet_reports_original_columns() {
        init();
        let raw = grid(&[
            &["Name", "Asha", "", "Ravi"],
            &["Roll No", "1", "", "2"],
            &["English UT1", "9", "", "11"],
            &["English UT2", "9", "", "9"],
            &["English UT3", "9", "", "9"],
            &["Mathematics", "50", "", "50"],
        ]);
        let out = parse(&raw, Orientation::Columns, &schema());
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[1].row_number, 4);
        assert_eq!(kinds(&out.errors), vec![DiagnosticKind::ExceedsComponentMax]);
        assert_eq!(
            out.errors[0].locus,
            Locus::Cell {
                row: 4,
                column: "English UT1".to_string()
            }
        );
        assert_eq!(out.errors[0].locus.describe(Orientation::Columns), "column 4, row \"English UT1\"");
    }

    #[test]
    fn overrides_and_ranges() {
        let mut out = run(&[
            &["Asha", "1", "9", "8", "7", "80", "", ""],
            &["Ravi", "2", "9", "8", "7", "80", "", ""],
            &["Mira", "3", "9", "8", "7", "80", "", ""],
        ]);
        let session = IdentityValue::Text("2025-26".to_string());
        apply_identity_override(&mut out.records, "session", &session);
        assert!(out.records.iter().all(|r| r.identity["session"] == session));

        let middle = select_records(&out.records, Some(2), Some(2));
        assert_eq!(middle.len(), 1);
        assert_eq!(middle[0].row_number, 3);
        assert_eq!(select_records(&out.records, Some(2), None).len(), 2);
        assert_eq!(select_records(&out.records, None, Some(10)).len(), 3);
        assert!(select_records(&out.records, Some(3), Some(1)).is_empty());
    }
}
