use marksheet_engine::builder::SchemaBuilder;
use marksheet_engine::*;

fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect()
}

fn schema() -> TemplateSchema {
    SchemaBuilder::new("Class X")
        .identity(IdentityField::new("name", "Name", "Name", FieldType::String))
        .identity(IdentityField::new("roll", "Roll No", "Roll No", FieldType::Number))
        .subject(
            Subject::new("eng", "English", 30.0, &["UT1", "UT2", "UT3"])
                .with_component_max("UT1", 10.0)
                .with_component_max("UT2", 10.0)
                .with_component_max("UT3", 10.0),
        )
        .subject(Subject::new("math", "Math", 100.0, &[]).optional().in_group("sci_elective"))
        .subject(Subject::new("bio", "Biology", 100.0, &[]).optional().in_group("sci_elective"))
        .subject(Subject::new("music", "Music", 50.0, &[]).optional())
        .choice_group("sci_elective", 1, 1, "Science elective")
        .grading(33.0, &[("I", 60.0), ("II", 45.0), ("III", 33.0)])
        .build()
        .unwrap()
}

fn sheet() -> Vec<Vec<String>> {
    grid(&[
        &["Name", "Roll No", "English UT1", "English UT2", "English UT3", "Math", "Biology", "Music"],
        &["Asha", "1", "10", "AB", "8", "70", "", ""],
        &["Ravi", "2", "12", "9", "9", "55", "61", "40"],
        &["", "", "", "", "", "", "", ""],
        &["Mira", "x", "", "", "", "", "", ""],
    ])
}

#[test]
fn parsing_is_idempotent() {
    let s = schema();
    let first = parse(&sheet(), Orientation::Rows, &s);
    let second = parse(&sheet(), Orientation::Rows, &s);
    assert_eq!(first, second);
}

#[test]
fn orientation_symmetry() {
    let s = schema();
    let raw = sheet();
    let by_rows = normalize(&raw, Orientation::Rows).unwrap();
    let by_cols = normalize(&transpose(&raw), Orientation::Columns).unwrap();
    assert_eq!(by_rows, by_cols);
    assert_eq!(
        parse(&raw, Orientation::Rows, &s).records,
        parse(&transpose(&raw), Orientation::Columns, &s).records
    );
}

#[test]
fn blank_optional_subject_is_ignored() {
    let out = parse(&sheet(), Orientation::Rows, &schema());
    let asha = &out.records[0];
    assert!(!asha.subject_scores.contains_key("music"));
    assert!(!asha.subject_scores.contains_key("bio"));
    assert_eq!(asha.aggregate.total_max, 130.0);
    assert!(out
        .errors
        .iter()
        .chain(out.warnings.iter())
        .filter(|d| d.locus.row() == 2)
        .all(|d| !d.field.starts_with("music")));
}

#[test]
fn absent_marker() {
    let out = parse(&sheet(), Orientation::Rows, &schema());
    let asha_warnings: Vec<&Diagnostic> = out.warnings.iter().filter(|d| d.locus.row() == 2).collect();
    assert_eq!(asha_warnings.len(), 1);
    assert_eq!(asha_warnings[0].kind, DiagnosticKind::AbsentTreatedAsZero);
    assert_eq!(out.records[0].subject_scores["eng"].total, 18.0);
    assert!(!out.records[0].has_blocking_errors);
}

#[test]
fn component_overflow_and_choice_group() {
    let out = parse(&sheet(), Orientation::Rows, &schema());
    let ravi = &out.records[1];
    assert_eq!(ravi.row_number, 3);
    assert_eq!(ravi.subject_scores["eng"].components[0], ("UT1".to_string(), Some(12.0)));
    assert_eq!(ravi.subject_scores["eng"].total, 30.0);
    let kinds: Vec<DiagnosticKind> = out
        .errors
        .iter()
        .filter(|d| d.locus.row() == 3)
        .map(|d| d.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![DiagnosticKind::ExceedsComponentMax, DiagnosticKind::ChoiceGroupViolation]
    );
    assert!(ravi.has_blocking_errors);
}

#[test]
fn blank_line_is_skipped_and_rows_keep_their_numbers() {
    let out = parse(&sheet(), Orientation::Rows, &schema());
    assert_eq!(out.records.len(), 3);
    let mira = &out.records[2];
    assert_eq!(mira.row_number, 5);
    let kinds: Vec<DiagnosticKind> = out
        .errors
        .iter()
        .filter(|d| d.locus.row() == 5)
        .map(|d| d.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            DiagnosticKind::TypeMismatch,
            DiagnosticKind::RequiredSubjectBlank,
            DiagnosticKind::ChoiceGroupViolation,
        ]
    );
    assert_eq!(out.clean_records().count(), 1);
}

#[test]
fn grade_and_division_boundaries() {
    let s = SchemaBuilder::new("boundaries")
        .identity(IdentityField::new("name", "Name", "Name", FieldType::String))
        .subject(Subject::new("a", "A", 10000.0, &[]))
        .grading(33.0, &[("I", 60.0), ("II", 45.0), ("III", 33.0)])
        .build()
        .unwrap();
    let out = parse(
        &grid(&[
            &["Name", "A"],
            &["p91", "9100"],
            &["p90.99", "9099"],
            &["p60", "6000"],
            &["p45", "4500"],
            &["p44.99", "4499"],
            &["p33", "3300"],
        ]),
        Orientation::Rows,
        &s,
    );
    let summary: Vec<(f64, &str, Option<&str>)> = out
        .records
        .iter()
        .map(|r| {
            (
                r.aggregate.percentage,
                r.aggregate.grade.as_str(),
                r.aggregate.division.as_deref(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (91.0, "A1", Some("I")),
            (90.99, "A2", Some("I")),
            (60.0, "C1", Some("I")),
            (45.0, "C2", Some("II")),
            (44.99, "C2", Some("III")),
            (33.0, "D", Some("III")),
        ]
    );
}

#[test]
fn failing_one_subject_withholds_the_division() {
    let s = SchemaBuilder::new("pass")
        .identity(IdentityField::new("name", "Name", "Name", FieldType::String))
        .subject(Subject::new("a", "A", 100.0, &[]))
        .subject(Subject::new("b", "B", 100.0, &[]))
        .subject(Subject::new("c", "C", 100.0, &[]))
        .grading(33.0, &[("I", 60.0), ("II", 45.0)])
        .build()
        .unwrap();
    let out = parse(
        &grid(&[&["Name", "A", "B", "C"], &["Asha", "95", "95", "30"]]),
        Orientation::Rows,
        &s,
    );
    let a = &out.records[0].aggregate;
    assert_eq!(a.percentage, 73.33);
    assert!(!a.passed);
    assert_eq!(a.division, None);
    assert_eq!(a.failed_subject_labels, vec!["C".to_string()]);
    assert!(!out.records[0].has_blocking_errors);
}

#[test]
fn augmented_subjects_are_scored() {
    let s = augment_schema(
        &schema(),
        &[Subject::new("dance", "Dance", 50.0, &[]).optional().in_group("arts")],
    );
    assert!(s.check().is_ok());
    let out = parse(
        &grid(&[
            &["Name", "Roll No", "English UT1", "English UT2", "English UT3", "Math", "Dance"],
            &["Asha", "1", "10", "10", "10", "70", "45"],
            &["Ravi", "2", "10", "10", "10", "70", ""],
        ]),
        Orientation::Rows,
        &s,
    );
    assert_eq!(out.records[0].subject_scores["dance"].total, 45.0);
    let groups: Vec<(usize, &str)> = out
        .errors
        .iter()
        .map(|d| (d.locus.row(), d.field.as_str()))
        .collect();
    assert_eq!(groups, vec![(3, "arts")]);
}
