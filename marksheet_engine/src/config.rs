// ********* Template data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

use chrono::NaiveDate;

/// The layout of the source mark-sheet.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Orientation {
    /// One row per student, field names in the first row.
    Rows,
    /// One column per student, field names in the first column.
    Columns,
}

/// The declared type of an identity field.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum FieldType {
    String,
    Number,
    Date,
}

/// A column identifying the student (name, roll number, date of birth, ...).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct IdentityField {
    pub key: String,
    pub label: String,
    /// The name of the column in the mark-sheet. Matched case-insensitively.
    pub header: String,
    pub field_type: FieldType,
    /// chrono format string, only used for `FieldType::Date`.
    pub date_format: Option<String>,
    pub required: bool,
}

/// A gradable area, made of one or more scoring components.
#[derive(PartialEq, Debug, Clone)]
pub struct Subject {
    pub key: String,
    pub label: String,
    pub max_marks: f64,
    /// Component ids, in reading order.
    pub components: Vec<String>,
    /// Per-component maximum. A component without an entry uses `max_marks`.
    pub component_max: BTreeMap<String, f64>,
    pub optional: bool,
    pub choice_group: Option<String>,
    /// Component id -> column header in the mark-sheet.
    /// A component without an entry is unmapped.
    pub columns: BTreeMap<String, String>,
}

/// A set of optional subjects from which a student must pick a bounded number.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChoiceGroup {
    pub min_selected: usize,
    pub max_selected: usize,
    pub label: String,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Division {
    pub name: String,
    pub threshold_percent: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Grading {
    pub pass_percent: f64,
    /// Must be sorted by decreasing threshold. The engine does not sort them.
    pub divisions: Vec<Division>,
}

/// The declarative description of a class mark-sheet.
///
/// It is immutable during a parse. Custom subjects are added with
/// [`crate::augment_schema`], which returns a new schema.
#[derive(PartialEq, Debug, Clone)]
pub struct TemplateSchema {
    pub name: String,
    pub identity_fields: Vec<IdentityField>,
    pub subjects: Vec<Subject>,
    pub choice_groups: BTreeMap<String, ChoiceGroup>,
    pub grading: Grading,
}

// ******** Output data structures *********

/// The value of an identity field after type coercion.
#[derive(PartialEq, Debug, Clone)]
pub enum IdentityValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Display for IdentityValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityValue::Text(s) => write!(f, "{}", s),
            IdentityValue::Number(n) => write!(f, "{}", n),
            IdentityValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// The marks of one selected subject.
#[derive(PartialEq, Debug, Clone)]
pub struct SubjectScore {
    /// Component id and value, in the order of the subject components.
    /// `None` when the value could not be read.
    pub components: Vec<(String, Option<f64>)>,
    pub total: f64,
    pub max: f64,
    pub percentage: f64,
    pub grade: String,
    pub passed: bool,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Aggregate {
    pub total_obtained: f64,
    pub total_max: f64,
    /// Rounded to 2 decimals.
    pub percentage: f64,
    pub grade: String,
    pub passed: bool,
    pub division: Option<String>,
    pub failed_subject_labels: Vec<String>,
}

/// The computed result for one student.
#[derive(PartialEq, Debug, Clone)]
pub struct StudentRecord {
    /// 1-based position of the student line in the input grid: a row number for
    /// row-oriented sheets, a column number for column-oriented ones.
    pub row_number: usize,
    pub identity: BTreeMap<String, IdentityValue>,
    pub subject_scores: BTreeMap<String, SubjectScore>,
    /// Keys of the subjects counted for this student, in template order.
    pub selected_subjects: Vec<String>,
    pub aggregate: Aggregate,
    pub has_blocking_errors: bool,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// Where a diagnostic applies. Row 0 is reserved for problems with the whole grid.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Locus {
    Row(usize),
    Cell { row: usize, column: String },
}

impl Locus {
    pub fn row(&self) -> usize {
        match self {
            Locus::Row(r) => *r,
            Locus::Cell { row, .. } => *row,
        }
    }

    /// A human-readable location, using the coordinates of the original sheet.
    pub fn describe(&self, orientation: Orientation) -> String {
        let (line, field) = match orientation {
            Orientation::Rows => ("row", "column"),
            Orientation::Columns => ("column", "row"),
        };
        match self {
            Locus::Row(0) => "sheet".to_string(),
            Locus::Row(r) => format!("{} {}", line, r),
            Locus::Cell { row, column } => format!("{} {}, {} {:?}", line, row, field, column),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum DiagnosticKind {
    StructuralError,
    MissingColumn,
    EmptyRequiredField,
    TypeMismatch,
    RequiredSubjectBlank,
    UnmappedComponent,
    ColumnNotFound,
    BlankTreatedAsZero,
    AbsentTreatedAsZero,
    NonNumericMark,
    NegativeMark,
    ExceedsComponentMax,
    SubjectTotalExceedsMax,
    ChoiceGroupViolation,
}

impl DiagnosticKind {
    /// A stable identifier, used in reports.
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::StructuralError => "structuralError",
            DiagnosticKind::MissingColumn => "missingColumn",
            DiagnosticKind::EmptyRequiredField => "emptyRequiredField",
            DiagnosticKind::TypeMismatch => "typeMismatch",
            DiagnosticKind::RequiredSubjectBlank => "requiredSubjectBlank",
            DiagnosticKind::UnmappedComponent => "unmappedComponent",
            DiagnosticKind::ColumnNotFound => "columnNotFound",
            DiagnosticKind::BlankTreatedAsZero => "blankTreatedAsZero",
            DiagnosticKind::AbsentTreatedAsZero => "absentTreatedAsZero",
            DiagnosticKind::NonNumericMark => "nonNumericMark",
            DiagnosticKind::NegativeMark => "negativeMark",
            DiagnosticKind::ExceedsComponentMax => "exceedsComponentMax",
            DiagnosticKind::SubjectTotalExceedsMax => "subjectTotalExceedsMax",
            DiagnosticKind::ChoiceGroupViolation => "choiceGroupViolation",
        }
    }
}

/// An error (blocks the student from generation) or a warning (a value was defaulted).
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub locus: Locus,
    pub field: String,
    pub message: String,
}

/// Everything produced by one parse.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ParseOutcome {
    pub records: Vec<StudentRecord>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ParseOutcome {
    /// The records that can go to report generation.
    pub fn clean_records(&self) -> impl Iterator<Item = &StudentRecord> {
        self.records.iter().filter(|r| !r.has_blocking_errors)
    }
}

// ********* Errors **********

/// A template that breaks one of the schema invariants.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SchemaError {
    DuplicateHeader(String),
    DuplicateSubjectKey(String),
    DuplicateIdentityKey(String),
    UnknownChoiceGroup { subject: String, group: String },
    InvalidChoiceGroupRange(String),
    EmptyComponents(String),
    NonPositiveMax(String),
    UnknownComponentMax { subject: String, component: String },
    UnsortedDivisions,
}

impl Error for SchemaError {}

impl Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::DuplicateHeader(h) => write!(f, "column header {:?} is declared twice", h),
            SchemaError::DuplicateSubjectKey(k) => {
                write!(f, "subject key {:?} is declared twice", k)
            }
            SchemaError::DuplicateIdentityKey(k) => {
                write!(f, "identity field {:?} is declared twice", k)
            }
            SchemaError::UnknownChoiceGroup { subject, group } => write!(
                f,
                "subject {:?} refers to the undeclared choice group {:?}",
                subject, group
            ),
            SchemaError::InvalidChoiceGroupRange(g) => {
                write!(f, "choice group {:?} has a minimum above its maximum", g)
            }
            SchemaError::EmptyComponents(s) => write!(f, "subject {:?} has no component", s),
            SchemaError::NonPositiveMax(s) => {
                write!(f, "subject {:?} has a maximum mark that is not positive", s)
            }
            SchemaError::UnknownComponentMax { subject, component } => write!(
                f,
                "subject {:?} sets a maximum for the unknown component {:?}",
                subject, component
            ),
            SchemaError::UnsortedDivisions => {
                write!(f, "divisions must be sorted by decreasing threshold")
            }
        }
    }
}

/// A grid that cannot hold any student.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum GridError {
    Empty,
    TooFewColumns { found: usize },
    NoStudentData,
}

impl Error for GridError {}

impl Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::Empty => write!(f, "the sheet is empty"),
            GridError::TooFewColumns { found } => write!(
                f,
                "the sheet needs at least 2 meaningful columns, found {}",
                found
            ),
            GridError::NoStudentData => write!(f, "the sheet does not contain any student"),
        }
    }
}
