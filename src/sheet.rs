use log::{debug, info, warn};

use marksheet_engine::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;

use crate::sheet::config_reader::*;
use crate::sheet::io_common::{detect_input_type, parse_override, simplify_file_name, InputType};
use crate::sheet::io_csv::{read_csv_grid, write_csv_grid};
use crate::sheet::io_xlsx::read_excel_grid;

#[derive(Debug, Snafu)]
pub enum SheetError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary"))]
    WritingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("The workbook {path} has no worksheet named {name:?}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error writing file {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Error writing file {path}"))]
    CsvFlush {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid template: {source}"))]
    InvalidTemplate { source: SchemaError },
    #[snafu(display("Invalid value {value:?} for {field}"))]
    InvalidTemplateValue { field: String, value: String },
    #[snafu(display("Unknown input type {input_type:?}, expected csv or xlsx"))]
    UnknownInputType { input_type: String },
    #[snafu(display("No input file was provided"))]
    MissingInput {},
    #[snafu(display("Invalid override {value:?}, expected key=value"))]
    BadOverride { value: String },
    #[snafu(display("Difference detected between calculated summary and reference summary {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SheetResult<T> = Result<T, SheetError>;

fn identity_to_json(v: &IdentityValue) -> JSValue {
    match v {
        IdentityValue::Text(s) => json!(s),
        IdentityValue::Number(n) => json!(n),
        IdentityValue::Date(d) => json!(d.format("%Y-%m-%d").to_string()),
    }
}

fn record_to_json(schema: &TemplateSchema, r: &StudentRecord) -> JSValue {
    let mut identity: JSMap<String, JSValue> = JSMap::new();
    for (k, v) in r.identity.iter() {
        identity.insert(k.clone(), identity_to_json(v));
    }

    let mut subjects: JSMap<String, JSValue> = JSMap::new();
    for (key, score) in r.subject_scores.iter() {
        let mut components: JSMap<String, JSValue> = JSMap::new();
        for (cid, value) in score.components.iter() {
            components.insert(cid.clone(), json!(value));
        }
        let label = schema
            .subject(key)
            .map(|s| s.label.clone())
            .unwrap_or_else(|| key.clone());
        subjects.insert(
            key.clone(),
            json!({
                "label": label,
                "components": components,
                "total": score.total,
                "max": score.max,
                "percentage": score.percentage,
                "grade": score.grade,
                "passed": score.passed,
            }),
        );
    }

    let a = &r.aggregate;
    json!({
        "row": r.row_number,
        "identity": identity,
        "subjects": subjects,
        "selectedSubjects": r.selected_subjects,
        "aggregate": {
            "totalObtained": a.total_obtained,
            "totalMax": a.total_max,
            "percentage": a.percentage,
            "grade": a.grade,
            "passed": a.passed,
            "division": a.division,
            "failedSubjects": a.failed_subject_labels,
        },
        "hasBlockingErrors": r.has_blocking_errors,
    })
}

fn diagnostic_to_json(d: &Diagnostic, orientation: Orientation) -> JSValue {
    let column = match &d.locus {
        Locus::Row(_) => JSValue::Null,
        Locus::Cell { column, .. } => json!(column),
    };
    json!({
        "severity": match d.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        },
        "code": d.kind.code(),
        "row": d.locus.row(),
        "column": column,
        "location": d.locus.describe(orientation),
        "field": d.field,
        "message": d.message,
    })
}

fn build_summary_js(
    schema: &TemplateSchema,
    outcome: &ParseOutcome,
    selected: &[StudentRecord],
    orientation: Orientation,
    source: &str,
) -> JSValue {
    let clean: Vec<&StudentRecord> = outcome.clean_records().collect();
    let passed = clean.iter().filter(|r| r.aggregate.passed).count();
    let subjects: Vec<JSValue> = schema
        .subjects
        .iter()
        .map(|s| {
            json!({
                "key": s.key,
                "label": s.label,
                "maxMarks": s.max_marks,
                "optional": s.optional,
                "choiceGroup": s.choice_group,
            })
        })
        .collect();
    let records: Vec<JSValue> = selected.iter().map(|r| record_to_json(schema, r)).collect();
    let errors: Vec<JSValue> = outcome
        .errors
        .iter()
        .map(|d| diagnostic_to_json(d, orientation))
        .collect();
    let warnings: Vec<JSValue> = outcome
        .warnings
        .iter()
        .map(|d| diagnostic_to_json(d, orientation))
        .collect();
    json!({
        "config": {
            "template": schema.name,
            "source": source,
            "orientation": match orientation {
                Orientation::Rows => "rows",
                Orientation::Columns => "columns",
            },
        },
        "summary": {
            "students": outcome.records.len(),
            "included": selected.len(),
            "blocked": outcome.records.len() - clean.len(),
            "passed": passed,
            "failed": clean.len() - passed,
        },
        "subjects": subjects,
        "records": records,
        "errors": errors,
        "warnings": warnings,
    })
}

fn write_summary(out: Option<&str>, content: &str) -> SheetResult<()> {
    match out {
        None | Some("") | Some("stdout") => {
            println!("{}", content);
            Ok(())
        }
        Some(path) => {
            info!("write_summary: writing {:?}", path);
            fs::write(path, content).context(WritingOutputSnafu { path })
        }
    }
}

fn read_grid(args: &Args) -> SheetResult<(Vec<Vec<String>>, String)> {
    let path = args.input.as_deref().context(MissingInputSnafu {})?;
    let grid = match detect_input_type(path, args.input_type.as_deref())? {
        InputType::Csv => read_csv_grid(path)?,
        InputType::Xlsx => read_excel_grid(path, args.excel_worksheet_name.as_deref())?,
    };
    Ok((grid, simplify_file_name(path)))
}

pub fn run_marksheet(args: &Args) -> SheetResult<()> {
    let config = read_template(&args.template)?;
    info!("run_marksheet: template {:?}", config.template_name);
    let mut schema = config.to_schema()?;

    if let Some(p) = &args.extra_subjects {
        let extra = read_extra_subjects(p)?;
        schema = augment_schema(&schema, &extra);
    }
    schema.check().context(InvalidTemplateSnafu {})?;

    let orientation = match &args.orientation {
        Some(o) => parse_orientation(o)?,
        None => config.orientation()?.unwrap_or(Orientation::Rows),
    };
    debug!("run_marksheet: orientation {:?}", orientation);

    if let Some(sample_p) = &args.sample {
        let grid = sample_grid(&schema, orientation, args.sample_students);
        write_csv_grid(sample_p, &grid)?;
        info!("run_marksheet: sample written to {:?}", sample_p);
        return Ok(());
    }

    let (grid, source) = read_grid(args)?;
    let mut outcome = parse(&grid, orientation, &schema);
    info!(
        "run_marksheet: {} students, {} errors, {} warnings",
        outcome.records.len(),
        outcome.errors.len(),
        outcome.warnings.len()
    );

    for o in args.overrides.iter() {
        let (key, value) = parse_override(o)?;
        if !schema.identity_fields.iter().any(|f| f.key == key) {
            warn!("run_marksheet: override of undeclared identity field {:?}", key);
        }
        apply_identity_override(&mut outcome.records, &key, &IdentityValue::Text(value));
    }

    if let (Some(from), Some(to)) = (args.from, args.to) {
        if from > to {
            whatever!("Empty selection: --from {} is after --to {}", from, to)
        }
    }
    let selected: Vec<StudentRecord> = select_records(&outcome.records, args.from, args.to)
        .into_iter()
        .filter(|r| args.include_blocked || !r.has_blocking_errors)
        .collect();

    // Assemble the final json
    let result_js = build_summary_js(&schema, &outcome, &selected, orientation, &source);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(WritingJsonSnafu {})?;
    write_summary(args.out.as_deref(), &pretty_js_stats)?;

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(WritingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu { path: summary_p }.fail();
        }
    }

    Ok(())
}
