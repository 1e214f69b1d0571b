use clap::Parser;

/// This is a mark-sheet validation program: it reads the marks of a class and
/// computes the result of every student.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON template describing the class: identity fields, subjects,
    /// choice groups and grading rules. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub template: String,

    /// (file path) The mark-sheet to read, in CSV or Excel (.xlsx) format.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx) The type of the input. If not provided, it is inferred from the
    /// extension of the input file.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (rows or columns) Whether the students are laid out in rows or in columns.
    /// Overrides the orientation given in the template. Defaults to rows.
    #[clap(long, value_parser)]
    pub orientation: Option<String>,

    /// When using an Excel file, the name of the worksheet to use. The first worksheet is
    /// used by default.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the JSON summary. Defaults to the
    /// standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, the computed summary
    /// must match it.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path) A JSON list of custom subjects to append to the template.
    #[clap(long, value_parser)]
    pub extra_subjects: Option<String>,

    /// (file path) If provided, writes a blank mark-sheet for the template to this CSV
    /// file and stops.
    #[clap(long, value_parser)]
    pub sample: Option<String>,

    /// The number of blank students in the sample mark-sheet.
    #[clap(long, value_parser, default_value_t = 1)]
    pub sample_students: usize,

    /// (1-based) The first student to include in the summary.
    #[clap(long, value_parser)]
    pub from: Option<usize>,

    /// (1-based, included) The last student to include in the summary.
    #[clap(long, value_parser)]
    pub to: Option<usize>,

    /// (key=value) Replaces an identity value for every student after validation, for
    /// instance `--override session=2024-25`. May be repeated.
    #[clap(long = "override", value_parser)]
    pub overrides: Vec<String>,

    /// If passed, students with blocking errors are kept in the summary records.
    #[clap(long, takes_value = false)]
    pub include_blocked: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
