use std::path::Path;

use crate::sheet::*;
use snafu::prelude::*;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Csv,
    Xlsx,
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// The explicit input type if given, otherwise the extension of the file.
pub fn detect_input_type(path: &str, explicit: Option<&str>) -> SheetResult<InputType> {
    let name = match explicit {
        Some(x) => x.to_lowercase(),
        None => Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default(),
    };
    match name.as_str() {
        "csv" | "txt" => Ok(InputType::Csv),
        "xlsx" | "xlsm" | "excel" => Ok(InputType::Xlsx),
        _ => UnknownInputTypeSnafu { input_type: name }.fail(),
    }
}

/// Parses a `key=value` override.
pub fn parse_override(s: &str) -> SheetResult<(String, String)> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.trim().to_string())),
        _ => BadOverrideSnafu { value: s }.fail(),
    }
}
