// Reading mark-sheets from Excel workbooks.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use chrono::{Duration, NaiveDate};

use crate::sheet::*;
use snafu::prelude::*;

fn get_range(path: &str, worksheet_name_o: Option<&str>) -> SheetResult<calamine::Range<DataType>> {
    debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet_name_o);
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name,
                path,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let wrange = workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    }
}

/// Reads the cells of a worksheet as text, the first worksheet by default.
pub fn read_excel_grid(path: &str, worksheet_name: Option<&str>) -> SheetResult<Vec<Vec<String>>> {
    let wrange = get_range(path, worksheet_name)?;
    let grid = range_to_grid(&wrange);
    info!("read_excel_grid: {} lines from {:?}", grid.len(), path);
    Ok(grid)
}

// The range starts at the first used cell. The grid is padded back to A1 so
// that the row and column numbers are the ones shown by Excel.
fn range_to_grid(wrange: &calamine::Range<DataType>) -> Vec<Vec<String>> {
    let (first_row, first_col) = match wrange.start() {
        Some((r, c)) => (r as usize, c as usize),
        None => return Vec::new(),
    };
    debug!(
        "range_to_grid: range starts at row {} column {}",
        first_row + 1,
        first_col + 1
    );
    let mut grid: Vec<Vec<String>> = vec![Vec::new(); first_row];
    for row in wrange.rows() {
        let mut cells: Vec<String> = vec![String::new(); first_col];
        cells.extend(row.iter().map(cell_to_string));
        grid.push(cells);
    }
    grid
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::Empty => "".to_string(),
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::DateTime(serial) => excel_date(*serial)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| serial.to_string()),
        other => format!("{:?}", other),
    }
}

// Serial day numbers count from 1899-12-30 in the 1900 date system.
fn excel_date(serial: f64) -> Option<NaiveDate> {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.floor() as i64))
}
