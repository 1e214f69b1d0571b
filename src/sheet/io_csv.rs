// Primitives for reading and writing CSV files.

use std::io::Read;

use crate::sheet::*;
use snafu::prelude::*;

pub fn read_csv_grid(path: &str) -> SheetResult<Vec<Vec<String>>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    info!("read_csv_grid: reading {:?}", path);
    read_records(rdr)
}

// The reader skips empty lines. They are kept as empty rows so that the grid
// index still matches the line number in the file.
fn read_records<R: Read>(mut rdr: csv::Reader<R>) -> SheetResult<Vec<Vec<String>>> {
    let mut grid: Vec<Vec<String>> = Vec::new();
    let mut record = csv::StringRecord::new();
    // The index starts at 1 to respect most conventions in the spreadsheet world
    let mut next_line: u64 = 1;
    loop {
        let more = rdr.read_record(&mut record).context(CsvLineParseSnafu {
            lineno: next_line as usize,
        })?;
        if !more {
            break;
        }
        let lineno = record.position().map(|p| p.line()).unwrap_or(next_line);
        while next_line < lineno {
            grid.push(Vec::new());
            next_line += 1;
        }
        let mut cells: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        if grid.is_empty() {
            // Files saved by spreadsheet programs often start with a byte order mark.
            if let Some(first) = cells.first_mut() {
                *first = first.trim_start_matches('\u{feff}').to_string();
            }
        }
        debug!("read_records: lineno: {:?} cells: {:?}", lineno, &cells);
        // Quoted cells may span several lines.
        let inner_breaks: usize = cells.iter().map(|c| c.matches('\n').count()).sum();
        next_line = lineno + 1 + inner_breaks as u64;
        grid.push(cells);
    }
    Ok(grid)
}

pub fn write_csv_grid(path: &str, grid: &[Vec<String>]) -> SheetResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .context(CsvWriteSnafu { path })?;
    for line in grid.iter() {
        wtr.write_record(line).context(CsvWriteSnafu { path })?;
    }
    wtr.flush().context(CsvFlushSnafu { path })?;
    Ok(())
}
