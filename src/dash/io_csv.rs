// Primitives for reading CSV files.

use std::fs::File;

use crate::dash::{
    io_common::{clean_row_to_record, Cell, ColumnNames, Layout, RawRow, CLEAN_COLUMNS},
    *,
};

/// Reads the cleaned trade file: `Country, Partner, Trade_Type, <years>`.
pub fn read_csv_trade(path: &str) -> BDashResult<Vec<RawTradeRecord>> {
    let rows = read_csv_rows(path, &CLEAN_COLUMNS)?;
    let res: Vec<RawTradeRecord> = rows.into_iter().filter_map(clean_row_to_record).collect();
    info!("read_csv_trade: {:?}: {} records", path, res.len());
    Ok(res)
}

/// Reads all the rows of a CSV file with a header line.
pub fn read_csv_rows(path: &str, cols: &ColumnNames) -> BDashResult<Vec<RawRow>> {
    let mut rdr = get_reader(path)?;
    let headers: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1_usize })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    // An empty file has no header and no rows.
    if headers.is_empty() {
        warn!("read_csv_rows: {:?}: empty file", path);
        return Ok(Vec::new());
    }
    let layout = Layout::from_headers(&headers, cols, path)?;
    if !layout.has_years() {
        warn!("read_csv_rows: {:?}: no year columns", path);
    }

    let mut res: Vec<RawRow> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let cells: Vec<Cell> = line.iter().map(|s| Cell::Text(s.to_string())).collect();
        let row = layout.read_row(&cells, lineno);
        debug!("read_csv_rows: lineno: {:?} row: {:?}", lineno, &row);
        res.push(row);
    }
    Ok(res)
}

fn get_reader(path: &str) -> BDashResult<csv::Reader<File>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    Ok(rdr)
}
