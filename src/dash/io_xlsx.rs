use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::dash::{
    io_common::{clean_row_to_record, Cell, Layout, CLEAN_COLUMNS},
    *,
};

const DEFAULT_WORKSHEET: &str = "Sheet1";

/// Reads the cleaned layout from a worksheet of an Excel workbook.
pub fn read_xlsx_trade(
    path: &str,
    worksheet_name: Option<&str>,
) -> BDashResult<Vec<RawTradeRecord>> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu { path })?;
    let headers: Vec<String> = header.iter().map(|c| to_cell(c).text()).collect();
    debug!("read_xlsx_trade: header: {:?}", headers);
    let layout = Layout::from_headers(&headers, &CLEAN_COLUMNS, path)?;

    let mut res: Vec<RawTradeRecord> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let lineno = idx + 2;
        let cells: Vec<Cell> = row.iter().map(to_cell).collect();
        if let Some(r) = clean_row_to_record(layout.read_row(&cells, lineno)) {
            res.push(r);
        }
    }
    info!("read_xlsx_trade: {:?}: {} records", path, res.len());
    Ok(res)
}

fn to_cell(c: &DataType) -> Cell {
    match c {
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Float(f) => Cell::Number(*f),
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Empty => Cell::Empty,
        x => {
            debug!("to_cell: unexpected cell {:?}", x);
            Cell::Text(format!("{:?}", x))
        }
    }
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> BDashResult<calamine::Range<DataType>> {
    debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet_name);
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(name) = worksheet_name {
        let wrange = workbook
            .worksheet_range(name)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        return Ok(wrange);
    }

    let mut all_worksheets = workbook.worksheets();
    if all_worksheets.len() == 1 {
        let (name, wrange) = all_worksheets.remove(0);
        debug!("get_range: using the only worksheet {:?}", name);
        return Ok(wrange);
    }
    match all_worksheets
        .into_iter()
        .find(|(name, _)| name == DEFAULT_WORKSHEET)
    {
        Some((_, wrange)) => Ok(wrange),
        None => Err(Box::new(DashError::EmptyExcel {
            path: path.to_string(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dash::tests::test_file;

    fn values(r: &RawTradeRecord) -> Vec<(i32, f64)> {
        r.year_values.iter().map(|(y, x)| (*y, *x)).collect()
    }

    #[test]
    fn only_worksheet() {
        let res = read_xlsx_trade(&test_file("xlsx/trade.xlsx"), None).unwrap();
        // The Re-export row is dropped.
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].reporting_country, "United States");
        assert_eq!(res[0].partner, "Chile");
        assert_eq!(res[0].trade_type, TradeType::Export);
        // Numeric year headers, empty 2021 cell.
        assert_eq!(values(&res[0]), vec![(2020, 10.0)]);
        assert_eq!(values(&res[1]), vec![(2020, 30.0), (2021, 35.5)]);
    }

    #[test]
    fn default_worksheet() {
        let res = read_xlsx_trade(&test_file("xlsx/multi.xlsx"), None).unwrap();
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].trade_type, TradeType::Import);
        assert_eq!(values(&res[0]), vec![(2020, 7.0)]);
    }

    #[test]
    fn named_worksheet() {
        let res = read_xlsx_trade(&test_file("xlsx/multi.xlsx"), Some("Other")).unwrap();
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].reporting_country, "China");
        // A boolean is not an amount.
        assert_eq!(values(&res[0]), vec![(2020, 9.0)]);
    }

    #[test]
    fn empty_or_unknown_worksheet() {
        let path = test_file("xlsx/multi.xlsx");
        for name in ["Empty", "Missing"] {
            let res = read_xlsx_trade(&path, Some(name));
            assert!(
                matches!(res.map_err(|e| *e), Err(DashError::EmptyExcel { .. })),
                "{}",
                name
            );
        }
    }

    #[test]
    fn no_default_worksheet() {
        let res = read_xlsx_trade(&test_file("xlsx/two_sheets.xlsx"), None);
        assert!(matches!(res.map_err(|e| *e), Err(DashError::EmptyExcel { .. })));
        let res = read_xlsx_trade(&test_file("xlsx/two_sheets.xlsx"), Some("B")).unwrap();
        assert_eq!(values(&res[0]), vec![(2020, 3.0), (2021, 4.0)]);
    }

    #[test]
    fn missing_workbook() {
        let res = read_xlsx_trade(&test_file("xlsx/not_here.xlsx"), None);
        assert!(matches!(res.map_err(|e| *e), Err(DashError::OpeningExcel { .. })));
    }

    #[test]
    fn cells() {
        assert_eq!(to_cell(&DataType::Int(2020)), Cell::Number(2020.0));
        assert_eq!(to_cell(&DataType::Float(1.5)), Cell::Number(1.5));
        assert_eq!(to_cell(&DataType::Empty), Cell::Empty);
        assert_eq!(
            to_cell(&DataType::String("Chile".to_string())),
            Cell::Text("Chile".to_string())
        );
        assert_eq!(to_cell(&DataType::Bool(true)).amount(), None);
    }
}
