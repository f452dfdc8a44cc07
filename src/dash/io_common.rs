// Primitives shared by the tabular readers.

use std::collections::BTreeMap;
use std::path::Path;

use crate::dash::*;

/// The names of the identifying columns of one input flavour.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ColumnNames {
    pub country: &'static str,
    pub partner: &'static str,
    pub trade_type: &'static str,
}

/// The layout of the cleaned trade file.
pub const CLEAN_COLUMNS: ColumnNames = ColumnNames {
    country: "Country",
    partner: "Partner",
    trade_type: "Trade_Type",
};

/// A cell as delivered by any of the readers.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn text(&self) -> String {
        match self {
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(f) if f.fract() == 0.0 => format!("{}", *f as i64),
            Cell::Number(f) => f.to_string(),
            Cell::Empty => "".to_string(),
        }
    }

    /// Missing or unparsable amounts are absent, not zero.
    pub fn amount(&self) -> Option<f64> {
        match self {
            Cell::Number(f) => Some(*f),
            Cell::Text(s) => parse_amount(s),
            Cell::Empty => None,
        }
    }
}

pub fn parse_amount(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    t.replace(',', "").parse::<f64>().ok()
}

/// A row before the provider-specific vocabulary has been applied.
#[derive(PartialEq, Debug, Clone)]
pub struct RawRow {
    pub lineno: usize,
    pub country: String,
    pub partner: String,
    pub trade_type: String,
    pub year_values: BTreeMap<i32, f64>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Layout {
    country: usize,
    partner: usize,
    trade_type: usize,
    years: Vec<(usize, i32)>,
}

impl Layout {
    pub fn from_headers(headers: &[String], cols: &ColumnNames, path: &str) -> BDashResult<Layout> {
        let find = |name: &str| -> BDashResult<usize> {
            match headers.iter().position(|h| h.trim() == name) {
                Some(idx) => Ok(idx),
                None => Err(Box::new(DashError::MissingColumn {
                    column: name.to_string(),
                    path: path.to_string(),
                })),
            }
        };
        let layout = Layout {
            country: find(cols.country)?,
            partner: find(cols.partner)?,
            trade_type: find(cols.trade_type)?,
            years: year_columns(headers),
        };
        debug!("from_headers: {:?}: {:?}", simplify_file_name(path), layout);
        Ok(layout)
    }

    pub fn has_years(&self) -> bool {
        !self.years.is_empty()
    }

    pub fn read_row(&self, cells: &[Cell], lineno: usize) -> RawRow {
        let get = |idx: usize| cells.get(idx).cloned().unwrap_or(Cell::Empty);
        let mut year_values = BTreeMap::new();
        for (idx, year) in self.years.iter() {
            if let Some(x) = get(*idx).amount() {
                year_values.insert(*year, x);
            }
        }
        RawRow {
            lineno,
            country: get(self.country).text(),
            partner: get(self.partner).text(),
            trade_type: get(self.trade_type).text(),
            year_values,
        }
    }
}

/// The columns whose header is a four-digit year.
pub fn year_columns(headers: &[String]) -> Vec<(usize, i32)> {
    headers
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| {
            let t = h.trim();
            let t = t.strip_suffix(".0").unwrap_or(t);
            if t.len() == 4 && t.chars().all(|c| c.is_ascii_digit()) {
                t.parse::<i32>().ok().map(|y| (idx, y))
            } else {
                None
            }
        })
        .collect()
}

/// Turns a cleaned row into a record. Rows of another trade type or without a
/// partner are dropped.
pub fn clean_row_to_record(row: RawRow) -> Option<RawTradeRecord> {
    let trade_type = match row.trade_type.parse::<TradeType>() {
        Ok(t) => t,
        Err(e) => {
            debug!("clean_row_to_record: line {}: skipping: {}", row.lineno, e);
            return None;
        }
    };
    if row.partner.is_empty() || row.country.is_empty() {
        debug!(
            "clean_row_to_record: line {}: skipping row without country or partner",
            row.lineno
        );
        return None;
    }
    Some(RawTradeRecord {
        reporting_country: row.country,
        partner: row.partner,
        trade_type,
        year_values: row.year_values,
    })
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Paths of the configuration are relative to its directory.
pub fn resolve_path(root: &Path, file_path: &str) -> String {
    root.join(file_path).display().to_string()
}
