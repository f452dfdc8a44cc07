// The raw IMF Direction of Trade export, before cleaning.

use crate::dash::{
    io_common::{ColumnNames, RawRow},
    io_csv::read_csv_rows,
    *,
};

/// The layout of the raw export. DATASET, SERIES_CODE and OBS_MEASURE are
/// not read.
pub const IMF_COLUMNS: ColumnNames = ColumnNames {
    country: "COUNTRY",
    partner: "COUNTERPART_COUNTRY",
    trade_type: "INDICATOR",
};

const IMF_COUNTRIES: &[(&str, &str)] = &[("China, People's Republic of", "China")];

const IMF_INDICATORS: &[(&str, TradeType)] = &[
    (
        "Exports of goods, Free on board (FOB), US dollar",
        TradeType::Export,
    ),
    (
        "Imports of goods, Cost insurance freight (CIF), US dollar",
        TradeType::Import,
    ),
];

pub fn read_imf_trade(path: &str) -> BDashResult<Vec<RawTradeRecord>> {
    let rows = read_csv_rows(path, &IMF_COLUMNS)?;
    let res: Vec<RawTradeRecord> = rows.into_iter().filter_map(imf_row_to_record).collect();
    info!("read_imf_trade: {:?}: {} records", path, res.len());
    Ok(res)
}

fn imf_country(name: String) -> String {
    match IMF_COUNTRIES.iter().find(|(raw, _)| *raw == name) {
        Some((_, clean)) => clean.to_string(),
        None => name,
    }
}

fn imf_row_to_record(row: RawRow) -> Option<RawTradeRecord> {
    let Some((_, trade_type)) = IMF_INDICATORS
        .iter()
        .find(|(label, _)| *label == row.trade_type)
    else {
        debug!(
            "imf_row_to_record: line {}: skipping indicator {:?}",
            row.lineno, row.trade_type
        );
        return None;
    };
    if row.partner.is_empty() || row.country.is_empty() {
        return None;
    }
    Some(RawTradeRecord {
        reporting_country: imf_country(row.country),
        partner: imf_country(row.partner),
        trade_type: *trade_type,
        year_values: row.year_values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dash::tests::test_file;

    #[test]
    fn reads_raw_export() {
        let records = read_imf_trade(&test_file("imf/raw_trade_data.csv")).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].reporting_country, "United States");
        assert_eq!(records[0].trade_type, TradeType::Export);
        assert_eq!(records[1].reporting_country, "China");
        assert_eq!(records[1].partner, "Germany");
        assert_eq!(records[1].year_values.get(&2020), Some(&300.0));
        assert_eq!(records[2].partner, "China");
        assert_eq!(records[2].trade_type, TradeType::Import);
    }
}
