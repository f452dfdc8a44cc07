//! Yearly totals of the two reference economies, for the trend line chart.

use std::collections::BTreeMap;

use log::debug;

use crate::config::{DominanceRules, RawTradeRecord, TradeType};
use crate::table::Economy;

#[derive(PartialEq, Debug, Clone)]
pub struct TrendPoint {
    pub economy: Economy,
    pub trade_type: TradeType,
    pub year: i32,
    /// Summed over all partners.
    pub value: f64,
}

/// Sums the declared trade of each reference economy over all its partners.
///
/// Points are ordered by economy (US first), trade type and year. Every
/// configured year gets a point, zero when nothing was reported.
pub fn trend_series(coll: &[RawTradeRecord], rules: &DominanceRules) -> Vec<TrendPoint> {
    let economies = [
        (Economy::Us, rules.economies.us_reporter.as_str()),
        (Economy::China, rules.economies.china_reporter.as_str()),
    ];
    let mut sums: BTreeMap<(usize, TradeType, i32), f64> = BTreeMap::new();
    for (idx, _) in economies.iter().enumerate() {
        for t in TradeType::ALL {
            for year in rules.years.iter() {
                sums.insert((idx, t, *year), 0.0);
            }
        }
    }

    for r in coll.iter() {
        let Some(idx) = economies
            .iter()
            .position(|(_, name)| *name == r.reporting_country.trim())
        else {
            continue;
        };
        for (year, amount) in r.year_values.iter() {
            // Same rule as the pivot: bad amounts count as 0.
            if !amount.is_finite() || *amount < 0.0 {
                continue;
            }
            if let Some(sum) = sums.get_mut(&(idx, r.trade_type, *year)) {
                *sum += *amount;
            }
        }
    }
    debug!("trend_series: {} points", sums.len());

    sums.into_iter()
        .map(|((idx, trade_type, year), value)| TrendPoint {
            economy: economies[idx].0,
            trade_type,
            year,
            value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReferenceEconomies;

    fn rec(country: &str, partner: &str, t: TradeType, values: &[(i32, f64)]) -> RawTradeRecord {
        RawTradeRecord {
            reporting_country: country.to_string(),
            partner: partner.to_string(),
            trade_type: t,
            year_values: values.iter().copied().collect(),
        }
    }

    #[test]
    fn sums_over_partners() {
        let rules = DominanceRules::new(vec![2020, 2021], ReferenceEconomies::default()).unwrap();
        let coll = vec![
            rec("United States", "Germany", TradeType::Export, &[(2020, 100.0), (2021, 10.0)]),
            rec("United States", "France", TradeType::Export, &[(2020, 50.0), (1999, 7.0)]),
            rec("China", "Germany", TradeType::Import, &[(2021, 30.0)]),
            rec("France", "Germany", TradeType::Export, &[(2020, 1000.0)]),
        ];
        let series = trend_series(&coll, &rules);
        assert_eq!(series.len(), 2 * 2 * 2);
        assert_eq!(series[0].economy, Economy::Us);
        assert_eq!(series[0].trade_type, TradeType::Export);
        assert_eq!((series[0].year, series[0].value), (2020, 150.0));
        assert_eq!((series[1].year, series[1].value), (2021, 10.0));
        let china_import_2021 = series
            .iter()
            .find(|p| {
                p.economy == Economy::China && p.trade_type == TradeType::Import && p.year == 2021
            })
            .unwrap();
        assert_eq!(china_import_2021.value, 30.0);
    }

    #[test]
    fn negative_amounts_are_ignored() {
        let rules = DominanceRules::new(vec![2020], ReferenceEconomies::default()).unwrap();
        let coll = vec![
            rec("United States", "Germany", TradeType::Export, &[(2020, 100.0)]),
            rec("United States", "France", TradeType::Export, &[(2020, -40.0)]),
            rec("United States", "Chile", TradeType::Export, &[(2020, f64::NAN)]),
        ];
        let series = trend_series(&coll, &rules);
        assert_eq!(series[0].value, 100.0);
    }
}
