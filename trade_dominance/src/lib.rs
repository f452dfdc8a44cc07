mod config;
pub mod reconcile;
pub mod state;
pub mod table;
pub mod trend;

use log::{debug, info, warn};

use std::collections::{BTreeMap, BTreeSet, HashMap};

pub use crate::config::*;
pub use crate::reconcile::{Continent, ContinentTable, NameTable};

// **** Private structures ****

/// Amounts of one reporter towards one partner, keyed by (year, flow).
/// `Total` cells are synthesized after the pivot.
type WideRow = HashMap<(i32, FlowType), f64>;

/// The pivoted table: canonical partner -> reporting country -> cells.
/// Ordered by partner so that the output is deterministic.
type WideTable = BTreeMap<String, HashMap<String, WideRow>>;

/// Runs the dominance pipeline over the raw records.
///
/// Arguments:
/// * `coll` the raw long-format records, one per reporter, partner and trade type
/// * `rules` the configured years and reference economies
/// * `names` the reconciliation applied to partner labels
///
/// Reporters other than the two reference economies only contribute their
/// partners to the partner list.
pub fn run_dominance(
    coll: &[RawTradeRecord],
    rules: &DominanceRules,
    names: &NameTable,
) -> Result<DominanceTable, DominanceErrors> {
    info!(
        "run_dominance: Processing {:?} records, {:?} years, rules: {:?}",
        coll.len(),
        rules.years.len(),
        rules.economies
    );
    if rules.years.is_empty() {
        return Err(DominanceErrors::NoYears);
    }

    let wide = pivot(coll, &rules.years, names);
    info!("run_dominance: {:?} distinct partners", wide.len());
    if wide.is_empty() {
        return Ok(DominanceTable::empty());
    }

    let economies = &rules.economies;
    let mut records: Vec<PartnerYearFlow> =
        Vec::with_capacity(wide.len() * rules.years.len() * FlowType::ALL.len());
    for (partner, reporters) in wide.iter() {
        let us_row = reporters.get(&economies.us_reporter);
        let china_row = reporters.get(&economies.china_reporter);
        for year in rules.years.iter() {
            for flow in FlowType::ALL {
                let us_trade = cell(us_row, *year, flow);
                let china_trade = cell(china_row, *year, flow);
                let ratio = if partner == &economies.us_partner {
                    Some(0.0)
                } else if partner == &economies.china_partner {
                    Some(1.0)
                } else {
                    dominance_ratio(us_trade, china_trade)
                };
                records.push(PartnerYearFlow {
                    partner: partner.clone(),
                    year: *year,
                    flow_type: flow,
                    us_trade,
                    china_trade,
                    ratio,
                });
            }
        }
    }

    debug!("run_dominance: {:?} records emitted", records.len());
    Ok(DominanceTable {
        records,
        years: rules.years.clone(),
    })
}

/// The share of the combined trade attributable to the China side.
/// Undefined when there is no trade at all, or when a side is not finite.
pub fn dominance_ratio(us_trade: f64, china_trade: f64) -> Option<f64> {
    if !us_trade.is_finite() || !china_trade.is_finite() {
        return None;
    }
    let total = us_trade + china_trade;
    if total <= 0.0 {
        None
    } else if total.is_finite() {
        Some(china_trade / total)
    } else {
        // Both sides are finite but their sum overflows.
        let m = us_trade.max(china_trade);
        let (us, china) = (us_trade / m, china_trade / m);
        Some(china / (us + china))
    }
}

fn cell(row: Option<&WideRow>, year: i32, flow: FlowType) -> f64 {
    row.and_then(|r| r.get(&(year, flow)))
        .copied()
        .unwrap_or(0.0)
}

/// Reshapes the long records into one row per (partner, reporter), summing
/// duplicates and synthesizing the `Total` flow for every configured year.
fn pivot(coll: &[RawTradeRecord], years: &[i32], names: &NameTable) -> WideTable {
    let wanted_years: BTreeSet<i32> = years.iter().copied().collect();
    let mut wide: WideTable = BTreeMap::new();
    for r in coll.iter() {
        let partner = names.reconcile(r.partner.trim());
        if partner.is_empty() {
            warn!(
                "pivot: skipping record of {:?} without a partner",
                r.reporting_country
            );
            continue;
        }
        let row = wide
            .entry(partner.to_string())
            .or_default()
            .entry(r.reporting_country.trim().to_string())
            .or_default();
        for (year, amount) in r.year_values.iter() {
            if !wanted_years.contains(year) {
                continue;
            }
            let amount = checked_amount(*amount, r, *year);
            *row.entry((*year, r.trade_type.into())).or_insert(0.0) += amount;
        }
    }

    for reporters in wide.values_mut() {
        for row in reporters.values_mut() {
            for year in years.iter() {
                let total: f64 = [FlowType::Export, FlowType::Import]
                    .iter()
                    .map(|f| row.get(&(*year, *f)).copied().unwrap_or(0.0))
                    .sum();
                row.insert((*year, FlowType::Total), total);
            }
        }
    }
    wide
}

fn checked_amount(amount: f64, r: &RawTradeRecord, year: i32) -> f64 {
    if amount.is_finite() && amount >= 0.0 {
        amount
    } else {
        warn!(
            "checked_amount: {:?} -> {:?} {:?} {}: treating {:?} as missing",
            r.reporting_country, r.partner, r.trade_type, year, amount
        );
        0.0
    }
}

/// Partner names of the table that the boundary data does not know about.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct CoverageReport {
    pub matched: usize,
    pub unmatched: Vec<String>,
}

/// Checks that every partner of the table can be drawn on the map.
pub fn coverage_report<'a, I>(table: &DominanceTable, boundary_names: I) -> CoverageReport
where
    I: IntoIterator<Item = &'a str>,
{
    let known: BTreeSet<&str> = boundary_names.into_iter().collect();
    let mut report = CoverageReport::default();
    for partner in table.partners() {
        if known.contains(partner) {
            report.matched += 1;
        } else {
            report.unmatched.push(partner.to_string());
        }
    }
    if !report.unmatched.is_empty() {
        warn!(
            "coverage_report: {} partners without a boundary shape: {:?}",
            report.unmatched.len(),
            report.unmatched
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn rec(country: &str, partner: &str, t: TradeType, values: &[(i32, f64)]) -> RawTradeRecord {
        RawTradeRecord {
            reporting_country: country.to_string(),
            partner: partner.to_string(),
            trade_type: t,
            year_values: values.iter().copied().collect(),
        }
    }

    fn rules(years: &[i32]) -> DominanceRules {
        DominanceRules::new(years.to_vec(), ReferenceEconomies::default()).unwrap()
    }

    fn sample() -> Vec<RawTradeRecord> {
        vec![
            rec("United States", "Germany", TradeType::Export, &[(2020, 100.0), (2021, 50.0)]),
            rec("United States", "Germany", TradeType::Import, &[(2020, 20.0)]),
            rec("China", "Germany", TradeType::Export, &[(2020, 300.0)]),
            rec("China", "Germany", TradeType::Import, &[(2020, 10.0), (2021, 5.0)]),
            rec("China", "United States", TradeType::Export, &[(2020, 500.0)]),
            rec("United States", "China", TradeType::Import, &[(2020, 400.0)]),
            rec("China", "Viet Nam", TradeType::Export, &[(2020, 70.0)]),
            rec("France", "Nauru, Republic of", TradeType::Export, &[(2020, 1.0)]),
        ]
    }

    #[test]
    fn example_export_ratio() {
        init();
        let table = run_dominance(&sample(), &rules(&[2020, 2021]), &NameTable::default()).unwrap();
        let r = table.get("Germany", 2020, FlowType::Export).unwrap();
        assert_eq!(r.us_trade, 100.0);
        assert_eq!(r.china_trade, 300.0);
        assert_eq!(r.ratio, Some(0.75));
    }

    #[test]
    fn total_is_export_plus_import() {
        init();
        let table = run_dominance(&sample(), &rules(&[2020, 2021]), &NameTable::default()).unwrap();
        for partner in table.partners() {
            for year in table.years.iter() {
                let t = table.get(partner, *year, FlowType::Total).unwrap();
                let e = table.get(partner, *year, FlowType::Export).unwrap();
                let i = table.get(partner, *year, FlowType::Import).unwrap();
                assert_eq!(t.us_trade, e.us_trade + i.us_trade);
                assert_eq!(t.china_trade, e.china_trade + i.china_trade);
            }
        }
        let g = table.get("Germany", 2020, FlowType::Total).unwrap();
        assert_eq!((g.us_trade, g.china_trade), (120.0, 310.0));
    }

    #[test]
    fn ratios_are_bounded() {
        init();
        let table = run_dominance(&sample(), &rules(&[2020, 2021]), &NameTable::default()).unwrap();
        for r in table.records.iter() {
            if let Some(x) = r.ratio {
                assert!((0.0..=1.0).contains(&x), "{:?}", r);
            }
        }
    }

    #[test]
    fn reference_economies_are_forced() {
        init();
        let table = run_dominance(&sample(), &rules(&[2020, 2021]), &NameTable::default()).unwrap();
        let us: Vec<&PartnerYearFlow> = table
            .records
            .iter()
            .filter(|r| r.partner == "United States of America")
            .collect();
        let china: Vec<&PartnerYearFlow> =
            table.records.iter().filter(|r| r.partner == "China").collect();
        assert_eq!(us.len(), 6);
        assert_eq!(china.len(), 6);
        assert!(us.iter().all(|r| r.ratio == Some(0.0)));
        assert!(china.iter().all(|r| r.ratio == Some(1.0)));
        // The amounts stay specific to the flow.
        let us_export = table.get("United States of America", 2020, FlowType::Export).unwrap();
        assert_eq!(us_export.china_trade, 500.0);
    }

    #[test]
    fn no_trade_leaves_ratio_undefined() {
        init();
        let table = run_dominance(&sample(), &rules(&[2020, 2021]), &NameTable::default()).unwrap();
        let nauru = table.get("Nauru, Republic of", 2020, FlowType::Export).unwrap();
        assert_eq!(nauru.us_trade, 0.0);
        assert_eq!(nauru.china_trade, 0.0);
        assert_eq!(nauru.ratio, None);
        // Equal trade is a defined ratio.
        assert_eq!(dominance_ratio(5.0, 5.0), Some(0.5));
    }

    #[test]
    fn huge_amounts_keep_the_ratio_bounded() {
        init();
        let coll = vec![
            rec("United States", "Chile", TradeType::Export, &[(2020, 1.5e308)]),
            rec("United States", "Chile", TradeType::Export, &[(2020, 1.5e308)]),
            rec("China", "Chile", TradeType::Export, &[(2020, 1.5e308)]),
            rec("China", "Chile", TradeType::Export, &[(2020, 1.5e308)]),
            rec("United States", "Peru", TradeType::Export, &[(2020, 1.0e308)]),
            rec("China", "Peru", TradeType::Export, &[(2020, 1.0e308)]),
        ];
        let table = run_dominance(&coll, &rules(&[2020]), &NameTable::default()).unwrap();
        // Both sums overflow.
        let chile = table.get("Chile", 2020, FlowType::Export).unwrap();
        assert!(chile.us_trade.is_infinite());
        assert_eq!(chile.ratio, None);
        // Only the combined trade overflows.
        let peru = table.get("Peru", 2020, FlowType::Export).unwrap();
        assert_eq!(peru.ratio, Some(0.5));
        for r in table.records.iter() {
            if let Some(x) = r.ratio {
                assert!((0.0..=1.0).contains(&x), "{:?}", r);
            }
        }
        assert_eq!(dominance_ratio(f64::MAX, f64::MAX), Some(0.5));
        assert_eq!(dominance_ratio(f64::INFINITY, 1.0), None);
    }

    #[test]
    fn missing_reporter_counts_as_zero() {
        init();
        let table = run_dominance(&sample(), &rules(&[2020]), &NameTable::default()).unwrap();
        let vn = table.get("Vietnam", 2020, FlowType::Export).unwrap();
        assert_eq!(vn.us_trade, 0.0);
        assert_eq!(vn.ratio, Some(1.0));
        assert!(table.get("Viet Nam", 2020, FlowType::Export).is_none());
    }

    #[test]
    fn one_record_per_triple() {
        init();
        let mut coll = sample();
        // Two spellings of the same partner are merged.
        coll.push(rec("United States", "Taiwan, China", TradeType::Export, &[(2020, 1.0)]));
        coll.push(rec(
            "United States",
            "Taiwan Province of China",
            TradeType::Export,
            &[(2020, 2.0)],
        ));
        // Duplicated rows are summed.
        coll.push(rec("United States", "Germany", TradeType::Export, &[(2020, 100.0)]));
        let table = run_dominance(&coll, &rules(&[2020, 2021]), &NameTable::default()).unwrap();
        let mut keys: Vec<(&str, i32, FlowType)> = table
            .records
            .iter()
            .map(|r| (r.partner.as_str(), r.year, r.flow_type))
            .collect();
        let n = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), n);
        assert_eq!(n, table.partners().len() * 2 * 3);
        assert_eq!(table.get("Taiwan", 2020, FlowType::Export).unwrap().us_trade, 3.0);
        assert_eq!(table.get("Germany", 2020, FlowType::Export).unwrap().us_trade, 200.0);
    }

    #[test]
    fn running_twice_is_identical() {
        init();
        let a = run_dominance(&sample(), &rules(&[2020, 2021]), &NameTable::default()).unwrap();
        let b = run_dominance(&sample(), &rules(&[2020, 2021]), &NameTable::default()).unwrap();
        assert_eq!(format!("{:?}", a), format!("{:?}", b));
    }

    #[test]
    fn output_is_ordered() {
        init();
        let table = run_dominance(&sample(), &rules(&[2021, 2020]), &NameTable::default()).unwrap();
        assert_eq!(table.years, vec![2020, 2021]);
        assert_eq!(
            table.partners(),
            vec!["China", "Germany", "Nauru, Republic of", "United States of America", "Vietnam"]
        );
        let flows: Vec<FlowType> = table.records.iter().take(3).map(|r| r.flow_type).collect();
        assert_eq!(flows, FlowType::ALL.to_vec());
    }

    #[test]
    fn bad_amounts_are_missing() {
        init();
        let coll = vec![
            rec("United States", "Chile", TradeType::Export, &[(2020, f64::NAN)]),
            rec("China", "Chile", TradeType::Export, &[(2020, -4.0)]),
        ];
        let table = run_dominance(&coll, &rules(&[2020]), &NameTable::default()).unwrap();
        let r = table.get("Chile", 2020, FlowType::Export).unwrap();
        assert_eq!((r.us_trade, r.china_trade, r.ratio), (0.0, 0.0, None));
    }

    #[test]
    fn empty_input_gives_empty_table() {
        init();
        let table = run_dominance(&[], &rules(&[2020]), &NameTable::default()).unwrap();
        assert!(table.is_empty());
        assert!(table.years.is_empty());
    }

    #[test]
    fn invalid_rules() {
        assert_eq!(
            DominanceRules::new(vec![], ReferenceEconomies::default()),
            Err(DominanceErrors::NoYears)
        );
        let same = ReferenceEconomies {
            china_reporter: "United States".to_string(),
            ..ReferenceEconomies::default()
        };
        assert!(DominanceRules::new(vec![2020], same).is_err());
    }

    #[test]
    fn coverage_lists_unknown_partners() {
        init();
        let table = run_dominance(&sample(), &rules(&[2020]), &NameTable::default()).unwrap();
        let boundary = ["China", "Germany", "United States of America", "Vietnam"];
        let report = coverage_report(&table, boundary.iter().copied());
        assert_eq!(report.matched, 4);
        assert_eq!(report.unmatched, vec!["Nauru, Republic of".to_string()]);
    }

    #[test]
    fn flow_type_labels_round_trip() {
        for f in FlowType::ALL {
            assert_eq!(f.label().parse::<FlowType>(), Ok(f));
            assert_eq!(f.key().parse::<FlowType>(), Ok(f));
        }
        assert!("Sideways".parse::<FlowType>().is_err());
    }
}
