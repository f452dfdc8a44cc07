//! Flat per-country rows for ranking and filtering, and the values the ranked
//! table displays.

use std::cmp::Ordering;
use std::str::FromStr;

use log::{debug, warn};

use crate::config::{DominanceErrors, DominanceTable, FlowType, PartnerYearFlow};
use crate::reconcile::{Continent, ContinentTable};

pub const TOP_N_COUNTRIES: usize = 10;

/// A `PartnerYearFlow` with its combined trade and continent.
#[derive(PartialEq, Debug, Clone)]
pub struct CountrySummary {
    pub flow: PartnerYearFlow,
    pub total_trade: f64,
    pub continent: Continent,
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct PreparedTable {
    pub rows: Vec<CountrySummary>,
    pub warnings: Vec<String>,
}

/// Derives one summary row per record of the dominance table.
pub fn prepare_summaries(table: &DominanceTable, continents: &ContinentTable) -> PreparedTable {
    if table.is_empty() {
        let msg = "no dominance data available for the table".to_string();
        warn!("prepare_summaries: {}", msg);
        return PreparedTable {
            rows: Vec::new(),
            warnings: vec![msg],
        };
    }
    let rows: Vec<CountrySummary> = table
        .records
        .iter()
        .map(|r| CountrySummary {
            flow: r.clone(),
            total_trade: r.combined_trade(),
            continent: continents.lookup(&r.partner),
        })
        .collect();

    let mut warnings = Vec::new();
    let unknown: Vec<&str> = {
        let mut names: Vec<&str> = rows
            .iter()
            .filter(|r| r.continent == Continent::Unknown)
            .map(|r| r.flow.partner.as_str())
            .collect();
        names.dedup();
        names
    };
    if !unknown.is_empty() {
        debug!("prepare_summaries: partners without continent: {:?}", unknown);
        warnings.push(format!(
            "{} partners have no continent and only appear in the World view",
            unknown.len()
        ));
    }
    PreparedTable { rows, warnings }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Region {
    World,
    Continent(Continent),
}

impl Region {
    pub fn contains(&self, c: Continent) -> bool {
        match self {
            Region::World => true,
            Region::Continent(x) => *x == c,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Region::World => "World",
            Region::Continent(c) => c.name(),
        }
    }
}

impl Default for Region {
    fn default() -> Self {
        Region::World
    }
}

impl FromStr for Region {
    type Err = DominanceErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("world") {
            Ok(Region::World)
        } else {
            s.parse::<Continent>().map(Region::Continent)
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SortOrder {
    Descending,
    Ascending,
}

impl SortOrder {
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Descending => "Descending",
            SortOrder::Ascending => "Ascending",
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Descending
    }
}

impl FromStr for SortOrder {
    type Err = DominanceErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "descending" | "desc" => Ok(SortOrder::Descending),
            "ascending" | "asc" => Ok(SortOrder::Ascending),
            _ => Err(DominanceErrors::UnknownSortOrder(s.to_string())),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TableQuery {
    pub year: i32,
    pub flow: FlowType,
    pub region: Region,
    pub sort_order: SortOrder,
    pub top_n: usize,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Economy {
    Us,
    China,
}

impl Economy {
    pub fn label(&self) -> &'static str {
        match self {
            Economy::Us => "US",
            Economy::China => "China",
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct RankedRow {
    pub rank: usize,
    pub partner: String,
    pub continent: Continent,
    pub us_trade: f64,
    pub china_trade: f64,
    pub total_trade: f64,
}

impl RankedRow {
    /// The slices of the pie drawn next to the row. Empty sides are left out.
    pub fn shares(&self) -> Vec<(Economy, f64)> {
        let mut res = Vec::new();
        if self.total_trade <= 0.0 {
            return res;
        }
        if self.us_trade > 0.0 {
            res.push((Economy::Us, self.us_trade / self.total_trade));
        }
        if self.china_trade > 0.0 {
            res.push((Economy::China, self.china_trade / self.total_trade));
        }
        res
    }
}

/// Selects, sorts and ranks the rows of one table view.
pub fn rank_countries(rows: &[CountrySummary], query: &TableQuery) -> Vec<RankedRow> {
    let mut selected: Vec<&CountrySummary> = rows
        .iter()
        .filter(|r| {
            r.flow.year == query.year
                && r.flow.flow_type == query.flow
                && query.region.contains(r.continent)
                && r.total_trade > 0.0
        })
        .collect();
    debug!(
        "rank_countries: {} rows match {:?}",
        selected.len(),
        query
    );

    selected.sort_by(|a, b| {
        let by_total = a
            .total_trade
            .partial_cmp(&b.total_trade)
            .unwrap_or(Ordering::Equal);
        let by_total = match query.sort_order {
            SortOrder::Descending => by_total.reverse(),
            SortOrder::Ascending => by_total,
        };
        by_total.then_with(|| a.flow.partner.cmp(&b.flow.partner))
    });

    selected
        .into_iter()
        .take(query.top_n)
        .enumerate()
        .map(|(idx, r)| RankedRow {
            rank: idx + 1,
            partner: r.flow.partner.clone(),
            continent: r.continent,
            us_trade: r.flow.us_trade,
            china_trade: r.flow.china_trade,
            total_trade: r.total_trade,
        })
        .collect()
}

/// One tile of the continent treemap: a continent and its trading partners.
#[derive(PartialEq, Debug, Clone)]
pub struct ContinentTotal {
    pub continent: Continent,
    pub total_trade: f64,
    /// (partner, combined trade), largest first.
    pub partners: Vec<(String, f64)>,
}

/// Groups the combined trade of one year and flow by continent.
///
/// Partners without trade are left out, and so are continents left empty.
/// Partners without a known continent are grouped under `Unknown`.
pub fn continent_totals(rows: &[CountrySummary], year: i32, flow: FlowType) -> Vec<ContinentTotal> {
    let mut groups: Vec<ContinentTotal> = Vec::new();
    for r in rows.iter() {
        if r.flow.year != year || r.flow.flow_type != flow {
            continue;
        }
        if r.total_trade.is_nan() || r.total_trade <= 0.0 {
            continue;
        }
        let idx = match groups.iter().position(|g| g.continent == r.continent) {
            Some(idx) => idx,
            None => {
                groups.push(ContinentTotal {
                    continent: r.continent,
                    total_trade: 0.0,
                    partners: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[idx];
        group.total_trade += r.total_trade;
        group.partners.push((r.flow.partner.clone(), r.total_trade));
    }

    let by_value = |a: f64, b: f64| b.partial_cmp(&a).unwrap_or(Ordering::Equal);
    for g in groups.iter_mut() {
        g.partners
            .sort_by(|a, b| by_value(a.1, b.1).then_with(|| a.0.cmp(&b.0)));
    }
    groups.sort_by(|a, b| {
        by_value(a.total_trade, b.total_trade)
            .then_with(|| a.continent.name().cmp(b.continent.name()))
    });
    debug!(
        "continent_totals: {} continents for {} {:?}",
        groups.len(),
        year,
        flow
    );
    groups
}

/// Formats an amount expressed in millions of US dollars.
pub fn format_trade_value(value: f64) -> String {
    if value.is_nan() || value == 0.0 {
        return "$0".to_string();
    }
    if value.abs() >= 1_000_000.0 {
        format!("${:.2}T", value / 1_000_000.0)
    } else if value.abs() >= 1_000.0 {
        format!("${:.2}B", value / 1_000.0)
    } else {
        format!("${:.2}M", value)
    }
}
