// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// The direction declared by a reporting economy in the source data.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum TradeType {
    Export,
    Import,
}

impl TradeType {
    pub const ALL: [TradeType; 2] = [TradeType::Export, TradeType::Import];

    pub fn key(&self) -> &'static str {
        match self {
            TradeType::Export => "Export",
            TradeType::Import => "Import",
        }
    }
}

impl FromStr for TradeType {
    type Err = DominanceErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Export" => Ok(TradeType::Export),
            "Import" => Ok(TradeType::Import),
            x => Err(DominanceErrors::UnknownTradeType(x.to_string())),
        }
    }
}

/// One reporting economy's declared trade with one partner, for one direction,
/// across all the years present in the source.
#[derive(PartialEq, Debug, Clone)]
pub struct RawTradeRecord {
    pub reporting_country: String,
    pub partner: String,
    pub trade_type: TradeType,
    /// Missing cells are simply absent from the map.
    pub year_values: BTreeMap<i32, f64>,
}

// ******** Output data structures *********

/// The trade direction being measured.
///
/// `Total` is synthesized as the sum of exports and imports.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum FlowType {
    Total,
    Import,
    Export,
}

impl FlowType {
    /// The emission order of the pipeline.
    pub const ALL: [FlowType; 3] = [FlowType::Total, FlowType::Import, FlowType::Export];

    pub fn key(&self) -> &'static str {
        match self {
            FlowType::Total => "Total",
            FlowType::Import => "Import",
            FlowType::Export => "Export",
        }
    }

    /// The label shown by the dashboard controls.
    pub fn label(&self) -> &'static str {
        match self {
            FlowType::Total => "Two-way trade",
            FlowType::Import => "Imports",
            FlowType::Export => "Exports",
        }
    }
}

impl Default for FlowType {
    fn default() -> Self {
        FlowType::Total
    }
}

impl From<TradeType> for FlowType {
    fn from(t: TradeType) -> Self {
        match t {
            TradeType::Export => FlowType::Export,
            TradeType::Import => FlowType::Import,
        }
    }
}

/// Accepts either the key ("Total") or the display label ("Two-way trade").
impl FromStr for FlowType {
    type Err = DominanceErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        FlowType::ALL
            .iter()
            .find(|f| {
                f.key().eq_ignore_ascii_case(needle) || f.label().eq_ignore_ascii_case(needle)
            })
            .copied()
            .ok_or_else(|| DominanceErrors::UnknownFlowType(needle.to_string()))
    }
}

/// The dominance measurement for one partner, one year and one flow.
#[derive(PartialEq, Debug, Clone)]
pub struct PartnerYearFlow {
    /// Canonical (boundary-file) name.
    pub partner: String,
    pub year: i32,
    pub flow_type: FlowType,
    pub us_trade: f64,
    pub china_trade: f64,
    /// `None` when neither reference economy reports any trade.
    pub ratio: Option<f64>,
}

impl PartnerYearFlow {
    pub fn combined_trade(&self) -> f64 {
        self.us_trade + self.china_trade
    }
}

/// The complete output of the pipeline. Read-only once built.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct DominanceTable {
    pub records: Vec<PartnerYearFlow>,
    pub years: Vec<i32>,
}

impl DominanceTable {
    pub fn empty() -> DominanceTable {
        DominanceTable::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.years.iter().max().copied()
    }

    /// All the records of one map frame.
    pub fn frame(&self, year: i32, flow: FlowType) -> impl Iterator<Item = &PartnerYearFlow> {
        self.records
            .iter()
            .filter(move |r| r.year == year && r.flow_type == flow)
    }

    pub fn get(&self, partner: &str, year: i32, flow: FlowType) -> Option<&PartnerYearFlow> {
        self.records
            .iter()
            .find(|r| r.partner == partner && r.year == year && r.flow_type == flow)
    }

    /// The distinct partner names, in table order.
    pub fn partners(&self) -> Vec<&str> {
        let mut res: Vec<&str> = Vec::new();
        for r in self.records.iter() {
            if res.last() != Some(&r.partner.as_str()) {
                res.push(r.partner.as_str());
            }
        }
        res
    }
}

/// Errors that prevent the pipeline from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum DominanceErrors {
    NoYears,
    SameReferenceEconomies(String),
    UnknownTradeType(String),
    UnknownFlowType(String),
    UnknownContinent(String),
    UnknownSortOrder(String),
}

impl Error for DominanceErrors {}

impl Display for DominanceErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DominanceErrors::NoYears => write!(f, "no years configured"),
            DominanceErrors::SameReferenceEconomies(s) => {
                write!(f, "both reference economies are {:?}", s)
            }
            DominanceErrors::UnknownTradeType(s) => write!(f, "unknown trade type {:?}", s),
            DominanceErrors::UnknownFlowType(s) => write!(f, "unknown trade flow {:?}", s),
            DominanceErrors::UnknownContinent(s) => write!(f, "unknown continent {:?}", s),
            DominanceErrors::UnknownSortOrder(s) => write!(f, "unknown sort order {:?}", s),
        }
    }
}

// ********* Configuration **********

pub const FIRST_YEAR: i32 = 2001;
pub const LAST_YEAR: i32 = 2024;

/// The two reference economies, as they appear in the `Country` column and
/// as canonical partner names.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReferenceEconomies {
    pub us_reporter: String,
    pub china_reporter: String,
    pub us_partner: String,
    pub china_partner: String,
}

impl Default for ReferenceEconomies {
    fn default() -> Self {
        ReferenceEconomies {
            us_reporter: "United States".to_string(),
            china_reporter: "China".to_string(),
            us_partner: "United States of America".to_string(),
            china_partner: "China".to_string(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DominanceRules {
    pub years: Vec<i32>,
    pub economies: ReferenceEconomies,
}

impl DominanceRules {
    pub fn new(years: Vec<i32>, economies: ReferenceEconomies) -> Result<Self, DominanceErrors> {
        let mut years = years;
        years.sort_unstable();
        years.dedup();
        if years.is_empty() {
            return Err(DominanceErrors::NoYears);
        }
        if economies.us_reporter == economies.china_reporter {
            return Err(DominanceErrors::SameReferenceEconomies(
                economies.us_reporter.clone(),
            ));
        }
        Ok(DominanceRules { years, economies })
    }
}

impl Default for DominanceRules {
    fn default() -> Self {
        DominanceRules {
            years: (FIRST_YEAR..=LAST_YEAR).collect(),
            economies: ReferenceEconomies::default(),
        }
    }
}
