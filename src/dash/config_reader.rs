use std::collections::BTreeMap;

use crate::dash::*;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "dashboardTitle")]
    pub dashboard_title: Option<String>,
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
    #[serde(rename = "tableCsvFile")]
    pub table_csv_file: Option<String>,
}

/// The input formats the readers understand.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Csv,
    ImfCsv,
    Xlsx,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TradeSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl TradeSource {
    pub fn provider(&self) -> DashResult<Provider> {
        match self.provider.as_str() {
            "" | "csv" => Ok(Provider::Csv),
            "imf_csv" | "imf" => Ok(Provider::ImfCsv),
            "xlsx" | "excel" => Ok(Provider::Xlsx),
            x => whatever!("unknown trade source provider: {}", x),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct BoundarySource {
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "timeoutSeconds")]
    pub timeout_seconds: Option<u64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReferenceSettings {
    #[serde(rename = "usReporter")]
    pub us_reporter: Option<String>,
    #[serde(rename = "chinaReporter")]
    pub china_reporter: Option<String>,
    #[serde(rename = "usPartner")]
    pub us_partner: Option<String>,
    #[serde(rename = "chinaPartner")]
    pub china_partner: Option<String>,
}

impl ReferenceSettings {
    pub fn economies(&self) -> ReferenceEconomies {
        let d = ReferenceEconomies::default();
        ReferenceEconomies {
            us_reporter: self.us_reporter.clone().unwrap_or(d.us_reporter),
            china_reporter: self.china_reporter.clone().unwrap_or(d.china_reporter),
            us_partner: self.us_partner.clone().unwrap_or(d.us_partner),
            china_partner: self.china_partner.clone().unwrap_or(d.china_partner),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct YearRange {
    pub first: i32,
    pub last: i32,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ViewSettings {
    pub year: Option<i32>,
    pub flow: Option<String>,
    pub continent: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
    #[serde(rename = "topN")]
    pub top_n: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "tradeSource")]
    pub trade_source: TradeSource,
    #[serde(rename = "boundarySource")]
    pub boundary_source: Option<BoundarySource>,
    #[serde(rename = "referenceEconomies", default)]
    pub reference_economies: ReferenceSettings,
    pub years: Option<YearRange>,
    /// Extra partner renamings, applied on top of the built-in table.
    #[serde(rename = "nameOverrides", default)]
    pub name_overrides: BTreeMap<String, String>,
    #[serde(default)]
    pub view: ViewSettings,
}

impl DashConfig {
    pub fn rules(&self) -> DashResult<DominanceRules> {
        let years: Vec<i32> = match &self.years {
            Some(yr) => (yr.first..=yr.last).collect(),
            None => (FIRST_YEAR..=LAST_YEAR).collect(),
        };
        DominanceRules::new(years, self.reference_economies.economies()).context(RulesSnafu {})
    }

    pub fn names(&self) -> NameTable {
        NameTable::default().with_entries(
            self.name_overrides
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }
}

pub fn read_config(path: &str) -> BDashResult<DashConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// A reference summary, as previously written by this program.
pub fn read_summary(path: &str) -> BDashResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
