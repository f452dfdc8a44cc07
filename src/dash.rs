use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use trade_dominance::state::DashboardState;
use trade_dominance::table::*;
use trade_dominance::trend::*;
use trade_dominance::*;

use crate::args::Args;
use crate::dash::config_reader::*;
use crate::dash::io_boundary::{read_boundary_names, BoundaryLocation, DEFAULT_BOUNDARY_URL};
use crate::dash::io_common::resolve_path;
use crate::dash::loader::{LoadStatus, LoadedData, TradeDataLoader};

pub mod config_reader;
pub mod io_boundary;
pub mod io_common;
pub mod io_csv;
pub mod io_imf;
pub mod io_xlsx;
pub mod loader;

#[derive(Debug, Snafu)]
pub enum DashError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No usable worksheet in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Column {column} is missing in {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Error writing {path}"))]
    Writing {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing CSV file {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Error fetching {url}"))]
    Fetching { source: reqwest::Error, url: String },
    #[snafu(display("Invalid rules: {source}"))]
    Rules { source: DominanceErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashError>;
// The readers return large errors, boxing them keeps the results small.
pub type BDashResult<T> = Result<T, Box<DashError>>;

/// Everything needed for one run, after the command line has been merged into
/// the configuration.
#[derive(Debug, Clone)]
struct DashSettings {
    config: DashConfig,
    input_path: String,
    boundary: Option<BoundaryLocation>,
    out: Option<String>,
    table_out: Option<String>,
}

fn config_from_args(args: &Args) -> DashResult<DashConfig> {
    let input = match &args.input {
        Some(x) => x.clone(),
        None => whatever!("either --config or --input must be provided"),
    };
    Ok(DashConfig {
        output_settings: OutputSettings::default(),
        trade_source: TradeSource {
            provider: args.input_type.clone().unwrap_or_else(|| "csv".to_string()),
            file_path: input,
            excel_worksheet_name: None,
        },
        boundary_source: None,
        reference_economies: ReferenceSettings::default(),
        years: None,
        name_overrides: BTreeMap::new(),
        view: ViewSettings::default(),
    })
}

fn resolve_settings(config: DashConfig, root: &Path, args: &Args) -> DashSettings {
    let mut config = config;
    // Paths given on the command line are relative to the working directory.
    let input_path = match &args.input {
        Some(p) => {
            config.trade_source.file_path = p.clone();
            p.clone()
        }
        None => resolve_path(root, &config.trade_source.file_path),
    };
    if let Some(t) = &args.input_type {
        config.trade_source.provider = t.clone();
    }
    if let Some(w) = &args.excel_worksheet_name {
        config.trade_source.excel_worksheet_name = Some(w.clone());
    }

    let boundary = match (&args.boundary, &config.boundary_source) {
        (Some(b), _) => Some(BoundaryLocation::parse(b, None)),
        (None, Some(bs)) => match (&bs.file_path, &bs.url) {
            (Some(p), _) => Some(BoundaryLocation::File(resolve_path(root, p))),
            (None, Some(u)) => Some(BoundaryLocation::parse(u, bs.timeout_seconds)),
            (None, None) => Some(BoundaryLocation::parse(
                DEFAULT_BOUNDARY_URL,
                bs.timeout_seconds,
            )),
        },
        (None, None) => None,
    };

    let view = &mut config.view;
    if args.year.is_some() {
        view.year = args.year;
    }
    if args.flow.is_some() {
        view.flow = args.flow.clone();
    }
    if args.continent.is_some() {
        view.continent = args.continent.clone();
    }
    if args.sort.is_some() {
        view.sort_order = args.sort.clone();
    }
    if args.top.is_some() {
        view.top_n = args.top;
    }

    let out = match &args.out {
        Some(o) => Some(o.clone()),
        None => config
            .output_settings
            .output_file
            .as_ref()
            .map(|p| resolve_path(root, p)),
    };
    let table_out = match &args.table_out {
        Some(o) => Some(o.clone()),
        None => config
            .output_settings
            .table_csv_file
            .as_ref()
            .map(|p| resolve_path(root, p)),
    };

    DashSettings {
        config,
        input_path,
        boundary,
        out,
        table_out,
    }
}

/// Applies the requested view on top of the initial dashboard state.
fn build_state(table: &DominanceTable, view: &ViewSettings) -> BDashResult<Option<DashboardState>> {
    let state = match DashboardState::initial(table) {
        Some(s) => s,
        None => return Ok(None),
    };
    let state = match view.year {
        Some(y) => state.select_year(y, table),
        None => state,
    };
    let flow = match &view.flow {
        Some(f) => f.parse::<FlowType>().context(RulesSnafu {})?,
        None => state.flow,
    };
    let region = match &view.continent {
        Some(c) => c.parse::<Region>().context(RulesSnafu {})?,
        None => state.region,
    };
    let sort_order = match &view.sort_order {
        Some(s) => s.parse::<SortOrder>().context(RulesSnafu {})?,
        None => state.sort_order,
    };
    let top_n = view.top_n.unwrap_or(state.top_n);
    Ok(Some(DashboardState {
        flow,
        region,
        sort_order,
        top_n,
        ..state
    }))
}

fn view_to_json(state: &DashboardState) -> JSValue {
    json!({
        "year": state.year,
        "flow": state.flow.label(),
        "region": state.region.label(),
        "sortOrder": state.sort_order.label(),
        "topN": state.top_n,
    })
}

fn map_to_json(table: &DominanceTable, state: &DashboardState, unmatched: &[String]) -> JSValue {
    let frame: Vec<JSValue> = table
        .frame(state.year, state.flow)
        .map(|r| {
            json!({
                "partner": r.partner,
                "usTrade": r.us_trade,
                "chinaTrade": r.china_trade,
                "ratio": r.ratio,
            })
        })
        .collect();
    json!({
        "year": state.year,
        "flow": state.flow.label(),
        "frame": frame,
        "unmatched": unmatched,
    })
}

fn ranked_to_json(rows: &[RankedRow]) -> Vec<JSValue> {
    rows.iter()
        .map(|r| {
            let shares: Vec<JSValue> = r
                .shares()
                .iter()
                .map(|(e, s)| json!({"economy": e.label(), "share": s}))
                .collect();
            json!({
                "rank": r.rank,
                "partner": r.partner,
                "continent": r.continent.name(),
                "usTrade": format_trade_value(r.us_trade),
                "chinaTrade": format_trade_value(r.china_trade),
                "totalTrade": format_trade_value(r.total_trade),
                "shares": shares,
            })
        })
        .collect()
}

fn continents_to_json(groups: &[ContinentTotal]) -> Vec<JSValue> {
    groups
        .iter()
        .map(|g| {
            let partners: Vec<JSValue> = g
                .partners
                .iter()
                .map(|(p, x)| json!({"partner": p, "value": x}))
                .collect();
            json!({
                "continent": g.continent.name(),
                "value": g.total_trade,
                "partners": partners,
            })
        })
        .collect()
}

fn trend_to_json(points: &[TrendPoint]) -> Vec<JSValue> {
    points
        .iter()
        .map(|p| {
            json!({
                "economy": p.economy.label(),
                "tradeType": p.trade_type.key(),
                "year": p.year,
                "value": p.value,
            })
        })
        .collect()
}

struct Sections {
    view: JSValue,
    map: JSValue,
    table: Vec<JSValue>,
    continents: Vec<JSValue>,
    trend: Vec<JSValue>,
    messages: Vec<String>,
}

fn build_summary_js(settings: &DashSettings, data: &LoadedData, sections: Sections) -> JSValue {
    let config = &settings.config;
    let status = match &data.status {
        LoadStatus::Loaded => "loaded",
        LoadStatus::Unavailable(_) => "unavailable",
    };
    json!({
        "config": {
            "title": config.output_settings.dashboard_title,
            "provider": config.trade_source.provider,
            "source": config.trade_source.file_path,
        },
        "status": status,
        "years": data.table.years,
        "view": sections.view,
        "map": sections.map,
        "table": sections.table,
        "continents": sections.continents,
        "trend": sections.trend,
        "messages": sections.messages,
    })
}

/// Writes the whole dominance table, one line per partner, year and flow.
fn write_table_csv(table: &DominanceTable, path: &str) -> BDashResult<()> {
    let mut wtr = csv::Writer::from_path(path).context(CsvWriteSnafu { path })?;
    wtr.write_record(["Partner", "Year", "Flow", "US_Trade", "China_Trade", "Ratio"])
        .context(CsvWriteSnafu { path })?;
    for r in table.records.iter() {
        let ratio = r.ratio.map(|x| x.to_string()).unwrap_or_default();
        wtr.write_record([
            r.partner.clone(),
            r.year.to_string(),
            r.flow_type.key().to_string(),
            r.us_trade.to_string(),
            r.china_trade.to_string(),
            ratio,
        ])
        .context(CsvWriteSnafu { path })?;
    }
    wtr.flush().context(WritingSnafu { path })?;
    info!("write_table_csv: {} lines written to {:?}", table.records.len(), path);
    Ok(())
}

fn check_reference(reference_path: &str, pretty_js_stats: &str) -> DashResult<()> {
    let summary_ref = match read_summary(reference_path) {
        Ok(js) => js,
        Err(e) => return Err(*e),
    };
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

/// Computes the dashboard summary described by the arguments.
///
/// Missing trade data or boundary data are reported in the `messages` of the
/// summary. Only configuration problems and output failures are errors.
pub fn run_dashboard(args: &Args) -> BDashResult<()> {
    let (config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root: PathBuf = Path::new(config_path.as_str())
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            (config, root)
        }
        None => (config_from_args(args)?, PathBuf::from(".")),
    };
    let settings = resolve_settings(config, &root, args);
    info!("run_dashboard: settings: {:?}", settings);

    let rules = settings.config.rules()?;
    let mut loader = TradeDataLoader::new(
        settings.config.trade_source.clone(),
        settings.input_path.clone(),
        rules.clone(),
        settings.config.names(),
    );
    let data = loader.load()?;

    let mut messages: Vec<String> = Vec::new();
    if let LoadStatus::Unavailable(msg) = &data.status {
        messages.push(msg.clone());
    }

    let state = build_state(&data.table, &settings.config.view)?;
    debug!("run_dashboard: state: {:?}", state);

    let prepared = prepare_summaries(&data.table, &ContinentTable::default());
    messages.extend(prepared.warnings.iter().cloned());

    let ranked: Vec<RankedRow> = match &state {
        Some(s) => rank_countries(&prepared.rows, &s.table_query()),
        None => Vec::new(),
    };
    let continents: Vec<ContinentTotal> = match &state {
        Some(s) => continent_totals(&prepared.rows, s.year, s.flow),
        None => Vec::new(),
    };

    let map_js = match (&settings.boundary, &state) {
        (Some(location), Some(s)) => match read_boundary_names(location) {
            Ok(names) => {
                let coverage = coverage_report(&data.table, names.iter().map(|n| n.as_str()));
                if !coverage.unmatched.is_empty() {
                    messages.push(format!(
                        "partners without a boundary shape: {}",
                        coverage.unmatched.join(", ")
                    ));
                }
                map_to_json(&data.table, s, &coverage.unmatched)
            }
            Err(e) => {
                let msg = format!("boundary data unavailable, the map is disabled: {}", e);
                warn!("run_dashboard: {}", msg);
                messages.push(msg);
                JSValue::Null
            }
        },
        (None, _) => {
            messages.push("no boundary data configured, the map is disabled".to_string());
            JSValue::Null
        }
        (Some(_), None) => JSValue::Null,
    };

    let sections = Sections {
        view: state.as_ref().map(view_to_json).unwrap_or(JSValue::Null),
        map: map_js,
        table: ranked_to_json(&ranked),
        continents: continents_to_json(&continents),
        trend: trend_to_json(&trend_series(&data.records, &rules)),
        messages,
    };
    let result_js = build_summary_js(&settings, &data, sections);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    match settings.out.as_deref() {
        None | Some("stdout") => println!("{}", pretty_js_stats),
        Some("") => {}
        Some(path) => {
            fs::write(path, &pretty_js_stats).context(WritingSnafu { path })?;
            info!("run_dashboard: summary written to {:?}", path);
        }
    }

    if let Some(path) = &settings.table_out {
        write_table_csv(&data.table, path)?;
    }

    if let Some(reference_path) = &args.reference {
        check_reference(reference_path, &pretty_js_stats)?;
    }
    Ok(())
}
