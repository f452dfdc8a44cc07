// Country boundaries (GeoJSON). Only the country names are read.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::dash::*;

pub const DEFAULT_BOUNDARY_URL: &str = "https://raw.githubusercontent.com/\
    python-visualization/folium/master/examples/data/world-countries.json";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum BoundaryLocation {
    File(String),
    Url { url: String, timeout: Duration },
}

impl BoundaryLocation {
    /// URLs are recognized by their scheme, anything else is a path.
    pub fn parse(s: &str, timeout_secs: Option<u64>) -> BoundaryLocation {
        if s.starts_with("http://") || s.starts_with("https://") {
            BoundaryLocation::Url {
                url: s.to_string(),
                timeout: Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            }
        } else {
            BoundaryLocation::File(s.to_string())
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct Feature {
    properties: Properties,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct Properties {
    name: Option<String>,
}

/// Reads the boundary data once. No retries.
pub fn read_boundary_names(location: &BoundaryLocation) -> BDashResult<BTreeSet<String>> {
    let contents = match location {
        BoundaryLocation::File(path) => {
            info!("Attempting to read boundary file {:?}", path);
            fs::read_to_string(path).context(OpeningJsonSnafu { path })?
        }
        BoundaryLocation::Url { url, timeout } => fetch(url, *timeout)?,
    };
    parse_boundary_names(&contents)
}

pub fn parse_boundary_names(contents: &str) -> BDashResult<BTreeSet<String>> {
    let fc: FeatureCollection = serde_json::from_str(contents).context(ParsingJsonSnafu {})?;
    let names: BTreeSet<String> = fc
        .features
        .into_iter()
        .filter_map(|f| f.properties.name)
        .collect();
    debug!("parse_boundary_names: {} names", names.len());
    Ok(names)
}

fn fetch(url: &str, timeout: Duration) -> BDashResult<String> {
    info!("Attempting to fetch boundary data from {:?}", url);
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .context(FetchingSnafu { url })?;
    let response = client
        .get(url)
        .send()
        .context(FetchingSnafu { url })?
        .error_for_status()
        .context(FetchingSnafu { url })?;
    let body = response.text().context(FetchingSnafu { url })?;
    Ok(body)
}
