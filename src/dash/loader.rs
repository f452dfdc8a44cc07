// Loads the trade data and runs the pipeline, once per source version.

use std::sync::Arc;
use std::time::UNIX_EPOCH;

use crate::dash::{
    config_reader::{Provider, TradeSource},
    io_csv::read_csv_trade,
    io_imf::read_imf_trade,
    io_xlsx::read_xlsx_trade,
    *,
};

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum LoadStatus {
    Loaded,
    /// The source could not be read. The table is empty.
    Unavailable(String),
}

#[derive(PartialEq, Debug, Clone)]
pub struct LoadedData {
    pub cache_key: String,
    pub records: Vec<RawTradeRecord>,
    pub table: DominanceTable,
    pub status: LoadStatus,
}

/// Holds the last computed table. A new computation only happens when the
/// identity of the source (path, size, modification time) changes.
#[derive(Debug)]
pub struct TradeDataLoader {
    source: TradeSource,
    path: String,
    rules: DominanceRules,
    names: NameTable,
    cached: Option<Arc<LoadedData>>,
}

impl TradeDataLoader {
    /// `path` is the resolved location of `source.file_path`.
    pub fn new(
        source: TradeSource,
        path: String,
        rules: DominanceRules,
        names: NameTable,
    ) -> TradeDataLoader {
        TradeDataLoader {
            source,
            path,
            rules,
            names,
            cached: None,
        }
    }

    pub fn cache_key(&self) -> String {
        let stamp = match fs::metadata(&self.path) {
            Ok(m) => {
                let mtime = m
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_nanos())
                    .unwrap_or(0);
                format!("{}:{}", m.len(), mtime)
            }
            Err(_) => "missing".to_string(),
        };
        sha256::digest(format!(
            "{}|{}|{}|{}",
            self.source.provider,
            self.path,
            self.source.excel_worksheet_name.clone().unwrap_or_default(),
            stamp
        ))
    }

    /// Returns the table for the current version of the source.
    ///
    /// A source that cannot be read is not an error: the table is empty and
    /// the status carries the reason.
    pub fn load(&mut self) -> BDashResult<Arc<LoadedData>> {
        let key = self.cache_key();
        if let Some(data) = &self.cached {
            if data.cache_key == key {
                debug!("load: cache hit for {:?}", self.path);
                return Ok(data.clone());
            }
        }
        info!("load: computing the dominance table for {:?}", self.path);

        let provider = self.source.provider()?;
        let (records, status) = match self.read(provider) {
            Ok(records) => (records, LoadStatus::Loaded),
            Err(e) => {
                let msg = format!("trade data unavailable ({}): {}", self.path, e);
                warn!("load: {}", msg);
                (Vec::new(), LoadStatus::Unavailable(msg))
            }
        };
        let table = run_dominance(&records, &self.rules, &self.names).context(RulesSnafu {})?;
        let data = Arc::new(LoadedData {
            cache_key: key,
            records,
            table,
            status,
        });
        self.cached = Some(data.clone());
        Ok(data)
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    fn read(&self, provider: Provider) -> BDashResult<Vec<RawTradeRecord>> {
        match provider {
            Provider::Csv => read_csv_trade(&self.path),
            Provider::ImfCsv => read_imf_trade(&self.path),
            Provider::Xlsx => {
                read_xlsx_trade(&self.path, self.source.excel_worksheet_name.as_deref())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dash::tests::test_file;
    use std::io::Write;

    fn csv_source() -> TradeSource {
        TradeSource {
            provider: "csv".to_string(),
            file_path: "trade.csv".to_string(),
            excel_worksheet_name: None,
        }
    }

    fn rules() -> DominanceRules {
        DominanceRules::new(vec![2020, 2021, 2022], ReferenceEconomies::default()).unwrap()
    }

    #[test]
    fn second_load_is_cached() {
        let mut loader = TradeDataLoader::new(
            csv_source(),
            test_file("basic/trade.csv"),
            rules(),
            NameTable::default(),
        );
        let first = loader.load().unwrap();
        assert_eq!(first.status, LoadStatus::Loaded);
        assert!(!first.table.is_empty());
        let second = loader.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        loader.invalidate();
        let third = loader.load().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(first.table, third.table);
    }

    #[test]
    fn rewriting_the_source_changes_the_key() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "Country,Partner,Trade_Type,2020").unwrap();
        writeln!(f, "United States,Chile,Export,10").unwrap();
        f.flush().unwrap();
        let path = f.path().display().to_string();
        let mut loader =
            TradeDataLoader::new(csv_source(), path, rules(), NameTable::default());
        let first = loader.load().unwrap();
        let chile = first.table.get("Chile", 2020, FlowType::Export).unwrap();
        assert_eq!(chile.us_trade, 10.0);

        writeln!(f, "China,Chile,Export,30").unwrap();
        f.flush().unwrap();
        let second = loader.load().unwrap();
        assert_ne!(first.cache_key, second.cache_key);
        let chile = second.table.get("Chile", 2020, FlowType::Export).unwrap();
        assert_eq!(chile.ratio, Some(0.75));
    }

    #[test]
    fn missing_source_gives_an_empty_table() {
        let mut loader = TradeDataLoader::new(
            csv_source(),
            test_file("basic/not_here.csv"),
            rules(),
            NameTable::default(),
        );
        let data = loader.load().unwrap();
        assert!(data.table.is_empty());
        assert!(data.table.years.is_empty());
        assert!(matches!(data.status, LoadStatus::Unavailable(_)));
    }

    #[test]
    fn empty_source_is_loaded() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let path = f.path().display().to_string();
        let mut loader =
            TradeDataLoader::new(csv_source(), path, rules(), NameTable::default());
        let data = loader.load().unwrap();
        assert_eq!(data.status, LoadStatus::Loaded);
        assert!(data.records.is_empty());
        assert!(data.table.is_empty());
    }
}
