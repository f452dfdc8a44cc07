use clap::Parser;

/// This is a trade-dominance tabulation program.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the data sources and the view to compute.
    /// Paths inside the configuration are relative to the configuration file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, tradedom will check
    /// that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON
    /// format to the given location. Setting this option overrides the path that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The trade data. Setting this option overrides the source of the
    /// --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv, imf_csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default Sheet1 or the only worksheet) When using an Excel file, the name of the
    /// worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path or URL) The GeoJSON boundary data used to check the map coverage.
    #[clap(short, long, value_parser)]
    pub boundary: Option<String>,

    /// (file path) If specified, the complete dominance table is written in CSV format to
    /// this location.
    #[clap(long, value_parser)]
    pub table_out: Option<String>,

    /// (default: latest year) The year of the map frame and of the ranked table.
    #[clap(long, value_parser)]
    pub year: Option<i32>,

    /// (default 'Two-way trade') The trade flow: Total, Import, Export or their labels.
    #[clap(long, value_parser)]
    pub flow: Option<String>,

    /// (default World) The region of the ranked table: World or a continent name or code.
    #[clap(long, value_parser)]
    pub continent: Option<String>,

    /// (default Descending) The sort order of the ranked table.
    #[clap(long, value_parser)]
    pub sort: Option<String>,

    /// (default 10) The number of rows in the ranked table.
    #[clap(long, value_parser)]
    pub top: Option<usize>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
