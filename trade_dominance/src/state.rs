use log::debug;

use crate::config::{DominanceTable, FlowType};
use crate::table::{Region, SortOrder, TableQuery, TOP_N_COUNTRIES};

/// Everything the user selected on the dashboard. The renderers read this
/// and nothing else.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DashboardState {
    pub year: i32,
    pub flow: FlowType,
    pub region: Region,
    pub sort_order: SortOrder,
    pub top_n: usize,
}

impl DashboardState {
    /// The state shown on first load: latest year, two-way trade, whole world.
    /// `None` when no data is available.
    pub fn initial(table: &DominanceTable) -> Option<DashboardState> {
        table.latest_year().map(|year| DashboardState {
            year,
            flow: FlowType::default(),
            region: Region::default(),
            sort_order: SortOrder::default(),
            top_n: TOP_N_COUNTRIES,
        })
    }

    /// Moves to the requested year, or to the latest one when the requested
    /// year has no data.
    pub fn select_year(self, year: i32, table: &DominanceTable) -> DashboardState {
        let year = if table.years.contains(&year) {
            year
        } else {
            debug!("select_year: {} not available, using the latest year", year);
            table.latest_year().unwrap_or(year)
        };
        DashboardState { year, ..self }
    }

    pub fn table_query(&self) -> TableQuery {
        TableQuery {
            year: self.year,
            flow: self.flow,
            region: self.region,
            sort_order: self.sort_order,
            top_n: self.top_n,
        }
    }
}
