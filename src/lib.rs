// Serie A Standings Dashboard - Core Library
// Exposes all modules for use in the CLI, the web server, and tests

pub mod db;
pub mod query;
pub mod store;
pub mod view;

// Re-export commonly used types
pub use db::{
    get_all_standings, get_season_stats, insert_standings, load_csv, open_read_only,
    setup_database, verify_count, SeasonStat, StandingRecord,
};
pub use query::QueryError;
pub use store::{SeasonData, StandingsStore};
pub use view::{
    points_snapshot, position_chart, standings_table, PointsBar, PointsSnapshot, PositionChart,
    PositionSeries, TableRow,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
