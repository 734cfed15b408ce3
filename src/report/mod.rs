//! Report engine - filtered aggregations and always-unfiltered geo totals

mod engine;
mod filter;
pub mod stats;

pub use engine::{
    CountryTotal, EventRow, FatalitySeries, GeoTotals, Report, ReportEngine, ReportError,
    SummaryCounts, TypeCount, TypeCountryCount, TypeSpread, YearCount,
};
pub use filter::{FilterOptions, FilterSelection};
