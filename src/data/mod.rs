//! Data module - raw CSV loading and the cleaning pipeline

mod cleaner;
mod loader;

pub use cleaner::{
    bucket_disaster_types, clean, parse_date, top_disaster_types, CleanError, CleanedData,
    DATE_STORAGE_FORMAT,
};
pub use loader::{read_raw_csv, LoadError};
