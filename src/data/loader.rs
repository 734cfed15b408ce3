//! Raw CSV loading using Polars.

use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read CSV: {0}")]
    Csv(#[from] PolarsError),
}

/// Read the raw disaster-events export into a DataFrame.
///
/// There is no partial-load mode: a file the reader cannot parse aborts the
/// whole run, and re-running from scratch is the recovery path.
pub fn read_raw_csv(path: &Path) -> Result<DataFrame, LoadError> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10000))
        .finish()?
        .collect()?;
    Ok(df)
}
