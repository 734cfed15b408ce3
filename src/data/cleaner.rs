//! Cleaning pipeline for the raw disaster-events export.
//!
//! A pure batch transform, run once by the loader: normalize dates, coerce the
//! numeric columns, then bucket rare disaster types into `"Others"` based on
//! the frequency distribution of the whole dataset.

use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::schema;

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("required column missing: {0}")]
    MissingColumn(String),
}

/// Date formats the raw feed has been observed to use. First match wins.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%m/%d/%Y"];

/// Canonical storage format for dates. ISO-8601 strings order the same as the
/// dates they encode, which the report engine's range filter relies on.
pub const DATE_STORAGE_FORMAT: &str = "%Y-%m-%d";

/// Result of a full cleaning pass.
pub struct CleanedData {
    pub frame: DataFrame,
    /// The disaster types kept verbatim; everything else became `"Others"`.
    pub retained_types: Vec<String>,
}

/// Run the whole cleaning pipeline. Order matters: dates and numeric coercion
/// first, then bucketing computed over the entire dataset.
pub fn clean(mut df: DataFrame, top_type_count: usize) -> Result<CleanedData, CleanError> {
    normalize_date_column(&mut df, schema::START_DATE)?;
    normalize_date_column(&mut df, schema::END_DATE)?;
    coerce_count_column(&mut df, schema::FATALITIES)?;
    coerce_count_column(&mut df, schema::AFFECTED)?;
    coerce_year_column(&mut df, schema::YEAR)?;

    let retained = top_disaster_types(&df, top_type_count)?;
    bucket_disaster_types(&mut df, &retained)?;

    Ok(CleanedData {
        frame: df,
        retained_types: retained,
    })
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Rewrite a date column as canonical ISO strings. Values that fail to parse
/// become null; the row is kept.
fn normalize_date_column(df: &mut DataFrame, name: &str) -> Result<(), CleanError> {
    let column = df
        .column(name)
        .map_err(|_| CleanError::MissingColumn(name.to_string()))?;
    let as_str = column.cast(&DataType::String)?;
    let ca = as_str.str()?;

    let normalized: Vec<Option<String>> = ca
        .into_iter()
        .map(|value| {
            value
                .and_then(parse_date)
                .map(|date| date.format(DATE_STORAGE_FORMAT).to_string())
        })
        .collect();

    df.with_column(Column::new(name.into(), normalized))?;
    Ok(())
}

/// Coerce a count column to integers. Missing and non-numeric values become 0;
/// negative values pass through unvalidated.
fn coerce_count_column(df: &mut DataFrame, name: &str) -> Result<(), CleanError> {
    let column = df
        .column(name)
        .map_err(|_| CleanError::MissingColumn(name.to_string()))?;
    let as_f64 = column.cast(&DataType::Float64)?;
    let ca = as_f64.f64()?;

    let values: Vec<i64> = ca
        .into_iter()
        .map(|value| match value {
            Some(v) if v.is_finite() => v as i64,
            _ => 0,
        })
        .collect();

    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

/// Coerce the year column to integers, keeping nulls as nulls. Year-keyed
/// groupings later exclude null years instead of treating them as 0.
fn coerce_year_column(df: &mut DataFrame, name: &str) -> Result<(), CleanError> {
    let column = df
        .column(name)
        .map_err(|_| CleanError::MissingColumn(name.to_string()))?;
    let as_f64 = column.cast(&DataType::Float64)?;
    let ca = as_f64.f64()?;

    let values: Vec<Option<i64>> = ca
        .into_iter()
        .map(|value| value.filter(|v| v.is_finite()).map(|v| v as i64))
        .collect();

    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

/// The `n` most frequent disaster types over the entire dataset. Frequency
/// ties are broken by first appearance in the file, so the retained set is
/// deterministic run over run.
pub fn top_disaster_types(df: &DataFrame, n: usize) -> Result<Vec<String>, CleanError> {
    let column = df
        .column(schema::DISASTER_TYPE)
        .map_err(|_| CleanError::MissingColumn(schema::DISASTER_TYPE.to_string()))?;
    let as_str = column.cast(&DataType::String)?;
    let ca = as_str.str()?;

    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (index, value) in ca.into_iter().enumerate() {
        if let Some(v) = value {
            let entry = counts.entry(v).or_insert((0, index));
            entry.0 += 1;
        }
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(value, (count, first_seen))| (value, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    Ok(ranked
        .into_iter()
        .take(n)
        .map(|(value, _, _)| value.to_string())
        .collect())
}

/// Rewrite the disaster-type column: values in the retained set stay, the rest
/// become the literal `"Others"`. Nulls stay null.
pub fn bucket_disaster_types(df: &mut DataFrame, retained: &[String]) -> Result<(), CleanError> {
    let keep: HashSet<&str> = retained.iter().map(String::as_str).collect();

    let column = df
        .column(schema::DISASTER_TYPE)
        .map_err(|_| CleanError::MissingColumn(schema::DISASTER_TYPE.to_string()))?;
    let as_str = column.cast(&DataType::String)?;
    let ca = as_str.str()?;

    let bucketed: Vec<Option<String>> = ca
        .into_iter()
        .map(|value| {
            value.map(|v| {
                if keep.contains(v) {
                    v.to_string()
                } else {
                    schema::OTHERS_LABEL.to_string()
                }
            })
        })
        .collect();

    df.with_column(Column::new(schema::DISASTER_TYPE.into(), bucketed))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame() -> DataFrame {
        df!(
            schema::DISASTER_TYPE => ["Flood", "Storm", "Flood", "Heat wave", "Storm", "Flood"],
            schema::COUNTRY => ["India", "USA", "India", "Spain", "Japan", "China"],
            schema::START_DATE => ["2011-03-05", "12-07-2012", "bad date", "2014-01-01", "2015-06-30", "2016-02-10"],
            schema::END_DATE => ["2011-03-09", "15-07-2012", "2013-05-02", "", "2015-07-02", "2016-02-12"],
            schema::YEAR => ["2011", "2012", "2013", "2014", "not a year", "2016"],
            schema::FATALITIES => ["10", "", "3", "x", "7", "0"],
            schema::AFFECTED => ["100", "250", "", "40", "5", "60"],
        )
        .unwrap()
    }

    #[test]
    fn unparseable_dates_become_null_and_rows_are_kept() {
        let cleaned = clean(raw_frame(), 10).unwrap();
        assert_eq!(cleaned.frame.height(), 6);

        let starts = cleaned.frame.column(schema::START_DATE).unwrap();
        let ca = starts.str().unwrap();
        assert_eq!(ca.get(0), Some("2011-03-05"));
        // day-first format normalized to ISO
        assert_eq!(ca.get(1), Some("2012-07-12"));
        assert_eq!(ca.get(2), None);
    }

    #[test]
    fn counts_default_to_zero_and_are_never_null() {
        let cleaned = clean(raw_frame(), 10).unwrap();
        for name in [schema::FATALITIES, schema::AFFECTED] {
            let column = cleaned.frame.column(name).unwrap();
            let ca = column.i64().unwrap();
            assert_eq!(ca.null_count(), 0);
            assert!(ca.into_iter().all(|v| v.unwrap() >= 0));
        }
        let fatalities = cleaned.frame.column(schema::FATALITIES).unwrap();
        assert_eq!(fatalities.i64().unwrap().get(1), Some(0));
        assert_eq!(fatalities.i64().unwrap().get(3), Some(0));
    }

    #[test]
    fn non_numeric_year_becomes_null_not_zero() {
        let cleaned = clean(raw_frame(), 10).unwrap();
        let years = cleaned.frame.column(schema::YEAR).unwrap();
        let ca = years.i64().unwrap();
        assert_eq!(ca.get(0), Some(2011));
        assert_eq!(ca.get(4), None);
    }

    #[test]
    fn rare_types_bucket_into_others() {
        let cleaned = clean(raw_frame(), 2).unwrap();
        assert_eq!(cleaned.retained_types, vec!["Flood", "Storm"]);

        let types = cleaned.frame.column(schema::DISASTER_TYPE).unwrap();
        let ca = types.str().unwrap();
        let labels: Vec<&str> = ca.into_iter().map(|v| v.unwrap()).collect();
        assert_eq!(
            labels,
            vec!["Flood", "Storm", "Flood", "Others", "Storm", "Flood"]
        );
    }

    #[test]
    fn frequency_ties_break_by_first_seen_order() {
        let df = df!(
            schema::DISASTER_TYPE => ["Quake", "Storm", "Quake", "Storm", "Flood"],
        )
        .unwrap();
        // Quake and Storm both appear twice; Quake appeared first.
        let top = top_disaster_types(&df, 2).unwrap();
        assert_eq!(top, vec!["Quake", "Storm"]);
    }

    #[test]
    fn cleaning_twice_yields_identical_frames() {
        let once = clean(raw_frame(), 2).unwrap();
        let twice = clean(raw_frame(), 2).unwrap();
        assert_eq!(once.frame, twice.frame);
        assert_eq!(once.retained_types, twice.retained_types);

        // Re-cleaning already-cleaned data keeps the bucketing stable.
        let again = clean(once.frame.clone(), 2).unwrap();
        assert_eq!(again.frame, once.frame);
    }
}
