//! Filter selection over the cleaned events table.
//!
//! Three independent predicates, logically ANDed: disaster-type membership,
//! country membership, and a closed date interval over `Start_Date`. The
//! defaults select everything present in the unfiltered dataset.

use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::{BTreeSet, HashSet};

use crate::data::DATE_STORAGE_FORMAT;
use crate::schema;

/// Everything the filter controls can offer, derived from the full table once
/// at startup.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub disaster_types: Vec<String>,
    pub countries: Vec<String>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

impl FilterOptions {
    pub fn from_events(df: &DataFrame) -> Self {
        let (min_date, max_date) = date_bounds(df, schema::START_DATE);
        Self {
            disaster_types: distinct_strings(df, schema::DISASTER_TYPE),
            countries: distinct_strings(df, schema::COUNTRY),
            min_date,
            max_date,
        }
    }
}

/// The active filter. All predicates must hold for a row to survive.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelection {
    pub disaster_types: Vec<String>,
    pub countries: Vec<String>,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
}

impl FilterSelection {
    /// The default selection: every type, every country, the full observed
    /// date range.
    pub fn select_all(options: &FilterOptions) -> Self {
        let fallback = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
        Self {
            disaster_types: options.disaster_types.clone(),
            countries: options.countries.clone(),
            range_start: options.min_date.unwrap_or(fallback),
            range_end: options.max_date.unwrap_or(fallback),
        }
    }

    /// Apply the filter, keeping original row order. Rows with a null
    /// `Start_Date` never satisfy the range predicate.
    pub fn apply(&self, df: &DataFrame) -> PolarsResult<DataFrame> {
        let types: HashSet<&str> = self.disaster_types.iter().map(String::as_str).collect();
        let countries: HashSet<&str> = self.countries.iter().map(String::as_str).collect();
        let start = self.range_start.format(DATE_STORAGE_FORMAT).to_string();
        let end = self.range_end.format(DATE_STORAGE_FORMAT).to_string();

        let type_ca = df.column(schema::DISASTER_TYPE)?.str()?;
        let country_ca = df.column(schema::COUNTRY)?.str()?;
        let date_ca = df.column(schema::START_DATE)?.str()?;

        let keep: Vec<bool> = (0..df.height())
            .map(|row| {
                let keep_type = type_ca
                    .get(row)
                    .map(|t| types.contains(t))
                    .unwrap_or(false);
                let keep_country = country_ca
                    .get(row)
                    .map(|c| countries.contains(c))
                    .unwrap_or(false);
                // ISO-8601 strings order the same as the dates they encode.
                let keep_date = date_ca
                    .get(row)
                    .map(|d| d >= start.as_str() && d <= end.as_str())
                    .unwrap_or(false);
                keep_type && keep_country && keep_date
            })
            .collect();

        let mask = BooleanChunked::new("mask".into(), keep);
        df.filter(&mask)
    }
}

fn distinct_strings(df: &DataFrame, name: &str) -> Vec<String> {
    let Ok(column) = df.column(name) else {
        return Vec::new();
    };
    let Ok(ca) = column.str() else {
        return Vec::new();
    };

    let unique: BTreeSet<&str> = ca.into_iter().flatten().collect();
    unique.into_iter().map(str::to_string).collect()
}

fn date_bounds(df: &DataFrame, name: &str) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let Ok(column) = df.column(name) else {
        return (None, None);
    };
    let Ok(ca) = column.str() else {
        return (None, None);
    };

    let mut min = None;
    let mut max = None;
    for value in ca.into_iter().flatten() {
        if let Ok(date) = NaiveDate::parse_from_str(value, DATE_STORAGE_FORMAT) {
            min = Some(match min {
                Some(m) if m < date => m,
                _ => date,
            });
            max = Some(match max {
                Some(m) if m > date => m,
                _ => date,
            });
        }
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events() -> DataFrame {
        df!(
            schema::DISASTER_TYPE => ["Flood", "Storm", "Flood", "Others"],
            schema::COUNTRY => ["India", "USA", "India", "Japan"],
            schema::START_DATE => [Some("2011-03-05"), Some("2012-07-12"), None, Some("2015-06-30")],
            schema::FATALITIES => [10i64, 0, 3, 7],
        )
        .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn options_cover_the_whole_table() {
        let options = FilterOptions::from_events(&events());
        assert_eq!(options.disaster_types, vec!["Flood", "Others", "Storm"]);
        assert_eq!(options.countries, vec!["India", "Japan", "USA"]);
        assert_eq!(options.min_date, Some(date(2011, 3, 5)));
        assert_eq!(options.max_date, Some(date(2015, 6, 30)));
    }

    #[test]
    fn select_all_keeps_every_dated_row() {
        let df = events();
        let selection = FilterSelection::select_all(&FilterOptions::from_events(&df));
        let filtered = selection.apply(&df).unwrap();
        // The null Start_Date row never satisfies the range predicate.
        assert_eq!(filtered.height(), 3);
    }

    #[test]
    fn narrower_selections_match_fewer_rows() {
        let df = events();
        let options = FilterOptions::from_events(&df);
        let all = FilterSelection::select_all(&options);

        let mut narrower = all.clone();
        narrower.disaster_types = vec!["Flood".to_string()];
        let mut narrowest = narrower.clone();
        narrowest.range_end = date(2011, 12, 31);

        let n_all = all.apply(&df).unwrap().height();
        let n_narrower = narrower.apply(&df).unwrap().height();
        let n_narrowest = narrowest.apply(&df).unwrap().height();
        assert!(n_narrower <= n_all);
        assert!(n_narrowest <= n_narrower);
        assert_eq!(n_narrowest, 1);
    }

    #[test]
    fn empty_type_selection_matches_nothing() {
        let df = events();
        let mut selection = FilterSelection::select_all(&FilterOptions::from_events(&df));
        selection.disaster_types.clear();
        assert_eq!(selection.apply(&df).unwrap().height(), 0);
    }
}
