//! Report engine: a fixed set of named aggregations over the cleaned table.
//!
//! Two entry points with deliberately different shapes: `report` takes a
//! filter selection and recomputes every filtered aggregation from scratch,
//! while `geo_totals` never takes one — the per-country totals always reflect
//! the whole dataset.

use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::config::DashboardConfig;
use crate::report::filter::FilterSelection;
use crate::report::stats::FiveNumber;
use crate::schema;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryCounts {
    pub events: usize,
    pub fatalities: i64,
    pub affected: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeCount {
    pub disaster_type: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpread {
    pub disaster_type: String,
    pub fatalities: FiveNumber,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeCountryCount {
    pub disaster_type: String,
    pub country: String,
    pub count: usize,
}

/// One timeline series: fatalities summed per year for a disaster type,
/// ascending by year. Hidden-by-default series are still fully computed.
#[derive(Debug, Clone, PartialEq)]
pub struct FatalitySeries {
    pub disaster_type: String,
    pub visible_by_default: bool,
    pub points: Vec<(i64, i64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearCount {
    pub year: i64,
    pub count: usize,
}

/// A ranked event for the top-10 tables.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub year: Option<i64>,
    pub disaster_type: String,
    pub country: String,
    pub fatalities: i64,
    pub affected: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryTotal {
    pub country: String,
    pub value: i64,
}

/// Per-country totals over the full table; never filtered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoTotals {
    pub event_counts: Vec<CountryTotal>,
    pub fatalities: Vec<CountryTotal>,
    pub affected: Vec<CountryTotal>,
}

/// Everything the dashboard renders for one filter selection.
#[derive(Debug, Clone)]
pub struct Report {
    pub summary: SummaryCounts,
    pub type_distribution: Vec<TypeCount>,
    pub fatality_spread: Vec<TypeSpread>,
    pub type_by_country: Vec<TypeCountryCount>,
    pub fatalities_over_time: Vec<FatalitySeries>,
    pub yearly_trend: Vec<YearCount>,
    pub top_deadliest: Vec<EventRow>,
    pub top_affected: Vec<EventRow>,
}

pub struct ReportEngine {
    events: DataFrame,
    config: DashboardConfig,
}

impl ReportEngine {
    pub fn new(events: DataFrame, config: DashboardConfig) -> Self {
        Self { events, config }
    }

    pub fn events(&self) -> &DataFrame {
        &self.events
    }

    /// Recompute every filtered aggregation for the given selection. An empty
    /// filtered subset yields zero counts and empty outputs, never an error.
    pub fn report(&self, selection: &FilterSelection) -> Result<Report, ReportError> {
        let filtered = selection.apply(&self.events)?;

        Ok(Report {
            summary: Self::summary(&filtered)?,
            type_distribution: Self::type_distribution(&filtered)?,
            fatality_spread: Self::fatality_spread(&filtered)?,
            type_by_country: Self::type_by_country(&filtered, self.config.top_country_count)?,
            fatalities_over_time: self.fatalities_over_time(&filtered)?,
            yearly_trend: self.yearly_trend(&filtered)?,
            top_deadliest: Self::top_events(&filtered, schema::FATALITIES, 10)?,
            top_affected: Self::top_events(&filtered, schema::AFFECTED, 10)?,
        })
    }

    /// Per-country totals over the whole table. Takes no filter on purpose:
    /// geographic summaries always reflect the full dataset.
    pub fn geo_totals(&self) -> Result<GeoTotals, ReportError> {
        Ok(GeoTotals {
            event_counts: Self::country_counts(&self.events)?,
            fatalities: Self::country_sums(&self.events, schema::FATALITIES)?,
            affected: Self::country_sums(&self.events, schema::AFFECTED)?,
        })
    }

    fn summary(filtered: &DataFrame) -> Result<SummaryCounts, ReportError> {
        let fatalities = i64_values(filtered, schema::FATALITIES)?;
        let affected = i64_values(filtered, schema::AFFECTED)?;
        Ok(SummaryCounts {
            events: filtered.height(),
            fatalities: fatalities.iter().flatten().sum(),
            affected: affected.iter().flatten().sum(),
        })
    }

    fn type_distribution(filtered: &DataFrame) -> Result<Vec<TypeCount>, ReportError> {
        let types = str_values(filtered, schema::DISASTER_TYPE)?;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for disaster_type in types.into_iter().flatten() {
            *counts.entry(disaster_type).or_default() += 1;
        }

        let mut rows: Vec<TypeCount> = counts
            .into_iter()
            .map(|(disaster_type, count)| TypeCount {
                disaster_type,
                count,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.disaster_type.cmp(&b.disaster_type))
        });
        Ok(rows)
    }

    fn fatality_spread(filtered: &DataFrame) -> Result<Vec<TypeSpread>, ReportError> {
        let types = str_values(filtered, schema::DISASTER_TYPE)?;
        let fatalities = i64_values(filtered, schema::FATALITIES)?;

        let mut samples: HashMap<String, Vec<f64>> = HashMap::new();
        for (disaster_type, count) in types.into_iter().zip(fatalities) {
            if let (Some(t), Some(f)) = (disaster_type, count) {
                samples.entry(t).or_default().push(f as f64);
            }
        }

        let mut rows: Vec<TypeSpread> = samples
            .into_iter()
            .filter_map(|(disaster_type, values)| {
                FiveNumber::from_values(&values).map(|fatalities| TypeSpread {
                    disaster_type,
                    fatalities,
                })
            })
            .collect();
        rows.sort_by(|a, b| a.disaster_type.cmp(&b.disaster_type));
        Ok(rows)
    }

    /// Counts per `(disaster_type, country)`, restricted to the countries with
    /// the most rows in the filtered subset. Frequency ties break by first
    /// appearance, same as the loader's type bucketing.
    fn type_by_country(
        filtered: &DataFrame,
        top_countries: usize,
    ) -> Result<Vec<TypeCountryCount>, ReportError> {
        let types = str_values(filtered, schema::DISASTER_TYPE)?;
        let countries = str_values(filtered, schema::COUNTRY)?;

        let mut frequency: HashMap<&str, (usize, usize)> = HashMap::new();
        for (index, country) in countries.iter().enumerate() {
            if let Some(c) = country.as_deref() {
                let entry = frequency.entry(c).or_insert((0, index));
                entry.0 += 1;
            }
        }
        let mut ranked: Vec<(&str, usize, usize)> = frequency
            .into_iter()
            .map(|(country, (count, first_seen))| (country, count, first_seen))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        let keep: HashSet<&str> = ranked
            .into_iter()
            .take(top_countries)
            .map(|(country, _, _)| country)
            .collect();

        let mut cells: HashMap<(String, String), usize> = HashMap::new();
        for (disaster_type, country) in types.iter().zip(countries.iter()) {
            if let (Some(t), Some(c)) = (disaster_type.as_deref(), country.as_deref()) {
                if keep.contains(c) {
                    *cells.entry((t.to_string(), c.to_string())).or_default() += 1;
                }
            }
        }

        let mut rows: Vec<TypeCountryCount> = cells
            .into_iter()
            .map(|((disaster_type, country), count)| TypeCountryCount {
                disaster_type,
                country,
                count,
            })
            .collect();
        rows.sort_by(|a, b| {
            a.disaster_type
                .cmp(&b.disaster_type)
                .then_with(|| a.country.cmp(&b.country))
        });
        Ok(rows)
    }

    fn fatalities_over_time(&self, filtered: &DataFrame) -> Result<Vec<FatalitySeries>, ReportError> {
        let types = str_values(filtered, schema::DISASTER_TYPE)?;
        let years = i64_values(filtered, schema::YEAR)?;
        let fatalities = i64_values(filtered, schema::FATALITIES)?;

        let mut sums: HashMap<(String, i64), i64> = HashMap::new();
        for ((disaster_type, year), count) in types.into_iter().zip(years).zip(fatalities) {
            // Rows without a numeric year stay out of year-keyed groupings.
            if let (Some(t), Some(y), Some(f)) = (disaster_type, year, count) {
                *sums.entry((t, y)).or_default() += f;
            }
        }

        let mut by_type: HashMap<String, Vec<(i64, i64)>> = HashMap::new();
        for ((disaster_type, year), total) in sums {
            by_type.entry(disaster_type).or_default().push((year, total));
        }

        let mut series: Vec<FatalitySeries> = by_type
            .into_iter()
            .map(|(disaster_type, mut points)| {
                points.sort_by_key(|&(year, _)| year);
                let visible_by_default = self
                    .config
                    .default_visible_types
                    .iter()
                    .any(|v| v == &disaster_type);
                FatalitySeries {
                    disaster_type,
                    visible_by_default,
                    points,
                }
            })
            .collect();
        series.sort_by(|a, b| a.disaster_type.cmp(&b.disaster_type));
        Ok(series)
    }

    fn yearly_trend(&self, filtered: &DataFrame) -> Result<Vec<YearCount>, ReportError> {
        let years = i64_values(filtered, schema::YEAR)?;

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for year in years.into_iter().flatten() {
            if year != self.config.trend_cutoff_year {
                *counts.entry(year).or_default() += 1;
            }
        }

        let mut rows: Vec<YearCount> = counts
            .into_iter()
            .map(|(year, count)| YearCount { year, count })
            .collect();
        rows.sort_by_key(|row| row.year);
        Ok(rows)
    }

    /// The `n` rows with the highest value in `metric`, descending. The sort
    /// is stable, so ties keep their original row order.
    fn top_events(filtered: &DataFrame, metric: &str, n: usize) -> Result<Vec<EventRow>, ReportError> {
        let values = i64_values(filtered, metric)?;

        let mut order: Vec<(usize, i64)> = values
            .iter()
            .enumerate()
            .map(|(index, value)| (index, value.unwrap_or(0)))
            .collect();
        order.sort_by(|a, b| b.1.cmp(&a.1));
        order.truncate(n);

        let years = i64_values(filtered, schema::YEAR)?;
        let types = str_values(filtered, schema::DISASTER_TYPE)?;
        let countries = str_values(filtered, schema::COUNTRY)?;
        let fatalities = i64_values(filtered, schema::FATALITIES)?;
        let affected = i64_values(filtered, schema::AFFECTED)?;

        Ok(order
            .into_iter()
            .map(|(index, _)| EventRow {
                year: years[index],
                disaster_type: types[index].clone().unwrap_or_default(),
                country: countries[index].clone().unwrap_or_default(),
                fatalities: fatalities[index].unwrap_or(0),
                affected: affected[index].unwrap_or(0),
            })
            .collect())
    }

    fn country_counts(df: &DataFrame) -> Result<Vec<CountryTotal>, ReportError> {
        let countries = str_values(df, schema::COUNTRY)?;

        let mut counts: HashMap<String, i64> = HashMap::new();
        for country in countries.into_iter().flatten() {
            *counts.entry(country).or_default() += 1;
        }
        Ok(ranked_totals(counts))
    }

    fn country_sums(df: &DataFrame, metric: &str) -> Result<Vec<CountryTotal>, ReportError> {
        let countries = str_values(df, schema::COUNTRY)?;
        let values = i64_values(df, metric)?;

        let mut sums: HashMap<String, i64> = HashMap::new();
        for (country, value) in countries.into_iter().zip(values) {
            if let (Some(c), Some(v)) = (country, value) {
                *sums.entry(c).or_default() += v;
            }
        }
        Ok(ranked_totals(sums))
    }
}

fn ranked_totals(totals: HashMap<String, i64>) -> Vec<CountryTotal> {
    let mut rows: Vec<CountryTotal> = totals
        .into_iter()
        .map(|(country, value)| CountryTotal { country, value })
        .collect();
    rows.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.country.cmp(&b.country)));
    rows
}

fn i64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>, ReportError> {
    let column = df.column(name)?.cast(&DataType::Int64)?;
    Ok(column.i64()?.into_iter().collect())
}

fn str_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, ReportError> {
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::filter::{FilterOptions, FilterSelection};
    use chrono::NaiveDate;

    fn engine_over(df: DataFrame) -> ReportEngine {
        ReportEngine::new(df, DashboardConfig::default())
    }

    fn sample_events() -> DataFrame {
        df!(
            schema::DISASTER_TYPE => [
                "Flood", "Storm", "Flood", "Drought", "Storm",
                "Flood", "Earthquake", "Storm", "Flood", "Drought",
            ],
            schema::COUNTRY => [
                "India", "USA", "India", "Kenya", "Japan",
                "China", "Chile", "USA", "India", "Kenya",
            ],
            schema::START_DATE => [
                Some("2010-02-01"), Some("2011-05-20"), Some("2012-08-14"), Some("2013-01-03"),
                Some("2014-09-09"), Some("2015-04-18"), Some("2016-11-30"), Some("2017-03-22"),
                None, Some("2019-07-07"),
            ],
            schema::END_DATE => [
                Some("2010-02-05"), Some("2011-05-25"), None, Some("2013-02-01"),
                Some("2014-09-12"), Some("2015-04-20"), Some("2016-12-02"), Some("2017-03-29"),
                None, Some("2019-07-10"),
            ],
            schema::YEAR => [
                Some(2010i64), Some(2011), Some(2012), Some(2013), Some(2014),
                Some(2015), Some(2016), Some(2017), None, Some(2019),
            ],
            schema::FATALITIES => [10i64, 5, 20, 0, 8, 15, 100, 3, 9, 1],
            schema::AFFECTED => [1000i64, 500, 2000, 300, 800, 1500, 9000, 100, 700, 50],
        )
        .unwrap()
    }

    fn select_all(engine: &ReportEngine) -> FilterSelection {
        FilterSelection::select_all(&FilterOptions::from_events(engine.events()))
    }

    #[test]
    fn summary_counts_add_up() {
        let engine = engine_over(sample_events());
        let report = engine.report(&select_all(&engine)).unwrap();
        // The row with a null Start_Date is outside every filtered aggregation.
        assert_eq!(report.summary.events, 9);
        assert_eq!(report.summary.fatalities, 162);
        assert_eq!(report.summary.affected, 15250);
    }

    #[test]
    fn geo_totals_ignore_the_active_filter() {
        let engine = engine_over(sample_events());
        let unfiltered = engine.geo_totals().unwrap();

        // Totals include the null-date row and never change with selections.
        let india = unfiltered
            .event_counts
            .iter()
            .find(|t| t.country == "India")
            .unwrap();
        assert_eq!(india.value, 3);

        let mut narrow = select_all(&engine);
        narrow.disaster_types = vec!["Storm".to_string()];
        let _ = engine.report(&narrow).unwrap();
        assert_eq!(engine.geo_totals().unwrap(), unfiltered);
    }

    #[test]
    fn top_ten_deadliest_orders_ties_by_row_position() {
        let df = df!(
            schema::DISASTER_TYPE => ["T0", "T1", "T2", "T3", "T4", "T5", "T6", "T7", "T8", "T9", "T10"],
            schema::COUNTRY => ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K"],
            schema::START_DATE => [Some("2010-01-01"); 11],
            schema::YEAR => [Some(2010i64); 11],
            schema::FATALITIES => [5i64, 5, 3, 9, 1, 9, 2, 4, 6, 7, 8],
            schema::AFFECTED => [0i64; 11],
        )
        .unwrap();
        let engine = engine_over(df);
        let report = engine.report(&select_all(&engine)).unwrap();

        let ranked: Vec<i64> = report.top_deadliest.iter().map(|r| r.fatalities).collect();
        assert_eq!(ranked, vec![9, 9, 8, 7, 6, 5, 5, 4, 3, 2]);

        // The two 9s and two 5s keep their original row order.
        assert_eq!(report.top_deadliest[0].disaster_type, "T3");
        assert_eq!(report.top_deadliest[1].disaster_type, "T5");
        assert_eq!(report.top_deadliest[5].disaster_type, "T0");
        assert_eq!(report.top_deadliest[6].disaster_type, "T1");
        assert_eq!(report.top_deadliest.len(), 10);
    }

    #[test]
    fn empty_selection_yields_zeroes_not_errors() {
        let engine = engine_over(sample_events());
        let mut selection = select_all(&engine);
        selection.disaster_types.clear();

        let report = engine.report(&selection).unwrap();
        assert_eq!(report.summary, SummaryCounts::default());
        assert!(report.type_distribution.is_empty());
        assert!(report.fatality_spread.is_empty());
        assert!(report.type_by_country.is_empty());
        assert!(report.fatalities_over_time.is_empty());
        assert!(report.yearly_trend.is_empty());
        assert!(report.top_deadliest.is_empty());
        assert!(report.top_affected.is_empty());
    }

    #[test]
    fn yearly_trend_excludes_the_cutoff_year() {
        let df = df!(
            schema::DISASTER_TYPE => ["Flood", "Flood", "Storm"],
            schema::COUNTRY => ["India", "India", "USA"],
            schema::START_DATE => [Some("2024-05-01"), Some("2025-02-01"), Some("2024-08-01")],
            schema::YEAR => [Some(2024i64), Some(2025), Some(2024)],
            schema::FATALITIES => [1i64, 2, 3],
            schema::AFFECTED => [10i64, 20, 30],
        )
        .unwrap();
        let engine = engine_over(df);
        let report = engine.report(&select_all(&engine)).unwrap();

        // 2025 is present everywhere else but never in the yearly trend.
        assert_eq!(report.summary.events, 3);
        assert_eq!(report.yearly_trend, vec![YearCount { year: 2024, count: 2 }]);
        assert!(report
            .fatalities_over_time
            .iter()
            .any(|s| s.points.iter().any(|&(year, _)| year == 2025)));
    }

    #[test]
    fn type_by_country_keeps_only_the_top_countries() {
        // Eight countries; "H" has the fewest rows and must not appear.
        let mut types = Vec::new();
        let mut countries = Vec::new();
        for (country, rows) in [
            ("A", 9usize), ("B", 8), ("C", 7), ("D", 6),
            ("E", 5), ("F", 4), ("G", 3), ("H", 2),
        ] {
            for _ in 0..rows {
                types.push("Flood");
                countries.push(country);
            }
        }
        let n = types.len();
        let df = df!(
            schema::DISASTER_TYPE => types,
            schema::COUNTRY => countries,
            schema::START_DATE => vec![Some("2012-01-01"); n],
            schema::YEAR => vec![Some(2012i64); n],
            schema::FATALITIES => vec![0i64; n],
            schema::AFFECTED => vec![0i64; n],
        )
        .unwrap();

        let engine = engine_over(df);
        let report = engine.report(&select_all(&engine)).unwrap();
        let kept: HashSet<&str> = report
            .type_by_country
            .iter()
            .map(|row| row.country.as_str())
            .collect();
        assert_eq!(kept.len(), 7);
        assert!(!kept.contains("H"));
    }

    #[test]
    fn timeline_marks_default_visible_series() {
        let engine = engine_over(sample_events());
        let report = engine.report(&select_all(&engine)).unwrap();

        for series in &report.fatalities_over_time {
            let expected = matches!(series.disaster_type.as_str(), "Flood" | "Storm" | "Drought");
            assert_eq!(series.visible_by_default, expected, "{}", series.disaster_type);
        }
        // Hidden series are still computed.
        assert!(report
            .fatalities_over_time
            .iter()
            .any(|s| s.disaster_type == "Earthquake" && !s.points.is_empty()));
    }

    #[test]
    fn null_years_are_excluded_from_year_groupings_only() {
        let df = df!(
            schema::DISASTER_TYPE => ["Flood", "Flood"],
            schema::COUNTRY => ["India", "India"],
            schema::START_DATE => [Some("2012-01-01"), Some("2012-06-01")],
            schema::YEAR => [Some(2012i64), None],
            schema::FATALITIES => [4i64, 6],
            schema::AFFECTED => [40i64, 60],
        )
        .unwrap();
        let engine = engine_over(df);
        let report = engine.report(&select_all(&engine)).unwrap();

        assert_eq!(report.summary.events, 2);
        assert_eq!(report.summary.fatalities, 10);
        assert_eq!(report.yearly_trend, vec![YearCount { year: 2012, count: 1 }]);
        let flood = &report.fatalities_over_time[0];
        assert_eq!(flood.points, vec![(2012, 4)]);
    }

    #[test]
    fn filter_monotonicity_over_nested_selections() {
        let engine = engine_over(sample_events());
        let options = FilterOptions::from_events(engine.events());
        let wide = FilterSelection::select_all(&options);

        let mut mid = wide.clone();
        mid.disaster_types = vec!["Flood".to_string(), "Storm".to_string()];
        let mut narrow = mid.clone();
        narrow.countries = vec!["India".to_string()];
        narrow.range_start = NaiveDate::from_ymd_opt(2011, 1, 1).unwrap();

        let n_wide = engine.report(&wide).unwrap().summary.events;
        let n_mid = engine.report(&mid).unwrap().summary.events;
        let n_narrow = engine.report(&narrow).unwrap().summary.events;
        assert!(n_narrow <= n_mid && n_mid <= n_wide);
    }
}
