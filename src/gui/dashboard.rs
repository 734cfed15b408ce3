//! Dashboard Widget
//! Central scrollable panel: metric tiles, one card per aggregation, and the
//! top-10 tables. Each card pairs aggregation rows with a `ChartSpec` and
//! hands both to the plotter.

use std::collections::BTreeMap;

use egui::{Color32, RichText, ScrollArea};

use crate::charts::{CategoryValue, ChartKind, ChartPlotter, ChartSpec, SeriesBars, SeriesLine, Theme};
use crate::report::{EventRow, FatalitySeries, GeoTotals, Report, SummaryCounts};

/// How many countries the per-country total charts display. The totals are
/// computed for every country; this only trims the drawing.
const GEO_BARS_SHOWN: usize = 15;

pub struct DashboardView {
    /// Per-series visibility of the fatalities timeline, seeded from the
    /// report's default-visibility hints and then owned by the user.
    timeline_visibility: BTreeMap<String, bool>,
    theme: Theme,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            timeline_visibility: BTreeMap::new(),
            theme: Theme::default(),
        }
    }
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Seed visibility for series not seen before; existing user toggles win.
    pub fn sync_timeline_series(&mut self, series: &[FatalitySeries]) {
        for s in series {
            self.timeline_visibility
                .entry(s.disaster_type.clone())
                .or_insert(s.visible_by_default);
        }
    }

    pub fn clear(&mut self) {
        self.timeline_visibility.clear();
    }

    /// Draw the whole dashboard for one computed report.
    pub fn show(&mut self, ui: &mut egui::Ui, report: &Report, geo: Option<&GeoTotals>) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::metrics_row(ui, &report.summary);
                ui.add_space(12.0);

                self.type_distribution_card(ui, report);
                ui.add_space(12.0);
                self.fatality_spread_card(ui, report);
                ui.add_space(12.0);
                self.type_by_country_card(ui, report);
                ui.add_space(12.0);
                self.timeline_card(ui, report);
                ui.add_space(12.0);
                self.yearly_trend_card(ui, report);
                ui.add_space(12.0);

                if let Some(geo) = geo {
                    self.geo_cards(ui, geo);
                    ui.add_space(12.0);
                }

                Self::top_table_card(
                    ui,
                    "💀 Top 10 Deadliest Disasters",
                    "Fatalities",
                    &report.top_deadliest,
                    |row| row.fatalities,
                );
                ui.add_space(12.0);
                Self::top_table_card(
                    ui,
                    "👥 Top 10 Most Affecting Disasters",
                    "Affected",
                    &report.top_affected,
                    |row| row.affected,
                );
                ui.add_space(12.0);
            });
    }

    /// Three metric tiles across the top.
    fn metrics_row(ui: &mut egui::Ui, summary: &SummaryCounts) {
        ui.horizontal(|ui| {
            Self::metric_tile(ui, "Total Disasters", &summary.events.to_string());
            Self::metric_tile(ui, "Total Fatalities", &summary.fatalities.to_string());
            Self::metric_tile(ui, "Total Affected", &summary.affected.to_string());
        });
    }

    fn metric_tile(ui: &mut egui::Ui, label: &str, value: &str) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(8.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_min_width(160.0);
                ui.vertical(|ui| {
                    ui.label(RichText::new(label).size(12.0).color(Color32::GRAY));
                    ui.label(RichText::new(value).size(24.0).strong());
                });
            });
        ui.add_space(10.0);
    }

    fn chart_card(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(title).size(16.0).strong());
                ui.add_space(8.0);
                add_contents(ui);
            });
    }

    fn type_distribution_card(&self, ui: &mut egui::Ui, report: &Report) {
        let spec = ChartSpec::new(ChartKind::Bar, "Disaster Count by Type")
            .with_axes("Disaster Type", "Count")
            .with_color_field(crate::schema::DISASTER_TYPE)
            .with_theme(self.theme);
        let items: Vec<CategoryValue> = report
            .type_distribution
            .iter()
            .map(|row| CategoryValue {
                label: row.disaster_type.clone(),
                value: row.count as f64,
            })
            .collect();

        Self::chart_card(ui, "📊 Disaster Type Distribution", |ui| {
            ChartPlotter::bar_chart(ui, &spec, &items);
        });
    }

    fn fatality_spread_card(&self, ui: &mut egui::Ui, report: &Report) {
        let spec = ChartSpec::new(ChartKind::Box, "Fatalities by Disaster Type")
            .with_axes("Disaster Type", "Fatalities")
            .with_color_field(crate::schema::DISASTER_TYPE)
            .with_theme(self.theme);
        let items: Vec<(String, crate::report::stats::FiveNumber)> = report
            .fatality_spread
            .iter()
            .map(|row| (row.disaster_type.clone(), row.fatalities))
            .collect();

        Self::chart_card(ui, "📦 Fatalities by Disaster Type", |ui| {
            ChartPlotter::box_chart(ui, &spec, &items);
        });
    }

    fn type_by_country_card(&self, ui: &mut egui::Ui, report: &Report) {
        // Rows are sorted by (type, country); rebuild the two axes from them.
        let mut categories: Vec<String> = Vec::new();
        let mut countries: Vec<String> = Vec::new();
        for row in &report.type_by_country {
            if !categories.contains(&row.disaster_type) {
                categories.push(row.disaster_type.clone());
            }
            if !countries.contains(&row.country) {
                countries.push(row.country.clone());
            }
        }
        countries.sort();

        let series: Vec<SeriesBars> = countries
            .iter()
            .map(|country| {
                let values = categories
                    .iter()
                    .map(|disaster_type| {
                        report
                            .type_by_country
                            .iter()
                            .find(|row| {
                                &row.disaster_type == disaster_type && &row.country == country
                            })
                            .map(|row| row.count as f64)
                            .unwrap_or(0.0)
                    })
                    .collect();
                SeriesBars {
                    name: country.clone(),
                    values,
                }
            })
            .collect();

        let spec = ChartSpec::new(ChartKind::GroupedBar, "Disaster Count by Country (Top 7)")
            .with_axes("Disaster Type", "Count")
            .with_color_field(crate::schema::COUNTRY)
            .with_theme(self.theme);
        let legend: Vec<(String, Color32)> = series
            .iter()
            .enumerate()
            .map(|(index, s)| (s.name.clone(), ChartPlotter::series_color(index)))
            .collect();

        Self::chart_card(ui, "🌍 Disaster vs Country (Top 7 Only)", |ui| {
            ChartPlotter::legend_row(ui, &legend);
            ui.add_space(4.0);
            ChartPlotter::grouped_bar_chart(ui, &spec, &categories, &series);
        });
    }

    fn timeline_card(&mut self, ui: &mut egui::Ui, report: &Report) {
        let hidden: Vec<String> = report
            .fatalities_over_time
            .iter()
            .filter(|s| !s.visible_by_default)
            .map(|s| s.disaster_type.clone())
            .collect();
        let spec = ChartSpec::new(ChartKind::Line, "Fatalities Over Time")
            .with_axes("Year", "Fatalities")
            .with_color_field(crate::schema::DISASTER_TYPE)
            .with_theme(self.theme)
            .with_hidden_series(hidden);

        let visibility = &mut self.timeline_visibility;
        Self::chart_card(ui, "📈 Fatalities Over Time", |ui| {
            // Toggle row doubles as the legend; colors stay stable per series
            // index whether or not a series is currently shown.
            ui.horizontal_wrapped(|ui| {
                for (index, series) in report.fatalities_over_time.iter().enumerate() {
                    let color = ChartPlotter::series_color(index);
                    let on = visibility
                        .entry(series.disaster_type.clone())
                        .or_insert(series.visible_by_default);
                    ui.checkbox(on, RichText::new(&series.disaster_type).color(color));
                    ui.add_space(8.0);
                }
            });
            ui.add_space(4.0);

            let lines: Vec<SeriesLine> = report
                .fatalities_over_time
                .iter()
                .enumerate()
                .filter(|(_, series)| {
                    visibility
                        .get(&series.disaster_type)
                        .copied()
                        .unwrap_or(series.visible_by_default)
                })
                .map(|(index, series)| SeriesLine {
                    name: series.disaster_type.clone(),
                    color: ChartPlotter::series_color(index),
                    points: series
                        .points
                        .iter()
                        .map(|&(year, fatalities)| [year as f64, fatalities as f64])
                        .collect(),
                })
                .collect();
            ChartPlotter::line_chart(ui, &spec, &lines);
        });
    }

    fn yearly_trend_card(&self, ui: &mut egui::Ui, report: &Report) {
        let spec = ChartSpec::new(ChartKind::Line, "Number of Disasters per Year")
            .with_axes("Year", "Count")
            .with_theme(self.theme);
        let line = SeriesLine {
            name: "Disasters".to_string(),
            color: ChartPlotter::series_color(0),
            points: report
                .yearly_trend
                .iter()
                .map(|row| [row.year as f64, row.count as f64])
                .collect(),
        };

        Self::chart_card(ui, "📅 Yearly Disaster Trend", |ui| {
            ChartPlotter::line_chart(ui, &spec, &[line]);
        });
    }

    /// The three per-country totals. These always reflect the whole dataset;
    /// the active filter does not touch them.
    fn geo_cards(&self, ui: &mut egui::Ui, geo: &GeoTotals) {
        ui.label(RichText::new("🌍 Country Totals — Full Dataset").size(16.0).strong());
        ui.label(
            RichText::new("Computed over every event, independent of the filters above.")
                .size(11.0)
                .color(Color32::GRAY),
        );
        ui.add_space(8.0);

        for (title, y_label, totals) in [
            ("Disasters by Country", "Count", &geo.event_counts),
            ("Fatalities by Country", "Fatalities", &geo.fatalities),
            ("Affected Population by Country", "Affected", &geo.affected),
        ] {
            let spec = ChartSpec::new(ChartKind::Bar, title)
                .with_axes("Country", y_label)
                .with_color_field(crate::schema::COUNTRY)
                .with_theme(self.theme);
            let items: Vec<CategoryValue> = totals
                .iter()
                .take(GEO_BARS_SHOWN)
                .map(|total| CategoryValue {
                    label: total.country.clone(),
                    value: total.value as f64,
                })
                .collect();

            let heading = if totals.len() > GEO_BARS_SHOWN {
                format!("{} (top {} of {})", title, GEO_BARS_SHOWN, totals.len())
            } else {
                title.to_string()
            };
            Self::chart_card(ui, &heading, |ui| {
                ChartPlotter::bar_chart(ui, &spec, &items);
            });
            ui.add_space(12.0);
        }
    }

    fn top_table_card(
        ui: &mut egui::Ui,
        title: &str,
        metric_label: &str,
        rows: &[EventRow],
        metric: impl Fn(&EventRow) -> i64,
    ) {
        Self::chart_card(ui, title, |ui| {
            egui::Grid::new(ui.make_persistent_id(title.to_string()))
                .striped(true)
                .min_col_width(80.0)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Year").strong().size(12.0));
                    ui.label(RichText::new("Disaster Type").strong().size(12.0));
                    ui.label(RichText::new("Country").strong().size(12.0));
                    ui.label(RichText::new(metric_label).strong().size(12.0));
                    ui.end_row();

                    for row in rows {
                        let year = row
                            .year
                            .map(|y| y.to_string())
                            .unwrap_or_else(|| "-".to_string());
                        ui.label(RichText::new(year).size(12.0));
                        ui.label(RichText::new(&row.disaster_type).size(12.0));
                        ui.label(RichText::new(&row.country).size(12.0));
                        ui.label(RichText::new(metric(row).to_string()).size(12.0));
                        ui.end_row();
                    }
                });
        });
    }
}
