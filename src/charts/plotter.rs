//! Chart Plotter Module
//! Draws the dashboard's charts with egui_plot from pre-aggregated rows.
//! The plotter never aggregates; it only maps rows plus a `ChartSpec` onto
//! plot elements.

use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Line, Plot, PlotPoints, Points};

use crate::charts::ChartSpec;
use crate::report::stats::FiveNumber;

/// Color palette for series.
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(255, 87, 34),   // Deep Orange
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

const CHART_HEIGHT: f32 = 280.0;

/// One labeled bar.
#[derive(Debug, Clone)]
pub struct CategoryValue {
    pub label: String,
    pub value: f64,
}

/// One series of a grouped bar chart; `values` is parallel to the category
/// axis.
#[derive(Debug, Clone)]
pub struct SeriesBars {
    pub name: String,
    pub values: Vec<f64>,
}

/// One line of a multi-series line chart, already in plot coordinates.
#[derive(Debug, Clone)]
pub struct SeriesLine {
    pub name: String,
    pub color: Color32,
    pub points: Vec<[f64; 2]>,
}

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Horizontal legend of colored squares, one per series.
    pub fn legend_row(ui: &mut egui::Ui, entries: &[(String, Color32)]) {
        ui.horizontal_wrapped(|ui| {
            for (name, color) in entries {
                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                ui.painter().rect_filled(rect, 2.0, *color);
                ui.label(RichText::new(name).size(12.0));
                ui.add_space(10.0);
            }
        });
    }

    /// Vertical bars over a categorical x-axis.
    pub fn bar_chart(ui: &mut egui::Ui, spec: &ChartSpec, items: &[CategoryValue]) {
        let labels: Vec<String> = items.iter().map(|item| item.label.clone()).collect();

        Plot::new(spec.title.clone())
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .x_axis_formatter(move |mark, _range| {
                let index = mark.value.round();
                if index >= 0.0
                    && (index as usize) < labels.len()
                    && (mark.value - index).abs() < 0.25
                {
                    labels[index as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                let bars: Vec<Bar> = items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        Bar::new(index as f64, item.value)
                            .width(0.6)
                            .fill(Self::series_color(index))
                            .name(item.label.clone())
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    /// Side-by-side bars per category, one color per series.
    pub fn grouped_bar_chart(
        ui: &mut egui::Ui,
        spec: &ChartSpec,
        categories: &[String],
        series: &[SeriesBars],
    ) {
        let labels: Vec<String> = categories.to_vec();
        let group_width = 0.8;
        let bar_width = group_width / series.len().max(1) as f64;

        Plot::new(spec.title.clone())
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .x_axis_formatter(move |mark, _range| {
                let index = mark.value.round();
                if index >= 0.0
                    && (index as usize) < labels.len()
                    && (mark.value - index).abs() < 0.25
                {
                    labels[index as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (series_index, s) in series.iter().enumerate() {
                    let color = Self::series_color(series_index);
                    let bars: Vec<Bar> = s
                        .values
                        .iter()
                        .enumerate()
                        .filter(|(_, &value)| value > 0.0)
                        .map(|(category_index, &value)| {
                            let x = category_index as f64 - group_width / 2.0
                                + bar_width * (series_index as f64 + 0.5);
                            Bar::new(x, value)
                                .width(bar_width * 0.9)
                                .fill(color)
                                .name(s.name.clone())
                        })
                        .collect();
                    plot_ui.bar_chart(BarChart::new(bars));
                }
            });
    }

    /// Box-style summaries over a categorical x-axis: whiskers at min/max,
    /// box at the quartiles.
    pub fn box_chart(ui: &mut egui::Ui, spec: &ChartSpec, items: &[(String, FiveNumber)]) {
        let labels: Vec<String> = items.iter().map(|(label, _)| label.clone()).collect();

        Plot::new(spec.title.clone())
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .x_axis_formatter(move |mark, _range| {
                let index = mark.value.round();
                if index >= 0.0
                    && (index as usize) < labels.len()
                    && (mark.value - index).abs() < 0.25
                {
                    labels[index as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (index, (label, spread)) in items.iter().enumerate() {
                    let color = Self::series_color(index);
                    let elem = BoxElem::new(
                        index as f64,
                        BoxSpread::new(
                            spread.min,
                            spread.q1,
                            spread.median,
                            spread.q3,
                            spread.max,
                        ),
                    )
                    .box_width(0.5)
                    .fill(color.gamma_multiply(0.3))
                    .stroke(egui::Stroke::new(1.5, color));

                    plot_ui.box_plot(BoxPlot::new(vec![elem]).name(label));
                }
            });
    }

    /// Multi-series line chart with point markers. The caller decides which
    /// series are passed in; hidden-by-default series simply are not.
    pub fn line_chart(ui: &mut egui::Ui, spec: &ChartSpec, series: &[SeriesLine]) {
        Plot::new(spec.title.clone())
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .x_axis_formatter(|mark, _range| format!("{}", mark.value.round() as i64))
            .show(ui, |plot_ui| {
                for s in series {
                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(s.points.iter().copied()))
                            .color(s.color)
                            .width(2.0)
                            .name(s.name.clone()),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(s.points.iter().copied()))
                            .radius(3.0)
                            .color(s.color)
                            .name(s.name.clone()),
                    );
                }
            });
    }
}
