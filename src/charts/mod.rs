//! Charts module - chart configuration and egui_plot rendering

mod plotter;
mod spec;

pub use plotter::{CategoryValue, ChartPlotter, SeriesBars, SeriesLine, PALETTE};
pub use spec::{ChartKind, ChartSpec, Theme};
