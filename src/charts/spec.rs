//! Chart configuration handed to the plotting layer alongside each
//! aggregation result. The dashboard builds one `ChartSpec` per section and
//! does not inspect what the plotter draws from it.

use serde::Deserialize;

/// Display theme token, forwarded to every chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Dark
    }
}

/// What kind of mark the plotter should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    GroupedBar,
    Box,
    Line,
    Table,
}

/// Per-chart configuration.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Field whose values pick series colors, if any.
    pub color_field: Option<String>,
    pub theme: Theme,
    /// Series computed but not shown until the user toggles them on.
    pub hidden_series: Vec<String>,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, title: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            x_label: String::new(),
            y_label: String::new(),
            color_field: None,
            theme: Theme::default(),
            hidden_series: Vec::new(),
        }
    }

    pub fn with_axes(mut self, x: &str, y: &str) -> Self {
        self.x_label = x.to_string();
        self.y_label = y.to_string();
        self
    }

    pub fn with_color_field(mut self, field: &str) -> Self {
        self.color_field = Some(field.to_string());
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_hidden_series(mut self, hidden: Vec<String>) -> Self {
        self.hidden_series = hidden;
        self
    }
}
