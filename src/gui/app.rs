//! HazardBoard Main Application
//! Main window with the filter panel and the dashboard. Every filter change
//! triggers one synchronous recomputation of the whole report; there is no
//! background work and no caching between changes.

use std::path::{Path, PathBuf};

use egui::{RichText, SidePanel};
use log::{error, info};

use crate::charts::Theme;
use crate::config::{DashboardConfig, CONFIG_FILE};
use crate::gui::{DashboardView, FilterPanel, FilterPanelAction};
use crate::report::{FilterOptions, GeoTotals, Report, ReportEngine};
use crate::store::EventStore;

pub struct HazardBoardApp {
    table: String,
    config: DashboardConfig,
    engine: Option<ReportEngine>,
    options: FilterOptions,
    filter_panel: FilterPanel,
    dashboard: DashboardView,
    report: Option<Report>,
    geo: Option<GeoTotals>,
    theme_applied: bool,
}

impl HazardBoardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        database: Option<PathBuf>,
        table: String,
    ) -> Self {
        let mut app = Self {
            table,
            config: DashboardConfig::default(),
            engine: None,
            options: FilterOptions::default(),
            filter_panel: FilterPanel::new(),
            dashboard: DashboardView::new(),
            report: None,
            geo: None,
            theme_applied: false,
        };
        if let Some(path) = database {
            app.load_database(&path);
        }
        app
    }

    /// Open the store, read the full table, and set up the engine. A failure
    /// here leaves the dashboard without data; there is no fallback source.
    fn load_database(&mut self, path: &Path) {
        let config_path = path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(CONFIG_FILE);
        self.config = DashboardConfig::load_or_default(&config_path);
        self.theme_applied = false;

        let loaded =
            EventStore::open(path, &self.table).and_then(|store| store.load_events());
        match loaded {
            Ok(events) => {
                info!("loaded {} events from {}", events.height(), path.display());
                let engine = ReportEngine::new(events, self.config.clone());

                // Geographic totals never change with the filter selection,
                // so one computation at load time is enough.
                self.geo = match engine.geo_totals() {
                    Ok(geo) => Some(geo),
                    Err(e) => {
                        error!("geographic totals failed: {e}");
                        None
                    }
                };

                self.options = FilterOptions::from_events(engine.events());
                self.filter_panel.reset(&self.options);
                self.dashboard.clear();
                self.dashboard.set_theme(self.config.theme);
                self.engine = Some(engine);
                self.recompute();
            }
            Err(e) => {
                error!("failed to initialize from {}: {e}", path.display());
                self.engine = None;
                self.report = None;
                self.geo = None;
                self.options = FilterOptions::default();
                self.filter_panel = FilterPanel::new();
                self.filter_panel.status = format!("Failed to open {}: {e}", path.display());
            }
        }
    }

    /// One full synchronous pass over the in-memory table. A newer selection
    /// simply supersedes the previous report.
    fn recompute(&mut self) {
        let Some(engine) = &self.engine else {
            return;
        };
        let selection = self.filter_panel.selection(&self.options);
        match engine.report(&selection) {
            Ok(report) => {
                self.filter_panel.status = format!(
                    "{} of {} events match",
                    report.summary.events,
                    engine.events().height()
                );
                self.dashboard.sync_timeline_series(&report.fatalities_over_time);
                self.report = Some(report);
            }
            Err(e) => {
                error!("report computation failed: {e}");
                self.filter_panel.status = format!("Error: {e}");
            }
        }
    }

    fn handle_open_database(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("SQLite database", &["db", "sqlite", "sqlite3"])
            .pick_file()
        {
            self.load_database(&path);
        }
    }
}

impl eframe::App for HazardBoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            ctx.set_visuals(match self.config.theme {
                Theme::Dark => egui::Visuals::dark(),
                Theme::Light => egui::Visuals::light(),
            });
            self.theme_applied = true;
        }

        let mut action = FilterPanelAction::None;
        SidePanel::left("filter_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    action = self.filter_panel.show(ui, &self.options);
                });
            });

        match action {
            FilterPanelAction::OpenDatabase => self.handle_open_database(),
            FilterPanelAction::Changed => self.recompute(),
            FilterPanelAction::None => {}
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(report) = &self.report {
                self.dashboard.show(ui, report, self.geo.as_ref());
            } else {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No data loaded").size(20.0));
                });
            }
        });
    }
}
