//! GUI module - dashboard user interface

mod app;
mod dashboard;
mod filter_panel;

pub use app::HazardBoardApp;
pub use dashboard::DashboardView;
pub use filter_panel::{FilterPanel, FilterPanelAction};
