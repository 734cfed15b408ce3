//! HazardBoard - Natural Disaster Analytics Dashboard
//!
//! Desktop dashboard over the cleaned disaster-events table.

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;

use hazardboard::gui::HazardBoardApp;
use hazardboard::schema;

#[derive(Parser, Debug)]
#[command(name = "hazardboard", about = "Natural disaster analytics dashboard")]
struct Cli {
    /// SQLite database produced by hazardboard-load; a file dialog opens if
    /// omitted
    #[arg(long)]
    database: Option<PathBuf>,

    /// Name of the cleaned table
    #[arg(long, default_value = schema::DEFAULT_TABLE)]
    table: String,
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("HazardBoard"),
        ..Default::default()
    };

    eframe::run_native(
        "HazardBoard",
        options,
        Box::new(move |cc| Ok(Box::new(HazardBoardApp::new(cc, cli.database, cli.table)))),
    )
}
