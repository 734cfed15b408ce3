//! Filter Panel Widget
//! Left side panel with the three filter controls: disaster-type multi-select,
//! country multi-select, and the start-date range.

use chrono::NaiveDate;
use egui::{Color32, RichText, ScrollArea};

use crate::data::DATE_STORAGE_FORMAT;
use crate::report::{FilterOptions, FilterSelection};

/// Actions triggered by the filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPanelAction {
    None,
    /// Any filter control changed; the report must be recomputed.
    Changed,
    OpenDatabase,
}

/// Left side panel. Selection state is kept parallel to the option lists the
/// app derived from the unfiltered table.
pub struct FilterPanel {
    pub selected_types: Vec<bool>,
    pub selected_countries: Vec<bool>,
    pub start_text: String,
    pub end_text: String,
    pub status: String,
}

impl Default for FilterPanel {
    fn default() -> Self {
        Self {
            selected_types: Vec::new(),
            selected_countries: Vec::new(),
            start_text: String::new(),
            end_text: String::new(),
            status: "No database loaded".to_string(),
        }
    }
}

impl FilterPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every control to "select everything" for freshly loaded options.
    pub fn reset(&mut self, options: &FilterOptions) {
        self.selected_types = vec![true; options.disaster_types.len()];
        self.selected_countries = vec![true; options.countries.len()];
        self.start_text = options
            .min_date
            .map(|d| d.format(DATE_STORAGE_FORMAT).to_string())
            .unwrap_or_default();
        self.end_text = options
            .max_date
            .map(|d| d.format(DATE_STORAGE_FORMAT).to_string())
            .unwrap_or_default();
    }

    /// The current selection. Unparseable date fields fall back to the full
    /// observed range.
    pub fn selection(&self, options: &FilterOptions) -> FilterSelection {
        let fallback = FilterSelection::select_all(options);
        FilterSelection {
            disaster_types: Self::checked(&options.disaster_types, &self.selected_types),
            countries: Self::checked(&options.countries, &self.selected_countries),
            range_start: parse_entry(&self.start_text).unwrap_or(fallback.range_start),
            range_end: parse_entry(&self.end_text).unwrap_or(fallback.range_end),
        }
    }

    fn checked(values: &[String], selected: &[bool]) -> Vec<String> {
        values
            .iter()
            .zip(selected.iter())
            .filter(|(_, &on)| on)
            .map(|(value, _)| value.clone())
            .collect()
    }

    /// Draw the panel.
    pub fn show(&mut self, ui: &mut egui::Ui, options: &FilterOptions) -> FilterPanelAction {
        let mut action = FilterPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🌍 HazardBoard")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Natural Disaster Analytics")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);
        if ui.button("📂 Open database…").clicked() {
            action = FilterPanelAction::OpenDatabase;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Disaster Type Section =====
        ui.label(RichText::new("⚡ Disaster Types").size(14.0).strong());
        ui.add_space(5.0);
        if self.checkbox_list(ui, "types", &options.disaster_types, true) {
            action = FilterPanelAction::Changed;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Country Section =====
        ui.label(RichText::new("🗺 Countries").size(14.0).strong());
        ui.add_space(5.0);
        if self.checkbox_list(ui, "countries", &options.countries, false) {
            action = FilterPanelAction::Changed;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Date Range Section =====
        ui.label(RichText::new("📅 Date Range").size(14.0).strong());
        ui.add_space(5.0);

        let mut dates_changed = false;
        ui.horizontal(|ui| {
            ui.add_sized([40.0, 20.0], egui::Label::new("From:"));
            if ui.text_edit_singleline(&mut self.start_text).changed() {
                dates_changed = true;
            }
        });
        ui.horizontal(|ui| {
            ui.add_sized([40.0, 20.0], egui::Label::new("To:"));
            if ui.text_edit_singleline(&mut self.end_text).changed() {
                dates_changed = true;
            }
        });
        if parse_entry(&self.start_text).is_none() || parse_entry(&self.end_text).is_none() {
            ui.label(
                RichText::new("Enter dates as YYYY-MM-DD")
                    .size(11.0)
                    .color(Color32::from_rgb(220, 53, 69)),
            );
        }
        if dates_changed {
            action = FilterPanelAction::Changed;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        let status_color = if self.status.contains("Failed") || self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Checkbox list with Select All / Clear All. Returns true if anything
    /// changed.
    fn checkbox_list(
        &mut self,
        ui: &mut egui::Ui,
        which: &str,
        values: &[String],
        for_types: bool,
    ) -> bool {
        let mut changed = false;
        let selected = if for_types {
            &mut self.selected_types
        } else {
            &mut self.selected_countries
        };

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt(which.to_string())
                    .max_height(140.0)
                    .show(ui, |ui| {
                        for (index, value) in values.iter().enumerate() {
                            if index < selected.len()
                                && ui.checkbox(&mut selected[index], value).changed()
                            {
                                changed = true;
                            }
                        }
                    });
            });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() {
                selected.iter_mut().for_each(|on| *on = true);
                changed = true;
            }
            if ui.small_button("Clear All").clicked() {
                selected.iter_mut().for_each(|on| *on = false);
                changed = true;
            }
        });

        changed
    }
}

fn parse_entry(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_STORAGE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn options() -> FilterOptions {
        let df = df!(
            crate::schema::DISASTER_TYPE => ["Flood", "Storm"],
            crate::schema::COUNTRY => ["India", "USA"],
            crate::schema::START_DATE => [Some("2010-01-01"), Some("2020-12-31")],
        )
        .unwrap();
        FilterOptions::from_events(&df)
    }

    #[test]
    fn reset_selects_everything() {
        let options = options();
        let mut panel = FilterPanel::new();
        panel.reset(&options);

        let selection = panel.selection(&options);
        assert_eq!(selection, FilterSelection::select_all(&options));
    }

    #[test]
    fn invalid_date_entry_falls_back_to_full_range() {
        let options = options();
        let mut panel = FilterPanel::new();
        panel.reset(&options);
        panel.start_text = "garbage".to_string();

        let selection = panel.selection(&options);
        assert_eq!(selection.range_start, options.min_date.unwrap());
    }

    #[test]
    fn unchecking_drops_values_from_the_selection() {
        let options = options();
        let mut panel = FilterPanel::new();
        panel.reset(&options);
        panel.selected_types[0] = false;

        let selection = panel.selection(&options);
        assert_eq!(selection.disaster_types, vec!["Storm".to_string()]);
    }
}
