use std::fmt::Display;

use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::cache::TableCache;
use crate::data::filter::{Choice, FilterSelection};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Clone the handle so the selection can be mutated below.
    let Some(table) = state.table.clone() else {
        ui.label("No dataset loaded.");
        return;
    };
    if table.is_empty() {
        ui.label("The dataset has no rows.");
        return;
    }

    let current = state.selection.clone();
    let mut next = current.clone();

    ui.strong("Select Year");
    if let Some(choice) = choice_combo(ui, "season", &current.season, table.seasons.iter()) {
        next.season = choice;
    }
    ui.add_space(6.0);

    ui.strong("Select Player");
    if let Some(choice) = choice_combo(ui, "batsman", &current.batsman, table.batsmen.iter()) {
        next.batsman = choice;
    }
    ui.add_space(6.0);

    ui.strong("Select Team");
    if let Some(choice) = choice_combo(ui, "batting_team", &current.batting_team, table.teams.iter()) {
        next.batting_team = choice;
    }

    ui.separator();
    if ui.button("Clear filters").clicked() {
        next = FilterSelection::default();
    }

    state.set_selection(next);
}

/// Dropdown with an "All" entry followed by every option.
/// Returns the new choice only when the user picked something different.
fn choice_combo<'a, T>(
    ui: &mut Ui,
    id: &str,
    current: &Choice<T>,
    options: impl Iterator<Item = &'a T>,
) -> Option<Choice<T>>
where
    T: Clone + PartialEq + Display + 'a,
{
    let mut picked = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.to_string())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_all(), "All").clicked() {
                picked = Some(Choice::All);
            }
            for value in options {
                let is_current = current.as_only() == Some(value);
                if ui.selectable_label(is_current, value.to_string()).clicked() {
                    picked = Some(Choice::Only(value.clone()));
                }
            }
        });
    picked.filter(|choice| choice != current)
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                let path = state.data_path.clone();
                state.load(TableCache::global(), &path, true);
                ui.close_menu();
            }
            if ui.button("Clear cache").clicked() {
                TableCache::global().invalidate();
                log::info!("Table cache cleared");
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(table), Some(derived)) = (&state.table, &state.derived) {
            ui.label(format!(
                "{} records loaded from {}, {} visible",
                table.len(),
                state.data_path.display(),
                derived.kpis.records
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open batting data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(TableCache::global(), &path, false);
    }
}
