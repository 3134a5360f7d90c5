use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::Kpi;
use crate::data::model::Subject;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone the domains so we can mutate state inside the widgets.
    let years = dataset.years.clone();
    let states = dataset.states.clone();
    let genders = dataset.genders.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year ----
            ui.strong("Year");
            let current_year = state.filters.year;
            egui::ComboBox::from_id_salt("year")
                .selected_text(current_year.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for &year in &years {
                        if ui
                            .selectable_label(current_year == year, year.to_string())
                            .clicked()
                        {
                            state.set_year(year);
                        }
                    }
                });
            ui.add_space(4.0);

            // ---- Subject ----
            ui.strong("Subject");
            let current_subject = state.filters.subject;
            egui::ComboBox::from_id_salt("subject")
                .selected_text(current_subject.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for subject in Subject::ALL {
                        if ui
                            .selectable_label(current_subject == subject, subject.label())
                            .clicked()
                        {
                            state.set_subject(subject);
                        }
                    }
                });
            ui.add_space(4.0);

            // ---- Minimum score ----
            ui.strong("Minimum score");
            let mut min_score = state.filters.min_score;
            if ui
                .add(egui::Slider::new(&mut min_score, 0..=100).integer())
                .changed()
            {
                state.set_min_score(min_score);
            }
            ui.add_space(4.0);

            // ---- Gender ----
            ui.strong("Gender");
            for gender in &genders {
                let mut checked = state.filters.genders.contains(gender);
                if ui.checkbox(&mut checked, gender.as_str()).changed() {
                    state.toggle_gender(gender);
                }
            }
            ui.separator();

            // ---- States (collapsible) ----
            let header_text = format!("States  ({}/{})", state.filters.states.len(), states.len());
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("states")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_states();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_states();
                        }
                    });

                    for name in &states {
                        let mut checked = state.filters.states.contains(name);
                        let text = RichText::new(name).color(state.color_map.color_for(name));
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_state(name);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// KPI row
// ---------------------------------------------------------------------------

fn format_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

/// The four KPI labels, with placeholders for an empty subset.
pub fn kpi_labels(kpi: &Kpi) -> [(&'static str, String); 4] {
    [
        ("Average score", format_stat(kpi.mean)),
        ("Highest score", format_stat(kpi.max)),
        ("Lowest score", format_stat(kpi.min)),
        ("Students", kpi.count.to_string()),
    ]
}

pub fn kpi_row(ui: &mut Ui, kpi: &Kpi) {
    let labels = kpi_labels(kpi);
    ui.columns(labels.len(), |cols: &mut [Ui]| {
        for (col, (title, value)) in cols.iter_mut().zip(labels) {
            egui::Frame::group(col.style()).show(col, |ui: &mut Ui| {
                ui.set_min_width(ui.available_width());
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.label(RichText::new(title).weak());
                    ui.label(RichText::new(value).size(22.0).strong());
                });
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Right side panel – per-state summary table
// ---------------------------------------------------------------------------

pub fn state_table(ui: &mut Ui, state: &AppState) {
    ui.heading("By state");
    ui.separator();

    if state.view.state_means.is_empty() {
        ui.label(RichText::new("No records match the current filters.").weak());
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::remainder())
        .column(Column::auto())
        .column(Column::auto())
        .header(20.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("State");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Average");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("n");
            });
        })
        .body(|mut body| {
            for m in &state.view.state_means {
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(RichText::new(&m.state).color(state.color_map.color_for(&m.state)));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.2}", m.mean));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(m.count.to_string());
                    });
                });
            }
        });
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
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Export view…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} match",
                ds.len(),
                state.view.kpi.count
            ));
        }

        ui.separator();

        if ui
            .add_enabled(state.dataset.is_some(), egui::Button::new("Reset filters"))
            .clicked()
        {
            state.reset_filters();
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open score table")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => state.set_dataset(dataset, Some(path)),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export current view")
        .add_filter("JSON", &["json"])
        .set_file_name("dashboard_view.json")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_view(&path) {
            log::error!("Failed to export view: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
