use eframe::egui;

use crate::state::AppState;
use crate::ui::{charts, panels};

/// Vertical space taken by headings and chart titles below the KPI row.
const CHART_CHROME: f32 = 60.0;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ScorePandaApp {
    pub state: AppState,
}

impl ScorePandaApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ScorePandaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Right side panel: per-state table ----
        egui::SidePanel::right("state_table")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::state_table(ui, &self.state);
            });

        // ---- Central panel: KPIs and the four charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Student Score Dashboard");
            ui.add_space(4.0);
            panels::kpi_row(ui, &self.state.view.kpi);
            ui.add_space(8.0);

            let chart_height = ((ui.available_height() - CHART_CHROME) / 2.0).max(120.0);
            let state = &self.state;
            ui.columns(2, |cols| {
                charts::state_mean_chart(&mut cols[0], state, chart_height);
                charts::time_series_chart(&mut cols[1], state, chart_height);
            });
            ui.add_space(8.0);
            ui.columns(2, |cols| {
                charts::histogram_chart(&mut cols[0], state, chart_height);
                charts::box_chart(&mut cols[1], state, chart_height);
            });
        });
    }
}
