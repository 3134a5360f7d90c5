use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::color::ColorMap;
use crate::data::aggregate::{compute_view, DashboardView, SubjectQuartiles};
use crate::data::filter::{init_filter_state, FilterState};
use crate::data::model::{ScoreDataset, Subject};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None only before the first successful load).
    pub dataset: Option<ScoreDataset>,

    /// File the dataset came from.
    pub source: Option<PathBuf>,

    /// Current widget selections.
    pub filters: FilterState,

    /// Derived views for `filters`. Replaced on every recompute.
    pub view: DashboardView,

    /// Histogram bin count.
    pub bins: usize,

    /// One colour per state, stable across selections.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

/// What "Export view" writes to disk.
#[derive(Serialize)]
struct ViewExport<'a> {
    source: Option<&'a Path>,
    filters: &'a FilterState,
    quartiles: &'a [SubjectQuartiles],
    #[serde(flatten)]
    view: &'a DashboardView,
}

impl AppState {
    pub fn new(bins: usize) -> Self {
        Self {
            dataset: None,
            source: None,
            filters: FilterState::default(),
            view: DashboardView::default(),
            bins,
            color_map: ColorMap::default(),
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset, initialise filters and recompute.
    pub fn set_dataset(&mut self, dataset: ScoreDataset, source: Option<PathBuf>) {
        self.filters = init_filter_state(&dataset);
        self.color_map = ColorMap::new(&dataset.states);
        self.dataset = Some(dataset);
        self.source = source;
        self.status_message = None;
        self.recompute();
    }

    /// Recompute every derived view from the current filters.
    ///
    /// Runs after any widget change. There is no dirty tracking: the whole
    /// view is rebuilt from the immutable dataset.
    pub fn recompute(&mut self) {
        let Some(ds) = &self.dataset else {
            self.view = DashboardView::default();
            return;
        };
        self.view = compute_view(ds, &self.filters, self.bins);

        log::debug!(
            "recomputed view: year={} subject={} min_score={} -> {} rows",
            self.filters.year,
            self.filters.subject,
            self.filters.min_score,
            self.view.kpi.count
        );
        if self.view.kpi.count == 0 {
            log::warn!("current filters match no records");
        }
    }

    /// Quartile summary of the whole dataset (static).
    pub fn quartiles(&self) -> &[SubjectQuartiles] {
        self.dataset
            .as_ref()
            .map(|ds| ds.quartiles.as_slice())
            .unwrap_or(&[])
    }

    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.filters = init_filter_state(ds);
            self.recompute();
        }
    }

    pub fn set_year(&mut self, year: i32) {
        self.filters.year = year;
        self.recompute();
    }

    pub fn set_subject(&mut self, subject: Subject) {
        self.filters.subject = subject;
        self.recompute();
    }

    pub fn set_min_score(&mut self, min_score: u32) {
        self.filters.min_score = min_score.min(100);
        self.recompute();
    }

    /// Toggle a single state in the multi-select.
    pub fn toggle_state(&mut self, state: &str) {
        if !self.filters.states.remove(state) {
            self.filters.states.insert(state.to_string());
        }
        self.recompute();
    }

    pub fn select_all_states(&mut self) {
        if let Some(ds) = &self.dataset {
            self.filters.states = ds.states.clone();
            self.recompute();
        }
    }

    pub fn select_no_states(&mut self) {
        self.filters.states.clear();
        self.recompute();
    }

    pub fn toggle_gender(&mut self, gender: &str) {
        if !self.filters.genders.remove(gender) {
            self.filters.genders.insert(gender.to_string());
        }
        self.recompute();
    }

    /// Write the current view and filters as pretty JSON.
    pub fn export_view(&self, path: &Path) -> Result<()> {
        let export = ViewExport {
            source: self.source.as_deref(),
            filters: &self.filters,
            quartiles: self.quartiles(),
            view: &self.view,
        };
        let json = serde_json::to_string_pretty(&export).context("serialising view")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported view to {}", path.display());
        Ok(())
    }
}
