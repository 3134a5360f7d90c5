use std::collections::BTreeSet;

use serde::Serialize;

use super::model::{ScoreDataset, ScoreRecord, Subject};

// ---------------------------------------------------------------------------
// Filter state: the five widget selections
// ---------------------------------------------------------------------------

/// Current widget selections governing which records are aggregated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterState {
    /// Single selected year.
    pub year: i32,
    /// Selected states. Empty means nothing passes.
    pub states: BTreeSet<String>,
    /// Subject shown in the histogram. Does not filter rows.
    pub subject: Subject,
    /// Minimum derived score, inclusive (0–100).
    pub min_score: u32,
    /// Active gender labels. Empty means nothing passes.
    pub genders: BTreeSet<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            year: 0,
            states: BTreeSet::new(),
            subject: Subject::Math,
            min_score: 0,
            genders: BTreeSet::new(),
        }
    }
}

impl FilterState {
    /// Whether a record passes every row predicate.
    pub fn matches(&self, rec: &ScoreRecord) -> bool {
        rec.year == self.year
            && self.states.contains(&rec.state)
            && self.genders.contains(&rec.gender)
            && rec.average >= f64::from(self.min_score)
    }
}

/// Initialise a [`FilterState`]: latest year, everything else fully selected.
pub fn init_filter_state(dataset: &ScoreDataset) -> FilterState {
    FilterState {
        year: dataset.latest_year().unwrap_or_default(),
        states: dataset.states.clone(),
        subject: Subject::Math,
        min_score: 0,
        genders: dataset.genders.clone(),
    }
}

/// Return indices of records that pass all active filters.
pub fn filtered_indices(dataset: &ScoreDataset, filters: &FilterState) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| filters.matches(rec))
        .map(|(i, _)| i)
        .collect()
}
