use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::aggregate::{quartile_summary, SubjectQuartiles};

// ---------------------------------------------------------------------------
// Subject – one of the three score columns
// ---------------------------------------------------------------------------

/// A tested subject. Each maps to one score column of the source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Math,
    Reading,
    Writing,
}

impl Subject {
    pub const ALL: [Subject; 3] = [Subject::Math, Subject::Reading, Subject::Writing];

    /// Column name in the source CSV / Parquet file.
    pub fn column(self) -> &'static str {
        match self {
            Subject::Math => "math_score",
            Subject::Reading => "reading_score",
            Subject::Writing => "writing_score",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::Reading => "Reading",
            Subject::Writing => "Writing",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// ScoreRecord – one row of the table
// ---------------------------------------------------------------------------

/// A single student result (one row of the source table).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub state: String,
    pub gender: String,
    pub year: i32,
    pub math: f64,
    pub reading: f64,
    pub writing: f64,
    /// Derived score: mean of the three subjects, two decimals.
    pub average: f64,
}

impl ScoreRecord {
    pub fn new(
        state: impl Into<String>,
        gender: impl Into<String>,
        year: i32,
        math: f64,
        reading: f64,
        writing: f64,
    ) -> Self {
        Self {
            state: state.into(),
            gender: gender.into(),
            year,
            math,
            reading,
            writing,
            average: derived_score(math, reading, writing),
        }
    }

    /// Raw score for the given subject.
    pub fn score(&self, subject: Subject) -> f64 {
        match subject {
            Subject::Math => self.math,
            Subject::Reading => self.reading,
            Subject::Writing => self.writing,
        }
    }
}

/// Mean of the three subject scores, rounded to two decimals.
pub fn derived_score(math: f64, reading: f64, writing: f64) -> f64 {
    let mean = (math + reading + writing) / 3.0;
    (mean * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// ScoreDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed domains.
#[derive(Debug, Clone)]
pub struct ScoreDataset {
    pub records: Vec<ScoreRecord>,
    pub years: BTreeSet<i32>,
    pub states: BTreeSet<String>,
    pub genders: BTreeSet<String>,
    /// Box summary per subject over the whole table. Not affected by filters.
    pub quartiles: Vec<SubjectQuartiles>,
}

impl ScoreDataset {
    /// Build domain indices and the static quartile summary.
    pub fn from_records(records: Vec<ScoreRecord>) -> Self {
        let mut years = BTreeSet::new();
        let mut states = BTreeSet::new();
        let mut genders = BTreeSet::new();

        for rec in &records {
            years.insert(rec.year);
            states.insert(rec.state.clone());
            genders.insert(rec.gender.clone());
        }

        let quartiles = quartile_summary(&records);

        ScoreDataset {
            records,
            years,
            states,
            genders,
            quartiles,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent observed year.
    pub fn latest_year(&self) -> Option<i32> {
        self.years.iter().next_back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_score_rounds_to_two_decimals() {
        assert_eq!(derived_score(70.0, 80.0, 81.0), 77.0);
        assert_eq!(derived_score(70.0, 80.0, 80.0), 76.67);
        assert_eq!(derived_score(100.0, 100.0, 99.0), 99.67);
    }

    #[test]
    fn record_exposes_subject_scores() {
        let rec = ScoreRecord::new("Texas", "female", 2020, 60.0, 70.0, 80.0);
        assert_eq!(rec.score(Subject::Math), 60.0);
        assert_eq!(rec.score(Subject::Reading), 70.0);
        assert_eq!(rec.score(Subject::Writing), 80.0);
        assert_eq!(rec.average, 70.0);
    }

    #[test]
    fn dataset_collects_sorted_domains() {
        let ds = ScoreDataset::from_records(vec![
            ScoreRecord::new("Texas", "male", 2021, 50.0, 50.0, 50.0),
            ScoreRecord::new("Alabama", "female", 2019, 60.0, 60.0, 60.0),
            ScoreRecord::new("Texas", "female", 2020, 70.0, 70.0, 70.0),
        ]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.years.iter().copied().collect::<Vec<_>>(), vec![2019, 2020, 2021]);
        assert_eq!(
            ds.states.iter().cloned().collect::<Vec<_>>(),
            vec!["Alabama".to_string(), "Texas".to_string()]
        );
        assert_eq!(ds.genders.len(), 2);
        assert_eq!(ds.latest_year(), Some(2021));
        assert_eq!(ds.quartiles.len(), 3);
    }

    #[test]
    fn empty_dataset_has_no_latest_year() {
        let ds = ScoreDataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.latest_year(), None);
    }
}
