use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::{filtered_indices, FilterState};
use super::model::{ScoreDataset, ScoreRecord, Subject};
use super::stats::{self, Histogram};

/// Default number of histogram bins.
pub const DEFAULT_BINS: usize = 15;

// ---------------------------------------------------------------------------
// Derived view types
// ---------------------------------------------------------------------------

/// Mean derived score of one state within the filtered subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateMean {
    pub state: String,
    pub mean: f64,
    pub count: usize,
}

/// All records of one state ordered by year, as `(year, derived score)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSeries {
    pub state: String,
    pub points: Vec<(i32, f64)>,
}

/// Box summary of one subject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubjectQuartiles {
    pub subject: Subject,
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    /// `max(Q1 - 1.5 * IQR, min)`
    pub lower: f64,
    /// `min(Q3 + 1.5 * IQR, max)`
    pub upper: f64,
}

/// Headline numbers of the filtered subset. Statistics are `None` when the
/// subset is empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Kpi {
    pub mean: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub count: usize,
}

/// Everything the charts show for one filter state. Replaced wholesale on
/// each recompute.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardView {
    pub kpi: Kpi,
    pub state_means: Vec<StateMean>,
    pub time_series: Vec<StateSeries>,
    pub histogram: Histogram,
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

/// Per-state mean of the derived score over the given records, ordered by
/// state name. States without records are absent.
pub fn state_means(dataset: &ScoreDataset, indices: &[usize]) -> Vec<StateMean> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for &i in indices {
        let rec = &dataset.records[i];
        groups.entry(rec.state.as_str()).or_default().push(rec.average);
    }

    groups
        .into_iter()
        .filter_map(|(state, scores)| {
            let mean = stats::mean(&scores)?;
            Some(StateMean {
                state: state.to_string(),
                mean,
                count: scores.len(),
            })
        })
        .collect()
}

/// One series per selected state, built from the whole table: the year
/// filter and the other row predicates do not apply here.
pub fn state_time_series(dataset: &ScoreDataset, filters: &FilterState) -> Vec<StateSeries> {
    filters
        .states
        .iter()
        .map(|state| {
            let mut rows: Vec<&ScoreRecord> = dataset
                .records
                .iter()
                .filter(|rec| &rec.state == state)
                .collect();
            rows.sort_by_key(|rec| rec.year);
            StateSeries {
                state: state.clone(),
                points: rows.iter().map(|rec| (rec.year, rec.average)).collect(),
            }
        })
        .collect()
}

/// Histogram of the raw scores of `subject` over the given records.
pub fn subject_histogram(
    dataset: &ScoreDataset,
    indices: &[usize],
    subject: Subject,
    bins: usize,
) -> Histogram {
    let values: Vec<f64> = indices
        .iter()
        .map(|&i| dataset.records[i].score(subject))
        .collect();
    Histogram::compute(&values, bins)
}

/// Quartiles and clipped whiskers for every subject. Subjects are skipped
/// when there are no records.
pub fn quartile_summary(records: &[ScoreRecord]) -> Vec<SubjectQuartiles> {
    Subject::ALL
        .iter()
        .filter_map(|&subject| {
            let mut values: Vec<f64> = records.iter().map(|r| r.score(subject)).collect();
            values.sort_by(f64::total_cmp);

            let q1 = stats::quantile_sorted(&values, 0.25)?;
            let q2 = stats::quantile_sorted(&values, 0.50)?;
            let q3 = stats::quantile_sorted(&values, 0.75)?;
            let min = *values.first()?;
            let max = *values.last()?;
            let iqr = q3 - q1;

            Some(SubjectQuartiles {
                subject,
                q1,
                q2,
                q3,
                lower: (q1 - 1.5 * iqr).max(min),
                upper: (q3 + 1.5 * iqr).min(max),
            })
        })
        .collect()
}

pub fn kpi(dataset: &ScoreDataset, indices: &[usize]) -> Kpi {
    let scores: Vec<f64> = indices.iter().map(|&i| dataset.records[i].average).collect();
    Kpi {
        mean: stats::mean(&scores),
        max: stats::max(&scores),
        min: stats::min(&scores),
        count: scores.len(),
    }
}

/// Recompute every reactive view from scratch.
pub fn compute_view(dataset: &ScoreDataset, filters: &FilterState, bins: usize) -> DashboardView {
    let indices = filtered_indices(dataset, filters);
    DashboardView {
        kpi: kpi(dataset, &indices),
        state_means: state_means(dataset, &indices),
        time_series: state_time_series(dataset, filters),
        histogram: subject_histogram(dataset, &indices, filters.subject, bins),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::filter::init_filter_state;

    /// Three years, four states, two genders, scores that vary by all keys.
    fn dataset() -> ScoreDataset {
        let states = ["California", "Texas", "New York", "Ohio"];
        let genders = ["female", "male"];
        let mut records = Vec::new();
        for year in [2021, 2019, 2020] {
            for (si, state) in states.iter().enumerate() {
                for (gi, gender) in genders.iter().enumerate() {
                    let base = 40.0 + (year - 2019) as f64 * 7.0 + si as f64 * 5.0 + gi as f64 * 3.0;
                    records.push(ScoreRecord::new(*state, *gender, year, base, base + 4.0, base + 11.0));
                }
            }
        }
        ScoreDataset::from_records(records)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn state_means_match_group_averages() {
        let ds = dataset();
        let mut f = init_filter_state(&ds);
        f.year = 2020;
        f.genders = BTreeSet::from(["female".to_string()]);
        let idx = filtered_indices(&ds, &f);
        let means = state_means(&ds, &idx);

        let present: BTreeSet<&str> = idx.iter().map(|&i| ds.records[i].state.as_str()).collect();
        assert_eq!(means.len(), present.len());

        for m in &means {
            let scores: Vec<f64> = idx
                .iter()
                .map(|&i| &ds.records[i])
                .filter(|r| r.state == m.state)
                .map(|r| r.average)
                .collect();
            let expected = scores.iter().sum::<f64>() / scores.len() as f64;
            assert!(approx(m.mean, expected), "{}: {} vs {expected}", m.state, m.mean);
            assert_eq!(m.count, scores.len());
        }
    }

    #[test]
    fn state_means_omit_empty_groups() {
        let ds = dataset();
        let mut f = init_filter_state(&ds);
        f.states = BTreeSet::from(["Ohio".to_string()]);
        let means = state_means(&ds, &filtered_indices(&ds, &f));
        assert_eq!(means.len(), 1);
        assert_eq!(means[0].state, "Ohio");
        assert!(state_means(&ds, &[]).is_empty());
    }

    #[test]
    fn time_series_ignores_year_filter() {
        let ds = dataset();
        let mut f = init_filter_state(&ds);
        f.year = 2020;
        f.min_score = 0;
        f.states = ["California", "Texas", "New York"]
            .into_iter()
            .map(String::from)
            .collect();

        let series = state_time_series(&ds, &f);
        assert_eq!(series.len(), 3);
        for s in &series {
            // 3 years × 2 genders, all years present
            assert_eq!(s.points.len(), 6);
            assert!(s.points.windows(2).all(|w| w[0].0 <= w[1].0));
            let years: BTreeSet<i32> = s.points.iter().map(|p| p.0).collect();
            assert_eq!(years, ds.years);
        }
    }

    #[test]
    fn time_series_keeps_states_without_rows() {
        let ds = dataset();
        let mut f = init_filter_state(&ds);
        f.states.insert("Nowhere".to_string());
        let series = state_time_series(&ds, &f);
        assert_eq!(series.len(), 5);
        let empty = series.iter().find(|s| s.state == "Nowhere").unwrap();
        assert!(empty.points.is_empty());
    }

    #[test]
    fn histogram_counts_sum_to_subset_size() {
        let ds = dataset();
        let mut f = init_filter_state(&ds);
        for subject in Subject::ALL {
            f.subject = subject;
            f.min_score = 55;
            let idx = filtered_indices(&ds, &f);
            let h = subject_histogram(&ds, &idx, subject, DEFAULT_BINS);
            assert_eq!(h.total(), idx.len());
        }
    }

    #[test]
    fn quartile_bounds_are_ordered() {
        let ds = dataset();
        assert_eq!(ds.quartiles.len(), 3);
        for q in &ds.quartiles {
            assert!(q.lower <= q.q1, "{q:?}");
            assert!(q.q1 <= q.q2, "{q:?}");
            assert!(q.q2 <= q.q3, "{q:?}");
            assert!(q.q3 <= q.upper, "{q:?}");
        }
    }

    #[test]
    fn whiskers_clip_to_observed_range() {
        let records: Vec<ScoreRecord> = [10.0, 50.0, 51.0, 52.0, 53.0, 54.0, 100.0]
            .iter()
            .map(|&v| ScoreRecord::new("Ohio", "male", 2020, v, v, v))
            .collect();
        let q = quartile_summary(&records)[0];
        assert_eq!(q.subject, Subject::Math);
        assert!(approx(q.q1, 50.5));
        assert!(approx(q.q2, 52.0));
        assert!(approx(q.q3, 53.5));
        // IQR 3 → fences 46 / 58, both inside [10, 100]
        assert!(approx(q.lower, 46.0));
        assert!(approx(q.upper, 58.0));

        let narrow: Vec<ScoreRecord> = [60.0, 61.0, 62.0]
            .iter()
            .map(|&v| ScoreRecord::new("Ohio", "male", 2020, v, v, v))
            .collect();
        let q = quartile_summary(&narrow)[0];
        assert!(approx(q.lower, 60.0));
        assert!(approx(q.upper, 62.0));
    }

    #[test]
    fn quartiles_ignore_filters() {
        let ds = dataset();
        let before = ds.quartiles.clone();
        let mut f = init_filter_state(&ds);
        f.min_score = 90;
        let _ = compute_view(&ds, &f, DEFAULT_BINS);
        assert_eq!(ds.quartiles, before);
        assert_eq!(quartile_summary(&ds.records), before);
    }

    #[test]
    fn kpi_count_matches_predicates() {
        let ds = dataset();
        let mut f = init_filter_state(&ds);
        f.year = 2021;
        f.min_score = 60;
        f.genders = BTreeSet::from(["male".to_string()]);
        let expected = ds
            .records
            .iter()
            .filter(|r| r.year == 2021 && r.gender == "male" && r.average >= 60.0)
            .count();
        let view = compute_view(&ds, &f, DEFAULT_BINS);
        assert_eq!(view.kpi.count, expected);
        assert!(view.kpi.min.unwrap() >= 60.0);
        assert!(view.kpi.min <= view.kpi.mean && view.kpi.mean <= view.kpi.max);
    }

    #[test]
    fn empty_subset_degrades_to_placeholders() {
        let ds = dataset();
        let mut f = init_filter_state(&ds);
        f.min_score = 100;
        let view = compute_view(&ds, &f, DEFAULT_BINS);
        assert_eq!(view.kpi, Kpi::default());
        assert!(view.state_means.is_empty());
        assert!(view.histogram.is_empty());
        // time series still shows every selected state
        assert_eq!(view.time_series.len(), ds.states.len());
    }

    #[test]
    fn compute_view_is_idempotent() {
        let ds = dataset();
        let f = init_filter_state(&ds);
        assert_eq!(compute_view(&ds, &f, DEFAULT_BINS), compute_view(&ds, &f, DEFAULT_BINS));
    }
}
