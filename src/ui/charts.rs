use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, Points,
};

use crate::state::AppState;

const BAR_COLOR: Color32 = Color32::from_rgb(70, 130, 180);
const HIST_COLOR: Color32 = Color32::from_rgb(255, 140, 60);
const BOX_COLOR: Color32 = Color32::from_rgb(110, 190, 120);

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn chart_title(ui: &mut Ui, title: &str, empty: bool) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong(title);
        if empty {
            ui.label(RichText::new("no data for the current filters").weak().italics());
        }
    });
}

/// Axis formatter that prints `labels[i]` at integer positions and nothing
/// elsewhere.
fn category_formatter(
    labels: Vec<String>,
) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String + 'static {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let v = mark.value;
        if v < 0.0 || v.fract().abs() > 1e-6 {
            return String::new();
        }
        labels.get(v as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Per-state mean (bar)
// ---------------------------------------------------------------------------

pub fn state_mean_chart(ui: &mut Ui, state: &AppState, height: f32) {
    let means = &state.view.state_means;
    chart_title(ui, "Average score by state", means.is_empty());

    let bars: Vec<Bar> = means
        .iter()
        .enumerate()
        .map(|(i, m)| {
            Bar::new(i as f64, m.mean)
                .width(0.7)
                .name(format!("{} (n={})", m.state, m.count))
        })
        .collect();
    let labels: Vec<String> = means.iter().map(|m| m.state.clone()).collect();

    Plot::new("state_mean_chart")
        .height(height)
        .y_axis_label("Average score")
        .x_axis_formatter(category_formatter(labels))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name("Average"));
        });
}

// ---------------------------------------------------------------------------
// Per-state time series (multi-line)
// ---------------------------------------------------------------------------

pub fn time_series_chart(ui: &mut Ui, state: &AppState, height: f32) {
    let series = &state.view.time_series;
    chart_title(
        ui,
        "Score over the years (all years)",
        series.iter().all(|s| s.points.is_empty()),
    );

    Plot::new("time_series_chart")
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Average score")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            if mark.value.fract().abs() < 1e-6 {
                format!("{}", mark.value as i64)
            } else {
                String::new()
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for s in series {
                let color = state.color_map.color_for(&s.state);
                let coords: Vec<[f64; 2]> = s
                    .points
                    .iter()
                    .map(|&(year, score)| [f64::from(year), score])
                    .collect();

                plot_ui.line(
                    Line::new(PlotPoints::from(coords.clone()))
                        .name(&s.state)
                        .color(color)
                        .width(1.5),
                );
                plot_ui.points(Points::new(PlotPoints::from(coords)).color(color).radius(2.5));
            }
        });
}

// ---------------------------------------------------------------------------
// Subject histogram
// ---------------------------------------------------------------------------

pub fn histogram_chart(ui: &mut Ui, state: &AppState, height: f32) {
    let hist = &state.view.histogram;
    let subject = state.filters.subject;
    chart_title(ui, &format!("{subject} score distribution"), hist.is_empty());

    let bars: Vec<Bar> = hist
        .bins()
        .map(|(left, right, count)| {
            Bar::new((left + right) / 2.0, count as f64)
                .width(right - left)
                .name(format!("{left:.1}..{right:.1}"))
        })
        .collect();

    Plot::new("histogram_chart")
        .height(height)
        .x_axis_label(format!("{subject} score"))
        .y_axis_label("Students")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(HIST_COLOR).name(subject.label()));
        });
}

// ---------------------------------------------------------------------------
// Quartile box summary (static, whole dataset)
// ---------------------------------------------------------------------------

pub fn box_chart(ui: &mut Ui, state: &AppState, height: f32) {
    let quartiles = state.quartiles();
    chart_title(ui, "Score spread by subject (all records)", quartiles.is_empty());

    let boxes: Vec<BoxElem> = quartiles
        .iter()
        .enumerate()
        .map(|(i, q)| {
            BoxElem::new(i as f64, BoxSpread::new(q.lower, q.q1, q.q2, q.q3, q.upper))
                .name(q.subject.label())
                .box_width(0.5)
                .whisker_width(0.3)
        })
        .collect();
    let labels: Vec<String> = quartiles.iter().map(|q| q.subject.label().to_string()).collect();

    Plot::new("box_chart")
        .height(height)
        .y_axis_label("Score")
        .x_axis_formatter(category_formatter(labels))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(boxes).color(BOX_COLOR).name("Quartiles"));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_only_on_integers() {
        let fmt = category_formatter(vec!["Ohio".into(), "Utah".into()]);
        let range = 0.0..=1.0;
        let mark = |value| GridMark { value, step_size: 0.5 };
        assert_eq!(fmt(mark(0.0), &range), "Ohio");
        assert_eq!(fmt(mark(1.0), &range), "Utah");
        assert_eq!(fmt(mark(0.5), &range), "");
        assert_eq!(fmt(mark(2.0), &range), "");
        assert_eq!(fmt(mark(-1.0), &range), "");
    }
}
