mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use app::ScorePandaApp;
use clap::Parser;
use eframe::egui;

use crate::data::aggregate::DEFAULT_BINS;
use crate::state::AppState;

/// Interactive dashboard over a table of student test scores.
#[derive(Debug, Parser)]
#[command(name = "score-panda", version, about)]
struct Args {
    /// CSV or Parquet file with state, gender, year and the three score columns.
    #[arg(default_value = "student_scores.csv")]
    data: PathBuf,

    /// Number of histogram bins.
    #[arg(long, default_value_t = DEFAULT_BINS as u16, value_parser = clap::value_parser!(u16).range(1..))]
    bins: u16,

    /// Initial window width.
    #[arg(long, default_value_t = 1400.0)]
    width: f32,

    /// Initial window height.
    #[arg(long, default_value_t = 900.0)]
    height: f32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let dataset = data::loader::load_file(&args.data)
        .with_context(|| format!("loading {}", args.data.display()))
        .inspect_err(|e| log::error!("{e:#}"))?;

    let mut state = AppState::new(usize::from(args.bins));
    state.set_dataset(dataset, Some(args.data.clone()));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Student Score Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(ScorePandaApp::new(state)))),
    )
    .map_err(|e| anyhow!("running UI: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["score-panda"]).unwrap();
        assert_eq!(args.data, PathBuf::from("student_scores.csv"));
        assert_eq!(usize::from(args.bins), DEFAULT_BINS);
    }

    #[test]
    fn zero_bins_rejected() {
        assert!(Args::try_parse_from(["score-panda", "--bins", "0"]).is_err());
        let args = Args::try_parse_from(["score-panda", "scores.parquet", "--bins", "20"]).unwrap();
        assert_eq!(args.bins, 20);
        assert_eq!(args.data, PathBuf::from("scores.parquet"));
    }
}
