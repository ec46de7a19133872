use std::path::PathBuf;

use clap::{ArgAction, Parser};
use cogtrial_core::TaskKind;

use crate::logging::LogFormat;

/// Runs a cognitive task session against a simulated participant and
/// exports the trial results.
#[derive(Parser, Debug, Clone)]
#[command(name = "cogtrial", version, about)]
pub struct Cli {
    /// Task to run: flanker, stroop, n-back, visual-search, posner,
    /// mental-rotation or change-detection.
    #[arg(short, long, default_value = "flanker", env = "COGTRIAL_TASK")]
    pub task: TaskKind,

    /// JSON experiment configuration. Missing fields keep the task preset.
    #[arg(short, long, env = "COGTRIAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of practice trials (0 skips the practice block).
    #[arg(long)]
    pub practice: Option<usize>,

    /// Number of main-task trials.
    #[arg(long)]
    pub trials: Option<usize>,

    /// Seed for trial generation, jitter and the simulated participant.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Run on the wall clock instead of a virtual one.
    #[arg(long)]
    pub realtime: bool,

    /// Probability the simulated participant answers correctly.
    #[arg(long, default_value_t = 0.9, value_parser = parse_probability)]
    pub participant_accuracy: f64,

    /// Mean reaction time of the simulated participant.
    #[arg(long, default_value_t = 450)]
    pub participant_rt_ms: u64,

    /// Probability the simulated participant lets a choice trial time out.
    #[arg(long, default_value_t = 0.02, value_parser = parse_probability)]
    pub participant_miss_rate: f64,

    /// Where to write the JSON export. Defaults to `<session>.json`.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Session identifier stamped on every result.
    #[arg(long, env = "COGTRIAL_SESSION")]
    pub session: Option<String>,

    /// Participant identifier stamped on every result.
    #[arg(long)]
    pub participant: Option<String>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(long, value_enum, default_value_t = LogFormat::Human)]
    pub log_format: LogFormat,
}

fn parse_probability(value: &str) -> Result<f64, String> {
    let p: f64 = value.parse().map_err(|_| format!("`{value}` is not a number"))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("`{value}` is not between 0 and 1"))
    }
}
