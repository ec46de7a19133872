use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use cogtrial_core::{Block, Response, SessionContext, TrialDefinition};
use cogtrial_experiment::{ExperimentConfig, ExperimentStateMachine, TrialCatalog};
use cogtrial_stats::TaskSummary;
use cogtrial_timing::{HighPrecisionTimer, ManualTimer, Timer};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;
use tracing::{debug, info};

use crate::catalog::catalog;
use crate::cli::Cli;
use crate::hooks::SessionHooks;
use crate::participant::{Plan, SimulatedParticipant};
use crate::presets::preset;

type Machine<T> = ExperimentStateMachine<TrialDefinition, T, SessionHooks, StdRng>;

/// What a finished run leaves behind.
#[derive(Debug)]
pub struct RunReport {
    pub exported: Option<PathBuf>,
    pub summaries: Vec<(Block, TaskSummary)>,
}

pub struct App {
    cli: Cli,
    config: ExperimentConfig,
    catalog: TrialCatalog<TrialDefinition>,
    participant: SimulatedParticipant,
    session: SessionContext,
    out: PathBuf,
    seed: u64,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self> {
        let config = load_config(&cli)?;
        let seed = cli.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let catalog = catalog(
            cli.task,
            config.practice_trials,
            config.experiment_trials,
            &mut rng,
        );

        let session_id = cli
            .session
            .clone()
            .unwrap_or_else(|| format!("{}-{seed}", cli.task));
        let mut session = SessionContext::new(session_id.clone());
        if let Some(participant) = &cli.participant {
            session = session.with_participant(participant.clone());
        }
        let out = cli
            .out
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{session_id}.json")));
        let participant = SimulatedParticipant::new(
            cli.participant_accuracy,
            cli.participant_rt_ms as f64,
            cli.participant_miss_rate,
        );

        info!(
            task = %cli.task,
            seed,
            practice = config.practice_trials,
            trials = config.experiment_trials,
            session = %session_id,
            "session prepared"
        );
        Ok(Self {
            cli,
            config,
            catalog,
            participant,
            session,
            out,
            seed,
        })
    }

    pub fn run(self) -> Result<RunReport> {
        if self.cli.realtime {
            self.run_with(HighPrecisionTimer::new())
        } else {
            self.run_with(ManualTimer::new())
        }
    }

    fn run_with<T: Timer<Timestamp = u64>>(self, timer: T) -> Result<RunReport> {
        let hooks = SessionHooks::new(self.cli.task, self.session.clone(), self.out);
        let mut machine: Machine<T> = ExperimentStateMachine::new(
            self.config,
            self.catalog,
            timer.clone(),
            StdRng::seed_from_u64(self.seed),
            hooks,
            self.session,
        )?;
        let mut participant_rng = StdRng::seed_from_u64(self.seed.wrapping_add(1));

        if machine.config.practice_trials > 0 && machine.start_practice() {
            drive_block(&mut machine, &timer, &self.participant, &mut participant_rng)?;
        }
        if !machine.start_main_task() {
            bail!("main task could not start from {}", machine.block_phase());
        }
        drive_block(&mut machine, &timer, &self.participant, &mut participant_rng)?;

        let drift = machine.drift_stats();
        info!(
            samples = drift.samples,
            mean_lateness_us = drift.mean_lateness_ns / 1_000.0,
            max_lateness_us = drift.max_lateness_ns / 1_000.0,
            jitter_us = drift.jitter_ns / 1_000.0,
            "timer drift"
        );

        let hooks = machine.into_hooks();
        Ok(RunReport {
            exported: hooks.exported,
            summaries: hooks.summaries,
        })
    }
}

/// Keypress the participant has scheduled for the trial at `index`.
struct Planned {
    index: usize,
    press: Option<(Response, u64)>,
}

/// Runs the active block to completion, sleeping until whichever comes
/// first: the engine's next timer or the participant's next keypress.
fn drive_block<T: Timer<Timestamp = u64>>(
    machine: &mut Machine<T>,
    timer: &T,
    participant: &SimulatedParticipant,
    rng: &mut StdRng,
) -> Result<()> {
    let mut planned: Option<Planned> = None;
    while machine.block_phase().runs_trials() {
        let index = machine.current_trial_index();
        if machine.awaiting_response() && planned.as_ref().is_none_or(|p| p.index != index) {
            let onset = machine.response_onset_ns().unwrap_or_else(|| timer.now());
            let press = match machine.current_trial() {
                Some(trial) => match participant.plan(trial, rng) {
                    Plan::Press { response, rt_ms } => {
                        Some((response, onset + (rt_ms * 1_000_000.0) as u64))
                    }
                    Plan::Withhold => None,
                },
                None => None,
            };
            planned = Some(Planned { index, press });
        }

        let keypress_at = planned
            .as_ref()
            .filter(|p| p.index == index && machine.awaiting_response())
            .and_then(|p| p.press.as_ref().map(|(_, at)| *at));
        let wake = match (machine.next_deadline(), keypress_at) {
            (Some(deadline), Some(at)) => deadline.min(at),
            (deadline, at) => match deadline.or(at) {
                Some(wake) => wake,
                None => bail!("engine stalled in {}", machine.block_phase()),
            },
        };
        timer.sleep_until(wake);

        if keypress_at.is_some_and(|at| timer.now() >= at) {
            if let Some((response, _)) = planned.as_mut().and_then(|p| p.press.take()) {
                let resolution = machine.handle_response(response, timer.now());
                debug!(?resolution, "simulated keypress");
            }
        }
        machine.poll();
    }
    Ok(())
}

/// Task preset, overlaid with the fields of `--config` and the trial
/// count flags.
fn load_config(cli: &Cli) -> Result<ExperimentConfig> {
    let mut config = preset(cli.task);
    if let Some(path) = &cli.config {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let overrides: Value = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        let Value::Object(overrides) = overrides else {
            bail!("config {} must be a JSON object", path.display());
        };
        let mut merged = serde_json::to_value(&config)?;
        if let Value::Object(base) = &mut merged {
            base.extend(overrides);
        }
        config = serde_json::from_value(merged)
            .with_context(|| format!("invalid config {}", path.display()))?;
    }
    if let Some(practice) = cli.practice {
        config.practice_trials = practice;
    }
    if let Some(trials) = cli.trials {
        config.experiment_trials = trials;
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use cogtrial_core::TaskKind;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cogtrial").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn simulated_session_exports_every_trial() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("run.json");
        let out_arg = out.to_str().unwrap();
        let app = App::new(cli(&[
            "--task", "flanker", "--practice", "3", "--trials", "12", "--seed", "7", "--out",
            out_arg, "--participant", "p01",
        ]))
        .unwrap();
        let report = app.run().unwrap();

        assert_eq!(report.exported.as_deref(), Some(out.as_path()));
        let blocks: Vec<_> = report.summaries.iter().map(|(block, _)| *block).collect();
        assert_eq!(blocks, [Block::Practice, Block::Task]);

        let json: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        let results = json["results"].as_array().unwrap();
        assert_eq!(results.len(), 12);
        assert_eq!(json["practice"].as_array().unwrap().len(), 3);
        assert_eq!(json["session"]["participant_id"], "p01");
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result["trial_number"], i + 1);
            assert_eq!(result["participant_id"], "p01");
            let rt = result["reaction_time_ms"].as_f64().unwrap();
            assert!(rt > 0.0 && rt <= 2000.0);
        }
    }

    #[test]
    fn every_task_runs_headless() {
        let dir = tempfile::tempdir().unwrap();
        for kind in TaskKind::ALL {
            let out = dir.path().join(format!("{kind}.json"));
            let app = App::new(cli(&[
                "--task",
                kind.as_str(),
                "--practice",
                "0",
                "--trials",
                "15",
                "--seed",
                "11",
                "--out",
                out.to_str().unwrap(),
            ]))
            .unwrap();
            let report = app.run().unwrap();
            assert_eq!(report.summaries.len(), 1, "{kind}");
            assert!(out.exists(), "{kind}");
        }
    }

    #[test]
    fn config_file_overrides_the_preset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"response_timeout_ms": 900, "experiment_trials": 5}"#).unwrap();
        let config = load_config(&cli(&["--config", path.to_str().unwrap(), "--practice", "2"]))
            .unwrap();
        assert_eq!(config.response_timeout_ms, 900);
        assert_eq!(config.experiment_trials, 5);
        assert_eq!(config.practice_trials, 2);
        assert_eq!(config.phases, preset(TaskKind::Flanker).phases);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"phases": []}"#).unwrap();
        assert!(load_config(&cli(&["--config", path.to_str().unwrap()])).is_err());
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(load_config(&cli(&["--config", path.to_str().unwrap()])).is_err());
    }
}
