use std::path::Path;

use cogtrial_core::{Block, PhaseSpec};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Pause between a trial's resolution and the next trial's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InterTrialDelay {
    Fixed(u64),
    PerBlock { practice_ms: u64, task_ms: u64 },
}

impl InterTrialDelay {
    pub fn for_block(&self, block: Block) -> u64 {
        match (self, block) {
            (InterTrialDelay::Fixed(ms), _) => *ms,
            (InterTrialDelay::PerBlock { practice_ms, .. }, Block::Practice) => *practice_ms,
            (InterTrialDelay::PerBlock { task_ms, .. }, Block::Task) => *task_ms,
        }
    }
}

/// Where reaction times are measured from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnsetMode {
    /// Start of the first response-accepting phase.
    #[default]
    PhaseStart,
    /// Onset reported by the task through `mark_onset`.
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub practice_trials: usize,
    pub experiment_trials: usize,
    pub phases: Vec<PhaseSpec>,
    pub response_timeout_ms: u64,
    pub inter_trial: InterTrialDelay,
    /// Delay between a block start and its first trial.
    pub settle_ms: u64,
    pub onset: OnsetMode,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            practice_trials: 20,
            experiment_trials: 100,
            phases: vec![
                PhaseSpec::timed("fixation", 500).with_jitter(1000),
                PhaseSpec::timed("stimulus", 200)
                    .showing_stimulus()
                    .accepting_responses(),
                PhaseSpec::response_window("response").hiding_stimulus(),
            ],
            response_timeout_ms: 2000,
            inter_trial: InterTrialDelay::Fixed(1000),
            settle_ms: 100,
            onset: OnsetMode::PhaseStart,
        }
    }
}

impl ExperimentConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.phases.is_empty() {
            return Err(ConfigError::NoPhases);
        }
        if !self.phases.iter().any(|p| p.accepts_responses) {
            return Err(ConfigError::NoResponsePhase);
        }
        if let Some(stalled) = self
            .phases
            .iter()
            .find(|p| p.awaits_resolution() && !p.accepts_responses)
        {
            return Err(ConfigError::StalledPhase {
                name: stalled.name.clone(),
            });
        }
        // Only the last phase arms the response timeout.
        if let Some(window) = self.phases[..self.phases.len() - 1]
            .iter()
            .find(|p| p.awaits_resolution())
        {
            return Err(ConfigError::UntimedWindowNotLast {
                name: window.name.clone(),
            });
        }
        if self.response_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Configured number of trials for a block. The catalog may hold fewer.
    pub fn trial_count(&self, block: Block) -> usize {
        match block {
            Block::Practice => self.practice_trials,
            Block::Task => self.experiment_trials,
        }
    }

    pub fn with_phases(mut self, phases: Vec<PhaseSpec>) -> Self {
        self.phases = phases;
        self
    }

    pub fn with_trial_counts(mut self, practice: usize, experiment: usize) -> Self {
        self.practice_trials = practice;
        self.experiment_trials = experiment;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ExperimentConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = ExperimentConfig::from_json_str(
            r#"{"experiment_trials": 12, "inter_trial": {"practice_ms": 1500, "task_ms": 800}}"#,
        )
        .unwrap();
        assert_eq!(config.experiment_trials, 12);
        assert_eq!(config.practice_trials, 20);
        assert_eq!(config.inter_trial.for_block(Block::Practice), 1500);
        assert_eq!(config.inter_trial.for_block(Block::Task), 800);
        assert_eq!(config.onset, OnsetMode::PhaseStart);
    }

    #[test]
    fn fixed_inter_trial_delay_reads_as_a_number() {
        let config = ExperimentConfig::from_json_str(r#"{"inter_trial": 250}"#).unwrap();
        assert_eq!(config.inter_trial, InterTrialDelay::Fixed(250));
    }

    #[test]
    fn rejects_phase_lists_that_cannot_resolve() {
        let silent = ExperimentConfig::default().with_phases(vec![PhaseSpec::timed("blank", 100)]);
        assert!(matches!(silent.validate(), Err(ConfigError::NoResponsePhase)));

        let mut stalled_phase = PhaseSpec::timed("retention", 100);
        stalled_phase.duration_ms = None;
        let stalled = ExperimentConfig::default().with_phases(vec![
            stalled_phase,
            PhaseSpec::response_window("test"),
        ]);
        assert!(matches!(
            stalled.validate(),
            Err(ConfigError::StalledPhase { name }) if name == "retention"
        ));

        let early_window = ExperimentConfig::default().with_phases(vec![
            PhaseSpec::timed("fixation", 500),
            PhaseSpec::response_window("response"),
            PhaseSpec::timed("feedback", 300),
        ]);
        assert!(matches!(
            early_window.validate(),
            Err(ConfigError::UntimedWindowNotLast { name }) if name == "response"
        ));

        let empty = ExperimentConfig::default().with_phases(Vec::new());
        assert!(matches!(empty.validate(), Err(ConfigError::NoPhases)));
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = ExperimentConfig {
            response_timeout_ms: 0,
            ..ExperimentConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"practice_trials": 3, "onset": "manual"}"#).unwrap();
        let config = ExperimentConfig::from_path(&path).unwrap();
        assert_eq!(config.practice_trials, 3);
        assert_eq!(config.onset, OnsetMode::Manual);

        let missing = ExperimentConfig::from_path(dir.path().join("absent.json"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
