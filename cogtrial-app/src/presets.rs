//! Phase timelines and timeouts for each task.

use cogtrial_core::{PhaseSpec, TaskKind};
use cogtrial_experiment::{ExperimentConfig, InterTrialDelay};

/// Name of the Posner phase whose length the trial's SOA decides.
pub const CUE_TARGET_INTERVAL: &str = "cue_target_interval";
/// Cue display time in the Posner timeline.
pub const POSNER_CUE_MS: u64 = 100;

pub fn preset(kind: TaskKind) -> ExperimentConfig {
    let base = ExperimentConfig::default();
    match kind {
        TaskKind::Flanker | TaskKind::Stroop => ExperimentConfig {
            phases: vec![
                PhaseSpec::timed("fixation", 500).with_jitter(500),
                PhaseSpec::response_window("stimulus"),
            ],
            response_timeout_ms: 2000,
            ..base
        },
        TaskKind::NBack => ExperimentConfig {
            practice_trials: 10,
            experiment_trials: 60,
            phases: vec![
                PhaseSpec::timed("stimulus", 500)
                    .showing_stimulus()
                    .accepting_responses(),
                PhaseSpec::response_window("response").hiding_stimulus(),
            ],
            response_timeout_ms: 2000,
            inter_trial: InterTrialDelay::Fixed(500),
            ..base
        },
        TaskKind::VisualSearch => ExperimentConfig {
            phases: vec![
                PhaseSpec::timed("fixation", 500),
                PhaseSpec::response_window("search"),
            ],
            response_timeout_ms: 5000,
            ..base
        },
        TaskKind::Posner => ExperimentConfig {
            practice_trials: 10,
            experiment_trials: 80,
            phases: vec![
                PhaseSpec::timed("fixation", 1000).with_jitter(500),
                PhaseSpec::timed("cue", POSNER_CUE_MS).showing_stimulus(),
                PhaseSpec::timed(CUE_TARGET_INTERVAL, 200),
                PhaseSpec::response_window("target"),
            ],
            response_timeout_ms: 1500,
            inter_trial: InterTrialDelay::PerBlock {
                practice_ms: 1500,
                task_ms: 1000,
            },
            ..base
        },
        TaskKind::MentalRotation => ExperimentConfig {
            practice_trials: 8,
            experiment_trials: 40,
            phases: vec![
                PhaseSpec::timed("fixation", 500),
                PhaseSpec::response_window("figures"),
            ],
            response_timeout_ms: 7500,
            ..base
        },
        TaskKind::ChangeDetection => ExperimentConfig {
            practice_trials: 10,
            experiment_trials: 60,
            phases: vec![
                PhaseSpec::timed("fixation", 500),
                PhaseSpec::timed("memory", 100).showing_stimulus(),
                PhaseSpec::timed("retention", 900),
                PhaseSpec::response_window("test"),
            ],
            response_timeout_ms: 3000,
            ..base
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_is_valid() {
        for kind in TaskKind::ALL {
            preset(kind).validate().unwrap();
        }
    }

    #[test]
    fn posner_has_an_interval_for_the_soa() {
        let config = preset(TaskKind::Posner);
        assert!(config.phases.iter().any(|p| p.name == CUE_TARGET_INTERVAL));
        assert!(config.phases.last().is_some_and(|p| p.accepts_responses));
    }

    #[test]
    fn change_detection_hides_the_array_during_retention() {
        let config = preset(TaskKind::ChangeDetection);
        let names: Vec<_> = config.phases.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["fixation", "memory", "retention", "test"]);
        assert!(!config.phases[2].show_stimulus);
    }
}
