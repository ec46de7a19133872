//! N-back statistics.
//!
//! Scored by signal detection: a timeout is "no response", so it is a miss
//! on a target and a correct rejection otherwise. Accuracy is
//! (hits + correct rejections) / total.

use cogtrial_core::{TrialDefinition, TrialResult};
use serde::{Deserialize, Serialize};

use super::narrow;
use crate::sdt::{SdtCounts, SignalCategory, classify};
use crate::summary::mean;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NBackStats {
    pub total_trials: usize,
    #[serde(flatten)]
    pub counts: SdtCounts,
    pub accuracy_percent: f64,
    pub hit_rate: f64,
    pub false_alarm_rate: f64,
    pub d_prime: f64,
    pub criterion: f64,
    pub mean_hit_rt_ms: Option<f64>,
    pub lure_trials: usize,
    pub lure_false_alarms: usize,
}

impl NBackStats {
    pub fn from_results(results: &[TrialResult<TrialDefinition>]) -> Self {
        let trials = narrow(results, TrialDefinition::as_n_back);
        let categories: Vec<_> = trials
            .iter()
            .map(|(result, trial)| classify(trial.is_target, result.responded()))
            .collect();
        let counts: SdtCounts = categories.iter().copied().collect();

        let hit_rts: Vec<f64> = trials
            .iter()
            .zip(&categories)
            .filter(|(_, category)| **category == SignalCategory::Hit)
            .map(|((result, _), _)| result.reaction_time_ms)
            .collect();
        let lures: Vec<_> = trials.iter().filter(|(_, trial)| trial.is_lure).collect();

        Self {
            total_trials: trials.len(),
            counts,
            accuracy_percent: counts.accuracy() * 100.0,
            hit_rate: counts.hit_rate(),
            false_alarm_rate: counts.false_alarm_rate(),
            d_prime: counts.d_prime(),
            criterion: counts.criterion(),
            mean_hit_rt_ms: mean(&hit_rts),
            lure_trials: lures.len(),
            lure_false_alarms: lures.iter().filter(|(result, _)| result.responded()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::testing::result;
    use cogtrial_core::NBackTrial;

    fn trial(is_target: bool, is_lure: bool) -> NBackTrial {
        NBackTrial {
            letter: 'B',
            n: 2,
            is_target,
            is_lure,
        }
    }

    #[test]
    fn fixed_table_classifies_every_outcome() {
        let results = vec![
            result(trial(true, false), "match", 450.0),
            result(trial(true, false), "timeout", 2000.0),
            result(trial(false, true), "match", 500.0),
            result(trial(false, false), "timeout", 2000.0),
        ];
        let stats = NBackStats::from_results(&results);
        assert_eq!(
            stats.counts,
            SdtCounts {
                hits: 1,
                misses: 1,
                false_alarms: 1,
                correct_rejections: 1,
            }
        );
        assert_eq!(stats.accuracy_percent, 50.0);
        assert_eq!(stats.mean_hit_rt_ms, Some(450.0));
        assert_eq!(stats.lure_trials, 1);
        assert_eq!(stats.lure_false_alarms, 1);
    }

    #[test]
    fn accuracy_agrees_with_per_trial_judgement() {
        let results = vec![
            result(trial(true, false), "match", 400.0),
            result(trial(false, false), "timeout", 2000.0),
            result(trial(false, false), "timeout", 2000.0),
            result(trial(true, false), "timeout", 2000.0),
        ];
        let stats = NBackStats::from_results(&results);
        let judged_correct = results.iter().filter(|r| r.is_correct == Some(true)).count();
        assert_eq!(judged_correct, 3);
        assert_eq!(stats.accuracy_percent, 75.0);
        assert!(stats.d_prime > 0.0);
    }
}
