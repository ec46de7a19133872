//! Posner cueing statistics.
//!
//! Accuracy includes timeouts. A timeout on a catch trial (no target) is the
//! correct response; on a target trial it is a miss. Cue-validity RTs use
//! target trials answered with an actual keypress only.

use cogtrial_core::{CueValidity, TrialDefinition, TrialResult};
use serde::{Deserialize, Serialize};

use super::{narrow, results_of};
use crate::contrast::rt_contrast;
use crate::summary::{BlockSummary, TimeoutPolicy, mean_correct_rt};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosnerStats {
    pub summary: BlockSummary,
    pub valid_mean_rt_ms: Option<f64>,
    pub invalid_mean_rt_ms: Option<f64>,
    pub neutral_mean_rt_ms: Option<f64>,
    /// Invalid minus valid.
    pub cue_validity_effect_ms: Option<f64>,
    pub target_trials: usize,
    pub target_misses: usize,
    pub catch_trials: usize,
    pub catch_false_alarms: usize,
}

impl PosnerStats {
    pub fn from_results(results: &[TrialResult<TrialDefinition>]) -> Self {
        let trials = narrow(results, TrialDefinition::as_posner);
        let (targets, catches): (Vec<_>, Vec<_>) = trials
            .iter()
            .copied()
            .partition(|(_, trial)| trial.target_present());
        let validity = |wanted: CueValidity| {
            move |result: &TrialResult<TrialDefinition>| {
                result
                    .trial
                    .as_posner()
                    .is_some_and(|trial| trial.cue_validity == wanted)
            }
        };
        let condition_rt = |wanted: CueValidity| {
            mean_correct_rt(results_of(&targets).filter(|result| validity(wanted)(*result)))
        };

        Self {
            summary: BlockSummary::from_results(results_of(&trials), TimeoutPolicy::CountAsAttempt),
            valid_mean_rt_ms: condition_rt(CueValidity::Valid),
            invalid_mean_rt_ms: condition_rt(CueValidity::Invalid),
            neutral_mean_rt_ms: condition_rt(CueValidity::Neutral),
            cue_validity_effect_ms: rt_contrast(
                results_of(&targets),
                validity(CueValidity::Valid),
                validity(CueValidity::Invalid),
            ),
            target_trials: targets.len(),
            target_misses: targets.iter().filter(|(result, _)| result.is_timeout()).count(),
            catch_trials: catches.len(),
            catch_false_alarms: catches.iter().filter(|(result, _)| result.responded()).count(),
        }
    }
}
