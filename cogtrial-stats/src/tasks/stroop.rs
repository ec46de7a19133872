//! Stroop statistics.
//!
//! Accuracy counts a timeout as an attempted, incorrect trial.

use cogtrial_core::{TrialDefinition, TrialResult};
use serde::{Deserialize, Serialize};

use super::{narrow, results_of};
use crate::contrast::CongruencyStats;
use crate::summary::{BlockSummary, TimeoutPolicy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StroopStats {
    pub summary: BlockSummary,
    #[serde(flatten)]
    pub congruency: CongruencyStats,
}

impl StroopStats {
    pub fn from_results(results: &[TrialResult<TrialDefinition>]) -> Self {
        let trials = narrow(results, TrialDefinition::as_stroop);
        Self {
            summary: BlockSummary::from_results(results_of(&trials), TimeoutPolicy::CountAsAttempt),
            congruency: CongruencyStats::from_labelled(
                trials.iter().map(|(result, trial)| (*result, trial.stimulus_type)),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::testing::result;
    use cogtrial_core::{Congruency, InkColor, StroopTrial};

    #[test]
    fn interference_from_incongruent_words() {
        let congruent = StroopTrial {
            word: Some(InkColor::Red),
            ink: InkColor::Red,
            stimulus_type: Congruency::Congruent,
        };
        let incongruent = StroopTrial {
            word: Some(InkColor::Blue),
            ink: InkColor::Red,
            stimulus_type: Congruency::Incongruent,
        };
        let neutral = StroopTrial {
            word: None,
            ink: InkColor::Green,
            stimulus_type: Congruency::Neutral,
        };
        let results = vec![
            result(congruent.clone(), "red", 300.0),
            result(congruent, "red", 320.0),
            result(incongruent.clone(), "red", 380.0),
            result(incongruent.clone(), "red", 400.0),
            result(incongruent, "blue", 450.0),
            result(neutral, "green", 330.0),
        ];
        let stats = StroopStats::from_results(&results);
        assert_eq!(stats.congruency.congruency_effect_ms, Some(80.0));
        assert_eq!(stats.congruency.neutral_mean_rt_ms, Some(330.0));
        assert_eq!(stats.summary.correct, 5);
        assert_eq!(stats.summary.total, 6);
    }

    #[test]
    fn other_tasks_are_ignored() {
        let flanker = cogtrial_core::FlankerTrial {
            target: cogtrial_core::Direction::Left,
            stimulus_type: Congruency::Congruent,
        };
        let stats = StroopStats::from_results(&[result(flanker, "left", 300.0)]);
        assert_eq!(stats.summary.total, 0);
        assert_eq!(stats.congruency.congruency_effect_ms, None);
    }
}
