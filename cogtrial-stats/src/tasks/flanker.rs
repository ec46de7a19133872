//! Flanker statistics.
//!
//! Accuracy counts a timeout as an attempted, incorrect trial.

use cogtrial_core::{TrialDefinition, TrialResult};
use serde::{Deserialize, Serialize};

use super::{narrow, results_of};
use crate::contrast::CongruencyStats;
use crate::summary::{BlockSummary, TimeoutPolicy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlankerStats {
    pub summary: BlockSummary,
    #[serde(flatten)]
    pub congruency: CongruencyStats,
}

impl FlankerStats {
    pub fn from_results(results: &[TrialResult<TrialDefinition>]) -> Self {
        let trials = narrow(results, TrialDefinition::as_flanker);
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
    use cogtrial_core::{Congruency, Direction, FlankerTrial};

    fn trial(stimulus_type: Congruency) -> FlankerTrial {
        FlankerTrial {
            target: Direction::Left,
            stimulus_type,
        }
    }

    #[test]
    fn congruency_effect_and_attempted_timeouts() {
        let results = vec![
            result(trial(Congruency::Congruent), "left", 300.0),
            result(trial(Congruency::Congruent), "left", 320.0),
            result(trial(Congruency::Incongruent), "left", 370.0),
            result(trial(Congruency::Incongruent), "left", 390.0),
            result(trial(Congruency::Incongruent), "timeout", 2000.0),
        ];
        let stats = FlankerStats::from_results(&results);
        assert_eq!(stats.congruency.congruency_effect_ms, Some(70.0));
        assert_eq!(stats.summary.accuracy_percent, 80.0);
        assert_eq!(stats.summary.mean_rt_ms(), Some(345.0));
    }
}
