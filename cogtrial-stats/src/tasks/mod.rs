//! Per-task statistics. Each module states how its accuracy treats
//! timeouts; the conventions differ between tasks and are kept that way.

pub mod change_detection;
pub mod flanker;
pub mod mental_rotation;
pub mod n_back;
pub mod posner;
pub mod stroop;
pub mod visual_search;

use std::collections::BTreeMap;

use cogtrial_core::{TaskKind, TrialDefinition, TrialResult};
use serde::{Deserialize, Serialize};

pub use change_detection::ChangeDetectionStats;
pub use flanker::FlankerStats;
pub use mental_rotation::MentalRotationStats;
pub use n_back::NBackStats;
pub use posner::PosnerStats;
pub use stroop::StroopStats;
pub use visual_search::VisualSearchStats;

/// Statistics for one block of any task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum TaskSummary {
    Flanker(FlankerStats),
    Stroop(StroopStats),
    NBack(NBackStats),
    VisualSearch(VisualSearchStats),
    Posner(PosnerStats),
    MentalRotation(MentalRotationStats),
    ChangeDetection(ChangeDetectionStats),
}

impl TaskSummary {
    /// Results belonging to other tasks are ignored.
    pub fn compute(kind: TaskKind, results: &[TrialResult<TrialDefinition>]) -> Self {
        match kind {
            TaskKind::Flanker => TaskSummary::Flanker(FlankerStats::from_results(results)),
            TaskKind::Stroop => TaskSummary::Stroop(StroopStats::from_results(results)),
            TaskKind::NBack => TaskSummary::NBack(NBackStats::from_results(results)),
            TaskKind::VisualSearch => {
                TaskSummary::VisualSearch(VisualSearchStats::from_results(results))
            }
            TaskKind::Posner => TaskSummary::Posner(PosnerStats::from_results(results)),
            TaskKind::MentalRotation => {
                TaskSummary::MentalRotation(MentalRotationStats::from_results(results))
            }
            TaskKind::ChangeDetection => {
                TaskSummary::ChangeDetection(ChangeDetectionStats::from_results(results))
            }
        }
    }

    pub fn accuracy_percent(&self) -> f64 {
        match self {
            TaskSummary::Flanker(stats) => stats.summary.accuracy_percent,
            TaskSummary::Stroop(stats) => stats.summary.accuracy_percent,
            TaskSummary::NBack(stats) => stats.accuracy_percent,
            TaskSummary::VisualSearch(stats) => stats.summary.accuracy_percent,
            TaskSummary::Posner(stats) => stats.summary.accuracy_percent,
            TaskSummary::MentalRotation(stats) => stats.summary.accuracy_percent,
            TaskSummary::ChangeDetection(stats) => stats.summary.accuracy_percent,
        }
    }

    pub fn mean_rt_ms(&self) -> Option<f64> {
        match self {
            TaskSummary::Flanker(stats) => stats.summary.mean_rt_ms(),
            TaskSummary::Stroop(stats) => stats.summary.mean_rt_ms(),
            TaskSummary::NBack(stats) => stats.mean_hit_rt_ms,
            TaskSummary::VisualSearch(stats) => stats.summary.mean_rt_ms(),
            TaskSummary::Posner(stats) => stats.summary.mean_rt_ms(),
            TaskSummary::MentalRotation(stats) => stats.summary.mean_rt_ms(),
            TaskSummary::ChangeDetection(stats) => stats.summary.mean_rt_ms(),
        }
    }
}

/// Results of one task, paired with their typed definitions.
pub(crate) fn narrow<'a, X: 'a>(
    results: &'a [TrialResult<TrialDefinition>],
    pick: impl Fn(&TrialDefinition) -> Option<&X>,
) -> Vec<(&'a TrialResult<TrialDefinition>, &'a X)> {
    results
        .iter()
        .filter_map(|result| pick(&result.trial).map(|trial| (result, trial)))
        .collect()
}

/// The result half of narrowed pairs.
pub(crate) fn results_of<'a, X>(
    pairs: &'a [(&'a TrialResult<TrialDefinition>, &'a X)],
) -> impl Iterator<Item = &'a TrialResult<TrialDefinition>> + Clone {
    pairs.iter().map(|(result, _)| *result)
}

/// Correct keypress RTs grouped by a condition key.
pub(crate) fn correct_rts_by<'a, K: Ord>(
    labelled: impl IntoIterator<Item = (K, &'a TrialResult<TrialDefinition>)>,
) -> BTreeMap<K, Vec<f64>> {
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for (key, result) in labelled {
        if result.is_correct_keypress() {
            groups.entry(key).or_default().push(result.reaction_time_ms);
        }
    }
    groups
}


#[cfg(test)]
mod tests {
    use super::testing::result;
    use super::*;
    use cogtrial_core::{Congruency, Direction, FlankerTrial};

    #[test]
    fn summary_is_tagged_by_task() {
        let results = vec![result(
            FlankerTrial {
                target: Direction::Right,
                stimulus_type: Congruency::Congruent,
            },
            "right",
            410.0,
        )];
        let summary = TaskSummary::compute(TaskKind::Flanker, &results);
        assert_eq!(summary.accuracy_percent(), 100.0);
        assert_eq!(summary.mean_rt_ms(), Some(410.0));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["task"], "flanker");
        assert_eq!(json["congruency_effect_ms"], serde_json::Value::Null);
    }
}
