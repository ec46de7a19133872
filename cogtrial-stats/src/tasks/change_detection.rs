//! Change detection statistics.
//!
//! Accuracy includes timeouts. Capacity is Cowan's K per set size, where a
//! hit is a correct "different" on a change trial and a correct rejection a
//! correct "same" on a no-change trial; timeouts count against both rates.

use std::collections::BTreeMap;

use cogtrial_core::{TrialDefinition, TrialResult};
use serde::{Deserialize, Serialize};

use super::{narrow, results_of};
use crate::capacity::{CapacityEstimate, mean_capacity};
use crate::summary::{BlockSummary, TimeoutPolicy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeDetectionStats {
    pub summary: BlockSummary,
    pub by_set_size: Vec<CapacityEstimate>,
    /// Mean K across set sizes.
    pub capacity_k: Option<f64>,
}

#[derive(Default)]
struct Tally {
    hits: usize,
    change_trials: usize,
    correct_rejections: usize,
    same_trials: usize,
}

impl ChangeDetectionStats {
    pub fn from_results(results: &[TrialResult<TrialDefinition>]) -> Self {
        let trials = narrow(results, TrialDefinition::as_change_detection);
        let mut tallies: BTreeMap<usize, Tally> = BTreeMap::new();
        for (result, trial) in &trials {
            let tally = tallies.entry(trial.set_size).or_default();
            let correct = usize::from(result.is_correct == Some(true));
            if trial.change_present {
                tally.change_trials += 1;
                tally.hits += correct;
            } else {
                tally.same_trials += 1;
                tally.correct_rejections += correct;
            }
        }
        let by_set_size: Vec<CapacityEstimate> = tallies
            .into_iter()
            .map(|(set_size, t)| {
                CapacityEstimate::new(
                    set_size,
                    t.hits,
                    t.change_trials,
                    t.correct_rejections,
                    t.same_trials,
                )
            })
            .collect();

        Self {
            summary: BlockSummary::from_results(results_of(&trials), TimeoutPolicy::CountAsAttempt),
            capacity_k: mean_capacity(&by_set_size),
            by_set_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::testing::result;
    use cogtrial_core::ChangeDetectionTrial;

    fn block(
        set_size: usize,
        hits: usize,
        changes: usize,
        rejections: usize,
        sames: usize,
    ) -> Vec<TrialResult<TrialDefinition>> {
        let change = ChangeDetectionTrial {
            set_size,
            change_present: true,
        };
        let same = ChangeDetectionTrial {
            set_size,
            change_present: false,
        };
        let mut results = Vec::new();
        for i in 0..changes {
            let response = if i < hits { "different" } else { "timeout" };
            results.push(result(change.clone(), response, 700.0));
        }
        for i in 0..sames {
            let response = if i < rejections { "same" } else { "different" };
            results.push(result(same.clone(), response, 750.0));
        }
        results
    }

    #[test]
    fn capacity_for_set_size_four() {
        let stats = ChangeDetectionStats::from_results(&block(4, 4, 5, 3, 5));
        assert_eq!(stats.by_set_size.len(), 1);
        assert!((stats.by_set_size[0].k - 1.6).abs() < 1e-9);
        assert!((stats.capacity_k.unwrap() - 1.6).abs() < 1e-9);
        assert_eq!(stats.summary.accuracy_percent, 70.0);
        assert_eq!(stats.summary.timeouts, 1);
    }

    #[test]
    fn capacity_averages_over_set_sizes() {
        let mut results = block(4, 4, 5, 3, 5);
        results.extend(block(8, 2, 4, 1, 4));
        let stats = ChangeDetectionStats::from_results(&results);
        assert_eq!(stats.by_set_size[1].k, 0.0);
        assert!((stats.capacity_k.unwrap() - 0.8).abs() < 1e-9);
    }
}
