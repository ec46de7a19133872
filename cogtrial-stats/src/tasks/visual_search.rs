//! Visual search statistics.
//!
//! Timeouts are excluded before accuracy is computed. The search slope is
//! the least-squares slope of mean correct RT on set size, over
//! target-present trials.

use cogtrial_core::{SearchType, TrialDefinition, TrialResult};
use serde::{Deserialize, Serialize};

use super::{correct_rts_by, narrow, results_of};
use crate::summary::{BlockSummary, TimeoutPolicy, linear_slope, mean};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetSizeRt {
    pub set_size: usize,
    pub target_present: bool,
    pub mean_rt_ms: f64,
    pub correct_trials: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualSearchStats {
    pub summary: BlockSummary,
    pub by_set_size: Vec<SetSizeRt>,
    /// ms per additional item, target-present trials.
    pub search_slope_ms_per_item: Option<f64>,
    pub feature_slope_ms_per_item: Option<f64>,
    pub conjunction_slope_ms_per_item: Option<f64>,
}

impl VisualSearchStats {
    pub fn from_results(results: &[TrialResult<TrialDefinition>]) -> Self {
        let trials = narrow(results, TrialDefinition::as_visual_search);
        let by_set_size: Vec<SetSizeRt> = correct_rts_by(
            trials
                .iter()
                .map(|(result, trial)| ((trial.target_present, trial.set_size), *result)),
        )
        .into_iter()
        .filter_map(|((target_present, set_size), rts)| {
            Some(SetSizeRt {
                set_size,
                target_present,
                mean_rt_ms: mean(&rts)?,
                correct_trials: rts.len(),
            })
        })
        .collect();

        let slope_for = |search_type: Option<SearchType>| {
            let points: Vec<(f64, f64)> = correct_rts_by(
                trials
                    .iter()
                    .filter(|(_, trial)| trial.target_present)
                    .filter(|(_, trial)| {
                        search_type.is_none_or(|wanted| trial.search_type == wanted)
                    })
                    .map(|(result, trial)| (trial.set_size, *result)),
            )
            .into_iter()
            .filter_map(|(set_size, rts)| Some((set_size as f64, mean(&rts)?)))
            .collect();
            linear_slope(&points)
        };

        Self {
            summary: BlockSummary::from_results(results_of(&trials), TimeoutPolicy::Exclude),
            search_slope_ms_per_item: slope_for(None),
            feature_slope_ms_per_item: slope_for(Some(SearchType::Feature)),
            conjunction_slope_ms_per_item: slope_for(Some(SearchType::Conjunction)),
            by_set_size,
        }
    }
}
