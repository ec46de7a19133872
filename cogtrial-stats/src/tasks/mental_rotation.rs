//! Mental rotation statistics.
//!
//! Timeouts are excluded before accuracy is computed.

use cogtrial_core::{TrialDefinition, TrialResult};
use serde::{Deserialize, Serialize};

use super::{correct_rts_by, narrow, results_of};
use crate::summary::{BlockSummary, TimeoutPolicy, linear_slope, mean};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleRt {
    pub angle_deg: u32,
    pub mean_rt_ms: f64,
    pub correct_trials: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentalRotationStats {
    pub summary: BlockSummary,
    pub by_angle: Vec<AngleRt>,
    /// ms per degree of rotation.
    pub rotation_slope_ms_per_deg: Option<f64>,
}

impl MentalRotationStats {
    pub fn from_results(results: &[TrialResult<TrialDefinition>]) -> Self {
        let trials = narrow(results, TrialDefinition::as_mental_rotation);
        let by_angle: Vec<AngleRt> =
            correct_rts_by(trials.iter().map(|(result, trial)| (trial.angle_deg, *result)))
                .into_iter()
                .filter_map(|(angle_deg, rts)| {
                    Some(AngleRt {
                        angle_deg,
                        mean_rt_ms: mean(&rts)?,
                        correct_trials: rts.len(),
                    })
                })
                .collect();
        let points: Vec<(f64, f64)> = by_angle
            .iter()
            .map(|angle| (f64::from(angle.angle_deg), angle.mean_rt_ms))
            .collect();

        Self {
            summary: BlockSummary::from_results(results_of(&trials), TimeoutPolicy::Exclude),
            rotation_slope_ms_per_deg: linear_slope(&points),
            by_angle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::testing::result;
    use cogtrial_core::MentalRotationTrial;

    fn trial(angle_deg: u32, mirrored: bool) -> MentalRotationTrial {
        MentalRotationTrial {
            angle_deg,
            mirrored,
        }
    }

    #[test]
    fn rt_grows_with_angle() {
        let results = vec![
            result(trial(0, false), "same", 800.0),
            result(trial(0, true), "mirror", 820.0),
            result(trial(90, false), "same", 1300.0),
            result(trial(180, true), "mirror", 1800.0),
            result(trial(180, false), "mirror", 2500.0),
            result(trial(180, false), "timeout", 5000.0),
        ];
        let stats = MentalRotationStats::from_results(&results);
        let angles: Vec<_> = stats.by_angle.iter().map(|a| (a.angle_deg, a.mean_rt_ms)).collect();
        assert_eq!(angles, vec![(0, 810.0), (90, 1300.0), (180, 1800.0)]);
        assert!(stats.rotation_slope_ms_per_deg.unwrap() > 5.0);
        assert_eq!(stats.summary.accuracy_percent, 80.0);
    }
}
