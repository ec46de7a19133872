use cogtrial_core::{Congruency, TrialResult};
use serde::{Deserialize, Serialize};

use crate::summary::mean_correct_rt;

/// Mean correct RT of the `contrast` condition minus that of `baseline`.
/// `None` when either condition has no correct keypress.
pub fn rt_contrast<'a, T: 'a>(
    results: impl IntoIterator<Item = &'a TrialResult<T>> + Clone,
    baseline: impl Fn(&TrialResult<T>) -> bool,
    contrast: impl Fn(&TrialResult<T>) -> bool,
) -> Option<f64> {
    let baseline_rt = mean_correct_rt(results.clone().into_iter().filter(|r| baseline(*r)))?;
    let contrast_rt = mean_correct_rt(results.into_iter().filter(|r| contrast(*r)))?;
    Some(contrast_rt - baseline_rt)
}

/// Per-condition mean RTs for interference tasks (flanker, Stroop).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CongruencyStats {
    pub congruent_mean_rt_ms: Option<f64>,
    pub incongruent_mean_rt_ms: Option<f64>,
    pub neutral_mean_rt_ms: Option<f64>,
    /// Incongruent minus congruent.
    pub congruency_effect_ms: Option<f64>,
}

impl CongruencyStats {
    pub fn from_labelled<'a, T: 'a>(
        labelled: impl IntoIterator<Item = (&'a TrialResult<T>, Congruency)>,
    ) -> Self {
        let labelled: Vec<_> = labelled.into_iter().collect();
        let condition_rt = |wanted: Congruency| {
            mean_correct_rt(
                labelled
                    .iter()
                    .filter(|(_, congruency)| *congruency == wanted)
                    .map(|(result, _)| *result),
            )
        };
        let congruent = condition_rt(Congruency::Congruent);
        let incongruent = condition_rt(Congruency::Incongruent);
        Self {
            congruent_mean_rt_ms: congruent,
            incongruent_mean_rt_ms: incongruent,
            neutral_mean_rt_ms: condition_rt(Congruency::Neutral),
            congruency_effect_ms: incongruent.zip(congruent).map(|(i, c)| i - c),
        }
    }
}
