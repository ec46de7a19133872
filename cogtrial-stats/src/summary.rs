use cogtrial_core::TrialResult;
use serde::{Deserialize, Serialize};

/// Whether timed-out trials enter the accuracy denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// A timeout is an attempted, incorrect trial.
    CountAsAttempt,
    /// Timeouts are dropped before the ratio.
    Exclude,
}

/// Percentage of judged trials answered correctly. Unjudged results
/// (`is_correct == None`) are left out entirely. Returns 0 with no trials.
pub fn accuracy_percent<'a, T: 'a>(
    results: impl IntoIterator<Item = &'a TrialResult<T>>,
    policy: TimeoutPolicy,
) -> f64 {
    let (correct, total) = results
        .into_iter()
        .filter(|r| r.is_correct.is_some())
        .filter(|r| policy == TimeoutPolicy::CountAsAttempt || !r.is_timeout())
        .fold((0usize, 0usize), |(correct, total), r| {
            (correct + usize::from(r.is_correct == Some(true)), total + 1)
        });
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64 * 100.0
    }
}

/// Mean RT over correct, non-timeout results.
pub fn mean_correct_rt<'a, T: 'a>(
    results: impl IntoIterator<Item = &'a TrialResult<T>>,
) -> Option<f64> {
    let rts: Vec<f64> = results
        .into_iter()
        .filter(|r| r.is_correct_keypress())
        .map(|r| r.reaction_time_ms)
        .collect();
    mean(&rts)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtSummary {
    pub count: usize,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub sd_ms: f64,
    pub p10_ms: f64,
    pub p90_ms: f64,
}

impl RtSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mean_ms = mean(&sorted)?;
        Some(Self {
            count: sorted.len(),
            mean_ms,
            median_ms: percentile(&sorted, 0.5),
            sd_ms: std_dev(&sorted, mean_ms),
            p10_ms: percentile(&sorted, 0.10),
            p90_ms: percentile(&sorted, 0.90),
        })
    }
}

/// Block-level figures shown on a completion screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub total: usize,
    pub judged: usize,
    pub correct: usize,
    pub timeouts: usize,
    pub timeout_policy: TimeoutPolicy,
    pub accuracy_percent: f64,
    /// Correct, non-timeout RTs.
    pub rt: Option<RtSummary>,
}

impl BlockSummary {
    pub fn from_results<'a, T: 'a>(
        results: impl IntoIterator<Item = &'a TrialResult<T>>,
        policy: TimeoutPolicy,
    ) -> Self {
        let results: Vec<&TrialResult<T>> = results.into_iter().collect();
        let rts: Vec<f64> = results
            .iter()
            .filter(|r| r.is_correct_keypress())
            .map(|r| r.reaction_time_ms)
            .collect();
        Self {
            total: results.len(),
            judged: results.iter().filter(|r| r.is_correct.is_some()).count(),
            correct: results.iter().filter(|r| r.is_correct == Some(true)).count(),
            timeouts: results.iter().filter(|r| r.is_timeout()).count(),
            timeout_policy: policy,
            accuracy_percent: accuracy_percent(results.iter().copied(), policy),
            rt: RtSummary::from_values(&rts),
        }
    }

    pub fn mean_rt_ms(&self) -> Option<f64> {
        self.rt.as_ref().map(|rt| rt.mean_ms)
    }
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation; 0 below two values.
pub(crate) fn std_dev(values: &[f64], mean: f64) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|value| {
            let diff = value - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n as f64 - 1.0);
    variance.sqrt()
}

/// Least-squares slope of `y` on `x`. `None` without two distinct `x`.
pub(crate) fn linear_slope(points: &[(f64, f64)]) -> Option<f64> {
    let n = points.len() as f64;
    let mean_x = mean(&points.iter().map(|(x, _)| *x).collect::<Vec<_>>())?;
    let mean_y = points.iter().map(|(_, y)| *y).sum::<f64>() / n;
    let (covariance, variance) = points.iter().fold((0.0, 0.0), |(cov, var), (x, y)| {
        (cov + (x - mean_x) * (y - mean_y), var + (x - mean_x) * (x - mean_x))
    });
    (variance > 0.0).then(|| covariance / variance)
}

/// Linear interpolation between closest ranks. `sorted` must be ascending.
pub(crate) fn percentile(sorted: &[f64], pct: f64) -> f64 {
    match sorted {
        [] => 0.0,
        [only] => *only,
        _ => {
            let rank = pct.clamp(0.0, 1.0) * (sorted.len() as f64 - 1.0);
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}
