use serde::{Deserialize, Serialize};

/// Cowan's K: `set_size × (hit_rate + correct_rejection_rate − 1)`, never
/// below zero.
pub fn cowan_k(set_size: usize, hit_rate: f64, correct_rejection_rate: f64) -> f64 {
    (set_size as f64 * (hit_rate + correct_rejection_rate - 1.0)).max(0.0)
}

/// Capacity estimate for one set size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityEstimate {
    pub set_size: usize,
    pub change_trials: usize,
    pub same_trials: usize,
    pub hit_rate: f64,
    pub correct_rejection_rate: f64,
    pub k: f64,
}

impl CapacityEstimate {
    pub fn new(
        set_size: usize,
        hits: usize,
        change_trials: usize,
        correct_rejections: usize,
        same_trials: usize,
    ) -> Self {
        let rate = |n: usize, d: usize| if d == 0 { 0.0 } else { n as f64 / d as f64 };
        let hit_rate = rate(hits, change_trials);
        let correct_rejection_rate = rate(correct_rejections, same_trials);
        Self {
            set_size,
            change_trials,
            same_trials,
            hit_rate,
            correct_rejection_rate,
            k: cowan_k(set_size, hit_rate, correct_rejection_rate),
        }
    }
}

/// Overall capacity: mean K across set sizes.
pub fn mean_capacity(estimates: &[CapacityEstimate]) -> Option<f64> {
    if estimates.is_empty() {
        None
    } else {
        Some(estimates.iter().map(|e| e.k).sum::<f64>() / estimates.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn k_for_set_size_four() {
        assert!((cowan_k(4, 0.8, 0.6) - 1.6).abs() < 1e-9);
    }

    #[test]
    fn k_is_clamped_at_zero() {
        assert_eq!(cowan_k(6, 0.3, 0.4), 0.0);
    }

    #[test]
    fn estimate_from_counts() {
        let estimate = CapacityEstimate::new(4, 4, 5, 3, 5);
        assert_eq!(estimate.hit_rate, 0.8);
        assert_eq!(estimate.correct_rejection_rate, 0.6);
        assert!((estimate.k - 1.6).abs() < 1e-9);
    }

    #[test]
    fn overall_capacity_averages_set_sizes() {
        let estimates = vec![
            CapacityEstimate::new(2, 5, 5, 5, 5),
            CapacityEstimate::new(4, 4, 5, 3, 5),
        ];
        let overall = mean_capacity(&estimates).unwrap();
        assert!((overall - 1.8).abs() < 1e-9);
        assert_eq!(mean_capacity(&[]), None);
    }
}
