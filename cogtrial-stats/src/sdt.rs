//! Signal-detection bookkeeping: outcome categories, rates, d′ and criterion.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    Hit,
    Miss,
    FalseAlarm,
    CorrectRejection,
}

pub fn classify(signal_present: bool, responded: bool) -> SignalCategory {
    match (signal_present, responded) {
        (true, true) => SignalCategory::Hit,
        (true, false) => SignalCategory::Miss,
        (false, true) => SignalCategory::FalseAlarm,
        (false, false) => SignalCategory::CorrectRejection,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdtCounts {
    pub hits: u32,
    pub misses: u32,
    pub false_alarms: u32,
    pub correct_rejections: u32,
}

impl SdtCounts {
    pub fn add(&mut self, category: SignalCategory) {
        let slot = match category {
            SignalCategory::Hit => &mut self.hits,
            SignalCategory::Miss => &mut self.misses,
            SignalCategory::FalseAlarm => &mut self.false_alarms,
            SignalCategory::CorrectRejection => &mut self.correct_rejections,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn signal_trials(&self) -> u32 {
        self.hits + self.misses
    }

    pub fn noise_trials(&self) -> u32 {
        self.false_alarms + self.correct_rejections
    }

    pub fn total(&self) -> u32 {
        self.signal_trials() + self.noise_trials()
    }

    pub fn hit_rate(&self) -> f64 {
        ratio(self.hits, self.signal_trials())
    }

    pub fn false_alarm_rate(&self) -> f64 {
        ratio(self.false_alarms, self.noise_trials())
    }

    pub fn correct_rejection_rate(&self) -> f64 {
        ratio(self.correct_rejections, self.noise_trials())
    }

    /// (Hits + correct rejections) / total.
    pub fn accuracy(&self) -> f64 {
        ratio(self.hits + self.correct_rejections, self.total())
    }

    pub fn d_prime(&self) -> f64 {
        let (z_hit, z_fa) = self.corrected_z_scores();
        z_hit - z_fa
    }

    pub fn criterion(&self) -> f64 {
        let (z_hit, z_fa) = self.corrected_z_scores();
        -0.5 * (z_hit + z_fa)
    }

    // Log-linear correction keeps rates of 0 or 1 finite.
    fn corrected_z_scores(&self) -> (f64, f64) {
        let hit_trials = self.signal_trials().max(1) as f64;
        let noise_trials = self.noise_trials().max(1) as f64;
        let hit_rate = (self.hits as f64 + 0.5) / (hit_trials + 1.0);
        let fa_rate = (self.false_alarms as f64 + 0.5) / (noise_trials + 1.0);
        (
            inverse_normal_cdf(hit_rate.clamp(1e-6, 1.0 - 1e-6)),
            inverse_normal_cdf(fa_rate.clamp(1e-6, 1.0 - 1e-6)),
        )
    }
}

impl FromIterator<SignalCategory> for SdtCounts {
    fn from_iter<I: IntoIterator<Item = SignalCategory>>(iter: I) -> Self {
        let mut counts = SdtCounts::default();
        for category in iter {
            counts.add(category);
        }
        counts
    }
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Acklam's rational approximation of the standard normal quantile
/// function. Relative error below 1.15e-9 on (0, 1).
pub fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.02425;
    const P_HIGH: f64 = 1.0 - P_LOW;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= P_HIGH {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}
