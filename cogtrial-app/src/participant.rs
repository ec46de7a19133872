//! Simulated participant used by the headless runner.

use cogtrial_core::{
    Congruency, CueValidity, InkColor, Response, SearchType, TaskTrial, TrialDefinition, keys,
};
use rand::Rng;

/// Fastest plausible keypress.
const MIN_RT_MS: f64 = 150.0;

#[derive(Debug, Clone)]
pub struct SimulatedParticipant {
    pub accuracy: f64,
    pub mean_rt_ms: f64,
    pub rt_sd_ms: f64,
    /// Chance of letting a choice trial time out.
    pub miss_rate: f64,
}

/// What the participant will do on the current trial.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Press { response: Response, rt_ms: f64 },
    Withhold,
}

impl SimulatedParticipant {
    pub fn new(accuracy: f64, mean_rt_ms: f64, miss_rate: f64) -> Self {
        Self {
            accuracy,
            mean_rt_ms,
            rt_sd_ms: mean_rt_ms * 0.2,
            miss_rate,
        }
    }

    pub fn plan<R: Rng>(&self, trial: &TrialDefinition, rng: &mut R) -> Plan {
        let correct = rng.random_bool(self.accuracy.clamp(0.0, 1.0));
        let key = match trial {
            // go/no-go: the correct action may be to withhold
            TrialDefinition::NBack(_) | TrialDefinition::Posner(_) => {
                let go = trial.correct_response();
                let press = if correct { go.is_some() } else { go.is_none() };
                if !press {
                    return Plan::Withhold;
                }
                go.unwrap_or(match trial {
                    TrialDefinition::NBack(_) => keys::MATCH,
                    _ => keys::SPACE,
                })
                .to_string()
            }
            _ => {
                if rng.random_bool(self.miss_rate.clamp(0.0, 1.0)) {
                    return Plan::Withhold;
                }
                if correct {
                    trial.correct_response().unwrap_or(keys::SPACE).to_string()
                } else {
                    wrong_key(trial, rng)
                }
            }
        };
        Plan::Press {
            response: Response::key(key),
            rt_ms: self.reaction_time(trial, rng),
        }
    }

    fn reaction_time<R: Rng>(&self, trial: &TrialDefinition, rng: &mut R) -> f64 {
        // Sum of three uniforms: roughly normal with the configured spread.
        let noise: f64 = (0..3).map(|_| rng.random_range(-1.0..1.0)).sum::<f64>();
        let rt = self.mean_rt_ms + condition_cost_ms(trial) + noise * self.rt_sd_ms;
        rt.max(MIN_RT_MS)
    }
}

/// Typical slowing per condition, so the exported statistics show the
/// usual effects.
fn condition_cost_ms(trial: &TrialDefinition) -> f64 {
    match trial {
        TrialDefinition::Flanker(t) if t.stimulus_type == Congruency::Incongruent => 60.0,
        TrialDefinition::Stroop(t) if t.stimulus_type == Congruency::Incongruent => 80.0,
        TrialDefinition::Posner(t) if t.cue_validity == CueValidity::Invalid => 40.0,
        TrialDefinition::VisualSearch(t) => match t.search_type {
            SearchType::Feature => 2.0 * t.set_size as f64,
            SearchType::Conjunction => 25.0 * t.set_size as f64,
        },
        TrialDefinition::MentalRotation(t) => 4.0 * f64::from(t.angle_deg),
        TrialDefinition::ChangeDetection(t) => 20.0 * t.set_size as f64,
        _ => 0.0,
    }
}

fn wrong_key<R: Rng>(trial: &TrialDefinition, rng: &mut R) -> String {
    let key = match trial {
        TrialDefinition::Flanker(t) => t.target.opposite().key(),
        TrialDefinition::Stroop(t) => {
            let others: Vec<_> = InkColor::ALL.into_iter().filter(|c| *c != t.ink).collect();
            others[rng.random_range(0..others.len())].key()
        }
        TrialDefinition::VisualSearch(t) if t.target_present => keys::ABSENT,
        TrialDefinition::VisualSearch(_) => keys::PRESENT,
        TrialDefinition::MentalRotation(t) if t.mirrored => keys::SAME,
        TrialDefinition::MentalRotation(_) => keys::MIRROR,
        TrialDefinition::ChangeDetection(t) if t.change_present => keys::SAME,
        TrialDefinition::ChangeDetection(_) => keys::DIFFERENT,
        TrialDefinition::NBack(_) | TrialDefinition::Posner(_) => keys::SPACE,
    };
    key.to_string()
}
