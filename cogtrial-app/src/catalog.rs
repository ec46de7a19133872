//! Randomised trial lists for each task.

use cogtrial_core::{
    ChangeDetectionTrial, Congruency, CueValidity, Direction, FlankerTrial, InkColor,
    MentalRotationTrial, NBackTrial, PosnerTrial, SearchType, StroopTrial, TaskKind,
    TrialDefinition, VisualSearchTrial,
};
use cogtrial_experiment::TrialCatalog;
use rand::Rng;
use rand::seq::SliceRandom;

const N_BACK_LETTERS: &[char] = &[
    'B', 'C', 'D', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V', 'W', 'X',
    'Z',
];
const N_BACK_LEVEL: usize = 2;
const SEARCH_SET_SIZES: [usize; 3] = [4, 8, 16];
const SOAS_MS: [u64; 3] = [100, 300, 500];
const ROTATION_ANGLES: [u32; 5] = [0, 45, 90, 135, 180];
const MEMORY_SET_SIZES: [usize; 3] = [2, 4, 6];

pub fn catalog<R: Rng>(
    kind: TaskKind,
    practice: usize,
    main: usize,
    rng: &mut R,
) -> TrialCatalog<TrialDefinition> {
    TrialCatalog::new(generate(kind, practice, rng), generate(kind, main, rng))
}

pub fn generate<R: Rng>(kind: TaskKind, count: usize, rng: &mut R) -> Vec<TrialDefinition> {
    match kind {
        TaskKind::Flanker => into_definitions(flanker(count, rng)),
        TaskKind::Stroop => into_definitions(stroop(count, rng)),
        TaskKind::NBack => into_definitions(n_back(count, rng)),
        TaskKind::VisualSearch => into_definitions(visual_search(count, rng)),
        TaskKind::Posner => into_definitions(posner(count, rng)),
        TaskKind::MentalRotation => into_definitions(mental_rotation(count, rng)),
        TaskKind::ChangeDetection => into_definitions(change_detection(count, rng)),
    }
}

fn into_definitions<T: Into<TrialDefinition>>(trials: Vec<T>) -> Vec<TrialDefinition> {
    trials.into_iter().map(Into::into).collect()
}

fn direction<R: Rng>(rng: &mut R) -> Direction {
    if rng.random_bool(0.5) {
        Direction::Left
    } else {
        Direction::Right
    }
}

/// Half congruent, half incongruent, shuffled.
pub fn flanker<R: Rng>(count: usize, rng: &mut R) -> Vec<FlankerTrial> {
    let mut trials: Vec<_> = (0..count)
        .map(|i| FlankerTrial {
            target: direction(rng),
            stimulus_type: if i % 2 == 0 {
                Congruency::Congruent
            } else {
                Congruency::Incongruent
            },
        })
        .collect();
    trials.shuffle(rng);
    trials
}

/// Congruent, incongruent and neutral words in equal shares.
pub fn stroop<R: Rng>(count: usize, rng: &mut R) -> Vec<StroopTrial> {
    let mut trials: Vec<_> = (0..count)
        .map(|i| {
            let ink = InkColor::ALL[rng.random_range(0..InkColor::ALL.len())];
            match i % 3 {
                0 => StroopTrial {
                    word: Some(ink),
                    ink,
                    stimulus_type: Congruency::Congruent,
                },
                1 => {
                    let others: Vec<_> = InkColor::ALL.into_iter().filter(|c| *c != ink).collect();
                    StroopTrial {
                        word: Some(others[rng.random_range(0..others.len())]),
                        ink,
                        stimulus_type: Congruency::Incongruent,
                    }
                }
                _ => StroopTrial {
                    word: None,
                    ink,
                    stimulus_type: Congruency::Neutral,
                },
            }
        })
        .collect();
    trials.shuffle(rng);
    trials
}

/// Letter stream with about a third of eligible positions as targets and
/// some (n-1)-back lures. Target status is derived from the stream itself.
pub fn n_back<R: Rng>(count: usize, rng: &mut R) -> Vec<NBackTrial> {
    let mut letters: Vec<char> = Vec::with_capacity(count);
    for i in 0..count {
        let letter = if i >= N_BACK_LEVEL && rng.random_bool(0.3) {
            letters[i - N_BACK_LEVEL]
        } else if i > 0 && rng.random_bool(0.1) {
            letters[i - 1]
        } else {
            N_BACK_LETTERS[rng.random_range(0..N_BACK_LETTERS.len())]
        };
        letters.push(letter);
    }
    letters
        .iter()
        .enumerate()
        .map(|(i, &letter)| {
            let is_target = i >= N_BACK_LEVEL && letters[i - N_BACK_LEVEL] == letter;
            let is_lure = !is_target && i >= 1 && letters[i - 1] == letter;
            NBackTrial {
                letter,
                n: N_BACK_LEVEL,
                is_target,
                is_lure,
            }
        })
        .collect()
}

pub fn visual_search<R: Rng>(count: usize, rng: &mut R) -> Vec<VisualSearchTrial> {
    let mut trials: Vec<_> = (0..count)
        .map(|i| VisualSearchTrial {
            set_size: SEARCH_SET_SIZES[i % SEARCH_SET_SIZES.len()],
            target_present: (i / SEARCH_SET_SIZES.len()) % 2 == 0,
            search_type: if rng.random_bool(0.5) {
                SearchType::Feature
            } else {
                SearchType::Conjunction
            },
        })
        .collect();
    trials.shuffle(rng);
    trials
}

/// 20% catch trials; target trials are 5:2:1 valid, invalid and neutral.
pub fn posner<R: Rng>(count: usize, rng: &mut R) -> Vec<PosnerTrial> {
    (0..count)
        .map(|_| {
            let soa_ms = SOAS_MS[rng.random_range(0..SOAS_MS.len())];
            let side = direction(rng);
            match rng.random_range(0..10) {
                0 | 1 => PosnerTrial {
                    cue_side: Some(side),
                    target_side: None,
                    cue_validity: CueValidity::Neutral,
                    soa_ms,
                },
                2..=6 => PosnerTrial {
                    cue_side: Some(side),
                    target_side: Some(side),
                    cue_validity: CueValidity::Valid,
                    soa_ms,
                },
                7 | 8 => PosnerTrial {
                    cue_side: Some(side.opposite()),
                    target_side: Some(side),
                    cue_validity: CueValidity::Invalid,
                    soa_ms,
                },
                _ => PosnerTrial {
                    cue_side: None,
                    target_side: Some(side),
                    cue_validity: CueValidity::Neutral,
                    soa_ms,
                },
            }
        })
        .collect()
}

pub fn mental_rotation<R: Rng>(count: usize, rng: &mut R) -> Vec<MentalRotationTrial> {
    let mut trials: Vec<_> = (0..count)
        .map(|i| MentalRotationTrial {
            angle_deg: ROTATION_ANGLES[i % ROTATION_ANGLES.len()],
            mirrored: (i / ROTATION_ANGLES.len()) % 2 == 1,
        })
        .collect();
    trials.shuffle(rng);
    trials
}

pub fn change_detection<R: Rng>(count: usize, rng: &mut R) -> Vec<ChangeDetectionTrial> {
    let mut trials: Vec<_> = (0..count)
        .map(|i| ChangeDetectionTrial {
            set_size: MEMORY_SET_SIZES[i % MEMORY_SET_SIZES.len()],
            change_present: (i / MEMORY_SET_SIZES.len()) % 2 == 0,
        })
        .collect();
    trials.shuffle(rng);
    trials
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn generates_the_requested_counts_for_every_task() {
        let mut rng = StdRng::seed_from_u64(3);
        for kind in TaskKind::ALL {
            let catalog = catalog(kind, 4, 17, &mut rng);
            assert_eq!(catalog.practice.len(), 4);
            assert_eq!(catalog.main.len(), 17);
            assert!(catalog.main.iter().all(|t| t.kind() == kind));
        }
    }

    #[test]
    fn same_seed_same_trials() {
        let a = generate(TaskKind::Posner, 30, &mut StdRng::seed_from_u64(9));
        let b = generate(TaskKind::Posner, 30, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn n_back_targets_match_the_stream() {
        let trials = n_back(200, &mut StdRng::seed_from_u64(5));
        for (i, trial) in trials.iter().enumerate() {
            let expected = i >= 2 && trials[i - 2].letter == trial.letter;
            assert_eq!(trial.is_target, expected, "position {i}");
            assert!(!(trial.is_target && trial.is_lure));
        }
        assert!(trials.iter().any(|t| t.is_target));
        assert!(trials.iter().any(|t| t.is_lure));
    }

    #[test]
    fn stroop_conditions_follow_word_and_ink() {
        for trial in stroop(30, &mut StdRng::seed_from_u64(1)) {
            match trial.stimulus_type {
                Congruency::Congruent => assert_eq!(trial.word, Some(trial.ink)),
                Congruency::Incongruent => {
                    assert!(trial.word.is_some_and(|word| word != trial.ink))
                }
                Congruency::Neutral => assert_eq!(trial.word, None),
            }
        }
    }

    #[test]
    fn flanker_is_balanced() {
        let trials = flanker(40, &mut StdRng::seed_from_u64(2));
        let incongruent = trials
            .iter()
            .filter(|t| t.stimulus_type == Congruency::Incongruent)
            .count();
        assert_eq!(incongruent, 20);
    }
}
