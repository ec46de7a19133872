//! Property tests for trial resolution.
//!
//! Properties:
//! - every executed trial produces exactly one result, whatever keypresses arrive
//! - trial numbers run 1..=N without gaps
//! - recorded reaction times never exceed the response timeout
//! - a block runs `min(configured, available)` trials

use cogtrial_core::{BlockPhase, Congruency, Direction, FlankerTrial, PhaseSpec, SessionContext};
use cogtrial_experiment::{
    ExperimentConfig, ExperimentStateMachine, InterTrialDelay, NoHooks, OnsetMode, TrialCatalog,
};
use cogtrial_timing::ManualTimer;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

const MS: u64 = 1_000_000;

fn config(trials: usize) -> ExperimentConfig {
    ExperimentConfig {
        practice_trials: 0,
        experiment_trials: trials,
        phases: vec![
            PhaseSpec::timed("fixation", 300).with_jitter(200),
            PhaseSpec::response_window("response"),
        ],
        response_timeout_ms: 1500,
        inter_trial: InterTrialDelay::Fixed(400),
        settle_ms: 50,
        onset: OnsetMode::PhaseStart,
    }
}

fn machine(
    configured: usize,
    available: usize,
    seed: u64,
) -> (
    ExperimentStateMachine<FlankerTrial, ManualTimer, NoHooks, StdRng>,
    ManualTimer,
) {
    let trial = FlankerTrial {
        target: Direction::Left,
        stimulus_type: Congruency::Incongruent,
    };
    let timer = ManualTimer::new();
    let machine = ExperimentStateMachine::new(
        config(configured),
        TrialCatalog::new(Vec::new(), vec![trial; available]),
        timer.clone(),
        StdRng::seed_from_u64(seed),
        NoHooks,
        SessionContext::default(),
    )
    .unwrap();
    (machine, timer)
}

fn keypresses() -> impl Strategy<Value = Vec<(u64, bool)>> {
    prop::collection::vec((0u64..20_000, any::<bool>()), 0..40).prop_map(|mut presses| {
        presses.sort_by_key(|(at_ms, _)| *at_ms);
        presses
    })
}

proptest! {
    #[test]
    fn each_trial_resolves_exactly_once(
        trials in 1usize..8,
        presses in keypresses(),
        seed in any::<u64>(),
    ) {
        let (mut machine, timer) = machine(trials, trials, seed);
        prop_assert!(machine.start_main_task());

        let mut recorded = 0;
        let mut pending = presses.into_iter().peekable();
        loop {
            let deadline = machine.next_deadline();
            let press = pending.peek().map(|(at_ms, _)| at_ms * MS);
            match (deadline, press) {
                (None, None) => break,
                (Some(due), Some(at)) if due <= at => {
                    timer.set(due);
                    machine.poll();
                }
                (Some(due), None) => {
                    timer.set(due);
                    machine.poll();
                }
                (_, Some(at)) => {
                    let (_, left) = pending.next().unwrap();
                    timer.set(at);
                    let key = if left { "left" } else { "right" };
                    if machine.handle_response(key, at).is_recorded() {
                        recorded += 1;
                    }
                }
            }
        }

        prop_assert_eq!(machine.block_phase(), BlockPhase::Complete);
        let results = machine.results();
        prop_assert_eq!(results.len(), trials);
        let numbers: Vec<_> = results.iter().map(|r| r.trial_number).collect();
        prop_assert_eq!(numbers, (1..=trials).collect::<Vec<_>>());

        let timeouts = results.iter().filter(|r| r.is_timeout()).count();
        prop_assert_eq!(recorded + timeouts, trials);
        for result in results {
            prop_assert!(result.reaction_time_ms >= 0.0);
            prop_assert!(result.reaction_time_ms <= 1500.0);
        }
    }

    #[test]
    fn block_length_is_capped_by_the_catalog(
        configured in 0usize..10,
        available in 0usize..10,
    ) {
        let (mut machine, timer) = machine(configured, available, 1);
        machine.start_main_task();
        while let Some(due) = machine.next_deadline() {
            timer.set(due);
            machine.poll();
        }
        prop_assert_eq!(machine.block_phase(), BlockPhase::Complete);
        prop_assert_eq!(machine.results().len(), configured.min(available));
        prop_assert!(machine.results().iter().all(|r| r.is_timeout()));
    }
}
