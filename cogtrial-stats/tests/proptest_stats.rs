//! Property tests for the statistics aggregator.
//!
//! Properties:
//! - accuracy is a percentage whatever the mix of responses
//! - with timeouts excluded, accuracy depends on answered trials only
//! - Cowan's K stays within `0..=set_size`
//! - N-back signal-detection accuracy equals the per-trial judgement rate

use cogtrial_core::{Block, NBackTrial, Response, TaskTrial, TrialDefinition, TrialResult};
use cogtrial_stats::tasks::NBackStats;
use cogtrial_stats::{TimeoutPolicy, accuracy_percent, cowan_k};
use proptest::prelude::*;

fn result(
    trial: TrialDefinition,
    response: Response,
    rt_ms: f64,
) -> TrialResult<TrialDefinition> {
    TrialResult {
        trial_number: 1,
        phase: Block::Task,
        is_correct: trial.judge(&response),
        response,
        reaction_time_ms: rt_ms,
        trial,
        timestamp_ns: 0,
        session_id: None,
        participant_id: None,
    }
}

fn n_back_results() -> impl Strategy<Value = Vec<TrialResult<TrialDefinition>>> {
    prop::collection::vec((any::<bool>(), any::<bool>(), 150.0f64..2000.0), 0..60).prop_map(
        |rows| {
            rows.into_iter()
                .map(|(is_target, responded, rt_ms)| {
                    let trial = NBackTrial {
                        letter: 'Q',
                        n: 2,
                        is_target,
                        is_lure: false,
                    };
                    let response = if responded {
                        Response::key("match")
                    } else {
                        Response::Timeout
                    };
                    result(trial.into(), response, rt_ms)
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn accuracy_is_a_percentage(results in n_back_results()) {
        for policy in [TimeoutPolicy::CountAsAttempt, TimeoutPolicy::Exclude] {
            let accuracy = accuracy_percent(&results, policy);
            prop_assert!((0.0..=100.0).contains(&accuracy));
        }
    }

    #[test]
    fn excluded_timeouts_have_no_effect(results in n_back_results()) {
        let answered: Vec<_> = results.iter().filter(|r| r.responded()).cloned().collect();
        prop_assert_eq!(
            accuracy_percent(&results, TimeoutPolicy::Exclude),
            accuracy_percent(&answered, TimeoutPolicy::CountAsAttempt)
        );
    }

    #[test]
    fn cowan_k_is_bounded(set_size in 1usize..12, hit in 0.0f64..=1.0, cr in 0.0f64..=1.0) {
        let k = cowan_k(set_size, hit, cr);
        prop_assert!(k >= 0.0);
        prop_assert!(k <= set_size as f64 + 1e-9);
    }

    #[test]
    fn n_back_accuracy_matches_judgements(results in n_back_results()) {
        prop_assume!(!results.is_empty());
        let stats = NBackStats::from_results(&results);
        let judged = accuracy_percent(&results, TimeoutPolicy::CountAsAttempt);
        prop_assert!((stats.accuracy_percent - judged).abs() < 1e-9);
        prop_assert_eq!(stats.counts.total() as usize, results.len());
    }
}
