use cogtrial_core::{Block, PhaseSpec, TrialResult};

use crate::error::HookError;

pub type HookResult<T = ()> = Result<T, HookError>;

/// Task callbacks, invoked synchronously from the engine.
///
/// Every method has a no-op default. An `Err` is logged where the hook is
/// called and the engine continues as if the hook had returned its default.
pub trait TrialHooks<S> {
    fn on_trial_start(&mut self, _trial: &S, _index: usize, _block: Block) -> HookResult {
        Ok(())
    }

    /// Returning `Some` replaces the emitted result.
    fn on_trial_end(
        &mut self,
        _result: &TrialResult<S>,
        _trial: &S,
        _index: usize,
        _block: Block,
    ) -> HookResult<Option<TrialResult<S>>> {
        Ok(None)
    }

    /// Returning `Some(ms)` overrides this phase's duration, for this trial only.
    fn on_phase_start(
        &mut self,
        _phase: &PhaseSpec,
        _phase_index: usize,
        _trial: &S,
        _block: Block,
    ) -> HookResult<Option<u64>> {
        Ok(None)
    }

    fn on_phase_end(
        &mut self,
        _phase: &PhaseSpec,
        _phase_index: usize,
        _trial: &S,
        _block: Block,
    ) -> HookResult {
        Ok(())
    }

    /// Called once when a block's trials are exhausted.
    fn on_block_complete(&mut self, _block: Block, _results: &[TrialResult<S>]) -> HookResult {
        Ok(())
    }

    fn on_experiment_complete(
        &mut self,
        _main: &[TrialResult<S>],
        _practice: &[TrialResult<S>],
    ) -> HookResult {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl<S> TrialHooks<S> for NoHooks {}
