use std::path::PathBuf;

use cogtrial_core::{Block, PhaseSpec, SessionContext, TaskKind, TrialDefinition, TrialResult};
use cogtrial_experiment::{HookError, HookResult, TrialHooks};
use cogtrial_stats::TaskSummary;
use tracing::{debug, info};

use crate::export::SessionExport;
use crate::presets::{CUE_TARGET_INTERVAL, POSNER_CUE_MS};

/// Task hooks for a headless session: per-trial SOA timing, block
/// summaries in the log and the JSON export at the end.
pub struct SessionHooks {
    task: TaskKind,
    session: SessionContext,
    out: PathBuf,
    pub summaries: Vec<(Block, TaskSummary)>,
    /// Where the export was written, once the experiment completes.
    pub exported: Option<PathBuf>,
}

impl SessionHooks {
    pub fn new(task: TaskKind, session: SessionContext, out: PathBuf) -> Self {
        Self {
            task,
            session,
            out,
            summaries: Vec::new(),
            exported: None,
        }
    }
}

impl TrialHooks<TrialDefinition> for SessionHooks {
    fn on_phase_start(
        &mut self,
        phase: &PhaseSpec,
        _phase_index: usize,
        trial: &TrialDefinition,
        _block: Block,
    ) -> HookResult<Option<u64>> {
        // The gap after the cue makes up the rest of the trial's SOA.
        match trial.as_posner() {
            Some(posner) if phase.name == CUE_TARGET_INTERVAL => {
                Ok(Some(posner.soa_ms.saturating_sub(POSNER_CUE_MS)))
            }
            _ => Ok(None),
        }
    }

    fn on_trial_end(
        &mut self,
        result: &TrialResult<TrialDefinition>,
        _trial: &TrialDefinition,
        _index: usize,
        block: Block,
    ) -> HookResult<Option<TrialResult<TrialDefinition>>> {
        debug!(
            %block,
            trial_number = result.trial_number,
            response = %result.response,
            rt_ms = result.reaction_time_ms,
            correct = ?result.is_correct,
            "trial recorded"
        );
        Ok(None)
    }

    fn on_block_complete(
        &mut self,
        block: Block,
        results: &[TrialResult<TrialDefinition>],
    ) -> HookResult {
        let summary = TaskSummary::compute(self.task, results);
        info!(
            %block,
            task = %self.task,
            trials = results.len(),
            accuracy_percent = summary.accuracy_percent(),
            mean_rt_ms = ?summary.mean_rt_ms(),
            "block summary"
        );
        self.summaries.push((block, summary));
        Ok(())
    }

    fn on_experiment_complete(
        &mut self,
        main: &[TrialResult<TrialDefinition>],
        practice: &[TrialResult<TrialDefinition>],
    ) -> HookResult {
        let export = SessionExport::new(self.session.clone(), self.task, main, practice);
        let written = export
            .persist(&self.out)
            .map_err(|err| HookError::new(format!("{err:#}")))?;
        self.exported = Some(written);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogtrial_core::{Congruency, CueValidity, Direction, FlankerTrial, PosnerTrial};

    fn hooks() -> SessionHooks {
        SessionHooks::new(
            TaskKind::Posner,
            SessionContext::new("s"),
            PathBuf::from("s.json"),
        )
    }

    #[test]
    fn posner_interval_completes_the_soa() {
        let trial: TrialDefinition = PosnerTrial {
            cue_side: Some(Direction::Left),
            target_side: Some(Direction::Left),
            cue_validity: CueValidity::Valid,
            soa_ms: 500,
        }
        .into();
        let interval = PhaseSpec::timed(CUE_TARGET_INTERVAL, 200);
        let cue = PhaseSpec::timed("cue", POSNER_CUE_MS);
        let mut hooks = hooks();
        assert_eq!(
            hooks.on_phase_start(&interval, 2, &trial, Block::Task).unwrap(),
            Some(400)
        );
        assert_eq!(hooks.on_phase_start(&cue, 1, &trial, Block::Task).unwrap(), None);
    }

    #[test]
    fn other_tasks_keep_configured_durations() {
        let trial: TrialDefinition = FlankerTrial {
            target: Direction::Right,
            stimulus_type: Congruency::Congruent,
        }
        .into();
        let interval = PhaseSpec::timed(CUE_TARGET_INTERVAL, 200);
        assert_eq!(
            hooks()
                .on_phase_start(&interval, 2, &trial, Block::Task)
                .unwrap(),
            None
        );
    }

    #[test]
    fn block_summaries_are_kept_in_order() {
        let mut hooks = hooks();
        hooks.on_block_complete(Block::Practice, &[]).unwrap();
        hooks.on_block_complete(Block::Task, &[]).unwrap();
        let blocks: Vec<_> = hooks.summaries.iter().map(|(block, _)| *block).collect();
        assert_eq!(blocks, [Block::Practice, Block::Task]);
    }
}
