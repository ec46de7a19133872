use super::config::{ExperimentConfig, OnsetMode};
use super::error::{ConfigError, EngineError, HookError};
use super::hooks::TrialHooks;
use super::trial::{TrialCatalog, TrialRunState};
use cogtrial_core::{
    Block, BlockPhase, PhaseSpec, Response, SessionContext, TaskTrial, TrialResult,
};
use cogtrial_timing::{DriftLog, DriftStats, Scheduler, Timer, TimerId};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// Timed callbacks the engine schedules for itself. Trial-scoped events
/// carry the run serial of the trial that scheduled them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentEvent {
    BlockSettled,
    PhaseElapsed { serial: u64, phase_index: usize },
    ResponseTimeout { serial: u64 },
    InterTrialElapsed { serial: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NoActiveTrial,
    AlreadyResolved,
    NotAwaitingResponse,
}

/// Outcome of a response event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Recorded { trial_number: usize },
    Ignored(IgnoreReason),
}

impl Resolution {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Resolution::Recorded { .. })
    }
}

/// Runs blocks of trials through their phases and records one result per
/// trial.
///
/// Single-threaded: all mutation goes through `&mut self`, driven by
/// `poll` (timers) and `handle_response` (input).
pub struct ExperimentStateMachine<S, T, H, R>
where
    S: TaskTrial,
    T: Timer<Timestamp = u64>,
    H: TrialHooks<S>,
    R: Rng,
{
    pub config: ExperimentConfig,
    timer: T,
    rng: R,
    hooks: H,
    session: SessionContext,
    catalog: TrialCatalog<S>,
    block_phase: BlockPhase,
    current_trial_index: usize,
    practice_results: Vec<TrialResult<S>>,
    results: Vec<TrialResult<S>>,
    run: Option<TrialRunState<S>>,
    show_stimulus: bool,
    awaiting_response: bool,
    // A resolved trial is waiting out its inter-trial delay.
    advancing: bool,
    scheduler: Scheduler<ExperimentEvent>,
    drift: DriftLog,
    next_serial: u64,
}

impl<S, T, H, R> ExperimentStateMachine<S, T, H, R>
where
    S: TaskTrial,
    T: Timer<Timestamp = u64>,
    H: TrialHooks<S>,
    R: Rng,
{
    pub fn new(
        config: ExperimentConfig,
        catalog: TrialCatalog<S>,
        timer: T,
        rng: R,
        hooks: H,
        session: SessionContext,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            timer,
            rng,
            hooks,
            session,
            catalog,
            block_phase: BlockPhase::Setup,
            current_trial_index: 0,
            practice_results: Vec::new(),
            results: Vec::new(),
            run: None,
            show_stimulus: false,
            awaiting_response: false,
            advancing: false,
            scheduler: Scheduler::new(),
            drift: DriftLog::default(),
            next_serial: 0,
        })
    }

    pub fn start_practice(&mut self) -> bool {
        if self.block_phase != BlockPhase::Setup {
            warn!(phase = %self.block_phase, "practice can only start from setup");
            return false;
        }
        self.enter_block(BlockPhase::Practice);
        true
    }

    pub fn start_main_task(&mut self) -> bool {
        if !matches!(
            self.block_phase,
            BlockPhase::Setup | BlockPhase::PracticeComplete
        ) {
            warn!(phase = %self.block_phase, "main task cannot start now");
            return false;
        }
        self.enter_block(BlockPhase::Task);
        true
    }

    fn enter_block(&mut self, phase: BlockPhase) {
        self.scheduler.clear();
        self.run = None;
        self.advancing = false;
        self.show_stimulus = false;
        self.awaiting_response = false;
        self.block_phase = phase;
        self.current_trial_index = 0;
        match phase.block() {
            Some(Block::Practice) => self.practice_results.clear(),
            Some(Block::Task) => self.results.clear(),
            None => {}
        }

        info!(block = %phase, trials = self.block_len(), "block started");
        let now = self.timer.now();
        self.scheduler.schedule_after(
            now,
            Duration::from_millis(self.config.settle_ms),
            ExperimentEvent::BlockSettled,
        );
    }

    /// Starts the trial at the current index, or completes the block if
    /// the index is past its end.
    ///
    /// A no-op while a trial is running or a trial advance is in flight,
    /// so overlapping triggers never start a trial twice.
    pub fn advance(&mut self) -> bool {
        let Some(block) = self.block_phase.block() else {
            trace!(phase = %self.block_phase, "advance outside a trial block");
            return false;
        };
        if self.advancing {
            trace!("advance already in flight");
            return false;
        }
        if self.run.as_ref().is_some_and(|run| !run.is_resolved()) {
            trace!("trial already running");
            return false;
        }
        if self.current_trial_index >= self.block_len() {
            self.complete_block();
            return false;
        }
        match self.start_trial(block) {
            Ok(()) => true,
            Err(err) => {
                error!(%err, "cannot start trial");
                false
            }
        }
    }

    /// Fires every timer that is due. Returns how many fired.
    pub fn poll(&mut self) -> usize {
        let now = self.timer.now();
        let mut fired = 0;
        while let Some(due) = self.scheduler.pop_due(now) {
            self.drift
                .record(Duration::from_nanos(now.saturating_sub(due.deadline_ns)));
            fired += 1;
            self.dispatch(due.event);
        }
        fired
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    pub fn handle_response(
        &mut self,
        response: impl Into<Response>,
        timestamp_ns: u64,
    ) -> Resolution {
        self.handle_response_for(response, timestamp_ns, None)
    }

    /// Like `handle_response`, but scores and records against
    /// `trial_override` instead of the running trial's definition.
    pub fn handle_response_for(
        &mut self,
        response: impl Into<Response>,
        timestamp_ns: u64,
        trial_override: Option<S>,
    ) -> Resolution {
        let response = response.into();
        let Some(run) = self.run.as_ref() else {
            trace!(%response, "response with no active trial");
            return Resolution::Ignored(IgnoreReason::NoActiveTrial);
        };
        if run.is_resolved() {
            trace!(%response, trial_number = run.index + 1, "trial already resolved");
            return Resolution::Ignored(IgnoreReason::AlreadyResolved);
        }
        if !self.awaiting_response {
            trace!(%response, phase_index = run.phase_index, "response outside the response window");
            return Resolution::Ignored(IgnoreReason::NotAwaitingResponse);
        }

        if response.is_timeout() {
            // Timeouts always carry the configured RT, whoever reports them.
            let reaction_time_ms = self.config.response_timeout_ms as f64;
            return self.resolve(response, reaction_time_ms, timestamp_ns, trial_override);
        }

        let onset = match self.config.onset {
            OnsetMode::PhaseStart => run.timestamps.response_window,
            OnsetMode::Manual => run
                .timestamps
                .manual_onset
                .or(run.timestamps.response_window),
        }
        .unwrap_or(run.timestamps.phase_start);
        let reaction_time_ms = timestamp_ns.saturating_sub(onset) as f64 / 1_000_000.0;
        self.resolve(response, reaction_time_ms, timestamp_ns, trial_override)
    }

    /// Records the target onset for manual-onset tasks. Ignored once the
    /// trial has resolved.
    pub fn mark_onset(&mut self, timestamp_ns: u64) -> bool {
        match self.run.as_mut() {
            Some(run) if !run.is_resolved() => {
                run.timestamps.manual_onset = Some(timestamp_ns);
                true
            }
            _ => false,
        }
    }

    fn dispatch(&mut self, event: ExperimentEvent) {
        match event {
            ExperimentEvent::BlockSettled => {
                self.advance();
            }
            ExperimentEvent::PhaseElapsed {
                serial,
                phase_index,
            } => {
                let current = self.run.as_ref().is_some_and(|run| {
                    run.serial == serial && !run.is_resolved() && run.phase_index == phase_index
                });
                if current {
                    self.start_phase(phase_index + 1);
                } else {
                    trace!(serial, phase_index, "stale phase timer");
                }
            }
            ExperimentEvent::ResponseTimeout { serial } => self.on_timeout(serial),
            ExperimentEvent::InterTrialElapsed { serial } => self.on_inter_trial_elapsed(serial),
        }
    }

    fn start_trial(&mut self, block: Block) -> Result<(), EngineError> {
        let index = self.current_trial_index;
        let trial = self
            .catalog
            .block(block)
            .get(index)
            .cloned()
            .ok_or(EngineError::MissingTrial { block, index })?;
        let serial = self.next_serial;
        self.next_serial += 1;

        debug!(%block, trial_number = index + 1, "trial started");
        if let Err(err) = self.hooks.on_trial_start(&trial, index, block) {
            hook_failed("on_trial_start", &err);
        }
        let now = self.timer.now();
        self.run = Some(TrialRunState::new(serial, index, block, trial, now));
        self.start_phase(0);
        Ok(())
    }

    fn start_phase(&mut self, phase_index: usize) {
        let now = self.timer.now();
        let Some(run) = self.run.as_ref() else {
            return;
        };
        if run.is_resolved() {
            return;
        }
        let (serial, block, index, trial) = (run.serial, run.block, run.index, run.trial.clone());

        if phase_index > 0 {
            if let Some(previous) = self.config.phases.get(phase_index - 1).cloned() {
                if let Err(err) =
                    self.hooks
                        .on_phase_end(&previous, phase_index - 1, &trial, block)
                {
                    hook_failed("on_phase_end", &err);
                }
            }
        }

        let Some(spec) = self.config.phases.get(phase_index).cloned() else {
            // Timed phases ran out before any response or timeout.
            debug!(%block, trial_number = index + 1, "phases exhausted without a response");
            if let Some(run) = self.run.as_mut() {
                run.enter_phase(phase_index, now, false);
            }
            self.resolve_timeout(now);
            return;
        };

        if let Some(run) = self.run.as_mut() {
            run.enter_phase(phase_index, now, spec.accepts_responses);
        }
        self.show_stimulus = spec.show_stimulus;
        self.awaiting_response = spec.accepts_responses;
        debug!(phase = %spec.name, phase_index, "phase started");

        let duration_override = self
            .hooks
            .on_phase_start(&spec, phase_index, &trial, block)
            .unwrap_or_else(|err| {
                hook_failed("on_phase_start", &err);
                None
            });
        let duration_ms = match duration_override {
            Some(ms) => Some(ms),
            None => spec
                .duration_ms
                .map(|ms| ms.saturating_add(self.jitter(spec.jitter_ms))),
        };

        if let Some(ms) = duration_ms {
            let id = self.scheduler.schedule_after(
                now,
                Duration::from_millis(ms),
                ExperimentEvent::PhaseElapsed {
                    serial,
                    phase_index,
                },
            );
            self.own_timer(id);
        }

        if spec.accepts_responses && phase_index + 1 == self.config.phases.len() {
            let id = self.scheduler.schedule_after(
                now,
                Duration::from_millis(self.config.response_timeout_ms),
                ExperimentEvent::ResponseTimeout { serial },
            );
            self.own_timer(id);
        }
    }

    fn jitter(&mut self, max_ms: u64) -> u64 {
        if max_ms == 0 {
            0
        } else {
            self.rng.random_range(0..=max_ms)
        }
    }

    fn own_timer(&mut self, id: TimerId) {
        if let Some(run) = self.run.as_mut() {
            run.own_timer(id);
        }
    }

    fn on_timeout(&mut self, serial: u64) {
        let current = self
            .run
            .as_ref()
            .is_some_and(|run| run.serial == serial && !run.is_resolved());
        if !current {
            trace!(serial, "stale response timeout");
            return;
        }
        let now = self.timer.now();
        self.resolve_timeout(now);
    }

    fn resolve_timeout(&mut self, now: u64) {
        let reaction_time_ms = self.config.response_timeout_ms as f64;
        self.resolve(Response::Timeout, reaction_time_ms, now, None);
    }

    fn resolve(
        &mut self,
        response: Response,
        reaction_time_ms: f64,
        timestamp_ns: u64,
        trial_override: Option<S>,
    ) -> Resolution {
        let Some(run) = self.run.as_mut() else {
            return Resolution::Ignored(IgnoreReason::NoActiveTrial);
        };
        if !run.mark_resolved() {
            return Resolution::Ignored(IgnoreReason::AlreadyResolved);
        }
        for id in run.take_timers() {
            self.scheduler.cancel(id);
        }
        let (block, index, phase_index, serial) = (run.block, run.index, run.phase_index, run.serial);
        let trial = trial_override.unwrap_or_else(|| run.trial.clone());
        self.awaiting_response = false;
        self.show_stimulus = false;

        if let Some(spec) = self.config.phases.get(phase_index).cloned() {
            if let Err(err) = self.hooks.on_phase_end(&spec, phase_index, &trial, block) {
                hook_failed("on_phase_end", &err);
            }
        }

        let is_correct = trial.judge(&response);
        debug!(
            %block,
            trial_number = index + 1,
            %response,
            reaction_time_ms,
            ?is_correct,
            "trial resolved"
        );
        let result = TrialResult {
            trial_number: index + 1,
            phase: block,
            response,
            reaction_time_ms,
            is_correct,
            trial: trial.clone(),
            timestamp_ns,
            session_id: self.session.session_id.clone(),
            participant_id: self.session.participant_id.clone(),
        };
        self.emit(result, &trial, index, block, serial)
    }

    fn emit(
        &mut self,
        result: TrialResult<S>,
        trial: &S,
        index: usize,
        block: Block,
        serial: u64,
    ) -> Resolution {
        let result = match self.hooks.on_trial_end(&result, trial, index, block) {
            Ok(Some(replaced)) => replaced,
            Ok(None) => result,
            Err(err) => {
                hook_failed("on_trial_end", &err);
                result
            }
        };
        match block {
            Block::Practice => self.practice_results.push(result),
            Block::Task => self.results.push(result),
        }

        self.advancing = true;
        let now = self.timer.now();
        self.scheduler.schedule_after(
            now,
            Duration::from_millis(self.config.inter_trial.for_block(block)),
            ExperimentEvent::InterTrialElapsed { serial },
        );
        Resolution::Recorded {
            trial_number: index + 1,
        }
    }

    fn on_inter_trial_elapsed(&mut self, serial: u64) {
        if !self.run.as_ref().is_some_and(|run| run.serial == serial) {
            trace!(serial, "stale inter-trial timer");
            return;
        }
        self.advancing = false;
        if self.current_trial_index + 1 < self.block_len() {
            self.current_trial_index += 1;
            self.advance();
        } else {
            self.complete_block();
        }
    }

    fn complete_block(&mut self) {
        let (Some(block), Some(next)) = (self.block_phase.block(), self.block_phase.completed())
        else {
            return;
        };
        self.block_phase = next;
        self.run = None;
        self.advancing = false;
        self.show_stimulus = false;
        self.awaiting_response = false;

        match block {
            Block::Practice => {
                info!(%block, results = self.practice_results.len(), "block complete");
                if let Err(err) = self.hooks.on_block_complete(block, &self.practice_results) {
                    hook_failed("on_block_complete", &err);
                }
            }
            Block::Task => {
                info!(%block, results = self.results.len(), "block complete");
                if let Err(err) = self.hooks.on_block_complete(block, &self.results) {
                    hook_failed("on_block_complete", &err);
                }
                if let Err(err) = self
                    .hooks
                    .on_experiment_complete(&self.results, &self.practice_results)
                {
                    hook_failed("on_experiment_complete", &err);
                }
            }
        }
    }

    /// Trials the active block will run: the configured count, cut short
    /// if the catalog holds fewer.
    fn block_len(&self) -> usize {
        self.block_phase.block().map_or(0, |block| {
            self.config
                .trial_count(block)
                .min(self.catalog.block(block).len())
        })
    }

    pub fn block_phase(&self) -> BlockPhase {
        self.block_phase
    }

    pub fn current_trial_index(&self) -> usize {
        self.current_trial_index
    }

    /// Trial definition at the current index of the active block.
    pub fn current_trial(&self) -> Option<&S> {
        let block = self.block_phase.block()?;
        self.catalog.block(block).get(self.current_trial_index)
    }

    pub fn current_phase(&self) -> Option<&PhaseSpec> {
        let run = self.run.as_ref().filter(|run| !run.is_resolved())?;
        self.config.phases.get(run.phase_index)
    }

    pub fn is_trial_running(&self) -> bool {
        self.run.as_ref().is_some_and(|run| !run.is_resolved())
    }

    pub fn show_stimulus(&self) -> bool {
        self.show_stimulus
    }

    pub fn awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    /// Timestamp reaction times for the running trial are measured from.
    pub fn response_onset_ns(&self) -> Option<u64> {
        let run = self.run.as_ref().filter(|run| !run.is_resolved())?;
        match self.config.onset {
            OnsetMode::PhaseStart => run.timestamps.response_window,
            OnsetMode::Manual => run
                .timestamps
                .manual_onset
                .or(run.timestamps.response_window),
        }
    }

    pub fn results(&self) -> &[TrialResult<S>] {
        &self.results
    }

    pub fn practice_results(&self) -> &[TrialResult<S>] {
        &self.practice_results
    }

    pub fn trial_progress(&self) -> Option<(usize, usize)> {
        self.block_phase
            .block()
            .map(|_| (self.current_trial_index + 1, self.block_len()))
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn drift_stats(&self) -> DriftStats {
        self.drift.stats()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn into_hooks(self) -> H {
        self.hooks
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}

fn hook_failed(hook: &'static str, err: &HookError) {
    warn!(hook, error = %err, "hook failed, continuing");
}
