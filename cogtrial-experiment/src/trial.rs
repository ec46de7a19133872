use cogtrial_core::Block;
use cogtrial_timing::TimerId;

/// Trial definitions for both blocks, supplied by a task generator.
#[derive(Debug, Clone, Default)]
pub struct TrialCatalog<S> {
    pub practice: Vec<S>,
    pub main: Vec<S>,
}

impl<S> TrialCatalog<S> {
    pub fn new(practice: Vec<S>, main: Vec<S>) -> Self {
        Self { practice, main }
    }

    pub fn block(&self, block: Block) -> &[S] {
        match block {
            Block::Practice => &self.practice,
            Block::Task => &self.main,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrialTimestamps<T> {
    pub phase_start: T,
    /// Start of the first response-accepting phase.
    pub response_window: Option<T>,
    /// Onset reported by the task in manual mode.
    pub manual_onset: Option<T>,
}

/// Mutable state of the one trial that is currently running.
#[derive(Debug, Clone)]
pub struct TrialRunState<S> {
    pub serial: u64,
    pub index: usize,
    pub block: Block,
    pub trial: S,
    pub phase_index: usize,
    pub timestamps: TrialTimestamps<u64>,
    resolved: bool,
    timers: Vec<TimerId>,
}

impl<S> TrialRunState<S> {
    pub fn new(serial: u64, index: usize, block: Block, trial: S, now_ns: u64) -> Self {
        Self {
            serial,
            index,
            block,
            trial,
            phase_index: 0,
            timestamps: TrialTimestamps {
                phase_start: now_ns,
                response_window: None,
                manual_onset: None,
            },
            resolved: false,
            timers: Vec::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Sets the resolved flag. Returns false if it was already set.
    pub fn mark_resolved(&mut self) -> bool {
        !std::mem::replace(&mut self.resolved, true)
    }

    pub fn own_timer(&mut self, id: TimerId) {
        self.timers.push(id);
    }

    pub fn take_timers(&mut self) -> Vec<TimerId> {
        std::mem::take(&mut self.timers)
    }

    pub fn enter_phase(&mut self, phase_index: usize, now_ns: u64, accepts_responses: bool) {
        self.phase_index = phase_index;
        self.timestamps.phase_start = now_ns;
        if accepts_responses && self.timestamps.response_window.is_none() {
            self.timestamps.response_window = Some(now_ns);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_flag_is_single_use() {
        let mut run = TrialRunState::new(1, 0, Block::Practice, (), 0);
        assert!(!run.is_resolved());
        assert!(run.mark_resolved());
        assert!(!run.mark_resolved());
        assert!(run.is_resolved());
    }

    #[test]
    fn response_window_is_pinned_to_the_first_accepting_phase() {
        let mut run = TrialRunState::new(1, 0, Block::Task, (), 0);
        run.enter_phase(1, 500, false);
        assert_eq!(run.timestamps.response_window, None);
        run.enter_phase(2, 700, true);
        run.enter_phase(3, 900, true);
        assert_eq!(run.timestamps.response_window, Some(700));
        assert_eq!(run.timestamps.phase_start, 900);
        assert_eq!(run.phase_index, 3);
    }

    #[test]
    fn catalog_selects_block_lists() {
        let catalog = TrialCatalog::new(vec![1], vec![2, 3]);
        assert_eq!(catalog.block(Block::Practice), &[1]);
        assert_eq!(catalog.block(Block::Task), &[2, 3]);
    }
}
