use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Handle to a scheduled callback, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A callback that came due.
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled<E> {
    pub id: TimerId,
    pub deadline_ns: u64,
    pub event: E,
}

/// Single-threaded queue of cancellable timed events.
///
/// Events fire in deadline order; events sharing a deadline fire in the
/// order they were scheduled.
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    queue: BTreeMap<(u64, TimerId), E>,
    deadlines: HashMap<TimerId, u64>,
    next_id: u64,
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn schedule_at(&mut self, deadline_ns: u64, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.queue.insert((deadline_ns, id), event);
        self.deadlines.insert(id, deadline_ns);
        id
    }

    pub fn schedule_after(&mut self, now_ns: u64, delay: Duration, event: E) -> TimerId {
        let delay_ns = u64::try_from(delay.as_nanos()).unwrap_or(u64::MAX);
        self.schedule_at(now_ns.saturating_add(delay_ns), event)
    }

    /// Returns false if the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.queue.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Removes and returns the earliest event due at `now_ns`.
    pub fn pop_due(&mut self, now_ns: u64) -> Option<Scheduled<E>> {
        let (&(deadline_ns, id), _) = self.queue.first_key_value()?;
        if deadline_ns > now_ns {
            return None;
        }
        let event = self.queue.remove(&(deadline_ns, id))?;
        self.deadlines.remove(&id);
        Some(Scheduled {
            id,
            deadline_ns,
            event,
        })
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.deadlines.clear();
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
