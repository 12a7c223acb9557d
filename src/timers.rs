//! Virtual-clock timer queue.
//!
//! All page callbacks run on one thread. Timers carry a [`Task`] describing
//! what to do when they fire; the owner pops due tasks and dispatches them
//! one at a time, so every callback runs to completion before the next.

use crate::dom::ElementId;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Work scheduled on the page clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Remove a transient notification element
    DismissNotification(ElementId),
    /// Advance one statistics counter by one frame
    CounterTick(ElementId),
    /// Finish the simulated contact form submission
    CompleteContactSubmit(ElementId),
    /// Render the charts once their libraries have had time to load
    InitCharts,
}

#[derive(Debug)]
struct Entry {
    task: Task,
    /// `Some(period)` for repeating timers
    period: Option<u64>,
}

/// Single-threaded timer queue on a millisecond clock.
#[derive(Debug, Default)]
pub struct Timers {
    now_ms: u64,
    next_id: u64,
    seq: u64,
    queue: BinaryHeap<Reverse<(u64, u64, TimerId)>>,
    entries: HashMap<TimerId, Entry>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value in milliseconds since page load.
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    pub fn set_timeout(&mut self, delay: Duration, task: Task) -> TimerId {
        self.schedule(to_ms(delay), None, task)
    }

    /// Schedule a repeating timer. The caller must `clear` it once its work
    /// is done; a zero period is treated as one millisecond.
    pub fn set_interval(&mut self, period: Duration, task: Task) -> TimerId {
        let period = to_ms(period).max(1);
        self.schedule(period, Some(period), task)
    }

    fn schedule(&mut self, delay: u64, period: Option<u64>, task: Task) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, Entry { task, period });
        self.push(self.now_ms.saturating_add(delay), id);
        id
    }

    fn push(&mut self, due: u64, id: TimerId) {
        self.seq += 1;
        self.queue.push(Reverse((due, self.seq, id)));
    }

    /// Cancel a timer. Returns false if it already fired (one-shot) or was cleared.
    pub fn clear(&mut self, id: TimerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Pop the next timer due at or before `deadline`, moving the clock to its
    /// due time. Repeating timers are re-armed before being returned, so a
    /// `clear` from within the callback stops them.
    pub fn pop_due(&mut self, deadline: u64) -> Option<(TimerId, Task)> {
        loop {
            let Reverse((due, _, id)) = *self.queue.peek()?;
            if due > deadline {
                return None;
            }
            self.queue.pop();

            let Some(entry) = self.entries.get(&id) else {
                continue;
            };
            let task = entry.task.clone();
            let period = entry.period;
            self.now_ms = self.now_ms.max(due);

            match period {
                Some(period) => self.push(due.saturating_add(period), id),
                None => {
                    self.entries.remove(&id);
                }
            }
            return Some((id, task));
        }
    }

    /// Move the clock forward to `deadline` once no timers are left before it.
    pub fn settle(&mut self, deadline: u64) {
        self.now_ms = self.now_ms.max(deadline);
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn is_idle(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id)
    }
}

fn to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
