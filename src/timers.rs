// StrikeBox - Periodic Software Timers
//
// Deadlines polled from the control loop. Due timers come back as plain ids
// so the controller handles them as events; nothing runs in a callback.

use crate::events::ButtonId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerId {
    Sampler,
    Repeat(ButtonId),
}

impl TimerId {
    fn slot(self) -> usize {
        match self {
            Self::Sampler => 0,
            Self::Repeat(button) => 1 + button.index(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    id: TimerId,
    period_ms: u32,
    next_due: u32,
}

#[derive(Debug, Default)]
pub struct TimerSet {
    slots: [Option<Armed>; 3],
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)arm `id`; first expiry is one period after `now`.
    pub fn arm(&mut self, id: TimerId, now: u32, period_ms: u32) {
        self.slots[id.slot()] = Some(Armed {
            id,
            period_ms,
            next_due: now.wrapping_add(period_ms),
        });
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.slots[id.slot()] = None;
    }

    pub fn cancel_all(&mut self) {
        self.slots = [None; 3];
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.slots[id.slot()].is_some()
    }

    pub fn armed_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Pop the most overdue timer, if any, and schedule its next expiry.
    /// Call in a loop to drain; a late poll yields every missed period.
    pub fn pop_due(&mut self, now: u32) -> Option<TimerId> {
        let slot = self
            .slots
            .iter_mut()
            .flatten()
            .filter(|t| is_due(t.next_due, now))
            .max_by_key(|t| now.wrapping_sub(t.next_due))?;

        slot.next_due = slot.next_due.wrapping_add(slot.period_ms);
        Some(slot.id)
    }
}

// Deadlines are never more than half the counter range ahead.
fn is_due(deadline: u32, now: u32) -> bool {
    now.wrapping_sub(deadline) < u32::MAX / 2
}
