// StrikeBox - Duration Store
//
// The selected session length in seconds, always within 0..=MAX_TIME. Every
// mutation goes through `adjust`, which saturates at both ends.

use crate::config::{DEFAULT_DURATION, MAX_TIME};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationStore {
    seconds: u16,
}

impl DurationStore {
    pub fn new() -> Self {
        Self { seconds: DEFAULT_DURATION }
    }

    pub fn seconds(&self) -> u16 {
        self.seconds
    }

    pub fn is_expired(&self) -> bool {
        self.seconds == 0
    }

    /// `duration = clamp(duration + delta, 0, MAX_TIME)`; returns the new value.
    pub fn adjust(&mut self, delta: i32) -> u16 {
        let next = i32::from(self.seconds).saturating_add(delta).clamp(0, i32::from(MAX_TIME));
        self.seconds = next as u16;
        self.seconds
    }

    pub fn reset(&mut self) -> u16 {
        self.adjust(i32::from(DEFAULT_DURATION) - i32::from(self.seconds))
    }
}

impl Default for DurationStore {
    fn default() -> Self {
        Self::new()
    }
}
