// StrikeBox - Strike Sampler
//
// Runs on every sampler tick while a session is active:
//   1. threshold + refractory peak detection on the acceleration magnitude
//   2. duration pacing: one second off the clock every `ticks_per_second`
//
// A punch spans several consecutive samples above the threshold. The
// refractory window is what keeps it from counting more than once; it is a
// minimum spacing between counted strikes, not a filter on the signal.

use crate::config::{SessionConfig, MAX_STRIKES};
use crate::duration::DurationStore;
use crate::events::AccelSample;

/// Saturating strike counter, 0..=MAX_STRIKES.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrikeCount(u16);

impl StrikeCount {
    pub fn get(self) -> u16 {
        self.0
    }

    fn increment(&mut self) {
        self.0 = self.0.saturating_add(1).min(MAX_STRIKES);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefractoryState {
    pub last_strike_at: u32,
}

#[derive(Debug)]
pub struct StrikeDetector {
    threshold: f32,
    refractory_ms: u32,
    // None until the first strike of the session.
    refractory: Option<RefractoryState>,
}

impl StrikeDetector {
    pub fn new(threshold: f32, refractory_ms: u32) -> Self {
        Self { threshold, refractory_ms, refractory: None }
    }

    /// Returns true when `sample` is a new strike.
    pub fn detect(&mut self, sample: &AccelSample, now: u32) -> bool {
        if sample.magnitude <= self.threshold {
            return false;
        }
        let clear = self
            .refractory
            .map_or(true, |r| now.wrapping_sub(r.last_strike_at) > self.refractory_ms);
        if clear {
            self.refractory = Some(RefractoryState { last_strike_at: now });
        }
        clear
    }
}

/// What one tick changed, for the controller to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Strike count after a newly detected strike.
    pub strike: Option<StrikeCount>,
    /// Remaining seconds after a duration decrement.
    pub remaining: Option<u16>,
    pub expired: bool,
}

#[derive(Debug)]
pub struct StrikeSampler {
    detector: StrikeDetector,
    ticks_per_second: u32,
    ticks: u32,
}

impl StrikeSampler {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            detector: StrikeDetector::new(config.strike_threshold, config.refractory_ms),
            ticks_per_second: config.sampling.ticks_per_second().max(1),
            ticks: 0,
        }
    }

    pub fn tick(
        &mut self,
        sample: &AccelSample,
        now: u32,
        strikes: &mut StrikeCount,
        duration: &mut DurationStore,
    ) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if self.detector.detect(sample, now) {
            strikes.increment();
            outcome.strike = Some(*strikes);
            log::debug!("Strike {} (|a| = {:.1})", strikes.get(), sample.magnitude);
        }

        self.ticks += 1;
        if self.ticks >= self.ticks_per_second && !duration.is_expired() {
            self.ticks = 0;
            outcome.remaining = Some(duration.adjust(-1));
        }

        outcome.expired = duration.is_expired();
        outcome
    }
}
