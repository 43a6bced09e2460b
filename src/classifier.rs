// StrikeBox - Press Classifier
//
// Turns debounced press/release events into duration adjustments:
//   - tap (25..500 ms)        -> one fine step on release
//   - hold past the tap window -> auto-repeat every 200 ms, fine steps
//   - hold longer than 3 s    -> auto-repeat switches to coarse steps
//
// The classifier decides *when* the repeat timer should run; the session
// controller owns the timer itself.

use crate::config::{COARSE_AFTER_MS, REPEAT_PERIOD_MS, TAP_MAX_MS, TAP_MIN_MS};
use crate::events::{AdjustIntent, ButtonId, Edge, PressEvent, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressState {
    pub is_down: bool,
    pub press_started_at: u32,
    pub repeat_timer_active: bool,
    /// Set once a repeat tick has adjusted the duration for this press.
    pub repeated: bool,
}

/// What the controller must do with the repeat timer after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatTimer {
    Arm { period_ms: u32 },
    Disarm,
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierAction {
    pub repeat: RepeatTimer,
    pub intent: Option<AdjustIntent>,
}

impl ClassifierAction {
    const NONE: Self = Self { repeat: RepeatTimer::Unchanged, intent: None };
}

#[derive(Debug, Default)]
pub struct PressClassifier {
    // Created on first press, one slot per button.
    states: [Option<PressState>; 2],
}

impl PressClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, button: ButtonId) -> Option<&PressState> {
        self.states[button.index()].as_ref()
    }

    pub fn on_event(&mut self, event: PressEvent) -> ClassifierAction {
        let slot = &mut self.states[event.button.index()];

        match event.edge {
            Edge::Pressed => {
                *slot = Some(PressState {
                    is_down: true,
                    press_started_at: event.at,
                    repeat_timer_active: true,
                    repeated: false,
                });
                ClassifierAction {
                    repeat: RepeatTimer::Arm { period_ms: REPEAT_PERIOD_MS },
                    intent: None,
                }
            }
            Edge::Released => {
                let Some(state) = slot.as_mut().filter(|s| s.is_down) else {
                    // Press was not seen (suppressed by a chord or began
                    // outside the menu); nothing to classify.
                    return ClassifierAction::NONE;
                };
                state.is_down = false;
                state.repeat_timer_active = false;

                let held = event.at.wrapping_sub(state.press_started_at);
                let intent = (!state.repeated && (TAP_MIN_MS..TAP_MAX_MS).contains(&held))
                    .then_some(AdjustIntent { button: event.button, step: Step::Fine });

                ClassifierAction { repeat: RepeatTimer::Disarm, intent }
            }
        }
    }

    /// Periodic repeat tick for a held button.
    ///
    /// Ticks inside the tap window are swallowed: the press may still turn
    /// out to be a tap, which is counted once on release.
    pub fn handle_long_press(&mut self, button: ButtonId, now: u32) -> Option<AdjustIntent> {
        let state = self.states[button.index()]
            .as_mut()
            .filter(|s| s.is_down && s.repeat_timer_active)?;

        let elapsed = now.wrapping_sub(state.press_started_at);
        if elapsed < TAP_MAX_MS {
            return None;
        }
        state.repeated = true;
        let step = if elapsed > COARSE_AFTER_MS { Step::Coarse } else { Step::Fine };
        Some(AdjustIntent { button, step })
    }

    /// Forget any press in progress. Releases of those presses are ignored.
    pub fn abort_all(&mut self) {
        for state in self.states.iter_mut().flatten() {
            state.is_down = false;
            state.repeat_timer_active = false;
        }
    }
}
