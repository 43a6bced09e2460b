// StrikeBox - Button Input Debouncer
//
// Turns raw pin levels into clean Pressed/Released events. A new level is
// only accepted after it has been stable for the settle window. Polled at
// ~100 Hz from the control loop.

use crate::events::{ButtonId, Edge, PressEvent};
use crate::hal::RawButtons;

/// Electrical wiring of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Pin reads HIGH while pressed (pull-down wiring).
    ActiveHigh,
    /// Pin reads LOW while pressed (pull-up wiring).
    ActiveLow,
}

impl Polarity {
    pub fn is_pressed(self, level_high: bool) -> bool {
        match self {
            Self::ActiveHigh => level_high,
            Self::ActiveLow => !level_high,
        }
    }
}

pub struct Debouncer {
    button: ButtonId,
    polarity: Polarity,
    settle_ms: u32,

    // Last accepted logical state
    stable_pressed: bool,
    // Raw logical state being observed and when it first appeared
    candidate_pressed: bool,
    candidate_since: u32,
}

impl Debouncer {
    pub fn new(button: ButtonId, polarity: Polarity, settle_ms: u32) -> Self {
        Self {
            button,
            polarity,
            settle_ms,
            stable_pressed: false,
            candidate_pressed: false,
            candidate_since: 0,
        }
    }

    /// Feed one raw level sample. Returns an event once a changed level has
    /// held for the full settle window.
    pub fn update(&mut self, level_high: bool, now: u32) -> Option<PressEvent> {
        let pressed = self.polarity.is_pressed(level_high);

        if pressed != self.candidate_pressed {
            // Level moved: restart the settle window.
            self.candidate_pressed = pressed;
            self.candidate_since = now;
            return None;
        }

        if pressed == self.stable_pressed {
            return None;
        }

        if now.wrapping_sub(self.candidate_since) < self.settle_ms {
            return None;
        }

        self.stable_pressed = pressed;
        Some(PressEvent {
            button: self.button,
            edge: if pressed { Edge::Pressed } else { Edge::Released },
            at: self.candidate_since,
        })
    }

    pub fn is_pressed(&self) -> bool {
        self.stable_pressed
    }
}

/// Both debouncers, sampled together once per control-loop iteration.
pub struct ButtonBank {
    debouncers: [Debouncer; 2],
}

impl ButtonBank {
    pub fn new(polarity: [Polarity; 2], settle_ms: u32) -> Self {
        Self {
            debouncers: ButtonId::ALL.map(|b| Debouncer::new(b, polarity[b.index()], settle_ms)),
        }
    }

    /// Sample both pins. At most one event per button per call.
    pub fn sample<B: RawButtons>(&mut self, pins: &mut B, now: u32) -> [Option<PressEvent>; 2] {
        ButtonId::ALL.map(|b| self.debouncers[b.index()].update(pins.is_high(b), now))
    }

    pub fn chord(&self) -> bool {
        self.debouncers.iter().all(Debouncer::is_pressed)
    }
}
