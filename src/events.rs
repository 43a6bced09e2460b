// StrikeBox - Session Events & Data Types

use crate::config::{COARSE_STEP, FINE_STEP};

// ---------------------------------------------------------------------------
// Buttons
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonId {
    Increment,
    Decrement,
}

impl ButtonId {
    pub const ALL: [ButtonId; 2] = [ButtonId::Increment, ButtonId::Decrement];

    /// Stable slot index for per-button tables.
    pub fn index(self) -> usize {
        match self {
            Self::Increment => 0,
            Self::Decrement => 1,
        }
    }

    /// +1 for Increment, -1 for Decrement.
    pub fn direction(self) -> i32 {
        match self {
            Self::Increment => 1,
            Self::Decrement => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Pressed,
    Released,
}

/// Debounced transition of one button. `at` is when the new level first
/// appeared, so press durations are not skewed by the settle window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressEvent {
    pub button: ButtonId,
    pub edge: Edge,
    pub at: u32,
}

// ---------------------------------------------------------------------------
// User intents produced by the press classifier
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Fine,
    Coarse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustIntent {
    pub button: ButtonId,
    pub step: Step,
}

impl AdjustIntent {
    pub fn delta(&self) -> i32 {
        let size = match self.step {
            Step::Fine => FINE_STEP,
            Step::Coarse => COARSE_STEP,
        };
        size * self.button.direction()
    }
}

// ---------------------------------------------------------------------------
// Motion data
// ---------------------------------------------------------------------------

/// Raw 3-axis reading in m/s², as delivered by the motion sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Acceleration {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// One sampler reading with its precomputed magnitude. Lives for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub magnitude: f32,
}

impl From<Acceleration> for AccelSample {
    fn from(a: Acceleration) -> Self {
        Self {
            x: a.x,
            y: a.y,
            z: a.z,
            magnitude: (a.x * a.x + a.y * a.y + a.z * a.z).sqrt(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session phase
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Menu,
    Countdown,
    Active,
    Results,
}

impl SessionPhase {
    /// The only legal edges of the session state machine.
    pub fn can_enter(self, next: SessionPhase) -> bool {
        matches!(
            (self, next),
            (Self::Menu, Self::Countdown)
                | (Self::Countdown, Self::Active)
                | (Self::Active, Self::Results)
                | (Self::Results, Self::Menu)
        )
    }
}
