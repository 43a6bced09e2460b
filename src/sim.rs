// StrikeBox - Host Simulation Fakes (tests only)
//
// Every fake shares one millisecond counter, so delays inside blocking
// sequences move the button script and sensor script forward as well.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::anyhow;
use embedded_graphics::pixelcolor::Rgb888;

use crate::events::{Acceleration, ButtonId};
use crate::hal::{Board, Clock, MotionSensor, NumericDisplay, PixelStrip, RawButtons};

pub const GRAVITY: f32 = 9.806_65;

pub type SimBoard = Board<ScriptedSensor, RecordingDisplay, RecordingPixels, ScriptedButtons, FakeClock>;

pub fn board() -> SimBoard {
    let time = Rc::new(Cell::new(0));
    Board {
        sensor: ScriptedSensor { time: Rc::clone(&time), spikes: Vec::new(), fail_from: None, reads: 0 },
        display: RecordingDisplay::default(),
        pixels: RecordingPixels::default(),
        buttons: ScriptedButtons { time: Rc::clone(&time), holds: Vec::new() },
        clock: FakeClock { time },
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------
pub struct FakeClock {
    time: Rc<Cell<u32>>,
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u32 {
        self.time.get()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.time.set(self.time.get().wrapping_add(ms));
    }
}

// ---------------------------------------------------------------------------
// Buttons (active LOW, like the real board)
// ---------------------------------------------------------------------------
pub struct ScriptedButtons {
    time: Rc<Cell<u32>>,
    holds: Vec<(ButtonId, u32, u32)>,
}

impl ScriptedButtons {
    /// Hold `button` down over `[from, until)`.
    pub fn hold(&mut self, button: ButtonId, from: u32, until: u32) {
        self.holds.push((button, from, until));
    }
}

impl RawButtons for ScriptedButtons {
    fn is_high(&mut self, button: ButtonId) -> bool {
        let now = self.time.get();
        !self
            .holds
            .iter()
            .any(|&(b, from, until)| b == button && (from..until).contains(&now))
    }
}

// ---------------------------------------------------------------------------
// Motion sensor
// ---------------------------------------------------------------------------
pub struct ScriptedSensor {
    time: Rc<Cell<u32>>,
    spikes: Vec<(u32, u32, f32)>,
    fail_from: Option<u32>,
    pub reads: usize,
}

impl ScriptedSensor {
    /// Report `magnitude` on the X axis over `[from, until)`; gravity otherwise.
    pub fn spike(&mut self, from: u32, until: u32, magnitude: f32) {
        self.spikes.push((from, until, magnitude));
    }

    pub fn fail_from(&mut self, at: u32) {
        self.fail_from = Some(at);
    }
}

impl MotionSensor for ScriptedSensor {
    fn read_acceleration(&mut self) -> anyhow::Result<Acceleration> {
        let now = self.time.get();
        self.reads += 1;
        if self.fail_from.is_some_and(|at| now >= at) {
            return Err(anyhow!("i2c bus timeout"));
        }
        let spike = self
            .spikes
            .iter()
            .find(|&&(from, until, _)| (from..until).contains(&now));
        Ok(match spike {
            Some(&(_, _, magnitude)) => Acceleration { x: magnitude, y: 0.0, z: 0.0 },
            None => Acceleration { x: 0.0, y: 0.0, z: GRAVITY },
        })
    }
}

// ---------------------------------------------------------------------------
// Display & pixels
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shown {
    Number(u16),
    Glyphs([u8; 4]),
}

#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub log: Vec<Shown>,
    pub brightness: Option<u8>,
}

impl RecordingDisplay {
    pub fn numbers(&self) -> Vec<u16> {
        self.log
            .iter()
            .filter_map(|s| match s {
                Shown::Number(n) => Some(*n),
                Shown::Glyphs(_) => None,
            })
            .collect()
    }

    pub fn last(&self) -> Option<Shown> {
        self.log.last().copied()
    }
}

impl NumericDisplay for RecordingDisplay {
    fn show_number(&mut self, value: u16) -> anyhow::Result<()> {
        self.log.push(Shown::Number(value));
        Ok(())
    }

    fn show_glyphs(&mut self, segments: [u8; 4]) -> anyhow::Result<()> {
        self.log.push(Shown::Glyphs(segments));
        Ok(())
    }

    fn set_brightness(&mut self, level: u8) -> anyhow::Result<()> {
        self.brightness = Some(level);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingPixels {
    staged: Option<Rgb888>,
    pub flushed: Vec<Rgb888>,
}

impl RecordingPixels {
    pub fn lit(&self) -> Option<Rgb888> {
        self.flushed.last().copied()
    }
}

impl PixelStrip for RecordingPixels {
    fn set_all(&mut self, color: Rgb888) {
        self.staged = Some(color);
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        if let Some(color) = self.staged.take() {
            self.flushed.push(color);
        }
        Ok(())
    }
}
