// StrikeBox - Collaborator Interfaces
//
// The session core only talks to hardware through these traits. The ESP-IDF
// implementations live in `drivers`; tests use the fakes in `sim`.

use embedded_graphics::pixelcolor::Rgb888;

use crate::events::{Acceleration, ButtonId};

pub trait MotionSensor {
    fn read_acceleration(&mut self) -> anyhow::Result<Acceleration>;
}

/// 4-digit 7-segment display.
pub trait NumericDisplay {
    fn show_number(&mut self, value: u16) -> anyhow::Result<()>;
    /// Raw segment codes, leftmost digit first.
    fn show_glyphs(&mut self, segments: [u8; 4]) -> anyhow::Result<()>;
    fn set_brightness(&mut self, level: u8) -> anyhow::Result<()>;

    fn clear(&mut self) -> anyhow::Result<()> {
        self.show_glyphs([0; 4])
    }
}

pub trait PixelStrip {
    /// Stage one color for every pixel. Nothing is visible until `flush`.
    fn set_all(&mut self, color: Rgb888);
    fn flush(&mut self) -> anyhow::Result<()>;

    fn fill(&mut self, color: Rgb888) -> anyhow::Result<()> {
        self.set_all(color);
        self.flush()
    }
}

/// Instantaneous physical pin levels, before any debouncing.
pub trait RawButtons {
    fn is_high(&mut self, button: ButtonId) -> bool;
}

pub trait Clock {
    /// Monotonic milliseconds. Wraps after ~49 days; compare with `wrapping_sub`.
    fn now_ms(&self) -> u32;
    fn delay_ms(&mut self, ms: u32);
}

/// Everything the session controller drives, bundled so it can own them.
pub struct Board<S, D, P, B, C> {
    pub sensor: S,
    pub display: D,
    pub pixels: P,
    pub buttons: B,
    pub clock: C,
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// Green, blue, red. Used for countdown digits (3, 2, 1) and hit feedback.
pub const PALETTE: [Rgb888; 3] = [Rgb888::new(0, 255, 0), Rgb888::new(0, 0, 255), Rgb888::new(255, 0, 0)];
pub const OFF: Rgb888 = Rgb888::new(0, 0, 0);

// Segment codes (bit 0 = segment A ... bit 6 = segment G)
pub const GLYPHS_ALL_ON: [u8; 4] = [0x7F; 4];
pub const GLYPHS_BLANK: [u8; 4] = [0x00; 4];
/// "OLA " greeting.
pub const GLYPHS_GREETING: [u8; 4] = [0x3F, 0x38, 0x77, 0x00];
/// "Err " fault banner.
pub const GLYPHS_ERROR: [u8; 4] = [0x79, 0x50, 0x50, 0x00];
