// StrikeBox - WS2812 Pixel Ring Driver
//
// Drives the ring through the RMT peripheral. The whole ring always shows
// one color, so only that color is staged between flushes.

use std::time::Duration;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use esp_idf_hal::rmt::{PinState, Pulse, TxRmtDriver, VariableLengthSignal};

use strikebox::config::PIXEL_COUNT;
use strikebox::hal::PixelStrip;

pub struct NeoPixel<'d> {
    tx: TxRmtDriver<'d>,
    // (high, low) pulse pairs for a 0 bit and a 1 bit
    zero: [Pulse; 2],
    one: [Pulse; 2],
    staged: Rgb888,
}

impl<'d> NeoPixel<'d> {
    pub fn new(tx: TxRmtDriver<'d>) -> anyhow::Result<Self> {
        let ticks_hz = tx.counter_clock()?;
        let pulse = |state, ns| Pulse::new_with_duration(ticks_hz, state, &Duration::from_nanos(ns));
        Ok(Self {
            zero: [pulse(PinState::High, 350)?, pulse(PinState::Low, 800)?],
            one: [pulse(PinState::High, 700)?, pulse(PinState::Low, 600)?],
            tx,
            staged: Rgb888::new(0, 0, 0),
        })
    }
}

impl PixelStrip for NeoPixel<'_> {
    fn set_all(&mut self, color: Rgb888) {
        self.staged = color;
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        // WS2812 wire order is G, R, B, most significant bit first.
        let c = self.staged;
        let grb = (u32::from(c.g()) << 16) | (u32::from(c.r()) << 8) | u32::from(c.b());

        let mut signal = VariableLengthSignal::new();
        for _ in 0..PIXEL_COUNT {
            for bit in (0..24).rev() {
                let pulses = if grb & (1 << bit) != 0 { &self.one } else { &self.zero };
                signal.push(pulses)?;
            }
        }
        self.tx.start_blocking(&signal)?;
        Ok(())
    }
}
