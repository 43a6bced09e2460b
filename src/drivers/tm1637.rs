// StrikeBox - TM1637 4-Digit Display Driver
//
// Bit-banged two-wire protocol (start, LSB-first bytes with ACK clock, stop).
// DIO is open-drain with the module's pull-up.

use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, InputOutput, Output, PinDriver};

use strikebox::config::DISPLAY_DIGITS;
use strikebox::hal::NumericDisplay;

const CMD_DATA_AUTO_INCREMENT: u8 = 0x40;
const CMD_ADDRESS_FIRST_DIGIT: u8 = 0xC0;
const CMD_DISPLAY_ON: u8 = 0x88; // | brightness (0..=7)
const BIT_DELAY_US: u32 = 5;

/// Segment codes for 0-9 (bit 0 = A ... bit 6 = G).
const DIGITS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];

pub struct Tm1637<'d> {
    clk: PinDriver<'d, AnyOutputPin, Output>,
    dio: PinDriver<'d, AnyIOPin, InputOutput>,
    brightness: u8,
}

impl<'d> Tm1637<'d> {
    pub fn new(
        clk: PinDriver<'d, AnyOutputPin, Output>,
        dio: PinDriver<'d, AnyIOPin, InputOutput>,
    ) -> Self {
        Self { clk, dio, brightness: 7 }
    }

    fn start(&mut self) -> anyhow::Result<()> {
        self.dio.set_high()?;
        self.clk.set_high()?;
        Ets::delay_us(BIT_DELAY_US);
        self.dio.set_low()?;
        Ets::delay_us(BIT_DELAY_US);
        self.clk.set_low()?;
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        self.clk.set_low()?;
        self.dio.set_low()?;
        Ets::delay_us(BIT_DELAY_US);
        self.clk.set_high()?;
        Ets::delay_us(BIT_DELAY_US);
        self.dio.set_high()?;
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> anyhow::Result<()> {
        for bit in 0..8 {
            self.clk.set_low()?;
            if byte & (1 << bit) != 0 {
                self.dio.set_high()?;
            } else {
                self.dio.set_low()?;
            }
            Ets::delay_us(BIT_DELAY_US);
            self.clk.set_high()?;
            Ets::delay_us(BIT_DELAY_US);
        }

        // ACK clock; the chip pulls DIO low, we don't check it.
        self.clk.set_low()?;
        self.dio.set_high()?;
        Ets::delay_us(BIT_DELAY_US);
        self.clk.set_high()?;
        Ets::delay_us(BIT_DELAY_US);
        self.clk.set_low()?;
        Ok(())
    }

    fn command(&mut self, cmd: u8) -> anyhow::Result<()> {
        self.start()?;
        self.write_byte(cmd)?;
        self.stop()
    }

    fn write_segments(&mut self, segments: [u8; DISPLAY_DIGITS]) -> anyhow::Result<()> {
        self.command(CMD_DATA_AUTO_INCREMENT)?;

        self.start()?;
        self.write_byte(CMD_ADDRESS_FIRST_DIGIT)?;
        for seg in segments {
            self.write_byte(seg)?;
        }
        self.stop()?;

        self.command(CMD_DISPLAY_ON | self.brightness)
    }
}

/// Right-aligned decimal with blank leading digits ("  60").
fn render_number(value: u16) -> [u8; DISPLAY_DIGITS] {
    let mut segments = [0u8; DISPLAY_DIGITS];
    let mut rest = value.min(9999);
    for slot in segments.iter_mut().rev() {
        *slot = DIGITS[usize::from(rest % 10)];
        rest /= 10;
        if rest == 0 {
            break;
        }
    }
    segments
}

impl NumericDisplay for Tm1637<'_> {
    fn show_number(&mut self, value: u16) -> anyhow::Result<()> {
        self.write_segments(render_number(value))
    }

    fn show_glyphs(&mut self, segments: [u8; 4]) -> anyhow::Result<()> {
        self.write_segments(segments)
    }

    fn set_brightness(&mut self, level: u8) -> anyhow::Result<()> {
        self.brightness = level.min(7);
        self.command(CMD_DISPLAY_ON | self.brightness)
    }
}
