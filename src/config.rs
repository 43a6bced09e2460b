// StrikeBox - Hardware & Session Configuration
// Target: ESP32 DevKit (Xtensa), TM1637 display, WS2812 ring, MPU6050

use crate::input::Polarity;

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (ESP32 DevKit)
// ---------------------------------------------------------------------------
pub const PIN_BUTTON_DECREMENT: i32 = 18; // INPUT_PULLUP, active LOW
pub const PIN_BUTTON_INCREMENT: i32 = 19; // INPUT_PULLUP, active LOW
pub const PIN_I2C_SDA: i32 = 21;
pub const PIN_I2C_SCL: i32 = 22;
pub const PIN_DISPLAY_CLK: i32 = 13;
pub const PIN_DISPLAY_DIO: i32 = 14;
pub const PIN_PIXELS: i32 = 27;

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_MPU6050: u8 = 0x68;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Display (TM1637, 4 digits) & Pixel ring (WS2812)
// ---------------------------------------------------------------------------
pub const DISPLAY_DIGITS: usize = 4;
pub const DISPLAY_BRIGHTNESS: u8 = 4; // 0..=7
pub const PIXEL_COUNT: usize = 12;

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const POLL_INTERVAL_MS: u32 = 10;       // control loop cadence
pub const SETTLE_MS: u32 = 20;              // debounce settle window
pub const REPEAT_PERIOD_MS: u32 = 200;      // held-button auto repeat
pub const COARSE_AFTER_MS: u32 = 3000;      // hold length before ±5 steps
pub const TAP_MIN_MS: u32 = 25;
pub const TAP_MAX_MS: u32 = 500;            // exclusive
pub const CHORD_HOLD_MS: u32 = 500;         // both buttons, continuously
pub const SAMPLE_PERIOD_MS: u32 = 50;       // ~20 Hz strike sampling
pub const REFRACTORY_MS: u32 = 200;

pub const COUNTDOWN_LEAD_IN_MS: u32 = 1000;
pub const COUNTDOWN_STEP_MS: u32 = 1000;
pub const COUNTDOWN_BLANK_MS: u32 = 500;
pub const COUNTDOWN_BLINK_MS: u32 = 500;
pub const COUNTDOWN_BLINKS: u32 = 3;

pub const RESULTS_ALL_ON_MS: u32 = 2000;
pub const RESULTS_BLANK_MS: u32 = 1000;
pub const RESULTS_BLINK_MS: u32 = 500;
pub const RESULTS_BLINKS: u32 = 5;

pub const GREETING_ALL_ON_MS: u32 = 1000;
pub const GREETING_BLANK_MS: u32 = 500;
pub const GREETING_CUE_MS: u32 = 500;

// ---------------------------------------------------------------------------
// Session domain
// ---------------------------------------------------------------------------
pub const MAX_TIME: u16 = 999;              // seconds
pub const DEFAULT_DURATION: u16 = 60;       // seconds
pub const MAX_STRIKES: u16 = 999;
pub const FINE_STEP: i32 = 1;
pub const COARSE_STEP: i32 = 5;
pub const STRIKE_THRESHOLD: f32 = 30.0;     // m/s², accel range ±16 g

// ---------------------------------------------------------------------------
// MPU6050 Sensor Scale Factors
// ---------------------------------------------------------------------------
pub const ACCEL_SCALE_16G: f32 = 2048.0; // LSB/g at ±16 g
pub const STANDARD_GRAVITY: f32 = 9.806_65;

/// How often the strike sampler reads the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingMode {
    /// 50 ms ticks, duration paced every 20 ticks.
    #[default]
    Fine,
    /// One read per second, each tick also paces the duration.
    OncePerSecond,
}

impl SamplingMode {
    pub fn period_ms(self) -> u32 {
        match self {
            Self::Fine => SAMPLE_PERIOD_MS,
            Self::OncePerSecond => 1000,
        }
    }

    pub fn ticks_per_second(self) -> u32 {
        1000 / self.period_ms()
    }
}

/// Visuals played between the chord and the active window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountdownStyle {
    /// 3-2-1 with a palette cue per digit, then a short blank.
    #[default]
    ColorCues,
    /// 3-2-1, then the selected duration blinks three times.
    BlinkDuration,
}

/// Runtime knobs handed to the session controller.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub sampling: SamplingMode,
    pub countdown: CountdownStyle,
    pub strike_threshold: f32,
    pub refractory_ms: u32,
    pub settle_ms: u32,
    pub brightness: u8,
    pub polarity: [Polarity; 2],
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingMode::default(),
            countdown: CountdownStyle::default(),
            strike_threshold: STRIKE_THRESHOLD,
            refractory_ms: REFRACTORY_MS,
            settle_ms: SETTLE_MS,
            brightness: DISPLAY_BRIGHTNESS,
            // Both buttons are wired to ground with internal pull-ups.
            polarity: [Polarity::ActiveLow, Polarity::ActiveLow],
        }
    }
}
