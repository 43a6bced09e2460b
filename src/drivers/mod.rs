// StrikeBox - ESP-IDF bindings for the session collaborators

pub mod imu;
pub mod neopixel;
pub mod tm1637;

use std::thread;
use std::time::Duration;

use esp_idf_hal::gpio::{AnyIOPin, Input, PinDriver};

use strikebox::events::ButtonId;
use strikebox::hal::{Clock, RawButtons};

/// The two pulled-up push buttons.
pub struct GpioButtons<'d> {
    increment: PinDriver<'d, AnyIOPin, Input>,
    decrement: PinDriver<'d, AnyIOPin, Input>,
}

impl<'d> GpioButtons<'d> {
    pub fn new(
        increment: PinDriver<'d, AnyIOPin, Input>,
        decrement: PinDriver<'d, AnyIOPin, Input>,
    ) -> Self {
        Self { increment, decrement }
    }
}

impl RawButtons for GpioButtons<'_> {
    fn is_high(&mut self, button: ButtonId) -> bool {
        match button {
            ButtonId::Increment => self.increment.is_high(),
            ButtonId::Decrement => self.decrement.is_high(),
        }
    }
}

/// Milliseconds since boot; delays park the calling FreeRTOS task.
pub struct EspClock;

impl Clock for EspClock {
    fn now_ms(&self) -> u32 {
        // Wraps at ~49 days, callers compare with `wrapping_sub`.
        unsafe { (esp_idf_sys::esp_timer_get_time() / 1000) as u32 }
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
