// StrikeBox - Strike-Counting Session Core
//
// Everything here is hardware independent and runs on the host:
//
//   input       raw pin levels -> debounced press/release events
//   classifier  press/release -> tap / auto-repeat duration adjustments
//   duration    clamped session length
//   strike      threshold + refractory strike detection, duration pacing
//   sequences   greeting, countdown and results visuals
//   timers      periodic software timers polled by the control loop
//   session     the Menu/Countdown/Active/Results state machine
//
// The firmware binary supplies ESP-IDF implementations of the `hal` traits.

pub mod classifier;
pub mod config;
pub mod duration;
pub mod events;
pub mod hal;
pub mod input;
pub mod sequences;
pub mod session;
pub mod strike;
pub mod timers;

#[cfg(test)]
pub(crate) mod sim;

pub use config::SessionConfig;
pub use hal::Board;
pub use session::SessionController;
