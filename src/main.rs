// StrikeBox - Firmware Entry Point
//
// Boot sequence:
//   1. Bring up the MPU6050, TM1637 display, pixel ring and both buttons.
//   2. Greeting: all segments, "OLA", palette cycle, sensor self test.
//   3. Menu: tap/hold to set the duration, hold both buttons to start.
//   4. Countdown, active strike counting, results, back to the menu.
//
// Everything after step 1 lives in the `strikebox` library; this file only
// wires the ESP-IDF drivers into it.

#[cfg(target_os = "espidf")]
mod drivers;

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use std::thread;
    use std::time::Duration;

    use esp_idf_hal::gpio::{IOPin, OutputPin, PinDriver, Pull};
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;
    use esp_idf_hal::rmt::config::TransmitConfig;
    use esp_idf_hal::rmt::TxRmtDriver;

    use strikebox::config::*;
    use strikebox::hal::{NumericDisplay, GLYPHS_ERROR};
    use strikebox::{Board, SessionConfig, SessionController};

    use crate::drivers::imu::Mpu6050;
    use crate::drivers::neopixel::NeoPixel;
    use crate::drivers::tm1637::Tm1637;
    use crate::drivers::{EspClock, GpioButtons};

    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("StrikeBox firmware starting…");

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;

    // Buttons: pull-up, active LOW.
    let mut increment = PinDriver::input(peripherals.pins.gpio19.downgrade())?;
    increment.set_pull(Pull::Up)?;
    let mut decrement = PinDriver::input(peripherals.pins.gpio18.downgrade())?;
    decrement.set_pull(Pull::Up)?;
    log::info!(
        "Buttons on GPIO{} (+) / GPIO{} (-)",
        PIN_BUTTON_INCREMENT,
        PIN_BUTTON_DECREMENT
    );

    // MPU6050 on its own I2C bus.
    let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21, // SDA
        peripherals.pins.gpio22, // SCL
        &i2c_config,
    )?;
    log::info!("MPU6050 on I2C0 SDA GPIO{} / SCL GPIO{}", PIN_I2C_SDA, PIN_I2C_SCL);
    let mut imu = Mpu6050::new(i2c);
    if !imu.is_connected() {
        log::error!("MPU6050 not answering at 0x{:02X}", I2C_ADDR_MPU6050);
    }
    imu.init()?;

    // TM1637: CLK push-pull, DIO open-drain.
    let clk = PinDriver::output(peripherals.pins.gpio13.downgrade_output())?;
    let dio = PinDriver::input_output_od(peripherals.pins.gpio14.downgrade())?;
    let display = Tm1637::new(clk, dio);
    log::info!("TM1637 on CLK GPIO{} / DIO GPIO{}", PIN_DISPLAY_CLK, PIN_DISPLAY_DIO);

    // WS2812 ring on RMT channel 0.
    let rmt_config = TransmitConfig::new().clock_divider(1);
    let tx = TxRmtDriver::new(peripherals.rmt.channel0, peripherals.pins.gpio27, &rmt_config)?;
    let pixels = NeoPixel::new(tx)?;
    log::info!("{} pixels on GPIO{}", PIXEL_COUNT, PIN_PIXELS);

    let board = Board {
        sensor: imu,
        display,
        pixels,
        buttons: GpioButtons::new(increment, decrement),
        clock: EspClock,
    };

    // ---- Session ----------------------------------------------------------
    let mut controller = SessionController::new(board, SessionConfig::default());

    if let Err(fault) = controller.power_on().and_then(|_| controller.run()) {
        log::error!("Fatal fault, halting: {:#}", fault);
        let _ = controller.board_mut().display.show_glyphs(GLYPHS_ERROR);
    }

    // Nothing recovers from a hardware fault short of a reset.
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("strikebox is firmware for xtensa-esp32-espidf; on the host run `cargo test --lib`");
}
