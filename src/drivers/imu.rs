// StrikeBox - MPU6050 Accelerometer Driver
//
// Register-level driver on a dedicated I2C bus. Only the accelerometer is
// used; readings are converted to m/s² at the ±16 g range.

use esp_idf_hal::i2c::I2cDriver;

use strikebox::config::*;
use strikebox::events::Acceleration;
use strikebox::hal::MotionSensor;

// MPU6050 register addresses
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_CONFIG: u8 = 0x1A;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B; // Start of 6-byte accel burst
const REG_WHO_AM_I: u8 = 0x75;
const WHO_AM_I_EXPECTED: u8 = 0x68;

const ACCEL_RANGE_16G: u8 = 0x18;

pub struct Mpu6050<'d> {
    i2c: I2cDriver<'d>,
}

impl<'d> Mpu6050<'d> {
    pub fn new(i2c: I2cDriver<'d>) -> Self {
        Self { i2c }
    }

    /// Verify the device is reachable on the I2C bus.
    pub fn is_connected(&mut self) -> bool {
        let mut buf = [0u8; 1];
        match self.i2c.write_read(I2C_ADDR_MPU6050, &[REG_WHO_AM_I], &mut buf, I2C_TIMEOUT_TICKS) {
            Ok(()) => buf[0] == WHO_AM_I_EXPECTED,
            Err(_) => false,
        }
    }

    /// Wake the sensor and configure accel (±16 g), DLPF 44 Hz.
    pub fn init(&mut self) -> anyhow::Result<()> {
        // Wake up (clear SLEEP bit)
        self.i2c.write(I2C_ADDR_MPU6050, &[REG_PWR_MGMT_1, 0x00], I2C_TIMEOUT_TICKS)?;

        // DLPF bandwidth 44 Hz, fast enough for 20 Hz sampling
        self.i2c.write(I2C_ADDR_MPU6050, &[REG_CONFIG, 0x03], I2C_TIMEOUT_TICKS)?;

        // Accelerometer: ±16 g, punches clip well below this
        self.i2c
            .write(I2C_ADDR_MPU6050, &[REG_ACCEL_CONFIG, ACCEL_RANGE_16G], I2C_TIMEOUT_TICKS)?;

        log::info!("MPU6050 initialised (±16g, DLPF 44Hz)");
        Ok(())
    }
}

impl MotionSensor for Mpu6050<'_> {
    fn read_acceleration(&mut self) -> anyhow::Result<Acceleration> {
        let mut raw = [0u8; 6];
        self.i2c
            .write_read(I2C_ADDR_MPU6050, &[REG_ACCEL_XOUT_H], &mut raw, I2C_TIMEOUT_TICKS)?;

        let axis = |hi: u8, lo: u8| f32::from(i16::from_be_bytes([hi, lo])) / ACCEL_SCALE_16G * STANDARD_GRAVITY;
        Ok(Acceleration {
            x: axis(raw[0], raw[1]),
            y: axis(raw[2], raw[3]),
            z: axis(raw[4], raw[5]),
        })
    }
}
