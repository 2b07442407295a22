//! AHT30 temperature and relative humidity sensor.

use core::time::Duration;
use embedded_hal_async::{
    delay::DelayNs,
    i2c::{Error as _, ErrorKind, I2c},
};

pub const DEVICE_ADDRESS: u8 = 0x38;

const CMD_INITIALISE: [u8; 3] = [0xBE, 0x08, 0x00];
const CMD_TRIGGER_MEASUREMENT: [u8; 3] = [0xAC, 0x33, 0x00];

/// Status byte, five data bytes and a CRC.
pub const RESPONSE_LEN: usize = 7;

/// Time the device needs after power-on before it accepts commands.
pub const INIT_SETTLE_TIME: Duration = Duration::from_millis(300);

/// Time between triggering a measurement and the result being available.
pub const CONVERSION_TIME: Duration = Duration::from_millis(80);

/// Full scale of the 20 bit humidity and temperature fractions.
const FULL_SCALE: f64 = (1u32 << 20) as f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub enum Error {
    Bus(ErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub struct Measurement {
    /// Relative humidity, 0 to 100 %.
    pub humidity: f32,
    /// Temperature, -50 to +150 degrees Celsius.
    pub temperature: f32,
}

impl Measurement {
    /// Decodes the raw measurement response.
    ///
    /// Humidity is the 20 bits starting at byte 1, temperature the 20 bits ending at byte 5. Byte 3
    /// is split between the two. The status byte and CRC are not checked.
    pub fn from_response(response: &[u8; RESPONSE_LEN]) -> Self {
        let humidity = ((u32::from(response[1]) << 16)
            | (u32::from(response[2]) << 8)
            | u32::from(response[3]))
            >> 4;

        let temperature = ((u32::from(response[3]) << 16)
            | (u32::from(response[4]) << 8)
            | u32::from(response[5]))
            & 0xF_FFFF;

        Self {
            humidity: (f64::from(humidity) * 100.0 / FULL_SCALE) as f32,
            temperature: (f64::from(temperature) * 200.0 / FULL_SCALE - 50.0) as f32,
        }
    }
}

pub struct Aht30<I, D> {
    i2c: I,
    delay: D,
}

impl<I: I2c, D: DelayNs> Aht30<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self { i2c, delay }
    }

    /// Waits for the device to settle after power-on, then sends the initialisation command.
    pub async fn init(&mut self) -> Result<(), Error> {
        self.delay.delay_ms(INIT_SETTLE_TIME.as_millis() as u32).await;

        self.i2c
            .write(DEVICE_ADDRESS, &CMD_INITIALISE)
            .await
            .map_err(|e| Error::Bus(e.kind()))
    }

    /// Triggers a measurement, waits for the conversion and reads the result.
    pub async fn measure(&mut self) -> Result<Measurement, Error> {
        self.i2c
            .write(DEVICE_ADDRESS, &CMD_TRIGGER_MEASUREMENT)
            .await
            .map_err(|e| Error::Bus(e.kind()))?;

        self.delay.delay_ms(CONVERSION_TIME.as_millis() as u32).await;

        let mut response = [0u8; RESPONSE_LEN];
        self.i2c
            .read(DEVICE_ADDRESS, &mut response)
            .await
            .map_err(|e| Error::Bus(e.kind()))?;

        Ok(Measurement::from_response(&response))
    }
}
