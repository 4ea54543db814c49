//! Sensirion SCD41 photoacoustic CO2 sensor driver.
//!
//! Generic over any `embedded_hal` 1.0 I²C bus and delay provider, so the
//! same code runs on the ESP-IDF `I2cDriver` and on a host test double.
//!
//! ## Wire format
//!
//! Every command is a 16-bit big-endian word.  Every 16-bit data word the
//! sensor returns is followed by a CRC-8 byte (poly `0x31`, init `0xFF`):
//!
//! ```text
//! ┌──────┬──────┬─────┐┌──────┬──────┬─────┐
//! │ MSB  │ LSB  │ CRC ││ MSB  │ LSB  │ CRC │ ...
//! └──────┴──────┴─────┘└──────┴──────┴─────┘
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use log::{debug, info, warn};

use crate::app::ports::GasSensorPort;
use crate::error::SensorError;
use crate::sensors::Reading;

/// Fixed 7-bit bus address.
pub const SCD41_ADDRESS: u8 = 0x62;

const CMD_START_PERIODIC: u16 = 0x21B1;
const CMD_STOP_PERIODIC: u16 = 0x3F86;
const CMD_DATA_READY: u16 = 0xE4B8;
const CMD_READ_MEASUREMENT: u16 = 0xEC05;
const CMD_SERIAL_NUMBER: u16 = 0x3682;

/// The sensor ignores commands for 500 ms after a stop.
const STOP_SETTLE_MS: u32 = 500;
/// Execution time of the read-type commands.
const READ_DELAY_MS: u32 = 1;

/// Low 11 bits of the data-ready word are non-zero when a sample is waiting.
const DATA_READY_MASK: u16 = 0x07FF;

// ---------------------------------------------------------------------------
// CRC / word codec
// ---------------------------------------------------------------------------

/// Sensirion CRC-8 over one data word.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Split a `[MSB, LSB, CRC] × N` response into `N` checked words.
pub fn decode_words<const N: usize>(buf: &[u8]) -> Result<[u16; N], SensorError> {
    if buf.len() != N * 3 {
        return Err(SensorError::Bus);
    }
    let mut words = [0u16; N];
    for (word, chunk) in words.iter_mut().zip(buf.chunks_exact(3)) {
        if crc8(&chunk[..2]) != chunk[2] {
            return Err(SensorError::Crc);
        }
        *word = u16::from_be_bytes([chunk[0], chunk[1]]);
    }
    Ok(words)
}

/// Apply the datasheet conversions to a raw `[co2, t, rh]` triple.
pub fn convert_measurement(words: [u16; 3]) -> Reading {
    Reading {
        co2_ppm: words[0],
        temperature_c: -45.0 + 175.0 * f32::from(words[1]) / 65535.0,
        humidity_pct: 100.0 * f32::from(words[2]) / 65535.0,
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

pub struct Scd41<I2C, D> {
    i2c: I2C,
    delay: D,
    measuring: bool,
}

impl<I2C: I2c, D: DelayNs> Scd41<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            measuring: false,
        }
    }

    /// Give the bus back (e.g. to share it with another device in tests).
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Whether periodic measurement is believed to be running.
    pub fn is_measuring(&self) -> bool {
        self.measuring
    }

    /// 48-bit factory serial number.
    pub fn serial_number(&mut self) -> Result<u64, SensorError> {
        let [w0, w1, w2] = self.read_words::<3>(CMD_SERIAL_NUMBER)?;
        Ok((u64::from(w0) << 32) | (u64::from(w1) << 16) | u64::from(w2))
    }

    fn send(&mut self, cmd: u16) -> Result<(), SensorError> {
        self.i2c
            .write(SCD41_ADDRESS, &cmd.to_be_bytes())
            .map_err(|e| {
                warn!("SCD41: write {:#06x} failed ({:?})", cmd, e.kind());
                SensorError::Bus
            })
    }

    fn read_words<const N: usize>(&mut self, cmd: u16) -> Result<[u16; N], SensorError> {
        self.send(cmd)?;
        self.delay.delay_ms(READ_DELAY_MS);

        // Largest response is three words.
        let mut buf = [0u8; 9];
        let buf = &mut buf[..N * 3];
        self.i2c.read(SCD41_ADDRESS, buf).map_err(|e| {
            warn!("SCD41: read after {:#06x} failed ({:?})", cmd, e.kind());
            SensorError::Bus
        })?;
        decode_words::<N>(buf)
    }
}

impl<I2C: I2c, D: DelayNs> GasSensorPort for Scd41<I2C, D> {
    fn init(&mut self) -> Result<(), SensorError> {
        // A warm reset leaves the sensor measuring, and it only answers the
        // serial-number command while idle.
        self.stop()?;
        let serial = self.serial_number()?;
        info!("SCD41 serial: {:#014x}", serial);
        Ok(())
    }

    fn start(&mut self) -> Result<(), SensorError> {
        self.send(CMD_START_PERIODIC)?;
        self.measuring = true;
        debug!("SCD41 periodic measurement started");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SensorError> {
        self.send(CMD_STOP_PERIODIC)?;
        self.delay.delay_ms(STOP_SETTLE_MS);
        self.measuring = false;
        debug!("SCD41 periodic measurement stopped");
        Ok(())
    }

    fn ready(&mut self) -> Result<bool, SensorError> {
        let [status] = self.read_words::<1>(CMD_DATA_READY)?;
        Ok(status & DATA_READY_MASK != 0)
    }

    fn measure(&mut self) -> Result<Reading, SensorError> {
        if !self.measuring {
            return Err(SensorError::NotReady);
        }
        let words = self.read_words::<3>(CMD_READ_MEASUREMENT)?;
        Ok(convert_measurement(words))
    }
}
