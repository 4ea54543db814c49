//! Sensor subsystem: the SCD41 driver and the [`Reading`] it produces.

pub mod scd41;

use serde::{Deserialize, Serialize};

/// One CO2 / temperature / humidity sample.  Consumed immediately by the
/// cycle; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub co2_ppm: u16,
    pub temperature_c: f32,
    pub humidity_pct: f32,
}
