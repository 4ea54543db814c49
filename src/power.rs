//! Battery monitoring.
//!
//! Converts the raw VSYS ADC sample (scaled to 16 bits) into a cell voltage
//! and a clamped 0–100 % charge estimate.  The estimate is linear between
//! the configured empty and full voltages; it is crude but cheap, and only
//! drives an advisory warning.

use serde::{Deserialize, Serialize};

use crate::app::ports::BatteryPort;
use crate::config::MonitorConfig;

/// Snapshot of the battery, recomputed every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryStatus {
    pub is_charging: bool,
    pub voltage_v: f32,
    pub percent: f32,
}

/// Voltage calibration for the cell and divider network.
#[derive(Debug, Clone, Copy)]
pub struct BatteryCalibration {
    pub empty_voltage: f32,
    pub full_voltage: f32,
    /// Volts per raw count.
    pub conversion_factor: f32,
}

impl BatteryCalibration {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            empty_voltage: config.battery_empty_voltage,
            full_voltage: config.battery_full_voltage,
            conversion_factor: config.battery_conversion_factor,
        }
    }

    pub fn raw_to_voltage(&self, raw: u16) -> f32 {
        f32::from(raw) * self.conversion_factor
    }

    /// Linear map of `voltage` onto 0–100 %, clamped at both ends.
    pub fn voltage_to_percent(&self, voltage: f32) -> f32 {
        let pct = 100.0 * (voltage - self.empty_voltage) / (self.full_voltage - self.empty_voltage);
        pct.clamp(0.0, 100.0)
    }
}

/// Reads the battery through a [`BatteryPort`] and classifies low charge.
pub struct PowerMonitor {
    cal: BatteryCalibration,
    low_warning_percent: f32,
}

impl PowerMonitor {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            cal: BatteryCalibration::from_config(config),
            low_warning_percent: config.battery_low_warning_percent,
        }
    }

    pub fn status(&self, port: &mut impl BatteryPort) -> BatteryStatus {
        let is_charging = port.is_charging();
        let voltage_v = self.cal.raw_to_voltage(port.read_vsys_raw());
        BatteryStatus {
            is_charging,
            voltage_v,
            percent: self.cal.voltage_to_percent(voltage_v),
        }
    }

    /// Low battery only counts while running from the cell.
    pub fn is_low(&self, status: &BatteryStatus) -> bool {
        !status.is_charging && status.percent <= self.low_warning_percent
    }
}
