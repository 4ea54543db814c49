//! Monitor configuration parameters
//!
//! All tunable parameters for the CO2 monitor live in one struct that is
//! passed into constructors at boot.  The defaults match the shipped
//! hardware (SCD41 + 1S Li-ion cell); a JSON override can be baked in at
//! build time through `CO2MON_CONFIG_JSON`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which audible alert device is fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuzzerKind {
    /// Passive piezo driven by a PWM tone (frequency + duty control).
    Piezo,
    /// Active 3–5 V buzzer with a built-in oscillator (on/off only).
    Simple,
}

/// Core monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    // --- Timing ---
    /// Full measurement interval (seconds); the deep-sleep length.
    pub measure_interval_secs: u32,
    /// While CO2 is elevated, sleep for `interval / divisor` instead.
    pub high_notice_sleep_divisor: u32,
    /// Trigger a device restart after this many successful measurements.
    /// `0` disables the scheduled restart.
    pub restart_after_measurements: u32,

    // --- CO2 thresholds ---
    /// Upper bound (inclusive, ppm) of the Normal band.
    pub co2_normal_upper_ppm: u16,
    /// Upper bound (inclusive, ppm) of the High band.  Anything above is Danger.
    pub co2_high_upper_ppm: u16,

    // --- Battery ---
    /// Low-battery warning threshold (0-100%).
    pub battery_low_warning_percent: f32,
    /// Cell voltage treated as 0%.
    pub battery_empty_voltage: f32,
    /// Cell voltage treated as 100%.
    pub battery_full_voltage: f32,
    /// Volts per raw ADC count (16-bit scaled), including the divider network.
    pub battery_conversion_factor: f32,

    // --- Buzzer ---
    pub buzzer_kind: BuzzerKind,
    /// Length of one tone pulse and of the silence after it (milliseconds).
    pub buzzer_tone_gap_ms: u32,
    /// Piezo PWM duty (0-65535).
    pub buzzer_duty_u16: u16,
    /// Piezo tone frequency (Hz).
    pub buzzer_frequency_hz: u32,

    // --- Behaviour flags ---
    /// Enable trace/debug console output.
    pub debug: bool,
    /// Treat the first measurement after boot as untrusted and recheck soon.
    pub first_measure_untrusted: bool,
    /// Allow the onboard indicator LED to light up.
    pub allow_led: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            // Timing
            measure_interval_secs: 5 * 60,
            high_notice_sleep_divisor: 5,
            restart_after_measurements: 500,

            // CO2 thresholds
            co2_normal_upper_ppm: 1500,
            co2_high_upper_ppm: 2500,

            // Battery
            battery_low_warning_percent: 15.0,
            battery_empty_voltage: 2.8,
            battery_full_voltage: 4.2,
            battery_conversion_factor: 3.0 * 3.3 / 65535.0,

            // Buzzer
            buzzer_kind: BuzzerKind::Piezo,
            buzzer_tone_gap_ms: 300,
            buzzer_duty_u16: 5000,
            buzzer_frequency_hz: 2000,

            // Flags
            debug: false,
            first_measure_untrusted: false,
            allow_led: false,
        }
    }
}

impl MonitorConfig {
    /// Parse a JSON override and validate it.  Missing fields take their
    /// default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the cycle logic meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.measure_interval_secs == 0 {
            return Err(Error::Config("measure_interval_secs must be > 0"));
        }
        if self.high_notice_sleep_divisor == 0 {
            return Err(Error::Config("high_notice_sleep_divisor must be > 0"));
        }
        if self.co2_normal_upper_ppm >= self.co2_high_upper_ppm {
            return Err(Error::Config(
                "co2_normal_upper_ppm must be below co2_high_upper_ppm",
            ));
        }
        if !(0.0..=100.0).contains(&self.battery_low_warning_percent) {
            return Err(Error::Config("battery_low_warning_percent must be 0-100"));
        }
        if self.battery_empty_voltage >= self.battery_full_voltage {
            return Err(Error::Config(
                "battery_empty_voltage must be below battery_full_voltage",
            ));
        }
        if self.battery_conversion_factor <= 0.0 {
            return Err(Error::Config("battery_conversion_factor must be > 0"));
        }
        if self.buzzer_tone_gap_ms == 0 {
            return Err(Error::Config("buzzer_tone_gap_ms must be > 0"));
        }
        if self.buzzer_frequency_hz == 0 {
            return Err(Error::Config("buzzer_frequency_hz must be > 0"));
        }
        Ok(())
    }

    /// Full (deep) sleep length in seconds.
    pub fn deep_sleep_secs(&self) -> u32 {
        self.measure_interval_secs
    }

    /// Short recheck (light) sleep length in seconds, rounded down.
    pub fn light_sleep_secs(&self) -> u32 {
        self.measure_interval_secs / self.high_notice_sleep_divisor
    }
}
