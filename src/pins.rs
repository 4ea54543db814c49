//! GPIO / peripheral pin assignments for the monitor board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// I²C bus (SCD41 CO2 / T / RH sensor)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 4;
pub const I2C_SCL_GPIO: i32 = 5;
/// Standard-mode I²C; the SCD41 supports up to 400 kHz.
pub const I2C_BAUDRATE_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Buzzer
// ---------------------------------------------------------------------------

/// Piezo (LEDC PWM) or active buzzer (plain GPIO) output.
pub const BUZZER_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// Power
// ---------------------------------------------------------------------------

/// Battery voltage through a 1/3 resistive divider.
/// ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const VSYS_ADC_GPIO: i32 = 1;
/// Charger STAT output: HIGH while charging.
pub const CHARGING_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Indicator LED
// ---------------------------------------------------------------------------

pub const ONBOARD_LED_GPIO: i32 = 21;
