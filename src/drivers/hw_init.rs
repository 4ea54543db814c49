//! One-shot hardware peripheral initialization.
//!
//! Configures the battery ADC channel, the charger STAT input and (for the
//! piezo variant) the LEDC tone timer/channel using raw ESP-IDF sys calls.
//! Called once from `main()` before the cycle loop starts.  The I²C bus,
//! indicator LED and active-buzzer pin go through `esp-idf-hal` drivers
//! instead, because the generic drivers want `embedded-hal` handles.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: real register access.
//! On host/test: battery signals come from injectable atomics.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use crate::error::ActuatorError;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc)    => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc)   => write!(f, "LEDC timer/channel config failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

/// Configure ADC, charger input and, when `with_tone` is set, the LEDC tone
/// output on the buzzer pin.
#[cfg(target_os = "espidf")]
pub fn init_peripherals(with_tone: bool, tone_freq_hz: u32) -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the cycle loop; single-threaded.
    unsafe {
        init_adc()?;
        init_charging_input()?;
        if with_tone {
            init_ledc(tone_freq_hz)?;
        }
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(_with_tone: bool, _tone_freq_hz: u32) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

/// ADC1 channel wired to the VSYS divider (GPIO 1 on ESP32-S3).
pub const ADC1_CH_VSYS: u32 = 0;

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), ADC1_CH_VSYS, &chan_cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    info!("hw_init: ADC1 configured (CH{}=VSYS, GPIO{})", ADC1_CH_VSYS, pins::VSYS_ADC_GPIO);
    Ok(())
}

/// Read the VSYS channel and stretch the 12-bit sample to the `u16` range
/// the battery calibration is expressed in.  Returns 0 on a failed read.
#[cfg(target_os = "espidf")]
pub fn read_vsys_u16() -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract: single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), ADC1_CH_VSYS, &mut raw) };
    if ret != ESP_OK as i32 {
        log::warn!("hw_init: VSYS ADC read failed (rc={})", ret);
        return 0;
    }
    scale_12_to_16(raw.clamp(0, 4095) as u16)
}

#[cfg(not(target_os = "espidf"))]
static SIM_VSYS_RAW: AtomicU16 = AtomicU16::new(u16::MAX);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_vsys_raw(raw: u16) {
    SIM_VSYS_RAW.store(raw, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn read_vsys_u16() -> u16 {
    SIM_VSYS_RAW.load(Ordering::Relaxed)
}

/// 12-bit → 16-bit full-scale stretch.
pub fn scale_12_to_16(raw: u16) -> u16 {
    ((u32::from(raw.min(4095)) * 65535) / 4095) as u16
}

// ── Charger STAT input ────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_charging_input() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::CHARGING_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }

    info!("hw_init: charger STAT input configured (GPIO{})", pins::CHARGING_GPIO);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn read_charging() -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin.
    (unsafe { gpio_get_level(pins::CHARGING_GPIO) }) != 0
}

#[cfg(not(target_os = "espidf"))]
static SIM_CHARGING: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_charging(charging: bool) {
    SIM_CHARGING.store(charging, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn read_charging() -> bool {
    SIM_CHARGING.load(Ordering::Relaxed)
}

// ── LEDC tone (piezo) ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
const TONE_MODE: ledc_mode_t = ledc_mode_t_LEDC_LOW_SPEED_MODE;
#[cfg(target_os = "espidf")]
const TONE_TIMER: ledc_timer_t = ledc_timer_t_LEDC_TIMER_0;
#[cfg(target_os = "espidf")]
const TONE_CHANNEL: ledc_channel_t = ledc_channel_t_LEDC_CHANNEL_0;
/// Tone duty resolution; `duty_u16` is shifted down to this.
pub const TONE_DUTY_BITS: u32 = 10;

#[cfg(target_os = "espidf")]
unsafe fn init_ledc(freq_hz: u32) -> Result<(), HwInitError> {
    let timer = ledc_timer_config_t {
        speed_mode: TONE_MODE,
        timer_num: TONE_TIMER,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_10_BIT,
        freq_hz,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK as i32 { return Err(HwInitError::LedcInitFailed(ret)); }

    let ret = unsafe { ledc_channel_config(&ledc_channel_config_t {
        speed_mode: TONE_MODE,
        channel: TONE_CHANNEL,
        timer_sel: TONE_TIMER,
        gpio_num: pins::BUZZER_GPIO,
        duty: 0,
        hpoint: 0,
        ..Default::default()
    }) };
    if ret != ESP_OK as i32 { return Err(HwInitError::LedcInitFailed(ret)); }

    info!("hw_init: LEDC tone configured (CH0 on GPIO{}, {} Hz)", pins::BUZZER_GPIO, freq_hz);
    Ok(())
}

/// `duty_u16` (0–65535) → LEDC duty at [`TONE_DUTY_BITS`].
pub fn tone_duty(duty_u16: u16) -> u32 {
    u32::from(duty_u16) >> (16 - TONE_DUTY_BITS)
}

#[cfg(target_os = "espidf")]
pub fn tone_play(freq_hz: u32, duty_u16: u16) -> Result<(), ActuatorError> {
    // SAFETY: LEDC timer/channel were configured in init_ledc(); only the
    // main task writes these registers.
    unsafe {
        if ledc_set_freq(TONE_MODE, TONE_TIMER, freq_hz) != ESP_OK as i32
            || ledc_set_duty(TONE_MODE, TONE_CHANNEL, tone_duty(duty_u16)) != ESP_OK as i32
            || ledc_update_duty(TONE_MODE, TONE_CHANNEL) != ESP_OK as i32
        {
            return Err(ActuatorError::PwmWriteFailed);
        }
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn tone_play(_freq_hz: u32, _duty_u16: u16) -> Result<(), ActuatorError> {
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn tone_mute() -> Result<(), ActuatorError> {
    // SAFETY: see tone_play().
    unsafe {
        if ledc_set_duty(TONE_MODE, TONE_CHANNEL, 0) != ESP_OK as i32
            || ledc_update_duty(TONE_MODE, TONE_CHANNEL) != ESP_OK as i32
        {
            return Err(ActuatorError::PwmWriteFailed);
        }
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn tone_mute() -> Result<(), ActuatorError> {
    Ok(())
}
