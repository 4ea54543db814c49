//! Hardware adapters: bridge the SoC to the battery and platform ports.
//!
//! [`HwBattery`] reads the VSYS ADC and charger STAT line configured by
//! `hw_init`.  [`EspPlatform`] wraps the ESP-IDF sleep, delay and reset
//! calls.  On non-espidf targets the sleeps are logged and skipped so a
//! host run of the cycle loop is fast.

use core::time::Duration;

use log::info;

use crate::adapters::rtc_store;
use crate::app::ports::{BatteryPort, PlatformPort};
use crate::cycle::state::CycleState;
use crate::drivers::hw_init;

// ── Battery ───────────────────────────────────────────────────

#[derive(Default)]
pub struct HwBattery;

impl BatteryPort for HwBattery {
    fn is_charging(&mut self) -> bool {
        hw_init::read_charging()
    }

    fn read_vsys_raw(&mut self) -> u16 {
        hw_init::read_vsys_u16()
    }
}

// ── Platform ──────────────────────────────────────────────────

#[derive(Default)]
pub struct EspPlatform;

impl EspPlatform {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "espidf")]
fn as_micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

/// Whether this boot is a timer wake from deep sleep (vs. power-on/reset).
#[cfg(target_os = "espidf")]
pub fn woke_from_timer() -> bool {
    // SAFETY: read-only query of the wakeup cause latched at boot.
    let cause = unsafe { esp_idf_svc::sys::esp_sleep_get_wakeup_cause() };
    cause == esp_idf_svc::sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_TIMER
}

#[cfg(not(target_os = "espidf"))]
pub fn woke_from_timer() -> bool {
    false
}

/// Retained state if this boot is a deep-sleep wake, otherwise `None`.
/// Any stale slot is wiped on a cold boot.
pub fn take_resume_state() -> Option<CycleState> {
    if woke_from_timer() {
        rtc_store::load()
    } else {
        rtc_store::clear();
        None
    }
}

impl PlatformPort for EspPlatform {
    #[cfg(target_os = "espidf")]
    fn light_sleep(&mut self, duration: Duration) {
        use esp_idf_svc::sys::*;
        // SAFETY: timer wakeup + light sleep from the main task; execution
        // resumes here.
        unsafe {
            esp_sleep_enable_timer_wakeup(as_micros(duration));
            let rc = esp_light_sleep_start();
            if rc != ESP_OK as i32 {
                log::warn!("light sleep rejected (rc={})", rc);
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn light_sleep(&mut self, duration: Duration) {
        log::debug!("platform(sim): light sleep {:?} skipped", duration);
    }

    #[cfg(target_os = "espidf")]
    fn deep_sleep(&mut self, duration: Duration) {
        // SAFETY: never returns; the chip reboots on the timer wake.
        unsafe { esp_idf_svc::sys::esp_deep_sleep(as_micros(duration)) }
    }

    #[cfg(not(target_os = "espidf"))]
    fn deep_sleep(&mut self, duration: Duration) {
        log::debug!("platform(sim): deep sleep {:?} skipped", duration);
    }

    #[cfg(target_os = "espidf")]
    fn wait(&mut self, duration: Duration) {
        let ms = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn wait(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "espidf")]
    fn restart(&mut self) {
        info!("restarting");
        // SAFETY: unconditional reset; does not return.
        unsafe { esp_idf_svc::sys::esp_restart() }
    }

    #[cfg(not(target_os = "espidf"))]
    fn restart(&mut self) {
        info!("platform(sim): restart requested");
    }

    fn retain_state(&mut self, state: &CycleState) {
        rtc_store::save(state);
    }

    fn clear_retained_state(&mut self) {
        rtc_store::clear();
    }
}
