//! Onboard indicator LED.
//!
//! Purely cosmetic.  `allow_led = false` suppresses `on` and `blink`, but
//! `off` always goes through so a lit LED can never be left stranded.
//! Pin errors are logged and swallowed.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::IndicatorPort;

/// On-time of one blink.
const BLINK_ON_MS: u32 = 100;

pub struct IndicatorLed<P, D> {
    pin: P,
    delay: D,
    enabled: bool,
}

impl<P: OutputPin, D: DelayNs> IndicatorLed<P, D> {
    pub fn new(pin: P, delay: D, enabled: bool) -> Self {
        Self { pin, delay, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set(&mut self, lit: bool) {
        let res = if lit {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(e) = res {
            warn!("indicator: pin write failed ({:?})", e);
        }
    }
}

impl<P: OutputPin, D: DelayNs> IndicatorPort for IndicatorLed<P, D> {
    fn on(&mut self) {
        if self.enabled {
            self.set(true);
        }
    }

    fn off(&mut self) {
        self.set(false);
    }

    fn blink(&mut self, times: u8) {
        if !self.enabled {
            return;
        }
        self.set(false);
        for _ in 0..times {
            self.set(true);
            self.delay.delay_ms(BLINK_ON_MS);
            self.set(false);
        }
    }
}
