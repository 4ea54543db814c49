//! Alert buzzer drivers.
//!
//! Two variants share one beep pattern:
//!
//! - [`PiezoBuzzer`]: passive piezo fed a PWM tone (LEDC on hardware).
//! - [`SimpleBuzzer`]: self-oscillating 3V/5V buzzer switched by a GPIO.
//!
//! ```text
//!  pulsed ×n :  ▇▇▁▁▇▇▁▁ ... (gap on, gap off) × n
//!  sustained :  ▇▇▇▇▇▇▇▇▇▇▇▇ (n × gap) then off
//! ```
//!
//! Every pattern ends with an explicit silence, even if it was already off.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{trace, warn};

use crate::app::ports::AlertSignaler;
use crate::config::MonitorConfig;
use crate::drivers::hw_init;
use crate::error::{ActuatorError, Result};

// ── Tone output seam ──────────────────────────────────────────

/// A PWM tone generator.
pub trait ToneOutput {
    fn play(&mut self, frequency_hz: u32, duty_u16: u16) -> core::result::Result<(), ActuatorError>;
    fn mute(&mut self) -> core::result::Result<(), ActuatorError>;
}

/// The LEDC channel configured by [`hw_init::init_peripherals`].
pub struct LedcTone;

impl ToneOutput for LedcTone {
    fn play(&mut self, frequency_hz: u32, duty_u16: u16) -> core::result::Result<(), ActuatorError> {
        hw_init::tone_play(frequency_hz, duty_u16)
    }

    fn mute(&mut self) -> core::result::Result<(), ActuatorError> {
        hw_init::tone_mute()
    }
}

// ── Shared pattern ────────────────────────────────────────────

trait Sounder {
    fn sound(&mut self) -> core::result::Result<(), ActuatorError>;
    fn quiet(&mut self) -> core::result::Result<(), ActuatorError>;
    fn pause_ms(&mut self, ms: u32);
}

fn run_pattern<S: Sounder>(
    s: &mut S,
    tone_gap_ms: u32,
    intensity: u32,
    sustained: bool,
) -> core::result::Result<(), ActuatorError> {
    trace!("buzzer: intensity={} sustained={}", intensity, sustained);
    if sustained {
        s.sound()?;
        s.pause_ms(intensity.saturating_mul(tone_gap_ms));
        s.quiet()?;
    } else {
        for _ in 0..intensity {
            s.sound()?;
            s.pause_ms(tone_gap_ms);
            s.quiet()?;
            s.pause_ms(tone_gap_ms);
        }
    }
    s.quiet()
}

// ── Piezo ─────────────────────────────────────────────────────

pub struct PiezoBuzzer<T, D> {
    tone: T,
    delay: D,
    duty_u16: u16,
    frequency_hz: u32,
    tone_gap_ms: u32,
}

impl<T: ToneOutput, D: DelayNs> PiezoBuzzer<T, D> {
    pub fn new(tone: T, delay: D, config: &MonitorConfig) -> Self {
        Self {
            tone,
            delay,
            duty_u16: config.buzzer_duty_u16,
            frequency_hz: config.buzzer_frequency_hz,
            tone_gap_ms: config.buzzer_tone_gap_ms,
        }
    }

    pub fn duty_u16(&self) -> u16 {
        self.duty_u16
    }

    pub fn set_duty_u16(&mut self, duty: u16) {
        self.duty_u16 = duty;
    }

    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    pub fn set_frequency_hz(&mut self, hz: u32) {
        self.frequency_hz = hz;
    }

    pub fn tone_gap_ms(&self) -> u32 {
        self.tone_gap_ms
    }

    pub fn set_tone_gap_ms(&mut self, ms: u32) {
        self.tone_gap_ms = ms;
    }

    /// Play a pattern at a one-off frequency.
    pub fn signal_at(&mut self, intensity: u32, sustained: bool, frequency_hz: u32) -> Result<()> {
        let gap = self.tone_gap_ms;
        let mut s = PiezoSounder {
            buzzer: self,
            frequency_hz,
        };
        run_pattern(&mut s, gap, intensity, sustained).map_err(Into::into)
    }

    pub fn release(self) -> (T, D) {
        (self.tone, self.delay)
    }
}

struct PiezoSounder<'a, T, D> {
    buzzer: &'a mut PiezoBuzzer<T, D>,
    frequency_hz: u32,
}

impl<T: ToneOutput, D: DelayNs> Sounder for PiezoSounder<'_, T, D> {
    fn sound(&mut self) -> core::result::Result<(), ActuatorError> {
        let duty = self.buzzer.duty_u16;
        self.buzzer.tone.play(self.frequency_hz, duty)
    }

    fn quiet(&mut self) -> core::result::Result<(), ActuatorError> {
        self.buzzer.tone.mute()
    }

    fn pause_ms(&mut self, ms: u32) {
        self.buzzer.delay.delay_ms(ms);
    }
}

impl<T: ToneOutput, D: DelayNs> AlertSignaler for PiezoBuzzer<T, D> {
    fn signal(&mut self, intensity: u32, sustained: bool) -> Result<()> {
        let freq = self.frequency_hz;
        self.signal_at(intensity, sustained, freq)
    }

    fn silence(&mut self) -> Result<()> {
        self.tone.mute().map_err(Into::into)
    }
}

// ── Simple (GPIO) ─────────────────────────────────────────────

pub struct SimpleBuzzer<P, D> {
    pin: P,
    delay: D,
    tone_gap_ms: u32,
}

impl<P: OutputPin, D: DelayNs> SimpleBuzzer<P, D> {
    pub fn new(pin: P, delay: D, config: &MonitorConfig) -> Self {
        Self {
            pin,
            delay,
            tone_gap_ms: config.buzzer_tone_gap_ms,
        }
    }

    pub fn tone_gap_ms(&self) -> u32 {
        self.tone_gap_ms
    }

    pub fn set_tone_gap_ms(&mut self, ms: u32) {
        self.tone_gap_ms = ms;
    }

    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }
}

impl<P: OutputPin, D: DelayNs> Sounder for SimpleBuzzer<P, D> {
    fn sound(&mut self) -> core::result::Result<(), ActuatorError> {
        self.pin.set_high().map_err(|e| {
            warn!("buzzer: pin high failed ({:?})", e);
            ActuatorError::GpioWriteFailed
        })
    }

    fn quiet(&mut self) -> core::result::Result<(), ActuatorError> {
        self.pin.set_low().map_err(|e| {
            warn!("buzzer: pin low failed ({:?})", e);
            ActuatorError::GpioWriteFailed
        })
    }

    fn pause_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

impl<P: OutputPin, D: DelayNs> AlertSignaler for SimpleBuzzer<P, D> {
    fn signal(&mut self, intensity: u32, sustained: bool) -> Result<()> {
        let gap = self.tone_gap_ms;
        run_pattern(self, gap, intensity, sustained).map_err(Into::into)
    }

    fn silence(&mut self) -> Result<()> {
        self.quiet().map_err(Into::into)
    }
}

// ── Runtime selection ─────────────────────────────────────────

/// Buzzer chosen at boot from `MonitorConfig::buzzer_kind`.
pub enum AnyBuzzer<T, P, D> {
    Piezo(PiezoBuzzer<T, D>),
    Simple(SimpleBuzzer<P, D>),
}

impl<T: ToneOutput, P: OutputPin, D: DelayNs> AlertSignaler for AnyBuzzer<T, P, D> {
    fn signal(&mut self, intensity: u32, sustained: bool) -> Result<()> {
        match self {
            Self::Piezo(b) => b.signal(intensity, sustained),
            Self::Simple(b) => b.signal(intensity, sustained),
        }
    }

    fn silence(&mut self) -> Result<()> {
        match self {
            Self::Piezo(b) => b.silence(),
            Self::Simple(b) => b.silence(),
        }
    }
}
