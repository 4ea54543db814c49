//! Port traits: the hexagonal boundary between the cycle logic and the
//! outside world.
//!
//! ```text
//!   Adapter / driver ──▶ Port trait ──▶ CycleController (domain)
//! ```
//!
//! Drivers (SCD41, buzzers, LED) and platform adapters (ADC, sleep, reset)
//! implement these traits.  The [`CycleController`](super::controller::CycleController)
//! consumes them via generics, so the cycle never touches hardware directly.

use core::time::Duration;

use crate::cycle::state::CycleState;
use crate::error::{Result, SensorError};
use crate::sensors::Reading;

// ───────────────────────────────────────────────────────────────
// Gas sensor port (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// CO2 / T / RH sensor lifecycle and sampling.
///
/// Drive in the order `init → start → [stop → start]* → measure`, and only
/// call [`measure`](Self::measure) after [`ready`](Self::ready) returned `true`.
pub trait GasSensorPort {
    /// Bring up communication with the sensor.
    fn init(&mut self) -> core::result::Result<(), SensorError>;

    /// Start periodic measurement.
    fn start(&mut self) -> core::result::Result<(), SensorError>;

    /// Stop periodic measurement (before sleeping).
    fn stop(&mut self) -> core::result::Result<(), SensorError>;

    /// Non-blocking poll: is a fresh sample waiting?
    fn ready(&mut self) -> core::result::Result<bool, SensorError>;

    /// Read the waiting sample.
    fn measure(&mut self) -> core::result::Result<Reading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Battery port (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw battery signals.  Reads are infallible; a failed ADC read reports 0.
pub trait BatteryPort {
    /// Charger STAT line.
    fn is_charging(&mut self) -> bool;

    /// VSYS ADC sample scaled to the full `u16` range.
    fn read_vsys_raw(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Alert port (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Audible feedback.  Implementations must leave the device silent on return.
pub trait AlertSignaler {
    /// `sustained = false`: `intensity` pulses of one tone gap on, one gap off.
    /// `sustained = true`: one tone lasting `intensity` tone gaps.
    fn signal(&mut self, intensity: u32, sustained: bool) -> Result<()>;

    /// Force silence.
    fn silence(&mut self) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Cosmetic status light.  No cycle decision depends on it.
pub trait IndicatorPort {
    fn on(&mut self);
    fn off(&mut self);
    fn blink(&mut self, times: u8);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, test
/// recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Platform port (domain → SoC power management)
// ───────────────────────────────────────────────────────────────

/// Blocking time and power primitives.
pub trait PlatformPort {
    /// Low-power sleep that resumes in place.
    fn light_sleep(&mut self, duration: Duration);

    /// Lowest-power sleep; peripherals lose their configuration.  On real
    /// hardware this does not return; the chip reboots on wake.
    fn deep_sleep(&mut self, duration: Duration);

    /// Plain wall-clock wait with the CPU awake (sensor warm-up, alert pauses).
    fn wait(&mut self, duration: Duration);

    /// Unconditional device reset.  Does not return on real hardware.
    fn restart(&mut self);

    /// Hand the cycle state to memory that survives deep sleep.
    fn retain_state(&mut self, _state: &CycleState) {}

    /// Drop any retained state so the next boot starts fresh.
    fn clear_retained_state(&mut self) {}
}
