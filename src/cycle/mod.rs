//! Pure decision logic of the measurement cycle.
//!
//! Nothing here touches hardware.  The controller feeds in a reading and
//! the carried [`CycleState`], and gets back a classification and a
//! [`SleepDirective`].
//!
//! ```text
//!  co2_ppm ──▶ classify ──▶ Normal ─────────────┐
//!                      └──▶ High / Danger ──▶ co2_high_count += 1
//!                                               │
//!           ┌───────────────────────────────────┘
//!           ▼
//!   !escalated && count < 1 ?
//!      yes ─▶ count = 0 ─▶ first measure pending ? Light(interval/div) : Deep(interval)
//!      no  ─▶ count -= 1 ─▶ Light(interval/div)
//! ```

pub mod state;

use core::fmt;
use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::MonitorConfig;
use state::CycleState;

// ---------------------------------------------------------------------------
// CO2 classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Co2Level {
    Normal,
    High,
    Danger,
}

impl Co2Level {
    /// `true` for the levels that raise an alert and push the escalation counter.
    pub fn is_escalated(self) -> bool {
        !matches!(self, Self::Normal)
    }

    /// Buzzer pattern for this level as `(intensity, sustained)`, if any.
    pub fn alert_pattern(self) -> Option<(u32, bool)> {
        match self {
            Self::Normal => None,
            Self::High => Some((5, false)),
            Self::Danger => Some((30, true)),
        }
    }
}

impl fmt::Display for Co2Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "good"),
            Self::High => write!(f, "high"),
            Self::Danger => write!(f, "danger"),
        }
    }
}

/// Inclusive upper bounds of the Normal and High bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Co2Thresholds {
    pub normal_upper: u16,
    pub high_upper: u16,
}

impl Co2Thresholds {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            normal_upper: config.co2_normal_upper_ppm,
            high_upper: config.co2_high_upper_ppm,
        }
    }

    pub fn classify(&self, co2_ppm: u16) -> Co2Level {
        if co2_ppm <= self.normal_upper {
            Co2Level::Normal
        } else if co2_ppm <= self.high_upper {
            Co2Level::High
        } else {
            Co2Level::Danger
        }
    }
}

// ---------------------------------------------------------------------------
// Sleep directive
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SleepDepth {
    /// Resume in place after the timeout.
    Light,
    /// Peripherals lose state; the sensor must be restarted on wake.
    Deep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepDirective {
    pub depth: SleepDepth,
    pub duration_secs: u32,
}

impl SleepDirective {
    pub fn light(duration_secs: u32) -> Self {
        Self {
            depth: SleepDepth::Light,
            duration_secs,
        }
    }

    pub fn deep(duration_secs: u32) -> Self {
        Self {
            depth: SleepDepth::Deep,
            duration_secs,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_secs))
    }
}

/// Why the cycle chose its sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepReason {
    /// Reading clear and no escalation pressure left.
    Clear,
    /// Clear, but the first measurement after boot is not trusted.
    FirstMeasure,
    /// Current reading elevated or escalation pressure from earlier cycles.
    Escalated,
}

/// Register a classified reading with the escalation counter.
pub fn record_level(state: &mut CycleState, level: Co2Level) {
    if level.is_escalated() {
        state.co2_high_count += 1;
    }
}

/// Choose the sleep for a cycle that produced a measurement, updating the
/// escalation counter and the first-measure flag.
///
/// `escalated` is the current reading's classification; the counter must
/// already include it (see [`record_level`]).  The first-measure flag is
/// consumed by the first measurement whatever its level.  The decrement on
/// the escalated branch is one step per cycle.
pub fn decide_sleep(
    state: &mut CycleState,
    escalated: bool,
    config: &MonitorConfig,
) -> (SleepDirective, SleepReason) {
    let first_measure = core::mem::take(&mut state.first_measure_pending);

    if !escalated && state.co2_high_count < 1 {
        state.co2_high_count = 0;
        if first_measure {
            (
                SleepDirective::light(config.light_sleep_secs()),
                SleepReason::FirstMeasure,
            )
        } else {
            (
                SleepDirective::deep(config.deep_sleep_secs()),
                SleepReason::Clear,
            )
        }
    } else {
        state.co2_high_count -= 1;
        (
            SleepDirective::light(config.light_sleep_secs()),
            SleepReason::Escalated,
        )
    }
}
