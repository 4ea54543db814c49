//! Outbound application events.
//!
//! The [`CycleController`](super::controller::CycleController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  The log adapter turns
//! them into console lines; tests record them.

use crate::cycle::{Co2Level, SleepDirective, SleepReason};
use crate::error::Error;
use crate::power::BatteryStatus;
use crate::sensors::Reading;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Setup finished.  `resumed` is set when state came back from deep sleep.
    Started { resumed: bool },

    /// A new cycle began.
    CycleBegin {
        loop_count: u64,
        successful_measurements: u32,
    },

    /// Scheduled maintenance restart is about to happen.
    RestartScheduled { successful_measurements: u32 },

    /// Battery snapshot for this cycle.
    Battery(BatteryStatus),

    /// Battery below the warning threshold while not charging.
    BatteryLow(BatteryStatus),

    /// The sensor had no sample waiting.
    SensorNotReady,

    /// A sample was read and classified.
    Measured { reading: Reading, level: Co2Level },

    /// Escalation state just before the sleep decision.
    Escalation { escalated: bool, co2_high_count: i32 },

    /// The device is about to sleep.
    Sleeping {
        directive: SleepDirective,
        reason: SleepReason,
    },

    /// A cycle aborted with an unrecoverable error.
    Fault(Error),
}
