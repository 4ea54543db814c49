//! Mutable state carried from one measurement cycle to the next.
//!
//! `CycleState` lives for the whole process (and across deep sleep via the
//! RTC retention slot).  Only a full device restart resets it.

use serde::{Deserialize, Serialize};

use crate::config::MonitorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CycleState {
    /// Every pass through the loop, whatever branch it took.
    pub loop_count: u64,
    /// Measurements actually read from the sensor.  Drives the scheduled restart.
    pub successful_measurement_count: u32,
    /// Escalation counter: +1 per High/Danger reading, −1 per escalated
    /// sleep, reset to 0 when the cycle resolves clear.
    pub co2_high_count: i32,
    /// The sensor was stopped before the last sleep and must be restarted.
    pub stopped: bool,
    /// One-shot: the next clear measurement gets a short recheck sleep.
    pub first_measure_pending: bool,
}

impl CycleState {
    /// Fresh boot state.
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            first_measure_pending: config.first_measure_untrusted,
            ..Self::default()
        }
    }

    /// Whether the scheduled maintenance restart is due.
    pub fn restart_due(&self, restart_after: u32) -> bool {
        restart_after != 0 && self.successful_measurement_count >= restart_after
    }
}
