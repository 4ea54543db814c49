//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the ESP-IDF
//! logger (UART / USB-CDC in production).  Per-cycle chatter goes out at
//! trace/debug level so the `debug` config flag decides whether it is seen.

use log::{debug, error, info, trace, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::cycle::SleepDepth;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { resumed } => {
                info!("START | resumed={}", resumed);
            }
            AppEvent::CycleBegin {
                loop_count,
                successful_measurements,
            } => {
                trace!(
                    "Loop count: {}, successful measurements: {}",
                    loop_count, successful_measurements
                );
            }
            AppEvent::RestartScheduled {
                successful_measurements,
            } => {
                info!(
                    "Restart point reached ({} successful measurements).",
                    successful_measurements
                );
            }
            AppEvent::Battery(b) => {
                debug!(
                    "Charging: {}, voltage: {:.2}V, percentage: {:.0}%",
                    b.is_charging, b.voltage_v, b.percent
                );
            }
            AppEvent::BatteryLow(b) => {
                warn!("Battery low: {:.0}% ({:.2}V)", b.percent, b.voltage_v);
            }
            AppEvent::SensorNotReady => {
                trace!("Sensor not ready, waiting.");
            }
            AppEvent::Measured { reading, level } => {
                info!(
                    "CO2: {}, Temperature: {:.2}C, Humidity: {:.0}% [{}]",
                    reading.co2_ppm, reading.temperature_c, reading.humidity_pct, level
                );
            }
            AppEvent::Escalation {
                escalated,
                co2_high_count,
            } => {
                trace!("CO2 high: {}, high count: {}", escalated, co2_high_count);
            }
            AppEvent::Sleeping { directive, reason } => match directive.depth {
                SleepDepth::Light => {
                    debug!("lightsleep start. ({}s, {:?})", directive.duration_secs, reason);
                }
                SleepDepth::Deep => {
                    debug!("deepsleep start. ({}s, {:?})", directive.duration_secs, reason);
                }
            },
            AppEvent::Fault(e) => {
                error!("FAULT | {}", e);
            }
        }
    }
}
