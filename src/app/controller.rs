//! Cycle controller: the measurement / alert / power state machine.
//!
//! [`CycleController`] owns the configuration and the carried
//! [`CycleState`].  Each [`iterate`](CycleController::iterate) call runs one
//! pass of the device loop against a [`Device`] context:
//!
//! ```text
//!  restart due? ──yes──▶ restart (terminal)
//!       │no
//!  stopped? ──yes──▶ sensor.start()
//!       │
//!  battery low? ──yes──▶ beep ×2, pause, beep ×2
//!       │
//!  sensor ready? ──no──▶ blink ×2, wait 1 s ──────────────────▶ done
//!       │yes
//!  measure ─▶ classify ─▶ alert ─▶ decide sleep ─▶ sensor.stop() ─▶ sleep
//! ```
//!
//! Every I/O step goes through a port trait so one cycle at a time can be
//! driven with mocks and no real sleeping.

use core::time::Duration;

use log::{debug, info, trace};

use crate::config::MonitorConfig;
use crate::cycle::state::CycleState;
use crate::cycle::{self, Co2Level, Co2Thresholds, SleepDepth, SleepDirective, SleepReason};
use crate::error::Result;
use crate::power::PowerMonitor;
use crate::sensors::Reading;

use super::device::Device;
use super::events::AppEvent;
use super::ports::{
    AlertSignaler, BatteryPort, EventSink, GasSensorPort, IndicatorPort, PlatformPort,
};

/// Warm-up wait when the sensor has no sample yet.
const NOT_READY_WAIT: Duration = Duration::from_secs(1);
/// Pause between the two low-battery beep bursts.
const BATTERY_ALERT_PAUSE: Duration = Duration::from_secs(2);
/// Settling time between sensor bring-up steps at boot.
const SETUP_STEP_WAIT: Duration = Duration::from_secs(1);
/// Low-battery pattern: pulses per burst.
const BATTERY_ALERT_PULSES: u32 = 2;

/// How a single cycle ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// The scheduled maintenance restart was invoked.
    Restarted,
    /// No sample was waiting; the cycle waited in real time instead of sleeping.
    NotReady,
    /// A sample was taken and the device slept.
    Slept {
        reading: Reading,
        level: Co2Level,
        directive: SleepDirective,
        reason: SleepReason,
    },
}

/// Orchestrates the measurement cycle.
pub struct CycleController {
    config: MonitorConfig,
    thresholds: Co2Thresholds,
    power: PowerMonitor,
    state: CycleState,
    resumed: bool,
}

impl CycleController {
    /// Fresh controller for a cold boot.
    pub fn new(config: MonitorConfig) -> Self {
        let state = CycleState::new(&config);
        Self::build(config, state, false)
    }

    /// Controller continuing from state retained across deep sleep.
    pub fn resume(config: MonitorConfig, state: CycleState) -> Self {
        Self::build(config, state, true)
    }

    fn build(config: MonitorConfig, state: CycleState, resumed: bool) -> Self {
        Self {
            thresholds: Co2Thresholds::from_config(&config),
            power: PowerMonitor::new(&config),
            config,
            state,
            resumed,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Boot sequence: silence the buzzer and bring the sensor up.
    ///
    /// On a resumed boot the sensor is left stopped; the first cycle's
    /// resume check starts it.
    pub fn setup<S, A, B, P, L, K>(
        &mut self,
        dev: &mut Device<S, A, B, P, L>,
        sink: &mut K,
    ) -> Result<()>
    where
        S: GasSensorPort,
        A: AlertSignaler,
        P: PlatformPort,
        L: IndicatorPort,
        K: EventSink,
    {
        info!("Setup start.");
        dev.indicator.off();
        dev.indicator.on();
        dev.alert.silence()?;
        dev.platform.wait(SETUP_STEP_WAIT);

        info!("SCD41 init and start...");
        dev.sensor.init()?;
        dev.platform.wait(SETUP_STEP_WAIT);
        if self.resumed {
            debug!("Resumed from deep sleep; sensor start deferred to first cycle");
        } else {
            dev.sensor.stop()?;
            dev.platform.wait(SETUP_STEP_WAIT);
            dev.sensor.start()?;
            self.state.stopped = false;
        }
        info!("SCD41 init and start done.");

        dev.indicator.off();
        sink.emit(&AppEvent::Started {
            resumed: self.resumed,
        });
        info!("Setup finished.");
        Ok(())
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one pass of the device loop.
    ///
    /// Port errors abort the cycle and propagate; the caller treats them
    /// as fatal.
    pub fn iterate<S, A, B, P, L, K>(
        &mut self,
        dev: &mut Device<S, A, B, P, L>,
        sink: &mut K,
    ) -> Result<CycleOutcome>
    where
        S: GasSensorPort,
        A: AlertSignaler,
        B: BatteryPort,
        P: PlatformPort,
        L: IndicatorPort,
        K: EventSink,
    {
        sink.emit(&AppEvent::CycleBegin {
            loop_count: self.state.loop_count,
            successful_measurements: self.state.successful_measurement_count,
        });

        // 1. Scheduled maintenance restart
        if self
            .state
            .restart_due(self.config.restart_after_measurements)
        {
            sink.emit(&AppEvent::RestartScheduled {
                successful_measurements: self.state.successful_measurement_count,
            });
            dev.platform.clear_retained_state();
            dev.platform.restart();
            return Ok(CycleOutcome::Restarted);
        }

        // 2. Resume the sensor stopped before the last sleep
        if self.state.stopped {
            trace!("Resuming sensor");
            dev.sensor.start()?;
            self.state.stopped = false;
        }

        // 3. Battery (advisory only)
        self.check_battery(dev, sink)?;

        // 4. Measurement attempt
        trace!("Trying to measure...");
        if !dev.sensor.ready()? {
            sink.emit(&AppEvent::SensorNotReady);
            dev.indicator.blink(2);
            dev.platform.wait(NOT_READY_WAIT);
            self.state.loop_count += 1;
            return Ok(CycleOutcome::NotReady);
        }

        dev.indicator.blink(1);
        let reading = dev.sensor.measure()?;
        self.state.successful_measurement_count += 1;

        let level = self.thresholds.classify(reading.co2_ppm);
        sink.emit(&AppEvent::Measured { reading, level });
        cycle::record_level(&mut self.state, level);
        if let Some((intensity, sustained)) = level.alert_pattern() {
            dev.alert.signal(intensity, sustained)?;
        }

        // 5. Sleep decision
        let escalated = level.is_escalated();
        sink.emit(&AppEvent::Escalation {
            escalated,
            co2_high_count: self.state.co2_high_count,
        });
        let (directive, reason) = cycle::decide_sleep(&mut self.state, escalated, &self.config);
        sink.emit(&AppEvent::Sleeping { directive, reason });

        dev.sensor.stop()?;
        self.state.stopped = true;
        self.state.loop_count += 1;

        // 6. Sleep (terminal; deep sleep never returns on hardware)
        match directive.depth {
            SleepDepth::Light => dev.platform.light_sleep(directive.duration()),
            SleepDepth::Deep => {
                dev.platform.retain_state(&self.state);
                dev.platform.deep_sleep(directive.duration());
            }
        }

        Ok(CycleOutcome::Slept {
            reading,
            level,
            directive,
            reason,
        })
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &CycleState {
        &self.state
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Whether this controller continues a pre-deep-sleep session.
    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    // ── Internal ──────────────────────────────────────────────

    fn check_battery<S, A, B, P, L, K>(
        &self,
        dev: &mut Device<S, A, B, P, L>,
        sink: &mut K,
    ) -> Result<()>
    where
        A: AlertSignaler,
        B: BatteryPort,
        P: PlatformPort,
        K: EventSink,
    {
        let status = self.power.status(&mut dev.battery);
        sink.emit(&AppEvent::Battery(status));

        if self.power.is_low(&status) {
            sink.emit(&AppEvent::BatteryLow(status));
            dev.alert.signal(BATTERY_ALERT_PULSES, false)?;
            dev.platform.wait(BATTERY_ALERT_PAUSE);
            dev.alert.signal(BATTERY_ALERT_PULSES, false)?;
        }
        Ok(())
    }
}
