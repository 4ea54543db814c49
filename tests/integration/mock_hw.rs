//! Mock hardware adapters for integration tests.
//!
//! Every mock appends to one shared [`CallLog`] so tests can assert on the
//! full, ordered command history across sensor, buzzer, LED and platform
//! without touching real peripherals.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use co2monitor::app::device::Device;
use co2monitor::app::events::AppEvent;
use co2monitor::app::ports::{
    AlertSignaler, BatteryPort, EventSink, GasSensorPort, IndicatorPort, PlatformPort,
};
use co2monitor::cycle::state::CycleState;
use co2monitor::error::{Result, SensorError};
use co2monitor::sensors::Reading;

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SensorInit,
    SensorStart,
    SensorStop,
    SensorReady(bool),
    SensorMeasure,
    Signal { intensity: u32, sustained: bool },
    Silence,
    LightSleep(Duration),
    DeepSleep(Duration),
    Wait(Duration),
    Restart,
    Retain(CycleState),
    ClearRetained,
    LedOn,
    LedOff,
    Blink(u8),
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

fn push(log: &CallLog, call: Call) {
    log.borrow_mut().push(call);
}

// ── Sensor ────────────────────────────────────────────────────

pub struct MockSensor {
    log: CallLog,
    /// Scripted `ready()` answers; `true` once exhausted.
    pub ready_script: VecDeque<bool>,
    /// Scripted CO2 values for `measure()`; 400 ppm once exhausted.
    pub co2_script: VecDeque<u16>,
    pub fail_measure: Option<SensorError>,
    pub fail_start: Option<SensorError>,
}

#[allow(dead_code)]
impl MockSensor {
    pub fn with_co2(mut self, values: &[u16]) -> Self {
        self.co2_script.extend(values.iter().copied());
        self
    }

    pub fn with_ready(mut self, answers: &[bool]) -> Self {
        self.ready_script.extend(answers.iter().copied());
        self
    }
}

impl GasSensorPort for MockSensor {
    fn init(&mut self) -> core::result::Result<(), SensorError> {
        push(&self.log, Call::SensorInit);
        Ok(())
    }

    fn start(&mut self) -> core::result::Result<(), SensorError> {
        push(&self.log, Call::SensorStart);
        match self.fail_start {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn stop(&mut self) -> core::result::Result<(), SensorError> {
        push(&self.log, Call::SensorStop);
        Ok(())
    }

    fn ready(&mut self) -> core::result::Result<bool, SensorError> {
        let ready = self.ready_script.pop_front().unwrap_or(true);
        push(&self.log, Call::SensorReady(ready));
        Ok(ready)
    }

    fn measure(&mut self) -> core::result::Result<Reading, SensorError> {
        push(&self.log, Call::SensorMeasure);
        if let Some(e) = self.fail_measure {
            return Err(e);
        }
        Ok(Reading {
            co2_ppm: self.co2_script.pop_front().unwrap_or(400),
            temperature_c: 22.5,
            humidity_pct: 41.0,
        })
    }
}

// ── Buzzer ────────────────────────────────────────────────────

pub struct MockAlert {
    log: CallLog,
}

impl AlertSignaler for MockAlert {
    fn signal(&mut self, intensity: u32, sustained: bool) -> Result<()> {
        push(&self.log, Call::Signal { intensity, sustained });
        Ok(())
    }

    fn silence(&mut self) -> Result<()> {
        push(&self.log, Call::Silence);
        Ok(())
    }
}

// ── Battery ───────────────────────────────────────────────────

pub struct MockBattery {
    pub charging: bool,
    pub raw: u16,
}

impl BatteryPort for MockBattery {
    fn is_charging(&mut self) -> bool {
        self.charging
    }

    fn read_vsys_raw(&mut self) -> u16 {
        self.raw
    }
}

// ── Platform ──────────────────────────────────────────────────

pub struct MockPlatform {
    log: CallLog,
}

impl PlatformPort for MockPlatform {
    fn light_sleep(&mut self, duration: Duration) {
        push(&self.log, Call::LightSleep(duration));
    }

    fn deep_sleep(&mut self, duration: Duration) {
        push(&self.log, Call::DeepSleep(duration));
    }

    fn wait(&mut self, duration: Duration) {
        push(&self.log, Call::Wait(duration));
    }

    fn restart(&mut self) {
        push(&self.log, Call::Restart);
    }

    fn retain_state(&mut self, state: &CycleState) {
        push(&self.log, Call::Retain(*state));
    }

    fn clear_retained_state(&mut self) {
        push(&self.log, Call::ClearRetained);
    }
}

// ── Indicator ─────────────────────────────────────────────────

pub struct MockIndicator {
    log: CallLog,
}

impl IndicatorPort for MockIndicator {
    fn on(&mut self) {
        push(&self.log, Call::LedOn);
    }

    fn off(&mut self) {
        push(&self.log, Call::LedOff);
    }

    fn blink(&mut self, times: u8) {
        push(&self.log, Call::Blink(times));
    }
}

// ── Event recorder ────────────────────────────────────────────

/// Event sink that keeps every emitted event.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Assembly ──────────────────────────────────────────────────

pub type MockDevice = Device<MockSensor, MockAlert, MockBattery, MockPlatform, MockIndicator>;

/// Raw ADC count that reads as a full 4.2 V cell with the default divider.
pub const RAW_FULL: u16 = 27_800;

/// A device on a healthy, non-charging battery with an always-ready sensor.
pub fn mock_device() -> (MockDevice, CallLog) {
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let dev = Device::new(
        MockSensor {
            log: log.clone(),
            ready_script: VecDeque::new(),
            co2_script: VecDeque::new(),
            fail_measure: None,
            fail_start: None,
        },
        MockAlert { log: log.clone() },
        MockBattery {
            charging: false,
            raw: RAW_FULL,
        },
        MockPlatform { log: log.clone() },
        MockIndicator { log: log.clone() },
    );
    (dev, log)
}

/// Drain the log, returning what was recorded since the last drain.
pub fn take_calls(log: &CallLog) -> Vec<Call> {
    std::mem::take(&mut *log.borrow_mut())
}
