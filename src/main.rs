//! CO2 Monitor Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                    │
//! │                                                            │
//! │  Scd41        AnyBuzzer      HwBattery     EspPlatform     │
//! │  (GasSensor)  (AlertSignal)  (Battery)     (Platform)      │
//! │  IndicatorLed LogEventSink   rtc_store                     │
//! │                                                            │
//! │  ──────────────── Port Trait Boundary ───────────────      │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │        CycleController (pure logic)              │      │
//! │  │  classify · escalate · sleep decision            │      │
//! │  └──────────────────────────────────────────────────┘      │
//! └────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn, LevelFilter};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;

use co2monitor::adapters::hardware::{self, EspPlatform, HwBattery};
use co2monitor::adapters::log_sink::LogEventSink;
use co2monitor::app::controller::CycleController;
use co2monitor::app::device::Device;
use co2monitor::app::events::AppEvent;
use co2monitor::app::ports::{EventSink, PlatformPort};
use co2monitor::config::{BuzzerKind, MonitorConfig};
use co2monitor::drivers::buzzer::{AnyBuzzer, LedcTone, PiezoBuzzer, SimpleBuzzer};
use co2monitor::drivers::hw_init;
use co2monitor::drivers::indicator::IndicatorLed;
use co2monitor::pins;
use co2monitor::sensors::scd41::Scd41;

fn load_config() -> Result<MonitorConfig> {
    match option_env!("CO2MON_CONFIG_JSON") {
        Some(json) => {
            let config = MonitorConfig::from_json(json)?;
            info!("Config: build-time override");
            Ok(config)
        }
        None => Ok(MonitorConfig::default()),
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  CO2 Monitor v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config ─────────────────────────────────────────────
    let config = match load_config() {
        Ok(c) => c,
        Err(e) => {
            warn!("Config override rejected ({}), using defaults", e);
            MonitorConfig::default()
        }
    };
    log::set_max_level(if config.debug {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    });

    // ── 3. Peripherals ────────────────────────────────────────
    let with_tone = config.buzzer_kind == BuzzerKind::Piezo;
    if let Err(e) = hw_init::init_peripherals(with_tone, config.buzzer_frequency_hz) {
        error!("HAL init failed: {}, restarting", e);
        EspPlatform::new().restart();
    }

    // Pin numbers below must match `pins`.
    info!(
        "Pins: SDA={} SCL={} buzzer={} led={}",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        pins::BUZZER_GPIO,
        pins::ONBOARD_LED_GPIO
    );
    let p = Peripherals::take()?;
    let i2c_cfg = I2cConfig::new().baudrate(Hertz(pins::I2C_BAUDRATE_HZ));
    let i2c = I2cDriver::new(p.i2c0, p.pins.gpio4, p.pins.gpio5, &i2c_cfg)?;
    let sensor = Scd41::new(i2c, FreeRtos);

    let alert = match config.buzzer_kind {
        BuzzerKind::Piezo => AnyBuzzer::Piezo(PiezoBuzzer::new(LedcTone, FreeRtos, &config)),
        BuzzerKind::Simple => AnyBuzzer::Simple(SimpleBuzzer::new(
            PinDriver::output(p.pins.gpio15)?,
            FreeRtos,
            &config,
        )),
    };
    let indicator = IndicatorLed::new(PinDriver::output(p.pins.gpio21)?, FreeRtos, config.allow_led);

    let mut dev = Device::new(sensor, alert, HwBattery, EspPlatform::new(), indicator);
    let mut sink = LogEventSink::new();

    // ── 4. Cold boot or deep-sleep wake ───────────────────────
    let mut controller = match hardware::take_resume_state() {
        Some(state) => {
            info!("Boot: deep-sleep wake (loop {})", state.loop_count);
            CycleController::resume(config, state)
        }
        None => {
            info!("Boot: power-on");
            CycleController::new(config)
        }
    };

    // ── 5. Setup + main loop ──────────────────────────────────
    if let Err(e) = controller.setup(&mut dev, &mut sink) {
        sink.emit(&AppEvent::Fault(e));
        dev.platform.clear_retained_state();
        dev.platform.restart();
    }

    loop {
        if let Err(e) = controller.iterate(&mut dev, &mut sink) {
            sink.emit(&AppEvent::Fault(e));
            error!("Cycle failed: {}, restarting", e);
            dev.platform.clear_retained_state();
            dev.platform.restart();
        }
    }
}
