//! Hood ventilation controller: firmware entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                  │
//! │                                                          │
//! │  HardwareAdapter      LogEventSink     MonotonicClock    │
//! │  (PinDriver, ADC,     (EventSink)      (esp_timer)       │
//! │   BME280 on I²C)                                         │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ───────────────     │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │          VentController (pure logic)           │      │
//! │  │  switches · triggers · relays · vent actuator  │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Single cooperative loop: one `tick` every 10 ms.
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{IOPin, OutputPin, PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use hoodvent::adapters::hardware::HardwareAdapter;
use hoodvent::adapters::log_sink::LogEventSink;
use hoodvent::adapters::time::MonotonicClock;
use hoodvent::app::ports::AnalogPort;
use hoodvent::config::VentConfig;
use hoodvent::error::SensorError;
use hoodvent::sensors::bme280::Bme280;
use hoodvent::{VentController, pins};

const POLL_INTERVAL_MS: u32 = 10;

/// Analog port over a one-shot ADC read closure.
struct AdcPort<F>(F);

impl<F: FnMut(u8) -> Result<u16, SensorError>> AnalogPort for AdcPort<F> {
    fn read_analog(&mut self, pin: u8) -> Result<u16, SensorError> {
        (self.0)(pin)
    }
}

fn load_config() -> Result<VentConfig> {
    match option_env!("HOODVENT_CONFIG") {
        Some(doc) => {
            let config = VentConfig::from_json(doc).map_err(hoodvent::Error::from)?;
            info!("Config: build-time override applied");
            Ok(config)
        }
        None => {
            info!("Config: defaults");
            Ok(VentConfig::default())
        }
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Hoodvent v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config()?;

    // ── 3. Peripherals ────────────────────────────────────────
    let p = Peripherals::take()?;

    let outputs = [
        (pins::RE1_PIN, PinDriver::output(p.pins.gpio4.downgrade_output())?),
        (pins::RE2_PIN, PinDriver::output(p.pins.gpio5.downgrade_output())?),
        (pins::RE3_PIN, PinDriver::output(p.pins.gpio6.downgrade_output())?),
        (pins::RE4_PIN, PinDriver::output(p.pins.gpio7.downgrade_output())?),
    ];

    let mut sw1 = PinDriver::input(p.pins.gpio2.downgrade())?;
    sw1.set_pull(Pull::Up)?;
    let mut sw2 = PinDriver::input(p.pins.gpio3.downgrade())?;
    sw2.set_pull(Pull::Up)?;
    let inputs = [(pins::SW1_PIN, sw1), (pins::SW2_PIN, sw2)];

    let adc = AdcDriver::new(p.adc2)?;
    let mut acs712 = AdcChannelDriver::new(&adc, p.pins.gpio14, &AdcChannelConfig::new())?;
    let analog = AdcPort(|_pin: u8| {
        adc.read(&mut acs712).map_err(|e| {
            warn!("ADC read failed: {}", e);
            SensorError::Bus
        })
    });

    let i2c = I2cDriver::new(
        p.i2c0,
        p.pins.gpio8,
        p.pins.gpio9,
        &I2cConfig::new().baudrate(Hertz(100_000)),
    )?;
    let mut bme = Bme280::new(i2c, pins::BME280_ADDR);
    if config.humidity_sensor_enabled {
        if let Err(e) = bme.init() {
            warn!("BME280 init failed ({}), retrying on each sample", e);
        }
    }

    let mut hw = HardwareAdapter::new(outputs, inputs, analog, bme);

    // ── 4. Controller ─────────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut sink = LogEventSink::new();
    let mut controller = VentController::new(config);
    controller.init(&mut hw, &mut sink);

    info!("System ready. Entering poll loop.");

    // ── 5. Poll loop ──────────────────────────────────────────
    loop {
        controller.tick(clock.now_ms(), &mut hw, &mut sink);
        FreeRtos::delay_ms(POLL_INTERVAL_MS);
    }
}
