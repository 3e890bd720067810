//! homeesp firmware entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  RelayDriver    LogPublisher     NvsAdapter     SystemClock    │
//! │  (OutputPort)   (entity states)  (Config+State) (TimePort)     │
//! │  rf_receiver ISR ─▶ pulse queue  TemperatureAdc  ButtonDriver  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  DwellTimeActuator · PulseMatcher · TemperatureReader  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use log::{info, warn};

use homeesp::adapters::log_sink::{LogEventSink, LogPublisher};
use homeesp::adapters::nvs::NvsAdapter;
use homeesp::adapters::time::SystemClock;
use homeesp::app::commands::AppCommand;
use homeesp::app::ports::{ConfigError, ConfigPort, StatePort, TimePort};
use homeesp::app::service::AppService;
use homeesp::config::DeviceConfig;
use homeesp::drivers::adc::TemperatureAdc;
use homeesp::drivers::button::{ButtonDriver, ButtonEvent};
use homeesp::drivers::relay::RelayDriver;
use homeesp::drivers::rf_receiver;
use homeesp::drivers::watchdog::Watchdog;
use homeesp::pins;

const WATCHDOG_TIMEOUT_MS: u32 = 5_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  homeesp v{}                         ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let mut nvs = match NvsAdapter::new() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            None
        }
    };
    let config = match nvs.as_ref().map(ConfigPort::load) {
        Some(Ok(cfg)) => {
            info!("Config loaded from NVS");
            cfg
        }
        Some(Err(ConfigError::NotFound)) => {
            info!("No stored config, using defaults");
            DeviceConfig::default()
        }
        Some(Err(e)) => {
            warn!("NVS config load failed ({}), using defaults", e);
            DeviceConfig::default()
        }
        None => DeviceConfig::default(),
    };
    let restored = nvs.as_ref().and_then(StatePort::load_state);

    // ── 3. Peripherals ────────────────────────────────────────
    // The `gpioN` fields taken here must match `pins`.
    let peripherals = Peripherals::take()?;

    let relay_pin = PinDriver::output(peripherals.pins.gpio5)?;
    debug_assert_eq!(relay_pin.pin(), pins::RELAY_GPIO);
    info!("Relay on GPIO{}", pins::RELAY_GPIO);
    let mut relay = RelayDriver::new(relay_pin);

    let mut button_pin = PinDriver::input(peripherals.pins.gpio0)?;
    debug_assert_eq!(button_pin.pin(), pins::BUTTON_GPIO);
    button_pin.set_pull(Pull::Up)?;
    info!("Button on GPIO{}", pins::BUTTON_GPIO);
    let mut button = ButtonDriver::new(button_pin);

    rf_receiver::init_isr()?;
    let mut adc = TemperatureAdc::new(pins::TEMP_ADC_CHANNEL)?;
    info!(
        "Temperature sensor on GPIO{} (ADC1 channel {})",
        pins::TEMP_ADC_GPIO,
        pins::TEMP_ADC_CHANNEL
    );
    let watchdog = Watchdog::new(WATCHDOG_TIMEOUT_MS);

    // ── 4. Adapters + app service ─────────────────────────────
    let clock = SystemClock::new();
    let mut sink = LogEventSink::new();
    let mut motion = LogPublisher::new("motion_detected");
    let mut temperature = LogPublisher::new("temperature");

    let loop_interval_ms = config.loop_interval_ms;
    let sensor_interval_ms = config.sensor_update_interval_ms;

    let mut app = AppService::new(config)?;
    app.start(restored, clock.millis(), &mut relay, &mut sink);

    // First sample one interval after boot, like the periodic schedule.
    let mut last_sample_ms = clock.millis();

    // ── 5. Main loop ──────────────────────────────────────────
    info!("Entering main loop ({} ms tick)", loop_interval_ms);
    loop {
        // RF: drain everything the ISR captured since the last pass.
        app.report_dropped(rf_receiver::take_dropped(), clock.millis(), &mut sink);
        rf_receiver::drain_pulses(|obs| {
            app.observe_pulse(obs, &mut sink);
        });

        // Button: short press toggles, long press wipes NVS.
        // The button only needs the wrapping low 32 bits.
        match button.poll(clock.millis() as u32) {
            Ok(Some(ButtonEvent::ShortPress)) => {
                app.handle_command(AppCommand::ToggleActuator, clock.millis(), &mut relay, &mut sink);
            }
            Ok(Some(ButtonEvent::LongPress)) => {
                warn!("Long press: erasing stored config and relay state");
                if let Some(store) = nvs.as_ref() {
                    if let Err(e) = store.erase_all() {
                        warn!("NVS erase failed: {}", e);
                    }
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Button read failed: {:?}", e),
        }

        let now = clock.now();
        app.tick(now, &mut relay, &mut motion, &mut sink);

        if now.millis.saturating_sub(last_sample_ms) >= u64::from(sensor_interval_ms) {
            last_sample_ms = now.millis;
            match adc.read() {
                Some(raw) => {
                    app.process_temperature(raw, &mut temperature, &mut sink);
                }
                None => warn!("Temperature sample skipped"),
            }
        }

        if let Some(store) = nvs.as_mut() {
            app.persist_if_needed(store);
        }

        watchdog.feed();
        FreeRtos::delay_ms(loop_interval_ms);
    }
}
