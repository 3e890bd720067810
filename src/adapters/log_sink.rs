//! Log-based adapters.
//!
//! [`LogEventSink`] implements [`EventSink`] by writing structured
//! application events to the ESP-IDF logger (UART / USB-CDC in
//! production).  [`LogPublisher`] stands in for a home-automation entity
//! and logs every state it is asked to publish.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{BinaryPublisher, EventSink, SensorPublisher};

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
            AppEvent::Started { actuator_on } => {
                info!("START | relay={}", on_off(*actuator_on));
            }
            AppEvent::ActuatorChanged { on, physical } => {
                info!(
                    "RELAY | {} (pin {})",
                    on_off(*on),
                    if *physical { "HIGH" } else { "LOW" }
                );
            }
            AppEvent::ActuatorDeferred {
                requested,
                remaining_ms,
            } => {
                info!(
                    "RELAY | {} deferred, {} ms dwell remaining",
                    on_off(*requested),
                    remaining_ms
                );
            }
            AppEvent::CodeReceived { code, bits, motion } => {
                info!(
                    "RF    | code=0x{:08X} bits={}{}",
                    code,
                    bits,
                    if *motion { " [motion]" } else { "" }
                );
            }
            AppEvent::MotionChanged(active) => {
                info!("MOTION| {}", if *active { "detected" } else { "clear" });
            }
            AppEvent::TemperatureUnavailable { raw } => {
                warn!("TEMP  | reading out of range (raw={})", raw);
            }
            AppEvent::PulsesDropped(count) => {
                warn!("RF    | {} pulses dropped", count);
            }
        }
    }
}

/// Entity publisher that only logs.
pub struct LogPublisher {
    name: &'static str,
}

impl LogPublisher {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl BinaryPublisher for LogPublisher {
    fn publish(&mut self, state: bool) {
        info!("{} -> {}", self.name, on_off(state));
    }
}

impl SensorPublisher for LogPublisher {
    fn publish(&mut self, value: f32) {
        info!("{} -> {:.1}\u{00b0}C", self.name, value);
    }

    fn publish_unavailable(&mut self) {
        info!("{} -> unavailable", self.name);
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}
