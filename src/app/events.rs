//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, forward to a home
//! automation bridge, etc.

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// The application service has started (carries the logical relay state).
    Started { actuator_on: bool },

    /// The relay switched.  `physical` is the pin level after inversion.
    ActuatorChanged { on: bool, physical: bool },

    /// A relay request is waiting for its dwell window.
    ActuatorDeferred { requested: bool, remaining_ms: u32 },

    /// A complete RF frame was decoded.
    CodeReceived { code: u32, bits: u8, motion: bool },

    /// The motion entity changed state.
    MotionChanged(bool),

    /// A temperature sample fell outside the valid range.
    TemperatureUnavailable { raw: u16 },

    /// RF observations were lost because the ISR queue was full
    /// (total since the previous report).
    PulsesDropped(u32),
}
