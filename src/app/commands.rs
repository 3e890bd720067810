//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (switch entity,
//! push button, serial console) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// Switch the relay on or off (subject to dwell times).
    SetActuator(bool),

    /// Flip the relay's logical state.
    ToggleActuator,

    /// Change the temperature calibration offset at runtime.
    SetTemperatureOffset(f32),
}
