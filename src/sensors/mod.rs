//! Sensor subsystem.
//!
//! Sensors here are pure converters: the main loop samples the hardware
//! and hands raw values in, so everything below runs unchanged on the host.

pub mod temperature;

pub use temperature::{TemperatureReader, TemperatureReading};
