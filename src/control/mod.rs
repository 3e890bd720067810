//! Actuator control: dwell-time gated relay logic.

pub mod dwell;

pub use dwell::DwellTimeActuator;
