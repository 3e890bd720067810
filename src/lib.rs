//! home-esp firmware library.
//!
//! Dwell-gated relay control, a 433 MHz motion-code bridge and a linear
//! temperature sensor, exposed for integration testing.  All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod rf;
pub mod sensors;

mod error;
pub mod pins;

pub mod adapters;
pub mod drivers;

pub use error::{Error, Result};
