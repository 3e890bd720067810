//! Peripheral drivers: relay output, RF receiver front end, temperature ADC,
//! button, watchdog.

pub mod adc;
pub mod button;
pub mod relay;
pub mod rf_receiver;
pub mod watchdog;
