//! GPIO / peripheral pin assignments for the ESP32 relay board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  `main.rs` takes the matching `gpioN` from
//! `Peripherals`; keep the two in step.

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

/// Relay coil driver transistor.  HIGH energises the coil unless the
/// actuator is configured `inverted`.
pub const RELAY_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// 433 MHz receiver (SYN480R / RXB6 style, data out)
// ---------------------------------------------------------------------------

/// Demodulated data output; any-edge interrupt source.
pub const RF_RX_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Temperature sensor (TMP36 style, analog)
// ---------------------------------------------------------------------------

/// Sensor output pin.
pub const TEMP_ADC_GPIO: i32 = 34;
/// ADC1 channel wired to `TEMP_ADC_GPIO` on the classic ESP32.
pub const TEMP_ADC_CHANNEL: u32 = 6;

// ---------------------------------------------------------------------------
// User button (active-low, internal pull-up)
// ---------------------------------------------------------------------------

/// BOOT button; toggles the relay.
pub const BUTTON_GPIO: i32 = 0;
