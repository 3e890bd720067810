//! Device configuration parameters
//!
//! All tunable parameters for the relay, RF bridge and temperature sensor.
//! Values come from a JSON document during development and from a postcard
//! blob in NVS on the device. Every section is validated before a component
//! is built from it.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rf::codec::MAX_FRAME_BITS;
use crate::rf::matcher::code_mask;
use crate::rf::timing::ProtocolTiming;

/// Longest accepted dwell (~24.8 days).
pub const MAX_DWELL_MS: u32 = u32::MAX / 2;

/// Longest time an unconsumed RF match is kept.
const MAX_MATCH_HOLD_MS: u32 = 60_000;

/// Relay / switch behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// Minimum time the output stays on before it may turn off (ms).
    pub min_on_time_ms: u32,
    /// Minimum time the output stays off before it may turn on (ms).
    pub min_off_time_ms: u32,
    /// Drive the pin low for "on".
    pub inverted: bool,
    /// Persist the logical state and re-apply it at boot.
    pub restore_state: bool,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            min_on_time_ms: 0,
            min_off_time_ms: 0,
            inverted: false,
            restore_state: false,
        }
    }
}

impl ActuatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_on_time_ms > MAX_DWELL_MS {
            return Err(Error::InvalidConfig("min_on_time_ms exceeds clock wrap window"));
        }
        if self.min_off_time_ms > MAX_DWELL_MS {
            return Err(Error::InvalidConfig("min_off_time_ms exceeds clock wrap window"));
        }
        Ok(())
    }
}

/// 433 MHz bridge: protocol timing plus the code that means "motion".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub timing: ProtocolTiming,
    /// Code transmitted by the motion sensor.
    pub motion_code: u32,
    /// Data bits per frame (1–32).
    pub frame_bits: u8,
    /// Silence longer than `gap_multiple × pulse_length` ends a partial frame.
    pub gap_multiple: u8,
    /// How long an unconsumed match stays set (ms, 0 = until consumed).
    pub match_hold_ms: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            timing: ProtocolTiming::default(),
            motion_code: 0,
            frame_bits: MAX_FRAME_BITS,
            gap_multiple: 8,
            match_hold_ms: 1000,
        }
    }
}

impl BridgeConfig {
    /// Inter-observation silence (µs) that abandons a partial frame.
    pub fn frame_gap_us(&self) -> u32 {
        self.timing
            .pulse_length_us
            .saturating_mul(u32::from(self.gap_multiple))
    }

    pub fn validate(&self) -> Result<()> {
        self.timing.validate()?;
        if !(1..=MAX_FRAME_BITS).contains(&self.frame_bits) {
            return Err(Error::InvalidConfig("frame_bits must be 1–32"));
        }
        if self.motion_code & !code_mask(self.frame_bits) != 0 {
            return Err(Error::InvalidConfig("motion_code does not fit in frame_bits"));
        }
        if self.frame_gap_us() <= self.timing.longest_data_pulse_us() {
            return Err(Error::InvalidConfig(
                "gap_multiple too small: frame gap must exceed every data pulse",
            ));
        }
        if self.match_hold_ms > MAX_MATCH_HOLD_MS {
            return Err(Error::InvalidConfig("match_hold_ms must be <= 60000"));
        }
        Ok(())
    }
}

/// ADC → °C conversion parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureConfig {
    /// Readings below this are reported unavailable.
    pub min_valid_c: f32,
    /// Readings above this are reported unavailable.
    pub max_valid_c: f32,
    /// Voltage that maps to `min_valid_c`.
    pub adc_min_voltage: f32,
    /// ADC reference voltage; maps to `max_valid_c`.
    pub adc_max_voltage: f32,
    /// Full-scale raw ADC value.
    pub adc_resolution: u16,
    /// Calibration offset added to every valid reading.
    pub offset_c: f32,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            min_valid_c: -40.0,
            max_valid_c: 85.0,
            adc_min_voltage: 0.0,
            adc_max_voltage: 3.3,
            adc_resolution: 4095, // 12-bit
            offset_c: 0.0,
        }
    }
}

impl TemperatureConfig {
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.min_valid_c,
            self.max_valid_c,
            self.adc_min_voltage,
            self.adc_max_voltage,
            self.offset_c,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidConfig("temperature parameters must be finite"));
        }
        if self.min_valid_c >= self.max_valid_c {
            return Err(Error::InvalidConfig("min_valid_c must be below max_valid_c"));
        }
        if self.adc_resolution == 0 {
            return Err(Error::InvalidConfig("adc_resolution must be > 0"));
        }
        if self.adc_max_voltage <= self.adc_min_voltage {
            return Err(Error::InvalidConfig(
                "adc_max_voltage must be above adc_min_voltage",
            ));
        }
        Ok(())
    }
}

/// Complete device configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub actuator: ActuatorConfig,
    pub bridge: BridgeConfig,
    pub temperature: TemperatureConfig,

    // --- Timing ---
    /// Main loop period (milliseconds)
    pub loop_interval_ms: u32,
    /// Temperature sample period (milliseconds)
    pub sensor_update_interval_ms: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            actuator: ActuatorConfig::default(),
            bridge: BridgeConfig::default(),
            temperature: TemperatureConfig::default(),
            loop_interval_ms: 10,              // 100 Hz
            sensor_update_interval_ms: 60_000, // 1/min
        }
    }
}

impl DeviceConfig {
    pub fn validate(&self) -> Result<()> {
        self.actuator.validate()?;
        self.bridge.validate()?;
        self.temperature.validate()?;
        if self.loop_interval_ms == 0 {
            return Err(Error::InvalidConfig("loop_interval_ms must be > 0"));
        }
        if self.sensor_update_interval_ms < self.loop_interval_ms {
            return Err(Error::InvalidConfig(
                "sensor_update_interval_ms must be >= loop_interval_ms",
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON document.  Missing fields take defaults.
    pub fn from_json(doc: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(doc).map_err(|e| {
            warn!("config: rejecting document: {e}");
            Error::InvalidConfig("malformed config document")
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize for NVS storage.
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        postcard::to_allocvec(self).map_err(|_| Error::InvalidConfig("config not serializable"))
    }

    /// Decode and validate an NVS blob.
    pub fn from_blob(bytes: &[u8]) -> Result<Self> {
        let config: Self = postcard::from_bytes(bytes)
            .map_err(|_| Error::InvalidConfig("malformed config blob"))?;
        config.validate()?;
        Ok(config)
    }
}
