//! Linear analog temperature sensor (TMP36 and similar).
//!
//! The sensor output voltage maps linearly onto a temperature range:
//! `adc_min_voltage` is `min_valid_c`, `adc_max_voltage` is `max_valid_c`.
//! Anything that converts outside that range is a wiring fault or a
//! disconnected sensor and is reported as unavailable rather than clamped.

use log::debug;

use crate::config::TemperatureConfig;
use crate::error::Result;

#[derive(Debug, Clone, Copy)]
pub struct TemperatureReading {
    pub raw: u16,
    /// `None` when the conversion falls outside the valid range.
    pub celsius: Option<f32>,
}

pub struct TemperatureReader {
    config: TemperatureConfig,
}

impl TemperatureReader {
    pub fn new(config: TemperatureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Convert a raw ADC sample.  Returns the calibrated temperature, or
    /// `None` if the reading is outside `[min_valid_c, max_valid_c]`.
    pub fn process_raw_reading(&self, raw: u16) -> Option<f32> {
        let celsius = self.convert(raw);
        if self.is_valid(celsius) {
            Some(celsius + self.config.offset_c)
        } else {
            debug!("temp: raw {raw} -> {celsius:.2} C outside valid range");
            None
        }
    }

    pub fn read(&self, raw: u16) -> TemperatureReading {
        TemperatureReading {
            raw,
            celsius: self.process_raw_reading(raw),
        }
    }

    /// Update the calibration offset.
    pub fn set_offset(&mut self, offset_c: f32) {
        self.config.offset_c = offset_c;
    }

    pub fn config(&self) -> &TemperatureConfig {
        &self.config
    }

    fn convert(&self, raw: u16) -> f32 {
        let c = &self.config;
        let voltage = (raw as f32 / c.adc_resolution as f32) * c.adc_max_voltage;
        let temp_range = c.max_valid_c - c.min_valid_c;
        let voltage_range = c.adc_max_voltage - c.adc_min_voltage;
        c.min_valid_c + (voltage - c.adc_min_voltage) * temp_range / voltage_range
    }

    fn is_valid(&self, celsius: f32) -> bool {
        (self.config.min_valid_c..=self.config.max_valid_c).contains(&celsius)
    }
}
