//! One-shot ADC sampling for the temperature sensor.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: ADC1 oneshot unit, 12-bit, 12 dB attenuation (0–3.3 V).
//! On host/test: reads from a static AtomicU16 for injection.

use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::error::Result;

/// Simulated raw sample, mid-scale by default.
static SIM_ADC_RAW: AtomicU16 = AtomicU16::new(2048);

/// Inject the value returned by [`TemperatureAdc::read`] on the host.
pub fn sim_set_raw(raw: u16) {
    SIM_ADC_RAW.store(raw, Ordering::Relaxed);
}

pub struct TemperatureAdc {
    #[cfg(target_os = "espidf")]
    handle: adc_oneshot_unit_handle_t,
    channel: u32,
}

impl TemperatureAdc {
    #[cfg(target_os = "espidf")]
    pub fn new(channel: u32) -> Result<Self> {
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        let mut handle: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        // SAFETY: called once from main(); the handle is owned by `Self`.
        let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(crate::Error::Init("ADC1 unit init failed"));
        }

        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        let ret = unsafe { adc_oneshot_config_channel(handle, channel, &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(crate::Error::Init("ADC1 channel config failed"));
        }

        log::info!("adc: ADC1 channel {} configured (12-bit, 12 dB)", channel);
        Ok(Self { handle, channel })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(channel: u32) -> Result<Self> {
        log::info!("adc(sim): channel {} reads injected values", channel);
        Ok(Self { channel })
    }

    /// One raw sample, `None` if the conversion failed.
    #[cfg(target_os = "espidf")]
    pub fn read(&mut self) -> Option<u16> {
        let mut raw: i32 = 0;
        // SAFETY: handle was created in `new`; main-loop access only.
        let ret = unsafe { adc_oneshot_read(self.handle, self.channel, &mut raw) };
        if ret != ESP_OK as i32 {
            log::warn!("adc: read on channel {} failed ({})", self.channel, ret);
            return None;
        }
        Some(raw.max(0) as u16)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read(&mut self) -> Option<u16> {
        Some(SIM_ADC_RAW.load(Ordering::Relaxed))
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }
}
