//! Relay output driver.
//!
//! A dumb actuator: writes whatever level the domain asks for.  Dwell
//! times and inversion are handled upstream by
//! [`DwellTimeActuator`](crate::control::DwellTimeActuator).
//!
//! Generic over any `embedded-hal` output pin, so the same driver runs on
//! an ESP-IDF `PinDriver` and on a host-side mock.

use embedded_hal::digital::{Error as _, OutputPin};
use log::warn;

use crate::app::ports::OutputPort;

pub struct RelayDriver<P: OutputPin> {
    pin: P,
    level: Option<bool>,
    write_failures: u32,
}

impl<P: OutputPin> RelayDriver<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            level: None,
            write_failures: 0,
        }
    }

    /// Last level successfully written, `None` before the first write.
    pub fn level(&self) -> Option<bool> {
        self.level
    }

    pub fn write_failures(&self) -> u32 {
        self.write_failures
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> OutputPort for RelayDriver<P> {
    fn set_output(&mut self, high: bool) {
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => self.level = Some(high),
            Err(e) => {
                self.write_failures = self.write_failures.saturating_add(1);
                warn!("relay: pin write failed ({:?})", e.kind());
            }
        }
    }
}
