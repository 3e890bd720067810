//! Debounced push-button driver.
//!
//! ## Hardware
//!
//! Active-low momentary switch (the BOOT button) with pull-up.  Polled from
//! the main loop; a level must hold for [`DEBOUNCE_MS`] before it counts.
//!
//! | Gesture     | Condition                 | Event        |
//! |-------------|---------------------------|--------------|
//! | Short press | released before 2 s       | `ShortPress` |
//! | Long press  | held for 2 s              | `LongPress`  |

use embedded_hal::digital::InputPin;

pub const DEBOUNCE_MS: u32 = 50;
pub const LONG_PRESS_MS: u32 = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressState {
    Released,
    Pressed { since_ms: u32, long_reported: bool },
}

pub struct ButtonDriver<P: InputPin> {
    pin: P,
    state: PressState,
    /// Raw level seen last poll and when it last changed.
    raw_pressed: bool,
    raw_changed_at: u32,
}

impl<P: InputPin> ButtonDriver<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            state: PressState::Released,
            raw_pressed: false,
            raw_changed_at: 0,
        }
    }

    /// Call from the main loop.  Returns a classified gesture, if any.
    pub fn poll(&mut self, now_ms: u32) -> Result<Option<ButtonEvent>, P::Error> {
        let pressed = self.pin.is_low()?;
        if pressed != self.raw_pressed {
            self.raw_pressed = pressed;
            self.raw_changed_at = now_ms;
        }
        let stable = now_ms.wrapping_sub(self.raw_changed_at) >= DEBOUNCE_MS;

        let event = match self.state {
            PressState::Released => {
                if stable && pressed {
                    self.state = PressState::Pressed {
                        since_ms: self.raw_changed_at,
                        long_reported: false,
                    };
                }
                None
            }
            PressState::Pressed {
                since_ms,
                long_reported,
            } => {
                if stable && !pressed {
                    self.state = PressState::Released;
                    (!long_reported).then_some(ButtonEvent::ShortPress)
                } else if !long_reported && now_ms.wrapping_sub(since_ms) >= LONG_PRESS_MS {
                    self.state = PressState::Pressed {
                        since_ms,
                        long_reported: true,
                    };
                    Some(ButtonEvent::LongPress)
                } else {
                    None
                }
            }
        };
        Ok(event)
    }
}
