//! 433 MHz receiver front end.
//!
//! Turns raw data-pin edges into timed [`PulseObservation`]s.
//!
//! ## Two capture paths
//!
//! - **Interrupt** (ESP-IDF): the GPIO ISR calls [`rf_isr_handler`] on
//!   every edge.  Observations go into a bounded queue shared through a
//!   `critical_section::Mutex`; the main loop empties it with
//!   [`drain_pulses`].  A full queue drops new observations and counts
//!   them ([`take_dropped`]).
//! - **Polling**: [`RfReceiver`] samples any `embedded-hal` input pin from
//!   a tight loop.  Good enough for bench testing, too jittery for real
//!   remotes at 350 µs.

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::InputPin;
use heapless::Deque;

use crate::rf::{Edge, PulseObservation};

/// Roughly two full 32-bit frames.
pub const PULSE_QUEUE_CAPACITY: usize = 128;

/// Measures the time between consecutive edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeTracker {
    last_edge_at: Option<u32>,
}

impl EdgeTracker {
    pub const fn new() -> Self {
        Self { last_edge_at: None }
    }

    /// Record an edge.  The first edge only sets the reference point.
    pub fn on_edge(&mut self, edge: Edge, now_us: u32) -> Option<PulseObservation> {
        let prev = self.last_edge_at.replace(now_us)?;
        Some(PulseObservation {
            width: now_us.wrapping_sub(prev),
            edge,
            observed_at: now_us,
        })
    }

    pub fn reset(&mut self) {
        self.last_edge_at = None;
    }
}

// ── ISR path ──────────────────────────────────────────────────

struct IsrState {
    tracker: EdgeTracker,
    queue: Deque<PulseObservation, PULSE_QUEUE_CAPACITY>,
    dropped: u32,
}

static RF_ISR_STATE: Mutex<RefCell<IsrState>> = Mutex::new(RefCell::new(IsrState {
    tracker: EdgeTracker::new(),
    queue: Deque::new(),
    dropped: 0,
}));

/// ISR handler: call on every edge of the receiver data pin.
/// Bounded work, no allocation.
pub fn rf_isr_handler(edge: Edge, now_us: u32) {
    critical_section::with(|cs| {
        let mut guard = RF_ISR_STATE.borrow_ref_mut(cs);
        let state = &mut *guard;
        if let Some(obs) = state.tracker.on_edge(edge, now_us) {
            if state.queue.push_back(obs).is_err() {
                state.dropped = state.dropped.saturating_add(1);
            }
        }
    });
}

/// Hand every queued observation to `handler`, oldest first.
/// Returns how many were delivered.
pub fn drain_pulses(mut handler: impl FnMut(PulseObservation)) -> usize {
    let mut delivered = 0;
    // One pop per critical section keeps interrupt latency flat.
    while let Some(obs) = critical_section::with(|cs| RF_ISR_STATE.borrow_ref_mut(cs).queue.pop_front()) {
        handler(obs);
        delivered += 1;
    }
    delivered
}

/// Observations dropped since the last call.
pub fn take_dropped() -> u32 {
    critical_section::with(|cs| core::mem::take(&mut RF_ISR_STATE.borrow_ref_mut(cs).dropped))
}

/// Empty the queue and forget the last edge.
pub fn reset_isr_state() {
    critical_section::with(|cs| {
        let mut state = RF_ISR_STATE.borrow_ref_mut(cs);
        state.tracker.reset();
        state.queue.clear();
        state.dropped = 0;
    });
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn rf_gpio_isr(_arg: *mut core::ffi::c_void) {
    use esp_idf_svc::sys::{esp_timer_get_time, gpio_get_level};
    // SAFETY: esp_timer_get_time and gpio_get_level are register reads;
    // safe in ISR context.
    let now_us = unsafe { esp_timer_get_time() } as u32;
    let high = unsafe { gpio_get_level(crate::pins::RF_RX_GPIO) } != 0;
    rf_isr_handler(if high { Edge::Rising } else { Edge::Falling }, now_us);
}

/// Maps an `esp_err_t` to `Error::Init` (`ESP_OK` is 0).
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
fn esp_check(ret: i32, what: &'static str) -> crate::Result<()> {
    if ret == 0 {
        Ok(())
    } else {
        log::error!("rf: {} ({})", what, ret);
        Err(crate::Error::Init(what))
    }
}

/// Configure the receiver pin as an any-edge interrupt source.
/// Call once from `main()` before the loop starts.
#[cfg(target_os = "espidf")]
pub fn init_isr() -> crate::Result<()> {
    use esp_idf_svc::sys::*;

    use crate::pins;

    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::RF_RX_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_ANYEDGE,
    };
    // SAFETY: called once from main() before the loop; the handler is a
    // static function that only touches the critical-section queue.
    unsafe {
        esp_check(gpio_config(&cfg), "rf receiver gpio_config failed")?;
        let ret = gpio_install_isr_service(0);
        if ret != ESP_ERR_INVALID_STATE as i32 {
            esp_check(ret, "gpio isr service install failed")?;
        }
        esp_check(
            gpio_isr_handler_add(pins::RF_RX_GPIO, Some(rf_gpio_isr), core::ptr::null_mut()),
            "rf receiver isr registration failed",
        )?;
        esp_check(gpio_intr_enable(pins::RF_RX_GPIO), "rf receiver interrupt enable failed")?;
    }
    log::info!("rf: receiver ISR installed on GPIO{}", pins::RF_RX_GPIO);
    Ok(())
}

// ── Polling path ──────────────────────────────────────────────

pub struct RfReceiver<P: InputPin> {
    pin: P,
    tracker: EdgeTracker,
    level: Option<bool>,
}

impl<P: InputPin> RfReceiver<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            tracker: EdgeTracker::new(),
            level: None,
        }
    }

    /// Sample the pin.  Returns an observation when the level changed
    /// since the previous sample.
    pub fn poll(&mut self, now_us: u32) -> Result<Option<PulseObservation>, P::Error> {
        let high = self.pin.is_high()?;
        match self.level.replace(high) {
            Some(prev) if prev != high => {
                let edge = if high { Edge::Rising } else { Edge::Falling };
                Ok(self.tracker.on_edge(edge, now_us))
            }
            _ => Ok(None),
        }
    }

    pub fn release(self) -> P {
        self.pin
    }
}
