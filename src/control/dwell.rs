//! Minimum on/off dwell enforcement for a binary actuator.
//!
//! The relay must not chatter: once switched on it stays on for at least
//! `min_on_time_ms`, once switched off it stays off for at least
//! `min_off_time_ms`.  A request that arrives too early is remembered as
//! *pending* and applied by a later `request`/`tick` call once its window
//! has elapsed.  Nothing here owns a timer.
//!
//! Time is the 64-bit millisecond uptime, so elapsed time never wraps and
//! a relay idle for months is not mistaken for one that just switched.

use log::debug;

use crate::config::ActuatorConfig;
use crate::error::Result;

pub struct DwellTimeActuator {
    config: ActuatorConfig,
    /// Logical state last applied (after dwell gating, before inversion).
    logical: bool,
    /// Level last written to the output.
    physical: bool,
    pending: Option<bool>,
    /// `None` = no transition yet, treated as infinitely long ago.
    last_transition_at: Option<u64>,
}

impl DwellTimeActuator {
    /// Build an actuator in the logical OFF state.
    pub fn new(config: ActuatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            logical: false,
            physical: config.inverted,
            pending: None,
            last_transition_at: None,
            config,
        })
    }

    /// Ask for `desired`.  Returns `true` if the physical output changed.
    pub fn request(&mut self, desired: bool, now_ms: u64) -> bool {
        if desired == self.logical {
            // Also cancels a deferred request for the opposite state.
            self.pending = None;
            return false;
        }

        if self.dwell_satisfied(desired, now_ms) {
            self.apply(desired, now_ms);
            true
        } else {
            if self.pending != Some(desired) {
                debug!(
                    "actuator: {} deferred, {} ms of dwell remaining",
                    if desired { "ON" } else { "OFF" },
                    self.remaining(desired, now_ms)
                );
            }
            self.pending = Some(desired);
            false
        }
    }

    /// Re-evaluate a deferred request.  Returns `true` if it was applied.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        match self.pending {
            Some(desired) => self.request(desired, now_ms),
            None => false,
        }
    }

    /// Request the opposite of the current logical state.
    pub fn toggle(&mut self, now_ms: u64) -> bool {
        self.request(!self.logical, now_ms)
    }

    pub fn is_on(&self) -> bool {
        self.logical
    }

    /// Output level, inversion applied.
    pub fn physical(&self) -> bool {
        self.physical
    }

    pub fn pending(&self) -> Option<bool> {
        self.pending
    }

    pub fn config(&self) -> &ActuatorConfig {
        &self.config
    }

    /// Milliseconds until the pending request may apply.
    pub fn remaining_dwell(&self, now_ms: u64) -> Option<u32> {
        let desired = self.pending?;
        Some(self.remaining(desired, now_ms))
    }

    // ── Internal ──────────────────────────────────────────────────

    fn required_dwell(&self, desired: bool) -> u32 {
        if desired {
            self.config.min_off_time_ms
        } else {
            self.config.min_on_time_ms
        }
    }

    fn elapsed(&self, now_ms: u64) -> Option<u64> {
        self.last_transition_at.map(|t| now_ms.saturating_sub(t))
    }

    fn remaining(&self, desired: bool, now_ms: u64) -> u32 {
        let elapsed = self.elapsed(now_ms).unwrap_or(u64::MAX);
        // Bounded by the u32 dwell, so the narrowing is lossless.
        u64::from(self.required_dwell(desired)).saturating_sub(elapsed) as u32
    }

    fn dwell_satisfied(&self, desired: bool, now_ms: u64) -> bool {
        self.elapsed(now_ms)
            .is_none_or(|elapsed| elapsed >= u64::from(self.required_dwell(desired)))
    }

    fn apply(&mut self, desired: bool, now_ms: u64) {
        self.logical = desired;
        self.physical = desired ^ self.config.inverted;
        self.last_transition_at = Some(now_ms);
        self.pending = None;
        debug!(
            "actuator: -> {} (output {})",
            if desired { "ON" } else { "OFF" },
            if self.physical { "high" } else { "low" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actuator(min_on_time_ms: u32, min_off_time_ms: u32) -> DwellTimeActuator {
        DwellTimeActuator::new(ActuatorConfig {
            min_on_time_ms,
            min_off_time_ms,
            ..ActuatorConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn starts_off() {
        let a = actuator(0, 0);
        assert!(!a.is_on());
        assert!(!a.physical());
        assert_eq!(a.pending(), None);
    }

    #[test]
    fn first_request_is_never_gated() {
        let mut a = actuator(10_000, 10_000);
        assert!(a.request(true, 0));
        assert!(a.is_on());
    }

    #[test]
    fn min_on_time_example() {
        let mut a = actuator(5_000, 0);
        assert!(a.request(true, 0));
        assert!(!a.request(false, 2_000));
        assert!(a.is_on());
        assert_eq!(a.pending(), Some(false));
        assert!(a.request(false, 5_000));
        assert!(!a.is_on());
    }

    #[test]
    fn min_on_time_exact_boundary() {
        let mut a = actuator(1_000, 0);
        a.request(true, 0);
        assert!(!a.request(false, 999));
        assert!(a.request(false, 1_000));
    }

    #[test]
    fn min_off_time_exact_boundary() {
        let mut a = actuator(0, 1_000);
        a.request(true, 0);
        a.request(false, 100);
        assert!(!a.request(true, 600));
        assert!(!a.is_on());
        assert!(a.request(true, 1_100));
        assert!(a.is_on());
    }

    #[test]
    fn combined_on_and_off_times() {
        let mut a = actuator(500, 1_000);
        a.request(true, 0);
        assert!(a.request(false, 600));
        assert!(!a.request(true, 700));
        assert!(a.request(true, 1_600));
    }

    #[test]
    fn dwell_measured_past_u32_millis() {
        let mut a = actuator(1_000, 0);
        let t = u64::from(u32::MAX) - 500;
        a.request(true, t);
        assert!(!a.request(false, t + 999));
        assert!(a.request(false, t + 1_000));
    }

    #[test]
    fn long_idle_relay_is_not_deferred() {
        let mut a = actuator(0, 5_000);
        a.request(true, 0);
        a.request(false, 1);
        // A u32 ms clock would read 1_001 here and defer by 4 s.
        let later = (1u64 << 32) + 1_001;
        assert!(a.request(true, later));
        assert!(a.is_on());
        assert_eq!(a.remaining_dwell(later), None);
    }

    #[test]
    fn tick_applies_deferred_request() {
        let mut a = actuator(1_000, 0);
        a.request(true, 0);
        assert!(!a.request(false, 200));
        assert!(!a.tick(999));
        assert!(a.tick(1_000));
        assert!(!a.is_on());
        assert_eq!(a.pending(), None);
        assert!(!a.tick(2_000));
    }

    #[test]
    fn same_state_request_cancels_pending() {
        let mut a = actuator(1_000, 0);
        a.request(true, 0);
        a.request(false, 200);
        assert!(!a.request(true, 300));
        assert_eq!(a.pending(), None);
        assert!(!a.tick(5_000));
        assert!(a.is_on());
    }

    #[test]
    fn repeated_request_is_noop() {
        let mut a = actuator(0, 0);
        assert!(a.request(true, 10));
        assert!(!a.request(true, 11));
        assert!(a.is_on());
    }

    #[test]
    fn inverted_output() {
        let mut a = DwellTimeActuator::new(ActuatorConfig {
            inverted: true,
            ..ActuatorConfig::default()
        })
        .unwrap();
        assert!(a.physical());
        a.request(true, 0);
        assert!(a.is_on());
        assert!(!a.physical());
        a.request(false, 1);
        assert!(a.physical());
    }

    #[test]
    fn rapid_toggle_without_constraints() {
        let mut a = actuator(0, 0);
        let changes = (0..10).filter(|&i| a.toggle(i)).count();
        assert_eq!(changes, 10);
        assert!(!a.is_on());
    }

    #[test]
    fn remaining_dwell_counts_down() {
        let mut a = actuator(5_000, 0);
        a.request(true, 0);
        assert_eq!(a.remaining_dwell(1_000), None);
        a.request(false, 1_000);
        assert_eq!(a.remaining_dwell(1_000), Some(4_000));
        assert_eq!(a.remaining_dwell(6_000), Some(0));
    }

    #[test]
    fn rejects_dwell_beyond_wrap_window() {
        let cfg = ActuatorConfig {
            min_on_time_ms: u32::MAX,
            ..ActuatorConfig::default()
        };
        assert!(DwellTimeActuator::new(cfg).is_err());
    }
}
