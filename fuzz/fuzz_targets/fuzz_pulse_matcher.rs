//! Fuzz target: `TolerantPulseMatcher::observe`
//!
//! Each 5-byte chunk is one observation: a polarity byte and a
//! little-endian width.  Timestamps advance by the width, wrapping.
//! The matcher must never panic, never hold more bits than a frame, and
//! only report `Matched` for the configured code.
//!
//! cargo fuzz run fuzz_pulse_matcher

#![no_main]

use homeesp::config::BridgeConfig;
use homeesp::rf::{MatchResult, PulseObservation, TolerantPulseMatcher};
use libfuzzer_sys::fuzz_target;

const TARGET: u32 = 0x00A5_5A0F;

fuzz_target!(|data: &[u8]| {
    let config = BridgeConfig {
        motion_code: TARGET,
        frame_bits: 24,
        ..BridgeConfig::default()
    };
    let Ok(mut matcher) = TolerantPulseMatcher::new(&config) else {
        return;
    };

    let mut t = 0u32;
    for chunk in data.chunks_exact(5) {
        let width = u32::from_le_bytes([chunk[1], chunk[2], chunk[3], chunk[4]]);
        t = t.wrapping_add(width);
        let obs = if chunk[0] & 1 == 0 {
            PulseObservation::mark(width, t)
        } else {
            PulseObservation::space(width, t)
        };

        let result = matcher.observe(obs);
        assert!(matcher.accumulated_bits() < config.frame_bits);
        if let Some(frame) = matcher.take_decoded() {
            assert_eq!(frame.bits, config.frame_bits);
            assert_eq!(result == MatchResult::Matched, frame.code == TARGET);
        } else {
            assert_ne!(result, MatchResult::Matched);
        }
        matcher.expire(t);
    }
});
