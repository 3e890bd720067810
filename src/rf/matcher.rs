//! Streaming pulse-code matcher.
//!
//! Consumes one [`PulseObservation`] at a time, pairs each high pulse
//! (ended by a falling edge) with the following low pulse (ended by a
//! rising edge) into a bit, and compares every complete frame against the
//! configured motion code.
//!
//! ## Reset policy
//!
//! | Condition                                   | Effect                     |
//! |---------------------------------------------|----------------------------|
//! | width outside every symbol window (noise)   | drop partial frame         |
//! | two marks or a space without a mark         | drop partial frame         |
//! | sync pair                                   | drop partial frame (boundary) |
//! | gap since last observation > frame gap      | drop partial frame, then classify |
//! | frame complete                              | compare, then start over   |
//!
//! None of these are errors: a 433 MHz receiver outputs noise whenever no
//! remote is transmitting.

use log::debug;

use super::codec::MAX_FRAME_BITS;
use super::timing::ProtocolTiming;
use super::{Edge, PulseObservation};
use crate::config::BridgeConfig;
use crate::error::Result;

/// Outcome of a single [`TolerantPulseMatcher::observe`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Nothing in progress: noise, a reset, or a completed non-matching frame.
    None,
    /// A frame is being accumulated.
    Partial,
    /// A complete frame equal to the target code was just decoded.
    Matched,
}

/// A complete frame, whether or not it matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame {
    pub code: u32,
    pub bits: u8,
}

pub struct TolerantPulseMatcher {
    timing: ProtocolTiming,
    target_code: u32,
    frame_bits: u8,
    frame_gap_us: u32,
    /// 0 = `matched` stays set until consumed.
    match_hold_us: u32,

    code: u32,
    bits: u8,
    /// High half of the symbol currently being received.
    pending_mark: Option<u32>,
    last_observed_at: Option<u32>,

    matched: bool,
    matched_at: u32,
    decoded: Option<DecodedFrame>,
}

impl TolerantPulseMatcher {
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            timing: config.timing,
            target_code: config.motion_code,
            frame_bits: config.frame_bits,
            frame_gap_us: config.frame_gap_us(),
            match_hold_us: config.match_hold_ms.saturating_mul(1000),
            code: 0,
            bits: 0,
            pending_mark: None,
            last_observed_at: None,
            matched: false,
            matched_at: 0,
            decoded: None,
        })
    }

    /// Feed one observation.  O(1); safe to call from a tight polling loop.
    pub fn observe(&mut self, obs: PulseObservation) -> MatchResult {
        if self.is_accumulating() && self.deadline_passed(obs.observed_at) {
            debug!(
                "rf: frame gap exceeded after {} bits, dropping partial frame",
                self.bits
            );
            self.reset_frame();
        }
        self.last_observed_at = Some(obs.observed_at);

        match obs.edge {
            Edge::Falling => self.accept_mark(obs.width),
            Edge::Rising => self.accept_space(obs.width, obs.observed_at),
        }
    }

    /// Return and clear the matched flag.
    pub fn take_match(&mut self) -> bool {
        core::mem::take(&mut self.matched)
    }

    pub fn is_matched(&self) -> bool {
        self.matched
    }

    /// Clear a match nobody consumed within `match_hold_ms`.
    pub fn expire(&mut self, now_us: u32) {
        if self.matched
            && self.match_hold_us > 0
            && now_us.wrapping_sub(self.matched_at) >= self.match_hold_us
        {
            debug!("rf: unconsumed match expired");
            self.matched = false;
        }
    }

    /// Most recent complete frame, handed out once.
    pub fn take_decoded(&mut self) -> Option<DecodedFrame> {
        self.decoded.take()
    }

    /// Time after which a partial frame is abandoned, if one is in progress.
    pub fn accumulation_deadline(&self) -> Option<u32> {
        if !self.is_accumulating() {
            return None;
        }
        self.last_observed_at
            .map(|t| t.wrapping_add(self.frame_gap_us))
    }

    /// Bits accumulated in the current frame.
    pub fn accumulated_bits(&self) -> u8 {
        self.bits
    }

    pub fn target_code(&self) -> u32 {
        self.target_code
    }

    /// Drop all progress, including an unconsumed match.
    pub fn reset(&mut self) {
        self.reset_frame();
        self.last_observed_at = None;
        self.matched = false;
        self.decoded = None;
    }

    // ── Internal ──────────────────────────────────────────────────

    fn is_accumulating(&self) -> bool {
        self.bits > 0 || self.pending_mark.is_some()
    }

    fn deadline_passed(&self, now_us: u32) -> bool {
        self.last_observed_at
            .is_some_and(|last| now_us.wrapping_sub(last) > self.frame_gap_us)
    }

    fn accept_mark(&mut self, width: u32) -> MatchResult {
        if self.pending_mark.is_some() {
            // Two marks in a row: an edge was lost.
            self.reset_frame();
        }
        if self.timing.is_data_mark(width) {
            self.pending_mark = Some(width);
            MatchResult::Partial
        } else {
            self.reset_frame();
            MatchResult::None
        }
    }

    fn accept_space(&mut self, width: u32, observed_at: u32) -> MatchResult {
        let Some(mark) = self.pending_mark.take() else {
            self.reset_frame();
            return MatchResult::None;
        };
        if self.timing.is_sync(mark, width) {
            self.reset_frame();
            return MatchResult::None;
        }
        let Some(bit) = self.timing.decode_bit(mark, width) else {
            self.reset_frame();
            return MatchResult::None;
        };

        self.code = (self.code << 1) | u32::from(bit);
        self.bits += 1;
        if self.bits < self.frame_bits {
            return MatchResult::Partial;
        }

        let frame = DecodedFrame {
            code: self.code,
            bits: self.bits,
        };
        self.decoded = Some(frame);
        self.reset_frame();

        if frame.code == self.target_code {
            self.matched = true;
            self.matched_at = observed_at;
            MatchResult::Matched
        } else {
            MatchResult::None
        }
    }

    fn reset_frame(&mut self) {
        self.code = 0;
        self.bits = 0;
        self.pending_mark = None;
    }
}

/// Mask covering the low `bits` bits of a code.
pub(crate) fn code_mask(bits: u8) -> u32 {
    if bits >= MAX_FRAME_BITS {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}
