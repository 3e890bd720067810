//! RF433 bridge: pulse-width decoding for fixed-code remotes.
//!
//! ```text
//!  GPIO edges ──▶ EdgeTracker ──▶ PulseObservation ──▶ TolerantPulseMatcher ──▶ MatchResult
//!                 (drivers)                             (streaming, per pulse)
//!
//!  captured burst [high, low, ...] ──▶ Pt2262Codec::decode ──▶ DecodedMessage
//! ```
//!
//! Both paths share the same [`timing::ProtocolTiming`] so a code that the
//! codec encodes is exactly what the matcher accepts.

pub mod codec;
pub mod matcher;
pub mod timing;

/// Polarity of the edge that ended a pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Line went high: the pulse that just ended was a low (space).
    Rising,
    /// Line went low: the pulse that just ended was a high (mark).
    Falling,
}

/// One timed pulse, consumed immediately by the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseObservation {
    /// Pulse width in microseconds.
    pub width: u32,
    pub edge: Edge,
    /// Monotonic microsecond timestamp of the terminating edge (wraps).
    pub observed_at: u32,
}

impl PulseObservation {
    /// A high pulse of `width` µs that ended at `observed_at`.
    pub const fn mark(width: u32, observed_at: u32) -> Self {
        Self {
            width,
            edge: Edge::Falling,
            observed_at,
        }
    }

    /// A low pulse of `width` µs that ended at `observed_at`.
    pub const fn space(width: u32, observed_at: u32) -> Self {
        Self {
            width,
            edge: Edge::Rising,
            observed_at,
        }
    }
}

pub use codec::{DecodedMessage, FrameCodec, Pt2262Codec};
pub use matcher::{DecodedFrame, MatchResult, TolerantPulseMatcher};
pub use timing::{ProtocolTiming, SymbolTiming, Tolerance};
