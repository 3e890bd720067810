//! Batch frame codec for PT2262-style fixed-code remotes.
//!
//! Works on a captured burst laid out as `[high, low, high, low, ...]`
//! microsecond durations: one sync pair followed by one pair per data bit,
//! MSB first.  The streaming [`TolerantPulseMatcher`](super::matcher) is the
//! hot path; this codec serves bursts captured by other means and the
//! transmit side.

use heapless::Vec;

use super::timing::ProtocolTiming;
use crate::error::{Error, Result};

/// Longest code a frame can carry (one `u32`).
pub const MAX_FRAME_BITS: u8 = 32;
/// Pulses needed for a full frame: sync pair plus one pair per bit.
pub const MAX_PULSES: usize = 2 * (MAX_FRAME_BITS as usize + 1);

/// Shorter decodes are too likely to be noise that happened to line up.
const MIN_DECODED_BITS: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Protocol {
    Pt2262 = 1,
}

/// Result of decoding one burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedMessage {
    pub code: u32,
    pub protocol: Protocol,
    pub bits: u8,
}

/// Encode/decode between codes and raw pulse timings.
pub trait FrameCodec {
    /// Decode a captured burst.  `None` if it is not a valid frame.
    fn decode(&self, pulses: &[u32]) -> Option<DecodedMessage>;

    /// Encode `msg` into `out` (cleared first).
    fn encode<const N: usize>(&self, msg: &DecodedMessage, out: &mut Vec<u32, N>) -> Result<()>;

    /// Protocol name for logging.
    fn protocol_name(&self) -> &'static str;
}

/// PT2262 codec parameterised by the shared protocol timing.
#[derive(Debug, Clone)]
pub struct Pt2262Codec {
    timing: ProtocolTiming,
}

impl Pt2262Codec {
    pub fn new(timing: ProtocolTiming) -> Result<Self> {
        timing.validate()?;
        Ok(Self { timing })
    }

    pub fn timing(&self) -> &ProtocolTiming {
        &self.timing
    }
}

impl FrameCodec for Pt2262Codec {
    fn decode(&self, pulses: &[u32]) -> Option<DecodedMessage> {
        if pulses.len() < 4 || pulses.len() % 2 != 0 {
            return None;
        }
        if !self.timing.is_sync(pulses[0], pulses[1]) {
            return None;
        }

        let mut code = 0u32;
        let mut bits = 0u8;
        for pair in pulses[2..].chunks_exact(2).take(MAX_FRAME_BITS as usize) {
            // Decoding stops at the first pair that is neither symbol.
            let Some(bit) = self.timing.decode_bit(pair[0], pair[1]) else {
                break;
            };
            code = (code << 1) | u32::from(bit);
            bits += 1;
        }

        (bits >= MIN_DECODED_BITS).then_some(DecodedMessage {
            code,
            protocol: Protocol::Pt2262,
            bits,
        })
    }

    fn encode<const N: usize>(&self, msg: &DecodedMessage, out: &mut Vec<u32, N>) -> Result<()> {
        if !(1..=MAX_FRAME_BITS).contains(&msg.bits) {
            return Err(Error::InvalidMessage("bits must be 1–32"));
        }
        let needed = 2 * (usize::from(msg.bits) + 1);
        if needed > N {
            return Err(Error::BufferTooSmall {
                needed,
                capacity: N,
            });
        }

        out.clear();
        push_pair(out, self.timing.sync_pulses(), needed)?;
        for i in (0..msg.bits).rev() {
            let bit = (msg.code >> i) & 1 == 1;
            push_pair(out, self.timing.bit_pulses(bit), needed)?;
        }
        Ok(())
    }

    fn protocol_name(&self) -> &'static str {
        "RF433/PT2262"
    }
}

fn push_pair<const N: usize>(out: &mut Vec<u32, N>, (high, low): (u32, u32), needed: usize) -> Result<()> {
    out.extend_from_slice(&[high, low])
        .map_err(|_| Error::BufferTooSmall { needed, capacity: N })
}
