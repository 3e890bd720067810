//! Pulse-width protocol timing and tolerance classification.
//!
//! Fixed-code 433 MHz remotes (PT2262, EV1527 and friends) encode each bit
//! as a high pulse followed by a low pulse, both integer multiples of a
//! base `pulse_length`.  A frame is preceded by a sync pair whose low half
//! is much longer than any data pulse.
//!
//! | Symbol | High | Low  |
//! |--------|------|------|
//! | sync   | 1×   | 31×  |
//! | `0`    | 1×   | 3×   |
//! | `1`    | 3×   | 1×   |
//!
//! Every comparison is inclusive on both bounds of the tolerance window.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Upper bound for `pulse_length_us`; anything longer is not an RF remote.
const MAX_PULSE_LENGTH_US: u32 = 100_000;

/// Allowed deviation from an expected pulse width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tolerance {
    /// Percentage of the expected width (0–99).
    Percent(u8),
    /// Fixed margin in microseconds, independent of the symbol multiple.
    Absolute(u32),
}

impl Tolerance {
    /// Margin (µs) around `expected_us`.
    pub fn margin(self, expected_us: u32) -> u32 {
        match self {
            Self::Percent(p) => (u64::from(expected_us) * u64::from(p) / 100) as u32,
            Self::Absolute(us) => us,
        }
    }

    /// True if `actual_us` lies inside `expected_us ± margin`, bounds included.
    pub fn accepts(self, actual_us: u32, expected_us: u32) -> bool {
        let (lo, hi) = self.window(expected_us);
        (lo..=hi).contains(&actual_us)
    }

    /// Inclusive `(low, high)` acceptance window for `expected_us`.
    pub fn window(self, expected_us: u32) -> (u32, u32) {
        let margin = self.margin(expected_us);
        (
            expected_us.saturating_sub(margin),
            expected_us.saturating_add(margin),
        )
    }
}

/// A high/low pair expressed in multiples of the base pulse length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTiming {
    pub high: u8,
    pub low: u8,
}

impl SymbolTiming {
    pub const fn new(high: u8, low: u8) -> Self {
        Self { high, low }
    }
}

/// Complete timing description of a pulse-width protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolTiming {
    /// Base pulse length in microseconds.
    pub pulse_length_us: u32,
    pub tolerance: Tolerance,
    pub sync: SymbolTiming,
    pub zero: SymbolTiming,
    pub one: SymbolTiming,
}

impl Default for ProtocolTiming {
    fn default() -> Self {
        Self {
            pulse_length_us: 350,
            tolerance: Tolerance::Percent(25),
            sync: SymbolTiming::new(1, 31),
            zero: SymbolTiming::new(1, 3),
            one: SymbolTiming::new(3, 1),
        }
    }
}

impl ProtocolTiming {
    /// Expected width (µs) of a pulse `multiple` base lengths long.
    pub fn expected(&self, multiple: u8) -> u32 {
        self.pulse_length_us.saturating_mul(u32::from(multiple))
    }

    /// True if `width_us` matches `multiple` base lengths within tolerance.
    pub fn matches(&self, width_us: u32, multiple: u8) -> bool {
        self.tolerance.accepts(width_us, self.expected(multiple))
    }

    /// True if `width_us` can be the high half of a data bit.
    pub fn is_data_mark(&self, width_us: u32) -> bool {
        self.matches(width_us, self.zero.high) || self.matches(width_us, self.one.high)
    }

    /// True if the pair is a frame sync.
    pub fn is_sync(&self, high_us: u32, low_us: u32) -> bool {
        self.matches(high_us, self.sync.high) && self.matches(low_us, self.sync.low)
    }

    /// Decode one `(high, low)` pair into a bit.  `None` means neither
    /// symbol matched and the pair is noise.
    pub fn decode_bit(&self, high_us: u32, low_us: u32) -> Option<bool> {
        if self.matches(high_us, self.one.high) && self.matches(low_us, self.one.low) {
            return Some(true);
        }
        if self.matches(high_us, self.zero.high) && self.matches(low_us, self.zero.low) {
            return Some(false);
        }
        None
    }

    /// `(high, low)` widths (µs) transmitted for `bit`.
    pub fn bit_pulses(&self, bit: bool) -> (u32, u32) {
        let sym = if bit { self.one } else { self.zero };
        (self.expected(sym.high), self.expected(sym.low))
    }

    /// `(high, low)` widths (µs) of the sync pair.
    pub fn sync_pulses(&self) -> (u32, u32) {
        (self.expected(self.sync.high), self.expected(self.sync.low))
    }

    /// Upper edge of the widest data-symbol window (µs).
    pub fn longest_data_pulse_us(&self) -> u32 {
        [self.zero.high, self.zero.low, self.one.high, self.one.low]
            .into_iter()
            .map(|m| self.tolerance.window(self.expected(m)).1)
            .max()
            .unwrap_or(0)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_PULSE_LENGTH_US).contains(&self.pulse_length_us) {
            return Err(Error::InvalidConfig("pulse_length_us must be 1–100000"));
        }
        match self.tolerance {
            Tolerance::Percent(p) if p >= 100 => {
                return Err(Error::InvalidConfig("tolerance percent must be < 100"));
            }
            Tolerance::Absolute(us) if us >= self.pulse_length_us => {
                return Err(Error::InvalidConfig(
                    "absolute tolerance must be shorter than pulse_length_us",
                ));
            }
            _ => {}
        }
        for sym in [self.sync, self.zero, self.one] {
            if sym.high == 0 || sym.low == 0 {
                return Err(Error::InvalidConfig("symbol multiples must be > 0"));
            }
        }
        if self.zero == self.one {
            return Err(Error::InvalidConfig("zero and one symbols must differ"));
        }
        if !self.disjoint(self.zero.high, self.one.high)
            || !self.disjoint(self.zero.low, self.one.low)
        {
            return Err(Error::InvalidConfig(
                "tolerance makes zero and one symbols overlap",
            ));
        }
        if !self.disjoint(self.sync.low, self.zero.low)
            || !self.disjoint(self.sync.low, self.one.low)
        {
            return Err(Error::InvalidConfig(
                "tolerance makes the sync gap overlap a data pulse",
            ));
        }
        Ok(())
    }

    /// Windows for two multiples either coincide (same multiple) or do not
    /// touch at all.
    fn disjoint(&self, a: u8, b: u8) -> bool {
        if a == b {
            return true;
        }
        let (short, long) = if a < b { (a, b) } else { (b, a) };
        let (_, short_hi) = self.tolerance.window(self.expected(short));
        let (long_lo, _) = self.tolerance.window(self.expected(long));
        short_hi < long_lo
    }
}
