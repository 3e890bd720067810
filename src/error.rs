//! Unified error types for the home-esp firmware core.
//!
//! A single `Error` enum that every component constructor funnels into.
//! Runtime anomalies (noise pulses, truncated RF frames, premature relay
//! requests) are *not* errors: the state machines absorb them through
//! their reset/defer policies and never surface them here.
//! All variants are `Copy` so they can be passed around without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware core funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is nonsensical; the component must not be started.
    InvalidConfig(&'static str),
    /// A message cannot be encoded as requested.
    InvalidMessage(&'static str),
    /// An output buffer cannot hold the encoded frame.
    BufferTooSmall { needed: usize, capacity: usize },
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::InvalidMessage(msg) => write!(f, "invalid message: {msg}"),
            Self::BufferTooSmall { needed, capacity } => {
                write!(f, "buffer too small: need {needed} pulses, have {capacity}")
            }
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
