//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (relay pin, entity publishers, event sinks, storage)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.
//!
//! - **ConfigPort** implementations MUST validate before persisting.
//! - All port errors are typed; callers must handle every variant explicitly.

use crate::config::DeviceConfig;
use crate::error::Error;

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → relay pin)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the binary actuator.  Receives the *physical*
/// level, inversion already applied.
pub trait OutputPort {
    fn set_output(&mut self, high: bool);
}

// ───────────────────────────────────────────────────────────────
// Entity publishers (driven adapter: domain → home automation)
// ───────────────────────────────────────────────────────────────

/// Publishes an on/off entity state (e.g. `motion_detected`).
pub trait BinaryPublisher {
    fn publish(&mut self, state: bool);
}

/// Publishes a numeric sensor value, or marks it unavailable.
pub trait SensorPublisher {
    fn publish(&mut self, value: f32);
    fn publish_unavailable(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists device configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// never silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    fn load(&self) -> Result<DeviceConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &DeviceConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// State port (driven adapter: domain ↔ NVS)
// ───────────────────────────────────────────────────────────────

/// Persists the actuator's logical state for `restore_state`.
pub trait StatePort {
    /// Last saved state, `None` on first boot or unreadable storage.
    fn load_state(&self) -> Option<bool>;

    fn save_state(&mut self, on: bool) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Both monotonic clocks sampled at the same instant.  `millis` is the
/// full 64-bit uptime; `micros` is the wrapping RF clock (~71.6 minutes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamp {
    pub millis: u64,
    pub micros: u32,
}

impl Timestamp {
    /// Both views of a 64-bit microsecond counter.
    pub const fn from_micros(us: u64) -> Self {
        Self {
            millis: us / 1000,
            micros: us as u32,
        }
    }
}

pub trait TimePort {
    fn now(&self) -> Timestamp;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StatePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl From<Error> for ConfigError {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidConfig(msg) => Self::ValidationFailed(msg),
            _ => Self::Corrupted,
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
