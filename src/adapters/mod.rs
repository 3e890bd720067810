//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `log_sink`     | EventSink          | Serial log output        |
//! |                | BinaryPublisher    |                          |
//! |                | SensorPublisher    |                          |
//! | `nvs`          | ConfigPort         | NVS / in-memory store    |
//! |                | StatePort          |                          |
//! | `time`         | TimePort           | ESP32 system timer       |
//!
//! The relay's `OutputPort` is implemented by
//! [`RelayDriver`](crate::drivers::relay::RelayDriver) directly.

pub mod log_sink;
pub mod nvs;
pub mod time;
