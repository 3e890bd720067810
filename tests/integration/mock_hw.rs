//! Mock adapters for integration tests.
//!
//! Records every port call so tests can assert on the full history
//! without touching real GPIO or NVS.

use homeesp::app::events::AppEvent;
use homeesp::app::ports::{BinaryPublisher, EventSink, OutputPort, SensorPublisher, StatePort, StorageError};
use homeesp::rf::{DecodedMessage, FrameCodec, Pt2262Codec, PulseObservation};
use homeesp::rf::codec::{MAX_PULSES, Protocol};
use homeesp::rf::timing::ProtocolTiming;

// ── Relay pin ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockOutput {
    pub writes: Vec<bool>,
}

#[allow(dead_code)]
impl MockOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> Option<bool> {
        self.writes.last().copied()
    }
}

impl OutputPort for MockOutput {
    fn set_output(&mut self, high: bool) {
        self.writes.push(high);
    }
}

// ── Entity publishers ─────────────────────────────────────────

#[derive(Default)]
pub struct MockPublisher {
    pub states: Vec<bool>,
}

impl BinaryPublisher for MockPublisher {
    fn publish(&mut self, state: bool) {
        self.states.push(state);
    }
}

/// `None` entries are "unavailable" publications.
#[derive(Default)]
pub struct MockSensorPublisher {
    pub values: Vec<Option<f32>>,
}

impl SensorPublisher for MockSensorPublisher {
    fn publish(&mut self, value: f32) {
        self.values.push(Some(value));
    }

    fn publish_unavailable(&mut self) {
        self.values.push(None);
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── Relay state store ─────────────────────────────────────────

#[derive(Default)]
pub struct MockStateStore {
    pub state: Option<bool>,
    pub saves: u32,
    pub fail: bool,
}

impl StatePort for MockStateStore {
    fn load_state(&self) -> Option<bool> {
        self.state
    }

    fn save_state(&mut self, on: bool) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::IoError);
        }
        self.state = Some(on);
        self.saves += 1;
        Ok(())
    }
}

// ── RF helpers ────────────────────────────────────────────────

/// Sync pair plus data pairs for `code`, as a captured burst.
#[allow(dead_code)]
pub fn encode_burst(code: u32, bits: u8) -> heapless::Vec<u32, MAX_PULSES> {
    let codec = Pt2262Codec::new(ProtocolTiming::default()).expect("default timing is valid");
    let mut pulses = heapless::Vec::new();
    codec
        .encode(
            &DecodedMessage {
                code,
                protocol: Protocol::Pt2262,
                bits,
            },
            &mut pulses,
        )
        .expect("frame fits");
    pulses
}

/// Streaming observations for the data bits of `code` (sync omitted),
/// the first edge at `t`.  Returns the observations and the time of the
/// last edge.
#[allow(dead_code)]
pub fn frame_observations(code: u32, bits: u8, mut t: u32) -> (Vec<PulseObservation>, u32) {
    let pulses = encode_burst(code, bits);
    let mut out = Vec::new();
    for pair in pulses[2..].chunks_exact(2) {
        t = t.wrapping_add(pair[0]);
        out.push(PulseObservation::mark(pair[0], t));
        t = t.wrapping_add(pair[1]);
        out.push(PulseObservation::space(pair[1], t));
    }
    (out, t)
}
