//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the dwell-gated relay, the RF motion matcher and the
//! temperature reader.  It exposes a clean, hardware-agnostic API.  All I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!  PulseObservation ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!  AppCommand ────────▶ │        AppService         │ ──▶ BinaryPublisher (motion)
//!  raw ADC ───────────▶ │ Dwell · Matcher · Reader  │ ──▶ SensorPublisher (temp)
//!                       └──────────────────────────┘ ──▶ OutputPort (relay)
//! ```

use log::{debug, info, warn};

use crate::config::DeviceConfig;
use crate::control::DwellTimeActuator;
use crate::error::Result;
use crate::rf::codec::{DecodedMessage, FrameCodec, Pt2262Codec};
use crate::rf::{DecodedFrame, MatchResult, PulseObservation, TolerantPulseMatcher};
use crate::sensors::TemperatureReader;

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{BinaryPublisher, EventSink, OutputPort, SensorPublisher, StatePort, Timestamp};

/// Queue overflow is reported at most this often.
pub const DROP_REPORT_INTERVAL_MS: u64 = 1_000;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: DeviceConfig,
    actuator: DwellTimeActuator,
    matcher: TolerantPulseMatcher,
    codec: Pt2262Codec,
    reader: TemperatureReader,
    /// Motion entity currently published as `true`.
    motion_active: bool,
    /// A captured burst matched since the last tick.
    burst_match: bool,
    last_code: Option<DecodedFrame>,
    state_dirty: bool,
    /// Dropped observations not yet reported.
    dropped_unreported: u32,
    last_drop_report_ms: Option<u64>,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** drive any output; call [`start`](Self::start) next.
    pub fn new(config: DeviceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            actuator: DwellTimeActuator::new(config.actuator)?,
            matcher: TolerantPulseMatcher::new(&config.bridge)?,
            codec: Pt2262Codec::new(config.bridge.timing)?,
            reader: TemperatureReader::new(config.temperature)?,
            motion_active: false,
            burst_match: false,
            last_code: None,
            state_dirty: false,
            dropped_unreported: 0,
            last_drop_report_ms: None,
            config,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive the relay to its initial level, re-applying `restored` when
    /// `restore_state` is enabled.
    pub fn start(
        &mut self,
        restored: Option<bool>,
        now_ms: u64,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        out.set_output(self.actuator.physical());

        if self.config.actuator.restore_state && restored == Some(true) {
            if self.actuator.request(true, now_ms) {
                out.set_output(self.actuator.physical());
            }
            info!("Restored relay state: ON");
        }

        let actuator_on = self.actuator.is_on();
        sink.emit(&AppEvent::Started { actuator_on });
        info!(
            "AppService started (relay {}, motion code 0x{:08X}/{} bits)",
            if actuator_on { "ON" } else { "OFF" },
            self.config.bridge.motion_code,
            self.config.bridge.frame_bits
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one cycle: apply a deferred relay request, expire a stale RF
    /// match, and update the motion entity.
    ///
    /// Motion is edge-triggered: a match publishes `true` on this tick,
    /// and the next tick without a new match publishes `false`.
    pub fn tick(
        &mut self,
        now: Timestamp,
        out: &mut impl OutputPort,
        motion: &mut impl BinaryPublisher,
        sink: &mut impl EventSink,
    ) {
        if self.actuator.tick(now.millis) {
            self.actuator_changed(out, sink);
        }

        self.matcher.expire(now.micros);
        let fired = self.matcher.take_match() | core::mem::take(&mut self.burst_match);

        if fired {
            motion.publish(true);
            if !self.motion_active {
                self.motion_active = true;
                sink.emit(&AppEvent::MotionChanged(true));
            }
        } else if self.motion_active {
            motion.publish(false);
            self.motion_active = false;
            sink.emit(&AppEvent::MotionChanged(false));
        }
    }

    // ── RF input ──────────────────────────────────────────────

    /// Feed one pulse from the receiver.
    pub fn observe_pulse(&mut self, obs: PulseObservation, sink: &mut impl EventSink) -> MatchResult {
        let result = self.matcher.observe(obs);
        if let Some(frame) = self.matcher.take_decoded() {
            self.record_code(frame, result == MatchResult::Matched, sink);
        }
        result
    }

    /// Decode a captured `[high, low, ...]` burst in one go.
    pub fn process_burst(&mut self, pulses: &[u32], sink: &mut impl EventSink) -> Option<DecodedMessage> {
        let msg = self.codec.decode(pulses)?;
        let motion = msg.bits == self.config.bridge.frame_bits
            && msg.code == self.config.bridge.motion_code;
        if motion {
            self.burst_match = true;
        }
        self.record_code(
            DecodedFrame {
                code: msg.code,
                bits: msg.bits,
            },
            motion,
            sink,
        );
        Some(msg)
    }

    /// Account for observations the ISR queue had to discard.
    ///
    /// Counts accumulate and are reported at most once per
    /// [`DROP_REPORT_INTERVAL_MS`]; a noisy idle receiver can overflow the
    /// queue on every loop pass.  Returns `true` if a report was emitted.
    pub fn report_dropped(&mut self, dropped: u32, now_ms: u64, sink: &mut impl EventSink) -> bool {
        self.dropped_unreported = self.dropped_unreported.saturating_add(dropped);
        if self.dropped_unreported == 0 {
            return false;
        }
        let due = self
            .last_drop_report_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= DROP_REPORT_INTERVAL_MS);
        if !due {
            return false;
        }

        let total = core::mem::take(&mut self.dropped_unreported);
        self.last_drop_report_ms = Some(now_ms);
        warn!("RF pulse queue overflow: {} observations dropped", total);
        sink.emit(&AppEvent::PulsesDropped(total));
        true
    }

    // ── Sensor input ──────────────────────────────────────────

    /// Convert and publish one temperature sample.
    pub fn process_temperature(
        &mut self,
        raw: u16,
        publisher: &mut impl SensorPublisher,
        sink: &mut impl EventSink,
    ) -> Option<f32> {
        let reading = self.reader.process_raw_reading(raw);
        match reading {
            Some(celsius) => publisher.publish(celsius),
            None => {
                publisher.publish_unavailable();
                sink.emit(&AppEvent::TemperatureUnavailable { raw });
            }
        }
        reading
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (switch entity, button, console).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::SetActuator(on) => self.request_actuator(on, now_ms, out, sink),
            AppCommand::ToggleActuator => {
                let desired = !self.actuator.is_on();
                self.request_actuator(desired, now_ms, out, sink);
            }
            AppCommand::SetTemperatureOffset(offset) => {
                if offset.is_finite() {
                    self.reader.set_offset(offset);
                    self.config.temperature.offset_c = offset;
                    info!("Temperature offset set to {:.2} C", offset);
                } else {
                    warn!("Ignoring non-finite temperature offset");
                }
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Logical relay state.
    pub fn actuator_on(&self) -> bool {
        self.actuator.is_on()
    }

    /// Relay pin level.
    pub fn physical_output(&self) -> bool {
        self.actuator.physical()
    }

    /// Deferred relay request, if any.
    pub fn actuator_pending(&self) -> Option<bool> {
        self.actuator.pending()
    }

    pub fn motion_active(&self) -> bool {
        self.motion_active
    }

    /// Most recent decoded RF frame.
    pub fn last_code(&self) -> Option<DecodedFrame> {
        self.last_code
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    // ── State persistence ─────────────────────────────────────

    /// Save the relay state if it changed and `restore_state` is enabled.
    /// Returns `true` if the state was written.
    pub fn persist_if_needed(&mut self, store: &mut impl StatePort) -> bool {
        if !self.state_dirty || !self.config.actuator.restore_state {
            return false;
        }
        match store.save_state(self.actuator.is_on()) {
            Ok(()) => {
                self.state_dirty = false;
                debug!("Relay state persisted");
                true
            }
            Err(e) => {
                warn!("Relay state save failed: {}", e);
                false
            }
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn request_actuator(
        &mut self,
        desired: bool,
        now_ms: u64,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        if self.actuator.request(desired, now_ms) {
            self.actuator_changed(out, sink);
        } else if let Some(remaining_ms) = self.actuator.remaining_dwell(now_ms) {
            sink.emit(&AppEvent::ActuatorDeferred {
                requested: desired,
                remaining_ms,
            });
        }
    }

    fn actuator_changed(&mut self, out: &mut impl OutputPort, sink: &mut impl EventSink) {
        let physical = self.actuator.physical();
        out.set_output(physical);
        self.state_dirty = true;
        sink.emit(&AppEvent::ActuatorChanged {
            on: self.actuator.is_on(),
            physical,
        });
    }

    fn record_code(&mut self, frame: DecodedFrame, motion: bool, sink: &mut impl EventSink) {
        self.last_code = Some(frame);
        sink.emit(&AppEvent::CodeReceived {
            code: frame.code,
            bits: frame.bits,
            motion,
        });
    }
}
