//! Integration tests for the RF433 → motion entity bridge.
//!
//! Pulses enter either one observation at a time (the ISR queue path) or
//! as a captured burst; the motion entity and the event stream are
//! checked on the following ticks.

use crate::mock_hw::{encode_burst, frame_observations, MockOutput, MockPublisher, RecordingSink};

use homeesp::app::events::AppEvent;
use homeesp::app::ports::Timestamp;
use homeesp::app::service::AppService;
use homeesp::config::DeviceConfig;
use homeesp::drivers::rf_receiver;
use homeesp::rf::{Edge, MatchResult, PulseObservation};

const MOTION_CODE: u32 = 0x5A3C_C3A5;

fn make_app() -> (AppService, MockOutput, RecordingSink) {
    let mut config = DeviceConfig::default();
    config.bridge.motion_code = MOTION_CODE;
    let mut app = AppService::new(config).expect("valid config");
    let mut out = MockOutput::new();
    let mut sink = RecordingSink::new();
    app.start(None, 0, &mut out, &mut sink);
    sink.clear();
    (app, out, sink)
}

fn at_us(us: u32) -> Timestamp {
    Timestamp {
        millis: u64::from(us / 1_000),
        micros: us,
    }
}

#[test]
fn streamed_motion_code_pulses_motion_entity() {
    let (mut app, mut out, mut sink) = make_app();
    let mut motion = MockPublisher::default();

    let (obs, end) = frame_observations(MOTION_CODE, 32, 1_000);
    let results: Vec<MatchResult> = obs.iter().map(|o| app.observe_pulse(*o, &mut sink)).collect();
    assert_eq!(results.last(), Some(&MatchResult::Matched));
    assert!(sink.contains(&AppEvent::CodeReceived {
        code: MOTION_CODE,
        bits: 32,
        motion: true
    }));

    app.tick(at_us(end + 500), &mut out, &mut motion, &mut sink);
    assert!(app.motion_active());
    assert_eq!(motion.states, vec![true]);
    assert!(sink.contains(&AppEvent::MotionChanged(true)));

    app.tick(at_us(end + 10_500), &mut out, &mut motion, &mut sink);
    assert!(!app.motion_active());
    assert_eq!(motion.states, vec![true, false]);
    assert!(sink.contains(&AppEvent::MotionChanged(false)));

    app.tick(at_us(end + 20_500), &mut out, &mut motion, &mut sink);
    assert_eq!(motion.states.len(), 2, "idle ticks publish nothing");
}

#[test]
fn other_code_is_reported_but_not_motion() {
    let (mut app, mut out, mut sink) = make_app();
    let mut motion = MockPublisher::default();

    let (obs, end) = frame_observations(0x0000_BEEF, 32, 0);
    for o in &obs {
        app.observe_pulse(*o, &mut sink);
    }
    assert_eq!(app.last_code().map(|f| f.code), Some(0x0000_BEEF));
    assert!(sink.contains(&AppEvent::CodeReceived {
        code: 0x0000_BEEF,
        bits: 32,
        motion: false
    }));

    app.tick(at_us(end + 100), &mut out, &mut motion, &mut sink);
    assert!(motion.states.is_empty());
    assert!(!app.motion_active());
}

#[test]
fn repeated_frames_keep_motion_active() {
    let (mut app, mut out, mut sink) = make_app();
    let mut motion = MockPublisher::default();

    let (first, end) = frame_observations(MOTION_CODE, 32, 0);
    first.iter().for_each(|o| {
        app.observe_pulse(*o, &mut sink);
    });
    app.tick(at_us(end + 100), &mut out, &mut motion, &mut sink);

    let (second, end) = frame_observations(MOTION_CODE, 32, end + 20_000);
    second.iter().for_each(|o| {
        app.observe_pulse(*o, &mut sink);
    });
    app.tick(at_us(end + 100), &mut out, &mut motion, &mut sink);

    assert_eq!(motion.states, vec![true, true]);
    let rising = sink
        .events
        .iter()
        .filter(|e| **e == AppEvent::MotionChanged(true))
        .count();
    assert_eq!(rising, 1, "motion stays active across back-to-back frames");
}

#[test]
fn unconsumed_match_expires_after_hold() {
    let (mut app, mut out, mut sink) = make_app();
    let mut motion = MockPublisher::default();

    let (obs, end) = frame_observations(MOTION_CODE, 32, 0);
    for o in &obs {
        app.observe_pulse(*o, &mut sink);
    }

    // Default hold is 1 s; the loop stalled for 2 s.
    app.tick(at_us(end + 2_000_000), &mut out, &mut motion, &mut sink);
    assert!(motion.states.is_empty());
    assert!(!app.motion_active());
}

#[test]
fn noise_mid_frame_prevents_match() {
    let (mut app, _out, mut sink) = make_app();

    let (obs, _) = frame_observations(MOTION_CODE, 32, 0);
    let mut results = Vec::new();
    for (i, o) in obs.iter().enumerate() {
        results.push(app.observe_pulse(*o, &mut sink));
        if i == 20 {
            // 2× pulse length matches no symbol.
            results.push(app.observe_pulse(PulseObservation::mark(700, o.observed_at + 700), &mut sink));
        }
    }
    assert!(!results.contains(&MatchResult::Matched));
    assert_eq!(app.last_code(), None);
}

#[test]
fn captured_burst_sets_motion_on_next_tick() {
    let (mut app, mut out, mut sink) = make_app();
    let mut motion = MockPublisher::default();

    let burst = encode_burst(MOTION_CODE, 32);
    let msg = app.process_burst(&burst, &mut sink).expect("burst decodes");
    assert_eq!(msg.code, MOTION_CODE);
    assert_eq!(msg.bits, 32);

    app.tick(at_us(1_000), &mut out, &mut motion, &mut sink);
    assert_eq!(motion.states, vec![true]);
}

#[test]
fn short_burst_is_not_motion_even_if_low_bits_agree() {
    let (mut app, mut out, mut sink) = make_app();
    let mut motion = MockPublisher::default();

    let burst = encode_burst(MOTION_CODE & 0xFFFF, 16);
    let msg = app.process_burst(&burst, &mut sink).expect("burst decodes");
    assert_eq!(msg.bits, 16);
    assert!(sink.contains(&AppEvent::CodeReceived {
        code: MOTION_CODE & 0xFFFF,
        bits: 16,
        motion: false
    }));

    app.tick(at_us(1_000), &mut out, &mut motion, &mut sink);
    assert!(motion.states.is_empty());
}

#[test]
fn garbage_burst_is_ignored() {
    let (mut app, _out, mut sink) = make_app();
    assert_eq!(app.process_burst(&[100, 200, 300], &mut sink), None);
    assert_eq!(app.process_burst(&[350, 350, 350, 1050], &mut sink), None);
    assert!(sink.events.is_empty());
}

#[test]
fn dropped_pulses_are_reported_once() {
    let (mut app, _out, mut sink) = make_app();
    assert!(!app.report_dropped(0, 0, &mut sink));
    assert!(sink.events.is_empty());
    assert!(app.report_dropped(3, 10, &mut sink));
    assert_eq!(sink.events, vec![AppEvent::PulsesDropped(3)]);
}

#[test]
fn sustained_overflow_is_reported_once_per_interval() {
    let (mut app, _out, mut sink) = make_app();

    // Noise overflows the queue on every 10 ms loop pass for 2.5 s.
    let mut now = 0u64;
    while now < 2_500 {
        app.report_dropped(5, now, &mut sink);
        now += 10;
    }

    let reports: Vec<u32> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::PulsesDropped(n) => Some(*n),
            _ => None,
        })
        .collect();
    // At 0, 1000 and 2000 ms; nothing counted twice or lost.
    assert_eq!(reports, vec![5, 500, 500]);
    assert!(app.report_dropped(0, 3_000, &mut sink));
    assert_eq!(sink.events.last(), Some(&AppEvent::PulsesDropped(245)));
}

/// The only test in this binary that touches the global ISR queue.
#[test]
fn isr_queue_feeds_matcher_end_to_end() {
    rf_receiver::reset_isr_state();
    let (mut app, mut out, mut sink) = make_app();
    let mut motion = MockPublisher::default();

    let (obs, end) = frame_observations(MOTION_CODE, 32, 5_000);
    // Edge that starts the first mark.
    rf_receiver::rf_isr_handler(Edge::Rising, 5_000);
    for o in &obs {
        rf_receiver::rf_isr_handler(o.edge, o.observed_at);
    }

    assert_eq!(rf_receiver::take_dropped(), 0);
    let mut last = MatchResult::None;
    let delivered = rf_receiver::drain_pulses(|o| last = app.observe_pulse(o, &mut sink));
    assert_eq!(delivered, obs.len());
    assert_eq!(last, MatchResult::Matched);

    app.tick(at_us(end + 100), &mut out, &mut motion, &mut sink);
    assert_eq!(motion.states, vec![true]);
    rf_receiver::reset_isr_state();
}
