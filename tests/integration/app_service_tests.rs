//! Integration tests for the AppService → actuator / sensor pipeline.
//!
//! Commands go in through `handle_command`, pin levels, entity states
//! and events come out through the mock adapters.

use crate::mock_hw::{MockOutput, MockPublisher, MockSensorPublisher, MockStateStore, RecordingSink};

use homeesp::app::commands::AppCommand;
use homeesp::app::events::AppEvent;
use homeesp::app::ports::Timestamp;
use homeesp::app::service::AppService;
use homeesp::config::DeviceConfig;

fn at_ms(ms: u32) -> Timestamp {
    Timestamp::from_micros(u64::from(ms) * 1_000)
}

fn make_app(config: DeviceConfig) -> (AppService, MockOutput, RecordingSink) {
    let mut app = AppService::new(config).expect("valid config");
    let mut out = MockOutput::new();
    let mut sink = RecordingSink::new();
    app.start(None, 0, &mut out, &mut sink);
    (app, out, sink)
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_drives_relay_off_and_reports() {
    let (app, out, sink) = make_app(DeviceConfig::default());
    assert_eq!(out.writes, vec![false]);
    assert!(!app.actuator_on());
    assert_eq!(sink.events, vec![AppEvent::Started { actuator_on: false }]);
}

#[test]
fn restored_state_applied_only_when_enabled() {
    let mut config = DeviceConfig::default();
    config.actuator.restore_state = true;
    let mut app = AppService::new(config).unwrap();
    let mut out = MockOutput::new();
    let mut sink = RecordingSink::new();
    app.start(Some(true), 0, &mut out, &mut sink);
    assert!(app.actuator_on());
    assert_eq!(out.level(), Some(true));

    config.actuator.restore_state = false;
    let mut app = AppService::new(config).unwrap();
    let mut out = MockOutput::new();
    app.start(Some(true), 0, &mut out, &mut sink);
    assert!(!app.actuator_on());
    assert_eq!(out.level(), Some(false));
}

// ── Dwell enforcement ─────────────────────────────────────────

#[test]
fn early_off_request_is_deferred_until_min_on_elapses() {
    let mut config = DeviceConfig::default();
    config.actuator.min_on_time_ms = 5_000;
    let (mut app, mut out, mut sink) = make_app(config);
    let mut motion = MockPublisher::default();

    app.handle_command(AppCommand::SetActuator(true), 0, &mut out, &mut sink);
    assert!(app.actuator_on());
    assert_eq!(out.level(), Some(true));

    sink.clear();
    app.handle_command(AppCommand::SetActuator(false), 1_000, &mut out, &mut sink);
    assert!(app.actuator_on(), "off request inside min_on must wait");
    assert_eq!(app.actuator_pending(), Some(false));
    assert_eq!(
        sink.events,
        vec![AppEvent::ActuatorDeferred {
            requested: false,
            remaining_ms: 4_000
        }]
    );

    app.tick(at_ms(4_999), &mut out, &mut motion, &mut sink);
    assert!(app.actuator_on());

    app.tick(at_ms(5_000), &mut out, &mut motion, &mut sink);
    assert!(!app.actuator_on());
    assert_eq!(out.level(), Some(false));
    assert_eq!(app.actuator_pending(), None);
    assert!(sink.contains(&AppEvent::ActuatorChanged {
        on: false,
        physical: false
    }));
}

#[test]
fn latest_request_wins_while_deferred() {
    let mut config = DeviceConfig::default();
    config.actuator.min_off_time_ms = 2_000;
    let (mut app, mut out, mut sink) = make_app(config);

    // Turned off at 0 by the first request, then on is deferred.
    app.handle_command(AppCommand::SetActuator(true), 0, &mut out, &mut sink);
    app.handle_command(AppCommand::SetActuator(false), 100, &mut out, &mut sink);
    assert!(!app.actuator_on());

    app.handle_command(AppCommand::SetActuator(true), 500, &mut out, &mut sink);
    assert_eq!(app.actuator_pending(), Some(true));
    app.handle_command(AppCommand::SetActuator(false), 600, &mut out, &mut sink);
    assert_eq!(app.actuator_pending(), None, "same-state request cancels");
}

#[test]
fn toggle_flips_logical_state() {
    let (mut app, mut out, mut sink) = make_app(DeviceConfig::default());
    app.handle_command(AppCommand::ToggleActuator, 10, &mut out, &mut sink);
    assert!(app.actuator_on());
    app.handle_command(AppCommand::ToggleActuator, 20, &mut out, &mut sink);
    assert!(!app.actuator_on());
    assert_eq!(out.writes, vec![false, true, false]);
}

#[test]
fn inverted_relay_drives_opposite_level() {
    let mut config = DeviceConfig::default();
    config.actuator.inverted = true;
    let (mut app, mut out, mut sink) = make_app(config);
    assert_eq!(out.level(), Some(true), "off means pin high when inverted");

    app.handle_command(AppCommand::SetActuator(true), 0, &mut out, &mut sink);
    assert!(app.actuator_on());
    assert!(!app.physical_output());
    assert_eq!(out.level(), Some(false));
}

// ── Persistence ───────────────────────────────────────────────

#[test]
fn relay_state_persisted_once_per_change() {
    let mut config = DeviceConfig::default();
    config.actuator.restore_state = true;
    let (mut app, mut out, mut sink) = make_app(config);
    let mut store = MockStateStore::default();

    assert!(!app.persist_if_needed(&mut store), "nothing changed yet");

    app.handle_command(AppCommand::SetActuator(true), 0, &mut out, &mut sink);
    assert!(app.persist_if_needed(&mut store));
    assert_eq!(store.state, Some(true));
    assert!(!app.persist_if_needed(&mut store));
    assert_eq!(store.saves, 1);
}

#[test]
fn failed_save_is_retried() {
    let mut config = DeviceConfig::default();
    config.actuator.restore_state = true;
    let (mut app, mut out, mut sink) = make_app(config);
    let mut store = MockStateStore {
        fail: true,
        ..Default::default()
    };

    app.handle_command(AppCommand::SetActuator(true), 0, &mut out, &mut sink);
    assert!(!app.persist_if_needed(&mut store));

    store.fail = false;
    assert!(app.persist_if_needed(&mut store));
    assert_eq!(store.state, Some(true));
}

#[test]
fn no_persistence_without_restore_state() {
    let (mut app, mut out, mut sink) = make_app(DeviceConfig::default());
    let mut store = MockStateStore::default();
    app.handle_command(AppCommand::SetActuator(true), 0, &mut out, &mut sink);
    assert!(!app.persist_if_needed(&mut store));
    assert_eq!(store.saves, 0);
}

// ── Temperature ───────────────────────────────────────────────

#[test]
fn mid_scale_reading_is_published() {
    let (mut app, _out, mut sink) = make_app(DeviceConfig::default());
    let mut publisher = MockSensorPublisher::default();

    let celsius = app.process_temperature(2048, &mut publisher, &mut sink).unwrap();
    assert!((celsius - 22.5).abs() < 0.1, "got {celsius}");
    assert_eq!(publisher.values, vec![Some(celsius)]);
}

#[test]
fn out_of_range_reading_marks_unavailable() {
    let (mut app, _out, mut sink) = make_app(DeviceConfig::default());
    let mut publisher = MockSensorPublisher::default();

    assert_eq!(app.process_temperature(5_000, &mut publisher, &mut sink), None);
    assert_eq!(publisher.values, vec![None]);
    assert!(sink.contains(&AppEvent::TemperatureUnavailable { raw: 5_000 }));
}

#[test]
fn offset_command_shifts_readings() {
    let (mut app, mut out, mut sink) = make_app(DeviceConfig::default());
    let mut publisher = MockSensorPublisher::default();

    let base = app.process_temperature(2048, &mut publisher, &mut sink).unwrap();
    app.handle_command(AppCommand::SetTemperatureOffset(1.5), 0, &mut out, &mut sink);
    let shifted = app.process_temperature(2048, &mut publisher, &mut sink).unwrap();
    assert!((shifted - base - 1.5).abs() < 1e-3);
    assert!((app.config().temperature.offset_c - 1.5).abs() < f32::EPSILON);
}
