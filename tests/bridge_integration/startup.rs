//! Full bring-up with real threads.

use std::path::Path;
use std::time::{Duration, Instant};

use can_bridge_logger::can::{BusWire, VirtualBus, virtual_bus};
use can_bridge_logger::config::Config;
use can_bridge_logger::health::SharedIndicator;
use can_bridge_logger::storage::DirectoryVolume;
use can_bridge_logger::{BridgeLogger, Error, MonotonicClock, Peripherals};
use chrono::NaiveDate;

use super::{fast_timing, frame};

type Wires = (BusWire, BusWire, BusWire);

fn peripherals(
    config: &Config,
    root: &Path,
) -> (
    Peripherals<VirtualBus, VirtualBus, VirtualBus, DirectoryVolume, SharedIndicator>,
    Wires,
) {
    let (bus_a, wire_a) = virtual_bus(&config.bus_a);
    let (bus_b, wire_b) = virtual_bus(&config.bus_b);
    let (bus_c, wire_c) = virtual_bus(&config.bus_c);
    let peripherals = Peripherals {
        bus_a,
        bus_b,
        bus_c,
        storage: DirectoryVolume::new(root),
        indicator: SharedIndicator::new(),
    };
    (peripherals, (wire_a, wire_b, wire_c))
}

fn config() -> Config {
    Config {
        timing: fast_timing(),
        ..Config::default()
    }
}

fn created() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(3, 4, 5)
        .unwrap()
}

/// Poll `path` until it holds at least `lines` lines.
fn wait_for_lines(path: &Path, lines: usize) -> Vec<String> {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let text = std::fs::read_to_string(path).unwrap_or_default();
        let found: Vec<String> = text.lines().map(str::to_owned).collect();
        if found.len() >= lines || Instant::now() > deadline {
            return found;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn bridges_monitors_and_logs_with_live_tasks() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let config = config();
    let (peripherals, (wire_a, wire_b, wire_c)) = peripherals(&config, dir.path());

    let tasks =
        BridgeLogger::start_at(config, peripherals, MonotonicClock::new(), created()).unwrap();
    assert_eq!(
        tasks.task_names(),
        vec!["CAN1->CAN3", "CAN3->CAN1", "CAN2_LOG", "SD_LOG", "LED_STATUS"]
    );
    assert_eq!(tasks.table_name(), Some("can_bridge_20240102_030405.csv"));
    assert!(tasks.counters().storage_ready());

    let a_frame = frame(0x123, &[0x01, 0x02, 0x03]);
    let b_frame = frame(0x456, &[0xAA]);
    assert!(wire_a.inject(a_frame));
    assert!(wire_b.inject(b_frame));
    assert!(wire_c.inject(frame(0x7DF, &[0x02, 0x01, 0x0D])));

    assert_eq!(
        wire_b.transmitted_timeout(Duration::from_secs(2)),
        Some(a_frame)
    );
    assert_eq!(
        wire_a.transmitted_timeout(Duration::from_secs(2)),
        Some(b_frame)
    );

    let lines = wait_for_lines(&dir.path().join("can_bridge_20240102_030405.csv"), 4);
    assert_eq!(lines.len(), 4, "header plus three rows, got {lines:?}");
    let mut interfaces: Vec<&str> = lines[1..]
        .iter()
        .filter_map(|line| line.rsplit(',').next())
        .collect();
    interfaces.sort_unstable();
    assert_eq!(interfaces, vec!["CAN1->CAN3", "CAN2", "CAN3->CAN1"]);

    let counters = tasks.counters();
    assert_eq!(counters.monitored(), 1);
    let status = counters.snapshot(false);
    assert_eq!(status.forwarded_a_to_b, 1);
    assert_eq!(status.forwarded_b_to_a, 1);
}

#[test]
fn bridge_bus_failure_aborts_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config = config();
    let (mut peripherals, _wires) = peripherals(&config, dir.path());
    peripherals.bus_b.fail_start("transceiver not responding");

    let result = BridgeLogger::start_at(config, peripherals, MonotonicClock::new(), created());
    let Err(Error::BusBringUp { interface, reason }) = result else {
        panic!("expected bus bring-up failure");
    };
    assert_eq!(interface, "CAN3");
    assert_eq!(reason, "transceiver not responding");
}

#[test]
fn monitored_bus_failure_aborts_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config = config();
    let (mut peripherals, _wires) = peripherals(&config, dir.path());
    peripherals.bus_c.fail_start("bus off");

    let result = BridgeLogger::start_at(config, peripherals, MonotonicClock::new(), created());
    assert!(matches!(
        result,
        Err(Error::BusBringUp {
            interface: "CAN2",
            ..
        })
    ));
}

#[test]
fn missing_storage_keeps_bridge_running() {
    let dir = tempfile::tempdir().unwrap();
    let config = config();
    let (peripherals, (wire_a, wire_b, _wire_c)) =
        peripherals(&config, &dir.path().join("no-card"));

    let tasks =
        BridgeLogger::start_at(config, peripherals, MonotonicClock::new(), created()).unwrap();
    assert_eq!(tasks.table_name(), None);
    assert!(!tasks.counters().storage_ready());

    let sent = frame(0x100, &[0x10, 0x20]);
    wire_a.inject(sent);
    assert_eq!(wire_b.transmitted_timeout(Duration::from_secs(2)), Some(sent));
    assert!(!dir.path().join("no-card").exists());
}
