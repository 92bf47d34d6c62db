//! Records travelling from the bus tasks into the CSV table.

use std::sync::Arc;

use can_bridge_logger::clock::ManualClock;
use can_bridge_logger::config::BusConfig;
use can_bridge_logger::storage::{
    DirectoryVolume, HEADER, StepOutcome, StorageWriter, WriteOutcome, open_storage,
};
use can_bridge_logger::{
    BridgeForwarder, Counters, Direction, LogRecord, SourceTag, log_queue,
};
use chrono::NaiveDate;
use parking_lot::Mutex;

use super::{fast_timing, frame, started_bus};

fn created() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(14, 5, 6)
        .unwrap()
}

#[test]
fn forwarded_frame_becomes_one_table_row() {
    let dir = tempfile::tempdir().unwrap();
    let mut volume = DirectoryVolume::new(dir.path());
    let table = open_storage(&mut volume, created()).unwrap();
    let path = dir.path().join(table.name());
    assert!(path.ends_with("can_bridge_20240309_140506.csv"));

    let (bus_a, wire_a) = started_bus(&BusConfig::bridge("CAN1", 16, 17));
    let (bus_b, _wire_b) = started_bus(&BusConfig::bridge("CAN3", 20, 21));
    let (queue, consumer) = log_queue(8);
    let clock = Arc::new(ManualClock::new());
    let timing = fast_timing();

    let mut forwarder = BridgeForwarder::new(
        Direction::AToB,
        bus_a,
        bus_b,
        queue,
        Arc::new(Counters::new()),
        Arc::clone(&clock),
        &timing,
    );
    let mut writer = StorageWriter::new(Some(Arc::new(Mutex::new(table))), consumer, &timing);

    clock.set_us(1_000_000);
    wire_a.inject(frame(0x123, &[0x01, 0x02, 0x03]));
    forwarder.poll_once();

    assert_eq!(
        writer.step(),
        StepOutcome::Record(WriteOutcome::Written { flushed: false })
    );
    assert_eq!(writer.step(), StepOutcome::Idle { flushed: true });

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], HEADER.join(","));
    assert_eq!(
        lines[1],
        "1.000000,00000123,false,Rx,11,3,01,02,03,00,00,00,00,00,CAN1->CAN3"
    );
}

#[test]
fn twenty_writes_force_a_flush_without_idle_time() {
    let dir = tempfile::tempdir().unwrap();
    let mut volume = DirectoryVolume::new(dir.path());
    let table = open_storage(&mut volume, created()).unwrap();
    let path = dir.path().join(table.name());

    let (queue, consumer) = log_queue(64);
    let mut writer = StorageWriter::new(Some(Arc::new(Mutex::new(table))), consumer, &fast_timing());

    for i in 0..25u64 {
        queue.try_push(LogRecord::new(SourceTag::BUS_C, frame(0x42, &[i as u8]), i));
    }
    let outcomes: Vec<_> = (0..25).map(|_| writer.step()).collect();
    let flushes = outcomes
        .iter()
        .filter(|o| matches!(o, StepOutcome::Record(WriteOutcome::Written { flushed: true })))
        .count();
    assert_eq!(flushes, 1);
    assert_eq!(
        outcomes[19],
        StepOutcome::Record(WriteOutcome::Written { flushed: true })
    );

    // Header plus exactly the 20 flushed rows are durable.
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 21);
    for line in text.lines().skip(1) {
        let columns: Vec<_> = line.split(',').collect();
        assert_eq!(columns.len(), 15);
        assert_eq!(columns[5], "1");
        assert!(columns[7..14].iter().all(|c| *c == "00"));
        assert_eq!(columns[14], "CAN2");
    }
}

#[test]
fn failed_storage_drops_every_record() {
    let dir = tempfile::tempdir().unwrap();
    let mut volume = DirectoryVolume::new(dir.path().join("missing-card"));
    let table = open_storage(&mut volume, created());
    assert!(table.is_none());

    let (queue, consumer) = log_queue(8);
    let mut writer = StorageWriter::new(table.map(|t| Arc::new(Mutex::new(t))), consumer, &fast_timing());
    assert!(!writer.is_ready());

    for i in 0..3 {
        queue.try_push(LogRecord::new(SourceTag::BUS_A, frame(0x5, &[]), i));
    }
    for _ in 0..3 {
        assert_eq!(writer.step(), StepOutcome::Record(WriteOutcome::NotReady));
    }
    assert_eq!(writer.step(), StepOutcome::Idle { flushed: false });
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}
