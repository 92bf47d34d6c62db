//! Forwarding between bus A and bus B.

use std::sync::Arc;
use std::time::Duration;

use can_bridge_logger::clock::ManualClock;
use can_bridge_logger::config::BusConfig;
use can_bridge_logger::{
    BridgeForwarder, Counters, Direction, Enqueue, PollOutcome, PollState, SourceTag,
    log_queue,
};

use super::{fast_timing, frame, started_bus};

#[test]
fn forwards_in_arrival_order_and_counts_each_frame() {
    let (bus_a, wire_a) = started_bus(&BusConfig::bridge("CAN1", 16, 17));
    let (bus_b, wire_b) = started_bus(&BusConfig::bridge("CAN3", 20, 21));
    let (queue, consumer) = log_queue(16);
    let counters = Arc::new(Counters::new());
    let clock = Arc::new(ManualClock::new());

    let mut forwarder = BridgeForwarder::new(
        Direction::AToB,
        bus_a,
        bus_b,
        queue,
        Arc::clone(&counters),
        Arc::clone(&clock),
        &fast_timing(),
    );

    let sent: Vec<_> = (0..5u8).map(|i| frame(0x100 + u16::from(i), &[i])).collect();
    for f in &sent {
        assert!(wire_a.inject(*f));
    }

    for (i, _) in sent.iter().enumerate() {
        clock.set_us(1_000 * (i as u64 + 1));
        assert_eq!(forwarder.poll_once(), PollOutcome::Forwarded(Enqueue::Accepted));
        assert_eq!(counters.forwarded(Direction::AToB), i as u64 + 1);
    }

    assert_eq!(wire_b.drain_transmitted(), sent);
    assert_eq!(counters.forwarded(Direction::BToA), 0);

    for (i, f) in sent.iter().enumerate() {
        let record = consumer.pop_timeout(Duration::ZERO).unwrap();
        assert_eq!(record.source, SourceTag::FORWARD_A_TO_B);
        assert_eq!(record.frame, *f);
        assert_eq!(record.timestamp_us, 1_000 * (i as u64 + 1));
    }
}

#[test]
fn saturated_log_queue_does_not_affect_forwarding() {
    let (bus_b, wire_b) = started_bus(&BusConfig::bridge("CAN3", 20, 21));
    let (bus_a, wire_a) = started_bus(&BusConfig::bridge("CAN1", 16, 17));
    let (queue, consumer) = log_queue(2);
    let counters = Arc::new(Counters::new());

    let mut forwarder = BridgeForwarder::new(
        Direction::BToA,
        bus_b,
        bus_a,
        queue,
        Arc::clone(&counters),
        Arc::new(ManualClock::new()),
        &fast_timing(),
    );

    for i in 0..6u8 {
        wire_b.inject(frame(0x200, &[i]));
    }
    let outcomes: Vec<_> = (0..6).map(|_| forwarder.poll_once()).collect();

    assert_eq!(&outcomes[..2], &[PollOutcome::Forwarded(Enqueue::Accepted); 2]);
    assert_eq!(&outcomes[2..], &[PollOutcome::Forwarded(Enqueue::Dropped); 4]);
    assert_eq!(counters.forwarded(Direction::BToA), 6);
    assert_eq!(wire_a.drain_transmitted().len(), 6);
    assert_eq!(consumer.len(), 2);
}

#[test]
fn saturated_destination_drops_without_counting_or_logging() {
    let mut dest_config = BusConfig::bridge("CAN3", 20, 21);
    dest_config.tx_queue_len = 1;
    let (bus_a, wire_a) = started_bus(&BusConfig::bridge("CAN1", 16, 17));
    let (bus_b, wire_b) = started_bus(&dest_config);
    let (queue, consumer) = log_queue(8);
    let counters = Arc::new(Counters::new());

    let mut forwarder = BridgeForwarder::new(
        Direction::AToB,
        bus_a,
        bus_b,
        queue,
        Arc::clone(&counters),
        Arc::new(ManualClock::new()),
        &fast_timing(),
    );

    wire_a.inject(frame(0x10, &[1]));
    wire_a.inject(frame(0x11, &[2]));
    assert!(matches!(forwarder.poll_once(), PollOutcome::Forwarded(_)));
    assert_eq!(forwarder.poll_once(), PollOutcome::TransmitFailed);

    assert_eq!(counters.forwarded(Direction::AToB), 1);
    assert_eq!(consumer.len(), 1);
    assert_eq!(wire_b.drain_transmitted(), vec![frame(0x10, &[1])]);

    // The lost frame is not retried once the destination drains.
    assert!(matches!(forwarder.poll_once(), PollOutcome::Empty));
    assert!(wire_b.take_transmitted().is_none());
}

#[test]
fn idle_source_backs_off_after_threshold() {
    let (bus_a, wire_a) = started_bus(&BusConfig::bridge("CAN1", 16, 17));
    let (bus_b, _wire_b) = started_bus(&BusConfig::bridge("CAN3", 20, 21));
    let (queue, _consumer) = log_queue(8);
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

    for _ in 0..timing.backoff_threshold {
        assert_eq!(forwarder.poll_once(), PollOutcome::Empty);
        assert_eq!(forwarder.state(), PollState::Polling);
    }
    assert_eq!(forwarder.poll_once(), PollOutcome::BackedOff);
    assert_eq!(forwarder.state(), PollState::Polling);
    assert_eq!(clock.sleeps(), vec![timing.backoff_pause]);

    // Activity resets the run of empty polls.
    for _ in 0..5 {
        forwarder.poll_once();
    }
    wire_a.inject(frame(0x1, &[]));
    assert!(matches!(forwarder.poll_once(), PollOutcome::Forwarded(_)));
    for _ in 0..timing.backoff_threshold {
        assert_eq!(forwarder.poll_once(), PollOutcome::Empty);
    }
    assert_eq!(forwarder.poll_once(), PollOutcome::BackedOff);
    assert_eq!(clock.sleeps().len(), 2);
}
