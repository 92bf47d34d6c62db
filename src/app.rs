//! Startup sequencing and task spawning.
//!
//! Order matters:
//!
//! 1. create the log queue and shared guards
//! 2. bring up storage (non-fatal)
//! 3. bring up bus A, the monitored bus C, then bus B (fatal on failure)
//! 4. spawn the five tasks behind a start gate, then open it
//!
//! Spawned tasks wait on the gate before doing any work. If one spawn fails
//! the gate is dropped unopened and the tasks that did start exit without
//! touching a bus. Once released, tasks run for the lifetime of the process.
//! There is no shutdown protocol.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::{Local, NaiveDateTime};
use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

use crate::bridge::BridgeForwarder;
use crate::can::CanInterface;
use crate::clock::Clock;
use crate::config::{BusConfig, Config, TaskPriority};
use crate::console::Console;
use crate::counters::Counters;
use crate::error::{Error, Result};
use crate::health::{HealthReporter, StatusIndicator};
use crate::monitor::BusMonitor;
use crate::queue::log_queue;
use crate::record::Direction;
use crate::storage::{StorageVolume, StorageWriter, open_storage};

/// Hardware collaborators handed to [`BridgeLogger::start`].
pub struct Peripherals<A, B, M, V, I> {
    /// Bridge side A controller (`CAN1`)
    pub bus_a: A,
    /// Bridge side B controller (`CAN3`)
    pub bus_b: B,
    /// Monitored bus controller (`CAN2`)
    pub bus_c: M,
    /// Removable storage volume
    pub storage: V,
    /// Heartbeat output
    pub indicator: I,
}

/// Handle to the running tasks.
pub struct RunningTasks {
    counters: Arc<Counters>,
    table_name: Option<String>,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl RunningTasks {
    /// Shared traffic counters.
    pub fn counters(&self) -> &Arc<Counters> {
        &self.counters
    }

    /// Name of this run's log table, if storage came up.
    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    /// Names of the spawned tasks, in spawn order.
    pub fn task_names(&self) -> Vec<&'static str> {
        self.handles.iter().map(|(name, _)| *name).collect()
    }

    /// Block on the tasks. Tasks never finish, so this only returns if one
    /// of them panicked.
    pub fn join(self) {
        for (name, handle) in self.handles {
            if handle.join().is_err() {
                log::error!(target: "CAN_BRIDGE", "task {name} panicked");
            }
        }
    }
}

/// The bridge/logger application.
pub struct BridgeLogger;

impl BridgeLogger {
    /// Bring everything up and spawn the tasks, using the local wall clock
    /// for the table name.
    pub fn start<A, B, M, V, I, C>(
        config: Config,
        peripherals: Peripherals<A, B, M, V, I>,
        clock: C,
    ) -> Result<RunningTasks>
    where
        A: CanInterface + 'static,
        B: CanInterface + 'static,
        M: CanInterface + 'static,
        V: StorageVolume,
        I: StatusIndicator + 'static,
        C: Clock + Clone + 'static,
    {
        Self::start_at(config, peripherals, clock, Local::now().naive_local())
    }

    /// Like [`Self::start`], with an explicit table creation time.
    pub fn start_at<A, B, M, V, I, C>(
        config: Config,
        peripherals: Peripherals<A, B, M, V, I>,
        clock: C,
        created: NaiveDateTime,
    ) -> Result<RunningTasks>
    where
        A: CanInterface + 'static,
        B: CanInterface + 'static,
        M: CanInterface + 'static,
        V: StorageVolume,
        I: StatusIndicator + 'static,
        C: Clock + Clone + 'static,
    {
        let Peripherals {
            mut bus_a,
            mut bus_b,
            mut bus_c,
            mut storage,
            indicator,
        } = peripherals;

        log_banner(&config);

        let (queue, consumer) = log_queue(config.queue_capacity);
        let counters = Arc::new(Counters::new());
        let console = Arc::new(Console::new());

        let table = open_storage(&mut storage, created);
        let table_name = table.as_ref().map(|t| t.name().to_owned());
        if table.is_some() {
            counters.mark_storage_ready();
            log::info!(target: "SD_CARD", "SD card ready for logging");
        }

        bring_up(&mut bus_a, &config.bus_a, "bridge")?;
        bring_up(&mut bus_c, &config.bus_c, "logging")?;
        bring_up(&mut bus_b, &config.bus_b, "bridge")?;

        let bus_a = Arc::new(bus_a);
        let bus_b = Arc::new(bus_b);
        let bus_c = Arc::new(bus_c);
        let timing = &config.timing;

        let a_to_b = BridgeForwarder::new(
            Direction::AToB,
            Arc::clone(&bus_a),
            Arc::clone(&bus_b),
            queue.clone(),
            Arc::clone(&counters),
            clock.clone(),
            timing,
        );
        let b_to_a = BridgeForwarder::new(
            Direction::BToA,
            bus_b,
            bus_a,
            queue.clone(),
            Arc::clone(&counters),
            clock.clone(),
            timing,
        );
        let monitor = BusMonitor::new(
            bus_c,
            queue,
            Arc::clone(&counters),
            Arc::clone(&console),
            clock.clone(),
            timing,
        );
        let writer = StorageWriter::new(
            table.map(|t| Arc::new(Mutex::new(t))),
            consumer,
            timing,
        );
        let reporter =
            HealthReporter::new(indicator, Arc::clone(&counters), console, clock, timing);

        let gate = StartGate::new();
        let spawned = [
            spawn_task("CAN1->CAN3", TaskPriority::BRIDGE, &gate, move || a_to_b.run()),
            spawn_task("CAN3->CAN1", TaskPriority::BRIDGE, &gate, move || b_to_a.run()),
            spawn_task("CAN2_LOG", TaskPriority::MONITOR, &gate, move || monitor.run()),
            spawn_task("SD_LOG", TaskPriority::STORAGE, &gate, move || writer.run()),
            spawn_task("LED_STATUS", TaskPriority::HEALTH, &gate, move || reporter.run()),
        ];
        let handles = spawned.into_iter().collect::<Result<Vec<_>>>()?;
        gate.open(handles.len());

        log::info!(target: "CAN_BRIDGE", "All tasks created successfully");
        log::info!(
            target: "CAN_BRIDGE",
            "Logging to: {}",
            table_name.as_deref().unwrap_or("SD CARD ERROR")
        );

        Ok(RunningTasks {
            counters,
            table_name,
            handles,
        })
    }
}

fn log_banner(config: &Config) {
    let (a, b, c) = (&config.bus_a, &config.bus_b, &config.bus_c);
    log::info!(target: "CAN_BRIDGE", "CAN bridge logger starting");
    log::info!(target: "CAN_BRIDGE", "Status indicator pin: GPIO{}", config.status_pin);
    log::info!(
        target: "CAN_BRIDGE",
        "Bridge: {} (GPIO{}/{}) <-> {} (GPIO{}/{}) at {} bit/s",
        a.label, a.tx_pin, a.rx_pin, b.label, b.tx_pin, b.rx_pin, a.bitrate
    );
    log::info!(
        target: "CAN_BRIDGE",
        "Monitor: {} TX=GPIO{}, RX=GPIO{}",
        c.label, c.tx_pin, c.rx_pin
    );
    log::info!(
        target: "CAN_BRIDGE",
        "Log queue: {} records, storage at {}",
        config.queue_capacity, config.mount_point
    );
}

fn bring_up<D: CanInterface>(bus: &mut D, config: &BusConfig, role: &str) -> Result<()> {
    log::info!(target: "CAN_BRIDGE", "Initializing {} {role} interface...", config.label);
    if let Err(e) = bus.start(config) {
        log::error!(target: "CAN_BRIDGE", "{} initialization failed: {e}", config.label);
        return Err(e);
    }
    log::info!(target: "CAN_BRIDGE", "{} {role} interface initialized", config.label);
    Ok(())
}

/// Holds spawned tasks back until every spawn has succeeded.
///
/// Dropping the gate without [`StartGate::open`] releases the waiting tasks
/// with a refusal, so they return without running.
struct StartGate {
    release: Sender<()>,
    waiting: Receiver<()>,
}

impl StartGate {
    fn new() -> Self {
        let (release, waiting) = unbounded();
        Self { release, waiting }
    }

    /// Handle a spawned task blocks on until the gate opens or is dropped.
    fn waiter(&self) -> Receiver<()> {
        self.waiting.clone()
    }

    /// Let `tasks` guarded tasks run.
    fn open(self, tasks: usize) {
        for _ in 0..tasks {
            // Never fails: the gate holds a receiver.
            let _ = self.release.send(());
        }
    }
}

fn spawn_task<F>(
    name: &'static str,
    priority: TaskPriority,
    gate: &StartGate,
    task: F,
) -> Result<(&'static str, JoinHandle<()>)>
where
    F: FnOnce() + Send + 'static,
{
    // std threads have no portable priority; the level is advisory here.
    log::debug!(target: "CAN_BRIDGE", "spawning {name} at priority {}", priority.0);
    let waiter = gate.waiter();
    let handle = thread::Builder::new()
        .name(name.into())
        .spawn(move || {
            if waiter.recv().is_ok() {
                task();
            }
        })
        .map_err(|source| {
            log::error!(target: "CAN_BRIDGE", "failed to create task {name}: {source}");
            Error::Spawn { name, source }
        })?;
    Ok((name, handle))
}
