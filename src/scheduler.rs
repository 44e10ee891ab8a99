//! Cooperative run-loop: named work entries executed round-robin on a small
//! fixed set of logical threads (`Network`, `UI`, `Bluetooth`), each with
//! strictly sequential execution within it.
//!
//! Cross-task communication is handled through shared, lock-guarded state
//! rather than channels between OS threads. Each logical thread becomes one
//! long-lived `tokio::task` driven by a `tokio::time::interval` at
//! [`TICK_PERIOD_MS`] granularity, running its registered entries in order on
//! every tick. Because an `interval.tick()` loop body always runs to
//! completion before the next iteration begins, work entries on the same
//! logical thread never interleave with each other without any extra
//! locking.

use std::{fmt, sync::Arc, time::Duration};

use tokio::task::JoinHandle;

/// Granularity at which each logical thread's work entries are polled.
pub const TICK_PERIOD_MS: u64 = 10;

/// One of the fixed set of logical threads work entries run on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LogicalThread {
    /// Publishes upstream notifications and drives the ambient reporter.
    Network,
    /// Drives local UI observers (status LEDs, display, console).
    Ui,
    /// Drives the beacon registry's radio-facing `tick()`.
    Bluetooth,
}

impl fmt::Display for LogicalThread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "Network"),
            Self::Ui => write!(f, "UI"),
            Self::Bluetooth => write!(f, "Bluetooth"),
        }
    }
}

/// A single named unit of work run once per tick of its logical thread.
struct WorkEntry {
    name: &'static str,
    run: Box<dyn FnMut() + Send>,
}

/// One logical thread's queue of work entries, run round-robin every tick.
#[derive(Default)]
struct ThreadEntries {
    entries: Vec<WorkEntry>,
}

impl ThreadEntries {
    fn tick(&mut self) {
        for entry in &mut self.entries {
            (entry.run)();
        }
    }
}

/// Builds up the work entries for each logical thread, then [`Scheduler::run`]
/// spawns one `tokio::task` per thread and returns their join handles.
///
/// Entries must not block: nothing inside a work entry may block for I/O,
/// since blocking would stall every other entry on the same logical thread
/// until the next tick.
#[derive(Default)]
pub struct Scheduler {
    network: ThreadEntries,
    ui: ThreadEntries,
    bluetooth: ThreadEntries,
}

impl Scheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named work entry on `thread`, run once per tick in the
    /// order entries were added.
    pub fn add_entry(&mut self, thread: LogicalThread, name: &'static str, run: impl FnMut() + Send + 'static) {
        let bucket = match thread {
            LogicalThread::Network => &mut self.network,
            LogicalThread::Ui => &mut self.ui,
            LogicalThread::Bluetooth => &mut self.bluetooth,
        };
        bucket.entries.push(WorkEntry { name, run: Box::new(run) });
    }

    /// Spawns one long-lived `tokio::task` per non-empty logical thread,
    /// ticking at [`TICK_PERIOD_MS`] granularity, and returns their join
    /// handles. Dropping (or aborting) the handles stops the corresponding
    /// thread.
    pub fn run(self) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        for (thread, mut entries) in
            [(LogicalThread::Network, self.network), (LogicalThread::Ui, self.ui), (LogicalThread::Bluetooth, self.bluetooth)]
        {
            if entries.entries.is_empty() {
                continue;
            }
            let names: Vec<&'static str> = entries.entries.iter().map(|e| e.name).collect();
            log::debug!("{thread} thread: scheduling entries {names:?}");
            handles.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(Duration::from_millis(TICK_PERIOD_MS));
                loop {
                    ticker.tick().await;
                    entries.tick();
                }
            }));
        }
        handles
    }
}

/// Convenience: wraps a `Fn` behind an `Arc` so the same closure can be shared
/// across entries registered on more than one logical thread (e.g. a shared
/// `Gateway` driving both a Bluetooth-thread tick and a Network-thread tick).
pub fn shared<F: Fn() + Send + Sync + 'static>(f: F) -> Arc<F> {
    Arc::new(f)
}
