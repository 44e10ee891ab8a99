//! Fixed-capacity table of [`BeaconProxy`], keyed by identity. Drives the
//! found/updated/lost lifecycle and fans out to subscribers.

use std::sync::Arc;

use crate::{
    clock::{MonotonicClock, TimeDiff},
    config::{COMPANY_ID, MAX_BEACONS, MAX_LISTENERS, MAX_QUEUE, SCAN_CHECK_PERIOD_MS},
    identity::BeaconIdentity,
    parser,
    proxy::BeaconProxy,
    queue::UpdateQueue,
    radio::{AdvField, AdvPacket, RadioAdapter},
};

/// A listener callback: invoked synchronously from [`BeaconRegistry::tick`]
/// on the Bluetooth logical task. Must not block.
pub type BeaconListenerCallback = Arc<dyn Fn(&BeaconProxy) + Send + Sync>;

struct ListenerEntry {
    on_found: Option<BeaconListenerCallback>,
    on_update: Option<BeaconListenerCallback>,
    on_lost: Option<BeaconListenerCallback>,
}

/// The write end of the bounded update queue (`submitAdvertisement`), cheaply
/// cloneable and safe to call from whatever thread the radio driver delivers
/// advertisements on.
///
/// This is the *only* piece of registry state touched off the Bluetooth
/// logical task: it owns nothing but an `Arc<UpdateQueue>`.
#[derive(Clone)]
pub struct AdvertisementSink {
    queue: Arc<UpdateQueue>,
}

impl AdvertisementSink {
    /// Filters `packet` for a manufacturer-data field carrying
    /// [`COMPANY_ID`]; if present, parses it and enqueues the result.
    /// Non-matching packets and parse failures are silently skipped; a full
    /// queue silently drops the newest update.
    pub fn submit_advertisement(&self, packet: AdvPacket) {
        let man_bytes = packet.adv_fields.iter().find_map(|field| match field {
            AdvField::ManufacturerData { company_id, man_bytes } if *company_id == COMPANY_ID => {
                Some(man_bytes.as_slice())
            }
            _ => None,
        });
        let Some(man_bytes) = man_bytes else { return };

        match parser::parse(packet.rssi, man_bytes) {
            Ok(update) => {
                if !self.queue.enqueue(update) {
                    log::warn!("beacon update queue full ({} entries); dropping newest update", self.queue.capacity());
                }
            }
            Err(err) => log::trace!("discarding unparseable beacon advertisement: {err}"),
        }
    }
}

/// Fixed-capacity table of currently-visible beacons.
pub struct BeaconRegistry {
    sink: AdvertisementSink,
    proxies: Vec<BeaconProxy>,
    listeners: Vec<ListenerEntry>,
    clock: Arc<dyn MonotonicClock>,
    radio: Arc<dyn RadioAdapter>,
    scanning_check: TimeDiff<Arc<dyn MonotonicClock>>,
    scanning_started: bool,
}

impl BeaconRegistry {
    /// Creates a new, empty registry bound to the given clock and radio.
    pub fn new(clock: Arc<dyn MonotonicClock>, radio: Arc<dyn RadioAdapter>) -> Self {
        radio.add_listener(
            Arc::new(|| log::debug!("beacon radio ready")),
            Arc::new(|will_auto_retry| {
                log::warn!("beacon radio failed to initialize (auto-retry: {will_auto_retry})")
            }),
        );

        Self {
            sink: AdvertisementSink { queue: Arc::new(UpdateQueue::new(MAX_QUEUE)) },
            proxies: Vec::with_capacity(MAX_BEACONS),
            listeners: Vec::with_capacity(MAX_LISTENERS),
            scanning_check: TimeDiff::new(clock.clone()),
            clock,
            radio,
            scanning_started: false,
        }
    }

    /// A cheaply-cloneable handle for submitting advertisements from the
    /// radio callback, regardless of which thread it runs on.
    pub fn advertisement_sink(&self) -> AdvertisementSink {
        self.sink.clone()
    }

    /// Equivalent to `self.advertisement_sink().submit_advertisement(packet)`.
    pub fn submit_advertisement(&self, packet: AdvPacket) {
        self.sink.submit_advertisement(packet);
    }

    /// Registers a listener. Registration is append-only; there is no
    /// removal API. Exceeding [`MAX_LISTENERS`] is a programmer error and panics.
    pub fn add_listener(
        &mut self, on_found: Option<BeaconListenerCallback>, on_update: Option<BeaconListenerCallback>,
        on_lost: Option<BeaconListenerCallback>,
    ) {
        assert!(self.listeners.len() < MAX_LISTENERS, "beacon registry already has {MAX_LISTENERS} listeners");
        self.listeners.push(ListenerEntry { on_found, on_update, on_lost });
    }

    /// Read-only view of all currently-tracked beacons.
    pub fn known_beacons(&self) -> &[BeaconProxy] {
        &self.proxies
    }

    /// True once the underlying radio has completed initialization.
    pub fn radio_is_ready(&self) -> bool {
        self.radio.is_ready()
    }

    /// Mutable view of all currently-tracked beacons, for reporters that
    /// need to call [`BeaconProxy::check_and_reset_accel_status`] while
    /// building a periodic snapshot.
    pub fn known_beacons_mut(&mut self) -> &mut [BeaconProxy] {
        &mut self.proxies
    }

    /// Runs one pass of scan maintenance, update application, and lost-beacon
    /// pruning. Must be called only from the Bluetooth logical task.
    pub fn tick(&mut self) {
        self.maybe_restart_scan();
        self.drain_and_apply_updates();
        self.prune_lost_beacons();
    }

    fn maybe_restart_scan(&mut self) {
        if !self.radio.is_ready() {
            return;
        }
        let should_start = if !self.scanning_started {
            true
        } else {
            !self.radio.is_scanning() && self.scanning_check.is_elapsed_recurring_ms(SCAN_CHECK_PERIOD_MS)
        };
        if !should_start {
            return;
        }

        self.scanning_started = true;
        self.scanning_check.set_start_now();
        log::info!("(re)starting passive beacon scan");
        let sink = self.sink.clone();
        self.radio.start_passive_scan(
            Arc::new(|ok| {
                if !ok {
                    log::warn!("failed to start passive beacon scan; will retry");
                }
            }),
            Arc::new(move |packet| sink.submit_advertisement(packet)),
        );
    }

    fn drain_and_apply_updates(&mut self) {
        for update in self.sink.queue.drain() {
            let existing = self.proxies.iter().position(|p| p.identity() == update.identity);
            match existing {
                Some(idx) => {
                    self.proxies[idx].apply(update);
                    self.notify(idx, |l| l.on_update.as_ref());
                }
                None => {
                    if self.proxies.len() >= MAX_BEACONS {
                        log::warn!("beacon registry full ({MAX_BEACONS} beacons); dropping new beacon {}", update.identity);
                        continue;
                    }
                    self.proxies.push(BeaconProxy::create(self.clock.clone(), update));
                    let idx = self.proxies.len() - 1;
                    self.notify(idx, |l| l.on_found.as_ref());
                }
            }
        }
    }

    fn prune_lost_beacons(&mut self) {
        let lost: Vec<BeaconIdentity> = self
            .proxies
            .iter()
            .enumerate()
            .filter(|(_, p)| p.has_timed_out())
            .map(|(idx, _)| {
                self.notify(idx, |l| l.on_lost.as_ref());
                self.proxies[idx].identity()
            })
            .collect();
        if !lost.is_empty() {
            self.proxies.retain(|p| !lost.contains(&p.identity()));
        }
    }

    fn notify(&self, idx: usize, select: impl Fn(&ListenerEntry) -> Option<&BeaconListenerCallback>) {
        let proxy = &self.proxies[idx];
        for listener in &self.listeners {
            if let Some(cb) = select(listener) {
                cb(proxy);
            }
        }
    }
}
