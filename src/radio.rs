//! The radio collaborator contract — an interface seam.
//!
//! The physical radio driver is out of scope; this module only defines what
//! the registry needs from it, plus an in-memory [`MockRadio`] used by tests
//! and the `gatewayd` demo binary to exercise the in-scope registry/reporter
//! logic without real hardware.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

/// One field of a BLE advertisement's advertising-data list.
#[derive(Clone, Debug)]
pub enum AdvField {
    /// Manufacturer Specific Data field.
    ManufacturerData {
        /// 16-bit company identifier.
        company_id: u16,
        /// Manufacturer-specific payload bytes.
        man_bytes: Vec<u8>,
    },
    /// Any advertising field this gateway does not interpret.
    Other,
}

/// A single received advertisement frame, as delivered by the radio.
#[derive(Clone, Debug, Default)]
pub struct AdvPacket {
    /// Received signal strength in dBm.
    pub rssi: i8,
    /// The advertisement's advertising-data fields.
    pub adv_fields: Vec<AdvField>,
}

/// Callback invoked once a `start_passive_scan` request completes.
pub type ScanStartCallback = Arc<dyn Fn(bool) + Send + Sync>;
/// Callback invoked for every advertisement the radio receives while scanning.
pub type AdvertisementCallback = Arc<dyn Fn(AdvPacket) + Send + Sync>;
/// Callback invoked once the radio becomes ready for use.
pub type ReadyCallback = Arc<dyn Fn() + Send + Sync>;
/// Callback invoked if radio initialization fails; the bool indicates
/// whether the radio driver will retry automatically.
pub type FailedInitCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// The capabilities the beacon registry consumes from the radio abstraction.
///
/// Implementations are otherwise opaque: scanning mode, channel selection,
/// and power management are the radio driver's business, not the registry's.
pub trait RadioAdapter: Send + Sync {
    /// True once the radio has completed initialization and can be used.
    fn is_ready(&self) -> bool;

    /// True while a passive scan is currently in progress.
    fn is_scanning(&self) -> bool;

    /// Starts (or restarts) a passive scan. `on_advertisement` is invoked for
    /// every received advertisement; `on_scan_start_result` is invoked once,
    /// reporting whether the scan request itself succeeded.
    fn start_passive_scan(&self, on_scan_start_result: ScanStartCallback, on_advertisement: AdvertisementCallback);

    /// Registers the radio readiness listener. At most one registration is
    /// meaningful; later registrations replace the earlier one.
    fn add_listener(&self, on_ready: ReadyCallback, on_failed_init: FailedInitCallback);
}

/// In-memory [`RadioAdapter`] for tests and the demo binary.
///
/// Starts not-ready and not-scanning. Tests drive it with
/// [`MockRadio::set_ready`], [`MockRadio::inject_advertisement`], and
/// [`MockRadio::set_next_scan_start_result`].
#[derive(Default)]
pub struct MockRadio {
    ready: AtomicBool,
    scanning: AtomicBool,
    next_scan_start_result: AtomicBool,
    on_advertisement: Mutex<Option<AdvertisementCallback>>,
    on_ready: Mutex<Option<ReadyCallback>>,
    on_failed_init: Mutex<Option<FailedInitCallback>>,
}

impl MockRadio {
    /// Creates a new, not-ready mock radio. Scan-start requests succeed by default.
    pub fn new() -> Self {
        let radio = Self::default();
        radio.next_scan_start_result.store(true, Ordering::SeqCst);
        radio
    }

    /// Flips readiness and, if becoming ready, fires the registered
    /// `on_ready` callback.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
        if ready {
            if let Some(cb) = self.on_ready.lock().expect("mock radio mutex poisoned").as_ref() {
                cb();
            }
        }
    }

    /// Fires the registered `on_failed_init` callback without ever becoming ready.
    pub fn fail_init(&self, will_auto_retry: bool) {
        if let Some(cb) = self.on_failed_init.lock().expect("mock radio mutex poisoned").as_ref() {
            cb(will_auto_retry);
        }
    }

    /// Configures whether the next `start_passive_scan` call reports success.
    pub fn set_next_scan_start_result(&self, success: bool) {
        self.next_scan_start_result.store(success, Ordering::SeqCst);
    }

    /// Synchronously delivers an advertisement to the currently-registered
    /// callback, as if the radio had just received it over the air.
    pub fn inject_advertisement(&self, packet: AdvPacket) {
        if let Some(cb) = self.on_advertisement.lock().expect("mock radio mutex poisoned").as_ref() {
            cb(packet);
        }
    }

    /// Convenience: injects a single manufacturer-data advertisement.
    pub fn inject_manufacturer_advertisement(&self, rssi: i8, company_id: u16, man_bytes: Vec<u8>) {
        self.inject_advertisement(AdvPacket {
            rssi,
            adv_fields: vec![AdvField::ManufacturerData { company_id, man_bytes }],
        });
    }
}

impl RadioAdapter for MockRadio {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    fn start_passive_scan(&self, on_scan_start_result: ScanStartCallback, on_advertisement: AdvertisementCallback) {
        *self.on_advertisement.lock().expect("mock radio mutex poisoned") = Some(on_advertisement);
        let success = self.next_scan_start_result.load(Ordering::SeqCst);
        self.scanning.store(success, Ordering::SeqCst);
        on_scan_start_result(success);
    }

    fn add_listener(&self, on_ready: ReadyCallback, on_failed_init: FailedInitCallback) {
        *self.on_ready.lock().expect("mock radio mutex poisoned") = Some(on_ready);
        *self.on_failed_init.lock().expect("mock radio mutex poisoned") = Some(on_failed_init);
    }
}
