//! Wires the registry, radio adapter, upstream reporter, and ambient
//! reporter together, and exposes the handful of query methods the rest of
//! the firmware (UI, console shell) would read.

use std::sync::Arc;

use crate::{
    ambient::{AmbientReporter, AmbientSensor},
    clock::GatewayClock,
    registry::BeaconRegistry,
    reporter::UpstreamReporter,
    rpc::{GatewayIdentity, RpcClient, Variant},
};

/// A passive observer of beacon lifecycle events, distinct from the upstream
/// reporter: local UI and remote reporting are separate subscribers of the
/// same registry.
///
/// Implementations must not block; like the upstream reporter's listener
/// callbacks, a `GatewayObserver` that needs to do real work should record the
/// event and act on it from its own logical task.
pub trait GatewayObserver: Send + Sync {
    /// A previously-unseen beacon started advertising.
    fn on_beacon_found(&self, _identity: crate::identity::BeaconIdentity) {}

    /// A tracked beacon stopped advertising and was removed from the registry.
    fn on_beacon_lost(&self, _identity: crate::identity::BeaconIdentity) {}
}

/// A [`GatewayObserver`] that logs every lifecycle transition, standing in for
/// the on-device UI (status LEDs, display) this crate does not implement.
#[derive(Default)]
pub struct LoggingUiObserver;

impl GatewayObserver for LoggingUiObserver {
    fn on_beacon_found(&self, identity: crate::identity::BeaconIdentity) {
        log::info!("UI: beacon {identity} found");
    }

    fn on_beacon_lost(&self, identity: crate::identity::BeaconIdentity) {
        log::info!("UI: beacon {identity} lost");
    }
}

/// Wires the beacon registry, upstream reporter, and ambient reporter into a
/// single long-lived object, and exposes the query surface the rest of the
/// firmware reads (`isBeaconRadioReady`, last ambient readings, hardware
/// variant).
///
/// `Gateway` does not itself run the cooperative scheduler (see
/// [`crate::scheduler::Scheduler`]) — it only owns the state the scheduler's
/// Bluetooth- and Network-thread work entries drive on each tick.
pub struct Gateway {
    registry: BeaconRegistry,
    upstream: UpstreamReporter,
    ambient: AmbientReporter,
    identity: Arc<dyn GatewayIdentity>,
}

impl Gateway {
    /// Builds a new gateway, registering the upstream reporter as a registry
    /// listener and the given `ui` as a second, independent subscriber.
    pub fn new(
        mut registry: BeaconRegistry, rpc: Arc<dyn RpcClient>, clock: Arc<dyn GatewayClock>,
        identity: Arc<dyn GatewayIdentity>, ambient_sensor: Arc<dyn AmbientSensor>, ui: Arc<dyn GatewayObserver>,
    ) -> Self {
        let upstream = UpstreamReporter::new(&mut registry, rpc.clone(), clock.clone(), identity.clone());
        registry.add_listener(
            Some(Arc::new({
                let ui = ui.clone();
                move |p: &crate::proxy::BeaconProxy| ui.on_beacon_found(p.identity())
            })),
            None,
            Some(Arc::new(move |p: &crate::proxy::BeaconProxy| ui.on_beacon_lost(p.identity()))),
        );
        let ambient = AmbientReporter::new(ambient_sensor, rpc, clock);
        Self { registry, upstream, ambient, identity }
    }

    /// Runs one Bluetooth-thread tick: scan maintenance, update drain, lost-beacon prune.
    pub fn tick_bluetooth(&mut self) {
        self.registry.tick();
    }

    /// Runs one Network-thread tick: drains lifecycle events and, on their
    /// respective periods, publishes the periodic beacon snapshot and the
    /// gateway check-in.
    pub fn tick_network(&mut self) {
        let ready = self.is_beacon_radio_ready();
        self.upstream.tick(&mut self.registry, ready);
    }

    /// Samples the on-board ambient sensors and publishes `onChange` for
    /// whichever reads succeed. Intended to run on the Network thread at a
    /// slower cadence than [`Gateway::tick_network`].
    pub fn sample_ambient(&self) {
        self.ambient.sample();
    }

    /// True once the beacon radio has completed initialization.
    pub fn is_beacon_radio_ready(&self) -> bool {
        self.registry.radio_is_ready()
    }

    /// The most recently successfully-read gateway temperature, in deci-degrees Celsius.
    pub fn last_ambient_temp_deci_deg_c(&self) -> i32 {
        self.ambient.last_temp_deci_deg_c()
    }

    /// The most recently successfully-read gateway ambient light level, 0..255.
    pub fn last_ambient_light_255(&self) -> u8 {
        self.ambient.last_light_255()
    }

    /// This gateway's hardware SKU.
    pub fn hardware_variant(&self) -> Variant {
        self.identity.hardware_variant()
    }

    /// Read-only view of all currently-tracked beacons.
    pub fn known_beacons(&self) -> &[crate::proxy::BeaconProxy] {
        self.registry.known_beacons()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::{FakeClock, MonotonicClock},
        config::COMPANY_ID,
        radio::{AdvField, AdvPacket, MockRadio, RadioAdapter},
        rpc::{LoggingRpcClient, StaticGatewayIdentity},
    };
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex as StdMutex,
    };

    const SCENARIO_1_PAYLOAD: [u8; 15] =
        [0x01, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x00, 0x50, 0xC8, 0x00, 0x80, 0x01, 0xD0, 0x07];

    #[derive(Default)]
    struct RecordingObserver {
        found: AtomicUsize,
        lost: AtomicUsize,
        log: StdMutex<Vec<&'static str>>,
    }

    impl GatewayObserver for RecordingObserver {
        fn on_beacon_found(&self, _identity: crate::identity::BeaconIdentity) {
            self.found.fetch_add(1, Ordering::SeqCst);
            self.log.lock().unwrap().push("found");
        }

        fn on_beacon_lost(&self, _identity: crate::identity::BeaconIdentity) {
            self.lost.fetch_add(1, Ordering::SeqCst);
            self.log.lock().unwrap().push("lost");
        }
    }

    fn build_gateway(radio: Arc<MockRadio>, clock: Arc<FakeClock>, ui: Arc<dyn GatewayObserver>) -> Gateway {
        let dyn_clock: Arc<dyn MonotonicClock> = clock.clone();
        let dyn_radio: Arc<dyn RadioAdapter> = radio;
        let registry = BeaconRegistry::new(dyn_clock, dyn_radio);
        let rpc = Arc::new(LoggingRpcClient);
        let identity = Arc::new(StaticGatewayIdentity::new("ABCDEF", Variant::External));
        let gw_clock: Arc<dyn GatewayClock> = clock;
        let sensor = Arc::new(crate::ambient::MockAmbientSensor::new());
        Gateway::new(registry, rpc, gw_clock, identity, sensor, ui)
    }

    #[test]
    fn ui_observer_sees_found_and_lost_independently_of_upstream_reporter() {
        let radio = Arc::new(MockRadio::new());
        let clock = Arc::new(FakeClock::new());
        let ui = Arc::new(RecordingObserver::default());
        let mut gateway = build_gateway(radio.clone(), clock.clone(), ui.clone());

        // Bring the radio ready and tick once to start the passive scan,
        // registering `MockRadio`'s `on_advertisement` callback, before
        // injecting anything.
        radio.set_ready(true);
        gateway.tick_bluetooth();

        radio.inject_manufacturer_advertisement(-60, COMPANY_ID, SCENARIO_1_PAYLOAD.to_vec());
        gateway.tick_bluetooth();
        assert_eq!(ui.found.load(Ordering::SeqCst), 1);

        clock.advance_ms(crate::config::LOST_TIMEOUT_MS + 1);
        gateway.tick_bluetooth();
        assert_eq!(ui.lost.load(Ordering::SeqCst), 1);
        assert_eq!(*ui.log.lock().unwrap(), vec!["found", "lost"]);
    }

    #[test]
    fn query_surface_reflects_radio_and_hardware_variant() {
        let radio = Arc::new(MockRadio::new());
        let clock = Arc::new(FakeClock::new());
        let ui = Arc::new(LoggingUiObserver);
        let gateway = build_gateway(radio.clone(), clock, ui);

        assert!(!gateway.is_beacon_radio_ready());
        radio.set_ready(true);
        assert!(gateway.is_beacon_radio_ready());
        assert_eq!(gateway.hardware_variant(), Variant::External);
        assert_eq!(gateway.last_ambient_temp_deci_deg_c(), 0);
    }

    #[test]
    fn submit_advertisement_helper_is_reachable_through_the_registry() {
        let radio = Arc::new(MockRadio::new());
        let clock = Arc::new(FakeClock::new());
        let ui = Arc::new(LoggingUiObserver);
        let mut gateway = build_gateway(radio, clock, ui);
        assert!(gateway.known_beacons().is_empty());
        gateway.tick_network();
    }
}
