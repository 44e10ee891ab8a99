//! Demo binary wiring an in-memory simulated radio and ambient sensor to a
//! stdout-logging RPC sink, driven by the cooperative [`Scheduler`]. A thin
//! `clap`-driven wrapper around the library that prints what it observes
//! rather than doing anything with real hardware.

use std::{
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use beacon_gateway::{
    ambient::MockAmbientSensor,
    clock::{GatewayClock, MonotonicClock, SystemClock},
    config::COMPANY_ID,
    gateway::{Gateway, LoggingUiObserver},
    radio::{AdvField, AdvPacket, MockRadio, RadioAdapter},
    registry::BeaconRegistry,
    rpc::{LoggingRpcClient, RpcClient, StaticGatewayIdentity, Variant},
    scheduler::{LogicalThread, Scheduler},
};
use clap::Parser;

/// Runs a simulated beacon gateway: a fake radio periodically "sees" a
/// handful of synthetic beacons, and every notification the upstream reporter
/// would publish is logged instead of sent over MQTT.
#[derive(Parser, Debug)]
struct Opts {
    /// This gateway's hex identifier, used as `gatewayId` in every notification.
    #[clap(long, default_value = "ABCDEF")]
    gateway_id: String,

    /// Hardware variant reported in `checkIn` (0=Unknown, 1=Internal, 2=InternalHighPower, 3=External).
    #[clap(long, default_value_t = 1)]
    variant: u8,

    /// Number of synthetic beacons the simulated radio advertises.
    #[clap(long, default_value_t = 3)]
    beacons: u8,

    /// How often (ms) the simulated radio emits a fresh advertisement per beacon.
    #[clap(long, default_value_t = 5_000)]
    advertise_period_ms: u64,
}

fn variant_from_u8(v: u8) -> Variant {
    match v {
        1 => Variant::Internal,
        2 => Variant::InternalHighPower,
        3 => Variant::External,
        _ => Variant::Unknown,
    }
}

/// Wraps [`SystemClock`] to satisfy [`GatewayClock`]: the wall clock is
/// considered set from process start, standing in for the external NTP
/// collaborator a production gateway would otherwise depend on.
struct RealtimeClock {
    monotonic: SystemClock,
    unix_epoch_offset_s: AtomicU32,
}

impl RealtimeClock {
    fn new() -> Self {
        let unix_s = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as u32).unwrap_or(0);
        Self { monotonic: SystemClock::new(), unix_epoch_offset_s: AtomicU32::new(unix_s) }
    }
}

impl MonotonicClock for RealtimeClock {
    fn now_ms(&self) -> u64 {
        self.monotonic.now_ms()
    }
}

impl GatewayClock for RealtimeClock {
    fn is_clock_set(&self) -> bool {
        true
    }

    fn unix_timestamp_s(&self) -> u32 {
        self.unix_epoch_offset_s.load(Ordering::SeqCst) + (self.now_ms() / 1000) as u32
    }
}

/// Builds one synthetic 15-byte advertisement payload for beacon `n`.
fn synthetic_payload(n: u8) -> [u8; 15] {
    [0x01, 0x11, 0x22, 0x33, 0x44, n, 0b0000_0111, 0x00, 90, 0xD0, 0x07, 0xC0, 0x00, 0xB8, 0x0B]
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let opts = Opts::parse();

    let radio = Arc::new(MockRadio::new());
    let clock = Arc::new(RealtimeClock::new());
    let rpc: Arc<dyn RpcClient> = Arc::new(LoggingRpcClient);
    let identity = Arc::new(StaticGatewayIdentity::new(opts.gateway_id.clone(), variant_from_u8(opts.variant)));
    let sensor = Arc::new(MockAmbientSensor::new());
    sensor.set_temp_deci_deg_c(225);
    sensor.set_light_255(128);

    let dyn_radio: Arc<dyn RadioAdapter> = radio.clone();
    let dyn_clock_for_registry: Arc<dyn MonotonicClock> = clock.clone();
    let registry = BeaconRegistry::new(dyn_clock_for_registry, dyn_radio);

    let dyn_clock: Arc<dyn GatewayClock> = clock.clone();
    let gateway = Arc::new(std::sync::Mutex::new(Gateway::new(
        registry,
        rpc,
        dyn_clock,
        identity,
        sensor,
        Arc::new(LoggingUiObserver),
    )));

    radio.set_ready(true);

    let mut scheduler = Scheduler::new();

    let gw_bluetooth = gateway.clone();
    scheduler.add_entry(LogicalThread::Bluetooth, "registry-tick", move || {
        gw_bluetooth.lock().expect("gateway mutex poisoned").tick_bluetooth();
    });

    let gw_network = gateway.clone();
    scheduler.add_entry(LogicalThread::Network, "upstream-reporter-tick", move || {
        gw_network.lock().expect("gateway mutex poisoned").tick_network();
    });

    let gw_ambient = gateway.clone();
    scheduler.add_entry(LogicalThread::Network, "ambient-sample", move || {
        gw_ambient.lock().expect("gateway mutex poisoned").sample_ambient();
    });

    let radio_for_sim = radio.clone();
    let beacon_count = opts.beacons;
    let advertise_period_ms = opts.advertise_period_ms;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(advertise_period_ms));
        loop {
            interval.tick().await;
            for n in 0..beacon_count {
                radio_for_sim.inject_advertisement(AdvPacket {
                    rssi: -55 - n as i8,
                    adv_fields: vec![AdvField::ManufacturerData {
                        company_id: COMPANY_ID,
                        man_bytes: synthetic_payload(n).to_vec(),
                    }],
                });
            }
        }
    });

    log::info!(
        "simulated beacon gateway running: {} synthetic beacon(s), advertising every {} ms",
        opts.beacons,
        opts.advertise_period_ms
    );

    for handle in scheduler.run() {
        let _ = handle.await;
    }
}
