//! Turns registry lifecycle events and a periodic Network-thread tick into
//! the JSON notifications this gateway publishes over [`RpcClient`].

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use serde::Serialize;
use serde_json::value::RawValue;

use crate::{
    clock::{GatewayClock, MonotonicClock, TimeDiff},
    config::{UPDATE_MAX_PAYLOAD_BYTES, UPDATE_PERIOD_MS},
    identity::BeaconIdentity,
    proxy::BeaconProxy,
    registry::BeaconRegistry,
    rpc::{GatewayIdentity, RpcClient, Topic},
};

enum LifecycleKind {
    Found,
    Lost,
}

struct LifecycleEvent {
    kind: LifecycleKind,
    identity: BeaconIdentity,
}

/// Adapts a [`GatewayClock`] handle to the plain [`MonotonicClock`] bound
/// `TimeDiff` needs, without relying on trait-object upcasting.
#[derive(Clone)]
struct ClockAsMonotonic(Arc<dyn GatewayClock>);

impl MonotonicClock for ClockAsMonotonic {
    fn now_ms(&self) -> u64 {
        self.0.now_ms()
    }
}

#[derive(Serialize)]
struct LifecycleNotification<'a> {
    #[serde(rename = "gatewayId")]
    gateway_id: &'a str,
    timestamp: u32,
    #[serde(rename = "beaconId")]
    beacon_id: String,
}

#[derive(Serialize)]
struct CheckInNotification {
    variant: u8,
    timestamp_s_local: u32,
    #[serde(rename = "isBeaconRadioReady")]
    is_beacon_radio_ready: u8,
}

#[derive(Serialize)]
struct BeaconUpdateNotification {
    #[serde(rename = "gatewayId")]
    gateway_id: String,
    timestamp: u32,
    #[serde(rename = "beaconId")]
    beacon_id: String,
    rssi: i8,
    #[serde(rename = "isCharging")]
    is_charging: u8,
    batt_pcnt100: u8,
    batt_v: Box<RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    activity: Option<u8>,
    #[serde(rename = "1tap", skip_serializing_if = "Option::is_none")]
    tap_1: Option<u8>,
    #[serde(rename = "2tap", skip_serializing_if = "Option::is_none")]
    tap_2: Option<u8>,
    #[serde(rename = "freeFall", skip_serializing_if = "Option::is_none")]
    free_fall: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temp_c: Option<Box<RawValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    light_255: Option<u8>,
}

/// Formats `value` to exactly `decimals` digits and wraps it as a raw JSON
/// number token, so `2900mv / 1000.0` serializes as `2.90` rather than the
/// trailing-zero-trimmed `2.9` a plain `f64` field would produce.
fn fixed_point(value: f64, decimals: usize) -> Box<RawValue> {
    let text = format!("{value:.decimals$}");
    RawValue::from_string(text).expect("fixed-point formatting always yields valid JSON number syntax")
}

/// Consumes registry lifecycle events and a periodic tick, publishing the
/// four upstream notification shapes: `onBeaconFound`, `onBeaconLost`, the
/// periodic `onBeaconUpdate` snapshot, and `checkIn`.
pub struct UpstreamReporter {
    rpc: Arc<dyn RpcClient>,
    clock: Arc<dyn GatewayClock>,
    identity: Arc<dyn GatewayIdentity>,
    pending: Arc<Mutex<VecDeque<LifecycleEvent>>>,
    td_beacon_update: TimeDiff<ClockAsMonotonic>,
    td_checkin: TimeDiff<ClockAsMonotonic>,
}

impl UpstreamReporter {
    /// Creates a new reporter and registers its lifecycle listeners on
    /// `registry`.
    ///
    /// The registered callbacks only record an identity and a kind; the
    /// actual publish happens later, from [`UpstreamReporter::tick`] on the
    /// Network logical task. The RPC client is only assumed safe to call
    /// from that task, while these callbacks fire synchronously from the
    /// registry's `tick()` on the Bluetooth task.
    pub fn new(
        registry: &mut BeaconRegistry, rpc: Arc<dyn RpcClient>, clock: Arc<dyn GatewayClock>,
        identity: Arc<dyn GatewayIdentity>,
    ) -> Self {
        let pending = Arc::new(Mutex::new(VecDeque::new()));
        let pending_found = pending.clone();
        let pending_lost = pending.clone();
        registry.add_listener(
            Some(Arc::new(move |p: &BeaconProxy| {
                pending_found
                    .lock()
                    .expect("upstream reporter queue poisoned")
                    .push_back(LifecycleEvent { kind: LifecycleKind::Found, identity: p.identity() });
            })),
            None,
            Some(Arc::new(move |p: &BeaconProxy| {
                pending_lost
                    .lock()
                    .expect("upstream reporter queue poisoned")
                    .push_back(LifecycleEvent { kind: LifecycleKind::Lost, identity: p.identity() });
            })),
        );

        let clock_for_diff = ClockAsMonotonic(clock.clone());
        Self {
            rpc,
            clock,
            identity,
            pending,
            td_beacon_update: TimeDiff::new(clock_for_diff.clone()),
            td_checkin: TimeDiff::new(clock_for_diff),
        }
    }

    /// Drains lifecycle events and, once per [`UPDATE_PERIOD_MS`], publishes
    /// a periodic beacon snapshot and a gateway check-in.
    ///
    /// Must be called only from the Network logical task, at a finer
    /// granularity than either period.
    pub fn tick(&self, registry: &mut BeaconRegistry, is_beacon_radio_ready: bool) {
        self.drain_lifecycle_events();
        if self.td_beacon_update.is_elapsed_recurring_ms(UPDATE_PERIOD_MS) {
            self.publish_beacon_updates(registry);
        }
        if self.td_checkin.is_elapsed_recurring_ms(UPDATE_PERIOD_MS) {
            self.publish_checkin(is_beacon_radio_ready);
        }
    }

    fn drain_lifecycle_events(&self) {
        let events: Vec<LifecycleEvent> =
            self.pending.lock().expect("upstream reporter queue poisoned").drain(..).collect();
        if events.is_empty() || !self.clock.is_clock_set() {
            return;
        }
        let gateway_id = self.identity.unique_id_hex();
        let timestamp = self.clock.unix_timestamp_s();
        for event in events {
            let topic = match event.kind {
                LifecycleKind::Found => Topic::OnBeaconFound,
                LifecycleKind::Lost => Topic::OnBeaconLost,
            };
            let notification =
                LifecycleNotification { gateway_id: &gateway_id, timestamp, beacon_id: event.identity.to_string() };
            self.publish(topic, &notification);
        }
    }

    fn publish_beacon_updates(&self, registry: &mut BeaconRegistry) {
        if !self.clock.is_clock_set() {
            return;
        }
        let gateway_id = self.identity.unique_id_hex();
        let timestamp = self.clock.unix_timestamp_s();
        for proxy in registry.known_beacons_mut() {
            let update = *proxy.last_update();
            let device_status = update.device_status;
            let mut notification = BeaconUpdateNotification {
                gateway_id: gateway_id.clone(),
                timestamp,
                beacon_id: proxy.identity().to_string(),
                rssi: update.rssi_dbm,
                is_charging: device_status.is_charging as u8,
                batt_pcnt100: update.battery_pcnt100,
                batt_v: fixed_point(update.battery_mv as f64 / 1000.0, 2),
                activity: None,
                tap_1: None,
                tap_2: None,
                free_fall: None,
                temp_c: None,
                light_255: None,
            };
            if device_status.is_accel_enabled {
                let accel = proxy.check_and_reset_accel_status();
                notification.activity = Some(accel.has_occurred_activity as u8);
                notification.tap_1 = Some(accel.has_occurred_1tap as u8);
                notification.tap_2 = Some(accel.has_occurred_2tap as u8);
                notification.free_fall = Some(accel.has_occurred_free_fall as u8);
            }
            if device_status.is_temp_enabled {
                notification.temp_c = Some(fixed_point(update.temp_deci_deg_c as f64 / 10.0, 1));
            }
            if device_status.is_light_enabled {
                notification.light_255 = Some(update.light_255);
            }
            self.publish(Topic::OnBeaconUpdate, &notification);
        }
    }

    fn publish_checkin(&self, is_beacon_radio_ready: bool) {
        if !self.clock.is_clock_set() {
            return;
        }
        let notification = CheckInNotification {
            variant: self.identity.hardware_variant() as u8,
            timestamp_s_local: self.clock.unix_timestamp_s(),
            is_beacon_radio_ready: is_beacon_radio_ready as u8,
        };
        self.publish(Topic::CheckIn, &notification);
    }

    fn publish<T: Serialize>(&self, topic: Topic, notification: &T) {
        let payload = match serde_json::to_vec(notification) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("failed to serialize {topic} notification: {err}");
                return;
            }
        };
        if payload.len() > UPDATE_MAX_PAYLOAD_BYTES {
            log::warn!(
                "{topic} notification ({} bytes) exceeds the {UPDATE_MAX_PAYLOAD_BYTES}-byte bound; abandoning",
                payload.len()
            );
            return;
        }
        if let Err(err) = self.rpc.publish(topic, &payload) {
            log::warn!("failed to publish {topic}: {err}");
        }
    }
}
