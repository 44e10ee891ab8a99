//! The gateway's in-memory shadow of a remote beacon.

use std::sync::Arc;

use crate::{
    clock::{MonotonicClock, TimeDiff},
    config::LOST_TIMEOUT_MS,
    identity::BeaconIdentity,
    status::AccelStatus,
    update::{BeaconUpdate, DeviceType},
};

/// The gateway's in-memory shadow of a remote beacon.
///
/// Identity never changes after creation. Mutated only by the registry's
/// `tick()`, on the Bluetooth logical task.
pub struct BeaconProxy {
    last_update: BeaconUpdate,
    td_last_update: TimeDiff<Arc<dyn MonotonicClock>>,
    cached_accel_status: AccelStatus,
}

impl BeaconProxy {
    /// Creates a new proxy, seeding `cached_accel_status` from the initial
    /// update and timestamping `td_last_update` to now.
    pub fn create(clock: Arc<dyn MonotonicClock>, initial_update: BeaconUpdate) -> Self {
        Self {
            cached_accel_status: initial_update.accel_status,
            last_update: initial_update,
            td_last_update: TimeDiff::new(clock),
        }
    }

    /// Replaces `last_update`, resets the last-seen timestamp, and OR-latches
    /// the accel flags: a cached bit that is 0 is set to 1 if the new
    /// update's corresponding bit is 1; bits already 1 stay 1.
    pub fn apply(&mut self, update: BeaconUpdate) {
        self.cached_accel_status = self.cached_accel_status.latch(update.accel_status);
        self.last_update = update;
        self.td_last_update.set_start_now();
    }

    /// Returns the current latched accel status and simultaneously reseeds
    /// it from `last_update.accel_status` (not zero): any event still
    /// present in the most recent update remains latched, while events
    /// consumed by this read are cleared.
    pub fn check_and_reset_accel_status(&mut self) -> AccelStatus {
        let observed = self.cached_accel_status;
        self.cached_accel_status = self.last_update.accel_status;
        observed
    }

    /// True iff more than [`LOST_TIMEOUT_MS`] have elapsed since the last update.
    pub fn has_timed_out(&self) -> bool {
        self.td_last_update.is_elapsed_ms(LOST_TIMEOUT_MS)
    }

    /// This beacon's identity.
    pub fn identity(&self) -> BeaconIdentity {
        self.last_update.identity
    }

    /// This beacon's hardware/firmware variant.
    pub fn device_type(&self) -> DeviceType {
        self.last_update.dev_type
    }

    /// The most recently applied update.
    pub fn last_update(&self) -> &BeaconUpdate {
        &self.last_update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::FakeClock, status::DeviceStatus};

    fn update_with_accel(byte: u8) -> BeaconUpdate {
        BeaconUpdate {
            rssi_dbm: -50,
            dev_type: DeviceType::BeaconV1,
            identity: BeaconIdentity::from_bytes([1, 2, 3, 4, 5, 6]),
            device_status: DeviceStatus::default(),
            battery_pcnt100: 80,
            temp_deci_deg_c: 210,
            light_255: 5,
            accel_status: AccelStatus::from_byte(byte),
            battery_mv: 2900,
        }
    }

    #[test]
    fn latch_law_holds_across_a_sequence_of_updates() {
        let clock: Arc<dyn MonotonicClock> = Arc::new(FakeClock::new());
        let mut proxy = BeaconProxy::create(clock, update_with_accel(0x00));
        proxy.apply(update_with_accel(0x02)); // 1tap
        proxy.apply(update_with_accel(0x00));
        proxy.apply(update_with_accel(0x04)); // 2tap
        let observed = proxy.check_and_reset_accel_status();
        assert!(observed.has_occurred_1tap);
        assert!(observed.has_occurred_2tap);
        assert!(!observed.has_occurred_free_fall);
    }

    #[test]
    fn reset_reseeds_from_last_update_not_zero() {
        let clock: Arc<dyn MonotonicClock> = Arc::new(FakeClock::new());
        let mut proxy = BeaconProxy::create(clock, update_with_accel(0x02));
        proxy.apply(update_with_accel(0x02)); // still set in the latest update
        let _ = proxy.check_and_reset_accel_status();
        // The bit consumed by the reader is still present in last_update, so
        // it remains latched immediately after the reset.
        assert!(proxy.cached_accel_status.has_occurred_1tap);
    }

    #[test]
    fn reset_clears_events_not_present_in_last_update() {
        let clock: Arc<dyn MonotonicClock> = Arc::new(FakeClock::new());
        let mut proxy = BeaconProxy::create(clock, update_with_accel(0x02));
        proxy.apply(update_with_accel(0x00)); // the tap already passed
        let observed = proxy.check_and_reset_accel_status();
        assert!(observed.has_occurred_1tap, "the edge must still be reported once");
        assert!(!proxy.cached_accel_status.has_occurred_1tap, "then cleared, since last_update no longer shows it");
    }

    #[test]
    fn has_timed_out_after_lost_timeout() {
        let clock = Arc::new(FakeClock::new());
        let dyn_clock: Arc<dyn MonotonicClock> = clock.clone();
        let proxy = BeaconProxy::create(dyn_clock, update_with_accel(0x00));
        assert!(!proxy.has_timed_out());
        clock.advance_ms(LOST_TIMEOUT_MS + 1);
        assert!(proxy.has_timed_out());
    }
}
