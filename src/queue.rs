//! Bounded MPSC hand-off queue between the radio callback and the registry tick.
//!
//! Fixed capacity, drop-newest-on-full, FIFO among successfully enqueued
//! updates. Implemented as a preallocated [`VecDeque`] guarded by a
//! short-held [`Mutex`], since there is only ever one producer (the radio
//! callback) and one consumer (the registry tick).

use std::{collections::VecDeque, sync::Mutex};

use crate::update::BeaconUpdate;

/// A fixed-capacity FIFO of [`BeaconUpdate`]s.
pub struct UpdateQueue {
    capacity: usize,
    inner: Mutex<VecDeque<BeaconUpdate>>,
}

impl UpdateQueue {
    /// Creates a new queue with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self { capacity, inner: Mutex::new(VecDeque::with_capacity(capacity)) }
    }

    /// Enqueues `update`. Never blocks. If the queue is full, the new update
    /// is silently dropped (drop-newest) and `false` is returned.
    pub fn enqueue(&self, update: BeaconUpdate) -> bool {
        let mut inner = self.inner.lock().expect("update queue mutex poisoned");
        if inner.len() >= self.capacity {
            return false;
        }
        inner.push_back(update);
        true
    }

    /// Removes and returns all currently-queued updates, in FIFO order, in
    /// one atomic step. Equivalent to a bulk peek immediately committed; the
    /// crate never needs to peek without committing.
    pub fn drain(&self) -> Vec<BeaconUpdate> {
        let mut inner = self.inner.lock().expect("update queue mutex poisoned");
        inner.drain(..).collect()
    }

    /// Number of updates currently queued.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("update queue mutex poisoned").len()
    }

    /// True if no updates are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The queue's fixed capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{identity::BeaconIdentity, status::{AccelStatus, DeviceStatus}, update::DeviceType};

    fn sample(rssi: i8) -> BeaconUpdate {
        BeaconUpdate {
            rssi_dbm: rssi,
            dev_type: DeviceType::BeaconV1,
            identity: BeaconIdentity::from_bytes([1, 2, 3, 4, 5, 6]),
            device_status: DeviceStatus::default(),
            battery_pcnt100: 100,
            temp_deci_deg_c: 200,
            light_255: 10,
            accel_status: AccelStatus::default(),
            battery_mv: 3000,
        }
    }

    #[test]
    fn overflow_drops_newest() {
        let q = UpdateQueue::new(4);
        for i in 0..5 {
            let accepted = q.enqueue(sample(i));
            assert_eq!(accepted, i < 4, "only the first 4 of 5 enqueues should succeed");
        }
        let drained = q.drain();
        assert_eq!(drained.len(), 4);
        let rssis: Vec<i8> = drained.iter().map(|u| u.rssi_dbm).collect();
        assert_eq!(rssis, vec![0, 1, 2, 3], "FIFO order, newest (4) dropped");
    }

    #[test]
    fn drain_empties_the_queue() {
        let q = UpdateQueue::new(4);
        q.enqueue(sample(1));
        assert_eq!(q.drain().len(), 1);
        assert!(q.is_empty());
        assert!(q.drain().is_empty());
    }

    /// With random capacities and random burst sizes, whatever makes it
    /// through `drain()` is always a prefix of what was enqueued, in order.
    #[test]
    fn fifo_order_holds_for_randomized_bursts() {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let capacity = rng.gen_range(1..=8);
            let burst = rng.gen_range(0..=16);
            let q = UpdateQueue::new(capacity);
            let rssis: Vec<i8> = (0..burst).map(|_| rng.gen_range(-100..=0)).collect();
            for &rssi in &rssis {
                q.enqueue(sample(rssi));
            }
            let drained = q.drain();
            let expected_len = rssis.len().min(capacity);
            assert_eq!(drained.len(), expected_len);
            let drained_rssis: Vec<i8> = drained.iter().map(|u| u.rssi_dbm).collect();
            assert_eq!(drained_rssis, rssis[..expected_len]);
        }
    }
}
