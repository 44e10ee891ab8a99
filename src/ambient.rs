//! The gateway's own on-board temperature and ambient-light sensors,
//! reported through the same notification primitives as the beacon upstream
//! reporter.

use std::sync::{
    atomic::{AtomicBool, AtomicI32, AtomicU8, Ordering},
    Arc,
};

use serde::Serialize;

use crate::{
    clock::GatewayClock,
    error::{ErrorKind, Result},
    rpc::{RpcClient, Topic},
};

/// The gateway's own ambient-sensor collaborator: the on-board temperature
/// and light sensors, analogous to the beacon radio but local to the
/// gateway itself.
pub trait AmbientSensor: Send + Sync {
    /// Reads the on-board temperature, in deci-degrees Celsius.
    fn read_temp_deci_deg_c(&self) -> Result<i32>;

    /// Reads the on-board ambient light level, 0..255.
    fn read_light_255(&self) -> Result<u8>;
}

/// In-memory [`AmbientSensor`] for tests and the `gatewayd` demo binary.
#[derive(Default)]
pub struct MockAmbientSensor {
    temp_deci_deg_c: AtomicI32,
    light_255: AtomicU8,
    temp_fails: AtomicBool,
    light_fails: AtomicBool,
}

impl MockAmbientSensor {
    /// Creates a mock reporting `0.0`°C and light level `0` until configured otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value the next successful temperature read will return.
    pub fn set_temp_deci_deg_c(&self, value: i32) {
        self.temp_deci_deg_c.store(value, Ordering::SeqCst);
    }

    /// Sets the value the next successful light read will return.
    pub fn set_light_255(&self, value: u8) {
        self.light_255.store(value, Ordering::SeqCst);
    }

    /// Configures whether temperature reads fail.
    pub fn set_temp_fails(&self, fails: bool) {
        self.temp_fails.store(fails, Ordering::SeqCst);
    }

    /// Configures whether light reads fail.
    pub fn set_light_fails(&self, fails: bool) {
        self.light_fails.store(fails, Ordering::SeqCst);
    }
}

impl AmbientSensor for MockAmbientSensor {
    fn read_temp_deci_deg_c(&self) -> Result<i32> {
        if self.temp_fails.load(Ordering::SeqCst) {
            return Err(ErrorKind::SensorReadFailed("mock temperature sensor".to_string()).into());
        }
        Ok(self.temp_deci_deg_c.load(Ordering::SeqCst))
    }

    fn read_light_255(&self) -> Result<u8> {
        if self.light_fails.load(Ordering::SeqCst) {
            return Err(ErrorKind::SensorReadFailed("mock light sensor".to_string()).into());
        }
        Ok(self.light_255.load(Ordering::SeqCst))
    }
}

#[derive(Serialize)]
struct AmbientChangeNotification {
    timestamp_s_local: u32,
    value_num: i32,
}

/// Periodically samples an [`AmbientSensor`] and publishes `onChange`
/// notifications on successful reads. A failed read is logged and otherwise
/// ignored; the last successfully-read value is retained for the Gateway
/// Orchestrator's query methods.
pub struct AmbientReporter {
    sensor: Arc<dyn AmbientSensor>,
    rpc: Arc<dyn RpcClient>,
    clock: Arc<dyn GatewayClock>,
    last_temp_deci_deg_c: AtomicI32,
    last_light_255: AtomicU8,
}

impl AmbientReporter {
    /// Creates a new ambient reporter. Last-known readings start at zero
    /// until the first successful sample.
    pub fn new(sensor: Arc<dyn AmbientSensor>, rpc: Arc<dyn RpcClient>, clock: Arc<dyn GatewayClock>) -> Self {
        Self { sensor, rpc, clock, last_temp_deci_deg_c: AtomicI32::new(0), last_light_255: AtomicU8::new(0) }
    }

    /// Samples both sensors once and publishes `onChange` for whichever
    /// reads succeed. Intended to be called periodically from the Network
    /// logical task.
    pub fn sample(&self) {
        match self.sensor.read_temp_deci_deg_c() {
            Ok(value) => {
                self.last_temp_deci_deg_c.store(value, Ordering::SeqCst);
                self.publish_change(Topic::AmbientTempOnChange, value);
            }
            Err(err) => log::warn!("ambient temperature read failed: {err}"),
        }

        match self.sensor.read_light_255() {
            Ok(value) => {
                self.last_light_255.store(value, Ordering::SeqCst);
                self.publish_change(Topic::AmbientLightOnChange, value as i32);
            }
            Err(err) => log::warn!("ambient light read failed: {err}"),
        }
    }

    /// The most recently successfully-read temperature, in deci-degrees Celsius.
    pub fn last_temp_deci_deg_c(&self) -> i32 {
        self.last_temp_deci_deg_c.load(Ordering::SeqCst)
    }

    /// The most recently successfully-read ambient light level, 0..255.
    pub fn last_light_255(&self) -> u8 {
        self.last_light_255.load(Ordering::SeqCst)
    }

    fn publish_change(&self, topic: Topic, value_num: i32) {
        if !self.clock.is_clock_set() {
            return;
        }
        let notification = AmbientChangeNotification { timestamp_s_local: self.clock.unix_timestamp_s(), value_num };
        match serde_json::to_vec(&notification) {
            Ok(payload) => {
                if let Err(err) = self.rpc.publish(topic, &payload) {
                    log::warn!("failed to publish {topic}: {err}");
                }
            }
            Err(err) => log::warn!("failed to serialize {topic} notification: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::FakeClock, rpc::LoggingRpcClient};
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingRpc {
        published: StdMutex<Vec<(Topic, String)>>,
    }

    impl RpcClient for RecordingRpc {
        fn publish(&self, topic: Topic, payload: &[u8]) -> Result<()> {
            self.published.lock().unwrap().push((topic, std::str::from_utf8(payload).unwrap().to_string()));
            Ok(())
        }
    }

    #[test]
    fn successful_reads_publish_on_change_and_update_last_values() {
        let sensor = Arc::new(MockAmbientSensor::new());
        sensor.set_temp_deci_deg_c(225);
        sensor.set_light_255(40);
        let clock = Arc::new(FakeClock::new());
        clock.set_unix_timestamp_s(1_700_000_000);
        let rpc = Arc::new(RecordingRpc::default());
        let gw_clock: Arc<dyn GatewayClock> = clock;
        let reporter = AmbientReporter::new(sensor, rpc.clone(), gw_clock);

        reporter.sample();

        assert_eq!(reporter.last_temp_deci_deg_c(), 225);
        assert_eq!(reporter.last_light_255(), 40);
        let published = rpc.published.lock().unwrap();
        assert_eq!(published.len(), 2);
        assert!(published.iter().any(|(t, b)| *t == Topic::AmbientTempOnChange && b.contains("225")));
        assert!(published.iter().any(|(t, b)| *t == Topic::AmbientLightOnChange && b.contains("40")));
    }

    #[test]
    fn failed_read_is_not_published_and_retains_last_value() {
        let sensor = Arc::new(MockAmbientSensor::new());
        sensor.set_temp_deci_deg_c(100);
        let clock = Arc::new(FakeClock::new());
        clock.set_unix_timestamp_s(1_700_000_000);
        let rpc = Arc::new(RecordingRpc::default());
        let gw_clock: Arc<dyn GatewayClock> = clock;
        let reporter = AmbientReporter::new(sensor.clone(), rpc.clone(), gw_clock);
        reporter.sample();

        sensor.set_temp_fails(true);
        sensor.set_temp_deci_deg_c(999);
        reporter.sample();

        assert_eq!(reporter.last_temp_deci_deg_c(), 100, "a failed read must not clobber the last good value");
        assert_eq!(rpc.published.lock().unwrap().iter().filter(|(t, _)| *t == Topic::AmbientTempOnChange).count(), 1);
    }

    #[test]
    fn clock_unset_suppresses_on_change() {
        let sensor = Arc::new(MockAmbientSensor::new());
        let clock = Arc::new(FakeClock::new());
        let rpc = Arc::new(RecordingRpc::default());
        let gw_clock: Arc<dyn GatewayClock> = clock;
        let reporter = AmbientReporter::new(sensor, rpc.clone(), gw_clock);
        reporter.sample();
        assert!(rpc.published.lock().unwrap().is_empty());
    }

    #[test]
    fn logging_rpc_client_does_not_panic_on_ambient_topics() {
        let sensor = Arc::new(MockAmbientSensor::new());
        let clock = Arc::new(FakeClock::new());
        clock.set_unix_timestamp_s(1_700_000_000);
        let rpc: Arc<dyn RpcClient> = Arc::new(LoggingRpcClient);
        let gw_clock: Arc<dyn GatewayClock> = clock;
        let reporter = AmbientReporter::new(sensor, rpc, gw_clock);
        reporter.sample();
    }
}
