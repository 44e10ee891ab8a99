//! # beacon-gateway — a passive BLE beacon observation engine
//!
//! This crate bridges a population of Bluetooth Low Energy (BLE) sensor
//! beacons to a cloud message broker. Each beacon periodically emits a
//! non-connectable advertisement carrying its identity, a status bitfield,
//! and sensor readings (temperature, light, battery, accelerometer events).
//! The gateway passively scans the radio, parses beacon-specific
//! advertisements, maintains a live registry of currently-visible beacons
//! with their latest readings, latches transient events (tap, free-fall,
//! activity) across reporting intervals, and forwards lifecycle events and
//! periodic snapshots upstream as JSON notifications.
//!
//! The following pieces are provided:
//!
//! * advertisement parsing
//!     * bit-exact decode of the beacon payload format
//!     * pure function, no mutable state
//! * the beacon registry
//!     * found/updated/lost lifecycle
//!     * latched accelerometer events surviving between reporter reads
//!     * fixed capacity with logged, non-evicting admission failure
//! * the upstream reporter
//!     * lifecycle notifications (`onBeaconFound`/`onBeaconLost`)
//!     * periodic per-beacon snapshots (`onBeaconUpdate`)
//!     * gateway check-in (`checkIn`)
//! * the ambient reporter for the gateway's own on-board sensors
//! * a cooperative scheduler modeling the three logical threads (`Network`,
//!   `UI`, `Bluetooth`) gateway firmware traditionally runs work on
//!
//! Physical radio control, Wi-Fi provisioning, NTP, TLS/MQTT transport, RPC
//! topic-tree plumbing, GPIO/LED/sensor hardware, OTA update, the console
//! command shell, and persistent storage are out of scope; this crate only
//! defines the trait-object seams ([`radio::RadioAdapter`], [`clock::GatewayClock`],
//! [`rpc::RpcClient`], [`rpc::GatewayIdentity`], [`ambient::AmbientSensor`])
//! those collaborators must implement.
//!
//! ## Basic usage
//! Build a [`radio::RadioAdapter`] and an [`rpc::RpcClient`] (or use the
//! in-memory [`radio::MockRadio`] and [`rpc::LoggingRpcClient`] for local
//! exercise, as the `gatewayd` binary does), construct a
//! [`registry::BeaconRegistry`], then wrap it in a [`gateway::Gateway`] and
//! drive it from a [`scheduler::Scheduler`].

pub mod ambient;
pub mod clock;
pub mod config;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod parser;
pub mod proxy;
pub mod queue;
pub mod radio;
pub mod registry;
pub mod reporter;
pub mod rpc;
pub mod scheduler;
pub mod status;
pub mod update;

pub use crate::{
    error::{Error, ErrorKind, Result},
    gateway::Gateway,
    identity::BeaconIdentity,
    status::{AccelStatus, DeviceStatus},
    update::{BeaconUpdate, DeviceType},
};
