//! Tunable compile-time constants shared across the gateway.

/// Maximum number of beacons tracked simultaneously by the registry.
pub const MAX_BEACONS: usize = 16;
/// Capacity of the bounded update hand-off queue.
pub const MAX_QUEUE: usize = 4;
/// Maximum number of listeners the registry will accept.
pub const MAX_LISTENERS: usize = 4;
/// Milliseconds of silence after which a beacon is pruned as lost.
pub const LOST_TIMEOUT_MS: u64 = 60_000;
/// How often the registry checks whether a stalled scan needs restarting.
pub const SCAN_CHECK_PERIOD_MS: u64 = 10_000;
/// How often the upstream reporter publishes a periodic beacon snapshot.
pub const UPDATE_PERIOD_MS: u64 = 60_000;
/// Upper bound on a single notification's serialized JSON payload.
pub const UPDATE_MAX_PAYLOAD_BYTES: usize = 256;
/// The manufacturer-data company ID this product family uses.
pub const COMPANY_ID: u16 = 0xFFFF;
