//! The immutable value produced by the advertisement parser.

use crate::{identity::BeaconIdentity, status::{AccelStatus, DeviceStatus}};

/// Beacon hardware/firmware variant, decoded from byte 0 of the payload.
///
/// Unrecognized values decode to [`DeviceType::Unknown`] rather than a parse
/// failure — only the 15-byte minimum length is fatal.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
#[non_exhaustive]
pub enum DeviceType {
    /// Unrecognized device type byte.
    #[default]
    Unknown,
    /// The first-generation beacon hardware.
    BeaconV1,
}

impl DeviceType {
    pub(crate) const fn from_byte(byte: u8) -> Self {
        match byte {
            1 => Self::BeaconV1,
            _ => Self::Unknown,
        }
    }
}

/// A single beacon advertisement, fully decoded.
///
/// Produced only by [`crate::parser::parse`]; immutable once constructed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeaconUpdate {
    /// Received signal strength, supplied by the radio (not part of the payload).
    pub rssi_dbm: i8,
    /// Beacon hardware/firmware variant (payload byte 0).
    pub dev_type: DeviceType,
    /// Beacon identity (payload bytes 1..6).
    pub identity: BeaconIdentity,
    /// Device status bitfield (payload byte 7).
    pub device_status: DeviceStatus,
    /// Battery level as a percentage, 0..100 (payload byte 8).
    pub battery_pcnt100: u8,
    /// Temperature in deci-degrees Celsius, little-endian (payload bytes 9..10).
    pub temp_deci_deg_c: u16,
    /// Ambient light level, 0..255 (payload byte 11).
    pub light_255: u8,
    /// Latched accelerometer event bitfield (payload byte 12).
    pub accel_status: AccelStatus,
    /// Battery level in millivolts, little-endian (payload bytes 13..14).
    pub battery_mv: u16,
}
