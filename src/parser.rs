//! Decodes a single beacon advertisement payload into a [`BeaconUpdate`].
//!
//! Pure function: no mutable state, no I/O. The only failure mode is a
//! payload shorter than [`MIN_PAYLOAD_LEN`] bytes.

use crate::{
    identity::BeaconIdentity,
    status::{AccelStatus, DeviceStatus},
    update::{BeaconUpdate, DeviceType},
};

/// Minimum manufacturer-data payload length accepted by [`parse`].
pub const MIN_PAYLOAD_LEN: usize = 15;

/// Advertisement payload failed to parse.
#[derive(Clone, Copy, Debug, Eq, PartialEq, displaydoc::Display)]
pub enum ParseError {
    /// advertisement payload too short: got {got} bytes, need at least {need}.
    TooShort { got: usize, need: usize },
}

impl std::error::Error for ParseError {}

/// Parses a raw manufacturer-specific-data payload into a [`BeaconUpdate`].
///
/// `rssi` comes from the radio alongside the payload, not from the payload
/// itself. `payload` must already be the manufacturer-data bytes for company
/// ID `0xFFFF` — filtering advertisements by company ID happens one layer up,
/// in [`crate::registry::BeaconRegistry::submit_advertisement`].
pub fn parse(rssi: i8, payload: &[u8]) -> Result<BeaconUpdate, ParseError> {
    if payload.len() < MIN_PAYLOAD_LEN {
        return Err(ParseError::TooShort { got: payload.len(), need: MIN_PAYLOAD_LEN });
    }

    let dev_type = DeviceType::from_byte(payload[0]);
    let identity = BeaconIdentity::from_bytes([
        payload[1], payload[2], payload[3], payload[4], payload[5], payload[6],
    ]);
    let device_status = DeviceStatus::from_byte(payload[7]);
    let battery_pcnt100 = payload[8];
    let temp_deci_deg_c = u16::from_le_bytes([payload[9], payload[10]]);
    let light_255 = payload[11];
    let accel_status = AccelStatus::from_byte(payload[12]);
    let battery_mv = u16::from_le_bytes([payload[13], payload[14]]);

    Ok(BeaconUpdate {
        rssi_dbm: rssi,
        dev_type,
        identity,
        device_status,
        battery_pcnt100,
        temp_deci_deg_c,
        light_255,
        accel_status,
        battery_mv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO_1_PAYLOAD: [u8; 15] =
        [0x01, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x00, 0x50, 0xC8, 0x00, 0x80, 0x01, 0xD0, 0x07];

    #[test]
    fn parses_canonical_payload() {
        let update = parse(-60, &SCENARIO_1_PAYLOAD).unwrap();
        assert_eq!(update.rssi_dbm, -60);
        assert_eq!(update.dev_type, DeviceType::BeaconV1);
        assert_eq!(update.identity.to_string(), "11:22:33:44:55:66");
        assert_eq!(update.battery_pcnt100, 0x50);
        assert_eq!(update.temp_deci_deg_c, 200);
        assert_eq!(update.light_255, 0x80);
        assert_eq!(update.battery_mv, 2000);
    }

    #[test]
    fn exactly_minimum_length_parses() {
        assert!(parse(0, &[0u8; 15]).is_ok());
    }

    #[test]
    fn one_byte_short_fails() {
        let err = parse(0, &[0u8; 14]).unwrap_err();
        assert_eq!(err, ParseError::TooShort { got: 14, need: 15 });
    }

    #[test]
    fn unrecognized_dev_type_is_unknown_not_an_error() {
        let mut payload = SCENARIO_1_PAYLOAD;
        payload[0] = 0xEE;
        let update = parse(0, &payload).unwrap();
        assert_eq!(update.dev_type, DeviceType::Unknown);
    }

    #[test]
    fn little_endian_multibyte_fields() {
        let mut payload = SCENARIO_1_PAYLOAD;
        payload[9] = 0x34;
        payload[10] = 0x12;
        let update = parse(0, &payload).unwrap();
        assert_eq!(update.temp_deci_deg_c, 0x1234);
    }
}
