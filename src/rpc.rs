//! The RPC/MQTT collaborator contract and the gateway identity collaborator,
//! plus a logging stand-in used by tests and the demo binary.

use crate::error::Result;

/// The notification topic suffixes this gateway publishes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, strum::Display)]
pub enum Topic {
    /// `onBeaconFound`
    #[strum(serialize = "onBeaconFound")]
    OnBeaconFound,
    /// `onBeaconLost`
    #[strum(serialize = "onBeaconLost")]
    OnBeaconLost,
    /// `onBeaconUpdate`
    #[strum(serialize = "onBeaconUpdate")]
    OnBeaconUpdate,
    /// `checkIn`
    #[strum(serialize = "checkIn")]
    CheckIn,
    /// `ambient/temp_c/onChange`
    #[strum(serialize = "ambient/temp_c/onChange")]
    AmbientTempOnChange,
    /// `ambient/light_255/onChange`
    #[strum(serialize = "ambient/light_255/onChange")]
    AmbientLightOnChange,
}

/// `publishNotification(node, name, qos, payloadBytes, payloadLen)` reduced
/// to its essentials: this crate always publishes at QoS at-most-once under
/// a single gateway's RPC node, so only the topic and payload vary.
pub trait RpcClient: Send + Sync {
    /// Publishes `payload` (already-serialized, compact JSON) under `topic`,
    /// at-most-once.
    fn publish(&self, topic: Topic, payload: &[u8]) -> Result<()>;
}

/// Gateway hardware SKU, determined in production by two strap GPIOs.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
#[repr(u8)]
pub enum Variant {
    /// Hardware variant could not be determined.
    #[default]
    Unknown = 0,
    /// Internal (engineering) build.
    Internal = 1,
    /// Internal build, high-power radio front end.
    InternalHighPower = 2,
    /// External (production/customer) build.
    External = 3,
}

/// The identity collaborator: `uniqueIdHexString()`, plus the hardware
/// variant the `checkIn` notification reports.
pub trait GatewayIdentity: Send + Sync {
    /// A stable, per-device hex string uniquely identifying this gateway.
    fn unique_id_hex(&self) -> String;

    /// This gateway's hardware variant.
    fn hardware_variant(&self) -> Variant;
}

/// Logs every publication via `log::info!` instead of sending it anywhere.
/// Used by tests and the `gatewayd` demo binary in place of a real MQTT
/// client.
#[derive(Default)]
pub struct LoggingRpcClient;

impl RpcClient for LoggingRpcClient {
    fn publish(&self, topic: Topic, payload: &[u8]) -> Result<()> {
        let body = std::str::from_utf8(payload).unwrap_or("<invalid utf8>");
        log::info!("publish {topic} (qos=at-most-once): {body}");
        Ok(())
    }
}

/// Gateway identity fixed at construction; useful for tests and demos.
pub struct StaticGatewayIdentity {
    unique_id_hex: String,
    variant: Variant,
}

impl StaticGatewayIdentity {
    /// Creates a new static identity.
    pub fn new(unique_id_hex: impl Into<String>, variant: Variant) -> Self {
        Self { unique_id_hex: unique_id_hex.into(), variant }
    }
}

impl GatewayIdentity for StaticGatewayIdentity {
    fn unique_id_hex(&self) -> String {
        self.unique_id_hex.clone()
    }

    fn hardware_variant(&self) -> Variant {
        self.variant
    }
}
