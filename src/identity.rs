//! Beacon identity (EUI-48).

use std::{
    fmt::{self, Debug, Display, Formatter},
    str::FromStr,
};

use crate::{Error, ErrorKind, Result};

/// A 48-bit beacon identifier (EUI-48), unique per beacon.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BeaconIdentity(pub [u8; 6]);

impl BeaconIdentity {
    /// Creates an identity from its six raw bytes.
    pub const fn from_bytes(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// The raw bytes of this identity.
    pub const fn as_bytes(&self) -> [u8; 6] {
        self.0
    }
}

impl Display for BeaconIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl Debug for BeaconIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for BeaconIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let fields = s
            .split(':')
            .map(|part| u8::from_str_radix(part, 16).map_err(|_| Error::new(ErrorKind::InvalidIdentity(s.to_string()))))
            .collect::<Result<Vec<_>>>()?;
        let bytes: [u8; 6] =
            fields.try_into().map_err(|_| Error::new(ErrorKind::InvalidIdentity(s.to_string())))?;
        Ok(Self(bytes))
    }
}

impl From<[u8; 6]> for BeaconIdentity {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

impl From<BeaconIdentity> for [u8; 6] {
    fn from(identity: BeaconIdentity) -> Self {
        identity.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_canonical_hex() {
        let id = BeaconIdentity::from_bytes([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
        assert_eq!(id.to_string(), "11:22:33:44:55:66");
    }

    #[test]
    fn from_str_round_trips() {
        let id: BeaconIdentity = "11:22:33:44:55:66".parse().unwrap();
        assert_eq!(id.as_bytes(), [0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
        assert_eq!(id.to_string(), "11:22:33:44:55:66");
    }

    #[test]
    fn from_str_rejects_garbage() {
        assert!("not-an-address".parse::<BeaconIdentity>().is_err());
    }

    #[test]
    fn identity_is_totally_ordered_and_hashable() {
        use std::collections::HashSet;
        let a = BeaconIdentity::from_bytes([1, 2, 3, 4, 5, 6]);
        let b = BeaconIdentity::from_bytes([1, 2, 3, 4, 5, 7]);
        assert!(a < b);
        let mut set = HashSet::new();
        set.insert(a);
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 2);
    }
}
