// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network value objects
//!
//! Adapter MACs, port group VLANs and switch MTUs. Generated values stay
//! inside the ranges a real inventory reports, so the same parsers accept
//! both synthesized and provider-supplied values.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid MAC address: {0}")]
    InvalidMacAddress(String),

    #[error("VLAN {0} outside 1-4094")]
    InvalidVlanId(u16),

    #[error("MTU {0} outside 1280-9000")]
    InvalidMtu(u32),
}

/// 48-bit adapter address, rendered lowercase and colon-separated
///
/// ```rust
/// use inventory_synth::domain::MacAddress;
///
/// let mac: MacAddress = "00-50-56-0A-0B-0C".parse().unwrap();
/// assert_eq!(mac.to_string(), "00:50:56:0a:0b:0c");
/// assert!(mac.is_vmware_assigned());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// OUI of statically assigned VM adapters
    pub const VMWARE_OUI: [u8; 3] = [0x00, 0x50, 0x56];

    /// VM adapter address from the manually assigned block
    /// `00:50:56:00:00:00`-`00:50:56:3f:ff:ff`
    pub fn random_vm<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let [a, b, c] = Self::VMWARE_OUI;
        Self([a, b, c, rng.gen_range(0x00..0x40), rng.gen(), rng.gen()])
    }

    /// Locally administered unicast address for physical host NICs
    pub fn random_physical<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut octets: [u8; 6] = rng.gen();
        octets[0] = (octets[0] | 0x02) & 0xfe;
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn as_str(&self) -> String {
        self.to_string()
    }

    pub fn is_vmware_assigned(&self) -> bool {
        self.0[..3] == Self::VMWARE_OUI
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}", a, b, c, d, e, g)
    }
}

/// Accepts colon, hyphen or no separators, any case
impl FromStr for MacAddress {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NetworkError::InvalidMacAddress(s.to_string());
        let hex: Vec<char> = s.chars().filter(|c| *c != ':' && *c != '-').collect();
        if hex.len() != 12 || !hex.iter().all(char::is_ascii_hexdigit) {
            return Err(invalid());
        }

        let mut octets = [0u8; 6];
        for (octet, pair) in octets.iter_mut().zip(hex.chunks(2)) {
            let pair: String = pair.iter().collect();
            *octet = u8::from_str_radix(&pair, 16).map_err(|_| invalid())?;
        }
        Ok(Self(octets))
    }
}

/// IEEE 802.1Q VLAN ID; 0 and 4095 are reserved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VlanId(u16);

impl VlanId {
    pub const MIN: u16 = 1;
    pub const MAX: u16 = 4094;

    pub fn new(id: u16) -> Result<Self, NetworkError> {
        if (Self::MIN..=Self::MAX).contains(&id) {
            Ok(Self(id))
        } else {
            Err(NetworkError::InvalidVlanId(id))
        }
    }

    /// VLAN of a port group, stable across runs
    ///
    /// A trailing in-range number wins (`dvPG-Prod-100` -> 100); any other
    /// name is hashed (FNV-1a) onto the valid range.
    pub fn from_port_group_name(name: &str) -> Self {
        let prefix_len = name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        if let Some(vlan) = name[prefix_len..]
            .parse::<u16>()
            .ok()
            .and_then(|n| Self::new(n).ok())
        {
            return vlan;
        }

        let hash = name.bytes().fold(0x811c_9dc5u32, |h, b| {
            (h ^ u32::from(b)).wrapping_mul(0x0100_0193)
        });
        Self((hash % u32::from(Self::MAX)) as u16 + Self::MIN)
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

/// Virtual switch MTU, 1280-9000 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mtu(u32);

impl Mtu {
    pub const MIN: u32 = 1280;
    pub const MAX: u32 = 9000;

    pub fn new(size: u32) -> Result<Self, NetworkError> {
        if (Self::MIN..=Self::MAX).contains(&size) {
            Ok(Self(size))
        } else {
            Err(NetworkError::InvalidMtu(size))
        }
    }

    /// Distributed switches run jumbo frames
    pub fn jumbo() -> Self {
        Self(Self::MAX)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Default for Mtu {
    fn default() -> Self {
        Self(1500)
    }
}
