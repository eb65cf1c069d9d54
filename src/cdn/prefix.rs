//! CIDR prefixes.

use std::{fmt, net::IpAddr, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrefixError {
    #[error("missing '/' in CIDR {0:?}")]
    MissingLength(String),
    #[error("invalid network address in CIDR {0:?}")]
    InvalidAddress(String),
    #[error("invalid prefix length in CIDR {0:?}")]
    InvalidLength(String),
}

/// An address block such as `104.16.0.0/13`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpPrefix {
    network: IpAddr,
    len: u8,
}

impl IpPrefix {
    /// Creates a prefix, rejecting lengths past the address width.
    pub fn new(network: IpAddr, len: u8) -> Option<Self> {
        let max = match network {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        (len <= max).then_some(Self { network, len })
    }

    pub fn network(&self) -> IpAddr {
        self.network
    }

    pub fn len(&self) -> u8 {
        self.len
    }

    /// Check if `addr` falls inside this block. Families never mix.
    pub fn contains(&self, addr: IpAddr) -> bool {
        match (self.network, addr) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = if self.len == 0 {
                    0u32
                } else {
                    !0u32 << (32 - self.len)
                };
                (u32::from(net) & mask) == (u32::from(ip) & mask)
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = if self.len == 0 {
                    0u128
                } else {
                    !0u128 << (128 - self.len)
                };
                (u128::from(net) & mask) == (u128::from(ip) & mask)
            }
            _ => false,
        }
    }
}

impl FromStr for IpPrefix {
    type Err = PrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, len) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| PrefixError::MissingLength(s.to_string()))?;
        let network = addr
            .parse::<IpAddr>()
            .map_err(|_| PrefixError::InvalidAddress(s.to_string()))?;
        let len = len
            .parse::<u8>()
            .map_err(|_| PrefixError::InvalidLength(s.to_string()))?;
        IpPrefix::new(network, len).ok_or_else(|| PrefixError::InvalidLength(s.to_string()))
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.len)
    }
}
