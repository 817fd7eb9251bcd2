//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::pallas;
use anyhow::anyhow;
use std::fmt;

/// The network discriminant carried in address headers and, optionally, in transaction bodies.
/// Every test network (preprod, preview, ...) shares the tag `0`; mainnet is `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NetworkId {
    Testnet,
    Mainnet,
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Testnet => "testnet",
            Self::Mainnet => "mainnet",
        })
    }
}

// ----------------------------------------------------------- Converting (from)

impl TryFrom<u8> for NetworkId {
    type Error = anyhow::Error;

    fn try_from(tag: u8) -> anyhow::Result<Self> {
        match tag {
            0 => Ok(Self::Testnet),
            1 => Ok(Self::Mainnet),
            _ => Err(anyhow!(
                "invalid network identifier {tag}; expected either 0 or 1"
            )),
        }
    }
}

impl From<pallas::Network> for NetworkId {
    fn from(network: pallas::Network) -> Self {
        match network {
            pallas::Network::Mainnet => Self::Mainnet,
            pallas::Network::Testnet | pallas::Network::Other(..) => Self::Testnet,
        }
    }
}

// ------------------------------------------------------------- Converting (to)

impl From<NetworkId> for u8 {
    fn from(network_id: NetworkId) -> Self {
        match network_id {
            NetworkId::Testnet => 0,
            NetworkId::Mainnet => 1,
        }
    }
}

impl From<NetworkId> for pallas::Network {
    fn from(network_id: NetworkId) -> Self {
        match network_id {
            NetworkId::Testnet => pallas::Network::Testnet,
            NetworkId::Mainnet => pallas::Network::Mainnet,
        }
    }
}

impl From<NetworkId> for pallas::NetworkId {
    fn from(network_id: NetworkId) -> Self {
        match network_id {
            NetworkId::Testnet => pallas::NetworkId::Testnet,
            NetworkId::Mainnet => pallas::NetworkId::Mainnet,
        }
    }
}
