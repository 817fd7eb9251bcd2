use anyhow::anyhow;
use cardano_tx_builder::NetworkId;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt, str::FromStr};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, SerializeDisplay, DeserializeFromStr,
)]
pub enum Network {
    Mainnet,
    #[default]
    Preprod,
    Preview,
}

pub const MAINNET_MAGIC: u64 = 764824073;
pub const PREPROD_MAGIC: u64 = 1;
pub const PREVIEW_MAGIC: u64 = 2;

impl From<Network> for u64 {
    fn from(network: Network) -> Self {
        match network {
            Network::Mainnet => MAINNET_MAGIC,
            Network::Preprod => PREPROD_MAGIC,
            Network::Preview => PREVIEW_MAGIC,
        }
    }
}

impl From<Network> for NetworkId {
    fn from(network: Network) -> NetworkId {
        match network {
            Network::Mainnet => NetworkId::Mainnet,
            Network::Preprod | Network::Preview => NetworkId::Testnet,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            Self::Mainnet => "mainnet",
            Self::Preprod => "preprod",
            Self::Preview => "preview",
        })
    }
}

impl TryFrom<&str> for Network {
    type Error = anyhow::Error;

    fn try_from(text: &str) -> anyhow::Result<Self> {
        match text.trim().to_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "preprod" => Ok(Network::Preprod),
            "preview" => Ok(Network::Preview),
            _ => Err(anyhow!(
                "unsupported network: {text}; should be one of {}, {}, {}",
                Self::Mainnet,
                Self::Preprod,
                Self::Preview
            )),
        }
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Self::try_from(s)
    }
}

// ------------------------------------------------------------------ Inspecting

impl Network {
    pub fn is_mainnet(self) -> bool {
        self == Network::Mainnet
    }

    pub fn is_testnet(self) -> bool {
        self != Network::Mainnet
    }

    pub fn magic(self) -> u64 {
        u64::from(self)
    }

    pub fn network_id(self) -> NetworkId {
        NetworkId::from(self)
    }
}
