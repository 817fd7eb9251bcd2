//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Credential, NetworkId, pallas};
use anyhow::anyhow;
use std::{fmt, str::FromStr};

/// A Cardano address of any kind. Shelley addresses (base and enterprise) are the ones this
/// library constructs; Byron addresses may still show up in resolved outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address(pallas::Address);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            pallas::Address::Byron(byron) => f.write_str(&byron.to_base58()),
            shelley_or_stake => f.write_str(&shelley_or_stake.to_bech32().map_err(|_| fmt::Error)?),
        }
    }
}

// -------------------------------------------------------------------- Building

impl Address {
    /// An address without delegation part; this is how contract addresses are usually shaped.
    pub fn enterprise(network_id: NetworkId, payment: Credential) -> Self {
        Self(pallas::Address::Shelley(pallas::ShelleyAddress::new(
            pallas::Network::from(network_id),
            pallas::ShelleyPaymentPart::from(payment),
            pallas::ShelleyDelegationPart::Null,
        )))
    }

    /// An address carrying both a payment and a stake credential; what wallets hand out.
    pub fn base(network_id: NetworkId, payment: Credential, delegation: Credential) -> Self {
        Self(pallas::Address::Shelley(pallas::ShelleyAddress::new(
            pallas::Network::from(network_id),
            pallas::ShelleyPaymentPart::from(payment),
            pallas::ShelleyDelegationPart::from(delegation),
        )))
    }
}

// ------------------------------------------------------------------ Inspecting

impl Address {
    pub fn network_id(&self) -> Option<NetworkId> {
        self.0.network().map(NetworkId::from)
    }

    /// The payment credential, for Shelley addresses only.
    pub fn payment_credential(&self) -> Option<Credential> {
        match &self.0 {
            pallas::Address::Shelley(shelley) => Some(Credential::from(shelley.payment())),
            _ => None,
        }
    }

    pub fn is_script(&self) -> bool {
        matches!(self.payment_credential(), Some(Credential::Script(..)))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

// ----------------------------------------------------------- Converting (from)

impl FromStr for Address {
    type Err = anyhow::Error;

    fn from_str(text: &str) -> anyhow::Result<Self> {
        pallas::Address::from_str(text.trim())
            .map(Self)
            .map_err(|e| anyhow!("malformed address '{text}': {e}"))
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = anyhow::Error;

    fn try_from(bytes: &[u8]) -> anyhow::Result<Self> {
        pallas::Address::from_bytes(bytes)
            .map(Self)
            .map_err(|e| anyhow!("malformed address bytes: {e}"))
    }
}
