//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::pallas;
use anyhow::{Context, anyhow};
use std::{fmt, str::FromStr};

/// Which script purpose a redeemer is for, and at which position in the corresponding
/// (sorted) transaction field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RedeemerPointer {
    purpose: Purpose,
    index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Purpose {
    Spend,
    Mint,
    Cert,
    Reward,
    Vote,
    Propose,
}

impl fmt::Display for RedeemerPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let purpose = match self.purpose {
            Purpose::Spend => "spend",
            Purpose::Mint => "mint",
            Purpose::Cert => "certificate",
            Purpose::Reward => "withdrawal",
            Purpose::Vote => "vote",
            Purpose::Propose => "propose",
        };
        write!(f, "{purpose}:{}", self.index)
    }
}

// -------------------------------------------------------------------- Building

impl RedeemerPointer {
    pub fn spend(index: u32) -> Self {
        Self {
            purpose: Purpose::Spend,
            index,
        }
    }

    pub fn mint(index: u32) -> Self {
        Self {
            purpose: Purpose::Mint,
            index,
        }
    }
}

// ----------------------------------------------------------- Converting (from)

/// Parse the `<purpose>:<index>` notation used by evaluation services, e.g. `spend:0`.
impl FromStr for RedeemerPointer {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let (purpose, index) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("malformed redeemer pointer '{s}'; expected <purpose>:<index>"))?;

        let purpose = match purpose {
            "spend" => Purpose::Spend,
            "mint" => Purpose::Mint,
            "certificate" | "publish" => Purpose::Cert,
            "withdrawal" | "withdraw" => Purpose::Reward,
            "vote" => Purpose::Vote,
            "propose" => Purpose::Propose,
            _ => return Err(anyhow!("unknown redeemer purpose '{purpose}'")),
        };

        let index = index
            .parse()
            .with_context(|| format!("malformed redeemer index in '{s}'"))?;

        Ok(Self { purpose, index })
    }
}

impl From<&pallas::RedeemersKey> for RedeemerPointer {
    fn from(key: &pallas::RedeemersKey) -> Self {
        let purpose = match key.tag {
            pallas::RedeemerTag::Spend => Purpose::Spend,
            pallas::RedeemerTag::Mint => Purpose::Mint,
            pallas::RedeemerTag::Cert => Purpose::Cert,
            pallas::RedeemerTag::Reward => Purpose::Reward,
            pallas::RedeemerTag::Vote => Purpose::Vote,
            pallas::RedeemerTag::Propose => Purpose::Propose,
        };

        Self {
            purpose,
            index: key.index,
        }
    }
}

// ------------------------------------------------------------- Converting (to)

impl From<RedeemerPointer> for pallas::RedeemersKey {
    fn from(ptr: RedeemerPointer) -> Self {
        let tag = match ptr.purpose {
            Purpose::Spend => pallas::RedeemerTag::Spend,
            Purpose::Mint => pallas::RedeemerTag::Mint,
            Purpose::Cert => pallas::RedeemerTag::Cert,
            Purpose::Reward => pallas::RedeemerTag::Reward,
            Purpose::Vote => pallas::RedeemerTag::Vote,
            Purpose::Propose => pallas::RedeemerTag::Propose,
        };

        pallas::RedeemersKey {
            tag,
            index: ptr.index,
        }
    }
}
