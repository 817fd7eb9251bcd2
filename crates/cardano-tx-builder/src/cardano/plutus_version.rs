//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use anyhow::anyhow;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlutusVersion {
    V1,
    V2,
    #[default]
    V3,
}

impl fmt::Display for PlutusVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.script_tag())
    }
}

// ------------------------------------------------------------------ Inspecting

impl PlutusVersion {
    /// The byte prepended to a script's serialisation before hashing it.
    pub fn script_tag(self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
        }
    }

    /// The key identifying this language in the cost models and in the script integrity hash.
    pub fn language_id(self) -> u8 {
        self.script_tag() - 1
    }
}

// ----------------------------------------------------------- Converting (from)

/// Accepts the notations found in blueprints (`v3`) and in provider payloads (`PlutusV3`).
impl FromStr for PlutusVersion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().trim_start_matches("plutus") {
            "v1" => Ok(Self::V1),
            "v2" => Ok(Self::V2),
            "v3" => Ok(Self::V3),
            _ => Err(anyhow!(
                "unknown plutus version '{s}'; expected one of v1, v2 or v3"
            )),
        }
    }
}
