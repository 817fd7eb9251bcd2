//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Hash, PlutusVersion};
use std::fmt;

/// A compiled validator: its language version and serialised form (CBOR-wrapped flat).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlutusScript {
    version: PlutusVersion,
    bytes: Vec<u8>,
}

impl fmt::Display for PlutusScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlutusScript({}, {})", self.version, self.hash())
    }
}

// -------------------------------------------------------------------- Building

impl PlutusScript {
    pub fn new(version: PlutusVersion, bytes: Vec<u8>) -> Self {
        Self { version, bytes }
    }
}

// ------------------------------------------------------------------ Inspecting

impl PlutusScript {
    pub fn version(&self) -> PlutusVersion {
        self.version
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// The script hash, i.e. the payment credential of the script's addresses.
    pub fn hash(&self) -> Hash<28> {
        let mut preimage = Vec::with_capacity(1 + self.bytes.len());
        preimage.push(self.version.script_tag());
        preimage.extend_from_slice(&self.bytes);
        Hash::blake2b_224(&preimage)
    }
}
