//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Hash, cbor, cbor::ToCbor, pallas};
use anyhow::anyhow;
use std::fmt;

/// Structured data as seen by Plutus validators: datums and redeemers.
#[derive(Debug, Clone, PartialEq)]
#[repr(transparent)]
pub struct PlutusData(pallas::PlutusData);

impl fmt::Display for PlutusData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CBOR({})", hex::encode(self.to_cbor()))
    }
}

// -------------------------------------------------------------------- Building

impl PlutusData {
    /// A bytestring, chunked by the encoder when longer than 64 bytes.
    ///
    /// ```rust
    /// # use cardano_tx_builder::PlutusData;
    /// assert_eq!(PlutusData::bytes(b"17925").to_string(), "CBOR(453137393235)");
    /// ```
    pub fn bytes(bytes: impl AsRef<[u8]>) -> Self {
        Self(pallas::PlutusData::BoundedBytes(pallas::BoundedBytes::from(
            bytes.as_ref().to_vec(),
        )))
    }

    /// A tagged variant. `ix` is the constructor index as declared in the validator (starting
    /// at 0), not its CBOR tag.
    ///
    /// ```rust
    /// # use cardano_tx_builder::PlutusData;
    /// assert_eq!(PlutusData::constr(0, []).to_string(), "CBOR(d87980)");
    /// assert_eq!(
    ///     PlutusData::constr(0, [PlutusData::bytes(b"17925")]).to_string(),
    ///     "CBOR(d8799f453137393235ff)",
    /// );
    /// ```
    pub fn constr(ix: u64, fields: impl IntoIterator<Item = Self>) -> Self {
        let fields = fields.into_iter().map(|data| data.0).collect::<Vec<_>>();

        let fields = if fields.is_empty() {
            pallas::MaybeIndefArray::Def(fields)
        } else {
            pallas::MaybeIndefArray::Indef(fields)
        };

        let (tag, any_constructor) = match ix {
            0..7 => (121 + ix, None),
            7..128 => (1280 + ix - 7, None),
            _ => (102, Some(ix)),
        };

        Self(pallas::PlutusData::Constr(pallas::Constr {
            tag,
            any_constructor,
            fields,
        }))
    }
}

// ------------------------------------------------------------------ Inspecting

impl PlutusData {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.0 {
            pallas::PlutusData::BoundedBytes(bytes) => Some(bytes.as_slice()),
            _ => None,
        }
    }

    /// Constructor index and fields, when the data is a constructor.
    pub fn as_constr(&self) -> Option<(u64, Vec<PlutusData>)> {
        match &self.0 {
            pallas::PlutusData::Constr(constr) => {
                let ix = match (constr.tag, constr.any_constructor) {
                    (121..=127, _) => constr.tag - 121,
                    (1280..=1400, _) => constr.tag - 1280 + 7,
                    (102, Some(ix)) => ix,
                    _ => return None,
                };

                let fields = match &constr.fields {
                    pallas::MaybeIndefArray::Def(fields) => fields,
                    pallas::MaybeIndefArray::Indef(fields) => fields,
                };

                Some((ix, fields.iter().cloned().map(PlutusData).collect()))
            }
            _ => None,
        }
    }

    /// The datum hash, as referenced from outputs that don't inline their datum.
    pub fn hash(&self) -> Hash<32> {
        Hash::blake2b_256(&self.to_cbor())
    }

    pub fn from_cbor(bytes: &[u8]) -> anyhow::Result<Self> {
        cbor::decode(bytes)
            .map(PlutusData)
            .map_err(|e| anyhow!("malformed plutus data: {e}"))
    }
}

// ----------------------------------------------------------- Converting (from)

impl From<pallas::PlutusData> for PlutusData {
    fn from(data: pallas::PlutusData) -> Self {
        Self(data)
    }
}

// ------------------------------------------------------------- Converting (to)

impl From<PlutusData> for pallas::PlutusData {
    fn from(data: PlutusData) -> Self {
        data.0
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for PlutusData {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.encode_with(&self.0, ctx)?;
        Ok(())
    }
}
