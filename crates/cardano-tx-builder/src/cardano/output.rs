//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Address, Hash, PlutusData, ProtocolParameters, Value, cbor::ToCbor, pallas};
use anyhow::anyhow;

/// How an output refers to its datum.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    /// Only the hash is stored on-chain; spenders must supply the datum in the witness set.
    Hash(Hash<32>),
    Inline(PlutusData),
}

impl Datum {
    pub fn hash(&self) -> Hash<32> {
        match self {
            Self::Hash(hash) => *hash,
            Self::Inline(data) => data.hash(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    address: Address,
    value: Value,
    datum: Option<Datum>,
    reference_script: Option<Hash<28>>,
}

// -------------------------------------------------------------------- Building

impl Output {
    pub fn new(address: Address, value: Value) -> Self {
        Self {
            address,
            value,
            datum: None,
            reference_script: None,
        }
    }

    pub fn with_datum(mut self, datum: Datum) -> Self {
        self.datum = Some(datum);
        self
    }

    /// Record that the output, as found on-chain, carries a reference script. Such outputs are
    /// only ever resolved, never produced, by this library.
    pub fn with_reference_script(mut self, script_hash: Hash<28>) -> Self {
        self.reference_script = Some(script_hash);
        self
    }
}

// ------------------------------------------------------------------ Inspecting

impl Output {
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn datum(&self) -> Option<&Datum> {
        self.datum.as_ref()
    }

    pub fn reference_script(&self) -> Option<Hash<28>> {
        self.reference_script
    }

    /// The minimum lovelace this output must hold to be accepted by the ledger.
    pub fn min_acceptable_value(&self, params: &ProtocolParameters) -> u64 {
        let size = pallas::TransactionOutput::from(self).to_cbor().len() as u64;
        params.min_utxo_value(size)
    }
}

// ----------------------------------------------------------- Converting (from)

impl TryFrom<&pallas::TransactionOutput> for Output {
    type Error = anyhow::Error;

    fn try_from(output: &pallas::TransactionOutput) -> anyhow::Result<Self> {
        match output {
            pallas::TransactionOutput::PostAlonzo(output) => {
                let address = Address::try_from(output.address.as_slice())?;
                let datum = output.datum_option.as_ref().map(|datum| match datum {
                    pallas::DatumOption::Hash(hash) => Datum::Hash(Hash::from(*hash)),
                    pallas::DatumOption::Data(data) => Datum::Inline(PlutusData::from(data.0.clone())),
                });

                Ok(Self {
                    address,
                    value: Value::from(&output.value),
                    datum,
                    reference_script: None,
                })
            }
            pallas::TransactionOutput::Legacy(..) => Err(anyhow!(
                "legacy (pre-Alonzo) outputs are not supported in transactions built here"
            )),
        }
    }
}

// ------------------------------------------------------------- Converting (to)

impl From<&Output> for pallas::TransactionOutput {
    fn from(output: &Output) -> Self {
        pallas::TransactionOutput::PostAlonzo(pallas::PostAlonzoTransactionOutput {
            address: pallas::Bytes::from(output.address.to_bytes()),
            value: pallas::Value::from(&output.value),
            datum_option: output.datum.as_ref().map(|datum| match datum {
                Datum::Hash(hash) => pallas::DatumOption::Hash(pallas::Hash::from(*hash)),
                Datum::Inline(data) => {
                    pallas::DatumOption::Data(pallas::CborWrap(pallas::PlutusData::from(data.clone())))
                }
            }),
            script_ref: None,
        })
    }
}
