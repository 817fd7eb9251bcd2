//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{
    Address, ChangeStrategy, Credential, ExecutionUnits, Hash, Input, NetworkId, Output,
    PlutusData, PlutusScript, PlutusVersion, ProtocolParameters, RedeemerPointer, SigningKey,
    Value, cbor, cbor::ToCbor, pallas,
};
use anyhow::{Context, anyhow};
use itertools::Itertools;
use std::{
    collections::{BTreeMap, BTreeSet},
    convert::Infallible,
    fmt, mem,
};

mod builder;

/// The inputs of a transaction do not bring enough to pay for its outputs, its fee and its
/// change. Adding more inputs may help; nothing else will.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BalanceError {
    #[error("insufficient balance; spending more than available")]
    SpendingMoreThanAvailable,
    #[error("insufficient balance; cannot cover the transaction fee")]
    CannotCoverFee,
    #[error(
        "not enough funds to create a sufficiently large change output: current value={value} lovelace, minimum required={minimum}"
    )]
    ChangeTooSmall { value: u64, minimum: u64 },
}

pub struct Transaction {
    inner: pallas::Tx,
    change_strategy: ChangeStrategy,
}

// ------------------------------------------------------------------ Inspecting

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl Transaction {
    /// The transaction identifier: the blake2b-256 digest of the serialised body.
    pub fn id(&self) -> Hash<32> {
        Hash::blake2b_256(&self.inner.transaction_body.to_cbor())
    }

    pub fn fee(&self) -> u64 {
        self.inner.transaction_body.fee
    }

    pub fn network_id(&self) -> Option<NetworkId> {
        self.inner
            .transaction_body
            .network_id
            .map(|network_id| match network_id {
                pallas::NetworkId::Mainnet => NetworkId::Mainnet,
                pallas::NetworkId::Testnet => NetworkId::Testnet,
            })
    }

    /// The declared transaction inputs, in their canonical (sorted) order.
    pub fn inputs(&self) -> Vec<Input> {
        self.inner
            .transaction_body
            .inputs
            .iter()
            .map(Input::from)
            .collect()
    }

    pub fn collaterals(&self) -> Vec<Input> {
        self.inner
            .transaction_body
            .collateral
            .as_ref()
            .map(|collaterals| collaterals.iter().map(Input::from).collect())
            .unwrap_or_default()
    }

    pub fn total_collateral(&self) -> Option<u64> {
        self.inner.transaction_body.total_collateral
    }

    pub fn collateral_return(&self) -> Option<Output> {
        self.inner
            .transaction_body
            .collateral_return
            .as_ref()
            .and_then(|output| Output::try_from(output).ok())
    }

    pub fn outputs(&self) -> anyhow::Result<Vec<Output>> {
        self.inner
            .transaction_body
            .outputs
            .iter()
            .map(Output::try_from)
            .collect()
    }

    /// Signers explicitly listed in the body, and thus visible to validators.
    pub fn required_signers(&self) -> Vec<Hash<28>> {
        self.inner
            .transaction_body
            .required_signers
            .as_ref()
            .map(|signers| signers.iter().map(|hash| Hash::from(*hash)).collect())
            .unwrap_or_default()
    }

    pub fn script_data_hash(&self) -> Option<Hash<32>> {
        self.inner.transaction_body.script_data_hash.map(Hash::from)
    }

    pub fn redeemers(&self) -> BTreeMap<RedeemerPointer, (PlutusData, ExecutionUnits)> {
        match &self.inner.transaction_witness_set.redeemer {
            Some(pallas::Redeemers::Map(redeemers)) => redeemers
                .iter()
                .map(|(key, value)| {
                    (
                        RedeemerPointer::from(key),
                        (
                            PlutusData::from(value.data.clone()),
                            ExecutionUnits::from(&value.ex_units),
                        ),
                    )
                })
                .collect(),
            // Only ever produced as a map by this library.
            Some(pallas::Redeemers::List(..)) | None => BTreeMap::new(),
        }
    }

    /// Datums supplied in the witness set.
    pub fn datums(&self) -> Vec<PlutusData> {
        self.inner
            .transaction_witness_set
            .plutus_data
            .as_ref()
            .map(|datums| datums.iter().cloned().map(PlutusData::from).collect())
            .unwrap_or_default()
    }

    pub fn plutus_scripts(&self) -> Vec<PlutusScript> {
        let witnesses = &self.inner.transaction_witness_set;

        let v1 = witnesses.plutus_v1_script.iter().flat_map(|scripts| {
            scripts
                .iter()
                .map(|script| PlutusScript::new(PlutusVersion::V1, script.0.to_vec()))
        });

        let v2 = witnesses.plutus_v2_script.iter().flat_map(|scripts| {
            scripts
                .iter()
                .map(|script| PlutusScript::new(PlutusVersion::V2, script.0.to_vec()))
        });

        let v3 = witnesses.plutus_v3_script.iter().flat_map(|scripts| {
            scripts
                .iter()
                .map(|script| PlutusScript::new(PlutusVersion::V3, script.0.to_vec()))
        });

        v1.chain(v2).chain(v3).collect()
    }

    /// Verification keys of the signatures attached so far.
    pub fn signatories(&self) -> Vec<Vec<u8>> {
        self.inner
            .transaction_witness_set
            .vkeywitness
            .as_ref()
            .map(|witnesses| {
                witnesses
                    .iter()
                    .map(|witness| witness.vkey.to_vec())
                    .collect()
            })
            .unwrap_or_default()
    }
}

// -------------------------------------------------------------------- Building

impl Default for Transaction {
    fn default() -> Self {
        Self {
            change_strategy: ChangeStrategy::default(),
            inner: pallas::Tx {
                transaction_body: pallas::TransactionBody {
                    auxiliary_data_hash: None,
                    certificates: None,
                    collateral: None,
                    collateral_return: None,
                    donation: None,
                    fee: 0,
                    inputs: pallas::Set::from(vec![]),
                    mint: None,
                    network_id: None,
                    outputs: vec![],
                    proposal_procedures: None,
                    reference_inputs: None,
                    required_signers: None,
                    script_data_hash: None,
                    total_collateral: None,
                    treasury_value: None,
                    ttl: None,
                    validity_interval_start: None,
                    voting_procedures: None,
                    withdrawals: None,
                },
                transaction_witness_set: pallas::WitnessSet {
                    bootstrap_witness: None,
                    native_script: None,
                    plutus_data: None,
                    plutus_v1_script: None,
                    plutus_v2_script: None,
                    plutus_v3_script: None,
                    redeemer: None,
                    vkeywitness: None,
                },
                success: true,
                auxiliary_data: pallas::Nullable::Null,
            },
        }
    }
}

impl Transaction {
    pub fn ok(&mut self) -> anyhow::Result<&mut Self> {
        Ok(self)
    }

    /// Set the inputs to spend. Script-locked inputs come with their redeemer; the redeemer
    /// pointer follows the input's position once sorted, as the ledger expects.
    pub fn with_inputs(
        &mut self,
        inputs: impl IntoIterator<Item = (Input, Option<PlutusData>)>,
    ) -> &mut Self {
        let mut redeemers = Vec::new();

        self.inner.transaction_body.inputs = pallas::Set::from(
            inputs
                .into_iter()
                .sorted_by_key(|(input, _)| *input)
                .dedup_by(|(a, _), (b, _)| a == b)
                .enumerate()
                .map(|(ix, (input, redeemer))| {
                    if let Some(data) = redeemer {
                        redeemers.push((RedeemerPointer::spend(ix as u32), data));
                    }
                    pallas::TransactionInput::from(input)
                })
                .collect::<Vec<_>>(),
        );

        self.inner.transaction_witness_set.redeemer = pallas::NonEmptyKeyValuePairs::from_vec(
            redeemers
                .into_iter()
                .map(|(ptr, data)| {
                    (
                        pallas::RedeemersKey::from(ptr),
                        pallas::RedeemersValue {
                            data: pallas::PlutusData::from(data),
                            ex_units: pallas::ExUnits::from(ExecutionUnits::default()),
                        },
                    )
                })
                .collect(),
        )
        .map(pallas::Redeemers::from);

        self
    }

    pub fn with_collaterals(&mut self, collaterals: impl IntoIterator<Item = Input>) -> &mut Self {
        self.inner.transaction_body.collateral = pallas::NonEmptySet::from_vec(
            collaterals
                .into_iter()
                .sorted()
                .dedup()
                .map(pallas::TransactionInput::from)
                .collect(),
        );
        self
    }

    pub fn with_outputs(&mut self, outputs: impl IntoIterator<Item = Output>) -> &mut Self {
        self.inner.transaction_body.outputs = outputs
            .into_iter()
            .map(|output| pallas::TransactionOutput::from(&output))
            .collect();
        self
    }

    pub fn with_change_strategy(&mut self, with: ChangeStrategy) -> &mut Self {
        self.change_strategy = with;
        self
    }

    pub fn with_fee(&mut self, fee: u64) -> &mut Self {
        self.inner.transaction_body.fee = fee;
        self
    }

    pub fn with_network_id(&mut self, network_id: NetworkId) -> &mut Self {
        self.inner.transaction_body.network_id = Some(pallas::NetworkId::from(network_id));
        self
    }

    pub fn with_required_signers(&mut self, signers: impl IntoIterator<Item = Hash<28>>) -> &mut Self {
        self.inner.transaction_body.required_signers = pallas::NonEmptySet::from_vec(
            signers
                .into_iter()
                .sorted()
                .dedup()
                .map(pallas::Hash::from)
                .collect(),
        );
        self
    }

    /// Datums to reveal in the witness set, typically those of spent outputs that only carry
    /// a datum hash.
    pub fn with_datums(&mut self, datums: impl IntoIterator<Item = PlutusData>) -> &mut Self {
        self.inner.transaction_witness_set.plutus_data = pallas::NonEmptySet::from_vec(
            datums.into_iter().map(pallas::PlutusData::from).collect(),
        );
        self
    }

    pub fn with_plutus_scripts(
        &mut self,
        scripts: impl IntoIterator<Item = PlutusScript>,
    ) -> &mut Self {
        let (v1, v2, v3) = scripts.into_iter().fold(
            (vec![], vec![], vec![]),
            |(mut v1, mut v2, mut v3), script| {
                let bytes = pallas::Bytes::from(script.as_bytes().to_vec());
                match script.version() {
                    PlutusVersion::V1 => v1.push(pallas::PlutusScript::<1>(bytes)),
                    PlutusVersion::V2 => v2.push(pallas::PlutusScript::<2>(bytes)),
                    PlutusVersion::V3 => v3.push(pallas::PlutusScript::<3>(bytes)),
                }
                (v1, v2, v3)
            },
        );

        let witnesses = &mut self.inner.transaction_witness_set;
        witnesses.plutus_v1_script = pallas::NonEmptySet::from_vec(v1);
        witnesses.plutus_v2_script = pallas::NonEmptySet::from_vec(v2);
        witnesses.plutus_v3_script = pallas::NonEmptySet::from_vec(v3);

        self
    }
}

// --------------------------------------------------------------------- Signing

impl Transaction {
    /// Add a signature of the transaction id. Any change to the body afterwards invalidates it.
    pub fn sign(&mut self, key: &SigningKey) -> &mut Self {
        let vkey = key.verification_key();
        let signature = key.sign(self.id().as_ref());

        let mut witnesses = self
            .inner
            .transaction_witness_set
            .vkeywitness
            .take()
            .map(|witnesses| witnesses.to_vec())
            .unwrap_or_default();

        witnesses.retain(|witness| witness.vkey.as_slice() != vkey.as_bytes());
        witnesses.push(pallas::VKeyWitness {
            vkey: pallas::Bytes::from(vkey.as_bytes().to_vec()),
            signature: pallas::Bytes::from(signature),
        });

        self.inner.transaction_witness_set.vkeywitness = pallas::NonEmptySet::from_vec(witnesses);

        self
    }
}

// -------------------------------------------------------------------- Internal

impl Transaction {
    /// Signers needed for the transaction to be valid: the explicit required signers plus the
    /// owners of key-locked inputs and collaterals.
    fn required_signatories(
        &self,
        resolved_inputs: &BTreeMap<Input, Output>,
    ) -> anyhow::Result<BTreeSet<Hash<28>>> {
        let from_inputs = self
            .inputs()
            .into_iter()
            .chain(self.collaterals())
            .map(|input| {
                resolved_inputs
                    .get(&input)
                    .ok_or_else(|| anyhow!("unknown input {input}; not present in resolved set"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?
            .into_iter()
            .filter_map(|output| output.address().payment_credential()?.as_key());

        Ok(self.required_signers().into_iter().chain(from_inputs).collect())
    }

    /// Scripts whose execution the spent inputs call for, by redeemer pointer.
    fn required_scripts(
        &self,
        resolved_inputs: &BTreeMap<Input, Output>,
    ) -> BTreeMap<RedeemerPointer, Hash<28>> {
        self.inputs()
            .into_iter()
            .enumerate()
            .filter_map(|(ix, input)| {
                let credential = resolved_inputs.get(&input)?.address().payment_credential()?;
                match credential {
                    Credential::Script(hash) => Some((RedeemerPointer::spend(ix as u32), hash)),
                    Credential::Key(..) => None,
                }
            })
            .collect()
    }

    fn script_integrity_hash(&self, params: &ProtocolParameters) -> anyhow::Result<Option<Hash<32>>> {
        let witnesses = &self.inner.transaction_witness_set;

        if witnesses.redeemer.is_none() && witnesses.plutus_data.is_none() {
            return Ok(None);
        }

        if witnesses.plutus_v1_script.is_some() || witnesses.plutus_v2_script.is_some() {
            return Err(anyhow!(
                "only Plutus V3 language views are supported when hashing script data"
            ));
        }

        let mut preimage: Vec<u8> = Vec::new();

        if let Some(redeemers) = &witnesses.redeemer {
            preimage.extend(redeemers.to_cbor());
        }

        if let Some(datums) = &witnesses.plutus_data {
            preimage.extend(datums.to_cbor());
        }

        preimage.extend(language_views(params.plutus_v3_cost_model()));

        Ok(Some(Hash::blake2b_256(&preimage)))
    }

    fn with_script_integrity_hash(&mut self, params: &ProtocolParameters) -> anyhow::Result<()> {
        self.inner.transaction_body.script_data_hash = self
            .script_integrity_hash(params)?
            .map(pallas::Hash::from);
        Ok(())
    }

    fn with_execution_units(&mut self, budgets: &BTreeMap<RedeemerPointer, ExecutionUnits>) {
        if let Some(pallas::Redeemers::Map(redeemers)) =
            mem::take(&mut self.inner.transaction_witness_set.redeemer)
        {
            self.inner.transaction_witness_set.redeemer = pallas::NonEmptyKeyValuePairs::from_vec(
                redeemers
                    .into_iter()
                    .map(|(key, mut value)| {
                        if let Some(ex_units) = budgets.get(&RedeemerPointer::from(&key)) {
                            value.ex_units = pallas::ExUnits::from(*ex_units);
                        }
                        (key, value)
                    })
                    .collect(),
            )
            .map(pallas::Redeemers::from);
        }
    }

    /// Balance the transaction: whatever the inputs bring in, minus the outputs and the fee,
    /// goes to a change output placed according to the change strategy.
    fn with_change(
        &mut self,
        resolved_inputs: &BTreeMap<Input, Output>,
        params: &ProtocolParameters,
    ) -> anyhow::Result<()> {
        let mut change = Value::default();

        for input in self.inputs() {
            let output = resolved_inputs
                .get(&input)
                .ok_or_else(|| anyhow!("unknown input {input}; not present in resolved set"))?;
            change.add(output.value());
        }

        let mut outputs = self.outputs()?;

        for output in &outputs {
            change
                .checked_sub(output.value())
                .context(BalanceError::SpendingMoreThanAvailable)?;
        }

        change
            .checked_sub(&Value::new(self.fee()))
            .context(BalanceError::CannotCoverFee)?;

        if change.is_empty() {
            return Ok(());
        }

        let change_address = self
            .change_strategy
            .address()
            .cloned()
            .ok_or_else(|| anyhow!("no change strategy defined, yet there is change left"))?;

        let min_change_value =
            Output::new(change_address, change.clone()).min_acceptable_value(params);

        if change.lovelace() < min_change_value {
            return Err(BalanceError::ChangeTooSmall {
                value: change.lovelace(),
                minimum: min_change_value,
            }
            .into());
        }

        self.change_strategy.apply(change, &mut outputs)?;
        self.with_outputs(outputs);

        Ok(())
    }

    /// Set the total collateral to the protocol minimum for the current fee, and return the
    /// remainder of the collateral inputs to the address of the first one.
    fn with_collateral_return(
        &mut self,
        resolved_inputs: &BTreeMap<Input, Output>,
        params: &ProtocolParameters,
    ) -> anyhow::Result<()> {
        let mut total = Value::default();
        let mut return_address: Option<Address> = None;

        for input in self.collaterals() {
            let output = resolved_inputs
                .get(&input)
                .ok_or_else(|| anyhow!("unknown collateral input {input}"))?;

            if output.address().is_script() {
                return Err(anyhow!("collateral input {input} is locked by a script"));
            }

            total.add(output.value());
            return_address.get_or_insert_with(|| output.address().clone());
        }

        let Some(return_address) = return_address else {
            return Ok(());
        };

        let minimum_collateral = params.minimum_collateral(self.fee());

        total
            .checked_sub(&Value::new(minimum_collateral))
            .context("insufficient collateral inputs")?;

        let body = &mut self.inner.transaction_body;
        body.total_collateral = Some(minimum_collateral);
        body.collateral_return = if total.is_empty() {
            None
        } else {
            Some(pallas::TransactionOutput::from(&Output::new(
                return_address,
                total,
            )))
        };

        Ok(())
    }
}

/// The language views of the script integrity hash, for Plutus V3: a single-entry map from
/// language id to the cost model, encoded as a definite list.
fn language_views(cost_model: &[i64]) -> Vec<u8> {
    let mut encoder = cbor::Encoder::new(Vec::new());

    let _ = (|| -> Result<(), cbor::encode::Error<Infallible>> {
        encoder
            .map(1)?
            .u8(PlutusVersion::V3.language_id())?
            .array(cost_model.len() as u64)?;
        for cost in cost_model {
            encoder.i64(*cost)?;
        }
        Ok(())
    })();

    encoder.into_writer()
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for Transaction {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.encode_with(&self.inner, ctx)?;
        Ok(())
    }
}

impl<'d, C> cbor::Decode<'d, C> for Transaction {
    fn decode(d: &mut cbor::Decoder<'d>, ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        Ok(Self {
            inner: d.decode_with(ctx)?,
            change_strategy: ChangeStrategy::default(),
        })
    }
}
