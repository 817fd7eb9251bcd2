use crate::{CardanoConnect, Network};
use anyhow::anyhow;
use cardano_tx_builder::{
    Address, Evaluate, ExecutionUnits, Hash, Input, Output, ProtocolParameters, RedeemerPointer,
    Transaction, cbor, cbor::ToCbor, tests::preprod_like,
};
use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

/// An in-memory ledger. Submitted transactions are applied straight away: their inputs are
/// consumed and their outputs become available, so that a deposit made by one transaction can
/// be spent by the next.
#[derive(Debug)]
pub struct MockConnect {
    network: Network,
    protocol_parameters: ProtocolParameters,
    budget: ExecutionUnits,
    utxos: Mutex<BTreeMap<Input, Output>>,
    submitted: Mutex<Vec<Vec<u8>>>,
    submit_failure: Option<String>,
    evaluation_failure: Option<String>,
}

impl MockConnect {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            protocol_parameters: preprod_like(),
            budget: ExecutionUnits::new(14_000, 10_000_000),
            utxos: Mutex::new(BTreeMap::new()),
            submitted: Mutex::new(Vec::new()),
            submit_failure: None,
            evaluation_failure: None,
        }
    }

    pub fn with_utxos(self, utxos: impl IntoIterator<Item = (Input, Output)>) -> Self {
        self.lock_utxos().extend(utxos);
        self
    }

    /// Budget reported for every redeemer of an evaluated transaction.
    pub fn with_budget(mut self, budget: ExecutionUnits) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_submit_failure(mut self, reason: impl Into<String>) -> Self {
        self.submit_failure = Some(reason.into());
        self
    }

    pub fn with_evaluation_failure(mut self, reason: impl Into<String>) -> Self {
        self.evaluation_failure = Some(reason.into());
        self
    }

    /// Transactions accepted so far, in submission order.
    pub fn submitted(&self) -> Vec<Transaction> {
        self.submitted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter_map(|bytes| cbor::decode(bytes).ok())
            .collect()
    }

    pub fn utxos(&self) -> BTreeMap<Input, Output> {
        self.lock_utxos().clone()
    }

    fn lock_utxos(&self) -> MutexGuard<'_, BTreeMap<Input, Output>> {
        self.utxos.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Evaluate for MockConnect {
    async fn evaluate(
        &self,
        serialized_tx: &[u8],
    ) -> anyhow::Result<BTreeMap<RedeemerPointer, ExecutionUnits>> {
        if let Some(reason) = &self.evaluation_failure {
            return Err(anyhow!("evaluation failed: {reason}"));
        }

        let tx: Transaction = cbor::decode(serialized_tx)?;

        let utxos = self.lock_utxos();
        if let Some(input) = tx.inputs().iter().find(|input| !utxos.contains_key(*input)) {
            return Err(anyhow!("unknown transaction input {input}"));
        }

        Ok(tx
            .redeemers()
            .into_keys()
            .map(|ptr| (ptr, self.budget))
            .collect())
    }
}

impl CardanoConnect for MockConnect {
    fn network(&self) -> Network {
        self.network
    }

    async fn health(&self) -> anyhow::Result<String> {
        Ok("ok".to_string())
    }

    async fn protocol_parameters(&self) -> anyhow::Result<ProtocolParameters> {
        Ok(self.protocol_parameters.clone())
    }

    async fn utxos_at(&self, address: &Address) -> anyhow::Result<BTreeMap<Input, Output>> {
        Ok(self
            .lock_utxos()
            .iter()
            .filter(|(_, output)| output.address() == address)
            .map(|(input, output)| (*input, output.clone()))
            .collect())
    }

    async fn transaction_outputs(
        &self,
        transaction_id: &Hash<32>,
    ) -> anyhow::Result<Vec<(Input, Output)>> {
        Ok(self
            .lock_utxos()
            .iter()
            .filter(|(input, _)| &input.transaction_id() == transaction_id)
            .map(|(input, output)| (*input, output.clone()))
            .collect())
    }

    async fn submit(&self, transaction: &Transaction) -> anyhow::Result<Hash<32>> {
        if let Some(reason) = &self.submit_failure {
            return Err(anyhow!("transaction rejected: {reason}"));
        }

        if transaction.signatories().is_empty() {
            return Err(anyhow!("transaction rejected: missing signatures"));
        }

        let id = transaction.id();
        let outputs = transaction.outputs()?;

        let inputs = transaction.inputs();
        let mut utxos = self.lock_utxos();

        if let Some(unknown) = inputs.iter().find(|input| !utxos.contains_key(*input)) {
            return Err(anyhow!("transaction rejected: unknown input {unknown}"));
        }

        for input in &inputs {
            utxos.remove(input);
        }

        for (ix, output) in outputs.into_iter().enumerate() {
            utxos.insert(Input::new(id, ix as u64), output);
        }

        log::debug!("mock ledger accepted transaction {id}");

        self.submitted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(transaction.to_cbor());

        Ok(id)
    }
}
