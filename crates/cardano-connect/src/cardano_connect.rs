use crate::network::Network;
use cardano_tx_builder::{
    Address, Evaluate, Hash, Input, Output, ProtocolParameters, Transaction,
};
use std::collections::BTreeMap;
use trait_variant::make;

/// A view on the chain, as offered by an indexer. Script evaluation comes through the
/// `Evaluate` supertrait so that a connector can be handed to the transaction builder as is.
#[make(CardanoConnectDyn: Send)]
pub trait CardanoConnect: Evaluate {
    fn network(&self) -> Network;

    async fn health(&self) -> anyhow::Result<String>;

    async fn protocol_parameters(&self) -> anyhow::Result<ProtocolParameters>;

    /// Every unspent output currently sitting at `address`. Empty when the address has never
    /// been used.
    async fn utxos_at(&self, address: &Address) -> anyhow::Result<BTreeMap<Input, Output>>;

    /// Outputs produced by the given transaction, ordered by output index. Empty when the
    /// transaction is unknown.
    async fn transaction_outputs(
        &self,
        transaction_id: &Hash<32>,
    ) -> anyhow::Result<Vec<(Input, Output)>>;

    async fn submit(&self, transaction: &Transaction) -> anyhow::Result<Hash<32>>;
}
