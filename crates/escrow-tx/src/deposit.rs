use crate::{PreconditionError, Utxo};
use cardano_connect::CardanoConnect;
use cardano_tx_builder::Hash;

/// Find the escrow deposit made by `transaction_id`. A lock transaction pays the contract
/// first, so the output with the lowest index is taken.
pub async fn locate(
    connect: &impl CardanoConnect,
    transaction_id: &Hash<32>,
) -> anyhow::Result<Utxo> {
    let mut outputs = connect.transaction_outputs(transaction_id).await?;

    if outputs.is_empty() {
        return Err(PreconditionError::UtxoNotFound.into());
    }

    if outputs.len() > 1 {
        log::debug!(
            "transaction {transaction_id} has {} outputs; skipping all but the first",
            outputs.len()
        );
    }

    Ok(outputs.remove(0))
}
