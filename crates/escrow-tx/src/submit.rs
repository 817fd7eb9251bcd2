use crate::{SubmitError, wallet::Wallet};
use cardano_connect::CardanoConnect;
use cardano_tx_builder::{Hash, Transaction};

/// Sign with the wallet's payment key and hand the transaction over to the network, once.
pub async fn sign_and_submit(
    connect: &impl CardanoConnect,
    mut transaction: Transaction,
    wallet: &Wallet,
) -> Result<Hash<32>, SubmitError> {
    wallet.sign(&mut transaction);

    log::debug!("submitting transaction {}", transaction.id());

    connect
        .submit(&transaction)
        .await
        .map_err(SubmitError::Rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardano_connect::{MockConnect, Network};
    use cardano_tx_builder::{NetworkId, SigningKey};

    fn wallet() -> Wallet {
        Wallet::from_keys(
            SigningKey::from_seed([1; 32]),
            SigningKey::from_seed([2; 32]).verification_key(),
            NetworkId::Testnet,
        )
    }

    #[tokio::test]
    async fn report_rejection() {
        let connect = MockConnect::new(Network::Preprod).with_submit_failure("BadInputsUTxO");

        let error = sign_and_submit(&connect, Transaction::default(), &wallet())
            .await
            .unwrap_err();

        assert!(error.to_string().contains("BadInputsUTxO"));
        assert!(connect.submitted().is_empty());
    }

    #[tokio::test]
    async fn signed_before_submission() {
        let connect = MockConnect::new(Network::Preprod);
        let transaction = Transaction::default();
        let id = transaction.id();

        assert_eq!(
            sign_and_submit(&connect, transaction, &wallet()).await.unwrap(),
            id
        );

        let submitted = connect.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].signatories().len(), 1);
    }
}
