use crate::{Lovelace, Utxos, build_funded, data::deposit_datum, spendable};
use anyhow::anyhow;
use cardano_tx_builder::{
    Address, ChangeStrategy, Datum, Evaluate, ExecutionUnits, Hash, Output, ProtocolParameters,
    RedeemerPointer, Transaction, Value,
};
use std::collections::BTreeMap;

/// Build the transaction paying `amount` to the contract, on behalf of `depositor`.
///
/// The deposit output carries the hash of `Constr 0 [depositor]`; the datum itself is only
/// revealed when the deposit is claimed. Wallet inputs are added largest first until they
/// cover the amount, the fee and a valid change output, which returns to `change_address`. The transaction comes back balanced but unsigned.
pub async fn deposit(
    params: &ProtocolParameters,
    contract_address: &Address,
    amount: Lovelace,
    depositor: &Hash<28>,
    wallet_utxos: &Utxos,
    change_address: &Address,
) -> anyhow::Result<Transaction> {
    let datum = deposit_datum(depositor);

    let contract_output = Output::new(contract_address.clone(), Value::new(amount.as_u64()))
        .with_datum(Datum::Hash(datum.hash()));

    let min_value = contract_output.min_acceptable_value(params);
    if amount.as_u64() < min_value {
        return Err(anyhow!(
            "deposit of {amount} is below the ledger minimum of {}",
            Lovelace::new(min_value)
        ));
    }

    let transaction = build_funded(
        params,
        &NoScripts,
        wallet_utxos,
        &spendable(wallet_utxos),
        amount.as_u64(),
        |transaction, funding| {
            transaction
                .with_inputs(funding.iter().map(|input| (*input, None)))
                .with_outputs([contract_output.clone()])
                .with_change_strategy(ChangeStrategy::as_last_output(change_address.clone()))
                .ok()
        },
    )
    .await?;

    log::debug!(
        "lock transaction {}: fee={}",
        transaction.id(),
        transaction.fee()
    );

    Ok(transaction)
}

/// Lock transactions only spend key-locked outputs; nothing ever asks for an evaluation.
struct NoScripts;

impl Evaluate for NoScripts {
    async fn evaluate(
        &self,
        _serialized_tx: &[u8],
    ) -> anyhow::Result<BTreeMap<RedeemerPointer, ExecutionUnits>> {
        Err(anyhow!("unexpected script execution in a lock transaction"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::generators::wallet_utxos;
    use cardano_tx_builder::{Credential, Input, NetworkId, tests::preprod_like};
    use proptest::prelude::*;

    fn contract_address() -> Address {
        Address::enterprise(NetworkId::Testnet, Credential::Script(Hash::from([9; 28])))
    }

    fn wallet_address() -> Address {
        Address::enterprise(NetworkId::Testnet, Credential::Key(Hash::from([0; 28])))
    }

    fn run<T>(future: impl Future<Output = T>) -> T {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[tokio::test]
    async fn lock_ten_ada() {
        let depositor = Hash::from([1; 28]);
        let wallet_utxos = Utxos::from([
            (
                Input::new(Hash::from([1; 32]), 0),
                Output::new(wallet_address(), Value::new(5_000_000)),
            ),
            (
                Input::new(Hash::from([2; 32]), 3),
                Output::new(wallet_address(), Value::new(50_000_000)),
            ),
        ]);

        let transaction = deposit(
            &preprod_like(),
            &contract_address(),
            Lovelace::from_ada_str("10").unwrap(),
            &depositor,
            &wallet_utxos,
            &wallet_address(),
        )
        .await
        .unwrap();

        assert_eq!(transaction.inputs(), vec![Input::new(Hash::from([2; 32]), 3)]);

        let outputs = transaction.outputs().unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].address(), &contract_address());
        assert_eq!(outputs[0].value(), &Value::new(10_000_000));
        assert_eq!(
            outputs[0].datum(),
            Some(&Datum::Hash(deposit_datum(&depositor).hash()))
        );
        assert_eq!(outputs[1].address(), &wallet_address());
        assert_eq!(
            outputs[1].value().lovelace(),
            40_000_000 - transaction.fee()
        );
        assert!(transaction.redeemers().is_empty());
        assert!(transaction.collaterals().is_empty());
    }

    #[tokio::test]
    async fn lock_with_just_enough_for_fee_and_change() {
        let only = Input::new(Hash::from([1; 32]), 0);
        let wallet_utxos = Utxos::from([(
            only,
            Output::new(wallet_address(), Value::new(12_000_000)),
        )]);

        let transaction = deposit(
            &preprod_like(),
            &contract_address(),
            Lovelace::from_ada_str("10").unwrap(),
            &Hash::from([1; 28]),
            &wallet_utxos,
            &wallet_address(),
        )
        .await
        .unwrap();

        assert_eq!(transaction.inputs(), vec![only]);
        let outputs = transaction.outputs().unwrap();
        assert_eq!(outputs[0].value(), &Value::new(10_000_000));
        assert_eq!(outputs[1].value().lovelace(), 2_000_000 - transaction.fee());
    }

    #[tokio::test]
    async fn add_inputs_until_change_is_large_enough() {
        let wallet_utxos = Utxos::from([
            (
                Input::new(Hash::from([1; 32]), 0),
                Output::new(wallet_address(), Value::new(10_300_000)),
            ),
            (
                Input::new(Hash::from([2; 32]), 0),
                Output::new(wallet_address(), Value::new(3_000_000)),
            ),
        ]);

        let transaction = deposit(
            &preprod_like(),
            &contract_address(),
            Lovelace::from_ada_str("10").unwrap(),
            &Hash::from([1; 28]),
            &wallet_utxos,
            &wallet_address(),
        )
        .await
        .unwrap();

        assert_eq!(transaction.inputs().len(), 2);
    }

    #[tokio::test]
    async fn insufficient_funds() {
        let wallet_utxos = Utxos::from([(
            Input::new(Hash::from([1; 32]), 0),
            Output::new(wallet_address(), Value::new(10_100_000)),
        )]);

        let error = deposit(
            &preprod_like(),
            &contract_address(),
            Lovelace::from_ada_str("10").unwrap(),
            &Hash::from([1; 28]),
            &wallet_utxos,
            &wallet_address(),
        )
        .await
        .unwrap_err();

        assert!(error.to_string().contains("insufficient funds in wallet"));
    }

    #[tokio::test]
    async fn below_minimum_deposit() {
        let wallet_utxos = Utxos::from([(
            Input::new(Hash::from([1; 32]), 0),
            Output::new(wallet_address(), Value::new(50_000_000)),
        )]);

        let result = deposit(
            &preprod_like(),
            &contract_address(),
            Lovelace::from_ada_str("0.5").unwrap(),
            &Hash::from([1; 28]),
            &wallet_utxos,
            &wallet_address(),
        )
        .await;

        assert!(result.unwrap_err().to_string().contains("below the ledger minimum"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn lock_preserves_value(utxos in wallet_utxos(), ada in 2..40u64) {
            let amount = Lovelace::new(ada * 1_000_000);
            let available: u64 = utxos.values().map(|output| output.value().lovelace()).sum();

            let result = run(deposit(
                &preprod_like(),
                &contract_address(),
                amount,
                &Hash::from([1; 28]),
                &utxos,
                &wallet_address(),
            ));

            match result {
                Ok(transaction) => {
                    let spent: u64 = transaction
                        .inputs()
                        .iter()
                        .map(|input| utxos[input].value().lovelace())
                        .sum();
                    let produced: u64 = transaction
                        .outputs()
                        .unwrap()
                        .iter()
                        .map(|output| output.value().lovelace())
                        .sum();
                    prop_assert_eq!(spent, produced + transaction.fee());
                }
                // Fee and minimum change together stay well under 2 ADA.
                Err(_) => prop_assert!(available < amount.as_u64() + 2_000_000),
            }
        }
    }
}
