//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{
    Evaluate, ExecutionUnits, Hash, Input, Output, ProtocolParameters, RedeemerPointer, Transaction,
    cbor::ToCbor,
};
use anyhow::{Context, anyhow};
use std::collections::BTreeMap;

// ```cddl
// vkeywitness = [ vkey, signature ]
// ```
const SIZE_OF_KEY_WITNESS: u64 = 1 // 1 byte for the 2-tuple declaration
    + (32 + 2) // 32 bytes of verification & 2 bytes of CBOR bytestring declaration
    + (64 + 2); // 64 bytes of signature + 2 bytes of CBOR bytestring declaration

/// Map key, set tag and list declaration of the key witnesses; doubled to leave room for
/// bootstrap witnesses.
const SIZE_OF_KEY_WITNESSES_OVERHEAD: u64 = 2 * (1 + 3 + 3);

/// Rounds after which the builder gives up on finding a stable fee.
const MAX_ATTEMPTS: usize = 5;

impl Transaction {
    /// Build a transaction by repeatedly executing some building logic with different fee and
    /// execution units settings. Stops when a fixed point is reached.
    ///
    /// Scripts are evaluated by `evaluator` at every round, since their budget may depend on
    /// the fee itself. The final transaction has corresponding fees and execution units set,
    /// but carries no signature.
    pub async fn build<E, F>(
        params: &ProtocolParameters,
        evaluator: &E,
        resolved_inputs: &BTreeMap<Input, Output>,
        build: F,
    ) -> anyhow::Result<Self>
    where
        E: Evaluate,
        F: Fn(&mut Self) -> anyhow::Result<&mut Self>,
    {
        let mut attempts: usize = 0;
        let mut fee: u64 = 0;
        let mut budgets: BTreeMap<RedeemerPointer, ExecutionUnits> = BTreeMap::new();

        loop {
            let mut tx = Transaction::default();

            build(tx.with_fee(fee))?;

            let required_scripts = tx.required_scripts(resolved_inputs);

            fail_on_missing_collateral(&required_scripts, &tx)?;
            fail_on_missing_redeemers(&required_scripts, &tx)?;

            // Add a change output according to the user's chosen strategy.
            tx.with_change(resolved_inputs, params)?;

            // Execution units found in the previous round, if any.
            tx.with_execution_units(&budgets);

            tx.with_collateral_return(resolved_inputs, params)?;

            // Added last, so that it counts towards the transaction size.
            tx.with_script_integrity_hash(params)?;

            let serialized_tx = tx.to_cbor();

            let applied_budgets = budgets;
            budgets = if required_scripts.is_empty() {
                BTreeMap::new()
            } else {
                evaluator
                    .evaluate(&serialized_tx)
                    .await
                    .with_context(|| format!("transaction = {}", hex::encode(&serialized_tx)))
                    .context("failed to evaluate transaction scripts")?
            };

            for ptr in required_scripts.keys() {
                if !budgets.contains_key(ptr) {
                    return Err(anyhow!(
                        "evaluation returned no execution units for redeemer {ptr}"
                    ));
                }
            }

            // This estimation assumes that every key-locked input and every required signer
            // contributes exactly one signature.
            let estimated_fee = {
                let num_signatories = tx.required_signatories(resolved_inputs)?.len() as u64;
                let estimated_size = serialized_tx.len() as u64
                    + SIZE_OF_KEY_WITNESSES_OVERHEAD
                    + SIZE_OF_KEY_WITNESS * num_signatories;
                params.base_fee(estimated_size) + total_execution_cost(params, &budgets)
            };

            attempts += 1;

            log::debug!(
                "build round {attempts}: size={} fee={fee} estimated_fee={estimated_fee}",
                serialized_tx.len()
            );

            if fee >= estimated_fee && applied_budgets == budgets {
                return Ok(tx);
            } else if attempts >= MAX_ATTEMPTS {
                return Err(anyhow!("transaction = {}", hex::encode(&serialized_tx))
                    .context(format!("fee = {fee}, estimated_fee = {estimated_fee}"))
                    .context(format!(
                        "failed to build transaction: did not converge after {MAX_ATTEMPTS} attempts."
                    )));
            } else {
                fee = fee.max(estimated_fee);
            }
        }
    }
}

// --------------------------------------------------------------------- Helpers

fn total_execution_cost(
    params: &ProtocolParameters,
    budgets: &BTreeMap<RedeemerPointer, ExecutionUnits>,
) -> u64 {
    budgets
        .values()
        .map(|ex_units| params.execution_cost(ex_units))
        .sum()
}

fn fail_on_missing_collateral(
    required_scripts: &BTreeMap<RedeemerPointer, Hash<28>>,
    tx: &Transaction,
) -> anyhow::Result<()> {
    if let Some(ptr) = required_scripts.keys().next()
        && tx.collaterals().is_empty()
    {
        return Err(anyhow!("at {ptr}").context(
            "no collaterals set, but the transaction requires at least one phase-2 script execution.",
        ));
    }

    Ok(())
}

fn fail_on_missing_redeemers(
    required_scripts: &BTreeMap<RedeemerPointer, Hash<28>>,
    tx: &Transaction,
) -> anyhow::Result<()> {
    let redeemers = tx.redeemers();

    for (ptr, script) in required_scripts {
        if !redeemers.contains_key(ptr) {
            return Err(anyhow!("missing redeemer {ptr} for script {script}"));
        }
    }

    let provided: Vec<Hash<28>> = tx.plutus_scripts().iter().map(|s| s.hash()).collect();
    for script in required_scripts.values() {
        if !provided.contains(script) {
            return Err(anyhow!("missing witness for script {script}"));
        }
    }

    Ok(())
}

// ----------------------------------------------------------------------- Tests

#[cfg(test)]
mod tests {
    use crate::{
        Address, BalanceError, ChangeStrategy, Credential, Datum, Evaluate, ExecutionUnits, Hash, Input,
        NetworkId, Output, PlutusData, PlutusScript, PlutusVersion, RedeemerPointer, SigningKey,
        Transaction, Value, cardano::protocol_parameters::tests::preprod_like, cbor::ToCbor,
    };
    use std::{cell::Cell, collections::BTreeMap};

    /// Charges a fixed budget per script and counts how often it was asked.
    struct FixedBudget {
        ex_units: ExecutionUnits,
        calls: Cell<usize>,
    }

    impl FixedBudget {
        fn new(mem: u64, cpu: u64) -> Self {
            Self {
                ex_units: ExecutionUnits::new(mem, cpu),
                calls: Cell::new(0),
            }
        }
    }

    impl Evaluate for FixedBudget {
        async fn evaluate(
            &self,
            serialized_tx: &[u8],
        ) -> anyhow::Result<BTreeMap<RedeemerPointer, ExecutionUnits>> {
            self.calls.set(self.calls.get() + 1);
            let tx: Transaction = crate::cbor::decode(serialized_tx)?;
            Ok(tx
                .redeemers()
                .into_keys()
                .map(|ptr| (ptr, self.ex_units))
                .collect())
        }
    }

    fn always_succeed() -> PlutusScript {
        PlutusScript::new(
            PlutusVersion::V3,
            hex::decode("5101010023259800a518a4d136564004ae69").unwrap(),
        )
    }

    fn wallet_key() -> SigningKey {
        SigningKey::from_seed([7; 32])
    }

    fn wallet_address() -> Address {
        Address::enterprise(
            NetworkId::Testnet,
            Credential::Key(wallet_key().verification_key().hash()),
        )
    }

    fn script_address() -> Address {
        Address::enterprise(NetworkId::Testnet, Credential::Script(always_succeed().hash()))
    }

    fn input(ix: u8) -> Input {
        Input::new(Hash::from([ix; 32]), ix as u64)
    }

    #[tokio::test]
    async fn pay_to_script_with_change() {
        let params = preprod_like();
        let evaluator = FixedBudget::new(0, 0);
        let resolved_inputs = BTreeMap::from([(
            input(1),
            Output::new(wallet_address(), Value::new(100_000_000)),
        )]);

        let datum = PlutusData::constr(0, [PlutusData::bytes([1; 28])]);

        let tx = Transaction::build(&params, &evaluator, &resolved_inputs, |tx| {
            tx.with_inputs([(input(1), None)])
                .with_outputs([Output::new(script_address(), Value::new(10_000_000))
                    .with_datum(Datum::Hash(datum.hash()))])
                .with_change_strategy(ChangeStrategy::as_last_output(wallet_address()))
                .ok()
        })
        .await
        .unwrap();

        let outputs = tx.outputs().unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].address(), &script_address());
        assert_eq!(outputs[0].value().lovelace(), 10_000_000);
        assert_eq!(outputs[0].datum().map(Datum::hash), Some(datum.hash()));
        assert_eq!(outputs[1].address(), &wallet_address());
        assert_eq!(
            outputs[1].value().lovelace() + tx.fee(),
            90_000_000,
            "value is preserved"
        );
        assert!(tx.fee() > 155381 && tx.fee() < 200_000, "fee = {}", tx.fee());
        assert_eq!(tx.script_data_hash(), None);
        assert_eq!(evaluator.calls.get(), 0, "nothing to evaluate");
    }

    #[tokio::test]
    async fn spend_from_script() {
        let params = preprod_like();
        let evaluator = FixedBudget::new(14_000, 10_000_000);
        let datum = PlutusData::constr(0, [PlutusData::bytes([1; 28])]);
        let redeemer = PlutusData::constr(0, [PlutusData::bytes(b"17925")]);
        let signer = wallet_key().verification_key().hash();

        let resolved_inputs = BTreeMap::from([
            (
                input(1),
                Output::new(script_address(), Value::new(10_000_000))
                    .with_datum(Datum::Hash(datum.hash())),
            ),
            (input(2), Output::new(wallet_address(), Value::new(5_000_000))),
        ]);

        let mut tx = Transaction::build(&params, &evaluator, &resolved_inputs, |tx| {
            tx.with_network_id(NetworkId::Testnet)
                .with_inputs([(input(1), Some(redeemer.clone()))])
                .with_collaterals([input(2)])
                .with_plutus_scripts([always_succeed()])
                .with_datums([datum.clone()])
                .with_required_signers([signer])
                .with_change_strategy(ChangeStrategy::as_last_output(wallet_address()))
                .ok()
        })
        .await
        .unwrap();

        let redeemers = tx.redeemers();
        let (data, ex_units) = redeemers.get(&RedeemerPointer::spend(0)).unwrap();
        assert_eq!(data, &redeemer);
        assert_eq!(*ex_units, ExecutionUnits::new(14_000, 10_000_000));

        assert_eq!(tx.network_id(), Some(NetworkId::Testnet));
        assert_eq!(tx.required_signers(), vec![signer]);
        assert_eq!(tx.collaterals(), vec![input(2)]);
        assert_eq!(tx.datums(), vec![datum]);
        assert!(tx.script_data_hash().is_some());

        let total_collateral = tx.total_collateral().unwrap();
        assert_eq!(total_collateral, params.minimum_collateral(tx.fee()));
        assert_eq!(
            tx.collateral_return().unwrap().value().lovelace(),
            5_000_000 - total_collateral
        );

        let outputs = tx.outputs().unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].value().lovelace(), 10_000_000 - tx.fee());

        let id = tx.id();
        tx.sign(&wallet_key());
        assert_eq!(tx.id(), id, "signing leaves the body untouched");
        assert_eq!(tx.signatories().len(), 1);
        assert!(evaluator.calls.get() >= 2);

        let decoded: Transaction = crate::cbor::decode(&tx.to_cbor()).unwrap();
        assert_eq!(decoded.id(), id);
    }

    #[tokio::test]
    async fn script_spend_requires_collateral() {
        let params = preprod_like();
        let evaluator = FixedBudget::new(1, 1);
        let resolved_inputs = BTreeMap::from([(
            input(1),
            Output::new(script_address(), Value::new(10_000_000)),
        )]);

        let result = Transaction::build(&params, &evaluator, &resolved_inputs, |tx| {
            tx.with_inputs([(input(1), Some(PlutusData::constr(0, [])))])
                .with_plutus_scripts([always_succeed()])
                .with_change_strategy(ChangeStrategy::as_last_output(wallet_address()))
                .ok()
        })
        .await;

        assert!(format!("{:?}", result.unwrap_err()).contains("no collaterals set"));
    }

    #[tokio::test]
    async fn insufficient_funds() {
        let params = preprod_like();
        let resolved_inputs = BTreeMap::from([(
            input(1),
            Output::new(wallet_address(), Value::new(2_000_000)),
        )]);

        let result = Transaction::build(&params, &FixedBudget::new(0, 0), &resolved_inputs, |tx| {
            tx.with_inputs([(input(1), None)])
                .with_outputs([Output::new(script_address(), Value::new(10_000_000))])
                .with_change_strategy(ChangeStrategy::as_last_output(wallet_address()))
                .ok()
        })
        .await;

        let error = result.unwrap_err();
        assert!(format!("{error:?}").contains("insufficient balance"));
        assert_eq!(
            error.downcast_ref::<BalanceError>(),
            Some(&BalanceError::SpendingMoreThanAvailable)
        );
    }

    #[tokio::test]
    async fn change_below_minimum() {
        let params = preprod_like();
        let resolved_inputs = BTreeMap::from([(
            input(1),
            Output::new(wallet_address(), Value::new(10_500_000)),
        )]);

        let result = Transaction::build(&params, &FixedBudget::new(0, 0), &resolved_inputs, |tx| {
            tx.with_inputs([(input(1), None)])
                .with_outputs([Output::new(script_address(), Value::new(10_000_000))])
                .with_change_strategy(ChangeStrategy::as_last_output(wallet_address()))
                .ok()
        })
        .await;

        assert!(matches!(
            result.unwrap_err().downcast_ref::<BalanceError>(),
            Some(BalanceError::ChangeTooSmall { .. })
        ));
    }
}
