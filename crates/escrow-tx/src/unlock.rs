use crate::{
    ResolvedScript, Utxo, Utxos, build_funded,
    data::{Reference, claim_redeemer, deposit_datum, depositor_of},
    spendable,
};
use anyhow::anyhow;
use cardano_tx_builder::{
    Address, ChangeStrategy, Credential, Datum, Evaluate, Hash, Input, NetworkId, PlutusVersion,
    ProtocolParameters, Transaction, cbor::ToCbor,
};

/// Build the transaction claiming `deposit` back to the wallet.
///
/// The deposit is spent through the contract with `Constr 0 [reference]` as redeemer, while
/// `depositor` is listed as required signer. Wallet inputs are only added when the deposit
/// alone cannot cover the fee and change; the collateral comes last among them. Execution
/// units are obtained from `evaluator`.
#[allow(clippy::too_many_arguments)]
pub async fn claim(
    params: &ProtocolParameters,
    evaluator: &impl Evaluate,
    deposit: &Utxo,
    script: &ResolvedScript,
    reference: &Reference,
    depositor: &Hash<28>,
    collateral: &Utxo,
    wallet_utxos: &Utxos,
    change_address: &Address,
    network_id: NetworkId,
) -> anyhow::Result<Transaction> {
    let (deposit_input, deposit_output) = deposit;
    let (collateral_input, collateral_output) = collateral;

    if script.script.version() != PlutusVersion::V3 {
        return Err(anyhow!(
            "unsupported validator version {:?}; only Plutus V3 can be claimed from",
            script.script.version()
        ));
    }

    if deposit_output.address().payment_credential() != Some(Credential::Script(script.hash)) {
        log::warn!(
            "deposit {deposit_input} is not locked by the escrow validator {}",
            script.hash
        );
    }

    let datum = deposit_datum(depositor);
    let redeemer = claim_redeemer(reference);

    // Inline datums are read from the output itself; supplying them again is an error.
    let witness_datums = match deposit_output.datum() {
        Some(Datum::Inline(inline)) => {
            if depositor_of(inline) != Some(*depositor) {
                log::warn!(
                    "deposit {deposit_input} carries an inline datum {inline}, which does not name the depositor {depositor}"
                );
            }
            vec![]
        }
        Some(Datum::Hash(hash)) => {
            if hash != &datum.hash() {
                log::warn!(
                    "deposit {deposit_input} has datum hash {hash}, which does not match the depositor {depositor}"
                );
            }
            vec![datum]
        }
        None => vec![datum],
    };

    let mut candidates: Vec<Input> = spendable(wallet_utxos)
        .into_iter()
        .filter(|input| input != collateral_input)
        .collect();
    candidates.push(*collateral_input);

    let mut resolved_inputs = wallet_utxos.clone();
    resolved_inputs.insert(*deposit_input, deposit_output.clone());
    resolved_inputs.insert(*collateral_input, collateral_output.clone());

    let transaction = build_funded(
        params,
        evaluator,
        &resolved_inputs,
        &candidates,
        0,
        |transaction, funding| {
            transaction
                .with_network_id(network_id)
                .with_inputs(
                    funding
                        .iter()
                        .map(|input| (*input, None))
                        .chain([(*deposit_input, Some(redeemer.clone()))]),
                )
                .with_collaterals([*collateral_input])
                .with_required_signers([*depositor])
                .with_plutus_scripts([script.script.clone()])
                .with_datums(witness_datums.iter().cloned())
                .with_change_strategy(ChangeStrategy::as_last_output(change_address.clone()))
                .ok()
        },
    )
    .await?;

    log::debug!(
        "unlock transaction {}: fee={}, size={}",
        transaction.id(),
        transaction.fee(),
        transaction.to_cbor().len()
    );

    Ok(transaction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ValidatorArtifact, resolve};
    use cardano_connect::{MockConnect, Network};
    use cardano_tx_builder::{
        ExecutionUnits, Output, PlutusData, PlutusScript, RedeemerPointer, Value,
        tests::preprod_like,
    };

    fn always_succeed() -> ResolvedScript {
        let artifact = ValidatorArtifact {
            title: "escrow.escrow.spend".to_string(),
            script: PlutusScript::new(
                PlutusVersion::V3,
                hex::decode("5101010023259800a518a4d136564004ae69").unwrap(),
            ),
        };
        resolve(&artifact, &[], NetworkId::Testnet).unwrap()
    }

    fn wallet_address() -> Address {
        Address::enterprise(NetworkId::Testnet, Credential::Key(Hash::from([1; 28])))
    }

    fn setup(deposit_lovelace: u64, datum: Datum) -> (MockConnect, Utxo, Utxo, Utxos) {
        let deposit = (
            Input::new(Hash::from([10; 32]), 0),
            Output::new(always_succeed().address, Value::new(deposit_lovelace)).with_datum(datum),
        );
        let collateral = (
            Input::new(Hash::from([11; 32]), 0),
            Output::new(wallet_address(), Value::new(5_000_000)),
        );
        let funds = (
            Input::new(Hash::from([12; 32]), 1),
            Output::new(wallet_address(), Value::new(20_000_000)),
        );
        let wallet_utxos = Utxos::from([collateral.clone(), funds]);
        let connect = MockConnect::new(Network::Preprod)
            .with_utxos(wallet_utxos.clone().into_iter().chain([deposit.clone()]));
        (connect, deposit, collateral, wallet_utxos)
    }

    #[tokio::test]
    async fn claim_with_reference() {
        let depositor = Hash::from([1; 28]);
        let datum = deposit_datum(&depositor);
        let (connect, deposit, collateral, wallet_utxos) =
            setup(10_000_000, Datum::Hash(datum.hash()));

        let transaction = claim(
            &preprod_like(),
            &connect,
            &deposit,
            &always_succeed(),
            &"17925".parse().unwrap(),
            &depositor,
            &collateral,
            &wallet_utxos,
            &wallet_address(),
            NetworkId::Testnet,
        )
        .await
        .unwrap();

        assert_eq!(transaction.inputs(), vec![deposit.0]);
        assert_eq!(transaction.collaterals(), vec![collateral.0]);
        assert_eq!(transaction.required_signers(), vec![depositor]);
        assert_eq!(transaction.network_id(), Some(NetworkId::Testnet));
        assert_eq!(transaction.datums(), vec![datum]);
        assert_eq!(transaction.plutus_scripts(), vec![always_succeed().script]);
        assert!(transaction.script_data_hash().is_some());

        let redeemers = transaction.redeemers();
        let (redeemer, ex_units) = &redeemers[&RedeemerPointer::spend(0)];
        assert_eq!(
            hex::encode(redeemer.to_cbor()),
            "d8799f453137393235ff"
        );
        assert_eq!(ex_units, &ExecutionUnits::new(14_000, 10_000_000));

        let outputs = transaction.outputs().unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].address(), &wallet_address());
        assert_eq!(outputs[0].value().lovelace(), 10_000_000 - transaction.fee());
    }

    #[tokio::test]
    async fn fee_follows_the_evaluated_budget() {
        let depositor = Hash::from([1; 28]);
        let heavy = ExecutionUnits::new(500_000, 200_000_000);

        let mut fees = vec![];
        for budget in [ExecutionUnits::new(14_000, 10_000_000), heavy] {
            let (connect, deposit, collateral, wallet_utxos) =
                setup(10_000_000, Datum::Hash(deposit_datum(&depositor).hash()));
            let transaction = claim(
                &preprod_like(),
                &connect.with_budget(budget),
                &deposit,
                &always_succeed(),
                &"17925".parse().unwrap(),
                &depositor,
                &collateral,
                &wallet_utxos,
                &wallet_address(),
                NetworkId::Testnet,
            )
            .await
            .unwrap();
            assert_eq!(transaction.redeemers()[&RedeemerPointer::spend(0)].1, budget);
            fees.push(transaction.fee());
        }

        assert!(fees[1] > fees[0], "{fees:?}");
    }

    #[tokio::test]
    async fn small_deposit_pulls_wallet_funds() {
        let depositor = Hash::from([1; 28]);
        let (connect, deposit, collateral, wallet_utxos) =
            setup(900_000, Datum::Hash(deposit_datum(&depositor).hash()));

        let transaction = claim(
            &preprod_like(),
            &connect,
            &deposit,
            &always_succeed(),
            &"17925".parse().unwrap(),
            &depositor,
            &collateral,
            &wallet_utxos,
            &wallet_address(),
            NetworkId::Testnet,
        )
        .await
        .unwrap();

        let inputs = transaction.inputs();
        assert_eq!(inputs.len(), 2);
        assert!(inputs.contains(&deposit.0));
        assert!(!inputs.contains(&collateral.0));

        // The redeemer follows the deposit to its position among sorted inputs.
        let position = inputs.iter().position(|input| input == &deposit.0).unwrap();
        assert!(
            transaction
                .redeemers()
                .contains_key(&RedeemerPointer::spend(position as u32))
        );
    }

    #[tokio::test]
    async fn small_deposit_pays_for_itself() {
        let depositor = Hash::from([1; 28]);
        let (connect, deposit, _, _) =
            setup(2_500_000, Datum::Hash(deposit_datum(&depositor).hash()));
        let collateral = (
            Input::new(Hash::from([11; 32]), 0),
            Output::new(wallet_address(), Value::new(20_000_000)),
        );
        let wallet_utxos = Utxos::from([collateral.clone()]);

        let transaction = claim(
            &preprod_like(),
            &connect,
            &deposit,
            &always_succeed(),
            &"17925".parse().unwrap(),
            &depositor,
            &collateral,
            &wallet_utxos,
            &wallet_address(),
            NetworkId::Testnet,
        )
        .await
        .unwrap();

        assert_eq!(transaction.inputs(), vec![deposit.0]);
        assert_eq!(transaction.collaterals(), vec![collateral.0]);
    }

    #[tokio::test]
    async fn collateral_funds_when_nothing_else_can() {
        let depositor = Hash::from([1; 28]);
        let (connect, deposit, _, _) =
            setup(900_000, Datum::Hash(deposit_datum(&depositor).hash()));
        let collateral = (
            Input::new(Hash::from([11; 32]), 0),
            Output::new(wallet_address(), Value::new(20_000_000)),
        );
        let wallet_utxos = Utxos::from([collateral.clone()]);

        let transaction = claim(
            &preprod_like(),
            &connect,
            &deposit,
            &always_succeed(),
            &"17925".parse().unwrap(),
            &depositor,
            &collateral,
            &wallet_utxos,
            &wallet_address(),
            NetworkId::Testnet,
        )
        .await
        .unwrap();

        let inputs = transaction.inputs();
        assert_eq!(inputs.len(), 2);
        assert!(inputs.contains(&collateral.0));
        assert_eq!(transaction.collaterals(), vec![collateral.0]);
    }

    #[tokio::test]
    async fn inline_datum_is_not_repeated() {
        let depositor = Hash::from([1; 28]);
        let (connect, deposit, collateral, wallet_utxos) =
            setup(10_000_000, Datum::Inline(deposit_datum(&depositor)));

        let transaction = claim(
            &preprod_like(),
            &connect,
            &deposit,
            &always_succeed(),
            &"17925".parse().unwrap(),
            &depositor,
            &collateral,
            &wallet_utxos,
            &wallet_address(),
            NetworkId::Testnet,
        )
        .await
        .unwrap();

        assert!(transaction.datums().is_empty());
        assert!(transaction.script_data_hash().is_some());
    }

    #[tokio::test]
    async fn evaluation_failure_aborts() {
        let depositor = Hash::from([1; 28]);
        let (connect, deposit, collateral, wallet_utxos) =
            setup(10_000_000, Datum::Hash(PlutusData::bytes([0]).hash()));
        let connect = connect.with_evaluation_failure("validator returned false");

        let result = claim(
            &preprod_like(),
            &connect,
            &deposit,
            &always_succeed(),
            &"00000".parse().unwrap(),
            &depositor,
            &collateral,
            &wallet_utxos,
            &wallet_address(),
            NetworkId::Testnet,
        )
        .await;

        assert!(format!("{:?}", result.unwrap_err()).contains("validator returned false"));
    }
}
