use anyhow::{Context, anyhow};
use blockfrost_openapi::models::{
    AddressUtxoContentInner, EpochParamContent, TxContentOutputAmountInner,
    TxContentUtxoOutputsInner,
};
use cardano_tx_builder::{
    Address, Datum, ExecutionUnits, Hash, Input, Output, PlutusData, ProtocolParameters,
    RedeemerPointer, Value,
};
use serde::Deserialize;
use std::collections::BTreeMap;

const UNIT_LOVELACE: &str = "lovelace";

/// Ogmios-style answer relayed by `POST /utils/txs/evaluate`.
#[derive(Debug, Deserialize)]
pub struct EvaluateResponse {
    result: EvaluateResult,
}

#[derive(Debug, Deserialize)]
enum EvaluateResult {
    EvaluationResult(BTreeMap<String, Budget>),
    EvaluationFailure(serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct Budget {
    memory: u64,
    steps: u64,
}

impl EvaluateResponse {
    pub fn into_budgets(self) -> anyhow::Result<BTreeMap<RedeemerPointer, ExecutionUnits>> {
        match self.result {
            EvaluateResult::EvaluationFailure(failure) => {
                Err(anyhow!("script evaluation failed: {failure}"))
            }
            EvaluateResult::EvaluationResult(budgets) => budgets
                .into_iter()
                .map(|(ptr, Budget { memory, steps })| {
                    Ok((ptr.parse()?, ExecutionUnits::new(memory, steps)))
                })
                .collect(),
        }
    }
}

// ----------------------------------------------------------------- Conversions

pub fn address_utxo(utxo: AddressUtxoContentInner) -> anyhow::Result<(Input, Output)> {
    let input = Input::new(utxo.tx_hash.parse()?, u64::try_from(utxo.output_index)?);
    let address: Address = utxo
        .address
        .parse()
        .with_context(|| format!("malformed address {}", utxo.address))?;
    let output = into_output(
        address,
        utxo.amount,
        utxo.data_hash,
        utxo.inline_datum,
        utxo.reference_script_hash,
    )
    .with_context(|| format!("malformed output {input}"))?;
    Ok((input, output))
}

pub fn transaction_output(
    transaction_id: &Hash<32>,
    output: TxContentUtxoOutputsInner,
) -> anyhow::Result<(Input, Output)> {
    let input = Input::new(*transaction_id, u64::try_from(output.output_index)?);
    let address: Address = output
        .address
        .parse()
        .with_context(|| format!("malformed address {}", output.address))?;
    let output = into_output(
        address,
        output.amount,
        output.data_hash,
        output.inline_datum,
        output.reference_script_hash,
    )
    .with_context(|| format!("malformed output {input}"))?;
    Ok((input, output))
}

pub fn protocol_parameters(params: EpochParamContent) -> anyhow::Result<ProtocolParameters> {
    let coins_per_utxo_byte: u64 = params
        .coins_per_utxo_size
        .ok_or_else(|| anyhow!("missing coins_per_utxo_size"))?
        .parse()
        .context("invalid coins_per_utxo_size")?;

    let plutus_v3_cost_model = params
        .cost_models_raw
        .flatten()
        .and_then(|mut models| models.remove("PlutusV3"))
        .ok_or_else(|| anyhow!("missing PlutusV3 cost model"))?;

    let plutus_v3_cost_model = plutus_v3_cost_model
        .as_array()
        .and_then(|costs| costs.iter().map(serde_json::Value::as_i64).collect::<Option<Vec<_>>>())
        .ok_or_else(|| anyhow!("malformed PlutusV3 cost model"))?;

    Ok(ProtocolParameters::default()
        .with_fee_per_byte(u64::try_from(params.min_fee_a)?)
        .with_fee_constant(u64::try_from(params.min_fee_b)?)
        .with_coins_per_utxo_byte(coins_per_utxo_byte)
        .with_execution_price_mem(params.price_mem.unwrap_or_default())
        .with_execution_price_cpu(params.price_step.unwrap_or_default())
        .with_collateral_percent(
            params
                .collateral_percent
                .map(u64::try_from)
                .transpose()?
                .unwrap_or(150),
        )
        .with_plutus_v3_cost_model(plutus_v3_cost_model))
}

fn into_output(
    address: Address,
    amount: Vec<TxContentOutputAmountInner>,
    data_hash: Option<String>,
    inline_datum: Option<String>,
    reference_script_hash: Option<String>,
) -> anyhow::Result<Output> {
    let mut output = Output::new(address, into_value(amount)?);

    if let Some(datum) = inline_datum {
        output = output.with_datum(Datum::Inline(PlutusData::from_cbor(&hex::decode(datum)?)?));
    } else if let Some(hash) = data_hash {
        output = output.with_datum(Datum::Hash(hash.parse()?));
    }

    if let Some(hash) = reference_script_hash {
        output = output.with_reference_script(hash.parse()?);
    }

    Ok(output)
}

fn into_value(amount: Vec<TxContentOutputAmountInner>) -> anyhow::Result<Value> {
    amount
        .into_iter()
        .try_fold(Value::default(), |mut value, TxContentOutputAmountInner { unit, quantity }| {
            let quantity: u64 = quantity
                .parse()
                .with_context(|| format!("invalid quantity {quantity} of {unit}"))?;

            if unit == UNIT_LOVELACE {
                value.add(&Value::new(quantity));
                return Ok(value);
            }

            // Native assets are identified by policy id followed by the hex-encoded asset name.
            if unit.len() < 56 {
                return Err(anyhow!("invalid asset unit {unit}"));
            }
            let (policy, asset_name) = unit.split_at(56);
            Ok(value.with_asset(policy.parse()?, hex::decode(asset_name)?, quantity))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn amount(unit: &str, quantity: &str) -> TxContentOutputAmountInner {
        TxContentOutputAmountInner {
            unit: unit.to_string(),
            quantity: quantity.to_string(),
        }
    }

    #[test]
    fn address_utxo_with_datum_hash() {
        let utxo = AddressUtxoContentInner {
            address: "addr_test1wz7n46v3kk40ejh7tjnswk9ax65m97rj74lk6wsllg8twac0ke9dm".to_string(),
            tx_hash: "39a7a284c2a0948189dc45dec670211cd4d72f7b66c5726c08d9b3df11e44d58"
                .to_string(),
            output_index: 1,
            amount: vec![
                amount("lovelace", "10000000"),
                amount(
                    "b0d07d45fe9514f80213f4020e5a61241458be626841cde717cb38a74e4654",
                    "3",
                ),
            ],
            data_hash: Some(
                "c102c79556b21ffea5a89346b1cf3357ca761050ed5e0a778d8c35e5b364352a".to_string(),
            ),
            ..Default::default()
        };

        let (input, output) = address_utxo(utxo).unwrap();
        assert_eq!(input.output_index(), 1);
        assert_eq!(
            output.address().to_string(),
            "addr_test1wz7n46v3kk40ejh7tjnswk9ax65m97rj74lk6wsllg8twac0ke9dm"
        );
        assert_eq!(output.value().lovelace(), 10_000_000);
        assert_eq!(output.value().assets().len(), 1);
        assert_eq!(
            output.datum().map(Datum::hash).map(|h| h.to_string()).as_deref(),
            Some("c102c79556b21ffea5a89346b1cf3357ca761050ed5e0a778d8c35e5b364352a")
        );
    }

    #[test]
    fn transaction_output_with_inline_datum() {
        let transaction_id: Hash<32> =
            "39a7a284c2a0948189dc45dec670211cd4d72f7b66c5726c08d9b3df11e44d58"
                .parse()
                .unwrap();
        let output = TxContentUtxoOutputsInner {
            address: "addr_test1wz7n46v3kk40ejh7tjnswk9ax65m97rj74lk6wsllg8twac0ke9dm".to_string(),
            amount: vec![amount("lovelace", "2500000")],
            output_index: 2,
            inline_datum: Some("d8799f453137393235ff".to_string()),
            ..Default::default()
        };

        let (input, output) = transaction_output(&transaction_id, output).unwrap();
        assert_eq!(input, Input::new(transaction_id, 2));
        assert_eq!(output.value().lovelace(), 2_500_000);
        assert!(matches!(output.datum(), Some(Datum::Inline(..))));
    }

    #[test]
    fn malformed_quantity() {
        let utxo = AddressUtxoContentInner {
            address: "addr_test1wz7n46v3kk40ejh7tjnswk9ax65m97rj74lk6wsllg8twac0ke9dm".to_string(),
            tx_hash: "39a7a284c2a0948189dc45dec670211cd4d72f7b66c5726c08d9b3df11e44d58"
                .to_string(),
            amount: vec![amount("lovelace", "ten")],
            ..Default::default()
        };
        assert!(address_utxo(utxo).is_err());
    }

    #[test]
    fn evaluation_result() {
        let response: EvaluateResponse = serde_json::from_str(
            r#"{
                "type": "jsonwsp/response",
                "version": "1.0",
                "servicename": "ogmios",
                "methodname": "EvaluateTx",
                "result": { "EvaluationResult": { "spend:0": { "memory": 1700, "steps": 476468 } } },
                "reflection": { "id": "0" }
            }"#,
        )
        .unwrap();

        let budgets = response.into_budgets().unwrap();
        assert_eq!(
            budgets.get(&RedeemerPointer::spend(0)),
            Some(&ExecutionUnits::new(1700, 476468))
        );
    }

    #[test]
    fn evaluation_failure() {
        let response: EvaluateResponse = serde_json::from_str(
            r#"{ "result": { "EvaluationFailure": { "ScriptFailures": {} } } }"#,
        )
        .unwrap();

        assert!(response.into_budgets().is_err());
    }

    #[test]
    fn epoch_parameters() {
        let params = EpochParamContent {
            epoch: 180,
            min_fee_a: 44,
            min_fee_b: 155381,
            coins_per_utxo_size: Some("4310".to_string()),
            price_mem: Some(0.0577),
            price_step: Some(0.0000721),
            collateral_percent: Some(150),
            cost_models_raw: Some(Some(HashMap::from([
                ("PlutusV1".to_string(), serde_json::json!([1, 2])),
                ("PlutusV3".to_string(), serde_json::json!([100788, 420, 1])),
            ]))),
            ..Default::default()
        };

        let params = protocol_parameters(params).unwrap();
        assert_eq!(params.base_fee(300), 168581);
        assert_eq!(params.plutus_v3_cost_model(), &[100788, 420, 1]);
        assert_eq!(params.min_utxo_value(65), 969750);
    }

    #[test]
    fn epoch_parameters_without_v3_cost_model() {
        let params = EpochParamContent {
            min_fee_a: 44,
            min_fee_b: 155381,
            coins_per_utxo_size: Some("4310".to_string()),
            ..Default::default()
        };
        assert!(protocol_parameters(params).is_err());
    }
}
