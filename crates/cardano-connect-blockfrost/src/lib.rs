use anyhow::{Context, anyhow};
use blockfrost::{BlockfrostAPI, BlockfrostError, BlockfrostResult, Pagination};
use cardano_connect::{CardanoConnect, Network};
use cardano_tx_builder::{
    Address, Evaluate, ExecutionUnits, Hash, Input, Output, ProtocolParameters, RedeemerPointer,
    Transaction, cbor::ToCbor,
};
use reqwest::{StatusCode, header};
use std::collections::BTreeMap;

mod models;

const MAINNET_PREFIX: &str = "mainnet";
const PREPROD_PREFIX: &str = "preprod";
const PREVIEW_PREFIX: &str = "preview";

pub struct Blockfrost {
    api: BlockfrostAPI,
    base_url: String,
    client: reqwest::Client,
    network: Network,
    project_id: String,
}

/// Blockfrost answers 404 for addresses and transactions it has never seen.
fn found<T>(result: BlockfrostResult<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(BlockfrostError::Response { reason, .. }) if reason.status_code == 404 => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Blockfrost {
    /// Connect to the network the project id was issued for.
    pub fn new(project_id: String) -> anyhow::Result<Self> {
        let network = Self::network_of(&project_id).ok_or_else(|| {
            anyhow!(
                "unexpected project id prefix; expected one of {MAINNET_PREFIX}, {PREPROD_PREFIX}, {PREVIEW_PREFIX}"
            )
        })?;

        let base_url = format!("https://cardano-{network}.blockfrost.io/api/v0");
        let api = BlockfrostAPI::new(project_id.as_str(), Default::default());

        Ok(Self {
            api,
            base_url,
            client: reqwest::Client::new(),
            network,
            project_id,
        })
    }

    /// Blockfrost project ids are prefixed with the name of the network they serve.
    pub fn network_of(project_id: &str) -> Option<Network> {
        if project_id.starts_with(MAINNET_PREFIX) {
            Some(Network::Mainnet)
        } else if project_id.starts_with(PREPROD_PREFIX) {
            Some(Network::Preprod)
        } else if project_id.starts_with(PREVIEW_PREFIX) {
            Some(Network::Preview)
        } else {
            None
        }
    }
}

impl Evaluate for Blockfrost {
    async fn evaluate(
        &self,
        serialized_tx: &[u8],
    ) -> anyhow::Result<BTreeMap<RedeemerPointer, ExecutionUnits>> {
        let res = self
            .client
            .post(format!("{}/utils/txs/evaluate", self.base_url))
            .header("project_id", self.project_id.as_str())
            .header(header::CONTENT_TYPE, "application/cbor")
            .body(hex::encode(serialized_tx))
            .send()
            .await?;
        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(anyhow!("evaluation endpoint not found"));
        }

        if !status.is_success() {
            return Err(anyhow!("evaluation request failed ({status}): {body}"));
        }

        let response: models::EvaluateResponse = serde_json::from_str(&body)
            .context("failed to parse evaluation response")?;

        let budgets = response.into_budgets()?;

        log::debug!(
            "evaluated budgets: {}",
            budgets
                .iter()
                .map(|(ptr, ex_units)| format!("{ptr}={ex_units}"))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(budgets)
    }
}

impl CardanoConnect for Blockfrost {
    fn network(&self) -> Network {
        self.network
    }

    async fn health(&self) -> anyhow::Result<String> {
        let health = self
            .api
            .health()
            .await
            .context("blockfrost health check failed")?;

        Ok(if health.is_healthy { "ok" } else { "unhealthy" }.to_string())
    }

    async fn protocol_parameters(&self) -> anyhow::Result<ProtocolParameters> {
        let params = found(self.api.epochs_latest_parameters().await)?
            .ok_or_else(|| anyhow!("no protocol parameters for the latest epoch"))?;

        models::protocol_parameters(params)
    }

    async fn utxos_at(&self, address: &Address) -> anyhow::Result<BTreeMap<Input, Output>> {
        found(
            self.api
                .addresses_utxos(&address.to_string(), Pagination::all())
                .await,
        )?
        .unwrap_or_default()
        .into_iter()
        .map(models::address_utxo)
        .collect()
    }

    async fn transaction_outputs(
        &self,
        transaction_id: &Hash<32>,
    ) -> anyhow::Result<Vec<(Input, Output)>> {
        let Some(utxos) = found(
            self.api
                .transactions_utxos(&transaction_id.to_string())
                .await,
        )?
        else {
            return Ok(Vec::new());
        };

        let mut outputs = utxos
            .outputs
            .into_iter()
            .filter(|output| !output.collateral)
            .map(|output| models::transaction_output(transaction_id, output))
            .collect::<anyhow::Result<Vec<_>>>()?;

        outputs.sort_by_key(|(input, _)| *input);

        Ok(outputs)
    }

    async fn submit(&self, transaction: &Transaction) -> anyhow::Result<Hash<32>> {
        let id = self
            .api
            .transactions_submit(transaction.to_cbor())
            .await
            .context("blockfrost rejected the transaction")?;

        id.trim_matches('"')
            .parse()
            .with_context(|| format!("unexpected transaction id in response: {id}"))
    }
}
