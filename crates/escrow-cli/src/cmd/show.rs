use crate::{config::Config, report::Outcome};
use cardano_connect::CardanoConnect;
use escrow_tx::{
    Lovelace,
    wallet::{CollateralRequirement, pick_collateral},
};
use serde::Serialize;

/// Show
#[derive(clap::Subcommand)]
pub enum Cmd {
    /// Show the configuration in use, secrets redacted
    Config,
    /// Show the wallet and contract addresses
    Address,
    /// Show the wallet's unspent outputs
    Utxos,
    /// Check that the chain indexer is reachable
    Health,
}

#[derive(Serialize)]
struct Addresses {
    wallet: String,
    payment_key_hash: String,
    script_hash: String,
    contract: String,
}

#[derive(Serialize)]
struct Row {
    input: String,
    lovelace: u64,
    assets: bool,
    collateral: bool,
}

impl Cmd {
    pub(crate) async fn run(
        self,
        config: &Config,
        connector: &impl CardanoConnect,
        json: bool,
    ) -> anyhow::Result<Outcome> {
        match self {
            Cmd::Health => {
                let health = connector.health().await?;
                if json {
                    println!("{}", serde_json::json!({ "health": health }));
                } else {
                    println!("{health}");
                }
            }
            Cmd::Config => {
                print!("{config}");
            }
            Cmd::Address => {
                let script = config.script()?;
                let addresses = Addresses {
                    wallet: config.wallet.address().to_string(),
                    payment_key_hash: config.wallet.payment_key_hash().to_string(),
                    script_hash: script.hash.to_string(),
                    contract: script.address.to_string(),
                };
                if json {
                    println!("{}", serde_json::to_string(&addresses)?);
                } else {
                    print!("{}", toml::to_string(&addresses)?);
                }
            }
            Cmd::Utxos => {
                let wallet = config
                    .wallet
                    .inspect(connector, CollateralRequirement::NotRequired)
                    .await?;
                let collateral = pick_collateral(&wallet.utxos).map(|(input, _)| input);
                let rows = wallet
                    .utxos
                    .iter()
                    .map(|(input, output)| Row {
                        input: input.to_string(),
                        lovelace: output.value().lovelace(),
                        assets: !output.value().is_lovelace_only(),
                        collateral: collateral == Some(*input),
                    })
                    .collect::<Vec<_>>();

                if json {
                    println!("{}", serde_json::to_string(&rows)?);
                } else {
                    for row in rows {
                        println!(
                            "{} {}{}{}",
                            row.input,
                            Lovelace::new(row.lovelace),
                            if row.assets { " +assets" } else { "" },
                            if row.collateral { " (collateral)" } else { "" },
                        );
                    }
                }
            }
        }
        Ok(Outcome::Done)
    }
}
