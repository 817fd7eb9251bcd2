use crate::{config::Config, metavar, prompt, report::Outcome};
use anyhow::Context;
use cardano_connect::CardanoConnect;
use escrow_tx::{
    Lovelace, SubmitError,
    lock::deposit,
    submit::sign_and_submit,
    wallet::CollateralRequirement,
};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Amount to lock, in ADA; asked for when missing
    #[arg(long, value_name = metavar::ADA, value_parser = super::parsers::parse_ada)]
    ada: Option<Lovelace>,
}

impl Args {
    pub async fn run(self, config: &Config, connector: &impl CardanoConnect) -> anyhow::Result<Outcome> {
        let amount = match self.ada {
            Some(amount) => amount,
            None => {
                let (mut input, mut output) = prompt::stdio();
                prompt::amount(&mut input, &mut output).context("invalid amount of ADA")?
            }
        };

        let script = config.script()?;

        let wallet = config
            .wallet
            .inspect(connector, CollateralRequirement::NotRequired)
            .await?;

        let params = connector.protocol_parameters().await?;

        log::info!("locking {amount} at {}", script.address);

        let transaction = deposit(
            &params,
            &script.address,
            amount,
            &config.wallet.payment_key_hash(),
            &wallet.utxos,
            &wallet.address,
        )
        .await?;

        log::debug!("lock transaction: {transaction:?}");

        Ok(submit(connector, transaction, config).await)
    }
}

pub(super) async fn submit(
    connector: &impl CardanoConnect,
    transaction: cardano_tx_builder::Transaction,
    config: &Config,
) -> Outcome {
    match sign_and_submit(connector, transaction, &config.wallet).await {
        Ok(id) => Outcome::Submitted(id),
        Err(e @ SubmitError::Rejected(..)) => {
            log::debug!("submission rejected: {e}");
            Outcome::Failed(e)
        }
    }
}
