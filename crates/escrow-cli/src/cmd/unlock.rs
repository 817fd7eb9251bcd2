use crate::{config::Config, metavar, prompt, report::Outcome};
use cardano_connect::CardanoConnect;
use cardano_tx_builder::Hash;
use escrow_tx::{
    PreconditionError, data::Reference, deposit::locate, unlock::claim,
    wallet::CollateralRequirement,
};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Id of the transaction that locked the deposit; asked for when missing
    #[arg(long, value_name = metavar::TX_HASH, value_parser = super::parsers::parse_tx_hash)]
    tx_hash: Option<Hash<32>>,

    /// Reference number presented to the contract; asked for when missing
    #[arg(long, value_name = metavar::REFERENCE, value_parser = super::parsers::parse_ref)]
    reference: Option<Reference>,
}

impl Args {
    pub async fn run(self, config: &Config, connector: &impl CardanoConnect) -> anyhow::Result<Outcome> {
        let (mut input, mut output) = prompt::stdio();

        let transaction_id = match self.tx_hash {
            Some(id) => id,
            None => prompt::transaction_hash(&mut input, &mut output)?,
        };

        let reference = match self.reference {
            Some(reference) => reference,
            None => prompt::reference(&mut input, &mut output)?,
        };

        let script = config.script()?;

        let deposit = locate(connector, &transaction_id).await?;

        let wallet = config
            .wallet
            .inspect(connector, CollateralRequirement::Required)
            .await?;

        let collateral = wallet.collateral.ok_or(PreconditionError::NoCollateral)?;

        let params = connector.protocol_parameters().await?;

        log::info!("claiming {} with reference {reference}", deposit.0);

        let transaction = claim(
            &params,
            connector,
            &deposit,
            &script,
            &reference,
            &config.wallet.payment_key_hash(),
            &collateral,
            &wallet.utxos,
            &wallet.address,
            config.wallet.network_id(),
        )
        .await?;

        log::debug!("unlock transaction: {transaction:?}");

        Ok(super::lock::submit(connector, transaction, config).await)
    }
}
