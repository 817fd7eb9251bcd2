use crate::{config::Config, env::Env, report::Outcome};
use cardano_connect::CardanoConnect;

mod lock;
mod parsers;
mod show;
mod unlock;

/// Lock ADA in an escrow contract, and claim it back with a reference number
#[derive(clap::Parser)]
#[clap(version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    env: Env,

    /// Print the outcome as a single JSON object
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(clap::Subcommand)]
enum Cmd {
    /// Pay ADA to the escrow contract
    Lock(lock::Args),

    /// Claim a deposit back from the escrow contract
    Unlock(unlock::Args),

    /// Show info (requires env)
    #[clap(subcommand)]
    Show(show::Cmd),
}

impl Cli {
    pub async fn execute(self) -> anyhow::Result<Outcome> {
        let config = Config::try_from(self.env)?;
        let connector = config.connector()?;
        self.cmd.run(&config, &connector, self.json).await
    }
}

impl Cmd {
    async fn run(
        self,
        config: &Config,
        connector: &impl CardanoConnect,
        json: bool,
    ) -> anyhow::Result<Outcome> {
        match self {
            Cmd::Lock(args) => args.run(config, connector).await,
            Cmd::Unlock(args) => args.run(config, connector).await,
            Cmd::Show(cmd) => cmd.run(config, connector, json).await,
        }
    }
}
