use clap::Parser;
use std::process::ExitCode;

mod cmd;
mod config;
mod env;
mod metavar;
mod prompt;
mod report;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = dotenv
        && !e.not_found()
    {
        log::warn!("failed to parse .env: {e}");
    }

    let cli = match cmd::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            return ExitCode::from(report::Exit::Input);
        }
        Err(e) => e.exit(),
    };
    let json = cli.json;

    report::conclude(cli.execute().await, json)
}
