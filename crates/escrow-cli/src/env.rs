use cardano_connect::Network;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::metavar;

pub const BLOCKFROST_API_KEY: &str = "BLOCKFROST_API_KEY";
pub const MNEMONIC: &str = "MNEMONIC";
pub const CARDANO_NETWORK: &str = "CARDANO_NETWORK";
pub const ESCROW_BLUEPRINT: &str = "ESCROW_BLUEPRINT";
pub const ESCROW_VALIDATOR: &str = "ESCROW_VALIDATOR";
pub const ESCROW_PARAMS: &str = "ESCROW_PARAMS";

pub const DEFAULT_BLUEPRINT: &str = "aiken-workspace/plutus.json";

/// Placeholder wallet for throwaway testnet use; anyone can spend from it.
pub const DEFAULT_MNEMONIC: &str = "solution,solution,solution,solution,solution,solution,solution,solution,solution,solution,solution,solution,solution,solution,solution,solution,solution,solution,solution,solution,solution,solution,solution,solution";

/// Environment, as read from variables, a `.env` file or the command-line.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct Env {
    /// Blockfrost project id; its prefix names the network it serves
    #[arg(long, global = true, value_name = metavar::PROJECT_ID, env = BLOCKFROST_API_KEY, hide_env_values = true)]
    #[serde(rename = "BLOCKFROST_API_KEY")]
    pub blockfrost_api_key: Option<String>,

    /// Wallet recovery phrase, 24 comma-separated words
    #[arg(long, global = true, value_name = metavar::MNEMONIC, env = MNEMONIC, hide_env_values = true)]
    #[serde(rename = "MNEMONIC")]
    pub mnemonic: Option<String>,

    /// Network to operate on; must agree with the Blockfrost project id
    #[arg(long, global = true, value_name = metavar::NETWORK, env = CARDANO_NETWORK, default_value_t = Network::Preprod)]
    #[serde(rename = "CARDANO_NETWORK")]
    pub network: Network,

    /// CIP-57 blueprint holding the escrow validator
    #[arg(long, global = true, value_name = metavar::PATH, env = ESCROW_BLUEPRINT, default_value = DEFAULT_BLUEPRINT)]
    #[serde(rename = "ESCROW_BLUEPRINT")]
    pub blueprint: PathBuf,

    /// Title of the validator in the blueprint; defaults to the first one
    #[arg(long, global = true, env = ESCROW_VALIDATOR)]
    #[serde(rename = "ESCROW_VALIDATOR")]
    pub validator: Option<String>,

    /// Parameters applied to the validator, in order
    #[arg(long, global = true, value_name = metavar::PARAMS, env = ESCROW_PARAMS, value_delimiter = ',')]
    #[serde(rename = "ESCROW_PARAMS", default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
}
