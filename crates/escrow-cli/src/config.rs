use crate::env::{DEFAULT_MNEMONIC, Env};
use cardano_connect::Network;
use cardano_connect_blockfrost::Blockfrost;
use cardano_tx_builder::Address;
use escrow_tx::{ResolvedScript, ValidatorArtifact, resolve, wallet::Wallet};
use serde::Serialize;
use serde_with::{DisplayFromStr, serde_as};
use std::{fmt, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing Blockfrost project id; set BLOCKFROST_API_KEY")]
    MissingProjectId,
    #[error("unrecognised Blockfrost project id; it should start with mainnet, preprod or preview")]
    UnknownProjectIdPrefix,
    #[error("Blockfrost project id is for {project}, but the configured network is {configured}")]
    NetworkMismatch { project: Network, configured: Network },
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),
    #[error("cannot load validator from {path}: {reason}")]
    Validator { path: PathBuf, reason: String },
}

/// Validated configuration. Secrets stay in here and are never displayed.
#[derive(Debug)]
pub struct Config {
    project_id: String,
    pub network: Network,
    pub wallet: Wallet,
    default_mnemonic: bool,
    pub blueprint: PathBuf,
    pub validator: Option<String>,
    pub params: Vec<String>,
}

impl TryFrom<Env> for Config {
    type Error = ConfigError;

    fn try_from(env: Env) -> Result<Self, Self::Error> {
        let project_id = env
            .blockfrost_api_key
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::MissingProjectId)?;

        let project = Blockfrost::network_of(&project_id)
            .ok_or(ConfigError::UnknownProjectIdPrefix)?;

        if project != env.network {
            return Err(ConfigError::NetworkMismatch {
                project,
                configured: env.network,
            });
        }

        let (mnemonic, default_mnemonic) = match env.mnemonic {
            Some(mnemonic) if !mnemonic.trim().is_empty() => (mnemonic, false),
            _ => (DEFAULT_MNEMONIC.to_string(), true),
        };

        let wallet = Wallet::from_mnemonic(&mnemonic, env.network.network_id())
            .map_err(|e| ConfigError::InvalidMnemonic(format!("{e:#}")))?;

        Ok(Config {
            project_id,
            network: env.network,
            wallet,
            default_mnemonic,
            blueprint: env.blueprint,
            validator: env.validator,
            params: env.params,
        })
    }
}

impl Config {
    pub fn connector(&self) -> anyhow::Result<Blockfrost> {
        if self.default_mnemonic {
            log::warn!("no MNEMONIC set; using the public placeholder wallet, do not send real funds to it");
        }
        Blockfrost::new(self.project_id.clone())
    }

    /// The escrow validator, on this configuration's network.
    pub fn script(&self) -> anyhow::Result<ResolvedScript> {
        let as_config_error = |e: anyhow::Error| ConfigError::Validator {
            path: self.blueprint.clone(),
            reason: format!("{e:#}"),
        };

        let artifact =
            ValidatorArtifact::from_blueprint_file(&self.blueprint, self.validator.as_deref())
                .map_err(as_config_error)?;

        let script = resolve(&artifact, &self.params, self.network.network_id())
            .map_err(as_config_error)?;

        log::debug!(
            "validator {} resolved to {} at {}",
            artifact.title,
            script.hash,
            script.address
        );

        Ok(script)
    }

    fn redacted_project_id(&self) -> String {
        let visible: String = self.project_id.chars().take(7).collect();
        format!("{visible}********")
    }
}

#[serde_as]
#[derive(Serialize)]
struct Redacted {
    #[serde(flatten)]
    env: Env,
    #[serde(rename = "WALLET_ADDRESS")]
    #[serde_as(as = "DisplayFromStr")]
    wallet_address: Address,
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = Redacted {
            env: Env {
                blockfrost_api_key: Some(self.redacted_project_id()),
                mnemonic: Some(if self.default_mnemonic {
                    "<default placeholder>".to_string()
                } else {
                    "<redacted>".to_string()
                }),
                network: self.network,
                blueprint: self.blueprint.clone(),
                validator: self.validator.clone(),
                params: self.params.clone(),
            },
            wallet_address: self.wallet.address(),
        };
        let rendered = toml::to_string(&redacted).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Env {
        Env {
            blockfrost_api_key: Some("preprodAbCdEfGhIjKlMnOpQrStUvWxYz".to_string()),
            mnemonic: None,
            network: Network::Preprod,
            blueprint: PathBuf::from("aiken-workspace/plutus.json"),
            validator: None,
            params: vec![],
        }
    }

    #[test]
    fn default_mnemonic_is_valid() {
        let config = Config::try_from(env()).unwrap();
        assert!(config.default_mnemonic);
        assert!(config.wallet.address().to_string().starts_with("addr_test1"));
    }

    #[test]
    fn network_mismatch() {
        let env = Env {
            network: Network::Mainnet,
            ..env()
        };
        assert!(matches!(
            Config::try_from(env),
            Err(ConfigError::NetworkMismatch {
                project: Network::Preprod,
                configured: Network::Mainnet
            })
        ));
    }

    #[test]
    fn missing_or_unknown_project_id() {
        let missing = Env {
            blockfrost_api_key: None,
            ..env()
        };
        assert!(matches!(
            Config::try_from(missing),
            Err(ConfigError::MissingProjectId)
        ));

        let unknown = Env {
            blockfrost_api_key: Some("sanchonetAbCd".to_string()),
            ..env()
        };
        assert!(matches!(
            Config::try_from(unknown),
            Err(ConfigError::UnknownProjectIdPrefix)
        ));
    }

    #[test]
    fn invalid_mnemonic() {
        let env = Env {
            mnemonic: Some("solution,solution,solution".to_string()),
            ..env()
        };
        assert!(matches!(
            Config::try_from(env),
            Err(ConfigError::InvalidMnemonic(..))
        ));
    }

    #[test]
    fn display_hides_secrets() {
        let config = Config::try_from(env()).unwrap();
        let shown = config.to_string();
        assert!(shown.contains("CARDANO_NETWORK = \"preprod\""));
        assert!(shown.contains("WALLET_ADDRESS = \"addr_test1"));
        assert!(!shown.contains("ESCROW_VALIDATOR"));
        assert!(shown.contains("preprod********"));
        assert!(!shown.contains("AbCdEf"));
        assert!(!shown.contains("solution"));
    }
}
