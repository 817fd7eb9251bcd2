use crate::{MIN_COLLATERAL, PreconditionError, Utxo, Utxos};
use anyhow::anyhow;
use cardano_connect::CardanoConnect;
use cardano_tx_builder::{
    Address, Credential, Hash, NetworkId, SigningKey, Transaction, VerificationKey,
};
use pallas_wallet::hd::Bip32PrivateKey;
use std::fmt;

const HARDENED: u32 = 0x8000_0000;

/// CIP-1852 account discovery path, up to the account: m/1852'/1815'/0'.
const ACCOUNT_PATH: [u32; 3] = [HARDENED + 1852, HARDENED + 1815, HARDENED];

const ROLE_EXTERNAL: u32 = 0;
const ROLE_STAKING: u32 = 2;

/// Whether the transaction about to be built runs scripts, and thus needs collateral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollateralRequirement {
    Required,
    NotRequired,
}

/// What the chain knows about the wallet at the time of inspection.
#[derive(Debug, Clone)]
pub struct WalletInfo {
    pub utxos: Utxos,
    pub collateral: Option<Utxo>,
    pub address: Address,
}

/// Keys of the first address of the first account of an HD wallet.
pub struct Wallet {
    payment_key: SigningKey,
    stake_key: VerificationKey,
    network_id: NetworkId,
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address().to_string())
            .finish()
    }
}

// -------------------------------------------------------------------- Building

impl Wallet {
    /// Restore a wallet from a BIP-39 mnemonic, with words separated by commas and/or spaces.
    pub fn from_mnemonic(mnemonic: &str, network_id: NetworkId) -> anyhow::Result<Self> {
        let phrase = mnemonic
            .split([',', ' ', '\n', '\t'])
            .map(str::trim)
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let root = Bip32PrivateKey::from_bip39_mnenomic(phrase, String::new())
            .map_err(|e| anyhow!("invalid mnemonic: {e}"))?;

        let account = ACCOUNT_PATH
            .iter()
            .fold(root, |key, index| key.derive(*index));

        let payment_key = account
            .derive(ROLE_EXTERNAL)
            .derive(0)
            .to_ed25519_private_key();

        let stake_key = account
            .derive(ROLE_STAKING)
            .derive(0)
            .to_ed25519_private_key();

        Ok(Self {
            payment_key: SigningKey::from(payment_key),
            stake_key: SigningKey::from(stake_key).verification_key(),
            network_id,
        })
    }

    pub fn from_keys(payment_key: SigningKey, stake_key: VerificationKey, network_id: NetworkId) -> Self {
        Self {
            payment_key,
            stake_key,
            network_id,
        }
    }
}

// ------------------------------------------------------------------ Inspecting

impl Wallet {
    pub fn payment_key_hash(&self) -> Hash<28> {
        self.payment_key.verification_key().hash()
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    /// The base address, with both payment and stake credentials.
    pub fn address(&self) -> Address {
        Address::base(
            self.network_id,
            Credential::Key(self.payment_key_hash()),
            Credential::Key(self.stake_key.hash()),
        )
    }

    pub fn sign(&self, transaction: &mut Transaction) {
        transaction.sign(&self.payment_key);
    }

    /// Look the wallet up on chain. The address is checked first, then funds, then collateral
    /// when asked for, so that each failure can be told apart.
    pub async fn inspect(
        &self,
        connect: &impl CardanoConnect,
        collateral: CollateralRequirement,
    ) -> anyhow::Result<WalletInfo> {
        let address = self.address();

        if address.network_id() != Some(NetworkId::from(connect.network())) {
            log::debug!(
                "wallet address {address} does not belong to {}",
                connect.network()
            );
            return Err(PreconditionError::NoWalletAddress.into());
        }

        let utxos = connect.utxos_at(&address).await?;

        if utxos.is_empty() {
            return Err(PreconditionError::NoUtxos.into());
        }

        let collateral = match collateral {
            CollateralRequirement::NotRequired => None,
            CollateralRequirement::Required => {
                Some(pick_collateral(&utxos).ok_or(PreconditionError::NoCollateral)?)
            }
        };

        log::debug!(
            "wallet {address} holds {} utxo(s), collateral: {}",
            utxos.len(),
            collateral
                .as_ref()
                .map(|(input, _)| input.to_string())
                .unwrap_or_else(|| "none".to_string())
        );

        Ok(WalletInfo {
            utxos,
            collateral,
            address,
        })
    }
}

/// The first output made of ADA only and large enough to back script execution.
pub fn pick_collateral(utxos: &Utxos) -> Option<Utxo> {
    utxos
        .iter()
        .find(|(_, output)| {
            output.value().is_lovelace_only()
                && output.value().lovelace() >= MIN_COLLATERAL
                && output.reference_script().is_none()
                && !output.address().is_script()
        })
        .map(|(input, output)| (*input, output.clone()))
}
