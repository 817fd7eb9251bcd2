/// Conditions on the state of the chain or the wallet that must hold before any transaction
/// can be built. None of them is worth retrying without outside intervention.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    #[error("No utxos found")]
    NoUtxos,
    #[error("No collateral found")]
    NoCollateral,
    #[error("No wallet address found")]
    NoWalletAddress,
    #[error("UTxO not found")]
    UtxoNotFound,
}

/// A signed transaction that did not make it to the chain.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("{0:#}")]
    Rejected(anyhow::Error),
}

/// Malformed amounts of ADA.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("no amount given")]
    Empty,
    #[error("not a decimal number: {0}")]
    Malformed(String),
    #[error("too many decimal places in {0}; at most 6 are allowed")]
    TooPrecise(String),
    #[error("amount must be strictly positive")]
    NotPositive,
    #[error("amount too large")]
    Overflow,
}
