//! Command-line metavar specifying the type/semantic of arguments and/or options.

/// Decimal amount of ADA
pub const ADA: &str = "ADA";

/// 32-byte transaction id, hex-encoded
pub const TX_HASH: &str = "HEX32";

/// Free-form reference number
pub const REFERENCE: &str = "REFERENCE";

/// Blockfrost project id
pub const PROJECT_ID: &str = "PROJECT_ID";

/// Comma-separated BIP-39 words
pub const MNEMONIC: &str = "WORDS";

/// mainnet, preprod or preview
pub const NETWORK: &str = "NETWORK";

/// Path to a file
pub const PATH: &str = "PATH";

/// Comma-separated hex-encoded bytestrings
pub const PARAMS: &str = "HEX,...";
