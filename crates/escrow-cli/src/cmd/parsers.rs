use crate::prompt::{parse_reference, parse_transaction_hash};
use cardano_tx_builder::Hash;
use escrow_tx::{Lovelace, data::Reference};

pub fn parse_ada(s: &str) -> anyhow::Result<Lovelace> {
    Ok(Lovelace::from_ada_str(s)?)
}

pub fn parse_tx_hash(s: &str) -> anyhow::Result<Hash<32>> {
    parse_transaction_hash(s)
}

pub fn parse_ref(s: &str) -> anyhow::Result<Reference> {
    Ok(parse_reference(s))
}
