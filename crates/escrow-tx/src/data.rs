//! On-chain data exchanged with the escrow validator.
//!
//! A deposit carries `Constr 0 [depositor]`, the depositor being a payment key hash. A claim
//! presents `Constr 0 [reference]`, the reference number taken as raw UTF-8 bytes.

use cardano_tx_builder::{Hash, PlutusData};
use std::{convert::Infallible, fmt, str::FromStr};

/// Reference number presented when claiming a deposit. Any text is accepted and kept as is,
/// surrounding whitespace included; the validator decides whether it is the right one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference(String);

impl Reference {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.as_bytes())
    }

    pub fn from_hex(text: &str) -> anyhow::Result<Self> {
        let bytes = hex::decode(text)?;
        Ok(Self(String::from_utf8(bytes)?))
    }
}

impl From<String> for Reference {
    fn from(reference: String) -> Self {
        Self(reference)
    }
}

impl From<&str> for Reference {
    fn from(reference: &str) -> Self {
        Self(reference.to_string())
    }
}

impl FromStr for Reference {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn deposit_datum(depositor: &Hash<28>) -> PlutusData {
    PlutusData::constr(0, [PlutusData::bytes(depositor)])
}

/// The depositor named by a deposit datum, if it has the expected shape.
pub fn depositor_of(datum: &PlutusData) -> Option<Hash<28>> {
    let (0, fields) = datum.as_constr()? else {
        return None;
    };
    let [field] = fields.as_slice() else {
        return None;
    };
    Hash::try_from(field.as_bytes()?).ok()
}

pub fn claim_redeemer(reference: &Reference) -> PlutusData {
    PlutusData::constr(0, [PlutusData::bytes(reference.as_str().as_bytes())])
}

#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    use super::*;
    use cardano_tx_builder::cbor::ToCbor;
    use proptest::prelude::*;

    pub mod generators {
        use super::*;

        pub fn reference() -> impl Strategy<Value = Reference> {
            any::<String>().prop_map(Reference::from)
        }
    }

    #[test]
    fn claim_redeemer_of_default_reference() {
        let reference = Reference::from("17925");
        assert_eq!(reference.to_hex(), "3137393235");
        assert_eq!(
            hex::encode(claim_redeemer(&reference).to_cbor()),
            "d8799f453137393235ff"
        );
    }

    #[test]
    fn deposit_datum_shape() {
        let depositor = Hash::from(core::array::from_fn::<u8, 28, _>(|i| i as u8 + 1));
        let datum = deposit_datum(&depositor);
        assert_eq!(
            hex::encode(datum.to_cbor()),
            "d8799f581c0102030405060708090a0b0c0d0e0f101112131415161718191a1b1cff"
        );
        assert_eq!(
            datum.hash().to_string(),
            "c102c79556b21ffea5a89346b1cf3357ca761050ed5e0a778d8c35e5b364352a"
        );
        assert_eq!(depositor_of(&datum), Some(depositor));
        assert_eq!(depositor_of(&claim_redeemer(&Reference::from("1"))), None);
    }

    #[test]
    fn reference_is_kept_verbatim() {
        let padded = Reference::from(" 17925 ");
        assert_eq!(padded.to_hex(), "20313739323520");
        assert_eq!(
            hex::encode(claim_redeemer(&padded).to_cbor()),
            "d8799f4720313739323520ff"
        );

        let empty = Reference::from("");
        assert_eq!(empty.to_hex(), "");
        assert_eq!(hex::encode(claim_redeemer(&empty).to_cbor()), "d8799f40ff");
    }

    proptest! {
        #[test]
        fn reference_hex_roundtrip(reference in generators::reference()) {
            prop_assert_eq!(Reference::from_hex(&reference.to_hex()).unwrap(), reference);
        }
    }
}
