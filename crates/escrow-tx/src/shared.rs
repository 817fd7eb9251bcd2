use crate::AmountError;
use cardano_tx_builder::{BalanceError, Evaluate, Input, Output, ProtocolParameters, Transaction};
use std::{collections::BTreeMap, fmt, str::FromStr};

pub type Utxo = (Input, Output);

pub type Utxos = BTreeMap<Input, Output>;

/// Smallest pure-ADA output the wallet accepts as collateral.
pub const MIN_COLLATERAL: u64 = 5_000_000;

const LOVELACE_PER_ADA: u64 = 1_000_000;

const ADA_DECIMALS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Lovelace(u64);

impl Lovelace {
    pub fn new(lovelace: u64) -> Self {
        Self(lovelace)
    }

    /// Parse a decimal amount of ADA into lovelace, without going through floating points.
    ///
    /// ```
    /// use escrow_tx::Lovelace;
    /// assert_eq!(Lovelace::from_ada_str("12.345678").unwrap().as_u64(), 12_345_678);
    /// ```
    pub fn from_ada_str(text: &str) -> Result<Self, AmountError> {
        let text = text.trim();

        if text.is_empty() {
            return Err(AmountError::Empty);
        }

        if text.starts_with('-') {
            return Err(AmountError::NotPositive);
        }

        let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));

        let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !is_digits(whole) || !is_digits(fraction) || (whole.is_empty() && fraction.is_empty())
        {
            return Err(AmountError::Malformed(text.to_string()));
        }

        if fraction.len() > ADA_DECIMALS {
            return Err(AmountError::TooPrecise(text.to_string()));
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| AmountError::Overflow)?
        };

        let fraction: u64 = if fraction.is_empty() {
            0
        } else {
            format!("{fraction:0<ADA_DECIMALS$}")
                .parse()
                .map_err(|_| AmountError::Malformed(text.to_string()))?
        };

        let lovelace = whole
            .checked_mul(LOVELACE_PER_ADA)
            .and_then(|lovelace| lovelace.checked_add(fraction))
            .ok_or(AmountError::Overflow)?;

        if lovelace == 0 {
            return Err(AmountError::NotPositive);
        }

        Ok(Self(lovelace))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<Lovelace> for u64 {
    fn from(lovelace: Lovelace) -> Self {
        lovelace.0
    }
}

impl FromStr for Lovelace {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_ada_str(s)
    }
}

/// Shown in ADA, with all six decimals.
impl fmt::Display for Lovelace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:06} ADA",
            self.0 / LOVELACE_PER_ADA,
            self.0 % LOVELACE_PER_ADA
        )
    }
}

/// Wallet outputs able to fund a transaction, largest first. Outputs locked by a script or
/// carrying a reference script are left out.
pub fn spendable(utxos: &Utxos) -> Vec<Input> {
    let mut candidates: Vec<(&Input, &Output)> = utxos
        .iter()
        .filter(|(_, output)| output.reference_script().is_none())
        .filter(|(_, output)| !output.address().is_script())
        .collect();
    candidates.sort_by_key(|(_, output)| std::cmp::Reverse(output.value().lovelace()));
    candidates.into_iter().map(|(input, _)| *input).collect()
}

/// Build a transaction funded by `candidates`, taken in order. The first attempt uses as few
/// candidates as it takes to cover `target` lovelace; each time the builder reports a lack of
/// balance, one more candidate is added.
///
/// `build` receives the funding inputs of the current attempt. Every candidate must be part
/// of `resolved_inputs`.
pub async fn build_funded<E, F>(
    params: &ProtocolParameters,
    evaluator: &E,
    resolved_inputs: &Utxos,
    candidates: &[Input],
    target: u64,
    build: F,
) -> anyhow::Result<Transaction>
where
    E: Evaluate,
    F: for<'a> Fn(&'a mut Transaction, &[Input]) -> anyhow::Result<&'a mut Transaction>,
{
    let lovelace = |input: &Input| {
        resolved_inputs
            .get(input)
            .map(|output| output.value().lovelace())
            .unwrap_or_default()
    };

    let available: u64 = candidates.iter().map(lovelace).sum();

    let mut count = 0;
    let mut covered: u64 = 0;
    while covered < target && count < candidates.len() {
        covered = covered.saturating_add(lovelace(&candidates[count]));
        count += 1;
    }

    loop {
        let funding = &candidates[..count];

        match Transaction::build(params, evaluator, resolved_inputs, |transaction| {
            build(transaction, funding)
        })
        .await
        {
            Ok(transaction) => {
                log::debug!(
                    "selected inputs: [{}]",
                    funding
                        .iter()
                        .map(Input::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                return Ok(transaction);
            }
            Err(e) if e.downcast_ref::<BalanceError>().is_some() => {
                if count >= candidates.len() {
                    return Err(e.context(format!(
                        "insufficient funds in wallet: {} available",
                        Lovelace(available)
                    )));
                }
                log::debug!("{e}; adding input {}", candidates[count]);
                count += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    use super::*;
    use proptest::prelude::*;

    pub mod generators {
        use super::*;
        use cardano_tx_builder::{
            Address, Credential, Hash, NetworkId, Value, tests::generators::input,
        };

        /// A few key-locked, pure-ADA outputs, all at the same address.
        pub fn wallet_utxos() -> impl Strategy<Value = Utxos> {
            proptest::collection::btree_map(input(), 1_000_000..100_000_000u64, 1..8).prop_map(
                |utxos| {
                    let address = Address::enterprise(
                        NetworkId::Testnet,
                        Credential::Key(Hash::from([0; 28])),
                    );
                    utxos
                        .into_iter()
                        .map(|(input, lovelace)| {
                            (input, Output::new(address.clone(), Value::new(lovelace)))
                        })
                        .collect()
                },
            )
        }
    }

    #[test]
    fn parse_ada_amounts() {
        let lovelace = |s: &str| Lovelace::from_ada_str(s).map(u64::from);
        assert_eq!(lovelace("1"), Ok(1_000_000));
        assert_eq!(lovelace("0.5"), Ok(500_000));
        assert_eq!(lovelace("12.345678"), Ok(12_345_678));
        assert_eq!(lovelace("10"), Ok(10_000_000));
        assert_eq!(lovelace(" 2.1 "), Ok(2_100_000));
        assert_eq!(lovelace(".25"), Ok(250_000));
    }

    #[test]
    fn reject_bad_amounts() {
        let error = |s: &str| Lovelace::from_ada_str(s).unwrap_err();
        assert_eq!(error(""), AmountError::Empty);
        assert_eq!(error("0"), AmountError::NotPositive);
        assert_eq!(error("0.000000"), AmountError::NotPositive);
        assert_eq!(error("-1"), AmountError::NotPositive);
        assert_eq!(error("1.2345678"), AmountError::TooPrecise("1.2345678".to_string()));
        assert_eq!(error("ten"), AmountError::Malformed("ten".to_string()));
        assert_eq!(error("1.2.3"), AmountError::Malformed("1.2.3".to_string()));
        assert_eq!(error("1e6"), AmountError::Malformed("1e6".to_string()));
        assert_eq!(error("."), AmountError::Malformed(".".to_string()));
        assert_eq!(error("99999999999999999999"), AmountError::Overflow);
    }

    #[test]
    fn display_in_ada() {
        assert_eq!(Lovelace::new(12_345_678).to_string(), "12.345678 ADA");
        assert_eq!(Lovelace::new(500_000).to_string(), "0.500000 ADA");
    }

    proptest! {
        #[test]
        fn lovelace_display_then_parse(lovelace in 1..u64::MAX / 2) {
            let shown = Lovelace::new(lovelace).to_string();
            let parsed = Lovelace::from_ada_str(shown.trim_end_matches(" ADA")).unwrap();
            prop_assert_eq!(parsed.as_u64(), lovelace);
        }

        #[test]
        fn spendable_is_largest_first(utxos in generators::wallet_utxos()) {
            let candidates = spendable(&utxos);
            prop_assert_eq!(candidates.len(), utxos.len());
            let amounts: Vec<u64> = candidates
                .iter()
                .map(|input| utxos[input].value().lovelace())
                .collect();
            prop_assert!(amounts.windows(2).all(|pair| pair[0] >= pair[1]));
        }
    }
}
