//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Hash, pallas};
use anyhow::anyhow;
use std::collections::BTreeMap;

pub type Assets = BTreeMap<Hash<28>, BTreeMap<Vec<u8>, u64>>;

/// A quantity of lovelace, with any native assets riding along.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Value {
    lovelace: u64,
    assets: Assets,
}

// -------------------------------------------------------------------- Building

impl Value {
    pub fn new(lovelace: u64) -> Self {
        Self {
            lovelace,
            assets: BTreeMap::new(),
        }
    }

    pub fn with_asset(mut self, policy: Hash<28>, asset_name: Vec<u8>, quantity: u64) -> Self {
        if quantity > 0 {
            *self
                .assets
                .entry(policy)
                .or_default()
                .entry(asset_name)
                .or_default() += quantity;
        }
        self
    }
}

// ------------------------------------------------------------------ Inspecting

impl Value {
    pub fn lovelace(&self) -> u64 {
        self.lovelace
    }

    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    pub fn is_empty(&self) -> bool {
        self.lovelace == 0 && self.assets.is_empty()
    }

    pub fn is_lovelace_only(&self) -> bool {
        self.assets.is_empty()
    }
}

// ------------------------------------------------------------------ Arithmetic

impl Value {
    pub fn add(&mut self, other: &Value) -> &mut Self {
        self.lovelace += other.lovelace;
        for (policy, assets) in &other.assets {
            for (asset_name, quantity) in assets {
                *self
                    .assets
                    .entry(*policy)
                    .or_default()
                    .entry(asset_name.clone())
                    .or_default() += quantity;
            }
        }
        self
    }

    /// Subtract `other` from `self`, failing if any quantity would go negative. Assets that
    /// reach zero are pruned.
    pub fn checked_sub(&mut self, other: &Value) -> anyhow::Result<&mut Self> {
        self.lovelace = self.lovelace.checked_sub(other.lovelace).ok_or_else(|| {
            anyhow!(
                "lovelace: available={}, requested={}",
                self.lovelace,
                other.lovelace
            )
        })?;

        for (policy, assets) in &other.assets {
            for (asset_name, quantity) in assets {
                let held = self
                    .assets
                    .get_mut(policy)
                    .and_then(|held| held.get_mut(asset_name))
                    .ok_or_else(|| {
                        anyhow!("asset {policy}.{} not available", hex::encode(asset_name))
                    })?;

                *held = held.checked_sub(*quantity).ok_or_else(|| {
                    anyhow!(
                        "asset {policy}.{}: available={held}, requested={quantity}",
                        hex::encode(asset_name)
                    )
                })?;
            }
        }

        self.assets.retain(|_, assets| {
            assets.retain(|_, quantity| *quantity > 0);
            !assets.is_empty()
        });

        Ok(self)
    }
}

// ----------------------------------------------------------- Converting (from)

impl From<&pallas::Value> for Value {
    fn from(value: &pallas::Value) -> Self {
        match value {
            pallas::Value::Coin(lovelace) => Self::new(*lovelace),
            pallas::Value::Multiasset(lovelace, multiasset) => multiasset.iter().fold(
                Self::new(*lovelace),
                |value, (policy, assets)| {
                    assets.iter().fold(value, |value, (asset_name, quantity)| {
                        value.with_asset(
                            Hash::from(*policy),
                            asset_name.to_vec(),
                            u64::from(quantity),
                        )
                    })
                },
            ),
        }
    }
}

// ------------------------------------------------------------- Converting (to)

impl From<&Value> for pallas::Value {
    fn from(value: &Value) -> Self {
        let multiasset = pallas::NonEmptyKeyValuePairs::from_vec(
            value
                .assets
                .iter()
                .filter_map(|(policy, assets)| {
                    pallas::NonEmptyKeyValuePairs::from_vec(
                        assets
                            .iter()
                            .filter_map(|(asset_name, quantity)| {
                                let quantity = pallas::PositiveCoin::try_from(*quantity).ok()?;
                                Some((pallas::Bytes::from(asset_name.clone()), quantity))
                            })
                            .collect(),
                    )
                    .map(|assets| (pallas::Hash::from(*policy), assets))
                })
                .collect(),
        );

        match multiasset {
            Some(multiasset) => pallas::Value::Multiasset(value.lovelace, multiasset),
            None => pallas::Value::Coin(value.lovelace),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Hash, Value};

    fn policy() -> Hash<28> {
        Hash::from([7; 28])
    }

    #[test]
    fn sub_prunes_exhausted_assets() {
        let mut value = Value::new(5_000_000).with_asset(policy(), b"TOKEN".to_vec(), 10);

        value
            .checked_sub(&Value::new(1_000_000).with_asset(policy(), b"TOKEN".to_vec(), 10))
            .unwrap();

        assert_eq!(value, Value::new(4_000_000));
        assert!(value.is_lovelace_only());
    }

    #[test]
    fn sub_fails_on_insufficient_lovelace() {
        let mut value = Value::new(1_000_000);
        assert!(value.checked_sub(&Value::new(1_000_001)).is_err());
    }

    #[test]
    fn sub_fails_on_missing_asset() {
        let mut value = Value::new(10_000_000);
        let result = value.checked_sub(&Value::new(0).with_asset(policy(), vec![], 1));
        assert!(result.is_err());
    }

    #[test]
    fn add_merges_assets() {
        let mut value = Value::new(1).with_asset(policy(), vec![1], 2);
        value.add(&Value::new(2).with_asset(policy(), vec![1], 3));
        assert_eq!(value, Value::new(3).with_asset(policy(), vec![1], 5));
    }
}
