//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::ExecutionUnits;

/// The subset of protocol parameters needed to balance a transaction.
#[derive(Debug, Clone)]
pub struct ProtocolParameters {
    /// Multiplier coefficient on fee, in lovelace/bytes
    fee_per_byte: u64,

    /// Flat/fixed fee, in lovelace
    fee_constant: u64,

    /// Minimum ada deposit per byte of serialised output, in lovelace/bytes
    coins_per_utxo_byte: u64,

    /// Price of a single memory execution unit, in lovelace/unit
    price_mem: f64,

    /// Price of a single cpu execution unit, in lovelace/unit
    price_cpu: f64,

    /// Percentage of the fee to put up as collateral
    collateral_percent: u64,

    /// Cost model for Plutus version 3, in the ledger's canonical order
    plutus_v3_cost_model: Vec<i64>,
}

// ------------------------------------------------------------------ Inspecting

impl ProtocolParameters {
    /// Base transaction fee, computed from the size of a serialised transaction.
    pub fn base_fee(&self, size: u64) -> u64 {
        size * self.fee_per_byte + self.fee_constant
    }

    pub fn execution_cost(&self, ex_units: &ExecutionUnits) -> u64 {
        (self.price_mem * ex_units.mem() as f64).ceil() as u64
            + (self.price_cpu * ex_units.cpu() as f64).ceil() as u64
    }

    /// Smallest lovelace amount an output of the given serialised size may hold. The constant
    /// accounts for the input reference and map overhead the ledger adds to each UTxO entry.
    pub fn min_utxo_value(&self, output_size: u64) -> u64 {
        (160 + output_size) * self.coins_per_utxo_byte
    }

    pub fn minimum_collateral(&self, fee: u64) -> u64 {
        (fee * self.collateral_percent).div_ceil(100)
    }

    pub fn plutus_v3_cost_model(&self) -> &[i64] {
        &self.plutus_v3_cost_model
    }
}

// -------------------------------------------------------------------- Building

impl Default for ProtocolParameters {
    fn default() -> Self {
        Self {
            fee_per_byte: 0,
            fee_constant: 0,
            coins_per_utxo_byte: 0,
            price_mem: 0.0,
            price_cpu: 0.0,
            collateral_percent: 0,
            plutus_v3_cost_model: Vec::new(),
        }
    }
}

impl ProtocolParameters {
    pub fn with_fee_per_byte(mut self, fee_per_byte: u64) -> Self {
        self.fee_per_byte = fee_per_byte;
        self
    }

    pub fn with_fee_constant(mut self, fee_constant: u64) -> Self {
        self.fee_constant = fee_constant;
        self
    }

    pub fn with_coins_per_utxo_byte(mut self, coins_per_utxo_byte: u64) -> Self {
        self.coins_per_utxo_byte = coins_per_utxo_byte;
        self
    }

    pub fn with_execution_price_mem(mut self, price_mem: f64) -> Self {
        self.price_mem = price_mem;
        self
    }

    pub fn with_execution_price_cpu(mut self, price_cpu: f64) -> Self {
        self.price_cpu = price_cpu;
        self
    }

    pub fn with_collateral_percent(mut self, collateral_percent: u64) -> Self {
        self.collateral_percent = collateral_percent;
        self
    }

    pub fn with_plutus_v3_cost_model(mut self, cost_model: Vec<i64>) -> Self {
        self.plutus_v3_cost_model = cost_model;
        self
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    use crate::ProtocolParameters;

    /// Mimics PreProd's parameters; the cost model is truncated, which only matters to the
    /// script integrity hash.
    pub fn preprod_like() -> ProtocolParameters {
        ProtocolParameters::default()
            .with_fee_per_byte(44)
            .with_fee_constant(155381)
            .with_coins_per_utxo_byte(4310)
            .with_execution_price_mem(0.0577)
            .with_execution_price_cpu(7.21e-05)
            .with_collateral_percent(150)
            .with_plutus_v3_cost_model(vec![100788, 420, 1, 1, 1000, 173, 0, 1, 1000, 59957])
    }

    #[test]
    fn fees_and_deposits() {
        let params = preprod_like();
        assert_eq!(params.base_fee(300), 168581);
        assert_eq!(params.minimum_collateral(170001), 255002);
        assert_eq!(params.min_utxo_value(65), 969750);
    }
}
