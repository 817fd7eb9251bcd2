//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Address, Output, Value};
use anyhow::anyhow;

/// Where the builder puts whatever is left once outputs and fee are paid for.
#[derive(Debug, Clone, Default)]
pub enum ChangeStrategy {
    #[default]
    Unspecified,
    AsLastOutput(Address),
    AsFirstOutput(Address),
}

impl ChangeStrategy {
    pub fn as_last_output(change_address: Address) -> Self {
        Self::AsLastOutput(change_address)
    }

    pub fn as_first_output(change_address: Address) -> Self {
        Self::AsFirstOutput(change_address)
    }

    pub fn address(&self) -> Option<&Address> {
        match self {
            Self::Unspecified => None,
            Self::AsLastOutput(address) | Self::AsFirstOutput(address) => Some(address),
        }
    }

    pub fn apply(&self, change: Value, outputs: &mut Vec<Output>) -> anyhow::Result<()> {
        match self {
            Self::Unspecified => Err(anyhow!(
                "no explicit change strategy defined; use 'with_change_strategy' to define one."
            )),
            Self::AsLastOutput(address) => {
                outputs.push(Output::new(address.clone(), change));
                Ok(())
            }
            Self::AsFirstOutput(address) => {
                outputs.insert(0, Output::new(address.clone(), change));
                Ok(())
            }
        }
    }
}
