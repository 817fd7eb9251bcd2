//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Hash, pallas};
use std::fmt;

/// A reference to a past transaction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Input {
    transaction_id: Hash<32>,
    output_index: u64,
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.transaction_id, self.output_index)
    }
}

// -------------------------------------------------------------------- Building

impl Input {
    pub fn new(transaction_id: Hash<32>, output_index: u64) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }
}

// ------------------------------------------------------------------ Inspecting

impl Input {
    pub fn transaction_id(&self) -> Hash<32> {
        self.transaction_id
    }

    pub fn output_index(&self) -> u64 {
        self.output_index
    }
}

// ----------------------------------------------------------- Converting (from)

impl From<&pallas::TransactionInput> for Input {
    fn from(input: &pallas::TransactionInput) -> Self {
        Self::new(Hash::from(input.transaction_id), input.index)
    }
}

// ------------------------------------------------------------- Converting (to)

impl From<Input> for pallas::TransactionInput {
    fn from(input: Input) -> Self {
        pallas::TransactionInput {
            transaction_id: pallas::Hash::from(input.transaction_id),
            index: input.output_index,
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    use crate::{Input, cardano::hash::tests::generators::hash32};
    use proptest::prelude::*;

    pub mod generators {
        use super::*;

        pub fn input() -> impl Strategy<Value = Input> {
            (hash32(), 0..16u64).prop_map(|(id, ix)| Input::new(id, ix))
        }
    }
}
