//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{ExecutionUnits, RedeemerPointer};
use std::collections::BTreeMap;

/// Something able to run the Plutus scripts of a serialised transaction and report the
/// execution budget each redeemer needs. Inputs are expected to exist on-chain.
#[allow(async_fn_in_trait)]
pub trait Evaluate {
    async fn evaluate(
        &self,
        serialized_tx: &[u8],
    ) -> anyhow::Result<BTreeMap<RedeemerPointer, ExecutionUnits>>;
}
