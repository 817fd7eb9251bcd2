//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

pub mod cbor;

mod cardano;
pub use cardano::{
    // Re-export types for easier consumption.
    //
    // NOTE: This main function of this comment is to force the formatter to put one import per
    // line in the following import list; making diffs and extensions easier.
    address::Address,
    change_strategy::ChangeStrategy,
    credential::Credential,
    evaluate::Evaluate,
    execution_units::ExecutionUnits,
    hash::Hash,
    input::Input,
    network_id::NetworkId,
    output::{Datum, Output},
    plutus_data::PlutusData,
    plutus_script::PlutusScript,
    plutus_version::PlutusVersion,
    protocol_parameters::ProtocolParameters,
    redeemer_pointer::RedeemerPointer,
    signing_key::{SigningKey, VerificationKey},
    transaction::{BalanceError, Transaction},
    value::Value,
};

mod pallas;

#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    pub use crate::cardano::protocol_parameters::tests::preprod_like;

    pub mod generators {
        pub use crate::cardano::{
            hash::tests::generators::{hash28, hash32},
            input::tests::generators::input,
        };
    }
}
