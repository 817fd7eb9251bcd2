//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Hash, pallas};
use std::fmt;

/// The _blake2b-224_ digest of either a verification key or a script, as found in the payment
/// or delegation part of a Shelley address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Credential {
    Key(Hash<28>),
    Script(Hash<28>),
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(hash) => write!(f, "Key({hash})"),
            Self::Script(hash) => write!(f, "Script({hash})"),
        }
    }
}

// ------------------------------------------------------------------ Inspecting

impl Credential {
    pub fn as_key(&self) -> Option<Hash<28>> {
        match self {
            Self::Key(hash) => Some(*hash),
            Self::Script(..) => None,
        }
    }

    pub fn as_script(&self) -> Option<Hash<28>> {
        match self {
            Self::Key(..) => None,
            Self::Script(hash) => Some(*hash),
        }
    }
}

// ----------------------------------------------------------- Converting (from)

impl From<&pallas::ShelleyPaymentPart> for Credential {
    fn from(part: &pallas::ShelleyPaymentPart) -> Self {
        match part {
            pallas::ShelleyPaymentPart::Key(hash) => Self::Key(Hash::from(*hash)),
            pallas::ShelleyPaymentPart::Script(hash) => Self::Script(Hash::from(*hash)),
        }
    }
}

// ------------------------------------------------------------- Converting (to)

impl From<Credential> for pallas::ShelleyPaymentPart {
    fn from(credential: Credential) -> Self {
        match credential {
            Credential::Key(hash) => Self::Key(pallas::Hash::from(hash)),
            Credential::Script(hash) => Self::Script(pallas::Hash::from(hash)),
        }
    }
}

impl From<Credential> for pallas::ShelleyDelegationPart {
    fn from(credential: Credential) -> Self {
        match credential {
            Credential::Key(hash) => Self::Key(pallas::Hash::from(hash)),
            Credential::Script(hash) => Self::Script(pallas::Hash::from(hash)),
        }
    }
}
