//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

pub use pallas_addresses::*;
pub use pallas_crypto::*;
pub use pallas_primitives::{conway::*, *};
pub use pallas_codec::utils::CborWrap;
