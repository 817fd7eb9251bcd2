//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

pub use pallas_codec::minicbor::*;
use std::convert::Infallible;

/// Writing CBOR into a vector cannot fail, so this spares callers from handling an error that
/// [`encode`] must otherwise expose for arbitrary writers.
pub trait ToCbor {
    fn to_cbor(&self) -> Vec<u8>;
}

impl<T: Encode<()>> ToCbor for T {
    fn to_cbor(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        let _: Result<(), encode::Error<Infallible>> = encode(self, &mut bytes);
        bytes
    }
}
