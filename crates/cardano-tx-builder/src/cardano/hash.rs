//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::pallas;
use anyhow::anyhow;
use std::{fmt, str::FromStr};

/// A _blake2b_ digest; 28 bytes for credentials and scripts, 32 bytes for transactions and
/// datums.
///
/// ```rust
/// # use cardano_tx_builder::Hash;
/// let id: Hash<32> = "2c1c2ea1e0e6b1b66a2d1fea7a4d0a28e8e0c1c8f2fb2a2fe3c2e69c63f80a4d"
///     .parse()
///     .unwrap();
/// assert_eq!(id.as_ref()[0], 0x2c);
/// assert!("2c1c".parse::<Hash<32>>().is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Hash<const SIZE: usize>(pallas::Hash<SIZE>);

impl<const SIZE: usize> fmt::Debug for Hash<SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash<{SIZE}>({self})")
    }
}

impl<const SIZE: usize> fmt::Display for Hash<SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0.as_ref()))
    }
}

// -------------------------------------------------------------------- Building

impl Hash<28> {
    pub fn blake2b_224(bytes: &[u8]) -> Self {
        Self(pallas::hash::Hasher::<224>::hash(bytes))
    }
}

impl Hash<32> {
    pub fn blake2b_256(bytes: &[u8]) -> Self {
        Self(pallas::hash::Hasher::<256>::hash(bytes))
    }
}

// ----------------------------------------------------------- Converting (from)

impl<const SIZE: usize> FromStr for Hash<SIZE> {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let bytes = hex::decode(s.trim()).map_err(|e| anyhow!("malformed hex digest: {e}"))?;
        Self::try_from(bytes.as_slice())
    }
}

impl<const SIZE: usize> TryFrom<&[u8]> for Hash<SIZE> {
    type Error = anyhow::Error;

    fn try_from(bytes: &[u8]) -> anyhow::Result<Self> {
        <[u8; SIZE]>::try_from(bytes).map(Self::from).map_err(|_| {
            anyhow!(
                "invalid digest length; expected {SIZE} bytes, got {} bytes",
                bytes.len()
            )
        })
    }
}

impl<const SIZE: usize> From<[u8; SIZE]> for Hash<SIZE> {
    fn from(bytes: [u8; SIZE]) -> Self {
        Self(pallas::Hash::new(bytes))
    }
}

impl<const SIZE: usize> From<pallas::Hash<SIZE>> for Hash<SIZE> {
    fn from(hash: pallas::Hash<SIZE>) -> Self {
        Self(hash)
    }
}

// ------------------------------------------------------------- Converting (to)

impl<const SIZE: usize> From<Hash<SIZE>> for pallas::Hash<SIZE> {
    fn from(hash: Hash<SIZE>) -> Self {
        hash.0
    }
}

impl<const SIZE: usize> AsRef<[u8]> for Hash<SIZE> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    use crate::Hash;
    use proptest::prelude::*;

    pub mod generators {
        use super::*;

        pub fn hash28() -> impl Strategy<Value = Hash<28>> {
            any::<[u8; 28]>().prop_map(Hash::from)
        }

        pub fn hash32() -> impl Strategy<Value = Hash<32>> {
            any::<[u8; 32]>().prop_map(Hash::from)
        }
    }

    proptest! {
        #[test]
        fn display_then_parse(hash in generators::hash32()) {
            prop_assert_eq!(hash.to_string().parse::<Hash<32>>().unwrap(), hash);
        }
    }

    #[test]
    fn blake2b_224_of_empty_input() {
        assert_eq!(
            Hash::blake2b_224(&[]).to_string(),
            "836cc68931c2e4e3e838602eca1902591d216837bafddfe6f0c8cb07"
        );
    }
}
