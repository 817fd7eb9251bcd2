//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Hash, pallas};
use std::fmt;

/// An ed25519 signing key, either plain or BIP32-extended (as derived from a mnemonic).
pub struct SigningKey(pallas_wallet::PrivateKey);

/// The public counterpart of a [`SigningKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationKey(pallas::key::ed25519::PublicKey);

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey(vk={})", self.verification_key())
    }
}

impl fmt::Display for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.as_bytes()))
    }
}

// -------------------------------------------------------------------- Building

impl SigningKey {
    /// A non-extended key from its 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self(pallas_wallet::PrivateKey::Normal(
            pallas::key::ed25519::SecretKey::from(seed),
        ))
    }
}

impl From<pallas_wallet::PrivateKey> for SigningKey {
    fn from(key: pallas_wallet::PrivateKey) -> Self {
        Self(key)
    }
}

// ------------------------------------------------------------------ Inspecting

impl SigningKey {
    pub fn verification_key(&self) -> VerificationKey {
        VerificationKey(self.0.public_key())
    }

    /// Sign an arbitrary message; returns the 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.0.sign(message).as_ref().to_vec()
    }
}

impl VerificationKey {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// The key hash, as used in payment credentials and required signers.
    pub fn hash(&self) -> Hash<28> {
        Hash::blake2b_224(self.as_bytes())
    }

    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        <[u8; 64]>::try_from(signature)
            .map(|bytes| {
                self.0
                    .verify(message, &pallas::key::ed25519::Signature::from(bytes))
            })
            .unwrap_or(false)
    }
}
