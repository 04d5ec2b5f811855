//! Signer abstraction.
//!
//! Signing material does not have to be available synchronously: a signer
//! may suspend, for example on an out-of-process HSM round trip. In-process
//! keys get a blanket implementation over [`KeyPair`].

use async_trait::async_trait;
use meridian_types::{KeyPair, PublicKey, Signature};

/// Produces signatures for one public key.
///
/// Registered on a transaction via `sign_with`; registrations are
/// de-duplicated by the key's raw bytes, first registration wins.
#[async_trait]
pub trait Signer: Send + Sync {
    /// The verifying key this signer signs for.
    fn public_key(&self) -> PublicKey;

    /// Sign `message`. Possible suspension point.
    async fn sign(&self, message: &[u8]) -> Signature;
}

#[async_trait]
impl Signer for KeyPair {
    fn public_key(&self) -> PublicKey {
        KeyPair::public_key(self)
    }

    async fn sign(&self, message: &[u8]) -> Signature {
        KeyPair::sign(self, message)
    }
}
