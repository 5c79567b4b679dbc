//! Identity derivation for the Attribute Exchange Platform
//!
//! This module provides Address derivation from public keys.
//! Owned by: agent-identity
//!
//! # Address Format
//!
//! An Address is derived from a public key as follows:
//! 1. Compute blake3 hash of the 32-byte Ed25519 public key
//! 2. Use the full 32-byte hash as the Address
//!
//! This provides 256-bit collision resistance matching the types::Address
//! format. Signing itself is owned by the external account layer; the key
//! pair here exists so identity-scoped tests and proof-building processors
//! have a local signing capability available.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;

use crate::types::Address;

/// An Ed25519 key pair backing one identity.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new random key pair.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Create a key pair from a 32-byte secret.
    #[must_use]
    pub fn from_bytes(secret: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(secret),
        }
    }

    /// Returns the public half of the key pair.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Sign a message with the secret half of the key pair.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }
}

/// An Ed25519 public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Returns the raw 32 key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.verifying_key.as_bytes()
    }

    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        self.verifying_key.verify(message, &signature).is_ok()
    }
}

/// Derive an Address from a public key
///
/// Uses blake3 hash of the public key to produce a deterministic
/// 32-byte Address that can be used with attribute and notification types.
///
/// # Example
///
/// ```
/// use wallet_core::identity::{KeyPair, derive_address};
///
/// let keypair = KeyPair::generate();
/// let address = derive_address(&keypair.public_key());
///
/// // Same key always produces same Address
/// let address2 = derive_address(&keypair.public_key());
/// assert_eq!(address, address2);
/// ```
pub fn derive_address(public_key: &PublicKey) -> Address {
    let hash = blake3::hash(public_key.as_bytes());
    let bytes: [u8; 32] = *hash.as_bytes();
    Address::from_bytes(bytes)
}

/// Extension trait to derive an Address from a PublicKey
pub trait PublicKeyExt {
    /// Derive the Address from this public key
    fn address(&self) -> Address;
}

impl PublicKeyExt for PublicKey {
    fn address(&self) -> Address {
        derive_address(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_address_format() {
        let keypair = KeyPair::generate();
        let address = derive_address(&keypair.public_key());

        // Should be 64 hex characters (32 bytes)
        assert_eq!(address.to_string().len(), 64);
        assert!(address.to_string().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_derive_address_deterministic() {
        let secret = [42u8; 32];
        let keypair1 = KeyPair::from_bytes(&secret);
        let keypair2 = KeyPair::from_bytes(&secret);

        let a1 = derive_address(&keypair1.public_key());
        let a2 = derive_address(&keypair2.public_key());

        assert_eq!(a1, a2);
    }

    #[test]
    fn test_different_keys_different_addresses() {
        let keypair1 = KeyPair::generate();
        let keypair2 = KeyPair::generate();

        let a1 = derive_address(&keypair1.public_key());
        let a2 = derive_address(&keypair2.public_key());

        assert_ne!(a1, a2);
    }

    #[test]
    fn test_public_key_ext_trait() {
        let keypair = KeyPair::generate();

        let a1 = keypair.public_key().address();
        let a2 = derive_address(&keypair.public_key());

        assert_eq!(a1, a2);
    }

    #[test]
    fn test_sign_and_verify() {
        let keypair = KeyPair::generate();
        let message = b"attribute content digest";

        let signature = keypair.sign(message);
        assert!(keypair.public_key().verify(message, &signature));
        assert!(!keypair.public_key().verify(b"other message", &signature));
    }

    #[test]
    fn test_verify_rejects_garbage_signature() {
        let keypair = KeyPair::generate();
        assert!(!keypair.public_key().verify(b"message", &[0u8; 3]));
    }
}
