//! Authorized signer registry
//!
//! Maps each signer identity to the one public key its proofs are checked
//! against. Bounded at [`SIGNER_CAPACITY`] entries.

use super::error::{MultisigError, Result};
use super::types::{Address, PublicKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of authorized signers
pub const SIGNER_CAPACITY: usize = 64;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignerRegistry {
    signers: BTreeMap<Address, PublicKey>,
}

impl SignerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a signer, or replace the key of one already present
    ///
    /// # Errors
    /// `CapacityExceeded` when `identity` is new and the registry is full.
    pub fn add(&mut self, identity: Address, public_key: PublicKey) -> Result<()> {
        if !self.signers.contains_key(&identity) && self.signers.len() >= SIGNER_CAPACITY {
            return Err(MultisigError::CapacityExceeded {
                capacity: SIGNER_CAPACITY,
            });
        }
        self.signers.insert(identity, public_key);
        Ok(())
    }

    /// Remove a signer. Absent identities are ignored.
    pub fn remove(&mut self, identity: &Address) -> Option<PublicKey> {
        self.signers.remove(identity)
    }

    pub fn contains(&self, identity: &Address) -> bool {
        self.signers.contains_key(identity)
    }

    pub fn lookup(&self, identity: &Address) -> Result<&PublicKey> {
        self.signers
            .get(identity)
            .ok_or(MultisigError::UnknownSigner(*identity))
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }

    /// Signers in identity order
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &PublicKey)> {
        self.signers.iter()
    }

    pub fn clear(&mut self) {
        self.signers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    fn signer() -> (Address, PublicKey) {
        let kp = KeyPair::generate();
        (kp.address(), kp.public_key())
    }

    #[test]
    fn test_add_and_lookup() {
        let mut registry = SignerRegistry::new();
        let (id, key) = signer();

        registry.add(id, key).unwrap();
        assert!(registry.contains(&id));
        assert_eq!(registry.lookup(&id).unwrap(), &key);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_add_same_key_twice_is_idempotent() {
        let mut registry = SignerRegistry::new();
        let (id, key) = signer();

        registry.add(id, key).unwrap();
        registry.add(id, key).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup(&id).unwrap(), &key);
    }

    #[test]
    fn test_overwrite_last_write_wins() {
        let mut registry = SignerRegistry::new();
        let (id, first) = signer();
        let (_, second) = signer();

        registry.add(id, first).unwrap();
        registry.add(id, second).unwrap();
        assert_eq!(registry.lookup(&id).unwrap(), &second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = SignerRegistry::new();
        let (id, _) = signer();
        assert!(matches!(
            registry.lookup(&id),
            Err(MultisigError::UnknownSigner(missing)) if missing == id
        ));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut registry = SignerRegistry::new();
        let (id, key) = signer();
        registry.add(id, key).unwrap();
        let before = registry.clone();

        let (absent, _) = signer();
        assert_eq!(registry.remove(&absent), None);
        assert_eq!(registry, before);

        assert_eq!(registry.remove(&id), Some(key));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_capacity() {
        let mut registry = SignerRegistry::new();
        let key = KeyPair::generate().public_key();
        for i in 0..SIGNER_CAPACITY {
            let mut bytes = [0u8; 20];
            bytes[0] = i as u8;
            bytes[19] = 1;
            registry.add(Address::from_bytes(bytes), key).unwrap();
        }
        assert_eq!(registry.len(), SIGNER_CAPACITY);

        let extra = Address::from_bytes([0xff; 20]);
        assert!(matches!(
            registry.add(extra, key),
            Err(MultisigError::CapacityExceeded { capacity: 64 })
        ));
        assert!(!registry.contains(&extra));

        // Overwriting an existing signer still works when full
        let mut first = [0u8; 20];
        first[19] = 1;
        let replacement = KeyPair::generate().public_key();
        registry.add(Address::from_bytes(first), replacement).unwrap();
        assert_eq!(
            registry.lookup(&Address::from_bytes(first)).unwrap(),
            &replacement
        );
    }
}
