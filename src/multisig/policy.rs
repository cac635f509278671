//! Signature threshold policy
//!
//! Decides whether a signature set authorizes a message. Scanning rules:
//!
//! - entries are visited left to right and the scan stops at the first
//!   [`Signature::Empty`] slot;
//! - a signer missing from the registry aborts with `UnauthorizedSigner`;
//! - a signer seen earlier in the same set aborts with `DuplicateSigner`;
//! - the first proof the verifier rejects ends the scan with `false`,
//!   remaining entries are never looked at;
//! - otherwise the set passes when the number of visited entries reaches
//!   the required count.
//!
//! Counting visited entries alone would let one key, repeated M times,
//! satisfy any threshold. The threshold counts distinct signers, so a repeat
//! is rejected outright rather than skipped; a set carrying a repeated entry
//! was built wrong and should not be half-accepted. For sets without
//! repeats the visited count and the distinct count are the same number.

use super::error::{MultisigError, Result};
use super::interfaces::SignatureVerifier;
use super::registry::SignerRegistry;
use super::types::{Signature, SignatureSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    required_signatures: u32,
}

impl ThresholdPolicy {
    pub fn new(required_signatures: u32) -> Self {
        Self {
            required_signatures,
        }
    }

    pub fn required(&self) -> u32 {
        self.required_signatures
    }

    /// Replace the threshold. Not checked against the registry size.
    pub fn set_required(&mut self, required_signatures: u32) {
        self.required_signatures = required_signatures;
    }

    /// True when the threshold can currently be met by `registry`
    pub fn is_reachable(&self, registry: &SignerRegistry) -> bool {
        self.required_signatures as usize <= registry.len()
    }

    /// Check `signatures` over `message`
    ///
    /// # Errors
    /// `UnauthorizedSigner` or `DuplicateSigner`; these are never folded
    /// into an `Ok(false)`.
    pub fn verify<V>(
        &self,
        signatures: &SignatureSet,
        message: &[u8],
        registry: &SignerRegistry,
        verifier: &V,
    ) -> Result<bool>
    where
        V: SignatureVerifier + ?Sized,
    {
        let mut seen = BTreeSet::new();
        let mut visited: usize = 0;

        for (slot, signature) in signatures.iter().enumerate() {
            let (signer, proof) = match signature {
                Signature::Empty => break,
                Signature::Signed { signer, proof } => (signer, proof),
            };

            let public_key = registry
                .lookup(signer)
                .map_err(|_| MultisigError::UnauthorizedSigner(*signer))?;

            if !seen.insert(*signer) {
                return Err(MultisigError::DuplicateSigner(*signer));
            }
            visited += 1;

            if !verifier.verify(proof, public_key, message) {
                log::debug!("Signature in slot {} from {} is invalid", slot, signer);
                return Ok(false);
            }
        }

        Ok(visited >= self.required_signatures as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{sha256, KeyPair, Secp256k1Verifier};
    use crate::multisig::testing::SpyVerifier;

    struct Fixture {
        keys: Vec<KeyPair>,
        registry: SignerRegistry,
        message: [u8; 32],
    }

    fn fixture(signers: usize) -> Fixture {
        let keys: Vec<KeyPair> = (0..signers).map(|_| KeyPair::generate()).collect();
        let mut registry = SignerRegistry::new();
        for key in &keys {
            registry.add(key.address(), key.public_key()).unwrap();
        }
        Fixture {
            keys,
            registry,
            message: sha256(b"approve transfer"),
        }
    }

    fn sign(key: &KeyPair, message: &[u8]) -> Signature {
        Signature::signed(key.address(), key.sign(message).unwrap())
    }

    fn set(signatures: Vec<Signature>) -> SignatureSet {
        SignatureSet::new(signatures).unwrap()
    }

    #[test]
    fn test_threshold_met() {
        let f = fixture(3);
        let policy = ThresholdPolicy::new(2);
        let sigs = set(vec![sign(&f.keys[0], &f.message), sign(&f.keys[1], &f.message)]);

        let verifier = Secp256k1Verifier::new();
        assert!(policy.verify(&sigs, &f.message, &f.registry, &verifier).unwrap());
    }

    #[test]
    fn test_fewer_entries_than_required() {
        let f = fixture(3);
        let policy = ThresholdPolicy::new(3);
        let sigs = set(vec![sign(&f.keys[0], &f.message), sign(&f.keys[1], &f.message)]);

        let verifier = Secp256k1Verifier::new();
        assert!(!policy.verify(&sigs, &f.message, &f.registry, &verifier).unwrap());
    }

    #[test]
    fn test_all_empty_set() {
        let f = fixture(1);
        let verifier = Secp256k1Verifier::new();
        let empty = set(vec![Signature::Empty; 4]);

        assert!(!ThresholdPolicy::new(1)
            .verify(&empty, &f.message, &f.registry, &verifier)
            .unwrap());
        assert!(ThresholdPolicy::new(0)
            .verify(&empty, &f.message, &f.registry, &verifier)
            .unwrap());
        assert!(ThresholdPolicy::new(0)
            .verify(&SignatureSet::empty(), &f.message, &f.registry, &verifier)
            .unwrap());
    }

    #[test]
    fn test_unregistered_signer_is_hard_error() {
        let f = fixture(2);
        let outsider = KeyPair::generate();
        let sigs = set(vec![sign(&f.keys[0], &f.message), sign(&outsider, &f.message)]);

        let verifier = Secp256k1Verifier::new();
        let result = ThresholdPolicy::new(2).verify(&sigs, &f.message, &f.registry, &verifier);
        assert!(matches!(
            result,
            Err(MultisigError::UnauthorizedSigner(who)) if who == outsider.address()
        ));
    }

    #[test]
    fn test_invalid_proof_short_circuits() {
        let f = fixture(3);
        let other_message = sha256(b"something else");
        let sigs = set(vec![
            sign(&f.keys[0], &other_message),
            sign(&f.keys[1], &f.message),
            sign(&f.keys[2], &f.message),
        ]);

        let spy = SpyVerifier::new(Secp256k1Verifier::new());
        let result = ThresholdPolicy::new(1).verify(&sigs, &f.message, &f.registry, &spy);
        assert!(!result.unwrap());
        assert_eq!(spy.calls(), 1);
    }

    #[test]
    fn test_scan_stops_at_first_empty_slot() {
        let f = fixture(2);
        let outsider = KeyPair::generate();
        let sigs = set(vec![
            sign(&f.keys[0], &f.message),
            Signature::Empty,
            // Never reached, so it cannot raise UnauthorizedSigner
            sign(&outsider, &f.message),
            sign(&f.keys[1], &f.message),
        ]);

        let spy = SpyVerifier::new(Secp256k1Verifier::new());
        assert!(ThresholdPolicy::new(1)
            .verify(&sigs, &f.message, &f.registry, &spy)
            .unwrap());
        assert!(!ThresholdPolicy::new(2)
            .verify(&sigs, &f.message, &f.registry, &spy)
            .unwrap());
        assert_eq!(spy.calls(), 2);
    }

    #[test]
    fn test_duplicate_signer_rejected() {
        let f = fixture(2);
        let sigs = set(vec![sign(&f.keys[0], &f.message), sign(&f.keys[0], &f.message)]);

        let verifier = Secp256k1Verifier::new();
        let result = ThresholdPolicy::new(2).verify(&sigs, &f.message, &f.registry, &verifier);
        assert!(matches!(result, Err(MultisigError::DuplicateSigner(_))));
    }

    #[test]
    fn test_unreachable_threshold_is_allowed() {
        let f = fixture(2);
        let mut policy = ThresholdPolicy::new(1);
        policy.set_required(5);
        assert_eq!(policy.required(), 5);
        assert!(!policy.is_reachable(&f.registry));

        let sigs = set(vec![sign(&f.keys[0], &f.message), sign(&f.keys[1], &f.message)]);
        let verifier = Secp256k1Verifier::new();
        assert!(!policy.verify(&sigs, &f.message, &f.registry, &verifier).unwrap());
    }
}
