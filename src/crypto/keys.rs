//! ECDSA key management for wallet signers
//!
//! Signers hold secp256k1 key pairs; the wallet only ever sees their
//! compressed public keys and the compact signatures they produce over a
//! transfer intent digest.

use rand::rngs::OsRng;
use secp256k1::{ecdsa, Message, Secp256k1, SecretKey, VerifyOnly};
use thiserror::Error;

use super::hash::sha256;
use crate::multisig::{Address, PublicKey, Signature, SignatureVerifier, TransferIntent};

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid signature encoding")]
    InvalidSignature,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A signer's key pair
#[derive(Clone)]
pub struct KeyPair {
    secret_key: SecretKey,
    public_key: secp256k1::PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = secp256k1::PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_key.trim()).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Compressed public key as registered with a wallet
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from(self.public_key.serialize())
    }

    /// Signer identity derived from the public key
    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    /// Sign a message with the private key, returning a compact signature
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, KeyError> {
        sign_digest(&self.secret_key, message)
    }

    /// Produce this signer's entry for a signature set over `intent`
    pub fn sign_intent(&self, intent: &TransferIntent) -> Result<Signature, KeyError> {
        let proof = self.sign(&intent.signing_data())?;
        Ok(Signature::signed(self.address(), proof))
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Messages that are not already a 32-byte digest are hashed first
fn to_message(message: &[u8]) -> Result<Message, KeyError> {
    let digest = if message.len() == 32 {
        let mut digest = [0u8; 32];
        digest.copy_from_slice(message);
        digest
    } else {
        sha256(message)
    };
    Ok(Message::from_digest_slice(&digest)?)
}

/// Sign a message with a secret key
pub fn sign_digest(secret_key: &SecretKey, message: &[u8]) -> Result<Vec<u8>, KeyError> {
    let secp = Secp256k1::signing_only();
    let message = to_message(message)?;
    let signature = secp.sign_ecdsa(&message, secret_key);
    Ok(signature.serialize_compact().to_vec())
}

/// Verify a compact signature against a public key
///
/// Malformed keys or signature encodings are errors; a well-formed signature
/// that does not match is `Ok(false)`.
pub fn verify_digest(
    public_key: &PublicKey,
    message: &[u8],
    signature: &[u8],
) -> Result<bool, KeyError> {
    let secp = Secp256k1::verification_only();
    verify_with(&secp, public_key, message, signature)
}

fn verify_with(
    secp: &Secp256k1<VerifyOnly>,
    public_key: &PublicKey,
    message: &[u8],
    signature: &[u8],
) -> Result<bool, KeyError> {
    let key = secp256k1::PublicKey::from_slice(public_key.as_bytes())
        .map_err(|_| KeyError::InvalidPublicKey)?;
    let sig = ecdsa::Signature::from_compact(signature).map_err(|_| KeyError::InvalidSignature)?;
    let message = to_message(message)?;

    Ok(secp.verify_ecdsa(&message, &sig, &key).is_ok())
}

/// [`SignatureVerifier`] backed by secp256k1 ECDSA
pub struct Secp256k1Verifier {
    secp: Secp256k1<VerifyOnly>,
}

impl Secp256k1Verifier {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::verification_only(),
        }
    }
}

impl Default for Secp256k1Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureVerifier for Secp256k1Verifier {
    fn verify(&self, proof: &[u8], public_key: &PublicKey, message: &[u8]) -> bool {
        match verify_with(&self.secp, public_key, message, proof) {
            Ok(valid) => valid,
            Err(e) => {
                log::debug!("Rejecting malformed signature: {}", e);
                false
            }
        }
    }
}
