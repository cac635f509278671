//! Cryptographic utilities for the wallet
//!
//! This module provides:
//! - SHA-256 / RIPEMD-160 hashing for addresses and signing digests
//! - ECDSA key pairs (secp256k1) for producing signer proofs
//! - The default [`SignatureVerifier`](crate::multisig::SignatureVerifier) adapter

pub mod hash;
pub mod keys;

pub use hash::{checksum, double_sha256, hash160, sha256};
pub use keys::{sign_digest, verify_digest, KeyError, KeyPair, Secp256k1Verifier};
