//! Identities, keys and signature sets shared by the wallet components

use crate::crypto::{checksum, hash160, sha256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum number of entries a [`SignatureSet`] may carry
pub const MAX_SIGNATURES: usize = 64;

/// Version byte prefixed to addresses before Base58Check encoding
const ADDRESS_VERSION: u8 = 0x00;

/// Domain separator for transfer intent digests
const INTENT_DOMAIN: &[u8] = b"multisig-wallet/transfer/v1";

/// Errors from parsing textual addresses, keys and signatures
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid base58 encoding")]
    InvalidBase58,
    #[error("Invalid hex encoding")]
    InvalidHex,
    #[error("Invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },
    #[error("Address checksum mismatch")]
    InvalidChecksum,
    #[error("Unsupported address version: {0:#04x}")]
    InvalidVersion(u8),
    #[error("Signature must be formatted as <address>:<hex proof>")]
    InvalidSignatureFormat,
}

/// 20-byte account identity
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// The null identity, never a valid recipient
    pub const NULL: Address = Address([0u8; 20]);

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    /// Base58Check(version || hash)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut payload = Vec::with_capacity(25);
        payload.push(ADDRESS_VERSION);
        payload.extend_from_slice(&self.0);
        let check = checksum(&payload);
        payload.extend_from_slice(&check);
        f.write_str(&bs58::encode(payload).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s.trim())
            .into_vec()
            .map_err(|_| ParseError::InvalidBase58)?;
        if bytes.len() != 25 {
            return Err(ParseError::InvalidLength {
                expected: 25,
                got: bytes.len(),
            });
        }

        let (payload, check) = bytes.split_at(21);
        if checksum(payload)[..] != check[..] {
            return Err(ParseError::InvalidChecksum);
        }
        if payload[0] != ADDRESS_VERSION {
            return Err(ParseError::InvalidVersion(payload[0]));
        }

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload[1..]);
        Ok(Self(hash))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// 33-byte compressed secp256k1 public key
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 33]);

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Identity this key would have when registered as a signer
    pub fn address(&self) -> Address {
        Address(hash160(&self.0))
    }
}

impl From<[u8; 33]> for PublicKey {
    fn from(bytes: [u8; 33]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl FromStr for PublicKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim()).map_err(|_| ParseError::InvalidHex)?;
        let key: [u8; 33] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ParseError::InvalidLength {
                expected: 33,
                got: bytes.len(),
            })?;
        Ok(Self(key))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One slot of a signature set
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signature {
    /// Unused slot; scanning a set stops here
    Empty,
    /// Proof produced by the claimed signer
    Signed { signer: Address, proof: Vec<u8> },
}

impl Signature {
    pub fn signed(signer: Address, proof: Vec<u8>) -> Self {
        Signature::Signed { signer, proof }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Signature::Empty)
    }

    /// Claimed signer, if the slot is used
    pub fn signer(&self) -> Option<&Address> {
        match self {
            Signature::Empty => None,
            Signature::Signed { signer, .. } => Some(signer),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signature::Empty => f.write_str("-"),
            Signature::Signed { signer, proof } => write!(f, "{}:{}", signer, hex::encode(proof)),
        }
    }
}

impl FromStr for Signature {
    type Err = ParseError;

    /// `-` is an empty slot, anything else is `<address>:<hex proof>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "-" {
            return Ok(Signature::Empty);
        }
        let (signer, proof) = s.split_once(':').ok_or(ParseError::InvalidSignatureFormat)?;
        let signer = signer.parse()?;
        let proof = hex::decode(proof).map_err(|_| ParseError::InvalidHex)?;
        Ok(Signature::Signed { signer, proof })
    }
}

/// Ordered signature slots, bounded by [`MAX_SIGNATURES`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SignatureSet(Vec<Signature>);

impl SignatureSet {
    /// Validate the length at the boundary
    pub fn new(signatures: Vec<Signature>) -> Result<Self, super::MultisigError> {
        if signatures.len() > MAX_SIGNATURES {
            return Err(super::MultisigError::TooManySignatures {
                count: signatures.len(),
                max: MAX_SIGNATURES,
            });
        }
        Ok(Self(signatures))
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Signature> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Signature] {
        &self.0
    }
}

impl TryFrom<Vec<Signature>> for SignatureSet {
    type Error = super::MultisigError;

    fn try_from(signatures: Vec<Signature>) -> Result<Self, Self::Error> {
        Self::new(signatures)
    }
}

impl<'de> Deserialize<'de> for SignatureSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let signatures = Vec::<Signature>::deserialize(deserializer)?;
        Self::new(signatures).map_err(serde::de::Error::custom)
    }
}

/// The message signers approve: a specific transfer out of a specific
/// wallet at a specific nonce
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferIntent {
    pub wallet: Address,
    pub recipient: Address,
    pub amount: u128,
    pub nonce: u64,
}

impl TransferIntent {
    /// SHA-256 over the canonical encoding
    pub fn signing_data(&self) -> [u8; 32] {
        let mut data = Vec::with_capacity(INTENT_DOMAIN.len() + 20 + 20 + 16 + 8);
        data.extend_from_slice(INTENT_DOMAIN);
        data.extend_from_slice(self.wallet.as_bytes());
        data.extend_from_slice(self.recipient.as_bytes());
        data.extend_from_slice(&self.amount.to_be_bytes());
        data.extend_from_slice(&self.nonce.to_be_bytes());
        sha256(&data)
    }
}

/// Record handed to the broadcaster once a transfer has been debited
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub amount: u128,
    pub nonce: u64,
    pub executed_at: DateTime<Utc>,
}
