//! Transaction batches and their canonical content hash.

use std::{fmt, str::FromStr};

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::ParseError;

/// Length of a [`BatchHash`] in bytes.
pub const BATCH_HASH_LEN: usize = 32;

/// Tag byte preceding each transaction in the canonical encoding.
///
/// Field 1 with the length-delimited wire type, so the encoding is identical
/// to the protobuf encoding of `message Batch { repeated bytes transactions = 1; }`.
const TRANSACTION_FIELD_TAG: u8 = 0x0a;

/// Maximum length of an unsigned LEB128 encoded `u64`.
const MAX_VARINT_LEN: usize = 10;

type RawBatchHash = [u8; BATCH_HASH_LEN];

/// Content hash of a [`Batch`].
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct BatchHash(#[serde(with = "hex::serde")] RawBatchHash);

impl BatchHash {
    pub const fn new(raw: RawBatchHash) -> Self {
        Self(raw)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> RawBatchHash {
        self.0
    }
}

impl From<RawBatchHash> for BatchHash {
    fn from(value: RawBatchHash) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for BatchHash {
    type Error = ParseError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let raw: RawBatchHash = value.try_into().map_err(|_| ParseError::InvalidLength {
            expected: BATCH_HASH_LEN,
            got: value.len(),
        })?;
        Ok(Self(raw))
    }
}

impl AsRef<[u8]> for BatchHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for BatchHash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut raw = [0; BATCH_HASH_LEN];
        hex::decode_to_slice(s, &mut raw)?;
        Ok(Self(raw))
    }
}

impl<'de> Deserialize<'de> for BatchHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

impl fmt::Display for BatchHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for BatchHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BatchHash({})", hex::encode(self.0))
    }
}

/// Ordered transactions derived from one DA height within one namespace.
///
/// The order is the order in which the DA layer reported the blob identifiers
/// and is part of the batch's identity.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Batch {
    transactions: Vec<Vec<u8>>,
}

impl Batch {
    pub fn new(transactions: Vec<Vec<u8>>) -> Self {
        Self { transactions }
    }

    /// A batch without transactions, derived from a height with no blobs.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn transactions(&self) -> &[Vec<u8>] {
        &self.transactions
    }

    pub fn into_transactions(self) -> Vec<Vec<u8>> {
        self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn hash(&self) -> BatchHash {
        compute_batch_hash(&self.transactions)
    }
}

impl From<Vec<Vec<u8>>> for Batch {
    fn from(value: Vec<Vec<u8>>) -> Self {
        Self::new(value)
    }
}

/// Computes the content hash of a transaction sequence without materializing
/// the canonical encoding.
pub fn compute_batch_hash<T: AsRef<[u8]>>(transactions: &[T]) -> BatchHash {
    let mut hasher = Sha256::new();
    write_canonical(transactions, |chunk| hasher.update(chunk));
    BatchHash(hasher.finalize().into())
}

/// Feeds the canonical encoding of `transactions` to `sink` piece by piece.
fn write_canonical<T: AsRef<[u8]>>(transactions: &[T], mut sink: impl FnMut(&[u8])) {
    let mut len_buf = [0; MAX_VARINT_LEN];
    for tx in transactions {
        let tx = tx.as_ref();
        sink(&[TRANSACTION_FIELD_TAG]);
        let n = encode_uvarint(tx.len() as u64, &mut len_buf);
        sink(&len_buf[..n]);
        sink(tx);
    }
}

/// Writes `v` as unsigned LEB128 into `buf`, returning the number of bytes used.
fn encode_uvarint(mut v: u64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut i = 0;
    while v >= 0x80 {
        buf[i] = (v as u8) | 0x80;
        v >>= 7;
        i += 1;
    }
    buf[i] = v as u8;
    i + 1
}
