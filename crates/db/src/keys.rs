//! Key layout of the index keyspace.
//!
//! All records live in one flat byte-keyed keyspace:
//!
//! | key                  | value                         |
//! |----------------------|-------------------------------|
//! | `height`             | next height to scan, u64 LE   |
//! | `height/` ‖ hash     | DA height of the batch, u64 LE |
//! | `hash/` ‖ hash       | hash of the following batch   |

use based_primitives::{BatchHash, BATCH_HASH_LEN};

use crate::{DbError, DbResult};

/// Key of the height cursor.
pub const LAST_HEIGHT_KEY: &[u8] = b"height";

/// Prefix of the hash to height mapping.
pub const HASH_TO_HEIGHT_PREFIX: &[u8] = b"height/";

/// Prefix of the hash to successor hash mapping.
pub const NEXT_HASH_PREFIX: &[u8] = b"hash/";

const HEIGHT_LEN: usize = 8;

fn prefixed(prefix: &[u8], hash: &BatchHash) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + BATCH_HASH_LEN);
    key.extend_from_slice(prefix);
    key.extend_from_slice(hash.as_bytes());
    key
}

pub fn hash_to_height_key(hash: &BatchHash) -> Vec<u8> {
    prefixed(HASH_TO_HEIGHT_PREFIX, hash)
}

pub fn next_hash_key(hash: &BatchHash) -> Vec<u8> {
    prefixed(NEXT_HASH_PREFIX, hash)
}

pub fn encode_height(height: u64) -> [u8; HEIGHT_LEN] {
    height.to_le_bytes()
}

/// Decodes a stored height, failing on anything that isn't exactly 8 bytes.
pub fn decode_height(key: &[u8], value: &[u8]) -> DbResult<u64> {
    let raw: [u8; HEIGHT_LEN] = value
        .try_into()
        .map_err(|_| invalid_len(key, HEIGHT_LEN, value))?;
    Ok(u64::from_le_bytes(raw))
}

pub fn decode_hash(key: &[u8], value: &[u8]) -> DbResult<BatchHash> {
    BatchHash::try_from(value).map_err(|_| invalid_len(key, BATCH_HASH_LEN, value))
}

fn invalid_len(key: &[u8], expected: usize, value: &[u8]) -> DbError {
    DbError::InvalidValueLength {
        key: String::from_utf8_lossy(key).into_owned(),
        expected,
        got: value.len(),
    }
}
