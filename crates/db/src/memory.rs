//! In-memory engine for the hash-chain index, used in tests and ephemeral
//! deployments.

use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use based_primitives::BatchHash;
use parking_lot::RwLock;

use crate::{keys, traits::HashChainDatabase, DbResult};

/// Ordered byte map behind a lock, using the same key layout as the sled
/// engine.
#[derive(Debug, Default)]
pub struct InMemoryHashChainDb {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    writes: AtomicUsize,
}

impl InMemoryHashChainDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set_*` calls that completed.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn put(&self, key: Vec<u8>, value: Vec<u8>) -> DbResult<()> {
        self.entries.write().insert(key, value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.read().get(key).cloned()
    }
}

impl HashChainDatabase for InMemoryHashChainDb {
    fn get_last_height(&self) -> DbResult<Option<u64>> {
        self.get(keys::LAST_HEIGHT_KEY)
            .map(|v| keys::decode_height(keys::LAST_HEIGHT_KEY, &v))
            .transpose()
    }

    fn set_last_height(&self, height: u64) -> DbResult<()> {
        self.put(
            keys::LAST_HEIGHT_KEY.to_vec(),
            keys::encode_height(height).to_vec(),
        )
    }

    fn set_hash_mapping(&self, hash: BatchHash, height: u64) -> DbResult<()> {
        self.put(
            keys::hash_to_height_key(&hash),
            keys::encode_height(height).to_vec(),
        )
    }

    fn get_hash_mapping(&self, hash: BatchHash) -> DbResult<Option<u64>> {
        let key = keys::hash_to_height_key(&hash);
        self.get(&key)
            .map(|v| keys::decode_height(&key, &v))
            .transpose()
    }

    fn set_next_hash(&self, current: BatchHash, next: BatchHash) -> DbResult<()> {
        self.put(keys::next_hash_key(&current), next.as_bytes().to_vec())
    }

    fn get_next_hash(&self, current: BatchHash) -> DbResult<Option<BatchHash>> {
        let key = keys::next_hash_key(&current);
        self.get(&key).map(|v| keys::decode_hash(&key, &v)).transpose()
    }
}
