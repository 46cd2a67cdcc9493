//! Sled engine for the hash-chain index.

use std::{fmt, fs, path::Path, sync::Arc};

use anyhow::Context;
use based_primitives::BatchHash;
use tracing::*;

use crate::{keys, traits::HashChainDatabase, DbResult};

/// Directory name of the sled database under `<datadir>/sled`.
pub const SLED_NAME: &str = "based-sequencer";

const HASH_CHAIN_TREE: &str = "hash_chain";

/// Opens the sled database instance from datadir.
pub fn open_sled_database(datadir: &Path, dbname: &'static str) -> anyhow::Result<Arc<sled::Db>> {
    let mut database_dir = datadir.to_path_buf();
    database_dir.push("sled");
    database_dir.push(dbname);

    if !database_dir.exists() {
        fs::create_dir_all(&database_dir)?;
    }

    let db = sled::open(&database_dir).context("opening sled database")?;
    Ok(Arc::new(db))
}

/// Hash-chain index stored in a single sled tree.
///
/// Every write flushes the tree before returning so a successful `set_*` has
/// reached disk.
pub struct HashChainDbSled {
    tree: sled::Tree,
}

impl fmt::Debug for HashChainDbSled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashChainDbSled")
            .field("tree", &HASH_CHAIN_TREE)
            .finish_non_exhaustive()
    }
}

impl HashChainDbSled {
    pub fn new(db: Arc<sled::Db>) -> DbResult<Self> {
        let tree = db.open_tree(HASH_CHAIN_TREE)?;
        Ok(Self { tree })
    }

    fn put(&self, key: &[u8], value: &[u8]) -> DbResult<()> {
        self.tree.insert(key, value)?;
        self.tree.flush()?;
        Ok(())
    }
}

impl HashChainDatabase for HashChainDbSled {
    fn get_last_height(&self) -> DbResult<Option<u64>> {
        self.tree
            .get(keys::LAST_HEIGHT_KEY)?
            .map(|v| keys::decode_height(keys::LAST_HEIGHT_KEY, &v))
            .transpose()
    }

    fn set_last_height(&self, height: u64) -> DbResult<()> {
        trace!(%height, "setting last height");
        self.put(keys::LAST_HEIGHT_KEY, &keys::encode_height(height))
    }

    fn set_hash_mapping(&self, hash: BatchHash, height: u64) -> DbResult<()> {
        self.put(&keys::hash_to_height_key(&hash), &keys::encode_height(height))
    }

    fn get_hash_mapping(&self, hash: BatchHash) -> DbResult<Option<u64>> {
        let key = keys::hash_to_height_key(&hash);
        self.tree
            .get(&key)?
            .map(|v| keys::decode_height(&key, &v))
            .transpose()
    }

    fn set_next_hash(&self, current: BatchHash, next: BatchHash) -> DbResult<()> {
        self.put(&keys::next_hash_key(&current), next.as_bytes())
    }

    fn get_next_hash(&self, current: BatchHash) -> DbResult<Option<BatchHash>> {
        let key = keys::next_hash_key(&current);
        self.tree
            .get(&key)?
            .map(|v| keys::decode_hash(&key, &v))
            .transpose()
    }
}
