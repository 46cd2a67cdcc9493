use std::{num::NonZeroUsize, sync::Arc, time::Duration};

use based_db::InMemoryHashChainDb;
use based_primitives::Namespace;
use based_storage::HashChainManager;
use threadpool::ThreadPool;

use crate::SequencerConfig;

pub(crate) fn test_namespace() -> Namespace {
    Namespace::from("test namespace")
}

pub(crate) fn test_config() -> SequencerConfig {
    SequencerConfig {
        retry_interval: Duration::from_millis(1),
        ..SequencerConfig::new(test_namespace())
    }
}

pub(crate) fn test_index() -> (Arc<InMemoryHashChainDb>, Arc<HashChainManager>) {
    let db = Arc::new(InMemoryHashChainDb::new());
    let mgr = HashChainManager::new(
        ThreadPool::new(2),
        db.clone(),
        NonZeroUsize::new(64).unwrap(),
    );
    (db, Arc::new(mgr))
}
