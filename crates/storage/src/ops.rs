//! Hash-chain index operations interface.

use based_db::HashChainDatabase;
use based_primitives::BatchHash;

use crate::exec::inst_db_ops;

inst_db_ops! {
    (<D: HashChainDatabase> => HashChainOps) {
        get_last_height() => Option<u64>;
        set_last_height(height: u64) => ();
        set_hash_mapping(hash: BatchHash, height: u64) => ();
        get_hash_mapping(hash: BatchHash) => Option<u64>;
        set_next_hash(current: BatchHash, next: BatchHash) => ();
        get_next_hash(current: BatchHash) => Option<BatchHash>;
    }
}
