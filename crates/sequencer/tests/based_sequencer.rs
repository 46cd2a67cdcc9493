use std::{num::NonZeroUsize, sync::Arc, time::Duration};

use based_da::memory::InMemoryDa;
use based_db::{open_sled_database, HashChainDatabase, HashChainDbSled, InMemoryHashChainDb};
use based_primitives::{Batch, BlobId, Namespace, RollupId};
use based_sequencer::{BasedSequencer, NextBatch, SequencerConfig, SequencerError};
use based_storage::HashChainManager;
use threadpool::ThreadPool;
use tokio_util::sync::CancellationToken;

fn namespace() -> Namespace {
    Namespace::from("test namespace")
}

fn config() -> SequencerConfig {
    SequencerConfig {
        retry_interval: Duration::from_millis(5),
        ..SequencerConfig::new(namespace())
    }
}

fn manager(db: Arc<impl HashChainDatabase>) -> Arc<HashChainManager> {
    Arc::new(HashChainManager::new(
        ThreadPool::new(2),
        db,
        NonZeroUsize::new(32).unwrap(),
    ))
}

fn tx(k: u8) -> Vec<u8> {
    format!("transaction {k}").into_bytes()
}

/// Publishes one height per group, blob `k` holding "transaction k".
fn publish_groups(da: &InMemoryDa, groups: &[&[u8]]) {
    for group in groups {
        let blobs = group
            .iter()
            .map(|&k| (BlobId::new(vec![k]), tx(k)))
            .collect();
        da.publish_with_ids(&namespace(), blobs);
    }
}

async fn derive(
    seq: &mut BasedSequencer<InMemoryDa>,
    count: usize,
) -> Vec<NextBatch> {
    let cancel = CancellationToken::new();
    let mut out: Vec<NextBatch> = Vec::new();
    for _ in 0..count {
        let last = out.last().map(|b| b.hash);
        let next = seq
            .get_next_batch(last.as_ref(), &cancel)
            .await
            .expect("test: get next batch");
        out.push(next);
    }
    out
}

#[tokio::test]
async fn test_multi_height_scenario() {
    let da = Arc::new(InMemoryDa::new());
    publish_groups(&da, &[&[1, 2, 3], &[4, 4], &[6, 7, 8, 9]]);

    let db = Arc::new(InMemoryHashChainDb::new());
    let mut seq = BasedSequencer::init(da.clone(), manager(db.clone()), config())
        .await
        .unwrap();

    let batches = derive(&mut seq, 3).await;

    assert_eq!(batches[0].batch.transactions(), &[tx(1), tx(2), tx(3)]);
    assert_eq!(batches[1].batch.transactions(), &[tx(4), tx(4)]);
    assert_eq!(batches[2].batch.transactions(), &[tx(6), tx(7), tx(8), tx(9)]);
    assert_eq!(
        batches.iter().map(|b| b.height).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(batches[1].timestamp, InMemoryDa::timestamp_at(2));

    for pair in batches.windows(2) {
        assert_eq!(db.get_next_hash(pair[0].hash).unwrap(), Some(pair[1].hash));
    }
    assert_eq!(db.get_last_height().unwrap(), Some(4));
}

#[tokio::test]
async fn test_replicas_derive_identical_chain() {
    let da = Arc::new(InMemoryDa::new());
    publish_groups(&da, &[&[1], &[2, 3], &[], &[4]]);

    let mut a = BasedSequencer::init(
        da.clone(),
        manager(Arc::new(InMemoryHashChainDb::new())),
        config(),
    )
    .await
    .unwrap();
    let mut b = BasedSequencer::init(
        da.clone(),
        manager(Arc::new(InMemoryHashChainDb::new())),
        config(),
    )
    .await
    .unwrap();

    let from_a = derive(&mut a, 4).await;
    let from_b = derive(&mut b, 4).await;
    assert_eq!(from_a, from_b);
    assert!(from_a[2].batch.is_empty());
    assert_eq!(from_a[2].hash, Batch::empty().hash());
}

#[tokio::test]
async fn test_warm_index_serves_successor() {
    let da = Arc::new(InMemoryDa::new());
    publish_groups(&da, &[&[1], &[2], &[3]]);

    let db = Arc::new(InMemoryHashChainDb::new());
    let mut first = BasedSequencer::init(da.clone(), manager(db.clone()), config())
        .await
        .unwrap();
    let derived = derive(&mut first, 3).await;
    drop(first);

    // A second instance over the same index answers from the chain instead
    // of scanning, and writes nothing.
    let writes = db.write_count();
    let mut second = BasedSequencer::init(da.clone(), manager(db.clone()), config())
        .await
        .unwrap();
    assert_eq!(second.next_height(), 4);

    let cancel = CancellationToken::new();
    let next = second
        .get_next_batch(Some(&derived[0].hash), &cancel)
        .await
        .unwrap();
    assert_eq!(next, derived[1]);
    let next = second
        .get_next_batch(Some(&derived[1].hash), &cancel)
        .await
        .unwrap();
    assert_eq!(next, derived[2]);
    assert_eq!(db.write_count(), writes);
}

#[tokio::test]
async fn test_heights_strictly_increase() {
    let da = Arc::new(InMemoryDa::new());
    let db = Arc::new(InMemoryHashChainDb::new());
    let mut seq = BasedSequencer::init(da.clone(), manager(db), config())
        .await
        .unwrap();
    let cancel = CancellationToken::new();

    let mut last: Option<NextBatch> = None;
    for k in 0..5u8 {
        da.publish(&namespace(), vec![tx(k)]);
        if k % 2 == 0 {
            da.publish_empty();
        }

        let next = seq
            .get_next_batch(last.as_ref().map(|b| &b.hash), &cancel)
            .await
            .unwrap();
        if let Some(prev) = &last {
            assert!(next.height > prev.height);
        }
        last = Some(next);
    }
}

#[tokio::test]
async fn test_repeated_empty_heights_keep_order() {
    let da = Arc::new(InMemoryDa::new());
    publish_groups(&da, &[&[], &[1], &[], &[2], &[], &[], &[3]]);

    let db = Arc::new(InMemoryHashChainDb::new());
    let mut seq = BasedSequencer::init(da.clone(), manager(db.clone()), config())
        .await
        .unwrap();

    let batches = derive(&mut seq, 7).await;
    assert_eq!(
        batches.iter().map(|b| b.height).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5, 6, 7]
    );
    assert_eq!(batches[6].batch.transactions(), &[tx(3)]);

    // A restarted instance picks up after the last empty height.
    da.publish_empty();
    drop(seq);
    let mut seq = BasedSequencer::init(da.clone(), manager(db), config())
        .await
        .unwrap();
    let next = seq
        .get_next_batch(Some(&batches[6].hash), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(next.height, 8);
    assert!(next.batch.is_empty());
}

#[tokio::test]
async fn test_waits_for_future_height() {
    let da = Arc::new(InMemoryDa::new());
    let db = Arc::new(InMemoryHashChainDb::new());
    let mut seq = BasedSequencer::init(da.clone(), manager(db.clone()), config())
        .await
        .unwrap();

    let publisher = {
        let da = da.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            da.publish(&namespace(), vec![tx(1)]);
        })
    };

    let next = seq
        .get_next_batch(None, &CancellationToken::new())
        .await
        .unwrap();
    publisher.await.unwrap();

    assert_eq!(next.height, 1);
    assert_eq!(next.batch.transactions(), &[tx(1)]);

    // Every poll before the publish asked for the same height.
    let queried = da.queried_heights();
    assert!(queried.len() > 1);
    assert!(queried.iter().all(|&h| h == 1));
}

#[tokio::test]
async fn test_cancel_while_waiting_writes_nothing() {
    let da = Arc::new(InMemoryDa::new());
    let db = Arc::new(InMemoryHashChainDb::new());
    let mut seq = BasedSequencer::init(da.clone(), manager(db.clone()), config())
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        })
    };

    let err = seq.get_next_batch(None, &cancel).await.unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, SequencerError::Cancelled));
    assert_eq!(db.write_count(), 0);
    assert_eq!(seq.next_height(), 1);
}

#[tokio::test]
async fn test_cursor_survives_restart_on_sled() {
    let dir = tempfile::tempdir().unwrap();
    let da = Arc::new(InMemoryDa::new());
    publish_groups(&da, &[&[1], &[2], &[3]]);

    // Sled keeps its file lock while its flusher runs, so the restarted
    // sequencer reopens the index over the same handle.
    let sled = open_sled_database(dir.path(), "test").unwrap();
    let derived = {
        let db = Arc::new(HashChainDbSled::new(sled.clone()).unwrap());
        let mut seq = BasedSequencer::init(da.clone(), manager(db), config())
            .await
            .unwrap();
        derive(&mut seq, 2).await
    };

    let db = Arc::new(HashChainDbSled::new(sled).unwrap());
    let mut seq = BasedSequencer::init(da.clone(), manager(db), config())
        .await
        .unwrap();
    assert_eq!(seq.next_height(), 3);

    let cancel = CancellationToken::new();
    let next = seq
        .get_next_batch(Some(&derived[1].hash), &cancel)
        .await
        .unwrap();
    assert_eq!(next.height, 3);
    assert_eq!(next.batch.transactions(), &[tx(3)]);

    let again = seq
        .get_next_batch(Some(&derived[0].hash), &cancel)
        .await
        .unwrap();
    assert_eq!(again, derived[1]);
}

#[tokio::test]
async fn test_submitted_transaction_is_derived() {
    let da = Arc::new(InMemoryDa::new());
    let db = Arc::new(InMemoryHashChainDb::new());
    let config = SequencerConfig {
        namespace: Namespace::from("rollup-a"),
        gas_price: 1.5,
        ..config()
    };
    let mut seq = BasedSequencer::init(da.clone(), manager(db), config)
        .await
        .unwrap();

    let receipt = seq
        .submitter()
        .submit_rollup_transaction(&RollupId::from("rollup-a"), b"payload".to_vec())
        .await
        .unwrap();
    assert_eq!(receipt.ids.len(), 1);

    let subs = da.submissions();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].namespace, Namespace::from("rollup-a"));
    assert_eq!(subs[0].blobs, vec![b"payload".to_vec()]);
    assert_eq!(subs[0].gas_price, 1.5);

    let next = seq
        .get_next_batch(None, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(next.batch.transactions(), &[b"payload".to_vec()]);
    assert!(seq.verify_batch(&next.hash).await.unwrap());
}
