//! Deterministic in-memory DA layer for tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use based_primitives::{BlobId, Namespace};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::{DaError, DaGateway, GetIdsResult};

pub const DEFAULT_MAX_BLOB_SIZE: u64 = 2 * 1024 * 1024;

/// Timestamp attributed to height 0. Height `h` is `h` seconds later.
const GENESIS_TIMESTAMP: i64 = 1_700_000_000;

/// Blobs submitted through [`DaGateway::submit`].
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub namespace: Namespace,
    pub blobs: Vec<Vec<u8>>,
    pub gas_price: f64,
    pub height: u64,
}

#[derive(Debug, Default)]
struct HeightEntry {
    ids: BTreeMap<Namespace, Vec<BlobId>>,
}

#[derive(Debug, Default)]
struct State {
    /// Entry `i` is height `i + 1`.
    heights: Vec<HeightEntry>,
    blobs: HashMap<(Namespace, BlobId), Vec<u8>>,
    queried: Vec<u64>,
    submissions: Vec<Submission>,
}

impl State {
    fn tip(&self) -> u64 {
        self.heights.len() as u64
    }

    fn push(&mut self, namespace: &Namespace, blobs: Vec<(BlobId, Vec<u8>)>) -> u64 {
        let mut entry = HeightEntry::default();
        let ids = entry.ids.entry(namespace.clone()).or_default();
        for (id, blob) in blobs {
            ids.push(id.clone());
            self.blobs.insert((namespace.clone(), id), blob);
        }
        self.heights.push(entry);
        self.tip()
    }
}

/// DA layer that produces a new height on every publish.
///
/// Heights start at 1. Querying above the tip fails with
/// [`DaError::FutureHeight`], height 0 is always empty.
#[derive(Debug)]
pub struct InMemoryDa {
    state: Mutex<State>,
    max_blob_size: u64,
}

impl Default for InMemoryDa {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDa {
    pub fn new() -> Self {
        Self::with_max_blob_size(DEFAULT_MAX_BLOB_SIZE)
    }

    pub fn with_max_blob_size(max_blob_size: u64) -> Self {
        Self {
            state: Mutex::new(State::default()),
            max_blob_size,
        }
    }

    /// Derives the id of a blob published at `height`.
    pub fn blob_id(height: u64, blob: &[u8]) -> BlobId {
        let mut id = height.to_le_bytes().to_vec();
        id.extend_from_slice(&Sha256::digest(blob));
        BlobId::new(id)
    }

    pub fn timestamp_at(height: u64) -> DateTime<Utc> {
        DateTime::from_timestamp(GENESIS_TIMESTAMP + height as i64, 0).unwrap_or_default()
    }

    /// Publishes blobs at a new height, returning the height.
    pub fn publish(&self, namespace: &Namespace, blobs: Vec<Vec<u8>>) -> u64 {
        let mut state = self.state.lock();
        let height = state.tip() + 1;
        let blobs = blobs
            .into_iter()
            .map(|b| (Self::blob_id(height, &b), b))
            .collect();
        state.push(namespace, blobs)
    }

    /// Publishes blobs under caller-chosen ids at a new height.
    ///
    /// The same id may be listed more than once.
    pub fn publish_with_ids(&self, namespace: &Namespace, blobs: Vec<(BlobId, Vec<u8>)>) -> u64 {
        self.state.lock().push(namespace, blobs)
    }

    /// Produces a height with no blobs in any namespace.
    pub fn publish_empty(&self) -> u64 {
        let mut state = self.state.lock();
        state.heights.push(HeightEntry::default());
        state.tip()
    }

    pub fn tip(&self) -> u64 {
        self.state.lock().tip()
    }

    /// Heights passed to `get_ids`, in call order.
    pub fn queried_heights(&self) -> Vec<u64> {
        self.state.lock().queried.clone()
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().submissions.clone()
    }
}

#[async_trait]
impl DaGateway for InMemoryDa {
    async fn max_blob_size(&self) -> Result<u64, DaError> {
        Ok(self.max_blob_size)
    }

    async fn submit(
        &self,
        blobs: Vec<Vec<u8>>,
        gas_price: f64,
        namespace: &Namespace,
    ) -> Result<Vec<BlobId>, DaError> {
        if blobs.iter().any(|b| b.len() as u64 > self.max_blob_size) {
            return Err(DaError::BlobTooLarge);
        }

        let mut state = self.state.lock();
        let height = state.tip() + 1;
        let with_ids: Vec<_> = blobs
            .iter()
            .map(|b| (Self::blob_id(height, b), b.clone()))
            .collect();
        let ids = with_ids.iter().map(|(id, _)| id.clone()).collect();
        state.push(namespace, with_ids);
        state.submissions.push(Submission {
            namespace: namespace.clone(),
            blobs,
            gas_price,
            height,
        });
        Ok(ids)
    }

    async fn get_ids(&self, height: u64, namespace: &Namespace) -> Result<GetIdsResult, DaError> {
        let mut state = self.state.lock();
        state.queried.push(height);

        if height > state.tip() {
            return Err(DaError::FutureHeight { height });
        }

        let ids = match height.checked_sub(1) {
            Some(idx) => state.heights[idx as usize]
                .ids
                .get(namespace)
                .cloned()
                .unwrap_or_default(),
            None => Vec::new(),
        };

        Ok(GetIdsResult::new(ids, Self::timestamp_at(height)))
    }

    async fn get(&self, ids: &[BlobId], namespace: &Namespace) -> Result<Vec<Vec<u8>>, DaError> {
        let state = self.state.lock();
        ids.iter()
            .map(|id| {
                state
                    .blobs
                    .get(&(namespace.clone(), id.clone()))
                    .cloned()
                    .ok_or(DaError::BlobNotFound)
            })
            .collect()
    }
}
