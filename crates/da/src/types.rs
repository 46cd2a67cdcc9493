use based_primitives::BlobId;
use chrono::{DateTime, Utc};

/// Blob ids published at one height, in DA order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GetIdsResult {
    pub ids: Vec<BlobId>,

    /// Time the DA layer attributes to the height.
    pub timestamp: DateTime<Utc>,
}

impl GetIdsResult {
    pub fn new(ids: Vec<BlobId>, timestamp: DateTime<Utc>) -> Self {
        Self { ids, timestamp }
    }
}
