use std::time::Duration;

use based_config::{DEFAULT_RETRY_INTERVAL_MS, DEFAULT_START_HEIGHT};
use based_primitives::Namespace;

#[derive(Clone, Debug)]
pub struct SequencerConfig {
    /// Namespace batches are read from.
    pub namespace: Namespace,

    /// First DA height scanned when the index holds no cursor.
    pub start_height: u64,

    /// How long to wait before polling a height that didn't exist yet.
    pub retry_interval: Duration,

    /// Gas price passed along with submitted transactions.
    pub gas_price: f64,
}

impl SequencerConfig {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            start_height: DEFAULT_START_HEIGHT,
            retry_interval: Duration::from_millis(DEFAULT_RETRY_INTERVAL_MS),
            gas_price: 0.0,
        }
    }
}

impl From<&based_config::SequencerConfig> for SequencerConfig {
    fn from(config: &based_config::SequencerConfig) -> Self {
        Self {
            namespace: config.namespace.clone(),
            start_height: config.start_height,
            retry_interval: config.retry_interval(),
            gas_price: config.gas_price,
        }
    }
}
