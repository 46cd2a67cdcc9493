use std::{path::PathBuf, time::Duration};

use based_primitives::Namespace;
use serde::{Deserialize, Serialize};

/// Default value for `start_height` in [`SequencerConfig`].
pub const DEFAULT_START_HEIGHT: u64 = 1;

/// Default value for `retry_interval_ms` in [`SequencerConfig`].
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 100;

/// Default value for `request_timeout_ms` in [`DaConfig`].
const DEFAULT_DA_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default value for `datadir` in [`DbConfig`].
const DEFAULT_DATADIR: &str = "based-data";

/// Default value for `cache_size` in [`DbConfig`].
const DEFAULT_CACHE_SIZE: usize = 256;

/// Default value for `pool_size` in [`DbConfig`].
const DEFAULT_POOL_SIZE: usize = 4;

/// Default value for `port` in [`RpcConfig`].
const DEFAULT_RPC_PORT: u16 = 8645;

/// Default value for `next_batch_timeout_ms` in [`RpcConfig`].
const DEFAULT_NEXT_BATCH_TIMEOUT_MS: u64 = 60_000;

fn default_start_height() -> u64 {
    DEFAULT_START_HEIGHT
}

fn default_retry_interval_ms() -> u64 {
    DEFAULT_RETRY_INTERVAL_MS
}

fn default_da_request_timeout_ms() -> u64 {
    DEFAULT_DA_REQUEST_TIMEOUT_MS
}

fn default_datadir() -> PathBuf {
    DEFAULT_DATADIR.into()
}

fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

fn default_rpc_port() -> u16 {
    DEFAULT_RPC_PORT
}

fn default_next_batch_timeout_ms() -> u64 {
    DEFAULT_NEXT_BATCH_TIMEOUT_MS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Namespace batches are derived from, hex encoded.
    pub namespace: Namespace,

    /// First DA height to scan on a fresh index.
    #[serde(default = "default_start_height")]
    pub start_height: u64,

    /// Poll interval while waiting for a DA height to appear.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Gas price attached to submitted transactions.
    #[serde(default)]
    pub gas_price: f64,
}

impl SequencerConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaConfig {
    /// JSON-RPC endpoint of the DA node.
    pub rpc_url: String,

    /// Bearer token sent to the DA node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    #[serde(default = "default_da_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl DaConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// The data directory where database contents reside.
    #[serde(default = "default_datadir")]
    pub datadir: PathBuf,

    /// Entries kept per index cache.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Threads serving database calls.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            datadir: default_datadir(),
            cache_size: DEFAULT_CACHE_SIZE,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Addr that the rpc server will listen to.
    pub host: String,

    /// Port that the rpc server will listen to.
    #[serde(default = "default_rpc_port")]
    pub port: u16,

    /// How long a `getNextBatch` call may wait for DA before giving up.
    #[serde(default = "default_next_batch_timeout_ms")]
    pub next_batch_timeout_ms: u64,
}

impl RpcConfig {
    pub fn next_batch_timeout(&self) -> Duration {
        Duration::from_millis(self.next_batch_timeout_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Service label to append to the service name (e.g., "prod", "dev").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_label: Option<String>,

    /// Directory path for file-based logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Prefix for log file names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file_prefix: Option<String>,

    /// Use JSON format for logs instead of compact format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_format: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub sequencer: SequencerConfig,
    pub da: DaConfig,

    #[serde(default)]
    pub db: DbConfig,

    pub rpc: RpcConfig,

    /// Logging configuration (optional section in TOML).
    #[serde(default)]
    pub logging: LoggingConfig,
}
