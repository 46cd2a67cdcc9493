//! Based sequencer node.
//!
//! Derives batches from a DA namespace, indexes their hash chain and serves
//! them to rollup nodes over JSON-RPC.

mod args;
mod config;
mod errors;
mod rpc;

use std::{num::NonZeroUsize, sync::Arc, thread, time::Duration};

use args::{Args, EnvArgs};
use based_common::logging::{self, LoggingInitConfig};
use based_config::Config;
use based_da::rpc::JsonRpcDaClient;
use based_db::{open_sled_database, HashChainDbSled, SLED_NAME};
use based_sequencer::{BasedSequencer, SequencerConfig};
use based_storage::HashChainManager;
use config::get_config;
use errors::{AppError, Result};
use rpc::{run_rpc_server, SequencerRpcImpl};
use strata_tasks::{ShutdownGuard, TaskManager};
use threadpool::ThreadPool;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::info;

const SHUTDOWN_TIMEOUT_MS: u64 = 5000;

/// How often the shutdown relay checks for a shutdown signal.
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    if let Err(e) = main_inner(args) {
        eprintln!("FATAL ERROR: {e}");

        return Err(e);
    }

    Ok(())
}

fn main_inner(args: Args) -> Result<()> {
    let env_args = EnvArgs::from_env();
    let config = get_config(&args, &env_args)?;

    // Start runtime for async IO tasks.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("based-rt")
        .build()?;
    let handle = runtime.handle();

    // Init the logging before we do anything else.
    init_logging(handle, &config);

    let sequencer = handle.block_on(init_sequencer(&config))?;

    let shutdown = CancellationToken::new();
    let task_manager = TaskManager::new(handle.clone());
    let executor = task_manager.create_executor();

    let rpc = SequencerRpcImpl::new(
        sequencer,
        shutdown.clone(),
        config.rpc.next_batch_timeout(),
    );
    let addr = format!("{}:{}", config.rpc.host, config.rpc.port);
    executor.spawn_critical_async("rpc", run_rpc_server(rpc, addr, shutdown.clone()));

    let relay_token = shutdown.clone();
    executor.spawn_critical("shutdown-relay", move |guard| {
        relay_shutdown(guard, relay_token)
    });

    task_manager.start_signal_listeners();
    let res = task_manager.monitor(Some(Duration::from_millis(SHUTDOWN_TIMEOUT_MS)));

    shutdown.cancel();
    info!("exiting");
    logging::finalize();

    res?;
    Ok(())
}

/// Opens the index and the DA client and restores the cursor.
async fn init_sequencer(config: &Config) -> Result<BasedSequencer<JsonRpcDaClient>> {
    let db = open_sled_database(&config.db.datadir, SLED_NAME)?;
    let hash_chain_db = Arc::new(HashChainDbSled::new(db)?);
    info!(datadir = %config.db.datadir.display(), "opened index");

    let pool = ThreadPool::with_name("based-db".to_owned(), config.db.pool_size);
    let cache_size = NonZeroUsize::new(config.db.cache_size)
        .ok_or_else(|| AppError::InvalidConfig("db.cache_size must be nonzero".into()))?;
    let index = Arc::new(HashChainManager::new(pool, hash_chain_db, cache_size));

    let da = Arc::new(JsonRpcDaClient::new(
        config.da.rpc_url.clone(),
        config.da.auth_token.as_deref(),
        config.da.request_timeout(),
    )?);
    info!(url = %da.url(), "connected DA client");

    let seq_config = SequencerConfig::from(&config.sequencer);
    info!(namespace = %seq_config.namespace, "deriving batches");

    Ok(BasedSequencer::init(da, index, seq_config).await?)
}

/// Cancels `token` once the task manager starts shutting down so in-flight
/// scans stop waiting on DA.
fn relay_shutdown(shutdown: ShutdownGuard, token: CancellationToken) -> anyhow::Result<()> {
    while !shutdown.should_shutdown() && !token.is_cancelled() {
        thread::sleep(SHUTDOWN_POLL_INTERVAL);
    }
    token.cancel();
    Ok(())
}

/// Sets up the logging system given a handle to a runtime context.
fn init_logging(rt: &Handle, config: &Config) {
    let logging = &config.logging;

    // Need to set the runtime context for the non-blocking file writer.
    let _g = rt.enter();
    logging::init_logging_from_config(LoggingInitConfig {
        service_base_name: "based-sequencer",
        service_label: logging.service_label.as_deref(),
        service_version: Some(env!("CARGO_PKG_VERSION")),
        log_dir: logging.log_dir.as_ref(),
        log_file_prefix: logging.log_file_prefix.as_deref(),
        json_format: logging.json_format,
        default_log_prefix: "based-sequencer",
    });
}
