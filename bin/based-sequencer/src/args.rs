use std::{env, path::PathBuf};

use argh::FromArgs;

/// Configs overridable by environment. Mostly for sensitive data.
#[derive(Debug, Clone, Default)]
pub(crate) struct EnvArgs {
    /// Service label to include in service name
    pub service_label: Option<String>,

    /// Bearer token for the DA node, takes precedence over the config file
    pub da_auth_token: Option<String>,
}

impl EnvArgs {
    pub(crate) fn from_env() -> Self {
        Self {
            service_label: env::var("BASED_SVC_LABEL").ok(),
            da_auth_token: env::var("BASED_DA_AUTH_TOKEN").ok(),
        }
    }
}

#[derive(Debug, Clone, FromArgs)]
#[argh(description = "Based sequencer deriving batches from a DA layer")]
pub(crate) struct Args {
    #[argh(option, short = 'c', description = "path to configuration")]
    pub config: PathBuf,

    /// Data directory path that will override the path in the config toml.
    #[argh(option, short = 'd', description = "datadir path for the index")]
    pub datadir: Option<PathBuf>,

    #[argh(option, short = 'h', description = "JSON-RPC host")]
    pub rpc_host: Option<String>,

    #[argh(option, short = 'r', description = "JSON-RPC port")]
    pub rpc_port: Option<u16>,

    #[argh(option, description = "DA node JSON-RPC url")]
    pub da_url: Option<String>,
}
