use std::{fs, path::Path};

use based_config::Config;

use crate::{
    args::{Args, EnvArgs},
    errors::{AppError, Result},
};

/// Loads the config file named by the args and applies arg and env
/// overrides on top of it.
pub(crate) fn get_config(args: &Args, env_args: &EnvArgs) -> Result<Config> {
    let mut config = load_config_from_path(&args.config)?;
    apply_overrides(&mut config, args, env_args);
    validate(&config)?;
    Ok(config)
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let config_str = fs::read_to_string(path)?;
    parse_config(&config_str)
}

fn parse_config(config_str: &str) -> Result<Config> {
    Ok(toml::from_str(config_str)?)
}

fn apply_overrides(config: &mut Config, args: &Args, env_args: &EnvArgs) {
    if let Some(datadir) = &args.datadir {
        config.db.datadir = datadir.clone();
    }
    if let Some(rpc_host) = &args.rpc_host {
        config.rpc.host = rpc_host.clone();
    }
    if let Some(rpc_port) = args.rpc_port {
        config.rpc.port = rpc_port;
    }
    if let Some(da_url) = &args.da_url {
        config.da.rpc_url = da_url.clone();
    }

    if let Some(token) = &env_args.da_auth_token {
        config.da.auth_token = Some(token.clone());
    }
    if let Some(label) = &env_args.service_label {
        config.logging.service_label = Some(label.clone());
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.sequencer.namespace.is_empty() {
        return Err(AppError::InvalidConfig("sequencer.namespace is empty".into()));
    }
    if config.sequencer.start_height == 0 {
        return Err(AppError::InvalidConfig(
            "sequencer.start_height must be at least 1".into(),
        ));
    }
    if config.sequencer.retry_interval_ms == 0 {
        return Err(AppError::InvalidConfig(
            "sequencer.retry_interval_ms must be nonzero".into(),
        ));
    }
    if config.db.cache_size == 0 {
        return Err(AppError::InvalidConfig("db.cache_size must be nonzero".into()));
    }
    if config.db.pool_size == 0 {
        return Err(AppError::InvalidConfig("db.pool_size must be nonzero".into()));
    }
    Ok(())
}
