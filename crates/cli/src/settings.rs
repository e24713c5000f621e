//! Resolves the effective [`ClientConfig`]: flags and environment first, then the TOML
//! config file, then built-in defaults.

use anyhow::{Context, Result, anyhow};
use kokoro_client::ClientConfig;
use std::path::{Path, PathBuf};
use url::Url;

use crate::cli_args::CliArgs;
use crate::utils::find_config_in_home;

/// Config file path from `--config`, or `~/.kokoro/config.toml` when it exists
pub fn config_path(args: &CliArgs) -> Option<PathBuf> {
    if let Some(cfg) = &args.config {
        return Some(PathBuf::from(cfg));
    }
    find_config_in_home(&["config.toml"]).ok()
}

pub fn load_config_file(path: &Path) -> Result<ClientConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let cfg: ClientConfig =
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))?;
    log::debug!("loaded config from {}", path.display());
    Ok(cfg)
}

/// Builds the client configuration for this invocation
pub fn resolve_config(args: &CliArgs) -> Result<ClientConfig> {
    let base = match config_path(args) {
        Some(path) => load_config_file(&path)?,
        None => ClientConfig::default(),
    };
    apply_overrides(base, args)
}

fn apply_overrides(mut cfg: ClientConfig, args: &CliArgs) -> Result<ClientConfig> {
    if let Some(url) = args.url.as_deref().filter(|u| !u.trim().is_empty()) {
        let url = Url::parse(url.trim()).with_context(|| format!("invalid --url `{url}`"))?;
        cfg = cfg.endpoint_url(url);
    } else if let Some(id) = args.endpoint_id.as_deref().filter(|id| !id.trim().is_empty()) {
        cfg = cfg.endpoint_url(ClientConfig::runpod_endpoint(id)?);
    }

    if let Some(key) = &args.api_key {
        cfg = cfg.api_key(key.clone());
    }
    if let Some(t) = args.timeout {
        cfg = cfg.timeout_seconds(t);
    }

    if cfg.endpoint_url.is_none() {
        return Err(anyhow!(
            "No endpoint configured. Use --url, --endpoint-id (or ENDPOINT_ID), or set endpoint_url in the config file"
        ));
    }
    Ok(cfg)
}
