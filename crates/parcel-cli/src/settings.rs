//! Options shared by every subcommand, and the clients built from them.
//!
//! Every option can also come from the environment; flags win.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use parcel_client::config::{
    parse_endpoint, DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_SECS,
};
use parcel_client::{ClientConfig, ParcelClient};
use parcel_core::{ValidationRules, Validators};

use crate::session_store::SessionStore;

/// Global options.
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Backend endpoint URL.
    #[arg(long, global = true, env = "PARCEL_ENDPOINT_URL")]
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, env = "PARCEL_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Confirmation polls after submitting a declaration.
    #[arg(long, global = true, env = "PARCEL_POLL_ATTEMPTS", default_value_t = DEFAULT_POLL_ATTEMPTS)]
    pub poll_attempts: u32,

    /// Delay between confirmation polls, in milliseconds.
    #[arg(long, global = true, env = "PARCEL_POLL_INTERVAL_MS", default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,

    /// Validation rules file (JSON, or YAML by extension).
    #[arg(long, global = true, env = "PARCEL_RULES")]
    pub rules: Option<PathBuf>,

    /// Session file location.
    #[arg(long, global = true, env = "PARCEL_SESSION_FILE")]
    pub session_file: Option<PathBuf>,
}

impl Default for GlobalOpts {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            rules: None,
            session_file: None,
        }
    }
}

impl GlobalOpts {
    /// Client configuration from the endpoint and polling options.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let raw = self
            .endpoint
            .as_deref()
            .context("no backend endpoint configured; pass --endpoint or set PARCEL_ENDPOINT_URL")?;
        let mut config = ClientConfig::new(parse_endpoint(raw)?);
        config.timeout_secs = self.timeout_secs;
        config.poll_attempts = self.poll_attempts;
        config.poll_interval_ms = self.poll_interval_ms;
        Ok(config)
    }

    /// Backend client.
    pub fn client(&self) -> Result<ParcelClient> {
        Ok(ParcelClient::new(self.client_config()?)?)
    }

    /// Validators from `--rules`, or the built-in table.
    pub fn validators(&self) -> Result<Arc<Validators>> {
        let rules = match &self.rules {
            Some(path) => ValidationRules::from_path(path)
                .with_context(|| format!("loading validation rules from {}", path.display()))?,
            None => ValidationRules::default(),
        };
        Ok(Arc::new(Validators::new(rules)?))
    }

    /// Session store at `--session-file` or the default location.
    pub fn session_store(&self) -> Result<SessionStore> {
        SessionStore::resolve(self.session_file.as_deref())
    }
}
