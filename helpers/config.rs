use std::{path::PathBuf, time::Duration};

use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use url::Url;

use crate::framework::Confirmation;

/// Network, signer and artifact settings shared by all scripts.
///
/// Scripts take no command line arguments, everything is read from the
/// environment.
#[derive(Clone, Debug, Parser)]
pub struct Config {
    /// JSON-RPC endpoint of the node.
    #[arg(env = "RPC_URL", default_value = "http://127.0.0.1:8545")]
    pub rpc_url: Url,

    /// Hex encoded private key signing all transactions. When unset, the
    /// first account exposed by the node is used.
    #[arg(env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<PrivateKeySigner>,

    /// Root of the compiled contract artifacts.
    #[arg(env = "ARTIFACTS_DIR", default_value = "artifacts")]
    pub artifacts_dir: PathBuf,

    /// Number of confirmations to wait for on every transaction.
    #[arg(env = "CONFIRMATIONS", default_value_t = 1)]
    pub confirmations: u64,

    /// Give up waiting for a transaction after this long, e.g. `2m`.
    #[arg(env = "CONFIRMATION_TIMEOUT", value_parser = humantime::parse_duration)]
    pub confirmation_timeout: Option<Duration>,

    #[arg(env = "LOG_FILTER", default_value = "warn,helpers=info,scripts=info,deploy=info")]
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self, clap::Error> {
        Self::try_parse_from(["deploy"])
    }

    pub fn confirmation(&self) -> Confirmation {
        Confirmation {
            confirmations: self.confirmations,
            timeout: self.confirmation_timeout,
        }
    }
}
