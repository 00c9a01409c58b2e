//! Common helper functions for scripts and tests: artifact resolution,
//! contract deployment and the environment scripts run in.

mod artifact;
mod config;
mod error;
mod framework;
pub mod logging;

use alloy::{
    network::EthereumWallet,
    providers::{Provider, ProviderBuilder},
};

pub use artifact::{encode_call, Artifact, ArtifactStore};
pub use config::Config;
pub use error::FrameworkError;
#[cfg(any(test, feature = "test-util"))]
pub use framework::{MockContractFactory, MockDeployedContract, MockFramework};
pub use framework::{
    AlloyContract, AlloyContractFactory, AlloyFramework, Confirmation, ContractFactory,
    DeployedContract, Framework,
};

/// Everything a script needs to talk to the network.
pub struct ScriptSetup {
    pub framework: AlloyFramework,
}

/// Connects to the configured node and selects the account sending transactions.
pub async fn setup_script(config: &Config) -> Result<ScriptSetup, FrameworkError> {
    let (provider, sender) = match &config.private_key {
        Some(signer) => {
            let sender = signer.address();
            let provider = ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer.clone()))
                .connect_http(config.rpc_url.clone())
                .erased();
            (provider, sender)
        }
        None => {
            // Let the node sign with its own unlocked account.
            let provider = ProviderBuilder::new()
                .connect_http(config.rpc_url.clone())
                .erased();
            let sender = provider
                .get_accounts()
                .await?
                .first()
                .copied()
                .ok_or(FrameworkError::NoSigner)?;
            (provider, sender)
        }
    };
    tracing::info!(%sender, rpc_url = %config.rpc_url, "script environment ready");

    let framework = AlloyFramework::new(
        provider,
        sender,
        ArtifactStore::new(&config.artifacts_dir),
        config.confirmation(),
    );
    Ok(ScriptSetup { framework })
}
