use std::{io, process::ExitCode};

use helpers::{setup_script, Config, ScriptSetup};
use scripts::{deploy_and_mint, report, Deployment};

#[tokio::main]
async fn main() -> ExitCode {
    report(run().await, &mut io::stderr())
}

async fn run() -> anyhow::Result<Deployment> {
    let config = Config::from_env()?;
    helpers::logging::initialize(&config.log_filter);

    let ScriptSetup { framework, .. } = setup_script(&config).await?;
    deploy_and_mint(&framework, &mut io::stdout()).await
}
