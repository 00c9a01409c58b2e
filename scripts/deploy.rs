//! Deploys the SuperMarioWorld ERC1155 collection and mints its first token.

use std::{io::Write, process::ExitCode};

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, TxHash, U256},
};
use anyhow::Context;
use helpers::Framework;

pub const CONTRACT_NAME: &str = "SuperMarioWorldERC1155";
pub const TOKEN_SYMBOL: &str = "SPRME";
pub const TOKEN_ID: u64 = 10;
pub const TOKEN_URI: &str = "https://ipfs.io/ipfs/QmR5Gtu8QykxXn4eVPcHxK3cP6BXCvmZuUVLqwnUeTHSE3";

/// Result of a successful run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deployment {
    pub address: Address,
    pub mint_tx: TxHash,
}

/// Deploys the collection, then mints one token.
///
/// A failed mint does not undo the deployment: the contract stays on-chain
/// without any token.
pub async fn deploy_and_mint(
    framework: &dyn Framework,
    out: &mut impl Write,
) -> anyhow::Result<Deployment> {
    let factory = framework
        .contract_factory(CONTRACT_NAME)
        .await
        .context("failed to get contract factory")?;

    let contract = factory
        .deploy(vec![
            DynSolValue::String(CONTRACT_NAME.to_owned()),
            DynSolValue::String(TOKEN_SYMBOL.to_owned()),
        ])
        .await
        .context("failed to deploy contract")?;
    let address = contract.address();
    writeln!(out, "Success! Contract was deployed to: {address}")?;

    let mint_tx = contract
        .send(
            "mint",
            vec![
                DynSolValue::Uint(U256::from(TOKEN_ID), 256),
                DynSolValue::String(TOKEN_URI.to_owned()),
            ],
        )
        .await
        .with_context(|| format!("failed to mint token {TOKEN_ID} on {address}"))?;
    writeln!(out, "NFTs successfully minted")?;

    Ok(Deployment { address, mint_tx })
}

/// Maps the outcome of a run to the process exit code, printing the full
/// error chain on failure.
pub fn report<T>(result: anyhow::Result<T>, err: &mut impl Write) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            // Nothing left to report to if stderr is gone.
            let _ = writeln!(err, "Error: {error:?}");
            ExitCode::FAILURE
        }
    }
}
