use std::{io, path::PathBuf};

use alloy::{
    primitives::{hex::FromHexError, TxHash},
    providers::PendingTransactionError,
    transports::TransportError,
};

/// Errors raised while resolving, deploying or calling contracts.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("artifacts directory {0} does not exist, were the contracts compiled?")]
    MissingArtifactsDir(PathBuf),

    #[error("artifact for contract {name:?} not found in {root}")]
    ArtifactNotFound { name: String, root: PathBuf },

    #[error("multiple artifacts exist for contract {name:?}, use one of the fully qualified names {candidates:?}")]
    AmbiguousArtifact {
        name: String,
        candidates: Vec<String>,
    },

    #[error("failed to scan artifacts directory")]
    ScanArtifacts(#[from] walkdir::Error),

    #[error("failed to read artifact {path}")]
    ReadArtifact {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("artifact {path} is malformed")]
    MalformedArtifact {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("contract {0:?} has no creation bytecode (abstract contract or interface)")]
    NotCompiled(String),

    #[error("creation bytecode of contract {name:?} is not valid hex (unlinked libraries?)")]
    UnlinkedBytecode {
        name: String,
        #[source]
        source: FromHexError,
    },

    #[error("contract {name:?} has no constructor but {given} arguments were given")]
    ConstructorArguments { name: String, given: usize },

    #[error("no function {method:?} taking {arity} arguments in contract ABI")]
    UnknownFunction { method: String, arity: usize },

    #[error("failed to ABI-encode arguments")]
    Abi(#[from] alloy::dyn_abi::Error),

    #[error(transparent)]
    Rpc(#[from] TransportError),

    #[error("failed waiting for transaction confirmation")]
    PendingTransaction(#[from] PendingTransactionError),

    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    #[error("deployment transaction {0} has no contract address in its receipt")]
    MissingContractAddress(TxHash),

    #[error("no private key configured and the node exposes no accounts")]
    NoSigner,
}
