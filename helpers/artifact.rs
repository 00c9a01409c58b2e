//! Compiled contract artifacts in the Hardhat layout
//! (`<root>/<source>.sol/<Contract>.json`).

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
    primitives::Bytes,
};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::FrameworkError;

/// Solc build info lives next to the artifacts but never contains any.
const BUILD_INFO_DIR: &str = "build-info";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: String,
    source_name: String,
    abi: JsonAbi,
    bytecode: String,
}

/// A compiled contract: its ABI and creation bytecode.
#[derive(Clone, Debug)]
pub struct Artifact {
    pub contract_name: String,
    pub source_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl Artifact {
    /// Loads an artifact file, rejecting contracts that cannot be deployed.
    pub fn load(path: &Path) -> Result<Self, FrameworkError> {
        let json = fs::read_to_string(path).map_err(|source| FrameworkError::ReadArtifact {
            path: path.to_owned(),
            source,
        })?;
        let raw: RawArtifact =
            serde_json::from_str(&json).map_err(|source| FrameworkError::MalformedArtifact {
                path: path.to_owned(),
                source,
            })?;

        let bytecode = raw.bytecode.parse::<Bytes>().map_err(|source| {
            FrameworkError::UnlinkedBytecode {
                name: raw.contract_name.clone(),
                source,
            }
        })?;
        if bytecode.is_empty() {
            return Err(FrameworkError::NotCompiled(raw.contract_name));
        }

        Ok(Self {
            contract_name: raw.contract_name,
            source_name: raw.source_name,
            abi: raw.abi,
            bytecode,
        })
    }

    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    /// Creation bytecode followed by the ABI-encoded constructor arguments.
    pub fn deploy_code(&self, args: &[DynSolValue]) -> Result<Bytes, FrameworkError> {
        let encoded_args = match self.abi.constructor() {
            Some(constructor) => constructor.abi_encode_input(args)?,
            None if args.is_empty() => Vec::new(),
            None => {
                return Err(FrameworkError::ConstructorArguments {
                    name: self.contract_name.clone(),
                    given: args.len(),
                })
            }
        };

        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(&encoded_args);
        Ok(code.into())
    }
}

/// Calldata for `method`, picking the overload with a matching number of inputs.
pub fn encode_call(
    abi: &JsonAbi,
    method: &str,
    args: &[DynSolValue],
) -> Result<Bytes, FrameworkError> {
    let function = abi
        .function(method)
        .into_iter()
        .flatten()
        .find(|function| function.inputs.len() == args.len())
        .ok_or_else(|| FrameworkError::UnknownFunction {
            method: method.to_owned(),
            arity: args.len(),
        })?;
    Ok(function.abi_encode_input(args)?.into())
}

/// Directory of compiled artifacts, searched by contract name.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Finds an artifact by simple name (`Token`) or fully qualified name
    /// (`contracts/Token.sol:Token`).
    pub fn find(&self, name: &str) -> Result<Artifact, FrameworkError> {
        if !self.root.is_dir() {
            return Err(FrameworkError::MissingArtifactsDir(self.root.clone()));
        }

        let path = match name.split_once(':') {
            Some((source, contract)) => {
                let path = self.root.join(source).join(format!("{contract}.json"));
                if !path.is_file() {
                    return Err(self.not_found(name));
                }
                path
            }
            None => self.search(name)?,
        };

        tracing::debug!(path = %path.display(), "loading artifact");
        Artifact::load(&path)
    }

    fn search(&self, name: &str) -> Result<PathBuf, FrameworkError> {
        let file_name = format!("{name}.json");
        let mut candidates = Vec::new();
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != OsStr::new(BUILD_INFO_DIR))
        {
            let entry = entry?;
            if entry.file_type().is_file() && entry.file_name() == OsStr::new(&file_name) {
                candidates.push(entry.into_path());
            }
        }

        match candidates.len() {
            0 => Err(self.not_found(name)),
            1 => Ok(candidates.remove(0)),
            _ => {
                let mut candidates: Vec<_> = candidates
                    .iter()
                    .map(|path| self.qualified_name(path, name))
                    .collect();
                candidates.sort();
                Err(FrameworkError::AmbiguousArtifact {
                    name: name.to_owned(),
                    candidates,
                })
            }
        }
    }

    fn qualified_name(&self, path: &Path, contract: &str) -> String {
        let source = path
            .parent()
            .and_then(|dir| dir.strip_prefix(&self.root).ok())
            .unwrap_or(path);
        format!("{}:{contract}", source.display())
    }

    fn not_found(&self, name: &str) -> FrameworkError {
        FrameworkError::ArtifactNotFound {
            name: name.to_owned(),
            root: self.root.clone(),
        }
    }
}
