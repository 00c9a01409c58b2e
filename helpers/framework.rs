//! Contract factories and deployed contract handles.
//!
//! The traits are the seams scripts are written against; [`AlloyFramework`]
//! backs them with a JSON-RPC node.

use std::{sync::Arc, time::Duration};

use alloy::{
    dyn_abi::DynSolValue,
    json_abi::JsonAbi,
    network::TransactionBuilder,
    primitives::{Address, TxHash},
    providers::{DynProvider, Provider},
    rpc::types::{TransactionReceipt, TransactionRequest},
};

use crate::{
    artifact::{encode_call, Artifact, ArtifactStore},
    FrameworkError,
};

/// Resolves contract names to factories.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait Framework: Send + Sync {
    async fn contract_factory(
        &self,
        name: &str,
    ) -> Result<Box<dyn ContractFactory>, FrameworkError>;
}

/// Deploys instances of one compiled contract.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait ContractFactory: Send + Sync {
    /// Submits the creation transaction and waits until it is confirmed.
    async fn deploy(
        &self,
        args: Vec<DynSolValue>,
    ) -> Result<Box<dyn DeployedContract>, FrameworkError>;
}

/// A contract living on-chain.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait DeployedContract: Send + Sync {
    fn address(&self) -> Address;

    /// Sends a transaction calling `method` and waits until it is confirmed.
    async fn send(&self, method: &str, args: Vec<DynSolValue>) -> Result<TxHash, FrameworkError>;
}

/// How long to wait for transactions to be mined.
#[derive(Clone, Copy, Debug)]
pub struct Confirmation {
    pub confirmations: u64,
    pub timeout: Option<Duration>,
}

impl Default for Confirmation {
    fn default() -> Self {
        Self {
            confirmations: 1,
            timeout: None,
        }
    }
}

/// Submits transactions and waits for their receipts, whatever their status.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
trait TransactionSender: Send + Sync {
    async fn send_and_confirm(
        &self,
        tx: TransactionRequest,
        confirmation: Confirmation,
    ) -> Result<TransactionReceipt, FrameworkError>;
}

#[async_trait::async_trait]
impl TransactionSender for DynProvider {
    async fn send_and_confirm(
        &self,
        tx: TransactionRequest,
        confirmation: Confirmation,
    ) -> Result<TransactionReceipt, FrameworkError> {
        let pending = self
            .send_transaction(tx)
            .await?
            .with_required_confirmations(confirmation.confirmations)
            .with_timeout(confirmation.timeout);
        tracing::info!(tx_hash = %pending.tx_hash(), "transaction submitted");
        Ok(pending.get_receipt().await?)
    }
}

/// Sends transactions from one account and rejects reverted ones.
#[derive(Clone)]
struct Client {
    transactions: Arc<dyn TransactionSender>,
    sender: Address,
    confirmation: Confirmation,
}

impl Client {
    async fn transact(&self, tx: TransactionRequest) -> Result<TransactionReceipt, FrameworkError> {
        let receipt = self
            .transactions
            .send_and_confirm(tx.with_from(self.sender), self.confirmation)
            .await?;
        let tx_hash = receipt.transaction_hash;
        if !receipt.status() {
            return Err(FrameworkError::Reverted(tx_hash));
        }
        tracing::info!(
            %tx_hash,
            block = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "transaction confirmed"
        );
        Ok(receipt)
    }
}

/// [`Framework`] deploying artifacts from an [`ArtifactStore`] through a provider.
#[derive(Clone)]
pub struct AlloyFramework {
    client: Client,
    artifacts: ArtifactStore,
}

impl AlloyFramework {
    pub fn new(
        provider: DynProvider,
        sender: Address,
        artifacts: ArtifactStore,
        confirmation: Confirmation,
    ) -> Self {
        Self {
            client: Client {
                transactions: Arc::new(provider),
                sender,
                confirmation,
            },
            artifacts,
        }
    }
}

#[async_trait::async_trait]
impl Framework for AlloyFramework {
    async fn contract_factory(
        &self,
        name: &str,
    ) -> Result<Box<dyn ContractFactory>, FrameworkError> {
        let artifact = self.artifacts.find(name)?;
        tracing::debug!(contract = %artifact.fully_qualified_name(), "resolved contract factory");
        Ok(Box::new(AlloyContractFactory {
            artifact,
            client: self.client.clone(),
        }))
    }
}

pub struct AlloyContractFactory {
    artifact: Artifact,
    client: Client,
}

#[async_trait::async_trait]
impl ContractFactory for AlloyContractFactory {
    #[tracing::instrument(skip_all, fields(contract = %self.artifact.contract_name))]
    async fn deploy(
        &self,
        args: Vec<DynSolValue>,
    ) -> Result<Box<dyn DeployedContract>, FrameworkError> {
        let code = self.artifact.deploy_code(&args)?;
        let receipt = self
            .client
            .transact(TransactionRequest::default().with_deploy_code(code))
            .await?;
        let address = receipt
            .contract_address
            .ok_or(FrameworkError::MissingContractAddress(receipt.transaction_hash))?;
        tracing::info!(%address, "contract deployed");

        Ok(Box::new(AlloyContract {
            address,
            abi: self.artifact.abi.clone(),
            client: self.client.clone(),
        }))
    }
}

pub struct AlloyContract {
    address: Address,
    abi: JsonAbi,
    client: Client,
}

#[async_trait::async_trait]
impl DeployedContract for AlloyContract {
    fn address(&self) -> Address {
        self.address
    }

    #[tracing::instrument(skip(self, args), fields(contract = %self.address))]
    async fn send(&self, method: &str, args: Vec<DynSolValue>) -> Result<TxHash, FrameworkError> {
        let calldata = encode_call(&self.abi, method, &args)?;
        let receipt = self
            .client
            .transact(
                TransactionRequest::default()
                    .with_to(self.address)
                    .with_input(calldata),
            )
            .await?;
        Ok(receipt.transaction_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256, Bytes, TxKind, B256, U256};
    use serde_json::json;

    const SENDER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const DEPLOYED: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");
    const TX_HASH: B256 = b256!("0x2222222222222222222222222222222222222222222222222222222222222222");

    const TOKEN_ABI: &str = r#"[
        {
            "type": "constructor",
            "inputs": [
                { "name": "_name", "type": "string" },
                { "name": "_symbol", "type": "string" }
            ],
            "stateMutability": "nonpayable"
        },
        {
            "type": "function",
            "name": "mint",
            "inputs": [
                { "name": "amount", "type": "uint256" },
                { "name": "_uri", "type": "string" }
            ],
            "outputs": [],
            "stateMutability": "nonpayable"
        }
    ]"#;

    /// Receipt in the shape returned by `eth_getTransactionReceipt`.
    fn receipt(success: bool, contract_address: Option<Address>) -> TransactionReceipt {
        serde_json::from_value(json!({
            "type": "0x2",
            "status": if success { "0x1" } else { "0x0" },
            "cumulativeGasUsed": "0x5208",
            "logs": [],
            "logsBloom": format!("0x{}", "0".repeat(512)),
            "transactionHash": TX_HASH,
            "transactionIndex": "0x0",
            "blockHash": B256::repeat_byte(0x33),
            "blockNumber": "0x1",
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x3b9aca00",
            "from": SENDER,
            "to": null,
            "contractAddress": contract_address,
        }))
        .unwrap()
    }

    fn client(transactions: MockTransactionSender) -> Client {
        Client {
            transactions: Arc::new(transactions),
            sender: SENDER,
            confirmation: Confirmation {
                confirmations: 2,
                timeout: None,
            },
        }
    }

    fn artifact() -> Artifact {
        Artifact {
            contract_name: "Token".to_owned(),
            source_name: "contracts/Token.sol".to_owned(),
            abi: serde_json::from_str(TOKEN_ABI).unwrap(),
            bytecode: Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]),
        }
    }

    fn constructor_args() -> Vec<DynSolValue> {
        vec![
            DynSolValue::String("Token".into()),
            DynSolValue::String("TKN".into()),
        ]
    }

    fn mint_args() -> Vec<DynSolValue> {
        vec![
            DynSolValue::Uint(U256::from(10), 256),
            DynSolValue::String("ipfs://token".into()),
        ]
    }

    fn factory_with(transactions: MockTransactionSender) -> AlloyContractFactory {
        AlloyContractFactory {
            artifact: artifact(),
            client: client(transactions),
        }
    }

    #[tokio::test]
    async fn deploy_sends_creation_code_from_sender() {
        let code = artifact().deploy_code(&constructor_args()).unwrap();
        let mut transactions = MockTransactionSender::new();
        transactions
            .expect_send_and_confirm()
            .withf(move |tx, confirmation| {
                tx.from == Some(SENDER)
                    && tx.to == Some(TxKind::Create)
                    && tx.input.input() == Some(&code)
                    && confirmation.confirmations == 2
            })
            .times(1)
            .return_once(|_, _| Ok(receipt(true, Some(DEPLOYED))));

        let contract = factory_with(transactions)
            .deploy(constructor_args())
            .await
            .unwrap();
        assert_eq!(contract.address(), DEPLOYED);
    }

    #[tokio::test]
    async fn reverted_deployment_is_an_error() {
        let mut transactions = MockTransactionSender::new();
        transactions
            .expect_send_and_confirm()
            .times(1)
            .return_once(|_, _| Ok(receipt(false, Some(DEPLOYED))));

        let result = factory_with(transactions).deploy(constructor_args()).await;
        assert!(matches!(
            result,
            Err(FrameworkError::Reverted(hash)) if hash == TX_HASH
        ));
    }

    #[tokio::test]
    async fn deployment_without_contract_address_is_an_error() {
        let mut transactions = MockTransactionSender::new();
        transactions
            .expect_send_and_confirm()
            .times(1)
            .return_once(|_, _| Ok(receipt(true, None)));

        let result = factory_with(transactions).deploy(constructor_args()).await;
        assert!(matches!(
            result,
            Err(FrameworkError::MissingContractAddress(hash)) if hash == TX_HASH
        ));
    }

    #[tokio::test]
    async fn bad_constructor_arguments_send_nothing() {
        // No expectations: any submission fails the test.
        let transactions = MockTransactionSender::new();

        let result = factory_with(transactions)
            .deploy(vec![DynSolValue::Bool(true)])
            .await;
        assert!(matches!(result, Err(FrameworkError::Abi(_))));
    }

    #[tokio::test]
    async fn send_calls_the_deployed_contract() {
        let calldata = encode_call(&artifact().abi, "mint", &mint_args()).unwrap();
        let mut transactions = MockTransactionSender::new();
        transactions
            .expect_send_and_confirm()
            .withf(move |tx, _| {
                tx.from == Some(SENDER)
                    && tx.to == Some(TxKind::Call(DEPLOYED))
                    && tx.input.input() == Some(&calldata)
            })
            .times(1)
            .return_once(|_, _| Ok(receipt(true, None)));

        let contract = AlloyContract {
            address: DEPLOYED,
            abi: artifact().abi,
            client: client(transactions),
        };
        assert_eq!(contract.send("mint", mint_args()).await.unwrap(), TX_HASH);
    }

    #[tokio::test]
    async fn reverted_call_is_an_error() {
        let mut transactions = MockTransactionSender::new();
        transactions
            .expect_send_and_confirm()
            .times(1)
            .return_once(|_, _| Ok(receipt(false, None)));

        let contract = AlloyContract {
            address: DEPLOYED,
            abi: artifact().abi,
            client: client(transactions),
        };
        assert!(matches!(
            contract.send("mint", mint_args()).await,
            Err(FrameworkError::Reverted(hash)) if hash == TX_HASH
        ));
    }

    #[tokio::test]
    async fn contract_factory_reports_missing_artifacts() {
        let dir = tempfile::TempDir::new().unwrap();
        let framework = AlloyFramework {
            client: client(MockTransactionSender::new()),
            artifacts: ArtifactStore::new(dir.path().join("artifacts")),
        };

        assert!(matches!(
            framework.contract_factory("Token").await,
            Err(FrameworkError::MissingArtifactsDir(_))
        ));
    }
}
