//! The contract factory seam.
//!
//! The orchestrator never talks to a chain directly; it goes through
//! [`ContractFactory`], which submits a deployment and later resolves it to
//! an address. The split into two calls is deliberate: the transaction hash
//! is available (and logged) the moment the transaction is accepted, so an
//! operator can track a pending deployment even if confirmation stalls.
//!
//! [`crate::rpc::RpcContractFactory`] is the real implementation; tests use
//! a recording mock.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;

use crate::artifacts::ContractArtifact;
use crate::error::DeployError;

/// A deployment transaction that has been accepted but not yet mined.
#[derive(Debug, Clone)]
pub struct PendingDeployment {
    /// Name of the contract being deployed.
    pub contract_name: String,
    /// Hash of the deployment transaction.
    pub tx_hash: B256,
}

/// A confirmed deployment. The address exists only after confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    /// Name of the deployed contract.
    pub contract_name: String,
    /// Hash of the deployment transaction.
    pub tx_hash: B256,
    /// Address the contract was created at.
    pub deployed_address: Address,
}

/// Capability to deploy compiled contracts on some chain.
#[async_trait]
pub trait ContractFactory: Send + Sync {
    /// Submits a deployment transaction for `artifact` with the given
    /// constructor address arguments. Returns as soon as the transaction is
    /// accepted by the node, before it mines.
    async fn deploy(
        &self,
        artifact: &ContractArtifact,
        args: &[Address],
    ) -> Result<PendingDeployment, DeployError>;

    /// Suspends until `pending` is mined and the contract address is known.
    /// The wait is bounded; exceeding the bound is
    /// [`DeployError::ConfirmationTimeout`].
    async fn await_confirmation(
        &self,
        pending: &PendingDeployment,
    ) -> Result<Address, DeployError>;
}
