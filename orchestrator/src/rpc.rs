//! Alloy-backed contract factory.
//!
//! Deployment transactions are built as EIP-1559 creation transactions,
//! signed locally with the deployer key, and submitted through
//! `eth_sendRawTransaction`. Confirmation polls for the receipt at a fixed
//! interval under the configured bound — no indefinite waits.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use alloy_consensus::SignableTransaction;
use alloy_eips::eip2718::Encodable2718;
use alloy_eips::BlockNumberOrTag;
use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Bytes, B256};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types::TransactionRequest;
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use tokio::time::{sleep, timeout};

use crate::artifacts::ContractArtifact;
use crate::config::DeployConfig;
use crate::error::DeployError;
use crate::factory::{ContractFactory, PendingDeployment};

/// Gas limit for contract deployments. Generous; unused gas is refunded.
const DEPLOY_GAS_LIMIT: u64 = 5_000_000;

/// Ceiling on the priority fee for deployment transactions: 1 gwei.
const MAX_PRIORITY_FEE_WEI: u128 = 1_000_000_000;

/// How often to poll for a receipt while waiting for confirmation.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Fee caps for a deployment transaction. The max fee rides at twice the
/// current gas price; the priority tip is clamped to the max fee, since a
/// quiet network can price a block well below the 1-gwei ceiling and nodes
/// reject `max_priority_fee > max_fee` at submission.
fn fee_caps(gas_price: u128) -> (u128, u128) {
    let max_fee = gas_price.saturating_mul(2);
    (max_fee, MAX_PRIORITY_FEE_WEI.min(max_fee))
}

/// Interprets a mined deployment receipt. A reverted transaction and a
/// receipt without a contract address are both confirmation failures.
fn interpret_receipt(
    contract: &str,
    status: bool,
    contract_address: Option<Address>,
) -> Result<Address, DeployError> {
    if !status {
        return Err(DeployError::Confirmation {
            contract: contract.to_string(),
            reason: "transaction reverted".to_string(),
        });
    }
    contract_address.ok_or_else(|| DeployError::Confirmation {
        contract: contract.to_string(),
        reason: "receipt carries no contract address".to_string(),
    })
}

/// Polls `fetch` until it yields a value, a failure reason, or the bound
/// elapses. Exceeding the bound is [`DeployError::ConfirmationTimeout`];
/// a fetch failure is [`DeployError::Confirmation`].
async fn poll_for_confirmation<R, F, Fut>(
    contract: &str,
    tx_hash: B256,
    bound: Duration,
    mut fetch: F,
) -> Result<R, DeployError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<R>, String>>,
{
    timeout(bound, async {
        loop {
            match fetch().await {
                Ok(Some(found)) => return Ok(found),
                Ok(None) => sleep(RECEIPT_POLL_INTERVAL).await,
                Err(reason) => {
                    return Err(DeployError::Confirmation {
                        contract: contract.to_string(),
                        reason,
                    })
                }
            }
        }
    })
    .await
    .map_err(|_| DeployError::ConfirmationTimeout {
        contract: contract.to_string(),
        tx_hash: tx_hash.to_string(),
        waited_secs: bound.as_secs(),
    })?
}

/// Lower bound on the next nonce. The latest-block transaction count can
/// lag for a moment after a receipt lands, so we track our own floor to
/// keep back-to-back deployments from reusing a nonce.
#[derive(Debug, Default)]
struct NonceFloor(Mutex<Option<u64>>);

impl NonceFloor {
    /// Returns the nonce to use given the node-reported count, and raises
    /// the floor past it. The floor only ever rises, so even a poisoned
    /// lock still holds a usable value and is not treated as fatal.
    fn next(&self, fetched: u64) -> u64 {
        let mut floor = self.0.lock().unwrap_or_else(|e| e.into_inner());
        let nonce = floor.map_or(fetched, |n| fetched.max(n));
        *floor = Some(nonce + 1);
        nonce
    }
}

/// [`ContractFactory`] implementation over a JSON-RPC endpoint.
#[derive(Debug)]
pub struct RpcContractFactory {
    provider: RootProvider,
    signer: PrivateKeySigner,
    chain_id: u64,
    endpoint: String,
    confirmation_timeout: Duration,
    next_nonce: NonceFloor,
}

impl RpcContractFactory {
    /// Creates a factory bound to the configured endpoint and signer.
    pub fn new(config: &DeployConfig) -> Self {
        Self {
            provider: RootProvider::new_http(config.rpc_url.clone()),
            signer: config.signer.clone(),
            chain_id: config.profile.chain_id,
            endpoint: config.rpc_url.to_string(),
            confirmation_timeout: config.confirmation_timeout,
            next_nonce: NonceFloor::default(),
        }
    }

    /// Verifies the endpoint is reachable and answers for the expected
    /// chain. Called once before stage 1, so a wrong or dead endpoint fails
    /// the run before anything is submitted.
    pub async fn probe(&self) -> Result<(), DeployError> {
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| DeployError::Connectivity {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            })?;

        if chain_id != self.chain_id {
            return Err(DeployError::Connectivity {
                endpoint: self.endpoint.clone(),
                reason: format!(
                    "endpoint reports chain id {chain_id}, expected {}",
                    self.chain_id
                ),
            });
        }

        tracing::info!(chain_id, deployer = %self.signer.address(), "endpoint probe ok");
        Ok(())
    }

    /// Picks the nonce for the next deployment.
    async fn next_nonce(&self) -> Result<u64, DeployError> {
        let fetched = self
            .provider
            .get_transaction_count(self.signer.address())
            .block_id(BlockNumberOrTag::Latest.into())
            .await
            .map_err(|e| DeployError::Connectivity {
                endpoint: self.endpoint.clone(),
                reason: format!("failed to fetch nonce: {e}"),
            })?;

        Ok(self.next_nonce.next(fetched))
    }
}

#[async_trait]
impl ContractFactory for RpcContractFactory {
    async fn deploy(
        &self,
        artifact: &ContractArtifact,
        args: &[Address],
    ) -> Result<PendingDeployment, DeployError> {
        let submission_err = |reason: String| DeployError::Submission {
            contract: artifact.name.clone(),
            reason,
        };

        let nonce = self.next_nonce().await?;
        let gas_price = self
            .provider
            .get_gas_price()
            .await
            .map_err(|e| submission_err(format!("failed to fetch gas price: {e}")))?;
        let (max_fee, priority_fee) = fee_caps(gas_price);

        let request = TransactionRequest::default()
            .with_from(self.signer.address())
            .with_deploy_code(artifact.init_code(args))
            .with_nonce(nonce)
            .with_gas_limit(DEPLOY_GAS_LIMIT)
            .with_max_fee_per_gas(max_fee)
            .with_max_priority_fee_per_gas(priority_fee)
            .with_chain_id(self.chain_id);

        let tx = request
            .build_unsigned()
            .map_err(|e| submission_err(format!("failed to build transaction: {e:?}")))?;

        let signature = self
            .signer
            .sign_hash_sync(&tx.signature_hash())
            .map_err(|e| submission_err(format!("failed to sign transaction: {e}")))?;
        let signed = tx.into_signed(signature);
        let tx_hash = *signed.hash();
        let raw: Bytes = signed.encoded_2718().into();

        tracing::debug!(contract = %artifact.name, %tx_hash, nonce, "submitting deployment");

        let _ = self
            .provider
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| submission_err(e.to_string()))?;

        Ok(PendingDeployment {
            contract_name: artifact.name.clone(),
            tx_hash,
        })
    }

    async fn await_confirmation(
        &self,
        pending: &PendingDeployment,
    ) -> Result<Address, DeployError> {
        let receipt = poll_for_confirmation(
            &pending.contract_name,
            pending.tx_hash,
            self.confirmation_timeout,
            || async move {
                self.provider
                    .get_transaction_receipt(pending.tx_hash)
                    .await
                    .map_err(|e| format!("receipt query failed: {e}"))
            },
        )
        .await?;

        let address = interpret_receipt(
            &pending.contract_name,
            receipt.status(),
            receipt.contract_address,
        )?;

        tracing::debug!(contract = %pending.contract_name, %address, "deployment confirmed");
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};
    use std::panic::AssertUnwindSafe;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn tx() -> B256 {
        b256!("0x1111111111111111111111111111111111111111111111111111111111111111")
    }

    // -----------------------------------------------------------------------
    // Fees
    // -----------------------------------------------------------------------

    #[test]
    fn test_priority_fee_clamped_on_quiet_networks() {
        // 0.1 gwei gas price: the 1-gwei ceiling would exceed the max fee.
        let (max_fee, priority) = fee_caps(100_000_000);
        assert_eq!(max_fee, 200_000_000);
        assert_eq!(priority, 200_000_000);
        assert!(priority <= max_fee);
    }

    #[test]
    fn test_priority_fee_capped_at_one_gwei_when_busy() {
        // 30 gwei gas price: the ceiling applies.
        let (max_fee, priority) = fee_caps(30_000_000_000);
        assert_eq!(max_fee, 60_000_000_000);
        assert_eq!(priority, MAX_PRIORITY_FEE_WEI);
    }

    // -----------------------------------------------------------------------
    // Receipt Interpretation
    // -----------------------------------------------------------------------

    #[test]
    fn test_successful_receipt_yields_the_address() {
        let deployed = address!("0x000000000000000000000000000000000000e5c0");
        let got = interpret_receipt("WorldEscrow", true, Some(deployed)).unwrap();
        assert_eq!(got, deployed);
    }

    #[test]
    fn test_reverted_receipt_is_a_confirmation_error() {
        let err = interpret_receipt("WorldEscrow", false, None).unwrap_err();
        match err {
            DeployError::Confirmation { contract, reason } => {
                assert_eq!(contract, "WorldEscrow");
                assert!(reason.contains("reverted"));
            }
            other => panic!("expected confirmation error, got {other:?}"),
        }
    }

    #[test]
    fn test_addressless_receipt_is_a_confirmation_error() {
        let err = interpret_receipt("WorldRental", true, None).unwrap_err();
        assert!(matches!(
            err,
            DeployError::Confirmation { ref contract, .. } if contract == "WorldRental"
        ));
    }

    // -----------------------------------------------------------------------
    // Confirmation Wait
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_wait_is_bounded() {
        let err = poll_for_confirmation::<Address, _, _>(
            "WorldEscrow",
            tx(),
            Duration::from_secs(10),
            || async { Ok(None) },
        )
        .await
        .unwrap_err();

        match err {
            DeployError::ConfirmationTimeout {
                contract,
                tx_hash,
                waited_secs,
            } => {
                assert_eq!(contract, "WorldEscrow");
                assert!(tx_hash.contains("1111"));
                assert_eq!(waited_secs, 10);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_resolves_once_the_receipt_lands() {
        let polls = AtomicU32::new(0);
        let polls_ref = &polls;

        let found = poll_for_confirmation(
            "WorldEscrow",
            tx(),
            Duration::from_secs(60),
            move || async move {
                if polls_ref.fetch_add(1, Ordering::SeqCst) < 3 {
                    Ok(None)
                } else {
                    Ok(Some(7u32))
                }
            },
        )
        .await
        .unwrap();

        assert_eq!(found, 7);
        assert_eq!(polls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_receipt_query_failure_is_a_confirmation_error() {
        let err = poll_for_confirmation::<Address, _, _>(
            "WorldRental",
            tx(),
            Duration::from_secs(5),
            || async { Err("receipt query failed: node went away".to_string()) },
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            DeployError::Confirmation { ref contract, .. } if contract == "WorldRental"
        ));
    }

    // -----------------------------------------------------------------------
    // Nonce Floor
    // -----------------------------------------------------------------------

    #[test]
    fn test_nonce_floor_only_rises() {
        let floor = NonceFloor::default();
        assert_eq!(floor.next(0), 0);
        // Stale node answer: the floor wins.
        assert_eq!(floor.next(0), 1);
        // Node caught up past the floor: the fetched value wins.
        assert_eq!(floor.next(5), 5);
        assert_eq!(floor.next(3), 6);
    }

    #[test]
    fn test_nonce_floor_survives_a_poisoned_lock() {
        let floor = NonceFloor::default();
        assert_eq!(floor.next(4), 4);

        let _ = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = floor.0.lock().unwrap();
            panic!("poison the lock");
        }));

        // No panic, and the floor is still intact.
        assert_eq!(floor.next(2), 5);
    }
}
