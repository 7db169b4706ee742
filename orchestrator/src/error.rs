//! Error types for the deployment flow.
//!
//! Every fallible step of a deployment run returns a [`DeployError`]. This
//! enum is exhaustive over the failure modes of the two-stage flow. There is
//! no recovery at any stage: errors propagate to the binary entry point,
//! which translates them into a non-zero exit code.

use thiserror::Error;

/// Errors that can occur during a deployment run.
#[derive(Debug, Error)]
pub enum DeployError {
    /// A required environment value is absent or malformed. Raised before
    /// any network call is attempted.
    #[error("configuration error: {0}")]
    Config(String),

    /// A compiled contract artifact could not be loaded or parsed.
    #[error("artifact error: {0}")]
    Artifact(String),

    /// The configured RPC endpoint cannot be reached, or answers for the
    /// wrong chain.
    #[error("cannot use endpoint {endpoint}: {reason}")]
    Connectivity {
        /// The endpoint that was probed.
        endpoint: String,
        /// Why the probe failed.
        reason: String,
    },

    /// A deployment transaction was rejected at submission time.
    #[error("{contract} deployment rejected at submission: {reason}")]
    Submission {
        /// Name of the contract being deployed.
        contract: String,
        /// The node's rejection reason.
        reason: String,
    },

    /// A submitted deployment transaction failed to mine successfully
    /// (reverted, or mined without producing a contract).
    #[error("{contract} deployment failed to confirm: {reason}")]
    Confirmation {
        /// Name of the contract being deployed.
        contract: String,
        /// What went wrong after submission.
        reason: String,
    },

    /// The confirmation wait exceeded the configured bound. The transaction
    /// may still mine later; the hash is included so an operator can keep
    /// watching it.
    #[error("{contract} confirmation timed out after {waited_secs}s (tx {tx_hash})")]
    ConfirmationTimeout {
        /// Name of the contract being deployed.
        contract: String,
        /// Hash of the still-pending deployment transaction.
        tx_hash: String,
        /// How long we waited before giving up.
        waited_secs: u64,
    },
}
