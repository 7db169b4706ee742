//! # WorldRent Deployment Orchestrator
//!
//! Library behind the `worldrent-deploy` binary: deploys the WorldRent
//! contract pair — the escrow contract, then the rental contract whose
//! constructor takes the escrow's freshly-confirmed address.
//!
//! The pieces:
//!
//! - [`config`] — network profile table and the validated run configuration.
//! - [`artifacts`] — compiled contract artifacts and init-code assembly.
//! - [`factory`] — the [`ContractFactory`] seam the orchestrator deploys
//!   through.
//! - [`rpc`] — the alloy-backed factory implementation.
//! - [`orchestrator`] — the two-stage run itself.
//! - [`error`] — the failure taxonomy; everything is fatal, nothing retries.
//!
//! Process concerns (exit codes, CLI, logging setup) live in the binary
//! crate; this library only returns results.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod factory;
pub mod orchestrator;
pub mod rpc;

pub use artifacts::{ContractArtifact, WORLD_ESCROW, WORLD_RENTAL};
pub use config::{DeployConfig, Network, NetworkProfile};
pub use error::DeployError;
pub use factory::{ContractFactory, DeploymentResult, PendingDeployment};
pub use orchestrator::{DeploymentReport, Orchestrator};
pub use rpc::RpcContractFactory;
