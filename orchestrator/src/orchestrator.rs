//! # The Deployment Run
//!
//! Drives the two-stage, dependency-ordered deployment:
//!
//! 1. `WorldEscrow(wrld_token, world_nft)`
//! 2. `WorldRental(wrld_token, escrow_address)`
//!
//! Stage 2's constructor takes the address stage 1's confirmation returned,
//! so its transaction is never submitted until the escrow is mined. The run
//! is strictly sequential; the two confirmation waits are the only
//! suspension points. There are no retries and no rollback: any error is
//! fatal to the run, and a confirmed escrow stays deployed even if the
//! rental stage then fails.
//!
//! Operator-facing lines (transaction hashes, confirmed addresses) go to
//! stdout the moment they are known; diagnostics go through `tracing`.

use std::fmt;

use alloy_primitives::Address;

use crate::artifacts::ContractArtifact;
use crate::config::NetworkProfile;
use crate::error::DeployError;
use crate::factory::{ContractFactory, DeploymentResult};

/// The outcome of a fully successful run: both contracts confirmed.
#[derive(Debug, Clone)]
pub struct DeploymentReport {
    /// Stage 1 result.
    pub escrow: DeploymentResult,
    /// Stage 2 result. Its constructor holds `escrow.deployed_address`.
    pub rental: DeploymentResult,
}

impl fmt::Display for DeploymentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} deployed at {} (tx {})",
            self.escrow.contract_name, self.escrow.deployed_address, self.escrow.tx_hash
        )?;
        write!(
            f,
            "{} deployed at {} (tx {})",
            self.rental.contract_name, self.rental.deployed_address, self.rental.tx_hash
        )
    }
}

/// Orchestrates one deployment run against a [`ContractFactory`].
pub struct Orchestrator<F> {
    factory: F,
    wrld_token: Address,
    world_nft: Address,
    escrow_artifact: ContractArtifact,
    rental_artifact: ContractArtifact,
}

impl<F: ContractFactory> Orchestrator<F> {
    /// Builds an orchestrator for the given network profile.
    pub fn new(
        profile: &NetworkProfile,
        factory: F,
        escrow_artifact: ContractArtifact,
        rental_artifact: ContractArtifact,
    ) -> Self {
        Self {
            factory,
            wrld_token: profile.wrld_token,
            world_nft: profile.world_nft,
            escrow_artifact,
            rental_artifact,
        }
    }

    /// Runs both stages to completion.
    ///
    /// On error the run stops where it is. If stage 1 already confirmed, the
    /// escrow address is logged so the operator knows a contract is now
    /// deployed with nothing referencing it.
    pub async fn run(&self) -> Result<DeploymentReport, DeployError> {
        let escrow = self
            .deploy_and_confirm(&self.escrow_artifact, &[self.wrld_token, self.world_nft])
            .await?;

        // The rental constructor takes the address stage 1 just confirmed,
        // which is why stage 2 cannot be submitted any earlier.
        let rental_args = [self.wrld_token, escrow.deployed_address];
        let rental = match self
            .deploy_and_confirm(&self.rental_artifact, &rental_args)
            .await
        {
            Ok(rental) => rental,
            Err(e) => {
                tracing::error!(
                    escrow = %escrow.deployed_address,
                    "rental deployment failed; the escrow remains deployed with no rental referencing it"
                );
                return Err(e);
            }
        };

        Ok(DeploymentReport { escrow, rental })
    }

    /// Submits one deployment, reports the hash immediately, then suspends
    /// until the contract address is known.
    async fn deploy_and_confirm(
        &self,
        artifact: &ContractArtifact,
        args: &[Address],
    ) -> Result<DeploymentResult, DeployError> {
        let pending = self.factory.deploy(artifact, args).await?;
        println!("{} deploy tx hash: {}", pending.contract_name, pending.tx_hash);
        tracing::info!(
            contract = %pending.contract_name,
            tx_hash = %pending.tx_hash,
            "deployment submitted"
        );

        let deployed_address = self.factory.await_confirmation(&pending).await?;
        println!("{} address: {}", pending.contract_name, deployed_address);
        tracing::info!(
            contract = %pending.contract_name,
            address = %deployed_address,
            "deployment confirmed"
        );

        Ok(DeploymentResult {
            contract_name: pending.contract_name,
            tx_hash: pending.tx_hash,
            deployed_address,
        })
    }
}
