//! # WorldRent Deployer
//!
//! Entry point for the `worldrent-deploy` binary. Parses CLI arguments,
//! initializes logging, builds the validated configuration from the
//! environment, probes the endpoint, and runs the two-stage deployment.
//!
//! The library returns a structured result; this is the only place that
//! translates it into a process exit code — `Ok` exits 0, any error is
//! printed to stderr and exits non-zero.

mod cli;
mod logging;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use worldrent_orchestrator::{
    ContractArtifact, DeployConfig, Orchestrator, RpcContractFactory, WORLD_ESCROW, WORLD_RENTAL,
};

use cli::DeployerCli;
use logging::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DeployerCli::parse();
    logging::init_logging(
        "worldrent_deployer=info,worldrent_orchestrator=info",
        LogFormat::from_str_lossy(&cli.log_format),
    );

    tracing::info!(
        network = %cli.network,
        artifacts_dir = %cli.artifacts_dir.display(),
        "starting deployment run"
    );

    // All validation happens here, before any network call.
    let mut config = DeployConfig::from_env(cli.network)
        .with_context(|| format!("incomplete configuration for network '{}'", cli.network))?;
    if let Some(secs) = cli.confirmation_timeout_secs {
        config.confirmation_timeout = Duration::from_secs(secs);
    }

    let escrow_artifact = ContractArtifact::load(&cli.artifacts_dir, WORLD_ESCROW)
        .with_context(|| format!("loading {WORLD_ESCROW} artifact"))?;
    let rental_artifact = ContractArtifact::load(&cli.artifacts_dir, WORLD_RENTAL)
        .with_context(|| format!("loading {WORLD_RENTAL} artifact"))?;

    let factory = RpcContractFactory::new(&config);
    factory.probe().await.context("endpoint probe failed")?;

    let orchestrator = Orchestrator::new(config.profile, factory, escrow_artifact, rental_artifact);
    let report = orchestrator.run().await.context("deployment run failed")?;

    println!("{report}");
    tracing::info!("deployment run complete");
    Ok(())
}
