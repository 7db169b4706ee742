//! # CLI Interface
//!
//! Argument structure for `worldrent-deploy` using `clap` derive. The
//! target network is a runtime flag — switching between Sepolia and mainnet
//! never requires a rebuild. Secrets stay out of the CLI: the RPC endpoint
//! and deployer key come from the environment variables named by the
//! selected network profile.

use clap::Parser;
use std::path::PathBuf;

use worldrent_orchestrator::Network;

/// Deploys the WorldRent contract pair.
///
/// Deploys the escrow contract, waits for it to confirm, then deploys the
/// rental contract with the escrow's address baked into its constructor.
#[derive(Parser, Debug)]
#[command(name = "worldrent-deploy", about = "WorldRent contract deployer", version)]
pub struct DeployerCli {
    /// Target network: "ethereum" (production) or "sepolia" (test).
    #[arg(long, env = "WORLDRENT_NETWORK", default_value = "sepolia")]
    pub network: Network,

    /// Directory holding the compiled contract artifacts
    /// (`WorldEscrow.json`, `WorldRental.json`).
    #[arg(long, env = "WORLDRENT_ARTIFACTS_DIR", default_value = "artifacts")]
    pub artifacts_dir: PathBuf,

    /// Override the per-network bound on each confirmation wait, in seconds.
    #[arg(long)]
    pub confirmation_timeout_secs: Option<u64>,

    /// Log output format: "pretty" or "json".
    #[arg(long, env = "WORLDRENT_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}
