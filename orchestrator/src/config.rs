//! # Deployment Configuration
//!
//! Network profile table and the validated run configuration.
//!
//! The profile table is compiled in: per-network chain ids, the environment
//! variable names that supply the RPC endpoint and deployer key, and the
//! addresses of the two pre-existing contracts the deployment wires up (the
//! WRLD token and the world NFT). The target network is picked at runtime —
//! there is deliberately no build-time flag to edit before a mainnet run.
//!
//! [`DeployConfig`] is constructed exactly once at startup and validated
//! before any network call: the endpoint must be a parseable URL and the
//! deployer key must be a well-formed secp256k1 private key. Nothing reads
//! the process environment after construction.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::{address, Address, B256};
use alloy_signer_local::PrivateKeySigner;
use url::Url;

use crate::error::DeployError;

// ---------------------------------------------------------------------------
// Network Profiles
// ---------------------------------------------------------------------------

/// The networks a deployment can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    /// Ethereum mainnet — the production target. Mistakes here cost real money.
    Ethereum,
    /// Sepolia — the test target.
    Sepolia,
}

impl Network {
    /// Returns the compiled-in profile for this network.
    pub fn profile(self) -> &'static NetworkProfile {
        match self {
            Network::Ethereum => &ETHEREUM,
            Network::Sepolia => &SEPOLIA,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Ethereum => write!(f, "ethereum"),
            Network::Sepolia => write!(f, "sepolia"),
        }
    }
}

impl FromStr for Network {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ethereum" | "mainnet" => Ok(Network::Ethereum),
            "sepolia" | "testnet" => Ok(Network::Sepolia),
            other => Err(DeployError::Config(format!(
                "unknown network '{other}' (expected 'ethereum' or 'sepolia')"
            ))),
        }
    }
}

/// Immutable per-network facts.
///
/// One profile is active per run. Profiles never mix: every field is sourced
/// from this table or from the environment variables it names, so a Sepolia
/// run can never pick up a mainnet address or key.
#[derive(Debug)]
pub struct NetworkProfile {
    /// The network this profile describes.
    pub network: Network,
    /// EIP-155 chain id. Checked against the endpoint's answer at startup.
    pub chain_id: u64,
    /// Environment variable supplying the JSON-RPC endpoint URL.
    pub rpc_url_var: &'static str,
    /// Environment variable supplying the hex-encoded deployer private key.
    pub signer_key_var: &'static str,
    /// Address of the already-deployed WRLD token contract.
    pub wrld_token: Address,
    /// Address of the already-deployed world NFT contract.
    pub world_nft: Address,
    /// Default bound on each confirmation wait. Test networks mine
    /// erratically, so Sepolia gets a much longer leash than mainnet.
    pub confirmation_timeout: Duration,
}

/// Ethereum mainnet profile.
pub static ETHEREUM: NetworkProfile = NetworkProfile {
    network: Network::Ethereum,
    chain_id: 1,
    rpc_url_var: "ETHEREUM_RPC_URL",
    signer_key_var: "ETHEREUM_DEPLOYER_KEY",
    wrld_token: address!("0xd5d86fc8d5c0ea1ac1ac5dfab6e529c9967a45e9"),
    world_nft: address!("0xbd4455da5929d5639ee098abfaa3241e9ae111af"),
    confirmation_timeout: Duration::from_secs(300),
};

/// Sepolia testnet profile.
pub static SEPOLIA: NetworkProfile = NetworkProfile {
    network: Network::Sepolia,
    chain_id: 11_155_111,
    rpc_url_var: "SEPOLIA_RPC_URL",
    signer_key_var: "SEPOLIA_DEPLOYER_KEY",
    wrld_token: address!("0xa8f39f359c4045f3098eebcecfc966deb5b459c1"),
    world_nft: address!("0x4b84311fb82e348c3bfc48f3bc0117a3df1e88af"),
    confirmation_timeout: Duration::from_secs(900),
};

// ---------------------------------------------------------------------------
// Run Configuration
// ---------------------------------------------------------------------------

/// Validated configuration for one deployment run.
///
/// Built once at startup via [`DeployConfig::from_env`] and passed into the
/// orchestrator. Construction fails fast on any missing or malformed value,
/// before a single byte goes over the wire.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// The active network profile.
    pub profile: &'static NetworkProfile,
    /// Parsed JSON-RPC endpoint URL.
    pub rpc_url: Url,
    /// The deployer signer, derived from the configured private key.
    pub signer: PrivateKeySigner,
    /// Bound on each confirmation wait. Defaults to the profile value;
    /// overridable from the CLI.
    pub confirmation_timeout: Duration,
}

impl DeployConfig {
    /// Builds the configuration for `network` from the process environment.
    pub fn from_env(network: Network) -> Result<Self, DeployError> {
        Self::from_lookup(network, |var| std::env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// The indirection exists so tests can validate the rules without
    /// touching process-global state.
    pub fn from_lookup<F>(network: Network, lookup: F) -> Result<Self, DeployError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = network.profile();

        let raw_url = lookup(profile.rpc_url_var).ok_or_else(|| {
            DeployError::Config(format!("{} is not set", profile.rpc_url_var))
        })?;
        let rpc_url: Url = raw_url.parse().map_err(|e| {
            DeployError::Config(format!("{} is not a valid URL: {e}", profile.rpc_url_var))
        })?;

        let raw_key = lookup(profile.signer_key_var).ok_or_else(|| {
            DeployError::Config(format!("{} is not set", profile.signer_key_var))
        })?;
        let signer = parse_signer_key(profile.signer_key_var, &raw_key)?;

        Ok(Self {
            profile,
            rpc_url,
            signer,
            confirmation_timeout: profile.confirmation_timeout,
        })
    }
}

/// Parses a hex-encoded secp256k1 private key, with or without a `0x` prefix.
///
/// The variable name is only used in diagnostics; the key material itself is
/// never echoed back.
fn parse_signer_key(var: &str, raw: &str) -> Result<PrivateKeySigner, DeployError> {
    let stripped = raw.trim().trim_start_matches("0x");
    if stripped.len() != 64 {
        return Err(DeployError::Config(format!(
            "{var} must be 64 hex characters, got {}",
            stripped.len()
        )));
    }
    let bytes = hex::decode(stripped)
        .map_err(|_| DeployError::Config(format!("{var} is not valid hex")))?;
    let key = B256::from_slice(&bytes);
    PrivateKeySigner::from_bytes(&key)
        .map_err(|_| DeployError::Config(format!("{var} is not a valid secp256k1 key")))
}
