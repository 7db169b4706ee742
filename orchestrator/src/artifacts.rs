//! Compiled contract artifacts.
//!
//! The contracts themselves live in a separate repository and are compiled
//! by external tooling; this crate only consumes the compiler's JSON output
//! (`<artifacts-dir>/<ContractName>.json` with `contractName` and `bytecode`
//! fields). Deployment init code is the creation bytecode followed by the
//! statically-encoded constructor arguments — both constructors here take
//! only addresses, each encoded as a left-padded 32-byte word.

use std::path::Path;

use alloy_primitives::{Address, Bytes};
use serde::Deserialize;

use crate::error::DeployError;

/// Name of the escrow contract artifact (stage 1).
pub const WORLD_ESCROW: &str = "WorldEscrow";

/// Name of the rental contract artifact (stage 2).
pub const WORLD_RENTAL: &str = "WorldRental";

/// On-disk shape of a compiler artifact. Only the fields we need.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactFile {
    contract_name: String,
    bytecode: String,
}

/// A compiled contract ready for deployment.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    /// Contract name as reported by the compiler.
    pub name: String,
    /// Creation bytecode, without constructor arguments.
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Loads `<dir>/<name>.json` and checks it describes the expected contract.
    pub fn load(dir: impl AsRef<Path>, name: &str) -> Result<Self, DeployError> {
        let path = dir.as_ref().join(format!("{name}.json"));
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            DeployError::Artifact(format!("failed to read {}: {e}", path.display()))
        })?;
        let file: ArtifactFile = serde_json::from_str(&contents).map_err(|e| {
            DeployError::Artifact(format!("failed to parse {}: {e}", path.display()))
        })?;

        if file.contract_name != name {
            return Err(DeployError::Artifact(format!(
                "{} describes contract '{}', expected '{name}'",
                path.display(),
                file.contract_name
            )));
        }

        let stripped = file.bytecode.trim_start_matches("0x");
        let bytecode = hex::decode(stripped)
            .map_err(|e| {
                DeployError::Artifact(format!("{}: bytecode is not hex: {e}", path.display()))
            })?
            .into();

        Ok(Self {
            name: file.contract_name,
            bytecode,
        })
    }

    /// Assembles deployment init code: creation bytecode plus one 32-byte
    /// word per constructor address argument.
    pub fn init_code(&self, args: &[Address]) -> Bytes {
        let mut code = Vec::with_capacity(self.bytecode.len() + 32 * args.len());
        code.extend_from_slice(&self.bytecode);
        for arg in args {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(arg.as_slice());
            code.extend_from_slice(&word);
        }
        code.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn artifact() -> ContractArtifact {
        ContractArtifact {
            name: WORLD_ESCROW.to_string(),
            bytecode: vec![0x60, 0x80, 0x60, 0x40].into(),
        }
    }

    #[test]
    fn test_init_code_appends_address_words() {
        let token = address!("0xa8f39f359c4045f3098eebcecfc966deb5b459c1");
        let nft = address!("0x4b84311fb82e348c3bfc48f3bc0117a3df1e88af");

        let code = artifact().init_code(&[token, nft]);
        assert_eq!(code.len(), 4 + 64);
        assert_eq!(&code[..4], &[0x60, 0x80, 0x60, 0x40]);
        // First word: 12 zero bytes then the token address.
        assert_eq!(&code[4..16], &[0u8; 12]);
        assert_eq!(&code[16..36], token.as_slice());
        // Second word: the NFT address.
        assert_eq!(&code[36..48], &[0u8; 12]);
        assert_eq!(&code[48..68], nft.as_slice());
    }

    #[test]
    fn test_init_code_without_args_is_bare_bytecode() {
        let code = artifact().init_code(&[]);
        assert_eq!(code.as_ref(), &[0x60, 0x80, 0x60, 0x40]);
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("WorldEscrow.json"),
            r#"{"contractName":"WorldEscrow","bytecode":"0x6080604052"}"#,
        )
        .unwrap();

        let artifact = ContractArtifact::load(dir.path(), WORLD_ESCROW).unwrap();
        assert_eq!(artifact.name, "WorldEscrow");
        assert_eq!(artifact.bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
    }

    #[test]
    fn test_load_rejects_mismatched_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("WorldEscrow.json"),
            r#"{"contractName":"SomethingElse","bytecode":"0x00"}"#,
        )
        .unwrap();

        let err = ContractArtifact::load(dir.path(), WORLD_ESCROW).unwrap_err();
        assert!(matches!(err, DeployError::Artifact(_)));
    }

    #[test]
    fn test_load_missing_file_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContractArtifact::load(dir.path(), WORLD_RENTAL).unwrap_err();
        assert!(matches!(err, DeployError::Artifact(_)));
    }
}
