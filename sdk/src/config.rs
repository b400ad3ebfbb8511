use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{ProgramRegistry, SdkError, SdkResult};

/// SDK configuration for reading SVE state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SdkConfig {
    /// RPC endpoint URL
    pub rpc_url: String,

    /// Commitment level used for state reads ("processed", "confirmed", "finalized")
    #[serde(default = "default_commitment")]
    pub commitment: String,

    /// Program ids; unspecified entries fall back to the well-known deployments
    #[serde(default)]
    pub programs: ProgramRegistry,
}

fn default_commitment() -> String {
    "confirmed".to_string()
}

impl SdkConfig {
    pub fn localnet() -> Self {
        Self {
            rpc_url: "http://localhost:8899".to_string(),
            commitment: default_commitment(),
            programs: ProgramRegistry::default(),
        }
    }

    pub fn devnet() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            commitment: default_commitment(),
            programs: ProgramRegistry::default(),
        }
    }

    pub fn mainnet() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: default_commitment(),
            programs: ProgramRegistry::default(),
        }
    }

    pub fn with_rpc_url(mut self, url: String) -> Self {
        self.rpc_url = url;
        self
    }

    pub fn with_programs(mut self, programs: ProgramRegistry) -> Self {
        self.programs = programs;
        self
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> SdkResult<Self> {
        toml::from_str(content).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SdkError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self::localnet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config = SdkConfig::from_toml_str(r#"rpc_url = "http://127.0.0.1:8899""#).unwrap();
        assert_eq!(config.rpc_url, "http://127.0.0.1:8899");
        assert_eq!(config.commitment, "confirmed");
        assert_eq!(config.programs, ProgramRegistry::default());
    }

    #[test]
    fn test_program_override() {
        let sve = solana_sdk::pubkey::Pubkey::new_unique();
        let config = SdkConfig::from_toml_str(&format!(
            "rpc_url = \"http://localhost:8899\"\ncommitment = \"finalized\"\n\n[programs]\nsve = \"{}\"\n",
            sve
        ))
        .unwrap();
        assert_eq!(config.commitment, "finalized");
        assert_eq!(config.programs.sve, sve);
        assert_eq!(config.programs.yi, ProgramRegistry::default().yi);
    }

    #[test]
    fn test_invalid_pubkey_is_config_error() {
        let err = SdkConfig::from_toml_str("rpc_url = \"x\"\n[programs]\nsve = \"nope\"\n").unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SdkConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_serialize_roundtrip_through_toml() {
        let config = SdkConfig::devnet();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(SdkConfig::from_toml_str(&text).unwrap(), config);
    }
}
