//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Address derivation failed (bump search exhausted or malformed seeds)
    #[error("Address derivation failed: {0}")]
    Derivation(String),

    /// A record the operation depends on does not exist
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// An argument could not be encoded into instruction data
    #[error("Failed to encode instruction: {0}")]
    Encoding(String),

    /// Account bytes did not match the expected layout
    #[error("Failed to deserialize account: {0}")]
    Deserialization(String),

    /// State read failed
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Invalid parameters
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<solana_client::client_error::ClientError> for SdkError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        SdkError::Rpc(err.to_string())
    }
}

impl From<std::io::Error> for SdkError {
    fn from(err: std::io::Error) -> Self {
        SdkError::Encoding(err.to_string())
    }
}

impl From<solana_sdk::program_error::ProgramError> for SdkError {
    fn from(err: solana_sdk::program_error::ProgramError) -> Self {
        SdkError::Encoding(err.to_string())
    }
}

pub type SdkResult<T> = Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_account_not_found() {
        let err = SdkError::AccountNotFound("SVE 1111".into());
        assert_eq!(err.to_string(), "Account not found: SVE 1111");
    }

    #[test]
    fn test_program_error_maps_to_encoding() {
        let err: SdkError = solana_sdk::program_error::ProgramError::InvalidArgument.into();
        assert!(matches!(err, SdkError::Encoding(_)));
    }
}
