use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::prelude::*;

use super::{SdkError, SdkResult};

/// Program ID of the SVE wrapper program
pub const SVE_PROGRAM_ID: &str = "SVETokenWrapper1111111111111111111111111111";

/// Program ID of the Yi staking program
pub const YI_PROGRAM_ID: &str = "YiiTopEnX2vyoWdXuG45ovDFYZars4XZ4w6td6RVTFm";

/// Program ID of the locked voter (vote escrow) program
pub const LOCKED_VOTER_PROGRAM_ID: &str = "LocktDzaV1W2Bm9DeZeiyz4J9zs4fRqNiYqQyracRXw";

/// Default minimum lock duration of a new wrapper (1 year, in seconds)
pub const DEFAULT_MIN_LOCK_DURATION: u64 = 365 * 24 * 60 * 60;

/// Seeds for protocol PDAs
pub mod seeds {
    /// `[SVE, wrapper_mint]` under the SVE program
    pub const SVE: &[u8] = b"SVE";
    /// `[ESCROW, locker, owner]` under the locked voter program
    pub const ESCROW: &[u8] = b"Escrow";
    /// `[YI_TOKEN, yi_mint]` under the Yi program
    pub const YI_TOKEN: &[u8] = b"YiToken";
}

/// Anchor account discriminators (`sha256("account:<Name>")[..8]`)
pub mod discriminators {
    pub const SVE_ACCOUNT: [u8; 8] = [52, 77, 47, 100, 227, 123, 230, 69];
    pub const ESCROW_ACCOUNT: [u8; 8] = [31, 213, 123, 187, 186, 22, 218, 155];
}

/// Every program id the SDK addresses.
///
/// Built once from [`crate::SdkConfig`] and shared by reference; nothing in
/// the crate looks program ids up on its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramRegistry {
    #[serde(with = "pubkey_serde")]
    pub sve: Pubkey,
    #[serde(with = "pubkey_serde")]
    pub yi: Pubkey,
    #[serde(with = "pubkey_serde")]
    pub locked_voter: Pubkey,
    #[serde(with = "pubkey_serde")]
    pub token: Pubkey,
    #[serde(with = "pubkey_serde")]
    pub associated_token: Pubkey,
    #[serde(with = "pubkey_serde")]
    pub system: Pubkey,
}

impl ProgramRegistry {
    /// Registry with an alternative SVE program deployment
    pub fn with_sve_program(mut self, sve: Pubkey) -> Self {
        self.sve = sve;
        self
    }

    /// Parse a registry from base58 strings, e.g. from a config file
    pub fn from_strs(sve: &str, yi: &str, locked_voter: &str) -> SdkResult<Self> {
        Ok(Self {
            sve: parse_pubkey(sve)?,
            yi: parse_pubkey(yi)?,
            locked_voter: parse_pubkey(locked_voter)?,
            ..Self::default()
        })
    }
}

impl Default for ProgramRegistry {
    fn default() -> Self {
        Self {
            sve: Pubkey::from_str_const(SVE_PROGRAM_ID),
            yi: Pubkey::from_str_const(YI_PROGRAM_ID),
            locked_voter: Pubkey::from_str_const(LOCKED_VOTER_PROGRAM_ID),
            token: spl_token::ID,
            associated_token: spl_associated_token_account::ID,
            system: solana_sdk::system_program::ID,
        }
    }
}

/// Parse a base58 pubkey, mapping failures to [`SdkError::InvalidParameters`]
pub fn parse_pubkey(value: &str) -> SdkResult<Pubkey> {
    Pubkey::from_str(value)
        .map_err(|e| SdkError::InvalidParameters(format!("invalid pubkey {}: {}", value, e)))
}

/// Serde helper storing pubkeys as base58 strings
pub mod pubkey_serde {
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;

    pub fn serialize<S>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&pubkey.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Pubkey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s).map_err(serde::de::Error::custom)
    }
}
