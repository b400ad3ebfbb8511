use crate::prelude::*;

use super::{discriminators, SdkError, SdkResult};

/// On-chain state of an SVE wrapper.
///
/// Mirrors the zero-copy `SVE` account of the wrapper program, including the
/// explicit padding after `bump`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct WrapperData {
    /// Mint of the wrapper (SVE) token
    pub mint: Pubkey,
    /// Bump seed of the wrapper PDA
    pub bump: u8,
    pub _padding: [u8; 7],
    /// Minimum duration, in seconds, the tokens must be locked for
    pub min_lock_duration: u64,
    /// Mint of the governance token being wrapped
    pub underlying_mint: Pubkey,
    /// Mint of the Yi token
    pub yi_mint: Pubkey,
    /// The Yi token account
    pub yi: Pubkey,
    /// Token account of the wrapper holding Yi tokens
    pub yi_tokens: Pubkey,
    /// Locker that wrapped tokens are locked into
    pub locker: Pubkey,
}

impl WrapperData {
    /// Decode from raw account bytes (discriminator included)
    pub fn try_from_account_data(data: &[u8]) -> SdkResult<Self> {
        let body = strip_discriminator(data, &discriminators::SVE_ACCOUNT, "SVE")?;
        Self::deserialize(&mut &body[..])
            .map_err(|e| SdkError::Deserialization(format!("SVE: {}", e)))
    }
}

/// Escrow of the locked voter program
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct EscrowData {
    pub locker: Pubkey,
    pub owner: Pubkey,
    pub bump: u8,
    /// Token account holding the locked tokens
    pub tokens: Pubkey,
    pub amount: u64,
    pub escrow_started_at: i64,
    pub escrow_ends_at: i64,
    pub vote_delegate: Pubkey,
}

impl EscrowData {
    /// Decode from raw account bytes (discriminator included)
    pub fn try_from_account_data(data: &[u8]) -> SdkResult<Self> {
        let body = strip_discriminator(data, &discriminators::ESCROW_ACCOUNT, "Escrow")?;
        Self::deserialize(&mut &body[..])
            .map_err(|e| SdkError::Deserialization(format!("Escrow: {}", e)))
    }
}

fn strip_discriminator<'a>(
    data: &'a [u8],
    expected: &[u8; 8],
    account: &str,
) -> SdkResult<&'a [u8]> {
    if data.len() < 8 {
        return Err(SdkError::Deserialization(format!(
            "{}: account data too short ({} bytes)",
            account,
            data.len()
        )));
    }
    let (discriminator, body) = data.split_at(8);
    if discriminator != expected {
        return Err(SdkError::Deserialization(format!(
            "{}: discriminator mismatch",
            account
        )));
    }
    Ok(body)
}

/// Escrow lookup result for a (locker, owner) pair
#[derive(Clone, Debug, PartialEq)]
pub enum EscrowState {
    /// No escrow yet; the address is derived, its token account is not readable
    Missing { escrow: Pubkey, bump: u8 },
    /// Escrow exists and was decoded from chain state
    Present { escrow: Pubkey, data: EscrowData },
}

impl EscrowState {
    pub fn escrow(&self) -> Pubkey {
        match self {
            EscrowState::Missing { escrow, .. } | EscrowState::Present { escrow, .. } => *escrow,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, EscrowState::Present { .. })
    }
}

/// Token descriptor handed back to callers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenInfo {
    pub mint: Pubkey,
    pub decimals: u8,
    pub name: String,
    pub symbol: String,
}

impl TokenInfo {
    pub fn new(mint: Pubkey, decimals: u8, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            mint,
            decimals,
            name: name.into(),
            symbol: symbol.into(),
        }
    }

    /// Same token metadata, different mint and display name
    pub fn derived(&self, mint: Pubkey, name: String) -> Self {
        Self {
            mint,
            decimals: self.decimals,
            name,
            symbol: self.symbol.clone(),
        }
    }
}
