//! State-reader port used by every builder that needs chain state

use async_trait::async_trait;
use solana_sdk::rent::Rent;

use crate::prelude::*;

use super::SdkResult;

/// Read access to account state.
///
/// Implementations must not cache: every call is one read, so a second
/// resolution after an account was created observes it.
#[async_trait]
pub trait AccountFetcher: Send + Sync {
    /// Raw account data, or `None` if the account does not exist
    async fn get_account_data(&self, address: &Pubkey) -> SdkResult<Option<Vec<u8>>>;

    /// Lamports required for an account of `data_len` bytes to be rent exempt
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> SdkResult<u64> {
        Ok(Rent::default().minimum_balance(data_len))
    }

    /// Whether the account exists
    async fn account_exists(&self, address: &Pubkey) -> SdkResult<bool> {
        Ok(self.get_account_data(address).await?.is_some())
    }
}
