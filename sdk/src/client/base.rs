use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;

use crate::prelude::*;

use crate::{
    config::SdkConfig,
    core::{AccountFetcher, SdkError, SdkResult},
};

/// RPC-backed account reader
pub struct BaseClient {
    rpc: Arc<RpcClient>,
}

impl BaseClient {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }

    /// Connect using the endpoint and commitment of `config`
    pub fn from_config(config: &SdkConfig) -> SdkResult<Self> {
        let commitment = CommitmentConfig::from_str(&config.commitment).map_err(|e| {
            SdkError::Config(format!("invalid commitment {}: {}", config.commitment, e))
        })?;
        Ok(Self::new(Arc::new(RpcClient::new_with_commitment(
            config.rpc_url.clone(),
            commitment,
        ))))
    }

    /// Get the RPC client
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Get the RPC endpoint URL
    pub fn rpc_url(&self) -> String {
        self.rpc.url()
    }
}

#[async_trait]
impl AccountFetcher for BaseClient {
    async fn get_account_data(&self, address: &Pubkey) -> SdkResult<Option<Vec<u8>>> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.rpc.commitment())
            .await?;
        Ok(response.value.map(|account| account.data))
    }

    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> SdkResult<u64> {
        Ok(self
            .rpc
            .get_minimum_balance_for_rent_exemption(data_len)
            .await?)
    }
}
