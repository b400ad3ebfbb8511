//! Testing utilities
//!
//! An in-memory [`AccountFetcher`] and encoders for seeding it with SVE and
//! escrow accounts, so flows can be exercised without a validator.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::prelude::*;

use crate::core::{discriminators, AccountFetcher, EscrowData, SdkResult, WrapperData};

/// Account store backed by a map
#[derive(Default)]
pub struct InMemoryAccounts {
    accounts: RwLock<HashMap<Pubkey, Vec<u8>>>,
    reads: AtomicUsize,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, address: Pubkey, data: Vec<u8>) {
        self.accounts
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(address, data);
    }

    pub fn remove(&self, address: &Pubkey) -> Option<Vec<u8>> {
        self.accounts
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(address)
    }

    pub fn contains(&self, address: &Pubkey) -> bool {
        self.accounts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(address)
    }

    /// Number of `get_account_data` calls served so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountFetcher for InMemoryAccounts {
    async fn get_account_data(&self, address: &Pubkey) -> SdkResult<Option<Vec<u8>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .accounts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(address)
            .cloned())
    }
}

/// Account bytes of an SVE wrapper as the program stores them
pub fn encode_wrapper_account(data: &WrapperData) -> Vec<u8> {
    let mut bytes = discriminators::SVE_ACCOUNT.to_vec();
    data.serialize(&mut bytes)
        .expect("serializing into a Vec cannot fail");
    bytes
}

/// Account bytes of a locked voter escrow
pub fn encode_escrow_account(data: &EscrowData) -> Vec<u8> {
    let mut bytes = discriminators::ESCROW_ACCOUNT.to_vec();
    data.serialize(&mut bytes)
        .expect("serializing into a Vec cannot fail");
    bytes
}

/// Placeholder bytes for an SPL token account
pub fn token_account_placeholder() -> Vec<u8> {
    vec![0; 165]
}
