use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::prelude::*;

use crate::core::{seeds, ProgramRegistry, SdkError, SdkResult};

/// PDA cache to avoid recomputing addresses
pub struct PdaCache {
    cache: RwLock<HashMap<String, (Pubkey, u8)>>,
}

impl PdaCache {
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> SdkResult<(Pubkey, u8)>
    where
        F: FnOnce() -> SdkResult<(Pubkey, u8)>,
    {
        // A poisoned lock only means another reader panicked; the map is still valid.
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
        {
            return Ok(*cached);
        }

        let result = compute()?;
        self.cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), result);
        Ok(result)
    }
}

impl Default for PdaCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive a program address, failing instead of panicking when no bump works
pub fn derive_address(seeds: &[&[u8]], program_id: &Pubkey) -> SdkResult<(Pubkey, u8)> {
    Pubkey::try_find_program_address(seeds, program_id).ok_or_else(|| {
        SdkError::Derivation(format!(
            "no viable bump for {} seeds under {}",
            seeds.len(),
            program_id
        ))
    })
}

/// Unified PDA builder for all protocol addresses
pub struct PdaBuilder {
    cache: PdaCache,
    pub programs: Arc<ProgramRegistry>,
}

impl PdaBuilder {
    pub fn new(programs: Arc<ProgramRegistry>) -> Self {
        Self {
            cache: PdaCache::new(),
            programs,
        }
    }

    /// SVE wrapper of a wrapper mint
    pub fn sve(&self, sve_mint: &Pubkey) -> SdkResult<(Pubkey, u8)> {
        let program_id = self.programs.sve;
        let key = format!("sve:{}:{}", program_id, sve_mint);
        self.cache.get_or_compute(&key, || {
            derive_address(&[seeds::SVE, sve_mint.as_ref()], &program_id)
        })
    }

    /// Escrow of `owner` in `locker`, owned by the locked voter program
    pub fn escrow(&self, locker: &Pubkey, owner: &Pubkey) -> SdkResult<(Pubkey, u8)> {
        let program_id = self.programs.locked_voter;
        let key = format!("escrow:{}:{}:{}", program_id, locker, owner);
        self.cache.get_or_compute(&key, || {
            derive_address(
                &[seeds::ESCROW, locker.as_ref(), owner.as_ref()],
                &program_id,
            )
        })
    }

    /// Yi token of a Yi mint, owned by the Yi program
    pub fn yi_token(&self, yi_mint: &Pubkey) -> SdkResult<(Pubkey, u8)> {
        let program_id = self.programs.yi;
        let key = format!("yi_token:{}:{}", program_id, yi_mint);
        self.cache.get_or_compute(&key, || {
            derive_address(&[seeds::YI_TOKEN, yi_mint.as_ref()], &program_id)
        })
    }

    /// Associated token account of `owner` for `mint`
    pub fn associated_token(&self, owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        spl_associated_token_account::get_associated_token_address_with_program_id(
            owner,
            mint,
            &self.programs.token,
        )
    }
}

/// Convenience functions for one-off PDA derivations
pub fn find_sve_address(programs: &ProgramRegistry, sve_mint: &Pubkey) -> SdkResult<(Pubkey, u8)> {
    derive_address(&[seeds::SVE, sve_mint.as_ref()], &programs.sve)
}

pub fn find_escrow_address(
    programs: &ProgramRegistry,
    locker: &Pubkey,
    owner: &Pubkey,
) -> SdkResult<(Pubkey, u8)> {
    derive_address(
        &[seeds::ESCROW, locker.as_ref(), owner.as_ref()],
        &programs.locked_voter,
    )
}
