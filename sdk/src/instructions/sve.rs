use std::sync::Arc;

use crate::prelude::*;
use solana_sdk::instruction::Instruction;

use crate::{
    core::{ProgramRegistry, SdkError, SdkResult},
    impl_instruction,
    instructions::{InstructionBuilder, ProgramInstructionBuilder},
};

// Instruction discriminators
const CREATE_SVE_DISCRIMINATOR: [u8; 8] = [43, 23, 175, 125, 23, 227, 80, 138];
const LOCK_DISCRIMINATOR: [u8; 8] = [21, 19, 208, 43, 237, 62, 255, 87];
const MINT_FROM_UNDERLYING_DISCRIMINATOR: [u8; 8] = [1, 241, 40, 23, 212, 84, 227, 254];
const MINT_FROM_YI_DISCRIMINATOR: [u8; 8] = [181, 104, 185, 140, 238, 197, 253, 112];

/// Parameters for creating an SVE
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct CreateSveParams {
    pub min_lock_duration: u64,
}

impl_instruction!(CreateSveParams, CREATE_SVE_DISCRIMINATOR);

/// Parameters for locking SVE tokens
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct LockParams {
    pub amount: u64,
    pub duration: u64,
}

impl_instruction!(LockParams, LOCK_DISCRIMINATOR);

/// Parameters for minting SVE tokens from underlying tokens
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct MintFromUnderlyingParams {
    pub underlying_amount: u64,
}

impl_instruction!(MintFromUnderlyingParams, MINT_FROM_UNDERLYING_DISCRIMINATOR);

/// Parameters for minting SVE tokens from Yi tokens
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct MintFromYiParams {
    pub yi_amount: u64,
}

impl_instruction!(MintFromYiParams, MINT_FROM_YI_DISCRIMINATOR);

/// Accounts of `create_sve`
#[derive(Clone, Debug)]
pub struct CreateSveAccounts {
    pub sve_mint: Pubkey,
    pub sve: Pubkey,
    pub yi: Pubkey,
    pub yi_mint: Pubkey,
    pub yi_tokens: Pubkey,
    pub locker: Pubkey,
    pub payer: Pubkey,
}

/// Accounts shared by both mint instructions
#[derive(Clone, Debug)]
pub struct MintToCommonAccounts {
    pub sve: Pubkey,
    pub sve_mint: Pubkey,
    pub sve_yi_tokens: Pubkey,
    /// Token account receiving the minted SVE tokens
    pub to: Pubkey,
}

/// Accounts of `mint_from_underlying`
#[derive(Clone, Debug)]
pub struct MintFromUnderlyingAccounts {
    pub common: MintToCommonAccounts,
    pub yi: Pubkey,
    pub yi_mint: Pubkey,
    pub yi_underlying_tokens: Pubkey,
    pub source_underlying_tokens: Pubkey,
    pub source_authority: Pubkey,
}

/// Accounts of `mint_from_yi`
#[derive(Clone, Debug)]
pub struct MintFromYiAccounts {
    pub common: MintToCommonAccounts,
    pub source_yi_tokens: Pubkey,
    pub source_authority: Pubkey,
}

/// Accounts of `lock`
#[derive(Clone, Debug)]
pub struct LockAccounts {
    pub sve: Pubkey,
    pub sve_mint: Pubkey,
    pub sve_yi_tokens: Pubkey,
    pub user_sve_tokens: Pubkey,
    pub user_underlying_tokens: Pubkey,
    pub locker: Pubkey,
    pub escrow: Pubkey,
    pub escrow_tokens: Pubkey,
    pub yi_token: Pubkey,
    pub yi_mint: Pubkey,
    pub yi_underlying_tokens: Pubkey,
    pub user_authority: Pubkey,
}

/// SVE wrapper program instruction builder
pub struct SveInstructionBuilder {
    programs: Arc<ProgramRegistry>,
}

impl SveInstructionBuilder {
    pub fn new(programs: Arc<ProgramRegistry>) -> Self {
        Self { programs }
    }

    /// Build create SVE instruction
    pub fn create_sve(
        &self,
        min_lock_duration: u64,
        accounts: &CreateSveAccounts,
    ) -> SdkResult<Instruction> {
        Ok(ProgramInstructionBuilder::new(self.programs.sve)
            .add_readonly(accounts.sve_mint)
            .add_writable(accounts.sve)
            .add_readonly(accounts.yi)
            .add_readonly(accounts.yi_mint)
            .add_readonly(accounts.yi_tokens)
            .add_readonly(accounts.locker)
            .add_signer(accounts.payer)
            .add_readonly(self.programs.system)
            .with_data(CreateSveParams { min_lock_duration }.build_data()?)
            .build())
    }

    /// Build mint from underlying instruction
    pub fn mint_from_underlying(
        &self,
        underlying_amount: u64,
        accounts: &MintFromUnderlyingAccounts,
    ) -> SdkResult<Instruction> {
        Ok(self
            .mint_to_common(&accounts.common)
            .add_readonly(accounts.yi)
            .add_writable(accounts.yi_mint)
            .add_writable(accounts.yi_underlying_tokens)
            .add_writable(accounts.source_underlying_tokens)
            .add_readonly_signer(accounts.source_authority)
            .add_readonly(self.programs.yi)
            .with_data(MintFromUnderlyingParams { underlying_amount }.build_data()?)
            .build())
    }

    /// Build mint from Yi instruction
    pub fn mint_from_yi(
        &self,
        yi_amount: u64,
        accounts: &MintFromYiAccounts,
    ) -> SdkResult<Instruction> {
        Ok(self
            .mint_to_common(&accounts.common)
            .add_writable(accounts.source_yi_tokens)
            .add_readonly_signer(accounts.source_authority)
            .with_data(MintFromYiParams { yi_amount }.build_data()?)
            .build())
    }

    /// Build lock instruction.
    ///
    /// `duration` is not compared against the wrapper's minimum; the program
    /// enforces that. It must however fit the escrow program's signed
    /// duration.
    pub fn lock(&self, amount: u64, duration: u64, accounts: &LockAccounts) -> SdkResult<Instruction> {
        if i64::try_from(duration).is_err() {
            return Err(SdkError::Encoding(format!(
                "lock duration {} exceeds i64::MAX",
                duration
            )));
        }

        Ok(ProgramInstructionBuilder::new(self.programs.sve)
            .add_readonly(accounts.sve)
            .add_writable(accounts.sve_mint)
            .add_writable(accounts.sve_yi_tokens)
            .add_writable(accounts.user_sve_tokens)
            .add_writable(accounts.user_underlying_tokens)
            // lock
            .add_writable(accounts.locker)
            .add_writable(accounts.escrow)
            .add_writable(accounts.escrow_tokens)
            // yi
            .add_readonly(accounts.yi_token)
            .add_writable(accounts.yi_mint)
            .add_writable(accounts.yi_underlying_tokens)
            .add_readonly_signer(accounts.user_authority)
            .add_readonly(self.programs.system)
            .add_readonly(self.programs.yi)
            .add_readonly(self.programs.locked_voter)
            .add_readonly(self.programs.token)
            .with_data(LockParams { amount, duration }.build_data()?)
            .build())
    }

    fn mint_to_common(&self, common: &MintToCommonAccounts) -> ProgramInstructionBuilder {
        ProgramInstructionBuilder::new(self.programs.sve)
            .add_readonly(common.sve)
            .add_writable(common.sve_mint)
            .add_writable(common.sve_yi_tokens)
            .add_writable(common.to)
            .add_readonly(self.programs.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::solana_program::hash::hash;

    fn builder() -> SveInstructionBuilder {
        SveInstructionBuilder::new(Arc::new(ProgramRegistry::default()))
    }

    fn lock_accounts() -> LockAccounts {
        LockAccounts {
            sve: Pubkey::new_unique(),
            sve_mint: Pubkey::new_unique(),
            sve_yi_tokens: Pubkey::new_unique(),
            user_sve_tokens: Pubkey::new_unique(),
            user_underlying_tokens: Pubkey::new_unique(),
            locker: Pubkey::new_unique(),
            escrow: Pubkey::new_unique(),
            escrow_tokens: Pubkey::new_unique(),
            yi_token: Pubkey::new_unique(),
            yi_mint: Pubkey::new_unique(),
            yi_underlying_tokens: Pubkey::new_unique(),
            user_authority: Pubkey::new_unique(),
        }
    }

    #[test]
    fn test_discriminators_match_anchor_sighash() {
        for (name, discriminator) in [
            ("global:create_sve", CREATE_SVE_DISCRIMINATOR),
            ("global:lock", LOCK_DISCRIMINATOR),
            ("global:mint_from_underlying", MINT_FROM_UNDERLYING_DISCRIMINATOR),
            ("global:mint_from_yi", MINT_FROM_YI_DISCRIMINATOR),
        ] {
            assert_eq!(hash(name.as_bytes()).to_bytes()[..8], discriminator, "{}", name);
        }
    }

    #[test]
    fn test_lock_instruction_layout() {
        let accounts = lock_accounts();
        let ix = builder().lock(1_000_000, 31_537_000, &accounts).unwrap();
        let programs = ProgramRegistry::default();

        assert_eq!(ix.program_id, programs.sve);
        assert_eq!(ix.accounts.len(), 16);
        assert_eq!(ix.accounts[6].pubkey, accounts.escrow);
        assert_eq!(ix.accounts[7].pubkey, accounts.escrow_tokens);
        assert!(ix.accounts[11].is_signer);
        assert_eq!(ix.accounts[11].pubkey, accounts.user_authority);
        assert_eq!(ix.accounts[14].pubkey, programs.locked_voter);

        let params = LockParams::deserialize(&mut &ix.data[8..]).unwrap();
        assert_eq!(
            params,
            LockParams {
                amount: 1_000_000,
                duration: 31_537_000
            }
        );
    }

    #[test]
    fn test_lock_accepts_duration_equal_to_minimum() {
        let ix = builder()
            .lock(1, crate::core::DEFAULT_MIN_LOCK_DURATION, &lock_accounts())
            .unwrap();
        assert_eq!(&ix.data[16..24], &31_536_000u64.to_le_bytes());
    }

    #[test]
    fn test_lock_rejects_unrepresentable_duration() {
        let err = builder().lock(1, u64::MAX, &lock_accounts()).unwrap_err();
        assert!(matches!(err, SdkError::Encoding(_)));
        assert!(builder().lock(1, i64::MAX as u64, &lock_accounts()).is_ok());
    }

    #[test]
    fn test_create_sve_encodes_min_lock_duration() {
        let payer = Pubkey::new_unique();
        let accounts = CreateSveAccounts {
            sve_mint: Pubkey::new_unique(),
            sve: Pubkey::new_unique(),
            yi: Pubkey::new_unique(),
            yi_mint: Pubkey::new_unique(),
            yi_tokens: Pubkey::new_unique(),
            locker: Pubkey::new_unique(),
            payer,
        };
        let ix = builder().create_sve(86_400, &accounts).unwrap();

        assert_eq!(&ix.data[..8], &CREATE_SVE_DISCRIMINATOR);
        assert_eq!(&ix.data[8..], &86_400u64.to_le_bytes());
        assert_eq!(ix.accounts.len(), 8);
        assert!(ix.accounts[1].is_writable);
        assert!(ix.accounts[6].is_signer && ix.accounts[6].is_writable);
        assert_eq!(ix.accounts[6].pubkey, payer);
    }

    #[test]
    fn test_mint_instructions_share_common_prefix() {
        let common = MintToCommonAccounts {
            sve: Pubkey::new_unique(),
            sve_mint: Pubkey::new_unique(),
            sve_yi_tokens: Pubkey::new_unique(),
            to: Pubkey::new_unique(),
        };
        let authority = Pubkey::new_unique();
        let from_yi = builder()
            .mint_from_yi(
                5,
                &MintFromYiAccounts {
                    common: common.clone(),
                    source_yi_tokens: Pubkey::new_unique(),
                    source_authority: authority,
                },
            )
            .unwrap();
        let from_underlying = builder()
            .mint_from_underlying(
                5,
                &MintFromUnderlyingAccounts {
                    common,
                    yi: Pubkey::new_unique(),
                    yi_mint: Pubkey::new_unique(),
                    yi_underlying_tokens: Pubkey::new_unique(),
                    source_underlying_tokens: Pubkey::new_unique(),
                    source_authority: authority,
                },
            )
            .unwrap();

        assert_eq!(from_yi.accounts[..5], from_underlying.accounts[..5]);
        assert_eq!(from_yi.accounts.len(), 7);
        assert_eq!(from_underlying.accounts.len(), 11);
        assert_eq!(from_underlying.accounts[10].pubkey, ProgramRegistry::default().yi);
        assert_ne!(from_yi.data[..8], from_underlying.data[..8]);
    }
}
