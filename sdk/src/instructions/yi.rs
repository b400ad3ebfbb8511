use std::sync::Arc;

use crate::prelude::*;
use solana_sdk::instruction::Instruction;

use crate::{
    core::{ProgramRegistry, SdkResult},
    impl_instruction,
    instructions::{InstructionBuilder, ProgramInstructionBuilder},
};

const CREATE_YI_TOKEN_DISCRIMINATOR: [u8; 8] = [192, 108, 231, 127, 183, 9, 204, 60];
const STAKE_DISCRIMINATOR: [u8; 8] = [206, 176, 202, 18, 200, 209, 179, 108];

/// Parameters for creating a Yi token
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct CreateYiTokenParams {
    pub bump: u8,
}

impl_instruction!(CreateYiTokenParams, CREATE_YI_TOKEN_DISCRIMINATOR);

/// Parameters for staking underlying tokens into Yi
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct StakeParams {
    pub underlying_amount: u64,
}

impl_instruction!(StakeParams, STAKE_DISCRIMINATOR);

/// Accounts of `stake`
#[derive(Clone, Debug)]
pub struct StakeAccounts {
    pub yi_token: Pubkey,
    pub yi_mint: Pubkey,
    pub source_tokens: Pubkey,
    pub source_authority: Pubkey,
    pub yi_underlying_tokens: Pubkey,
    pub destination_yi_tokens: Pubkey,
}

/// Yi program instruction builder
pub struct YiInstructionBuilder {
    programs: Arc<ProgramRegistry>,
}

impl YiInstructionBuilder {
    pub fn new(programs: Arc<ProgramRegistry>) -> Self {
        Self { programs }
    }

    /// Build create Yi token instruction
    pub fn create_yi_token(
        &self,
        yi_token: Pubkey,
        bump: u8,
        mint: Pubkey,
        underlying_token_mint: Pubkey,
        underlying_tokens: Pubkey,
        payer: Pubkey,
    ) -> SdkResult<Instruction> {
        Ok(ProgramInstructionBuilder::new(self.programs.yi)
            .add_writable(yi_token)
            .add_readonly(mint)
            .add_readonly(underlying_token_mint)
            .add_readonly(underlying_tokens)
            .add_signer(payer)
            .add_readonly(self.programs.system)
            .with_data(CreateYiTokenParams { bump }.build_data()?)
            .build())
    }

    /// Build stake instruction
    pub fn stake(&self, underlying_amount: u64, accounts: &StakeAccounts) -> SdkResult<Instruction> {
        Ok(ProgramInstructionBuilder::new(self.programs.yi)
            .add_readonly(accounts.yi_token)
            .add_writable(accounts.yi_mint)
            .add_writable(accounts.source_tokens)
            .add_readonly_signer(accounts.source_authority)
            .add_writable(accounts.yi_underlying_tokens)
            .add_writable(accounts.destination_yi_tokens)
            .add_readonly(self.programs.token)
            .with_data(StakeParams { underlying_amount }.build_data()?)
            .build())
    }
}
