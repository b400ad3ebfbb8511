use std::sync::Arc;

use crate::prelude::*;
use solana_sdk::instruction::Instruction;

use crate::{
    core::{ProgramRegistry, SdkResult},
    impl_instruction,
    instructions::{InstructionBuilder, ProgramInstructionBuilder},
};

const NEW_ESCROW_DISCRIMINATOR: [u8; 8] = [216, 182, 143, 11, 220, 38, 86, 185];

/// Parameters for creating a new escrow
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct NewEscrowParams {
    pub bump: u8,
}

impl_instruction!(NewEscrowParams, NEW_ESCROW_DISCRIMINATOR);

/// Locked voter instruction builder
pub struct LockedVoterInstructionBuilder {
    programs: Arc<ProgramRegistry>,
}

impl LockedVoterInstructionBuilder {
    pub fn new(programs: Arc<ProgramRegistry>) -> Self {
        Self { programs }
    }

    /// Build new escrow instruction
    pub fn new_escrow(
        &self,
        locker: Pubkey,
        escrow: Pubkey,
        bump: u8,
        escrow_owner: Pubkey,
        payer: Pubkey,
    ) -> SdkResult<Instruction> {
        Ok(ProgramInstructionBuilder::new(self.programs.locked_voter)
            .add_readonly(locker)
            .add_writable(escrow)
            .add_readonly(escrow_owner)
            .add_signer(payer)
            .add_readonly(self.programs.system)
            .with_data(NewEscrowParams { bump }.build_data()?)
            .build())
    }
}
