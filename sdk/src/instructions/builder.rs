use crate::prelude::*;
use solana_sdk::instruction::{AccountMeta, Instruction};

use crate::core::SdkResult;

/// Trait for Anchor-style instruction arguments
pub trait InstructionBuilder: AnchorSerialize {
    /// The 8-byte instruction discriminator
    const DISCRIMINATOR: [u8; 8];

    /// Build the instruction data (discriminator + serialized params)
    fn build_data(&self) -> SdkResult<Vec<u8>> {
        let mut data = Self::DISCRIMINATOR.to_vec();
        self.serialize(&mut data)?;
        Ok(data)
    }
}

/// Builder for constructing Solana instructions
pub struct ProgramInstructionBuilder {
    program_id: Pubkey,
    accounts: Vec<AccountMeta>,
    data: Vec<u8>,
}

impl ProgramInstructionBuilder {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            accounts: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Add a writable signer account
    pub fn add_signer(mut self, pubkey: Pubkey) -> Self {
        self.accounts.push(AccountMeta::new(pubkey, true));
        self
    }

    /// Add a readonly signer account
    pub fn add_readonly_signer(mut self, pubkey: Pubkey) -> Self {
        self.accounts.push(AccountMeta::new_readonly(pubkey, true));
        self
    }

    /// Add a writable non-signer account
    pub fn add_writable(mut self, pubkey: Pubkey) -> Self {
        self.accounts.push(AccountMeta::new(pubkey, false));
        self
    }

    /// Add a readonly account
    pub fn add_readonly(mut self, pubkey: Pubkey) -> Self {
        self.accounts.push(AccountMeta::new_readonly(pubkey, false));
        self
    }

    /// Set the instruction data
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Build the final instruction
    pub fn build(self) -> Instruction {
        Instruction {
            program_id: self.program_id,
            accounts: self.accounts,
            data: self.data,
        }
    }
}

/// Macro for implementing InstructionBuilder for a params struct
#[macro_export]
macro_rules! impl_instruction {
    ($name:ident, $discriminator:expr) => {
        impl $crate::instructions::InstructionBuilder for $name {
            const DISCRIMINATOR: [u8; 8] = $discriminator;
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(AnchorSerialize, AnchorDeserialize)]
    struct Params {
        amount: u64,
    }

    crate::impl_instruction!(Params, [1, 2, 3, 4, 5, 6, 7, 8]);

    #[test]
    fn test_build_data_prefixes_discriminator() {
        let data = Params { amount: 7 }.build_data().unwrap();
        assert_eq!(&data[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&data[8..], &7u64.to_le_bytes());
    }

    #[test]
    fn test_account_flags() {
        let program_id = Pubkey::new_unique();
        let signer = Pubkey::new_unique();
        let ix = ProgramInstructionBuilder::new(program_id)
            .add_signer(signer)
            .add_readonly_signer(signer)
            .add_writable(Pubkey::default())
            .add_readonly(Pubkey::default())
            .build();
        assert_eq!(ix.program_id, program_id);
        let flags: Vec<(bool, bool)> = ix
            .accounts
            .iter()
            .map(|meta| (meta.is_signer, meta.is_writable))
            .collect();
        assert_eq!(flags, vec![(true, true), (true, false), (false, true), (false, false)]);
    }
}
