//! SPL token helpers: mint initialization and associated token accounts

use solana_sdk::{instruction::Instruction, system_instruction};
use spl_token::solana_program::program_pack::Pack;

use crate::prelude::*;

use crate::core::{AccountFetcher, ProgramRegistry, SdkResult};

/// An account address together with the instruction creating it, if needed
#[derive(Clone, Debug, PartialEq)]
pub struct PendingAccount {
    pub address: Pubkey,
    /// `None` when the account already exists
    pub instruction: Option<Instruction>,
}

/// Resolve the associated token account of `owner` for `mint`.
///
/// Performs exactly one state read. If the account is absent the returned
/// [`PendingAccount`] carries the instruction creating it, paid by `payer`.
pub async fn get_or_create_ata(
    fetcher: &dyn AccountFetcher,
    programs: &ProgramRegistry,
    payer: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
) -> SdkResult<PendingAccount> {
    let address = spl_associated_token_account::get_associated_token_address_with_program_id(
        owner,
        mint,
        &programs.token,
    );
    let instruction = if fetcher.get_account_data(&address).await?.is_some() {
        None
    } else {
        tracing::debug!(%address, %owner, %mint, "associated token account missing, creating");
        Some(
            spl_associated_token_account::instruction::create_associated_token_account(
                payer,
                owner,
                mint,
                &programs.token,
            ),
        )
    };
    Ok(PendingAccount {
        address,
        instruction,
    })
}

/// Instructions allocating and initializing a new SPL mint at `mint`.
///
/// `rent_lamports` must cover rent exemption for [`spl_token::state::Mint::LEN`].
pub fn create_init_mint_instructions(
    programs: &ProgramRegistry,
    payer: &Pubkey,
    mint: &Pubkey,
    decimals: u8,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    rent_lamports: u64,
) -> SdkResult<Vec<Instruction>> {
    let create = system_instruction::create_account(
        payer,
        mint,
        rent_lamports,
        spl_token::state::Mint::LEN as u64,
        &programs.token,
    );
    let init = spl_token::instruction::initialize_mint(
        &programs.token,
        mint,
        mint_authority,
        freeze_authority,
        decimals,
    )?;
    Ok(vec![create, init])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryAccounts;
    use spl_token::solana_program::program_option::COption;

    #[tokio::test]
    async fn test_missing_ata_yields_create_instruction() {
        let accounts = InMemoryAccounts::new();
        let programs = ProgramRegistry::default();
        let (payer, mint, owner) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());

        let pending = get_or_create_ata(&accounts, &programs, &payer, &mint, &owner)
            .await
            .unwrap();

        assert_eq!(
            pending.address,
            spl_associated_token_account::get_associated_token_address(&owner, &mint)
        );
        let ix = pending.instruction.expect("create instruction");
        assert_eq!(ix.program_id, programs.associated_token);
        assert_eq!(ix.accounts[1].pubkey, pending.address);
        assert_eq!(accounts.read_count(), 1);
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent_once_created() {
        let accounts = InMemoryAccounts::new();
        let programs = ProgramRegistry::default();
        let (payer, mint, owner) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());

        let first = get_or_create_ata(&accounts, &programs, &payer, &mint, &owner)
            .await
            .unwrap();
        assert!(first.instruction.is_some());

        // Apply the creation
        accounts.insert(first.address, vec![0; spl_token::state::Account::LEN]);

        let second = get_or_create_ata(&accounts, &programs, &payer, &mint, &owner)
            .await
            .unwrap();
        assert_eq!(second.address, first.address);
        assert!(second.instruction.is_none());
        assert_eq!(accounts.read_count(), 2);
    }

    #[test]
    fn test_init_mint_sets_authorities() {
        let programs = ProgramRegistry::default();
        let (payer, mint, authority) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());

        let ixs = create_init_mint_instructions(
            &programs,
            &payer,
            &mint,
            6,
            &authority,
            Some(&authority),
            1_461_600,
        )
        .unwrap();

        assert_eq!(ixs.len(), 2);
        assert_eq!(ixs[0].program_id, programs.system);
        assert_eq!(ixs[1].program_id, programs.token);

        match spl_token::instruction::TokenInstruction::unpack(&ixs[1].data).unwrap() {
            spl_token::instruction::TokenInstruction::InitializeMint {
                decimals,
                mint_authority,
                freeze_authority,
            } => {
                assert_eq!(decimals, 6);
                assert_eq!(mint_authority, authority);
                assert_eq!(freeze_authority, COption::Some(authority));
            }
            other => panic!("unexpected instruction {:?}", other),
        }
    }
}
