use std::sync::Arc;

use solana_sdk::signature::{Keypair, Signer};
use spl_token::solana_program::program_pack::Pack;

use crate::prelude::*;

use crate::{
    core::{AccountFetcher, ProgramRegistry, SdkResult, TokenInfo},
    instructions::{create_init_mint_instructions, get_or_create_ata, StakeAccounts, YiInstructionBuilder},
    protocol::PdaBuilder,
    transaction::TransactionEnvelope,
};

/// Result of [`YiClient::create_yi_token`]
#[derive(Debug)]
pub struct CreateYiTokenResult {
    /// The Yi token account (PDA of the Yi mint)
    pub yi_token: Pubkey,
    pub yi_mint: Pubkey,
    pub tx: TransactionEnvelope,
}

/// Arguments of [`YiClient::stake`]
#[derive(Clone, Debug)]
pub struct StakeArgs {
    pub yi_mint: Pubkey,
    pub underlying_mint: Pubkey,
    pub amount: u64,
    pub source_authority: Pubkey,
}

/// Client for the Yi staking program
pub struct YiClient {
    fetcher: Arc<dyn AccountFetcher>,
    programs: Arc<ProgramRegistry>,
    pda: Arc<PdaBuilder>,
    builder: YiInstructionBuilder,
}

impl YiClient {
    pub fn new(fetcher: Arc<dyn AccountFetcher>, pda: Arc<PdaBuilder>) -> Self {
        let programs = pda.programs.clone();
        Self {
            fetcher,
            builder: YiInstructionBuilder::new(programs.clone()),
            programs,
            pda,
        }
    }

    /// Create a Yi token backed by `underlying`.
    ///
    /// The new Yi mint is owned by the Yi token PDA and has the same decimals
    /// as the underlying token. `mint_keypair` must sign the bundle and is
    /// included in its signer set.
    pub async fn create_yi_token(
        &self,
        underlying: &TokenInfo,
        mint_keypair: Arc<Keypair>,
        payer: Pubkey,
    ) -> SdkResult<CreateYiTokenResult> {
        let yi_mint = mint_keypair.pubkey();
        let (yi_token, bump) = self.pda.yi_token(&yi_mint)?;

        let rent = self
            .fetcher
            .minimum_balance_for_rent_exemption(spl_token::state::Mint::LEN)
            .await?;
        let mut tx = TransactionEnvelope::new(create_init_mint_instructions(
            &self.programs,
            &payer,
            &yi_mint,
            underlying.decimals,
            &yi_token,
            None,
            rent,
        )?)
        .with_signers([mint_keypair]);

        let underlying_tokens = get_or_create_ata(
            self.fetcher.as_ref(),
            &self.programs,
            &payer,
            &underlying.mint,
            &yi_token,
        )
        .await?;
        if let Some(ix) = underlying_tokens.instruction {
            tx.push(ix);
        }
        tx.push(self.builder.create_yi_token(
            yi_token,
            bump,
            yi_mint,
            underlying.mint,
            underlying_tokens.address,
            payer,
        )?);

        tracing::debug!(%yi_token, %yi_mint, "built create Yi token bundle");
        Ok(CreateYiTokenResult {
            yi_token,
            yi_mint,
            tx,
        })
    }

    /// Stake underlying tokens for Yi tokens, creating the destination Yi
    /// token account if needed.
    pub async fn stake(&self, args: StakeArgs) -> SdkResult<TransactionEnvelope> {
        let (yi_token, _) = self.pda.yi_token(&args.yi_mint)?;
        let destination = get_or_create_ata(
            self.fetcher.as_ref(),
            &self.programs,
            &args.source_authority,
            &args.yi_mint,
            &args.source_authority,
        )
        .await?;

        let accounts = StakeAccounts {
            yi_token,
            yi_mint: args.yi_mint,
            source_tokens: self
                .pda
                .associated_token(&args.source_authority, &args.underlying_mint),
            source_authority: args.source_authority,
            yi_underlying_tokens: self.pda.associated_token(&yi_token, &args.underlying_mint),
            destination_yi_tokens: destination.address,
        };
        let stake = self.builder.stake(args.amount, &accounts)?;
        Ok(TransactionEnvelope::from_optional([
            destination.instruction,
            Some(stake),
        ]))
    }
}
