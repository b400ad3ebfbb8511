use std::sync::Arc;

use solana_sdk::signature::{Keypair, Signer};
use spl_token::solana_program::program_pack::Pack;

use crate::prelude::*;

use crate::{
    client::{BaseClient, YiClient},
    config::SdkConfig,
    core::{
        AccountFetcher, EscrowData, EscrowState, ProgramRegistry, SdkError, SdkResult, TokenInfo,
        WrapperData, DEFAULT_MIN_LOCK_DURATION,
    },
    instructions::{
        create_init_mint_instructions, get_or_create_ata, CreateSveAccounts, LockAccounts,
        LockedVoterInstructionBuilder, MintFromUnderlyingAccounts, MintFromYiAccounts,
        MintToCommonAccounts, SveInstructionBuilder,
    },
    protocol::PdaBuilder,
    transaction::TransactionEnvelope,
};

/// Arguments of [`SveClient::create_wrapper`]
#[derive(Clone, Debug)]
pub struct CreateWrapperArgs {
    pub underlying: TokenInfo,
    pub locker: Pubkey,
    /// Defaults to one year
    pub min_lock_duration: Option<u64>,
    /// Keypair of the new wrapper mint; generated when absent
    pub mint_keypair: Option<Arc<Keypair>>,
    /// Keypair of the new Yi mint; generated when absent
    pub yi_mint_keypair: Option<Arc<Keypair>>,
    /// Defaults to the client wallet
    pub payer: Option<Pubkey>,
}

impl CreateWrapperArgs {
    pub fn new(underlying: TokenInfo, locker: Pubkey) -> Self {
        Self {
            underlying,
            locker,
            min_lock_duration: None,
            mint_keypair: None,
            yi_mint_keypair: None,
            payer: None,
        }
    }

    pub fn with_min_lock_duration(mut self, duration: u64) -> Self {
        self.min_lock_duration = Some(duration);
        self
    }

    pub fn with_mint_keypair(mut self, keypair: Arc<Keypair>) -> Self {
        self.mint_keypair = Some(keypair);
        self
    }

    pub fn with_yi_mint_keypair(mut self, keypair: Arc<Keypair>) -> Self {
        self.yi_mint_keypair = Some(keypair);
        self
    }

    pub fn with_payer(mut self, payer: Pubkey) -> Self {
        self.payer = Some(payer);
        self
    }
}

#[derive(Debug)]
pub struct CreateWrapperResult {
    /// The wrapper (SVE) account
    pub wrapper: Pubkey,
    pub wrapper_token: TokenInfo,
    pub yi_token: TokenInfo,
    pub tx: TransactionEnvelope,
}

/// Arguments of [`SveClient::create_escrow`]
#[derive(Clone, Debug)]
pub struct CreateEscrowArgs {
    pub locker: Pubkey,
    pub underlying_mint: Pubkey,
    /// Escrow owner; defaults to the client wallet
    pub user_authority: Option<Pubkey>,
    pub payer: Option<Pubkey>,
}

#[derive(Debug)]
pub struct CreateEscrowResult {
    pub escrow: Pubkey,
    /// Token account of the escrow holding the locked tokens
    pub escrow_tokens: Pubkey,
    pub tx: TransactionEnvelope,
}

/// Arguments of [`SveClient::lock`]
#[derive(Clone, Debug)]
pub struct LockArgs {
    /// Mint of the wrapper token being locked
    pub wrapper_mint: Pubkey,
    pub amount: u64,
    /// Lock duration in seconds
    pub duration: u64,
    pub user_authority: Option<Pubkey>,
    pub payer: Option<Pubkey>,
}

/// Arguments of [`SveClient::lock_with_data`]
#[derive(Clone, Debug)]
pub struct LockWithDataArgs {
    pub wrapper: WrapperData,
    pub escrow_tokens: Pubkey,
    pub amount: u64,
    pub duration: u64,
    pub user_authority: Option<Pubkey>,
    pub payer: Option<Pubkey>,
}

/// Arguments of [`SveClient::mint_from_underlying`]
#[derive(Clone, Debug)]
pub struct MintFromUnderlyingArgs {
    pub wrapper: WrapperData,
    pub underlying_amount: u64,
    /// Destination of the minted tokens; the authority's ATA when absent
    pub to: Option<Pubkey>,
    pub yi_underlying_tokens: Option<Pubkey>,
    pub source_underlying_tokens: Option<Pubkey>,
    pub source_authority: Option<Pubkey>,
}

/// Arguments of [`SveClient::mint_from_yi`]
#[derive(Clone, Debug)]
pub struct MintFromYiArgs {
    pub wrapper: WrapperData,
    pub yi_amount: u64,
    /// Destination of the minted tokens; the authority's ATA when absent
    pub to: Option<Pubkey>,
    pub source_yi_tokens: Option<Pubkey>,
    pub source_authority: Option<Pubkey>,
}

/// Client composing transactions for SVE wrappers.
///
/// All operations only read chain state; the returned bundles are signed and
/// submitted by the caller.
pub struct SveClient {
    fetcher: Arc<dyn AccountFetcher>,
    programs: Arc<ProgramRegistry>,
    pda: Arc<PdaBuilder>,
    builder: SveInstructionBuilder,
    locked_voter: LockedVoterInstructionBuilder,
    yi: YiClient,
    wallet: Pubkey,
}

impl SveClient {
    pub fn new(
        fetcher: Arc<dyn AccountFetcher>,
        programs: Arc<ProgramRegistry>,
        wallet: Pubkey,
    ) -> Self {
        let pda = Arc::new(PdaBuilder::new(programs.clone()));
        Self::from_parts(fetcher, pda, wallet)
    }

    /// RPC-backed client
    pub fn from_config(config: &SdkConfig, wallet: Pubkey) -> SdkResult<Self> {
        let base = BaseClient::from_config(config)?;
        tracing::debug!(rpc_url = %config.rpc_url, %wallet, "created SVE client");
        Ok(Self::new(
            Arc::new(base),
            Arc::new(config.programs.clone()),
            wallet,
        ))
    }

    /// Client acting for `wallet`, sharing state reader and address cache
    pub fn with_wallet(&self, wallet: Pubkey) -> Self {
        Self::from_parts(self.fetcher.clone(), self.pda.clone(), wallet)
    }

    fn from_parts(fetcher: Arc<dyn AccountFetcher>, pda: Arc<PdaBuilder>, wallet: Pubkey) -> Self {
        let programs = pda.programs.clone();
        Self {
            yi: YiClient::new(fetcher.clone(), pda.clone()),
            builder: SveInstructionBuilder::new(programs.clone()),
            locked_voter: LockedVoterInstructionBuilder::new(programs.clone()),
            fetcher,
            programs,
            pda,
            wallet,
        }
    }

    pub fn wallet(&self) -> Pubkey {
        self.wallet
    }

    pub fn programs(&self) -> &ProgramRegistry {
        &self.programs
    }

    pub fn pda(&self) -> &PdaBuilder {
        &self.pda
    }

    pub fn yi(&self) -> &YiClient {
        &self.yi
    }

    // ---------------------------------------------------------------------
    // State reads
    // ---------------------------------------------------------------------

    /// Fetch a wrapper record by its account address
    pub async fn fetch_wrapper(&self, address: &Pubkey) -> SdkResult<Option<WrapperData>> {
        match self.fetcher.get_account_data(address).await? {
            Some(data) => Ok(Some(WrapperData::try_from_account_data(&data)?)),
            None => Ok(None),
        }
    }

    /// Fetch the wrapper record of a wrapper mint
    pub async fn fetch_wrapper_by_mint(&self, wrapper_mint: &Pubkey) -> SdkResult<WrapperData> {
        let (wrapper, _) = self.pda.sve(wrapper_mint)?;
        self.fetch_wrapper(&wrapper).await?.ok_or_else(|| {
            SdkError::AccountNotFound(format!("SVE {} of mint {}", wrapper, wrapper_mint))
        })
    }

    /// Look up the escrow of `owner` in `locker`
    pub async fn fetch_escrow_state(&self, locker: &Pubkey, owner: &Pubkey) -> SdkResult<EscrowState> {
        let (escrow, bump) = self.pda.escrow(locker, owner)?;
        let state = match self.fetcher.get_account_data(&escrow).await? {
            Some(data) => EscrowState::Present {
                escrow,
                data: EscrowData::try_from_account_data(&data)?,
            },
            None => EscrowState::Missing { escrow, bump },
        };
        tracing::debug!(%escrow, present = state.is_present(), "resolved escrow");
        Ok(state)
    }

    // ---------------------------------------------------------------------
    // Bundles
    // ---------------------------------------------------------------------

    /// Create a wrapper around `args.underlying`, including its Yi token.
    pub async fn create_wrapper(&self, args: CreateWrapperArgs) -> SdkResult<CreateWrapperResult> {
        let payer = args.payer.unwrap_or(self.wallet);
        let min_lock_duration = args.min_lock_duration.unwrap_or(DEFAULT_MIN_LOCK_DURATION);
        let mint_keypair = args
            .mint_keypair
            .unwrap_or_else(|| Arc::new(Keypair::new()));
        let yi_mint_keypair = args
            .yi_mint_keypair
            .unwrap_or_else(|| Arc::new(Keypair::new()));
        let wrapper_mint = mint_keypair.pubkey();

        let yi = self
            .yi
            .create_yi_token(&args.underlying, yi_mint_keypair, payer)
            .await?;

        let (wrapper, _) = self.pda.sve(&wrapper_mint)?;
        let rent = self
            .fetcher
            .minimum_balance_for_rent_exemption(spl_token::state::Mint::LEN)
            .await?;
        let init_mint = TransactionEnvelope::new(create_init_mint_instructions(
            &self.programs,
            &payer,
            &wrapper_mint,
            args.underlying.decimals,
            &wrapper,
            Some(&wrapper),
            rent,
        )?)
        .with_signers([mint_keypair]);

        let yi_tokens = get_or_create_ata(
            self.fetcher.as_ref(),
            &self.programs,
            &payer,
            &yi.yi_mint,
            &wrapper,
        )
        .await?;
        let create_sve = self.builder.create_sve(
            min_lock_duration,
            &CreateSveAccounts {
                sve_mint: wrapper_mint,
                sve: wrapper,
                yi: yi.yi_token,
                yi_mint: yi.yi_mint,
                yi_tokens: yi_tokens.address,
                locker: args.locker,
                payer,
            },
        )?;
        let register = TransactionEnvelope::from_optional([yi_tokens.instruction, Some(create_sve)]);

        let wrapper_name = format!("SVE of {}", args.underlying.name);
        let yi_name = format!("Yi of {}", wrapper_name);
        let tx = TransactionEnvelope::combine_all([yi.tx, init_mint, register]);

        tracing::info!(
            %wrapper,
            %wrapper_mint,
            yi_mint = %yi.yi_mint,
            min_lock_duration,
            instructions = tx.len(),
            "built create wrapper bundle"
        );
        Ok(CreateWrapperResult {
            wrapper,
            wrapper_token: args.underlying.derived(wrapper_mint, wrapper_name),
            yi_token: args.underlying.derived(yi.yi_mint, yi_name),
            tx,
        })
    }

    /// Create the escrow of the user in `args.locker`
    pub async fn create_escrow(&self, args: CreateEscrowArgs) -> SdkResult<CreateEscrowResult> {
        let owner = args.user_authority.unwrap_or(self.wallet);
        let payer = args.payer.unwrap_or(self.wallet);
        let (escrow, bump) = self.pda.escrow(&args.locker, &owner)?;

        let escrow_tokens = get_or_create_ata(
            self.fetcher.as_ref(),
            &self.programs,
            &payer,
            &args.underlying_mint,
            &escrow,
        )
        .await?;
        let new_escrow = self
            .locked_voter
            .new_escrow(args.locker, escrow, bump, owner, payer)?;

        tracing::debug!(%escrow, bump, escrow_tokens = %escrow_tokens.address, "built create escrow bundle");
        Ok(CreateEscrowResult {
            escrow,
            escrow_tokens: escrow_tokens.address,
            tx: TransactionEnvelope::from_optional([escrow_tokens.instruction, Some(new_escrow)]),
        })
    }

    /// Lock wrapper tokens into the wrapper's locker.
    ///
    /// When the user has no escrow yet, the bundle starts with its creation
    /// and the lock targets the escrow token account created there.
    pub async fn lock(&self, args: LockArgs) -> SdkResult<TransactionEnvelope> {
        let owner = args.user_authority.unwrap_or(self.wallet);
        let wrapper = self.fetch_wrapper_by_mint(&args.wrapper_mint).await?;

        match self.fetch_escrow_state(&wrapper.locker, &owner).await? {
            EscrowState::Missing { .. } => {
                let created = self
                    .create_escrow(CreateEscrowArgs {
                        locker: wrapper.locker,
                        underlying_mint: wrapper.underlying_mint,
                        user_authority: Some(owner),
                        payer: args.payer,
                    })
                    .await?;
                let lock = self
                    .lock_with_data(LockWithDataArgs {
                        wrapper,
                        escrow_tokens: created.escrow_tokens,
                        amount: args.amount,
                        duration: args.duration,
                        user_authority: Some(owner),
                        payer: args.payer,
                    })
                    .await?;
                Ok(created.tx.combine(lock))
            }
            EscrowState::Present { data, .. } => {
                self.lock_with_data(LockWithDataArgs {
                    wrapper,
                    escrow_tokens: data.tokens,
                    amount: args.amount,
                    duration: args.duration,
                    user_authority: Some(owner),
                    payer: args.payer,
                })
                .await
            }
        }
    }

    /// Build the lock bundle from known wrapper and escrow token data.
    ///
    /// Creates the user's underlying token account if it is missing, since
    /// the program withdraws the wrapped tokens into it before locking.
    pub async fn lock_with_data(&self, args: LockWithDataArgs) -> SdkResult<TransactionEnvelope> {
        let wrapper = &args.wrapper;
        let owner = args.user_authority.unwrap_or(self.wallet);
        let payer = args.payer.unwrap_or(self.wallet);
        let (sve, _) = self.pda.sve(&wrapper.mint)?;
        let (escrow, _) = self.pda.escrow(&wrapper.locker, &owner)?;

        let user_underlying_tokens = get_or_create_ata(
            self.fetcher.as_ref(),
            &self.programs,
            &payer,
            &wrapper.underlying_mint,
            &owner,
        )
        .await?;
        let lock = self.builder.lock(
            args.amount,
            args.duration,
            &LockAccounts {
                sve,
                sve_mint: wrapper.mint,
                sve_yi_tokens: wrapper.yi_tokens,
                user_sve_tokens: self.pda.associated_token(&owner, &wrapper.mint),
                user_underlying_tokens: user_underlying_tokens.address,
                locker: wrapper.locker,
                escrow,
                escrow_tokens: args.escrow_tokens,
                yi_token: wrapper.yi,
                yi_mint: wrapper.yi_mint,
                yi_underlying_tokens: self
                    .pda
                    .associated_token(&wrapper.yi, &wrapper.underlying_mint),
                user_authority: owner,
            },
        )?;

        tracing::info!(%sve, %escrow, amount = args.amount, duration = args.duration, "built lock bundle");
        Ok(TransactionEnvelope::from_optional([
            user_underlying_tokens.instruction,
            Some(lock),
        ]))
    }

    /// Mint wrapper tokens by depositing underlying tokens
    pub async fn mint_from_underlying(
        &self,
        args: MintFromUnderlyingArgs,
    ) -> SdkResult<TransactionEnvelope> {
        let wrapper = &args.wrapper;
        let authority = args.source_authority.unwrap_or(self.wallet);
        let (common, create_to) = self.mint_to_common(wrapper, args.to, &authority).await?;

        let accounts = MintFromUnderlyingAccounts {
            common,
            yi: wrapper.yi,
            yi_mint: wrapper.yi_mint,
            yi_underlying_tokens: args.yi_underlying_tokens.unwrap_or_else(|| {
                self.pda
                    .associated_token(&wrapper.yi, &wrapper.underlying_mint)
            }),
            source_underlying_tokens: args.source_underlying_tokens.unwrap_or_else(|| {
                self.pda
                    .associated_token(&authority, &wrapper.underlying_mint)
            }),
            source_authority: authority,
        };
        let mint = self
            .builder
            .mint_from_underlying(args.underlying_amount, &accounts)?;

        tracing::info!(sve = %accounts.common.sve, amount = args.underlying_amount, "built mint from underlying bundle");
        Ok(TransactionEnvelope::from_optional([create_to, Some(mint)]))
    }

    /// Mint wrapper tokens by depositing Yi tokens
    pub async fn mint_from_yi(&self, args: MintFromYiArgs) -> SdkResult<TransactionEnvelope> {
        let wrapper = &args.wrapper;
        let authority = args.source_authority.unwrap_or(self.wallet);
        let (common, create_to) = self.mint_to_common(wrapper, args.to, &authority).await?;

        let accounts = MintFromYiAccounts {
            common,
            source_yi_tokens: args
                .source_yi_tokens
                .unwrap_or_else(|| self.pda.associated_token(&authority, &wrapper.yi_mint)),
            source_authority: authority,
        };
        let mint = self.builder.mint_from_yi(args.yi_amount, &accounts)?;

        tracing::info!(sve = %accounts.common.sve, amount = args.yi_amount, "built mint from Yi bundle");
        Ok(TransactionEnvelope::from_optional([create_to, Some(mint)]))
    }

    /// Accounts shared by the mint instructions, plus the creation of the
    /// destination account when no destination was supplied.
    async fn mint_to_common(
        &self,
        wrapper: &WrapperData,
        to: Option<Pubkey>,
        authority: &Pubkey,
    ) -> SdkResult<(MintToCommonAccounts, Option<solana_sdk::instruction::Instruction>)> {
        let (sve, _) = self.pda.sve(&wrapper.mint)?;
        let (to, create_to) = match to {
            Some(to) => (to, None),
            None => {
                let pending = get_or_create_ata(
                    self.fetcher.as_ref(),
                    &self.programs,
                    &self.wallet,
                    &wrapper.mint,
                    authority,
                )
                .await?;
                (pending.address, pending.instruction)
            }
        };
        Ok((
            MintToCommonAccounts {
                sve,
                sve_mint: wrapper.mint,
                sve_yi_tokens: wrapper.yi_tokens,
                to,
            },
            create_to,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{encode_escrow_account, encode_wrapper_account, InMemoryAccounts};

    struct Fixture {
        accounts: Arc<InMemoryAccounts>,
        client: SveClient,
        wrapper: WrapperData,
        user: Pubkey,
    }

    fn fixture() -> Fixture {
        let accounts = Arc::new(InMemoryAccounts::new());
        let user = Pubkey::new_unique();
        let client = SveClient::new(accounts.clone(), Arc::new(ProgramRegistry::default()), user);

        let mint = Pubkey::new_unique();
        let yi_mint = Pubkey::new_unique();
        let underlying_mint = Pubkey::new_unique();
        let (sve, bump) = client.pda().sve(&mint).unwrap();
        let (yi, _) = client.pda().yi_token(&yi_mint).unwrap();
        let wrapper = WrapperData {
            mint,
            bump,
            min_lock_duration: DEFAULT_MIN_LOCK_DURATION,
            underlying_mint,
            yi_mint,
            yi,
            yi_tokens: client.pda().associated_token(&sve, &yi_mint),
            locker: Pubkey::new_unique(),
            ..Default::default()
        };
        accounts.insert(sve, encode_wrapper_account(&wrapper));

        Fixture {
            accounts,
            client,
            wrapper,
            user,
        }
    }

    #[tokio::test]
    async fn test_fetch_wrapper_by_mint() {
        let f = fixture();
        let fetched = f.client.fetch_wrapper_by_mint(&f.wrapper.mint).await.unwrap();
        assert_eq!(fetched, f.wrapper);

        let err = f
            .client
            .fetch_wrapper_by_mint(&Pubkey::new_unique())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_escrow_state_variants() {
        let f = fixture();
        let state = f
            .client
            .fetch_escrow_state(&f.wrapper.locker, &f.user)
            .await
            .unwrap();
        let (escrow, bump) = f.client.pda().escrow(&f.wrapper.locker, &f.user).unwrap();
        assert_eq!(state, EscrowState::Missing { escrow, bump });

        let data = EscrowData {
            locker: f.wrapper.locker,
            owner: f.user,
            bump,
            tokens: Pubkey::new_unique(),
            ..Default::default()
        };
        f.accounts.insert(escrow, encode_escrow_account(&data));
        let state = f
            .client
            .fetch_escrow_state(&f.wrapper.locker, &f.user)
            .await
            .unwrap();
        assert_eq!(state, EscrowState::Present { escrow, data });
    }

    #[tokio::test]
    async fn test_corrupt_escrow_is_an_error() {
        let f = fixture();
        let (escrow, _) = f.client.pda().escrow(&f.wrapper.locker, &f.user).unwrap();
        f.accounts.insert(escrow, vec![0; 16]);
        let err = f
            .client
            .fetch_escrow_state(&f.wrapper.locker, &f.user)
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_mint_from_yi_with_explicit_destination_skips_lookup() {
        let f = fixture();
        let to = Pubkey::new_unique();
        let reads_before = f.accounts.read_count();

        let tx = f
            .client
            .mint_from_yi(MintFromYiArgs {
                wrapper: f.wrapper.clone(),
                yi_amount: 10,
                to: Some(to),
                source_yi_tokens: None,
                source_authority: None,
            })
            .await
            .unwrap();

        assert_eq!(f.accounts.read_count(), reads_before);
        assert_eq!(tx.len(), 1);
        assert_eq!(tx.instructions[0].accounts[3].pubkey, to);
        assert_eq!(
            tx.instructions[0].accounts[5].pubkey,
            f.client.pda().associated_token(&f.user, &f.wrapper.yi_mint)
        );
    }

    #[tokio::test]
    async fn test_mint_from_underlying_creates_missing_destination() {
        let f = fixture();
        let tx = f
            .client
            .mint_from_underlying(MintFromUnderlyingArgs {
                wrapper: f.wrapper.clone(),
                underlying_amount: 10,
                to: None,
                yi_underlying_tokens: None,
                source_underlying_tokens: None,
                source_authority: None,
            })
            .await
            .unwrap();

        let programs = ProgramRegistry::default();
        let user_tokens = f.client.pda().associated_token(&f.user, &f.wrapper.mint);
        assert_eq!(tx.len(), 2);
        assert_eq!(tx.instructions[0].program_id, programs.associated_token);
        assert_eq!(tx.instructions[1].program_id, programs.sve);
        assert_eq!(tx.instructions[1].accounts[3].pubkey, user_tokens);
        assert_eq!(
            tx.instructions[1].accounts[7].pubkey,
            f.client
                .pda()
                .associated_token(&f.wrapper.yi, &f.wrapper.underlying_mint)
        );
    }

    #[tokio::test]
    async fn test_with_wallet_changes_default_authority() {
        let f = fixture();
        let other = Pubkey::new_unique();
        let client = f.client.with_wallet(other);
        assert_eq!(client.wallet(), other);

        let created = client
            .create_escrow(CreateEscrowArgs {
                locker: f.wrapper.locker,
                underlying_mint: f.wrapper.underlying_mint,
                user_authority: None,
                payer: None,
            })
            .await
            .unwrap();
        assert_eq!(
            created.escrow,
            client.pda().escrow(&f.wrapper.locker, &other).unwrap().0
        );
    }
}
