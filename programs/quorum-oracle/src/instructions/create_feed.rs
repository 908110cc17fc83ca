use crate::error::OracleError;
use crate::events::FeedCreated;
use crate::state::{
    AggregationRule, CreatorState, Feed, FeedState, ProtocolConfig, ResponseMode, MAX_HISTORY,
    MAX_PENDING,
};
use crate::utils::{self, admission};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

pub fn create_feed(ctx: Context<CreateFeed>, params: CreateFeedParams) -> Result<()> {
    let config = &ctx.accounts.protocol_config;
    let fee = admission::FeeBearingOp::CreateFeed.fee(config);

    admission::admit(
        &ctx.accounts.instructions,
        config,
        admission::FeeBearingOp::CreateFeed,
        &ctx.accounts.creator.key(),
        ctx.accounts.creator_token.amount,
    )?;

    Feed::validate_settings(
        &params.name,
        &params.description,
        &params.providers,
        params.threshold,
        params.timeout_slots,
        &params.schema,
        config.max_timeout_slots,
    )?;

    let creator_state = &mut ctx.accounts.creator_state;
    if creator_state.creator == Pubkey::default() {
        creator_state.creator = ctx.accounts.creator.key();
        creator_state.bump = ctx.bumps.creator_state;
    }
    require!(
        params.seq == creator_state.next_feed_seq,
        OracleError::InvalidFeedSequence
    );
    creator_state.next_feed_seq += 1;

    utils::transfer_fee(
        &ctx.accounts.token_program,
        &ctx.accounts.creator_token,
        &ctx.accounts.fee_mint,
        &ctx.accounts.treasury,
        &ctx.accounts.creator,
        fee,
    )?;

    let clock = Clock::get()?;
    let feed = &mut ctx.accounts.feed;
    feed.creator = ctx.accounts.creator.key();
    feed.seq = params.seq;
    feed.name = params.name;
    feed.description = params.description;
    feed.providers = params.providers;
    feed.threshold = params.threshold;
    feed.timeout_slots = params.timeout_slots;
    feed.aggregation = params.aggregation;
    feed.response_mode = params.response_mode;
    feed.schema = params.schema;
    feed.state = FeedState::Created;
    feed.next_request_seq = 0;
    feed.pending = Vec::with_capacity(MAX_PENDING);
    feed.latest_result = None;
    feed.result_history = Vec::with_capacity(MAX_HISTORY);
    feed.created_slot = clock.slot;
    feed.bump = ctx.bumps.feed;

    msg!(
        "Feed {} created by {} with {} providers, threshold {}, timeout {} slots.",
        ctx.accounts.feed.key(),
        ctx.accounts.creator.key(),
        ctx.accounts.feed.providers.len(),
        ctx.accounts.feed.threshold,
        ctx.accounts.feed.timeout_slots
    );

    let feed = &ctx.accounts.feed;
    emit!(FeedCreated {
        feed: feed.key(),
        creator: feed.creator,
        seq: feed.seq,
        providers: feed.providers.clone(),
        threshold: feed.threshold,
        timeout_slots: feed.timeout_slots,
        aggregation: feed.aggregation,
        response_mode: feed.response_mode,
        fee_paid: fee,
        created_slot: clock.slot,
    });

    Ok(())
}

#[derive(Accounts)]
#[instruction(params: CreateFeedParams)]
pub struct CreateFeed<'info> {
    // Must stay the first account: the admission gate reads the payer by position.
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(
        seeds = [ProtocolConfig::SEED_PREFIX],
        bump = protocol_config.bump,
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    #[account(
        init_if_needed,
        payer = creator,
        space = CreatorState::SPACE,
        seeds = [CreatorState::SEED_PREFIX, creator.key().as_ref()],
        bump
    )]
    pub creator_state: Account<'info, CreatorState>,

    #[account(
        init,
        payer = creator,
        space = Feed::SPACE,
        seeds = [Feed::SEED_PREFIX, creator.key().as_ref(), &params.seq.to_le_bytes()],
        bump
    )]
    pub feed: Account<'info, Feed>,

    #[account(
        mut,
        token::mint = fee_mint,
        token::authority = creator,
    )]
    pub creator_token: InterfaceAccount<'info, TokenAccount>,

    #[account(mut, address = protocol_config.treasury)]
    pub treasury: InterfaceAccount<'info, TokenAccount>,

    #[account(address = protocol_config.fee_mint)]
    pub fee_mint: InterfaceAccount<'info, Mint>,

    /// CHECK: This is safe. We only read the instructions sysvar for fee admission.
    #[account(address = sysvar::instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Interface<'info, TokenInterface>,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct CreateFeedParams {
    pub seq: u64,
    pub name: String,
    pub description: String,
    pub providers: Vec<Pubkey>,
    pub threshold: u8,
    pub timeout_slots: u64,
    pub aggregation: AggregationRule,
    pub response_mode: ResponseMode,
    pub schema: String,
}
