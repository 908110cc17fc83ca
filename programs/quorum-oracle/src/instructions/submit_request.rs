use crate::error::{FeeError, OracleError};
use crate::events::RequestSubmitted;
use crate::state::{Feed, PendingRequest, ProtocolConfig, RequestStatus, MAX_RESPONSES};
use crate::utils::{self, admission, lookup};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

/// Opens request `seq` on a started feed and reserves its fee in the vault.
/// `seq` must be the feed's next request sequence. Returns the request address.
pub fn submit_request(ctx: Context<SubmitRequest>, seq: u64) -> Result<Pubkey> {
    let feed_info = ctx.accounts.feed.to_account_info();
    let mut feed: Feed = lookup::load(&feed_info, OracleError::UnknownFeed)?;
    feed.ensure_accepting_requests()?;

    let config = &ctx.accounts.protocol_config;
    let fee = admission::FeeBearingOp::SubmitRequest.fee(config);

    admission::admit(
        &ctx.accounts.instructions,
        config,
        admission::FeeBearingOp::SubmitRequest,
        &ctx.accounts.consumer.key(),
        ctx.accounts.consumer_token.amount,
    )?;

    require!(
        seq == feed.next_request_seq,
        OracleError::InvalidRequestSequence
    );

    utils::transfer_fee(
        &ctx.accounts.token_program,
        &ctx.accounts.consumer_token,
        &ctx.accounts.fee_mint,
        &ctx.accounts.vault,
        &ctx.accounts.consumer,
        fee,
    )?;

    let clock = Clock::get()?;
    let request_key = ctx.accounts.request.key();
    let request = &mut ctx.accounts.request;

    request.feed = feed_info.key();
    request.seq = seq;
    request.consumer = ctx.accounts.consumer.key();
    request.fee = fee;
    request.refund_account = ctx.accounts.consumer_token.key();
    request.created_slot = clock.slot;
    request.deadline_slot = clock
        .slot
        .checked_add(feed.timeout_slots)
        .ok_or(error!(FeeError::ArithmeticOverflow))?;
    request.threshold = feed.threshold;
    request.aggregation = feed.aggregation;
    request.response_mode = feed.response_mode;
    request.responses = Vec::with_capacity(MAX_RESPONSES);
    request.status = RequestStatus::Pending;
    request.result = None;
    request.resolved_slot = 0;
    request.bump = ctx.bumps.request;

    let dropped = feed.track_pending(request.summary(request_key), clock.slot)?;
    for overdue in dropped {
        msg!("Request {} is past its deadline and left the pending list.", overdue);
    }
    feed.next_request_seq += 1;
    lookup::store(&feed_info, &feed)?;

    msg!(
        "Request {} submitted to feed {} by {}. Threshold {}, deadline slot {}, fee {}.",
        request_key,
        feed_info.key,
        request.consumer,
        request.threshold,
        request.deadline_slot,
        fee
    );

    emit!(RequestSubmitted {
        request: request_key,
        feed: feed_info.key(),
        consumer: request.consumer,
        fee,
        threshold: request.threshold,
        created_slot: request.created_slot,
        deadline_slot: request.deadline_slot,
    });

    Ok(request_key)
}

#[derive(Accounts)]
#[instruction(seq: u64)]
pub struct SubmitRequest<'info> {
    // Must stay the first account: the admission gate reads the payer by position.
    #[account(mut)]
    pub consumer: Signer<'info>,

    #[account(
        seeds = [ProtocolConfig::SEED_PREFIX],
        bump = protocol_config.bump,
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    /// CHECK: Decoded by `lookup::load`, which checks owner and account type.
    #[account(mut)]
    pub feed: UncheckedAccount<'info>,

    #[account(
        init,
        payer = consumer,
        space = PendingRequest::SPACE,
        seeds = [PendingRequest::SEED_PREFIX, feed.key().as_ref(), &seq.to_le_bytes()],
        bump
    )]
    pub request: Account<'info, PendingRequest>,

    #[account(
        mut,
        token::mint = fee_mint,
        token::authority = consumer,
    )]
    pub consumer_token: InterfaceAccount<'info, TokenAccount>,

    #[account(mut, address = protocol_config.vault)]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    #[account(address = protocol_config.fee_mint)]
    pub fee_mint: InterfaceAccount<'info, Mint>,

    /// CHECK: This is safe. We only read the instructions sysvar for fee admission.
    #[account(address = sysvar::instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Interface<'info, TokenInterface>,
}
