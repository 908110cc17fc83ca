use crate::error::OracleError;
use crate::events::RequestExpired;
use crate::state::{Feed, PendingRequest, ProtocolConfig};
use crate::utils::lookup;
use crate::utils::settlement::{FeeDestination, FeeSettlement};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

pub(crate) fn ensure_refund_account(request: &PendingRequest, info: &AccountInfo) -> Result<()> {
    require_keys_eq!(
        *info.key,
        request.refund_account,
        OracleError::InvalidRefundAccount
    );
    Ok(())
}

/// Expires `request` if its deadline has passed and settles the reserved fee.
///
/// Runs first in every instruction that touches a request, so a due request is
/// always expired before any response in the same slot is looked at. Returns
/// `false` without side effects when the request is resolved or not yet due.
pub fn expire_if_due<'info>(
    feed: &mut Feed,
    request: &mut PendingRequest,
    request_key: Pubkey,
    settlement: &FeeSettlement<'_, 'info>,
    refund_account: &AccountInfo<'info>,
    slot: u64,
) -> Result<bool> {
    if !request.is_due(slot) {
        return Ok(false);
    }

    request.expire(slot)?;
    feed.untrack_pending(&request_key);

    let destination = settlement.settle_expired(refund_account, request.fee)?;
    let fee_refunded = destination == FeeDestination::Refund;

    msg!(
        "Request {} expired at slot {} with {}/{} responses, fee {}.",
        request_key,
        slot,
        request.accepted_count(),
        request.threshold,
        if fee_refunded { "refunded" } else { "forfeited" }
    );

    emit!(RequestExpired {
        request: request_key,
        feed: request.feed,
        responses: request.accepted_count() as u8,
        fee_refunded,
        expired_slot: slot,
    });

    Ok(true)
}

pub fn expire_request(ctx: Context<ExpireRequest>) -> Result<()> {
    let slot = Clock::get()?.slot;
    let accounts = &*ctx.accounts;
    let feed_info = accounts.feed.to_account_info();
    let request_info = accounts.request.to_account_info();
    let refund_info = accounts.refund_account.to_account_info();

    let (mut feed, mut request) = lookup::load_request_with_feed(&feed_info, &request_info)?;
    ensure_refund_account(&request, &refund_info)?;

    require!(!request.is_resolved(), OracleError::RequestAlreadyResolved);
    require!(request.is_due(slot), OracleError::RequestNotDue);

    let settlement = FeeSettlement {
        protocol_config: &accounts.protocol_config,
        vault: &accounts.vault,
        treasury: &accounts.treasury,
        fee_mint: &accounts.fee_mint,
        token_program: &accounts.token_program,
    };

    expire_if_due(
        &mut feed,
        &mut request,
        request_info.key(),
        &settlement,
        &refund_info,
        slot,
    )?;

    lookup::store(&feed_info, &feed)?;
    lookup::store(&request_info, &request)
}

#[derive(Accounts)]
pub struct ExpireRequest<'info> {
    /// CHECK: Decoded by `lookup::load_request_with_feed`.
    #[account(mut)]
    pub feed: UncheckedAccount<'info>,

    /// CHECK: Decoded by `lookup::load_request_with_feed`.
    #[account(mut)]
    pub request: UncheckedAccount<'info>,

    /// CHECK: Must be the request's refund account. Closed or frozen accounts are
    /// allowed; the fee then goes to the treasury.
    #[account(mut)]
    pub refund_account: UncheckedAccount<'info>,

    #[account(
        seeds = [ProtocolConfig::SEED_PREFIX],
        bump = protocol_config.bump,
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,

    #[account(mut, address = protocol_config.vault)]
    pub vault: InterfaceAccount<'info, TokenAccount>,

    #[account(mut, address = protocol_config.treasury)]
    pub treasury: InterfaceAccount<'info, TokenAccount>,

    #[account(address = protocol_config.fee_mint)]
    pub fee_mint: InterfaceAccount<'info, Mint>,

    pub token_program: Interface<'info, TokenInterface>,
}
