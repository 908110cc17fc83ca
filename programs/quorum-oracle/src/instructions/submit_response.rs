use super::expire_request::{ensure_refund_account, expire_if_due};
use crate::events::{RequestFulfilled, ResponseAccepted, ResponseRejected};
use crate::state::{Feed, PendingRequest, ProtocolConfig, RejectionReason, ResultEntry};
use crate::utils::settlement::FeeSettlement;
use crate::utils::{combiner, entropy, lookup};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

/// Reports a response that arrived after its request was resolved. The
/// instruction still succeeds so that an expiry settled in the same
/// instruction is kept.
pub(crate) fn reject_resolved(request: Pubkey, provider: Pubkey, slot: u64) {
    msg!(
        "Response from {} to request {} rejected: request already resolved.",
        provider,
        request
    );

    emit!(ResponseRejected {
        request,
        provider,
        reason: RejectionReason::RequestAlreadyResolved,
        rejected_slot: slot,
    });
}

pub fn submit_response(
    ctx: Context<SubmitResponse>,
    payload: [u8; 32],
    salt: [u8; 32],
) -> Result<()> {
    let slot = Clock::get()?.slot;
    let accounts = &*ctx.accounts;
    let feed_info = accounts.feed.to_account_info();
    let request_info = accounts.request.to_account_info();
    let refund_info = accounts.refund_account.to_account_info();

    let (mut feed, mut request) = lookup::load_request_with_feed(&feed_info, &request_info)?;
    ensure_refund_account(&request, &refund_info)?;

    let settlement = FeeSettlement {
        protocol_config: &accounts.protocol_config,
        vault: &accounts.vault,
        treasury: &accounts.treasury,
        fee_mint: &accounts.fee_mint,
        token_program: &accounts.token_program,
    };

    respond(
        &mut feed,
        &mut request,
        request_info.key(),
        accounts.provider.key(),
        payload,
        salt,
        &settlement,
        &refund_info,
        &accounts.slot_hashes,
        slot,
    )?;

    lookup::store(&feed_info, &feed)?;
    lookup::store(&request_info, &request)
}

#[allow(clippy::too_many_arguments)]
fn respond<'info>(
    feed: &mut Feed,
    request: &mut PendingRequest,
    request_key: Pubkey,
    provider: Pubkey,
    payload: [u8; 32],
    salt: [u8; 32],
    settlement: &FeeSettlement<'_, 'info>,
    refund_account: &AccountInfo<'info>,
    slot_hashes: &AccountInfo<'info>,
    slot: u64,
) -> Result<()> {
    expire_if_due(feed, request, request_key, settlement, refund_account, slot)?;

    if request.is_resolved() {
        reject_resolved(request_key, provider, slot);
        return Ok(());
    }

    feed.ensure_provider(&provider)?;
    combiner::validate_payload(request.aggregation, &payload)?;

    let accepted = request.record_response(provider, payload, salt, slot)?;
    feed.note_reveal(&request_key, &provider);

    msg!(
        "Response {}/{} from {} accepted for request {}.",
        accepted,
        request.threshold,
        provider,
        request_key
    );

    emit!(ResponseAccepted {
        request: request_key,
        provider,
        payload,
        accepted: accepted as u8,
        threshold: request.threshold,
        accepted_slot: slot,
    });

    if !request.threshold_reached() {
        return Ok(());
    }

    let (hash_slot, slot_hash) = entropy::latest_slot_hash(slot_hashes)?;
    let seed = combiner::derive_entropy(&slot_hash, &request_key);
    let result = combiner::aggregate(request.aggregation, &request.accepted_payloads(), &seed)?;

    request.fulfil(result, slot)?;
    feed.untrack_pending(&request_key);
    feed.record_result(ResultEntry {
        request: request_key,
        value: result,
        slot,
    });

    settlement.pay_treasury(request.fee)?;

    msg!(
        "Request {} fulfilled with {:?} over {} responses (entropy slot {}). Result: {}",
        request_key,
        request.aggregation,
        accepted,
        hash_slot,
        hex::encode(result)
    );

    emit!(RequestFulfilled {
        request: request_key,
        feed: request.feed,
        result,
        responses: accepted as u8,
        fulfilled_slot: slot,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct SubmitResponse<'info> {
    pub provider: Signer<'info>,

    /// CHECK: Decoded by `lookup::load_request_with_feed`.
    #[account(mut)]
    pub feed: UncheckedAccount<'info>,

    /// CHECK: Decoded by `lookup::load_request_with_feed`.
    #[account(mut)]
    pub request: UncheckedAccount<'info>,

    /// CHECK: Must be the request's refund account. Only paid into when an expiry
    /// is settled with a refund; closed or frozen accounts are allowed.
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

    /// CHECK: This is safe. Address-checked; only the newest slot hash is read.
    #[account(address = sysvar::slot_hashes::ID)]
    pub slot_hashes: UncheckedAccount<'info>,

    pub token_program: Interface<'info, TokenInterface>,
}
