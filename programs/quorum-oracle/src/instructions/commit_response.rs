use super::expire_request::{ensure_refund_account, expire_if_due};
use super::submit_response::reject_resolved;
use crate::events::ResponseCommitted;
use crate::state::ProtocolConfig;
use crate::utils::lookup;
use crate::utils::settlement::FeeSettlement;
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

/// First phase of a commit-reveal response: stores
/// `keccak(payload || salt || provider)` without revealing the payload.
pub fn commit_response(ctx: Context<CommitResponse>, commitment: [u8; 32]) -> Result<()> {
    let slot = Clock::get()?.slot;
    let accounts = &*ctx.accounts;
    let feed_info = accounts.feed.to_account_info();
    let request_info = accounts.request.to_account_info();
    let refund_info = accounts.refund_account.to_account_info();
    let request_key = request_info.key();
    let provider = accounts.provider.key();

    let (mut feed, mut request) = lookup::load_request_with_feed(&feed_info, &request_info)?;
    ensure_refund_account(&request, &refund_info)?;

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
        request_key,
        &settlement,
        &refund_info,
        slot,
    )?;

    if request.is_resolved() {
        reject_resolved(request_key, provider, slot);
    } else {
        feed.ensure_provider(&provider)?;
        request.record_commitment(provider, commitment, slot)?;
        feed.note_commitment(&request_key, &provider);

        msg!(
            "Commitment {}/{} from {} recorded for request {}: {}",
            request.responses.len(),
            request.threshold,
            provider,
            request_key,
            hex::encode(commitment)
        );

        emit!(ResponseCommitted {
            request: request_key,
            provider,
            commitment,
            committed_slot: slot,
        });
    }

    lookup::store(&feed_info, &feed)?;
    lookup::store(&request_info, &request)
}

#[derive(Accounts)]
pub struct CommitResponse<'info> {
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

    pub token_program: Interface<'info, TokenInterface>,
}
