use crate::error::OracleError;
use crate::events::FeedEdited;
use crate::state::{Feed, ProtocolConfig};
use crate::utils::lookup;
use anchor_lang::prelude::*;

pub fn edit_feed(ctx: Context<EditFeed>, params: EditFeedParams) -> Result<()> {
    let clock = Clock::get()?;
    let max_timeout_slots = ctx.accounts.protocol_config.max_timeout_slots;

    let feed_info = ctx.accounts.feed.to_account_info();
    let mut feed: Feed = lookup::load(&feed_info, OracleError::UnknownFeed)?;
    feed.apply_edit(
        &ctx.accounts.creator.key(),
        &params,
        max_timeout_slots,
        clock.slot,
    )?;
    lookup::store(&feed_info, &feed)?;

    msg!(
        "Feed {} edited: {} providers, threshold {}, timeout {} slots.",
        feed_info.key,
        feed.providers.len(),
        feed.threshold,
        feed.timeout_slots
    );

    emit!(FeedEdited {
        feed: feed_info.key(),
        creator: feed.creator,
        providers: feed.providers.clone(),
        threshold: feed.threshold,
        timeout_slots: feed.timeout_slots,
        edited_slot: clock.slot,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct EditFeed<'info> {
    /// CHECK: Decoded by `lookup::load`, which checks owner and account type.
    #[account(mut)]
    pub feed: UncheckedAccount<'info>,

    pub creator: Signer<'info>,

    #[account(
        seeds = [ProtocolConfig::SEED_PREFIX],
        bump = protocol_config.bump,
    )]
    pub protocol_config: Account<'info, ProtocolConfig>,
}

/// Fields left as `None` keep their current value.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default)]
pub struct EditFeedParams {
    pub name: Option<String>,
    pub description: Option<String>,
    pub providers: Option<Vec<Pubkey>>,
    pub threshold: Option<u8>,
    pub timeout_slots: Option<u64>,
    pub schema: Option<String>,
}
