use crate::error::OracleError;
use crate::events::{FeedPaused, FeedStarted};
use crate::state::Feed;
use crate::utils::lookup;
use anchor_lang::prelude::*;

pub fn start_feed(ctx: Context<ManageFeed>) -> Result<()> {
    let feed_info = ctx.accounts.feed.to_account_info();
    let mut feed: Feed = lookup::load(&feed_info, OracleError::UnknownFeed)?;
    feed.start(&ctx.accounts.creator.key())?;
    lookup::store(&feed_info, &feed)?;

    msg!("Feed {} started.", feed_info.key);

    emit!(FeedStarted {
        feed: feed_info.key(),
        creator: ctx.accounts.creator.key(),
        started_slot: Clock::get()?.slot,
    });

    Ok(())
}

/// Pausing stops new requests only; in-flight requests keep collecting responses.
pub fn pause_feed(ctx: Context<ManageFeed>) -> Result<()> {
    let feed_info = ctx.accounts.feed.to_account_info();
    let mut feed: Feed = lookup::load(&feed_info, OracleError::UnknownFeed)?;
    feed.pause(&ctx.accounts.creator.key())?;
    lookup::store(&feed_info, &feed)?;

    msg!(
        "Feed {} paused with {} pending requests.",
        feed_info.key,
        feed.pending.len()
    );

    emit!(FeedPaused {
        feed: feed_info.key(),
        creator: ctx.accounts.creator.key(),
        paused_slot: Clock::get()?.slot,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct ManageFeed<'info> {
    /// CHECK: Decoded by `lookup::load`, which checks owner and account type.
    #[account(mut)]
    pub feed: UncheckedAccount<'info>,

    pub creator: Signer<'info>,
}
