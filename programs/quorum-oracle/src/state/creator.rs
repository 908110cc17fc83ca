use anchor_lang::prelude::*;

/// Per-creator feed counter; feed addresses are derived from `(creator, seq)`.
#[account]
#[derive(Default, InitSpace)]
pub struct CreatorState {
    pub creator: Pubkey,
    pub next_feed_seq: u64,
    pub bump: u8,
}

impl CreatorState {
    pub const SEED_PREFIX: &'static [u8] = b"creator";
    pub const SPACE: usize = 8 + Self::INIT_SPACE;
}
